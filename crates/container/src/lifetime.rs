/// Container lifetime policy for a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lifetime {
	/// One shared instance for the life of the container.
	Singleton,
	/// A fresh instance on every resolution.
	#[default]
	Transient,
}

impl core::fmt::Display for Lifetime {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		match self {
			Self::Singleton => write!(f, "singleton"),
			Self::Transient => write!(f, "transient"),
		}
	}
}
