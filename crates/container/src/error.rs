use crate::key::TypeKey;

/// Container boundary errors.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
	/// Resolution was requested for a type no registration covers.
	#[error("no registration for `{0}`")]
	NotRegistered(TypeKey),

	/// A registration factory failed while producing an instance.
	#[error("constructing `{key}` failed: {source}")]
	Construction {
		key: TypeKey,
		#[source]
		source: Box<dyn std::error::Error + Send + Sync>,
	},
}

impl ContainerError {
	/// Wraps an arbitrary failure as a construction error for `key`.
	pub fn construction(
		key: TypeKey,
		source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
	) -> Self {
		Self::Construction {
			key,
			source: source.into(),
		}
	}
}
