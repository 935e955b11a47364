//! Collection construction paths.

/// Constructor-synthesis contract: a collection type assembled from an
/// ordered sequence of boxed items.
///
/// Implementing this is what makes
/// [`CollectionOptions::new`](crate::CollectionOptions::new) capture a
/// synthesized constructor; collection types without it must supply an
/// override or fail at creation time.
pub trait FromItems<I: ?Sized>: Sized {
	fn from_items(items: Vec<Box<I>>) -> Self;
}

impl<I: ?Sized> FromItems<I> for Vec<Box<I>> {
	fn from_items(items: Vec<Box<I>>) -> Self {
		items
	}
}

/// The construction strategy a builder applies at creation time.
pub(crate) enum Constructor<C, I: ?Sized> {
	/// Captured from [`FromItems`] at the typed entry point.
	Synthesized(fn(Vec<Box<I>>) -> C),
	/// Caller-supplied override.
	Custom(Box<dyn Fn(Vec<Box<I>>) -> C + Send + Sync>),
	/// No construction path; creation fails.
	Unavailable,
}

impl<C, I: ?Sized> Constructor<C, I> {
	pub(crate) fn build(&self, items: Vec<Box<I>>) -> Option<C> {
		match self {
			Self::Synthesized(constructor) => Some(constructor(items)),
			Self::Custom(constructor) => Some(constructor(items)),
			Self::Unavailable => None,
		}
	}
}
