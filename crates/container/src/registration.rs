use std::any::Any;
use std::sync::Arc;

use crate::container::Container;
use crate::error::ContainerError;
use crate::key::TypeKey;
use crate::lifetime::Lifetime;

/// An owned instance as produced by a registration factory.
pub type BoxedInstance = Box<dyn Any + Send + Sync>;

/// A shared instance as handed out by lifetime-honoring resolution.
pub type SharedInstance = Arc<dyn Any + Send + Sync>;

/// Factory signature stored in a [`Registration`]. The container passes
/// itself back in so factories can resolve their own dependencies.
pub type InstanceFactory =
	dyn Fn(&dyn Container) -> Result<BoxedInstance, ContainerError> + Send + Sync;

/// Constructibility contract: how a concrete type is built out of a
/// container.
///
/// This is the explicit stand-in for constructor discovery. A type declares
/// its dependencies by resolving them here; there is no signature
/// introspection anywhere.
pub trait FromContainer: Sized + 'static {
	fn from_container(container: &dyn Container) -> Result<Self, ContainerError>;
}

/// A single container registration: type identity, lifetime, and factory.
#[derive(Clone)]
pub struct Registration {
	key: TypeKey,
	lifetime: Lifetime,
	factory: Arc<InstanceFactory>,
}

impl Registration {
	/// Creates a transient registration backed by the type's own
	/// [`FromContainer`] constructor.
	pub fn of<T: FromContainer + Send + Sync>() -> Self {
		Self::with_factory(Lifetime::Transient, T::from_container)
	}

	/// Creates a registration from an explicit typed factory.
	pub fn with_factory<T: Send + Sync + 'static>(
		lifetime: Lifetime,
		factory: impl Fn(&dyn Container) -> Result<T, ContainerError> + Send + Sync + 'static,
	) -> Self {
		Self {
			key: TypeKey::of::<T>(),
			lifetime,
			factory: Arc::new(move |container| {
				factory(container).map(|value| Box::new(value) as BoxedInstance)
			}),
		}
	}

	/// Creates a registration from an already type-erased factory.
	///
	/// The caller is responsible for `factory` producing instances whose
	/// concrete type matches `key`.
	pub fn from_raw(
		key: TypeKey,
		lifetime: Lifetime,
		factory: impl Fn(&dyn Container) -> Result<BoxedInstance, ContainerError>
		+ Send
		+ Sync
		+ 'static,
	) -> Self {
		Self {
			key,
			lifetime,
			factory: Arc::new(factory),
		}
	}

	/// Returns the type identity this registration covers.
	pub fn key(&self) -> TypeKey {
		self.key
	}

	/// Returns the lifetime policy.
	pub fn lifetime(&self) -> Lifetime {
		self.lifetime
	}

	/// Runs the factory, yielding a fresh instance.
	pub fn produce(&self, container: &dyn Container) -> Result<BoxedInstance, ContainerError> {
		(self.factory)(container)
	}
}

impl core::fmt::Debug for Registration {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("Registration")
			.field("key", &self.key)
			.field("lifetime", &self.lifetime)
			.finish_non_exhaustive()
	}
}
