//! Container trait and the default factory-invoking implementation.
//!
//! # Role
//!
//! This is the resolution surface collection builders register against. The
//! trait keeps the contract small: install a registration, ask whether one
//! exists, and turn a key into an instance: either a fresh owned one
//! (`instantiate`) or a shared one under the registration's lifetime policy
//! (`resolve`).

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::error::ContainerError;
use crate::key::TypeKey;
use crate::lifetime::Lifetime;
use crate::registration::{BoxedInstance, Registration, SharedInstance};

/// The injection-container surface collection builders talk to.
///
/// Implementations must be safe for arbitrarily many concurrent callers.
pub trait Container: Send + Sync {
	/// Installs a registration. A later registration for the same key
	/// replaces the earlier one.
	fn register(&self, registration: Registration) -> Result<(), ContainerError>;

	/// Reports whether a registration exists for `key`.
	fn is_registered(&self, key: TypeKey) -> bool;

	/// Produces a fresh owned instance for `key`, ignoring lifetime policy.
	fn instantiate(&self, key: TypeKey) -> Result<BoxedInstance, ContainerError>;

	/// Resolves a shared instance for `key`, honoring its lifetime policy.
	fn resolve(&self, key: TypeKey) -> Result<SharedInstance, ContainerError>;
}

/// Typed convenience layer over [`Container`].
pub trait ContainerExt: Container {
	/// Reports whether `T` is registered.
	fn registered<T: 'static>(&self) -> bool {
		self.is_registered(TypeKey::of::<T>())
	}

	/// Resolves `T` as a shared instance.
	fn get<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, ContainerError> {
		let key = TypeKey::of::<T>();
		self.resolve(key)?.downcast::<T>().map_err(|_| {
			ContainerError::construction(key, "resolved instance had a different concrete type")
		})
	}
}

impl<C: Container + ?Sized> ContainerExt for C {}

/// Minimal thread-safe container: a registration table plus a singleton
/// cache.
///
/// Factories run outside the table locks so they may resolve their own
/// dependencies. Under a singleton race the first published instance wins
/// and every caller observes it; the losing construction is dropped.
#[derive(Default)]
pub struct ServiceContainer {
	registrations: RwLock<FxHashMap<TypeKey, Registration>>,
	singletons: RwLock<FxHashMap<TypeKey, SharedInstance>>,
}

impl ServiceContainer {
	pub fn new() -> Self {
		Self::default()
	}

	fn registration(&self, key: TypeKey) -> Result<Registration, ContainerError> {
		self.registrations
			.read()
			.get(&key)
			.cloned()
			.ok_or(ContainerError::NotRegistered(key))
	}
}

impl Container for ServiceContainer {
	fn register(&self, registration: Registration) -> Result<(), ContainerError> {
		let key = registration.key();
		let previous = self.registrations.write().insert(key, registration);
		if previous.is_some() {
			// A replaced registration must not keep serving a stale singleton.
			self.singletons.write().remove(&key);
			tracing::warn!(%key, "registration replaced");
		} else {
			tracing::debug!(%key, "registered");
		}
		Ok(())
	}

	fn is_registered(&self, key: TypeKey) -> bool {
		self.registrations.read().contains_key(&key)
	}

	fn instantiate(&self, key: TypeKey) -> Result<BoxedInstance, ContainerError> {
		self.registration(key)?.produce(self)
	}

	fn resolve(&self, key: TypeKey) -> Result<SharedInstance, ContainerError> {
		let registration = self.registration(key)?;
		match registration.lifetime() {
			Lifetime::Transient => Ok(Arc::from(registration.produce(self)?)),
			Lifetime::Singleton => {
				if let Some(shared) = self.singletons.read().get(&key) {
					return Ok(shared.clone());
				}
				let fresh: SharedInstance = Arc::from(registration.produce(self)?);
				let mut singletons = self.singletons.write();
				Ok(singletons.entry(key).or_insert(fresh).clone())
			}
		}
	}
}
