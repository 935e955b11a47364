//! Item-type handles and the capability evidence they carry.
//!
//! A handle built through [`ItemType::of`] captures two monomorphized
//! functions at the call site: a cast from a container-produced instance
//! into `Box<I>`, and a factory the container can register. Together they
//! are the proof that the named type is usable as an item. A handle built
//! through [`ItemType::raw`] carries neither and fails the capability check
//! wherever the builder enforces it.

use std::any::Any;

use tessera_container::{
	BoxedInstance, Container, ContainerError, FromContainer, Lifetime, Registration, TypeKey,
};

/// Coercion half of the item capability: how a boxed concrete value becomes
/// a boxed item of the collection's element type `I`.
///
/// Declaring a capability means providing the blanket coercion once per item
/// trait:
///
/// ```ignore
/// trait Widget: Send + Sync + 'static { /* ... */ }
///
/// impl<T: Widget> AsItem<dyn Widget> for T {
/// 	fn into_item(self: Box<Self>) -> Box<dyn Widget> {
/// 		self
/// 	}
/// }
/// ```
pub trait AsItem<I: ?Sized>: Any + Send + Sync {
	/// Coerces the boxed concrete value into the item type.
	fn into_item(self: Box<Self>) -> Box<I>;
}

type CastFn<I> = fn(BoxedInstance) -> Result<Box<I>, BoxedInstance>;
type ProduceFn = fn(&dyn Container) -> Result<BoxedInstance, ContainerError>;

fn cast_into<I: ?Sized + 'static, T: AsItem<I>>(
	instance: BoxedInstance,
) -> Result<Box<I>, BoxedInstance> {
	instance.downcast::<T>().map(T::into_item)
}

fn produce<T: FromContainer + Send + Sync>(
	container: &dyn Container,
) -> Result<BoxedInstance, ContainerError> {
	T::from_container(container).map(|value| Box::new(value) as BoxedInstance)
}

/// Evidence that a handle's type satisfies the item capability.
struct Evidence<I: ?Sized + 'static> {
	cast: CastFn<I>,
	produce: ProduceFn,
}

impl<I: ?Sized + 'static> Clone for Evidence<I> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<I: ?Sized + 'static> Copy for Evidence<I> {}

/// A runtime handle naming a concrete type claimed to be usable as an item
/// of collections over `I`.
///
/// Equality is by type identity: a raw handle and a typed handle for the
/// same concrete type compare equal.
pub struct ItemType<I: ?Sized + 'static> {
	key: TypeKey,
	evidence: Option<Evidence<I>>,
}

impl<I: ?Sized + 'static> ItemType<I> {
	/// Builds a capability-carrying handle for `T`.
	pub fn of<T>() -> Self
	where
		T: AsItem<I> + FromContainer,
	{
		Self {
			key: TypeKey::of::<T>(),
			evidence: Some(Evidence {
				cast: cast_into::<I, T>,
				produce: produce::<T>,
			}),
		}
	}

	/// Wraps an arbitrary runtime-supplied key with no capability evidence.
	pub fn raw(key: TypeKey) -> Self {
		Self {
			key,
			evidence: None,
		}
	}

	/// Returns the type identity.
	pub fn key(&self) -> TypeKey {
		self.key
	}

	/// Returns the compiler's name for the underlying type.
	pub fn name(&self) -> &'static str {
		self.key.name()
	}

	/// Capability check: whether this handle can stand in for an item of `I`.
	pub fn is_item(&self) -> bool {
		self.evidence.is_some()
	}

	/// Returns the container registration for this type, transient like all
	/// item registrations. `None` without capability evidence.
	pub(crate) fn registration(&self) -> Option<Registration> {
		let evidence = self.evidence.as_ref()?;
		Some(Registration::from_raw(
			self.key,
			Lifetime::Transient,
			evidence.produce,
		))
	}

	/// Casts a container-produced instance into the item type. Hands the
	/// instance back when the concrete type does not match or there is no
	/// evidence.
	pub(crate) fn cast(&self, instance: BoxedInstance) -> Result<Box<I>, BoxedInstance> {
		match &self.evidence {
			Some(evidence) => (evidence.cast)(instance),
			None => Err(instance),
		}
	}
}

impl<I: ?Sized + 'static> Clone for ItemType<I> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<I: ?Sized + 'static> Copy for ItemType<I> {}

impl<I: ?Sized + 'static> PartialEq for ItemType<I> {
	fn eq(&self, other: &Self) -> bool {
		self.key == other.key
	}
}

impl<I: ?Sized + 'static> Eq for ItemType<I> {}

impl<I: ?Sized + 'static> core::fmt::Debug for ItemType<I> {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("ItemType")
			.field("key", &self.key)
			.field("is_item", &self.is_item())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	trait Marker: Send + Sync + 'static {}

	struct Painted;

	impl Marker for Painted {}

	impl<T: Marker> AsItem<dyn Marker> for T {
		fn into_item(self: Box<Self>) -> Box<dyn Marker> {
			self
		}
	}

	impl FromContainer for Painted {
		fn from_container(_: &dyn Container) -> Result<Self, ContainerError> {
			Ok(Self)
		}
	}

	/// Typed handles carry evidence; raw handles do not.
	#[test]
	fn capability_evidence_presence() {
		let typed = ItemType::<dyn Marker>::of::<Painted>();
		let raw = ItemType::<dyn Marker>::raw(TypeKey::of::<Painted>());
		assert!(typed.is_item());
		assert!(!raw.is_item());
	}

	/// Equality is by type identity only.
	#[test]
	fn equality_ignores_evidence() {
		let typed = ItemType::<dyn Marker>::of::<Painted>();
		let raw = ItemType::<dyn Marker>::raw(TypeKey::of::<Painted>());
		assert_eq!(typed, raw);
	}
}
