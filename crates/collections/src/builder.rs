//! The collection builder core: configuration, sealing, creation, queries.
//!
//! # Role
//!
//! Two-phase lifecycle over a type list: freely mutable while configuring,
//! sealed exactly once on first use. One mutex guards both configuration
//! mutation and the seal transition; both share it so the last completed
//! `configure` happens-before the seal. The sealed sequence
//! publishes through an [`ArcSwapOption`] and is read lock-free afterwards.
//!
//! # Invariants
//!
//! - The sealed sequence never changes once published.
//! - Capability checks complete before the first container registration, so
//!   a failed seal registers nothing.
//! - Every creation call resolves fresh instances in sealed order.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use tessera_container::{
	BoxedInstance, Container, ContainerError, Lifetime, Registration, TypeKey,
};

use crate::collection::{Constructor, FromItems};
use crate::error::CollectionError;
use crate::item::{AsItem, ItemType};
use crate::list::TypeList;

/// Ordering/filtering hook consulted exactly once at sealing. The hook may
/// reorder, drop, or add entries; its output is what seals.
pub type OrderingHook<I> = Box<dyn Fn(Vec<ItemType<I>>) -> Vec<ItemType<I>> + Send + Sync>;

/// The immutable sealed sequence of item types.
pub struct SealedTypes<I: ?Sized + 'static> {
	types: Box<[ItemType<I>]>,
}

impl<I: ?Sized + 'static> SealedTypes<I> {
	fn new(types: Vec<ItemType<I>>) -> Self {
		Self {
			types: types.into_boxed_slice(),
		}
	}

	/// Sealed handles in final order.
	pub fn types(&self) -> &[ItemType<I>] {
		&self.types
	}

	/// Number of sealed types.
	pub fn len(&self) -> usize {
		self.types.len()
	}

	/// Returns true when nothing sealed.
	pub fn is_empty(&self) -> bool {
		self.types.is_empty()
	}
}

/// Per-builder policy fixed at construction: the container lifetime of the
/// produced collection, the sealing-time ordering hook, and the construction
/// strategy.
pub struct CollectionOptions<C, I: ?Sized + 'static> {
	lifetime: Lifetime,
	ordering: OrderingHook<I>,
	constructor: Constructor<C, I>,
}

impl<C, I: ?Sized + 'static> CollectionOptions<C, I> {
	/// Options with a constructor synthesized from [`FromItems`].
	pub fn new() -> Self
	where
		C: FromItems<I>,
	{
		Self::with(Constructor::Synthesized(C::from_items))
	}

	/// Options with a caller-supplied construction override.
	pub fn with_constructor(
		constructor: impl Fn(Vec<Box<I>>) -> C + Send + Sync + 'static,
	) -> Self {
		Self::with(Constructor::Custom(Box::new(constructor)))
	}

	/// Options with no construction path: `create_collection` will fail with
	/// [`CollectionError::ConstructionUnavailable`]. Item creation still
	/// works.
	pub fn without_constructor() -> Self {
		Self::with(Constructor::Unavailable)
	}

	fn with(constructor: Constructor<C, I>) -> Self {
		Self {
			lifetime: Lifetime::Transient,
			ordering: Box::new(|types| types),
			constructor,
		}
	}

	/// Sets the container lifetime for the collection registration.
	pub fn lifetime(mut self, lifetime: Lifetime) -> Self {
		self.lifetime = lifetime;
		self
	}

	/// Replaces the identity ordering hook.
	pub fn ordered_by(
		mut self,
		hook: impl Fn(Vec<ItemType<I>>) -> Vec<ItemType<I>> + Send + Sync + 'static,
	) -> Self {
		self.ordering = Box::new(hook);
		self
	}
}

impl<C: FromItems<I>, I: ?Sized + 'static> Default for CollectionOptions<C, I> {
	fn default() -> Self {
		Self::new()
	}
}

/// Builder for one collection type `C` over item type `I`.
///
/// Constructed with [`CollectionBuilder::register`], which attaches the
/// builder to a container; all further calls go through the returned shared
/// handle.
pub struct CollectionBuilder<C, I: ?Sized + 'static> {
	container: Arc<dyn Container>,
	collection: TypeKey,
	list: Mutex<TypeList<I>>,
	sealed: ArcSwapOption<SealedTypes<I>>,
	lifetime: Lifetime,
	ordering: OrderingHook<I>,
	constructor: Constructor<C, I>,
}

impl<C, I: ?Sized + 'static> std::fmt::Debug for CollectionBuilder<C, I> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CollectionBuilder")
			.field("collection", &self.collection)
			.field("lifetime", &self.lifetime)
			.field("sealed", &self.sealed.load().is_some())
			.finish_non_exhaustive()
	}
}

impl<C, I> CollectionBuilder<C, I>
where
	C: Send + Sync + 'static,
	I: ?Sized + 'static,
{
	/// Attaches a new builder to `container` and registers the collection
	/// factory under the declared lifetime.
	///
	/// Resolving `C` from the container afterwards runs
	/// [`Self::create_collection`] on this builder. The container keeps only
	/// a weak reference back, so dropping the builder turns later
	/// resolutions into construction errors instead of leaking the cycle.
	///
	/// Fails with [`CollectionError::DuplicateCollectionRegistration`] when
	/// the container already carries a registration for `C`: two builders
	/// must not target one collection type.
	pub fn register(
		container: Arc<dyn Container>,
		options: CollectionOptions<C, I>,
	) -> Result<Arc<Self>, CollectionError> {
		let collection = TypeKey::of::<C>();
		if container.is_registered(collection) {
			return Err(CollectionError::DuplicateCollectionRegistration { collection });
		}

		let CollectionOptions {
			lifetime,
			ordering,
			constructor,
		} = options;

		let builder = Arc::new(Self {
			container: container.clone(),
			collection,
			list: Mutex::new(TypeList::new()),
			sealed: ArcSwapOption::empty(),
			lifetime,
			ordering,
			constructor,
		});

		let weak = Arc::downgrade(&builder);
		container.register(Registration::from_raw(collection, lifetime, move |_| {
			let builder = weak.upgrade().ok_or_else(|| {
				ContainerError::construction(collection, "collection builder was dropped")
			})?;
			builder
				.create_collection()
				.map(|built| Box::new(built) as BoxedInstance)
				.map_err(|err| ContainerError::construction(collection, err))
		}))?;

		tracing::debug!(collection = %collection, %lifetime, "collection builder registered");
		Ok(builder)
	}

	/// Applies `mutator` to the type list under the configuration lock.
	///
	/// The mutator runs against a working copy; a capability violation in
	/// the result rejects the whole mutation and leaves the live list
	/// untouched. A mutation arriving after the seal commits to the live
	/// list first and then fails with
	/// [`CollectionError::ConfigurationAfterSeal`]; the sealed sequence is
	/// unaffected, but [`Self::has`] sees the addition. That asymmetry is
	/// intended; see [`Self::has`].
	pub fn configure(&self, mutator: impl FnOnce(&mut TypeList<I>)) -> Result<(), CollectionError> {
		let mut list = self.list.lock();

		let mut working = list.clone();
		mutator(&mut working);
		if let Some(offender) = working.as_slice().iter().find(|ty| !ty.is_item()) {
			return Err(CollectionError::TypeCapabilityViolation {
				ty: offender.key(),
			});
		}
		*list = working;

		if self.sealed.load().is_some() {
			return Err(CollectionError::ConfigurationAfterSeal);
		}
		Ok(())
	}

	/// Membership query against the live configured list.
	///
	/// Works in both states and never triggers sealing. Fails with
	/// [`CollectionError::TypeCapabilityViolation`] when the handle carries
	/// no capability evidence, regardless of presence.
	///
	/// Post-seal this still reads the live list, not the sealed sequence, so
	/// a positive answer does not imply the type is resolvable.
	pub fn has(&self, ty: &ItemType<I>) -> Result<bool, CollectionError> {
		if !ty.is_item() {
			return Err(CollectionError::TypeCapabilityViolation { ty: ty.key() });
		}
		Ok(self.list.lock().as_slice().contains(ty))
	}

	/// Capability-typed membership query. The bound enforces the capability,
	/// so the call itself cannot violate it.
	pub fn has_type<T: AsItem<I>>(&self) -> bool {
		self.list.lock().contains::<T>()
	}

	/// Read-only view of the current list: the live configured list while
	/// configuring, the sealed sequence afterwards.
	pub fn types(&self) -> Vec<ItemType<I>> {
		match self.sealed.load_full() {
			Some(sealed) => sealed.types().to_vec(),
			None => self.list.lock().as_slice().to_vec(),
		}
	}

	/// Whether the builder has sealed.
	pub fn is_sealed(&self) -> bool {
		self.sealed.load().is_some()
	}

	/// The container lifetime declared for the collection registration.
	pub fn lifetime(&self) -> Lifetime {
		self.lifetime
	}

	/// Seals the builder: runs the ordering hook over the configured list,
	/// capability-checks the result, registers every sealed type with the
	/// container, and publishes the sealed sequence.
	///
	/// Idempotent, including under concurrency: the transition runs at most
	/// once and every caller gets the same published allocation. A failed
	/// seal registers nothing and leaves the builder configuring.
	pub fn seal(&self) -> Result<Arc<SealedTypes<I>>, CollectionError> {
		if let Some(sealed) = self.sealed.load_full() {
			return Ok(sealed);
		}

		// Same lock as `configure`: the winner of this race seals exactly
		// the configuration state it observed.
		let list = self.list.lock();
		if let Some(sealed) = self.sealed.load_full() {
			return Ok(sealed);
		}

		let ordered = (self.ordering)(list.as_slice().to_vec());

		// Collect registrations first so the capability check completes
		// before anything touches the container.
		let mut registrations = Vec::with_capacity(ordered.len());
		for ty in &ordered {
			match ty.registration() {
				Some(registration) => registrations.push(registration),
				None => {
					return Err(CollectionError::TypeCapabilityViolation { ty: ty.key() });
				}
			}
		}
		for registration in registrations {
			self.container.register(registration)?;
		}

		tracing::debug!(
			collection = %self.collection,
			types = ordered.len(),
			"collection sealed"
		);

		let sealed = Arc::new(SealedTypes::new(ordered));
		self.sealed.store(Some(sealed.clone()));
		Ok(sealed)
	}

	/// Resolves one fresh instance per sealed type from the container, in
	/// sealed order. Seals on first call.
	pub fn create_items(&self) -> Result<Vec<Box<I>>, CollectionError> {
		let sealed = self.seal()?;
		let mut items = Vec::with_capacity(sealed.len());
		for ty in sealed.types() {
			let instance = self.container.instantiate(ty.key())?;
			let item = ty
				.cast(instance)
				.map_err(|_| CollectionError::ResolvedWrongType { ty: ty.key() })?;
			items.push(item);
		}
		Ok(items)
	}

	/// Builds a fresh collection from [`Self::create_items`].
	///
	/// Every call produces an independent collection; nothing is cached
	/// here. (A `Singleton` lifetime caches at the container, which is a
	/// different axis.)
	pub fn create_collection(&self) -> Result<C, CollectionError> {
		let items = self.create_items()?;
		self.constructor
			.build(items)
			.ok_or(CollectionError::ConstructionUnavailable {
				collection: self.collection,
			})
	}
}
