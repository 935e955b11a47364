//! Lifecycle tests: configuration, sealing, creation, queries, and the
//! error paths the builder promises.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use tessera_container::{
	Container, ContainerExt, Lifetime, Registration, ServiceContainer, TypeKey,
};

use super::fixtures::{
	Alpha, Beta, COUNTED_BUILDS, Counted, CountingContainer, Delta, Gamma, Palette, Themed,
	Widget, WidgetCollection,
};
use crate::builder::{CollectionBuilder, CollectionOptions};
use crate::error::CollectionError;
use crate::item::ItemType;

fn widget_builder(
	container: Arc<dyn Container>,
) -> Arc<CollectionBuilder<WidgetCollection, dyn Widget>> {
	CollectionBuilder::register(container, CollectionOptions::new()).unwrap()
}

/// Configured order survives sealing and creation end-to-end under the
/// identity ordering hook.
#[test]
fn creation_preserves_configured_order() {
	let builder = widget_builder(Arc::new(ServiceContainer::new()));
	builder
		.configure(|list| {
			list.append::<Alpha>();
			list.append::<Beta>();
			list.append::<Gamma>();
		})
		.unwrap();

	let collection = builder.create_collection().unwrap();
	assert_eq!(collection.labels(), vec!["alpha", "beta", "gamma"]);
}

/// Each creation call resolves instances at call time and yields an
/// independent collection.
#[test]
fn collections_are_fresh_per_call() {
	let builder = widget_builder(Arc::new(ServiceContainer::new()));
	builder.configure(|list| list.append::<Counted>()).unwrap();

	let before = COUNTED_BUILDS.load(Ordering::SeqCst);
	let first = builder.create_collection().unwrap();
	let second = builder.create_collection().unwrap();
	assert_eq!(first.len(), 1);
	assert_eq!(second.len(), 1);
	assert_eq!(
		COUNTED_BUILDS.load(Ordering::SeqCst) - before,
		2,
		"each creation must re-resolve from the container"
	);
}

/// After the first creation, further configuration fails and neither the
/// sealed sequence nor `types()` changes, but the live list mutation is
/// still visible to `has`.
#[test]
fn post_seal_configuration_is_rejected_but_visible_to_has() {
	let builder = widget_builder(Arc::new(ServiceContainer::new()));
	builder
		.configure(|list| {
			list.append::<Alpha>();
			list.append::<Beta>();
		})
		.unwrap();
	builder.create_collection().unwrap();
	assert!(builder.is_sealed());

	let err = builder
		.configure(|list| list.append::<Delta>())
		.unwrap_err();
	assert!(matches!(err, CollectionError::ConfigurationAfterSeal));

	// The sealed view is untouched...
	let sealed: Vec<_> = builder.types();
	assert_eq!(sealed.len(), 2);
	assert!(!sealed.contains(&ItemType::of::<Delta>()));
	assert_eq!(builder.create_collection().unwrap().labels(), vec![
		"alpha", "beta"
	]);

	// ...while the live list carries the rejected addition.
	assert!(builder.has_type::<Delta>());
	assert!(builder.has(&ItemType::of::<Beta>()).unwrap());
}

/// A handle without capability evidence is rejected at configuration and
/// the list stays unchanged.
#[test]
fn configure_rejects_incapable_types_atomically() {
	let builder = widget_builder(Arc::new(ServiceContainer::new()));
	builder.configure(|list| list.append::<Alpha>()).unwrap();

	let err = builder
		.configure(|list| {
			list.append::<Beta>();
			list.push(ItemType::raw(TypeKey::of::<Palette>()));
		})
		.unwrap_err();
	assert!(matches!(
		err,
		CollectionError::TypeCapabilityViolation { ty } if ty == TypeKey::of::<Palette>()
	));

	// Nothing from the failed mutation landed, including the valid part.
	assert_eq!(builder.types().len(), 1);
	assert!(!builder.has_type::<Beta>());
}

/// `has` rejects incapable handles regardless of presence; the typed form
/// is enforced by its bound instead.
#[test]
fn has_enforces_the_capability() {
	let builder = widget_builder(Arc::new(ServiceContainer::new()));
	builder.configure(|list| list.append::<Alpha>()).unwrap();

	let raw = ItemType::raw(TypeKey::of::<Alpha>());
	let err = builder.has(&raw).unwrap_err();
	assert!(matches!(
		err,
		CollectionError::TypeCapabilityViolation { ty } if ty == TypeKey::of::<Alpha>()
	));

	assert!(builder.has(&ItemType::of::<Alpha>()).unwrap());
	assert!(!builder.has(&ItemType::of::<Beta>()).unwrap());
	assert!(!builder.is_sealed(), "queries must not trigger sealing");
}

/// A second builder for an already-registered collection type is rejected
/// at construction.
#[test]
fn duplicate_collection_registration_is_rejected() {
	let container: Arc<dyn Container> = Arc::new(ServiceContainer::new());
	let _first = widget_builder(container.clone());

	let err = CollectionBuilder::<WidgetCollection, dyn Widget>::register(
		container,
		CollectionOptions::new(),
	)
	.unwrap_err();
	assert!(matches!(
		err,
		CollectionError::DuplicateCollectionRegistration { collection }
			if collection == TypeKey::of::<WidgetCollection>()
	));
}

/// The ordering hook is consulted once at sealing and may reorder and
/// filter; the live list is not rewritten.
#[test]
fn ordering_hook_shapes_the_sealed_sequence() {
	let container: Arc<dyn Container> = Arc::new(ServiceContainer::new());
	let options = CollectionOptions::<WidgetCollection, dyn Widget>::new().ordered_by(|types| {
		let mut types: Vec<_> = types
			.into_iter()
			.filter(|ty| *ty != ItemType::of::<Beta>())
			.collect();
		types.reverse();
		types
	});
	let builder = CollectionBuilder::register(container, options).unwrap();
	builder
		.configure(|list| {
			list.append::<Alpha>();
			list.append::<Beta>();
			list.append::<Gamma>();
		})
		.unwrap();

	let collection = builder.create_collection().unwrap();
	assert_eq!(collection.labels(), vec!["gamma", "alpha"]);

	// Filtered out of the sealed sequence, still configured.
	assert!(!builder.types().contains(&ItemType::of::<Beta>()));
	assert!(builder.has_type::<Beta>());
}

/// A hook that emits an incapable handle fails the seal before any item
/// registration, leaving the builder configuring.
#[test]
fn failed_seal_registers_nothing_and_stays_configuring() {
	let container = Arc::new(CountingContainer::new());
	let options =
		CollectionOptions::<WidgetCollection, dyn Widget>::new().ordered_by(|mut types| {
			types.push(ItemType::raw(TypeKey::of::<Palette>()));
			types
		});
	let builder = CollectionBuilder::register(container.clone() as Arc<dyn Container>, options)
		.unwrap();
	builder.configure(|list| list.append::<Alpha>()).unwrap();

	let err = builder.create_items().unwrap_err();
	assert!(matches!(
		err,
		CollectionError::TypeCapabilityViolation { ty } if ty == TypeKey::of::<Palette>()
	));
	assert!(!builder.is_sealed());
	assert_eq!(container.register_count(TypeKey::of::<Alpha>()), 0);

	// Configuration is still open after the failed seal.
	builder.configure(|list| list.append::<Beta>()).unwrap();
}

/// Without a synthesized constructor or an override, item creation works
/// but collection creation fails.
#[test]
fn missing_constructor_fails_only_collection_creation() {
	let container: Arc<dyn Container> = Arc::new(ServiceContainer::new());
	let builder = CollectionBuilder::<WidgetCollection, dyn Widget>::register(
		container,
		CollectionOptions::without_constructor(),
	)
	.unwrap();
	builder.configure(|list| list.append::<Alpha>()).unwrap();

	assert_eq!(builder.create_items().unwrap().len(), 1);
	let err = builder.create_collection().unwrap_err();
	assert!(matches!(
		err,
		CollectionError::ConstructionUnavailable { collection }
			if collection == TypeKey::of::<WidgetCollection>()
	));
}

/// A construction override replaces the synthesized path.
#[test]
fn constructor_override_is_used() {
	let container: Arc<dyn Container> = Arc::new(ServiceContainer::new());
	let builder = CollectionBuilder::<Vec<&'static str>, dyn Widget>::register(
		container,
		CollectionOptions::with_constructor(|items: Vec<Box<dyn Widget>>| {
			items.iter().map(|widget| widget.label()).collect()
		}),
	)
	.unwrap();
	builder
		.configure(|list| {
			list.append::<Beta>();
			list.append::<Alpha>();
		})
		.unwrap();

	assert_eq!(builder.create_collection().unwrap(), vec!["beta", "alpha"]);
}

/// Item construction pulls dependencies through the container.
#[test]
fn items_resolve_their_dependencies() {
	let container: Arc<dyn Container> = Arc::new(ServiceContainer::new());
	container
		.register(Registration::with_factory(Lifetime::Singleton, |_| {
			Ok(Palette { color: "teal" })
		}))
		.unwrap();

	let builder = widget_builder(container);
	builder.configure(|list| list.append::<Themed>()).unwrap();

	assert_eq!(builder.create_collection().unwrap().labels(), vec!["teal"]);
}

/// Resolving the collection type through the container honors the declared
/// lifetime while direct creation stays fresh.
#[test]
fn container_resolution_honors_collection_lifetime() {
	let container: Arc<dyn Container> = Arc::new(ServiceContainer::new());
	let builder = CollectionBuilder::<WidgetCollection, dyn Widget>::register(
		container.clone(),
		CollectionOptions::new().lifetime(Lifetime::Singleton),
	)
	.unwrap();
	builder.configure(|list| list.append::<Alpha>()).unwrap();

	let first = container.get::<WidgetCollection>().unwrap();
	let second = container.get::<WidgetCollection>().unwrap();
	assert!(
		Arc::ptr_eq(&first, &second),
		"singleton lifetime must share the collection"
	);
	assert_eq!(first.labels(), vec!["alpha"]);

	// The builder's own creation path never caches.
	let direct = builder.create_collection().unwrap();
	assert_eq!(direct.labels(), vec!["alpha"]);
}

/// Dropping the builder turns container resolution of the collection into
/// a construction error rather than a dangling cycle.
#[test]
fn dropped_builder_fails_container_resolution() {
	let container: Arc<dyn Container> = Arc::new(ServiceContainer::new());
	let builder = widget_builder(container.clone());
	builder.configure(|list| list.append::<Alpha>()).unwrap();
	drop(builder);

	assert!(container.get::<WidgetCollection>().is_err());
}

/// An empty configured list seals to an empty collection.
#[test]
fn empty_list_builds_empty_collection() {
	let builder = widget_builder(Arc::new(ServiceContainer::new()));
	let collection = builder.create_collection().unwrap();
	assert_eq!(collection.len(), 0);
	assert!(builder.is_sealed());
}
