use tessera_container::{ContainerError, TypeKey};

/// Failures surfaced by collection builder operations.
///
/// All of these are programmer-error conditions: they surface to the
/// immediate caller synchronously and are never retried internally. No
/// variant leaves the builder's durable state partially mutated.
#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
	/// The collection type already had a container registration when this
	/// builder tried to attach.
	#[error("collection `{collection}` is already registered")]
	DuplicateCollectionRegistration { collection: TypeKey },

	/// The type list was mutated after the builder sealed.
	#[error("cannot configure a collection builder after it has sealed")]
	ConfigurationAfterSeal,

	/// A handle without capability evidence reached configuration, a query,
	/// or sealing.
	#[error("type `{ty}` does not satisfy the item capability")]
	TypeCapabilityViolation { ty: TypeKey },

	/// No synthesized constructor exists and no override supplies one.
	#[error("no construction path for collection `{collection}`")]
	ConstructionUnavailable { collection: TypeKey },

	/// The container resolved a sealed type to a different concrete type
	/// than the handle names.
	#[error("container resolved `{ty}` to a different concrete type")]
	ResolvedWrongType { ty: TypeKey },

	/// A container operation failed underneath the builder.
	#[error(transparent)]
	Container(#[from] ContainerError),
}
