//! Injection-container boundary for collection builders.
//!
//! Collection builders talk to a container through the [`Container`] trait:
//! they install [`Registration`]s and resolve instances back out. The crate
//! also ships [`ServiceContainer`], a minimal thread-safe implementation,
//! so the boundary is usable without bringing your own container.

pub mod container;
pub mod error;
pub mod key;
pub mod lifetime;
pub mod registration;

pub use container::{Container, ContainerExt, ServiceContainer};
pub use error::ContainerError;
pub use key::TypeKey;
pub use lifetime::Lifetime;
pub use registration::{BoxedInstance, FromContainer, Registration, SharedInstance};
