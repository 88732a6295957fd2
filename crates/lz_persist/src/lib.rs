//! The persistence-layer side of lazy serialization.
//!
//! Entities loaded by a persistence session may hold references that are not
//! loaded yet:
//!
//! - [`PersistentCollection`] wraps a collection or map of a relation. It is a
//!   [`LazyHandle`]: it reports whether it was initialized, and loads its
//!   contents through the owning [`Session`] on first access.
//! - [`Proxy`] stands in for a single related entity. It is an
//!   [`EntityProxy`] whose [`LazyInitializer`] knows the entity name and
//!   identifier without loading anything.
//!
//! Both are registered with type traits ([`TypeTraitLazyHandle`],
//! [`TypeTraitProxy`]) so that serializers can recognize them from a
//! type-erased [`Value`](lz_reflect::Value) via [`lazy_handle`] and
//! [`entity_proxy`].
//!
//! Relations are declared with the mapping annotations of [`annotation`],
//! stored as field attributes. [`FetchPolicy::of`] reads them back.

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod collection;
mod error;
mod fetch;
mod mapping;
mod proxy;
mod session;

pub mod annotation;

// -----------------------------------------------------------------------------
// Exports

pub use collection::{
    LazyHandle, PersistentBag, PersistentCollection, PersistentList, PersistentMap, PersistentSet,
    TypeTraitLazyHandle, lazy_handle,
};
pub use error::FetchError;
pub use fetch::{FetchMode, FetchPolicy, RelationKind};
pub use mapping::{EntityMappings, Mapping};
pub use proxy::{Entity, EntityProxy, LazyInitializer, Proxy, TypeTraitProxy, entity_proxy};
pub use session::Session;
