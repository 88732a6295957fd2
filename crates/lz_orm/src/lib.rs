//! Lazy-aware serialization of persistence-layer values.
//!
//! [`OrmModule`] plugs three adapters into an
//! [`ObjectMapper`](lz_serde::ObjectMapper):
//!
//! - [`OrmSerializerModifier`] wraps every collection and map serializer in a
//!   [`PersistentCollectionSerializer`]. Bound to a lazily fetched property,
//!   the wrapper writes uninitialized collections as null instead of loading
//!   them. Bound to anything else, it steps aside for the serializer it wraps.
//! - [`OrmSerializers`] serializes types registered as
//!   [`EntityProxy`](lz_persist::EntityProxy) with a [`ProxySerializer`],
//!   which writes uninitialized proxies as null or as their identifier.
//! - [`TransientFilter`] drops fields marked
//!   [`Transient`](lz_persist::annotation::Transient).
//!
//! ```
//! use lz_orm::{Features, OrmModule};
//! use lz_persist::annotation::OneToMany;
//! use lz_persist::{PersistentBag, Session};
//! use lz_reflect::impl_struct;
//! use lz_serde::ObjectMapper;
//!
//! struct Order {
//!     id: u32,
//!     items: PersistentBag<String>,
//! }
//!
//! impl_struct! {
//!     Order {
//!         id: u32,
//!         #[attr(OneToMany::LAZY)]
//!         items: PersistentBag<String>,
//!     }
//! }
//!
//! let session = Session::open();
//! let order = Order {
//!     id: 1,
//!     items: PersistentBag::uninitialized("Order.items", &session, || Ok(Some(vec!["tea".into()]))),
//! };
//!
//! let mapper = ObjectMapper::builder()
//!     .register::<Order>()
//!     .module(OrmModule::new())
//!     .build()
//!     .unwrap();
//! let json = serde_json::to_string(&mapper.driver(&order)).unwrap();
//! assert_eq!(json, r#"{"id":1,"items":null}"#);
//! assert_eq!(session.fetch_count(), 0);
//!
//! let mapper = ObjectMapper::builder()
//!     .register::<Order>()
//!     .module(OrmModule::new().enable(Features::FORCE_LAZY_LOADING))
//!     .build()
//!     .unwrap();
//! let json = serde_json::to_string(&mapper.driver(&order)).unwrap();
//! assert_eq!(json, r#"{"id":1,"items":["tea"]}"#);
//! assert_eq!(session.fetch_count(), 1);
//! ```
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod collection;
mod config;
mod module;
mod proxy;

// -----------------------------------------------------------------------------
// Exports

pub use collection::{OrmSerializerModifier, PersistentCollectionSerializer};
pub use config::{Features, OrmConfig};
pub use module::{OrmModule, TransientFilter};
pub use proxy::{OrmSerializers, ProxySerializer};

#[cfg(test)]
mod fixtures;
