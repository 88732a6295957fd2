//! Runtime type information for values that travel through `lz_serde`.
//!
//! A [`Value`] is a type-erased, `'static` value that can describe its shape
//! through [`ValueRef`](ops::ValueRef). Static descriptions live in
//! [`TypeInfo`](info::TypeInfo), and the [`TypeRegistry`](registry::TypeRegistry)
//! stores one [`TypeMeta`](registry::TypeMeta) per registered type together
//! with its type traits.
//!
//! Structs are described with [`impl_struct!`]:
//!
//! ```
//! use lz_reflect::{Value, impl_struct, ops::ValueRef, registry::TypeRegistry};
//!
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! impl_struct! {
//!     Point {
//!         x: i32,
//!         y: i32,
//!     }
//! }
//!
//! let mut registry = TypeRegistry::new();
//! registry.register::<Point>();
//!
//! let point = Point { x: 1, y: 2 };
//! let value: &dyn Value = &point;
//! let ValueRef::Struct(s) = value.reflect_ref() else { unreachable!() };
//! assert_eq!(s.field_len(), 2);
//! assert!(s.field("y").unwrap().downcast_ref::<i32>() == Some(&2));
//! ```
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod macros;
mod value;

pub mod impls;
pub mod info;
pub mod ops;
pub mod registry;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use value::{Deferred, ResolveError, Value};
