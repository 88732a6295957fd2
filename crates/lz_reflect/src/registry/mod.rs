//! Registration of reflected types and their type traits.

// -----------------------------------------------------------------------------
// Modules

mod type_meta;
mod type_registry;
mod type_trait;

// -----------------------------------------------------------------------------
// Exports

pub use type_meta::TypeMeta;
pub use type_registry::TypeRegistry;
pub use type_trait::{FromType, GetTypeMeta, TypeTrait};
