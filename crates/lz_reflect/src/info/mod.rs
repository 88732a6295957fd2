//! Static descriptions of reflected types.

// -----------------------------------------------------------------------------
// Modules

mod attributes;
mod field_info;
mod ty;
mod type_info;
mod typed;

// -----------------------------------------------------------------------------
// Exports

pub use attributes::CustomAttributes;
pub use field_info::FieldInfo;
pub use ty::Type;
pub use type_info::{
    ListInfo, MapInfo, OpaqueInfo, OptionInfo, ScalarInfo, StructInfo, TypeInfo, TypeKind,
};
pub use typed::Typed;
