use core::any::Any;

use crate::info::Typed;
use crate::registry::{TypeMeta, TypeRegistry};

/// A piece of per-type data stored in a [`TypeMeta`].
///
/// Type traits usually hold function pointers that recover a capability
/// (a trait object) from a type-erased [`Value`](crate::Value).
pub trait TypeTrait: Any + Send + Sync {}

/// Creates a [`TypeTrait`] for the type `T`.
pub trait FromType<T> {
    fn from_type() -> Self;
}

/// Types that can produce their own [`TypeMeta`].
pub trait GetTypeMeta: Typed {
    /// Returns the meta for this type, including its type traits.
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>()
    }

    /// Registers the types this type is made of.
    ///
    /// Called once, after this type's own meta has been inserted.
    fn register_dependencies(_registry: &mut TypeRegistry) {}
}
