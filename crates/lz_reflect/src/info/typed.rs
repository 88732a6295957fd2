use crate::info::TypeInfo;

/// Types with a static [`TypeInfo`].
pub trait Typed: Sized + 'static {
    /// Describes the type.
    fn type_info() -> TypeInfo;
}
