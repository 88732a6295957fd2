use alloc::boxed::Box;
use core::any::{Any, TypeId};

use crate::info::Type;
use crate::ops::ValueRef;

// -----------------------------------------------------------------------------
// Value

/// A type-erased value whose shape can be inspected at runtime.
///
/// Usually implemented through [`impl_struct!`](crate::impl_struct) for structs;
/// scalars, collections and options are implemented by this crate.
pub trait Value: Any + Send + Sync {
    /// Returns the concrete type of this value.
    fn reflect_type(&self) -> Type;

    /// Returns a view of this value's contents.
    fn reflect_ref(&self) -> ValueRef<'_>;
}

impl dyn Value {
    /// Returns the [`TypeId`] of the concrete type.
    #[inline]
    pub fn value_type_id(&self) -> TypeId {
        self.reflect_type().id()
    }

    /// Returns `true` if the concrete type is `T`.
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        (self as &dyn Any).is::<T>()
    }

    /// Downcasts to the concrete type.
    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }
}

impl core::fmt::Debug for dyn Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Value")
            .field("type", &self.reflect_type().path())
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Deferred

/// Error returned when a [`Deferred`] value cannot be produced.
pub type ResolveError = Box<dyn core::error::Error + Send + Sync>;

/// A value whose contents are produced on first access.
///
/// Resolving may perform I/O owned by whoever implements this trait; callers
/// must propagate the error unchanged.
pub trait Deferred {
    /// Returns `true` if [`resolve`](Self::resolve) will not do any work.
    fn is_resolved(&self) -> bool;

    /// Produces the underlying value, or `None` if it is absent.
    fn resolve(&self) -> Result<Option<&dyn Value>, ResolveError>;
}
