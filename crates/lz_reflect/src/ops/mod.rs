//! Runtime views over the contents of a [`Value`](crate::Value).

use alloc::boxed::Box;

use crate::{Deferred, Value};

// -----------------------------------------------------------------------------
// ValueRef

/// A borrowed view of a value, by kind.
pub enum ValueRef<'a> {
    /// Serialized through its own `serde` implementation.
    Scalar(&'a dyn erased_serde::Serialize),
    List(&'a dyn List),
    Map(&'a dyn Map),
    Struct(&'a dyn Struct),
    Option(Option<&'a dyn Value>),
    /// Contents are produced on first access.
    Deferred(&'a dyn Deferred),
    /// No inspectable contents.
    Opaque,
}

impl ValueRef<'_> {
    /// Returns `true` for `Option(None)`.
    #[inline]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::Option(None))
    }
}

// -----------------------------------------------------------------------------
// Containers

/// An ordered sequence of values.
pub trait List {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &dyn Value> + '_>;
}

/// A key-value container.
pub trait Map {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (&dyn Value, &dyn Value)> + '_>;
}

/// A struct with named fields.
pub trait Struct {
    /// Returns the field with the given name.
    fn field(&self, name: &str) -> Option<&dyn Value>;

    /// Returns the field at the given declaration index.
    fn field_at(&self, index: usize) -> Option<&dyn Value>;

    fn field_len(&self) -> usize;
}
