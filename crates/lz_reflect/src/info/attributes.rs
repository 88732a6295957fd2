use alloc::boxed::Box;
use core::any::{Any, TypeId};

use lz_utils::TypeIdMap;

// -----------------------------------------------------------------------------
// CustomAttributes

/// A collection of custom attributes for a type or field.
///
/// Attributes are stored by their [`TypeId`], so there can only be one
/// attribute per type. Later insertions for the same type overwrite earlier
/// values.
///
/// # Example
///
/// ```
/// use lz_reflect::info::CustomAttributes;
///
/// struct Label(&'static str);
///
/// let attrs = CustomAttributes::new().with_attribute(Label("price"));
/// assert!(attrs.contains::<Label>());
/// assert_eq!(attrs.get::<Label>().unwrap().0, "price");
/// assert!(!attrs.contains::<u32>());
/// ```
#[derive(Default)]
pub struct CustomAttributes {
    attributes: TypeIdMap<Box<dyn Any + Send + Sync>>,
}

impl CustomAttributes {
    /// Creates an empty [`CustomAttributes`].
    #[inline]
    pub const fn new() -> Self {
        Self {
            attributes: TypeIdMap::new(),
        }
    }

    /// Adds an attribute.
    #[inline]
    pub fn with_attribute<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.attributes.insert(TypeId::of::<T>(), Box::new(value));
        self
    }

    /// Returns `true` if an attribute of type `T` is present.
    #[inline]
    pub fn contains<T: Any>(&self) -> bool {
        self.attributes.contains(&TypeId::of::<T>())
    }

    /// Returns the attribute of type `T`, if present.
    #[inline]
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.attributes
            .get(&TypeId::of::<T>())
            .and_then(|attr| attr.downcast_ref::<T>())
    }

    /// Returns the number of stored attributes.
    #[inline]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Returns `true` if no attributes are stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl core::fmt::Debug for CustomAttributes {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CustomAttributes")
            .field("len", &self.attributes.len())
            .finish()
    }
}
