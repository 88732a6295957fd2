use alloc::sync::Arc;
use core::any::{Any, TypeId};

use crate::info::{CustomAttributes, Type};

/// Describes one named field of a struct.
///
/// Serializers receive the `FieldInfo` of the property they are bound to
/// during contextualization; its attributes carry property-level metadata.
#[derive(Clone, Debug)]
pub struct FieldInfo {
    name: &'static str,
    ty: Type,
    index: usize,
    attributes: Arc<CustomAttributes>,
}

impl FieldInfo {
    /// Creates a field of type `T` without attributes.
    pub fn new<T: 'static>(name: &'static str) -> Self {
        Self {
            name,
            ty: Type::of::<T>(),
            index: 0,
            attributes: Arc::new(CustomAttributes::new()),
        }
    }

    /// Replaces the attributes of this field.
    pub fn with_custom_attributes(self, attributes: CustomAttributes) -> Self {
        Self {
            attributes: Arc::new(attributes),
            ..self
        }
    }

    pub(crate) fn with_index(self, index: usize) -> Self {
        Self { index, ..self }
    }

    #[inline(always)]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The declared type of the field.
    #[inline(always)]
    pub const fn ty(&self) -> Type {
        self.ty
    }

    #[inline(always)]
    pub const fn type_id(&self) -> TypeId {
        self.ty.id()
    }

    #[inline(always)]
    pub const fn type_path(&self) -> &'static str {
        self.ty.path()
    }

    /// Position of the field in declaration order.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn custom_attributes(&self) -> &CustomAttributes {
        &self.attributes
    }

    /// Returns the attribute of type `T`, if present.
    #[inline]
    pub fn get_attribute<T: Any>(&self) -> Option<&T> {
        self.attributes.get::<T>()
    }

    /// Returns `true` if it contains the given attribute type.
    #[inline]
    pub fn has_attribute<T: Any>(&self) -> bool {
        self.attributes.contains::<T>()
    }
}
