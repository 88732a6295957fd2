use alloc::boxed::Box;
use core::any::{Any, TypeId};

use lz_utils::TypeIdMap;

use crate::info::{Type, TypeInfo, TypeKind, Typed};
use crate::registry::TypeTrait;

// -----------------------------------------------------------------------------
// TypeMeta

/// Runtime storage for one registered type: its [`TypeInfo`] and a
/// [`TypeTrait`] table.
///
/// # Example
///
/// ```
/// use lz_reflect::registry::{TypeMeta, TypeTrait};
///
/// struct Marker;
/// impl TypeTrait for Marker {}
///
/// let mut meta = TypeMeta::of::<String>();
/// meta.insert_trait(Marker);
/// assert!(meta.has_trait::<Marker>());
/// ```
pub struct TypeMeta {
    type_info: TypeInfo,
    trait_table: TypeIdMap<Box<dyn TypeTrait>>,
}

impl TypeMeta {
    /// Creates a meta without type traits.
    #[inline]
    pub fn of<T: Typed>() -> Self {
        Self::from_info(T::type_info())
    }

    #[inline]
    pub fn from_info(type_info: TypeInfo) -> Self {
        Self {
            type_info,
            trait_table: TypeIdMap::new(),
        }
    }

    #[inline(always)]
    pub const fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }

    #[inline]
    pub const fn ty(&self) -> Type {
        self.type_info.ty()
    }

    #[inline]
    pub const fn type_id(&self) -> TypeId {
        self.type_info.type_id()
    }

    #[inline]
    pub const fn type_path(&self) -> &'static str {
        self.type_info.type_path()
    }

    #[inline]
    pub const fn kind(&self) -> TypeKind {
        self.type_info.kind()
    }

    /// Inserts a type trait, overwriting one of the same type.
    pub fn insert_trait<T: TypeTrait>(&mut self, data: T) {
        self.trait_table.insert(TypeId::of::<T>(), Box::new(data));
    }

    /// Returns the type trait `T`, if present.
    pub fn get_trait<T: TypeTrait>(&self) -> Option<&T> {
        self.trait_table
            .get(&TypeId::of::<T>())
            .and_then(|data| (&**data as &dyn Any).downcast_ref::<T>())
    }

    /// Returns `true` if the type trait `T` is present.
    #[inline]
    pub fn has_trait<T: TypeTrait>(&self) -> bool {
        self.trait_table.contains(&TypeId::of::<T>())
    }

    /// Returns the number of type traits.
    #[inline]
    pub fn trait_len(&self) -> usize {
        self.trait_table.len()
    }
}

impl core::fmt::Debug for TypeMeta {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TypeMeta")
            .field("type_info", &self.type_info)
            .field("trait_len", &self.trait_table.len())
            .finish()
    }
}
