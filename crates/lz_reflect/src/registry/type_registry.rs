use alloc::string::String;
use core::any::TypeId;

use lz_utils::TypeIdMap;
use lz_utils::hash::{HashMap, new_map};

use crate::registry::{FromType, GetTypeMeta, TypeMeta, TypeTrait};

// -----------------------------------------------------------------------------
// TypeRegistry

/// A registry of reflected types.
///
/// [Registering](TypeRegistry::register) a type inserts its [`TypeMeta`] and
/// then, once, the metas of the types it depends on.
///
/// # Example
///
/// ```
/// use lz_reflect::registry::TypeRegistry;
///
/// let mut registry = TypeRegistry::empty();
/// registry.register::<Vec<Option<String>>>();
///
/// assert!(registry.contains_type::<Vec<Option<String>>>());
/// assert!(registry.contains_type::<Option<String>>());
/// assert!(registry.contains_type::<String>());
/// ```
pub struct TypeRegistry {
    type_meta_table: TypeIdMap<TypeMeta>,
    type_path_to_id: HashMap<&'static str, TypeId>,
}

impl Default for TypeRegistry {
    /// See [`TypeRegistry::new`].
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Creates an empty [`TypeRegistry`].
    #[inline]
    pub const fn empty() -> Self {
        Self {
            type_meta_table: TypeIdMap::new(),
            type_path_to_id: new_map(),
        }
    }

    /// Creates a type registry with the primitive types registered.
    ///
    /// - `()` `bool` `char`
    /// - `i8 - i128` `isize`
    /// - `u8 - u128` `usize`
    /// - `f32` `f64`
    /// - `String`
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register::<()>();
        registry.register::<bool>();
        registry.register::<char>();
        registry.register::<u8>();
        registry.register::<u16>();
        registry.register::<u32>();
        registry.register::<u64>();
        registry.register::<u128>();
        registry.register::<usize>();
        registry.register::<i8>();
        registry.register::<i16>();
        registry.register::<i32>();
        registry.register::<i64>();
        registry.register::<i128>();
        registry.register::<isize>();
        registry.register::<f32>();
        registry.register::<f64>();
        registry.register::<String>();
        registry
    }

    // Returns `false` without calling `get_type_meta` if the type exists.
    fn register_internal(
        &mut self,
        type_id: TypeId,
        get_type_meta: impl FnOnce() -> TypeMeta,
    ) -> bool {
        let paths = &mut self.type_path_to_id;
        self.type_meta_table.try_insert(type_id, || {
            let meta = get_type_meta();
            paths.insert(meta.type_path(), type_id);
            meta
        })
    }

    /// Registers `T` and its dependencies if it is not registered yet.
    ///
    /// If `T` already exists, neither it nor its dependencies are registered
    /// again, which also ends recursion for self-referencing types.
    pub fn register<T: GetTypeMeta>(&mut self) {
        if self.register_internal(TypeId::of::<T>(), T::get_type_meta) {
            T::register_dependencies(self);
        }
    }

    /// Inserts or **overwrites** a meta. Dependencies are not registered.
    pub fn insert_type_meta(&mut self, type_meta: TypeMeta) {
        self.type_path_to_id
            .insert(type_meta.type_path(), type_meta.type_id());
        self.type_meta_table.insert(type_meta.type_id(), type_meta);
    }

    /// Inserts the type trait `D` for the registered type `T`.
    ///
    /// Returns `false` if `T` is not registered.
    pub fn register_type_trait<T: 'static, D: TypeTrait + FromType<T>>(&mut self) -> bool {
        match self.type_meta_table.get_mut(&TypeId::of::<T>()) {
            Some(meta) => {
                meta.insert_trait(D::from_type());
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.type_meta_table.contains(&type_id)
    }

    #[inline]
    pub fn contains_type<T: 'static>(&self) -> bool {
        self.contains(TypeId::of::<T>())
    }

    #[inline]
    pub fn get(&self, type_id: TypeId) -> Option<&TypeMeta> {
        self.type_meta_table.get(&type_id)
    }

    /// Returns the meta of the type with the given full path.
    pub fn get_with_type_path(&self, type_path: &str) -> Option<&TypeMeta> {
        self.type_path_to_id
            .get(type_path)
            .and_then(|id| self.get(*id))
    }

    /// Returns the type trait `D` of the given type.
    pub fn get_type_trait<D: TypeTrait>(&self, type_id: TypeId) -> Option<&D> {
        self.get(type_id).and_then(TypeMeta::get_trait::<D>)
    }

    /// Iterates over all metas in arbitrary order.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &TypeMeta> {
        self.type_meta_table.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.type_meta_table.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.type_meta_table.is_empty()
    }
}
