use alloc::boxed::Box;
use alloc::sync::Arc;
use core::any::TypeId;

use crate::info::{CustomAttributes, FieldInfo, Type};

// -----------------------------------------------------------------------------
// TypeKind

/// The shape of a reflected type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Scalar,
    List,
    Map,
    Struct,
    Option,
    Opaque,
}

// -----------------------------------------------------------------------------
// TypeInfo

/// Static description of a type.
#[derive(Clone, Debug)]
pub enum TypeInfo {
    Scalar(ScalarInfo),
    List(ListInfo),
    Map(MapInfo),
    Struct(StructInfo),
    Option(OptionInfo),
    Opaque(OpaqueInfo),
}

impl TypeInfo {
    /// Returns the described [`Type`].
    pub const fn ty(&self) -> Type {
        match self {
            Self::Scalar(info) => info.ty,
            Self::List(info) => info.ty,
            Self::Map(info) => info.ty,
            Self::Struct(info) => info.ty,
            Self::Option(info) => info.ty,
            Self::Opaque(info) => info.ty,
        }
    }

    #[inline]
    pub const fn type_id(&self) -> TypeId {
        self.ty().id()
    }

    #[inline]
    pub const fn type_path(&self) -> &'static str {
        self.ty().path()
    }

    pub const fn kind(&self) -> TypeKind {
        match self {
            Self::Scalar(_) => TypeKind::Scalar,
            Self::List(_) => TypeKind::List,
            Self::Map(_) => TypeKind::Map,
            Self::Struct(_) => TypeKind::Struct,
            Self::Option(_) => TypeKind::Option,
            Self::Opaque(_) => TypeKind::Opaque,
        }
    }

    pub const fn as_struct(&self) -> Option<&StructInfo> {
        match self {
            Self::Struct(info) => Some(info),
            _ => None,
        }
    }

    pub const fn as_list(&self) -> Option<&ListInfo> {
        match self {
            Self::List(info) => Some(info),
            _ => None,
        }
    }

    pub const fn as_map(&self) -> Option<&MapInfo> {
        match self {
            Self::Map(info) => Some(info),
            _ => None,
        }
    }

    /// Returns the same description attached to another type.
    ///
    /// Wrapper types that present the shape of their contents, such as lazily
    /// loaded collections, describe themselves this way.
    pub fn retyped(self, ty: Type) -> Self {
        match self {
            Self::Scalar(_) => Self::Scalar(ScalarInfo { ty }),
            Self::List(info) => Self::List(ListInfo { ty, ..info }),
            Self::Map(info) => Self::Map(MapInfo { ty, ..info }),
            Self::Struct(info) => Self::Struct(StructInfo { ty, ..info }),
            Self::Option(info) => Self::Option(OptionInfo { ty, ..info }),
            Self::Opaque(_) => Self::Opaque(OpaqueInfo { ty }),
        }
    }
}

// -----------------------------------------------------------------------------
// Variants

/// A type serialized through its own `serde` implementation.
#[derive(Clone, Debug)]
pub struct ScalarInfo {
    ty: Type,
}

impl ScalarInfo {
    pub fn new<T: 'static>() -> Self {
        Self { ty: Type::of::<T>() }
    }

    #[inline(always)]
    pub const fn ty(&self) -> Type {
        self.ty
    }
}

/// A sequence of items.
#[derive(Clone, Debug)]
pub struct ListInfo {
    ty: Type,
    item: Type,
}

impl ListInfo {
    pub fn new<T: 'static, Item: 'static>() -> Self {
        Self {
            ty: Type::of::<T>(),
            item: Type::of::<Item>(),
        }
    }

    #[inline(always)]
    pub const fn ty(&self) -> Type {
        self.ty
    }

    #[inline(always)]
    pub const fn item(&self) -> Type {
        self.item
    }
}

/// A key-value container.
#[derive(Clone, Debug)]
pub struct MapInfo {
    ty: Type,
    key: Type,
    value: Type,
}

impl MapInfo {
    pub fn new<T: 'static, K: 'static, V: 'static>() -> Self {
        Self {
            ty: Type::of::<T>(),
            key: Type::of::<K>(),
            value: Type::of::<V>(),
        }
    }

    #[inline(always)]
    pub const fn ty(&self) -> Type {
        self.ty
    }

    #[inline(always)]
    pub const fn key(&self) -> Type {
        self.key
    }

    #[inline(always)]
    pub const fn value(&self) -> Type {
        self.value
    }
}

/// A struct with named fields.
#[derive(Clone, Debug)]
pub struct StructInfo {
    ty: Type,
    fields: Arc<[FieldInfo]>,
    attributes: Arc<CustomAttributes>,
}

impl StructInfo {
    /// Creates the description of `T`; field indices follow iteration order.
    pub fn new<T: 'static>(fields: impl IntoIterator<Item = FieldInfo>) -> Self {
        let fields: Box<[FieldInfo]> = fields
            .into_iter()
            .enumerate()
            .map(|(index, field)| field.with_index(index))
            .collect();
        Self {
            ty: Type::of::<T>(),
            fields: Arc::from(fields),
            attributes: Arc::new(CustomAttributes::new()),
        }
    }

    /// Replaces the type-level attributes.
    pub fn with_custom_attributes(self, attributes: CustomAttributes) -> Self {
        Self {
            attributes: Arc::new(attributes),
            ..self
        }
    }

    #[inline(always)]
    pub const fn ty(&self) -> Type {
        self.ty
    }

    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|field| field.name() == name)
    }

    pub fn field_at(&self, index: usize) -> Option<&FieldInfo> {
        self.fields.get(index)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &FieldInfo> {
        self.fields.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[inline]
    pub fn custom_attributes(&self) -> &CustomAttributes {
        &self.attributes
    }
}

/// An optional value.
#[derive(Clone, Debug)]
pub struct OptionInfo {
    ty: Type,
    some: Type,
}

impl OptionInfo {
    pub fn new<T: 'static, Inner: 'static>() -> Self {
        Self {
            ty: Type::of::<T>(),
            some: Type::of::<Inner>(),
        }
    }

    #[inline(always)]
    pub const fn ty(&self) -> Type {
        self.ty
    }

    #[inline(always)]
    pub const fn some(&self) -> Type {
        self.some
    }
}

/// A type whose shape is only known at runtime, through its value.
#[derive(Clone, Debug)]
pub struct OpaqueInfo {
    ty: Type,
}

impl OpaqueInfo {
    pub fn new<T: 'static>() -> Self {
        Self { ty: Type::of::<T>() }
    }

    #[inline(always)]
    pub const fn ty(&self) -> Type {
        self.ty
    }
}
