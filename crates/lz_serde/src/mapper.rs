use alloc::boxed::Box;
use alloc::string::ToString;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::TypeId;

use serde_core::{Serialize, Serializer};

use lz_reflect::Value;
use lz_reflect::info::{StructInfo, TypeInfo};
use lz_reflect::registry::{GetTypeMeta, TypeMeta, TypeRegistry};
use lz_utils::TypeIdMap;

use crate::ser::{
    CollectionSerializer, DynamicSerializer, MapSerializer, OptionSerializer, PropertyWriter,
    ScalarSerializer, StructSerializer,
};
use crate::{
    Bound, Inclusion, Module, PropertyFilter, SerializeConfig, SerializeError, SerializerModifier,
    SerializerProvider, Serializers, SetupContext, SharedSerializer, TypeSerializer,
};

// -----------------------------------------------------------------------------
// ObjectMapperBuilder

/// Collects types, settings and modules, then builds an [`ObjectMapper`].
pub struct ObjectMapperBuilder {
    registry: TypeRegistry,
    config: SerializeConfig,
    serializers: Vec<Box<dyn Serializers>>,
    modifiers: Vec<Box<dyn SerializerModifier>>,
    filters: Vec<Box<dyn PropertyFilter>>,
}

impl Default for ObjectMapperBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectMapperBuilder {
    /// Creates a builder whose registry already holds the primitive types.
    pub fn new() -> Self {
        Self {
            registry: TypeRegistry::new(),
            config: SerializeConfig::new(),
            serializers: Vec::new(),
            modifiers: Vec::new(),
            filters: Vec::new(),
        }
    }

    /// Registers `T` and the types it is made of.
    pub fn register<T: GetTypeMeta>(mut self) -> Self {
        self.registry.register::<T>();
        self
    }

    #[inline]
    pub fn registry_mut(&mut self) -> &mut TypeRegistry {
        &mut self.registry
    }

    pub fn config(mut self, config: SerializeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn inclusion(mut self, inclusion: Inclusion) -> Self {
        self.config.inclusion = inclusion;
        self
    }

    /// Installs the hooks of `module`.
    pub fn module<M: Module>(mut self, module: M) -> Self {
        log::debug!("registering serialization module `{}`", module.name());
        let mut context = SetupContext {
            registry: &mut self.registry,
            serializers: &mut self.serializers,
            modifiers: &mut self.modifiers,
            filters: &mut self.filters,
        };
        module.setup(&mut context);
        self
    }

    /// Creates the serializers of every registered type.
    ///
    /// Types claimed by a [`Serializers`] lookup use that serializer as is.
    /// Other types get the default serializer of their kind, passed through
    /// the modifiers. Struct properties are contextualized against their
    /// fields, and the root serializers are finally contextualized without a
    /// property.
    pub fn build(self) -> Result<ObjectMapper, SerializeError> {
        let Self {
            registry,
            config,
            serializers,
            modifiers,
            filters,
        } = self;

        let mut built = TypeIdMap::<SharedSerializer>::with_capacity(registry.len());
        let mut structs = Vec::new();

        for meta in registry.iter() {
            if let Some(serializer) = serializers.iter().rev().find_map(|s| s.find_serializer(meta)) {
                built.insert(meta.type_id(), serializer);
                continue;
            }
            let serializer: SharedSerializer = match meta.type_info() {
                TypeInfo::Scalar(_) => Arc::new(ScalarSerializer),
                TypeInfo::List(_) => modifiers.iter().fold(
                    Arc::new(CollectionSerializer::new()) as SharedSerializer,
                    |serializer, m| m.modify_collection_serializer(meta, serializer),
                ),
                TypeInfo::Map(_) => modifiers.iter().fold(
                    Arc::new(MapSerializer) as SharedSerializer,
                    |serializer, m| m.modify_map_serializer(meta, serializer),
                ),
                TypeInfo::Option(info) => Arc::new(OptionSerializer::new(info.some())),
                TypeInfo::Struct(info) => {
                    structs.push((meta, info));
                    continue;
                }
                TypeInfo::Opaque(_) => {
                    log::trace!("no default serializer for opaque type `{}`", meta.type_path());
                    continue;
                }
            };
            built.insert(meta.type_id(), serializer);
        }

        let mut struct_serializers = Vec::with_capacity(structs.len());
        {
            let provider = SerializerProvider::new(&registry, &config, &built);
            for (meta, info) in structs {
                let serializer = build_struct(&provider, &filters, info)?;
                let serializer = modifiers
                    .iter()
                    .fold(serializer, |serializer, m| m.modify_serializer(meta, serializer));
                struct_serializers.push((meta.type_id(), serializer));
            }
        }
        built.extend(struct_serializers);

        let mut roots = TypeIdMap::with_capacity(built.len());
        {
            let provider = SerializerProvider::new(&registry, &config, &built);
            for (type_id, serializer) in built.iter() {
                roots.insert(*type_id, provider.contextualize(serializer, None)?);
            }
        }

        log::debug!("built {} root serializers", roots.len());

        Ok(ObjectMapper {
            registry,
            config,
            serializers: roots,
        })
    }
}

fn build_struct(
    provider: &SerializerProvider<'_>,
    filters: &[Box<dyn PropertyFilter>],
    info: &StructInfo,
) -> Result<SharedSerializer, SerializeError> {
    let mut properties = Vec::with_capacity(info.len());
    for field in info.iter() {
        if filters.iter().any(|f| f.exclude(field)) {
            log::trace!("property `{}.{}` filtered out", info.ty().name(), field.name());
            continue;
        }
        let serializer = match provider.find_value_serializer(field.type_id()) {
            Some(serializer) => provider.contextualize(serializer, Some(field))?,
            None => Arc::new(DynamicSerializer) as SharedSerializer,
        };
        properties.push(PropertyWriter::new(field.clone(), serializer));
    }
    Ok(Arc::new(StructSerializer::new(info.ty(), properties)))
}

// -----------------------------------------------------------------------------
// ObjectMapper

/// Serializes registered values into any `serde` data format.
///
/// # Examples
///
/// ```
/// use lz_serde::ObjectMapper;
///
/// let mapper = ObjectMapper::builder().register::<Vec<u32>>().build().unwrap();
///
/// let mut out = Vec::new();
/// mapper
///     .serialize(&vec![1_u32, 2, 3], &mut serde_json::Serializer::new(&mut out))
///     .unwrap();
/// assert_eq!(out, b"[1,2,3]");
/// ```
pub struct ObjectMapper {
    registry: TypeRegistry,
    config: SerializeConfig,
    serializers: TypeIdMap<SharedSerializer>,
}

impl ObjectMapper {
    #[inline]
    pub fn builder() -> ObjectMapperBuilder {
        ObjectMapperBuilder::new()
    }

    #[inline]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    #[inline]
    pub fn config(&self) -> &SerializeConfig {
        &self.config
    }

    #[inline]
    pub fn type_meta(&self, type_id: TypeId) -> Option<&TypeMeta> {
        self.registry.get(type_id)
    }

    /// Returns the root serializer of `type_id`.
    #[inline]
    pub fn root_serializer(&self, type_id: TypeId) -> Option<&SharedSerializer> {
        self.serializers.get(&type_id)
    }

    /// Creates the context of a new serialization pass.
    #[inline]
    pub fn provider(&self) -> SerializerProvider<'_> {
        SerializerProvider::new(&self.registry, &self.config, &self.serializers)
    }

    /// Serializes `value` into `serializer`.
    ///
    /// Errors raised by serializers, including errors of deferred values, are
    /// returned as they were raised. Errors of the data format itself are
    /// returned as [`SerializeError::Format`].
    pub fn serialize<S: Serializer>(&self, value: &dyn Value, serializer: S) -> Result<S::Ok, SerializeError> {
        self.run(value, None, serializer)
    }

    /// Like [`serialize`](Self::serialize), with the type of the root value
    /// written by `type_ser`.
    pub fn serialize_with_type<S: Serializer>(
        &self,
        value: &dyn Value,
        type_ser: &TypeSerializer,
        serializer: S,
    ) -> Result<S::Ok, SerializeError> {
        self.run(value, Some(type_ser), serializer)
    }

    /// Returns a [`Serialize`] view of `value`, for use with `serde` APIs
    /// such as `serde_json::to_string`.
    ///
    /// Errors are reported through the data format's error type.
    #[inline]
    pub fn driver<'a>(&'a self, value: &'a dyn Value) -> SerializeDriver<'a> {
        SerializeDriver {
            mapper: self,
            value,
            type_ser: None,
        }
    }

    fn run<S: Serializer>(
        &self,
        value: &dyn Value,
        type_ser: Option<&TypeSerializer>,
        serializer: S,
    ) -> Result<S::Ok, SerializeError> {
        let provider = self.provider();
        write_root(&provider, value, type_ser, serializer).map_err(|err| {
            provider
                .take_failure()
                .unwrap_or_else(|| SerializeError::Format(err.to_string()))
        })
    }
}

fn write_root<S: Serializer>(
    provider: &SerializerProvider<'_>,
    value: &dyn Value,
    type_ser: Option<&TypeSerializer>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let root = Bound::new(&DynamicSerializer, value, provider);
    match type_ser {
        Some(type_ser) => root.with_type(type_ser).serialize(serializer),
        None => root.serialize(serializer),
    }
}

// -----------------------------------------------------------------------------
// SerializeDriver

/// A value paired with an [`ObjectMapper`], serializable with `serde`.
pub struct SerializeDriver<'a> {
    mapper: &'a ObjectMapper,
    value: &'a dyn Value,
    type_ser: Option<&'a TypeSerializer>,
}

impl<'a> SerializeDriver<'a> {
    /// Writes the type of the value with `type_ser`.
    #[inline]
    pub fn with_type(self, type_ser: &'a TypeSerializer) -> Self {
        Self {
            type_ser: Some(type_ser),
            ..self
        }
    }
}

impl Serialize for SerializeDriver<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let provider = self.mapper.provider();
        write_root(&provider, self.value, self.type_ser, serializer)
    }
}
