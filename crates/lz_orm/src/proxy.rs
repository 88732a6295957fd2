use alloc::sync::Arc;

use serde_core::ser::SerializeMap;
use serde_core::{Serialize, Serializer};

use lz_persist::{EntityProxy, FetchPolicy, Mapping, TypeTraitProxy, entity_proxy};
use lz_reflect::Value;
use lz_reflect::info::FieldInfo;
use lz_reflect::registry::TypeMeta;
use lz_serde::ser::DynamicSerializer;
use lz_serde::{
    Bound, ContextualSerializer, Output, SerializeError, SerializerProvider, Serializers,
    SharedSerializer, TypeSerializer, ValueSerializer,
};

// -----------------------------------------------------------------------------
// ProxySerializer

/// What a proxy is written as.
enum Proxied<'a> {
    /// Null.
    Absent,
    /// `{name: id}` of an entity that is not loaded.
    Identifier { name: &'a str, id: &'a dyn Value },
    /// The loaded entity.
    Entity(&'a dyn Value),
}

/// Serializes [`EntityProxy`] values.
///
/// Uninitialized proxies are written as null, or as an identifier object
/// when `serialize_identifier` is set, unless loading is forced. Loaded
/// entities are written by the serializer of their runtime type.
#[derive(Clone)]
pub struct ProxySerializer {
    force_lazy_loading: bool,
    force_loading_element_collection: bool,
    serialize_identifier: bool,
    mapping: Option<Arc<dyn Mapping>>,
    property: Option<FieldInfo>,
}

impl ProxySerializer {
    pub fn new(
        force_lazy_loading: bool,
        force_loading_element_collection: bool,
        serialize_identifier: bool,
        mapping: Option<Arc<dyn Mapping>>,
    ) -> Self {
        Self {
            force_lazy_loading,
            force_loading_element_collection,
            serialize_identifier,
            mapping,
            property: None,
        }
    }

    #[inline]
    pub const fn force_lazy_loading(&self) -> bool {
        self.force_lazy_loading
    }

    #[inline]
    pub const fn force_loading_element_collection(&self) -> bool {
        self.force_loading_element_collection
    }

    #[inline]
    pub const fn serialize_identifier(&self) -> bool {
        self.serialize_identifier
    }

    /// The property this serializer is bound to.
    #[inline]
    pub fn property(&self) -> Option<&FieldInfo> {
        self.property.as_ref()
    }

    fn forces_loading(&self) -> bool {
        self.force_lazy_loading
            || (self.force_loading_element_collection
                && FetchPolicy::of_field(self.property.as_ref()).is_element_collection())
    }

    fn proxy<'v>(
        &self,
        value: &'v dyn Value,
        provider: &SerializerProvider<'_>,
    ) -> Result<&'v dyn EntityProxy, SerializeError> {
        entity_proxy(value, provider.registry()).ok_or_else(|| SerializeError::unsupported(self.name(), value))
    }

    fn find_proxied<'a>(&'a self, proxy: &'a dyn EntityProxy) -> Result<Proxied<'a>, SerializeError> {
        let init = proxy.lazy_initializer();
        if self.forces_loading() || !init.is_uninitialized() {
            let entity = init.implementation().map_err(SerializeError::source)?;
            return Ok(Proxied::Entity(entity));
        }
        if !self.serialize_identifier {
            log::trace!("writing uninitialized proxy of `{}` as null", init.entity_name());
            return Ok(Proxied::Absent);
        }

        let entity_name = init.entity_name();
        let name = match &self.mapping {
            Some(mapping) => mapping.identifier_property_name(entity_name),
            None => init
                .session()
                .and_then(|session| session.mapping())
                .and_then(|mapping| mapping.identifier_property_name(entity_name)),
        };
        Ok(Proxied::Identifier {
            name: name.unwrap_or(entity_name),
            id: init.identifier(),
        })
    }

    fn entity_serializer(
        &self,
        entity: &dyn Value,
        provider: &SerializerProvider<'_>,
    ) -> Result<SharedSerializer, SerializeError> {
        let serializer = provider.find_serializer_for(entity)?;
        provider.contextualize(serializer, self.property.as_ref())
    }
}

impl ValueSerializer for ProxySerializer {
    fn serialize(
        &self,
        value: &dyn Value,
        out: Output<'_>,
        provider: &SerializerProvider<'_>,
    ) -> Result<(), SerializeError> {
        let proxy = self.proxy(value, provider)?;
        match self.find_proxied(proxy)? {
            Proxied::Absent => provider.default_serialize_null(out),
            Proxied::Identifier { name, id } => out.write(&Identifier { name, id, provider }),
            Proxied::Entity(entity) => {
                self.entity_serializer(entity, provider)?
                    .serialize(entity, out, provider)
            }
        }
    }

    fn serialize_with_type(
        &self,
        value: &dyn Value,
        out: Output<'_>,
        provider: &SerializerProvider<'_>,
        type_ser: &TypeSerializer,
    ) -> Result<(), SerializeError> {
        let proxy = self.proxy(value, provider)?;
        match self.find_proxied(proxy)? {
            Proxied::Absent => provider.default_serialize_null(out),
            Proxied::Identifier { name, id } => {
                type_ser.write(value, &Identifier { name, id, provider }, out)
            }
            Proxied::Entity(entity) => {
                self.entity_serializer(entity, provider)?
                    .serialize_with_type(entity, out, provider, type_ser)
            }
        }
    }

    fn is_empty(&self, value: &dyn Value, provider: &SerializerProvider<'_>) -> bool {
        entity_proxy(value, provider.registry()).is_some_and(|proxy| {
            proxy.lazy_initializer().is_uninitialized()
                && !self.forces_loading()
                && !self.serialize_identifier
        })
    }

    fn as_contextual(&self) -> Option<&dyn ContextualSerializer> {
        Some(self)
    }

    fn name(&self) -> &'static str {
        "ProxySerializer"
    }
}

impl ContextualSerializer for ProxySerializer {
    fn create_contextual(
        &self,
        _provider: &SerializerProvider<'_>,
        property: Option<&FieldInfo>,
    ) -> Result<Option<SharedSerializer>, SerializeError> {
        Ok(Some(Arc::new(Self {
            property: property.cloned(),
            ..self.clone()
        })))
    }
}

impl core::fmt::Debug for ProxySerializer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProxySerializer")
            .field("force_lazy_loading", &self.force_lazy_loading)
            .field("force_loading_element_collection", &self.force_loading_element_collection)
            .field("serialize_identifier", &self.serialize_identifier)
            .field("mapping", &self.mapping.is_some())
            .field("property", &self.property.as_ref().map(FieldInfo::name))
            .finish()
    }
}

struct Identifier<'a> {
    name: &'a str,
    id: &'a dyn Value,
    provider: &'a SerializerProvider<'a>,
}

impl Serialize for Identifier<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.name, &Bound::new(&DynamicSerializer, self.id, self.provider))?;
        map.end()
    }
}

// -----------------------------------------------------------------------------
// OrmSerializers

/// Serializes every type registered with [`TypeTraitProxy`] with a
/// [`ProxySerializer`].
#[derive(Clone)]
pub struct OrmSerializers {
    force_lazy_loading: bool,
    force_loading_element_collection: bool,
    serialize_identifier: bool,
    mapping: Option<Arc<dyn Mapping>>,
}

impl OrmSerializers {
    pub fn new(
        force_lazy_loading: bool,
        force_loading_element_collection: bool,
        serialize_identifier: bool,
        mapping: Option<Arc<dyn Mapping>>,
    ) -> Self {
        Self {
            force_lazy_loading,
            force_loading_element_collection,
            serialize_identifier,
            mapping,
        }
    }
}

impl Serializers for OrmSerializers {
    fn find_serializer(&self, meta: &TypeMeta) -> Option<SharedSerializer> {
        if !meta.has_trait::<TypeTraitProxy>() {
            return None;
        }
        Some(Arc::new(ProxySerializer::new(
            self.force_lazy_loading,
            self.force_loading_element_collection,
            self.serialize_identifier,
            self.mapping.clone(),
        )))
    }
}
