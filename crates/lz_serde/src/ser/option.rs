use alloc::sync::Arc;

use lz_reflect::Value;
use lz_reflect::info::{FieldInfo, Type};
use lz_reflect::ops::ValueRef;

use crate::{
    ContextualSerializer, Output, SerializeError, SerializerProvider, SharedSerializer,
    TypeSerializer, ValueSerializer,
};

/// Writes `None` as null and `Some` through the serializer of the inner type.
///
/// The inner serializer is bound on contextualization, so it is specialized
/// for the same property as the option itself.
#[derive(Clone, Debug)]
pub struct OptionSerializer {
    some: Type,
    inner: Option<SharedSerializer>,
}

impl OptionSerializer {
    #[inline]
    pub const fn new(some: Type) -> Self {
        Self { some, inner: None }
    }

    /// The serializer used for the inner value, once bound.
    #[inline]
    pub fn inner(&self) -> Option<&SharedSerializer> {
        self.inner.as_ref()
    }

    fn some<'v>(
        &self,
        value: &'v dyn Value,
        provider: &SerializerProvider<'_>,
    ) -> Result<Option<&'v dyn Value>, SerializeError> {
        let Some(value) = provider.resolve(value)? else {
            return Ok(None);
        };
        match value.reflect_ref() {
            ValueRef::Option(inner) => Ok(inner),
            _ => Err(SerializeError::unsupported(self.name(), value)),
        }
    }
}

impl ValueSerializer for OptionSerializer {
    fn serialize(
        &self,
        value: &dyn Value,
        out: Output<'_>,
        provider: &SerializerProvider<'_>,
    ) -> Result<(), SerializeError> {
        match (self.some(value, provider)?, &self.inner) {
            (None, _) => provider.default_serialize_null(out),
            (Some(inner), Some(serializer)) => serializer.serialize(inner, out, provider),
            (Some(inner), None) => provider.serialize_value(inner, out),
        }
    }

    fn serialize_with_type(
        &self,
        value: &dyn Value,
        out: Output<'_>,
        provider: &SerializerProvider<'_>,
        type_ser: &TypeSerializer,
    ) -> Result<(), SerializeError> {
        let Some(inner) = self.some(value, provider)? else {
            return provider.default_serialize_null(out);
        };
        match &self.inner {
            Some(serializer) => serializer.serialize_with_type(inner, out, provider, type_ser),
            None => super::DynamicSerializer.serialize_with_type(inner, out, provider, type_ser),
        }
    }

    fn is_empty(&self, value: &dyn Value, provider: &SerializerProvider<'_>) -> bool {
        match value.reflect_ref() {
            ValueRef::Option(None) => true,
            ValueRef::Option(Some(inner)) => self
                .inner
                .as_ref()
                .is_some_and(|serializer| serializer.is_empty(inner, provider)),
            _ => false,
        }
    }

    fn as_contextual(&self) -> Option<&dyn ContextualSerializer> {
        Some(self)
    }

    fn name(&self) -> &'static str {
        "OptionSerializer"
    }
}

impl ContextualSerializer for OptionSerializer {
    fn create_contextual(
        &self,
        provider: &SerializerProvider<'_>,
        property: Option<&FieldInfo>,
    ) -> Result<Option<SharedSerializer>, SerializeError> {
        let Some(serializer) = provider.find_value_serializer(self.some.id()) else {
            return Ok(None);
        };
        let inner = provider.contextualize(serializer, property)?;
        Ok(Some(Arc::new(Self {
            some: self.some,
            inner: Some(inner),
        })))
    }
}
