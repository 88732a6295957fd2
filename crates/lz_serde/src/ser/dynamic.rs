use lz_reflect::Value;

use crate::{Output, SerializeError, SerializerProvider, TypeSerializer, ValueSerializer};

/// Dispatches on the runtime type of the value.
///
/// Used for elements, map values and properties whose declared type has no
/// serializer of its own at build time.
#[derive(Clone, Copy, Debug, Default)]
pub struct DynamicSerializer;

impl ValueSerializer for DynamicSerializer {
    fn serialize(
        &self,
        value: &dyn Value,
        out: Output<'_>,
        provider: &SerializerProvider<'_>,
    ) -> Result<(), SerializeError> {
        provider.serialize_value(value, out)
    }

    fn serialize_with_type(
        &self,
        value: &dyn Value,
        out: Output<'_>,
        provider: &SerializerProvider<'_>,
        type_ser: &TypeSerializer,
    ) -> Result<(), SerializeError> {
        match provider.lookup(value)? {
            Some((value, serializer)) => serializer.serialize_with_type(value, out, provider, type_ser),
            None => provider.default_serialize_null(out),
        }
    }

    fn is_empty(&self, value: &dyn Value, provider: &SerializerProvider<'_>) -> bool {
        provider
            .find_value_serializer(value.value_type_id())
            .is_some_and(|serializer| serializer.is_empty(value, provider))
    }

    fn name(&self) -> &'static str {
        "DynamicSerializer"
    }
}
