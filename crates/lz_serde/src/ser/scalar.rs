use lz_reflect::Value;
use lz_reflect::ops::ValueRef;

use crate::{Output, SerializeError, SerializerProvider, ValueSerializer};

/// Writes scalars through their own `serde` implementation.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScalarSerializer;

impl ValueSerializer for ScalarSerializer {
    fn serialize(
        &self,
        value: &dyn Value,
        out: Output<'_>,
        provider: &SerializerProvider<'_>,
    ) -> Result<(), SerializeError> {
        let Some(value) = provider.resolve(value)? else {
            return provider.default_serialize_null(out);
        };
        match value.reflect_ref() {
            ValueRef::Scalar(scalar) => out.write(scalar),
            _ => Err(SerializeError::unsupported(self.name(), value)),
        }
    }

    fn name(&self) -> &'static str {
        "ScalarSerializer"
    }
}
