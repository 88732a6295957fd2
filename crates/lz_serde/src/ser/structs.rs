use alloc::boxed::Box;

use serde_core::ser::SerializeStruct;
use serde_core::{Serialize, Serializer};

use lz_reflect::Value;
use lz_reflect::info::{FieldInfo, Type};
use lz_reflect::ops::{Struct, ValueRef};

use crate::{
    Bound, Inclusion, Output, SerializeError, SerializerProvider, SharedSerializer, ValueSerializer,
};

// -----------------------------------------------------------------------------
// PropertyWriter

/// A struct field together with the serializer contextualized for it.
#[derive(Clone, Debug)]
pub struct PropertyWriter {
    field: FieldInfo,
    serializer: SharedSerializer,
}

impl PropertyWriter {
    #[inline]
    pub fn new(field: FieldInfo, serializer: SharedSerializer) -> Self {
        Self { field, serializer }
    }

    #[inline]
    pub fn field(&self) -> &FieldInfo {
        &self.field
    }

    #[inline]
    pub fn serializer(&self) -> &SharedSerializer {
        &self.serializer
    }

    fn skip(&self, value: &dyn Value, provider: &SerializerProvider<'_>) -> bool {
        match provider.config().inclusion {
            Inclusion::Always => false,
            Inclusion::NonNull => value.reflect_ref().is_none(),
            Inclusion::NonEmpty => {
                value.reflect_ref().is_none() || self.serializer.is_empty(value, provider)
            }
        }
    }
}

// -----------------------------------------------------------------------------
// StructSerializer

/// Writes structs field by field, in declaration order.
#[derive(Clone, Debug)]
pub struct StructSerializer {
    ty: Type,
    properties: Box<[PropertyWriter]>,
}

impl StructSerializer {
    #[inline]
    pub fn new(ty: Type, properties: impl Into<Box<[PropertyWriter]>>) -> Self {
        Self {
            ty,
            properties: properties.into(),
        }
    }

    #[inline]
    pub fn properties(&self) -> &[PropertyWriter] {
        &self.properties
    }

    /// Returns the writer of the property named `name`.
    pub fn property(&self, name: &str) -> Option<&PropertyWriter> {
        self.properties.iter().find(|p| p.field.name() == name)
    }
}

impl ValueSerializer for StructSerializer {
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
            ValueRef::Struct(fields) => out.write(&Fields {
                serializer: self,
                fields,
                provider,
            }),
            _ => Err(SerializeError::unsupported(self.name(), value)),
        }
    }

    fn name(&self) -> &'static str {
        "StructSerializer"
    }
}

struct Fields<'a> {
    serializer: &'a StructSerializer,
    fields: &'a dyn Struct,
    provider: &'a SerializerProvider<'a>,
}

impl Serialize for Fields<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let properties = self.serializer.properties();
        let mut state = serializer.serialize_struct(self.serializer.ty.name(), properties.len())?;
        for property in properties {
            let name = property.field.name();
            let Some(value) = self.fields.field_at(property.field.index()) else {
                return Err(self.provider.report(SerializeError::MissingField {
                    field: name,
                    type_path: self.serializer.ty.path(),
                }));
            };
            if property.skip(value, self.provider) {
                state.skip_field(name)?;
                continue;
            }
            state.serialize_field(name, &Bound::new(&*property.serializer, value, self.provider))?;
        }
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use crate::ser::tests::{builder, person, to_json};
    use crate::{Inclusion, ObjectMapper, TypeSerializer};

    #[test]
    fn fields_are_written_in_declaration_order() {
        let mapper = builder().build().unwrap();
        assert_eq!(
            to_json(&mapper, &person()),
            r#"{"name":"Ada","tags":["math","engines"],"address":{"city":"London","zip":null}}"#
        );
    }

    #[test]
    fn inclusion_skips_null_and_empty_properties() {
        let mapper = builder().inclusion(Inclusion::NonNull).build().unwrap();
        let mut value = person();
        value.address = None;
        assert_eq!(to_json(&mapper, &value), r#"{"name":"Ada","tags":["math","engines"]}"#);

        let mapper = builder().inclusion(Inclusion::NonEmpty).build().unwrap();
        value.tags = Vec::new();
        assert_eq!(to_json(&mapper, &value), r#"{"name":"Ada"}"#);
    }

    #[test]
    fn root_values_can_carry_their_type() {
        let mapper: ObjectMapper = builder().build().unwrap();
        let mut value = person();
        value.tags.clear();
        value.address = None;

        let mut out = Vec::new();
        mapper
            .serialize_with_type(
                &value,
                &TypeSerializer::wrapper_array(),
                &mut serde_json::Serializer::new(&mut out),
            )
            .unwrap();
        assert_eq!(out, br#"["Person",{"name":"Ada","tags":[],"address":null}]"#);
    }
}
