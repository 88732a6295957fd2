use serde_core::ser::SerializeMap;
use serde_core::{Serialize, Serializer};

use lz_reflect::Value;
use lz_reflect::ops::{Map, ValueRef};

use super::{DynamicSerializer, Loaded, loaded};
use crate::{Bound, Output, SerializeError, SerializerProvider, ValueSerializer};

/// Writes map-like values. Keys must be scalars.
#[derive(Clone, Copy, Debug, Default)]
pub struct MapSerializer;

impl ValueSerializer for MapSerializer {
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
            ValueRef::Map(map) => out.write(&Entries { map, provider }),
            _ => Err(SerializeError::unsupported(self.name(), value)),
        }
    }

    fn is_empty(&self, value: &dyn Value, _provider: &SerializerProvider<'_>) -> bool {
        match loaded(value) {
            Loaded::Value(value) => match value.reflect_ref() {
                ValueRef::Map(map) => map.is_empty(),
                _ => false,
            },
            Loaded::Absent => true,
            Loaded::Pending => false,
        }
    }

    fn name(&self) -> &'static str {
        "MapSerializer"
    }
}

struct Entries<'a> {
    map: &'a dyn Map,
    provider: &'a SerializerProvider<'a>,
}

impl Serialize for Entries<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_map(Some(self.map.len()))?;
        for (key, value) in self.map.iter() {
            let ValueRef::Scalar(key) = key.reflect_ref() else {
                return Err(self.provider.report(SerializeError::UnsupportedKey {
                    type_path: key.reflect_type().path(),
                }));
            };
            state.serialize_entry(key, &Bound::new(&DynamicSerializer, value, self.provider))?;
        }
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;

    use crate::ser::tests::to_json;
    use crate::{ObjectMapper, SerializeError};

    #[test]
    fn maps_write_entries_in_key_order() {
        let mapper = ObjectMapper::builder()
            .register::<BTreeMap<String, Vec<u8>>>()
            .build()
            .unwrap();
        let mut value = BTreeMap::new();
        value.insert(String::from("b"), vec![2_u8]);
        value.insert(String::from("a"), vec![]);
        assert_eq!(to_json(&mapper, &value), r#"{"a":[],"b":[2]}"#);
    }

    #[test]
    fn non_scalar_keys_are_rejected() {
        let mapper = ObjectMapper::builder()
            .register::<BTreeMap<Vec<u8>, u8>>()
            .build()
            .unwrap();
        let mut value = BTreeMap::new();
        value.insert(vec![1_u8], 1_u8);

        let mut out = Vec::new();
        let err = mapper
            .serialize(&value, &mut serde_json::Serializer::new(&mut out))
            .unwrap_err();
        assert!(matches!(err, SerializeError::UnsupportedKey { .. }));
    }
}
