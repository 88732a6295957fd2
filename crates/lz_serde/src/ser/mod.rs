//! Built-in serializers, one per [`TypeKind`](lz_reflect::info::TypeKind).
//!
//! Every built-in serializer resolves [`Deferred`](lz_reflect::Deferred)
//! values before inspecting them, so a lazily produced value serializes like
//! the value it produces.

// -----------------------------------------------------------------------------
// Modules

mod collection;
mod dynamic;
mod map;
mod option;
mod scalar;
mod structs;

// -----------------------------------------------------------------------------
// Exports

pub use collection::{CollectionSerializer, UnwrapSingle};
pub use dynamic::DynamicSerializer;
pub use map::MapSerializer;
pub use option::OptionSerializer;
pub use scalar::ScalarSerializer;
pub use structs::{PropertyWriter, StructSerializer};

// -----------------------------------------------------------------------------
// Helpers

use lz_reflect::Value;
use lz_reflect::ops::ValueRef;

/// The state of a value as far as it can be known without loading anything.
pub(crate) enum Loaded<'a> {
    Value(&'a dyn Value),
    Absent,
    Pending,
}

/// Follows deferred values that are already resolved.
pub(crate) fn loaded(mut value: &dyn Value) -> Loaded<'_> {
    loop {
        let ValueRef::Deferred(deferred) = value.reflect_ref() else {
            return Loaded::Value(value);
        };
        if !deferred.is_resolved() {
            return Loaded::Pending;
        }
        match deferred.resolve() {
            Ok(Some(inner)) => value = inner,
            Ok(None) | Err(_) => return Loaded::Absent,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;

    use lz_reflect::impl_struct;

    use crate::{ObjectMapper, ObjectMapperBuilder};

    pub struct Address {
        pub city: String,
        pub zip: Option<u32>,
    }

    impl_struct! {
        Address {
            city: String,
            zip: Option<u32>,
        }
    }

    pub struct Person {
        pub name: String,
        pub tags: Vec<String>,
        pub address: Option<Address>,
    }

    impl_struct! {
        Person {
            name: String,
            tags: Vec<String>,
            address: Option<Address>,
        }
    }

    pub fn person() -> Person {
        Person {
            name: "Ada".into(),
            tags: vec!["math".into(), "engines".into()],
            address: Some(Address {
                city: "London".into(),
                zip: None,
            }),
        }
    }

    pub fn builder() -> ObjectMapperBuilder {
        ObjectMapper::builder().register::<Person>()
    }

    pub fn to_json(mapper: &ObjectMapper, value: &dyn lz_reflect::Value) -> String {
        let mut out = Vec::new();
        let mut ser = serde_json::Serializer::new(&mut out);
        mapper.serialize(value, &mut ser).unwrap();
        String::from_utf8(out).unwrap()
    }
}
