use alloc::sync::Arc;

use serde_core::ser::SerializeSeq;
use serde_core::{Serialize, Serializer};

use lz_reflect::Value;
use lz_reflect::info::FieldInfo;
use lz_reflect::ops::{List, ValueRef};

use super::{DynamicSerializer, Loaded, loaded};
use crate::{
    Bound, ContextualSerializer, Output, SerializeError, SerializerProvider, SharedSerializer,
    ValueSerializer,
};

/// Field attribute: write single-element collections as their only element.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnwrapSingle;

/// Writes list-like values as sequences, elements by runtime type.
#[derive(Clone, Copy, Debug, Default)]
pub struct CollectionSerializer {
    unwrap_single: bool,
}

impl CollectionSerializer {
    #[inline]
    pub const fn new() -> Self {
        Self {
            unwrap_single: false,
        }
    }

    #[inline]
    pub const fn unwrap_single(&self) -> bool {
        self.unwrap_single
    }
}

impl ValueSerializer for CollectionSerializer {
    fn serialize(
        &self,
        value: &dyn Value,
        out: Output<'_>,
        provider: &SerializerProvider<'_>,
    ) -> Result<(), SerializeError> {
        let Some(value) = provider.resolve(value)? else {
            return provider.default_serialize_null(out);
        };
        let ValueRef::List(list) = value.reflect_ref() else {
            return Err(SerializeError::unsupported(self.name(), value));
        };

        if self.unwrap_single
            && list.len() == 1
            && let Some(item) = list.iter().next()
        {
            return DynamicSerializer.serialize(item, out, provider);
        }

        out.write(&Elements { list, provider })
    }

    fn is_empty(&self, value: &dyn Value, _provider: &SerializerProvider<'_>) -> bool {
        match loaded(value) {
            Loaded::Value(value) => match value.reflect_ref() {
                ValueRef::List(list) => list.is_empty(),
                _ => false,
            },
            Loaded::Absent => true,
            Loaded::Pending => false,
        }
    }

    fn as_contextual(&self) -> Option<&dyn ContextualSerializer> {
        Some(self)
    }

    fn name(&self) -> &'static str {
        "CollectionSerializer"
    }
}

impl ContextualSerializer for CollectionSerializer {
    fn create_contextual(
        &self,
        _provider: &SerializerProvider<'_>,
        property: Option<&FieldInfo>,
    ) -> Result<Option<SharedSerializer>, SerializeError> {
        let unwrap_single = property.is_some_and(FieldInfo::has_attribute::<UnwrapSingle>);
        if unwrap_single == self.unwrap_single {
            return Ok(None);
        }
        Ok(Some(Arc::new(Self { unwrap_single })))
    }
}

struct Elements<'a> {
    list: &'a dyn List,
    provider: &'a SerializerProvider<'a>,
}

impl Serialize for Elements<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.list.len()))?;
        for item in self.list.iter() {
            seq.serialize_element(&Bound::new(&DynamicSerializer, item, self.provider))?;
        }
        seq.end()
    }
}
