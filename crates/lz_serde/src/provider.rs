use alloc::string::ToString;
use core::any::TypeId;
use core::cell::RefCell;

use serde_core::ser;

use lz_reflect::Value;
use lz_reflect::info::FieldInfo;
use lz_reflect::ops::ValueRef;
use lz_reflect::registry::TypeRegistry;
use lz_utils::TypeIdMap;

use crate::{Output, SerializeConfig, SerializeError, SharedSerializer};

// -----------------------------------------------------------------------------
// SerializerProvider

/// The context of one serialization pass.
///
/// Providers are cheap to create and must not be shared between passes: the
/// first error reported during a pass is kept so it can be returned unchanged
/// once the output format has unwound.
pub struct SerializerProvider<'a> {
    registry: &'a TypeRegistry,
    config: &'a SerializeConfig,
    serializers: &'a TypeIdMap<SharedSerializer>,
    failure: RefCell<Option<SerializeError>>,
}

impl<'a> SerializerProvider<'a> {
    pub fn new(
        registry: &'a TypeRegistry,
        config: &'a SerializeConfig,
        serializers: &'a TypeIdMap<SharedSerializer>,
    ) -> Self {
        Self {
            registry,
            config,
            serializers,
            failure: RefCell::new(None),
        }
    }

    #[inline]
    pub fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    #[inline]
    pub fn config(&self) -> &'a SerializeConfig {
        self.config
    }

    /// Returns the root serializer built for `type_id`.
    #[inline]
    pub fn find_value_serializer(&self, type_id: TypeId) -> Option<&'a SharedSerializer> {
        self.serializers.get(&type_id)
    }

    /// Returns the root serializer for the runtime type of `value`.
    pub fn find_serializer_for(&self, value: &dyn Value) -> Result<&'a SharedSerializer, SerializeError> {
        let ty = value.reflect_type();
        self.find_value_serializer(ty.id())
            .ok_or(SerializeError::NoSerializer { type_path: ty.path() })
    }

    /// Specializes `serializer` for `property`, keeping it when it is not
    /// contextual or declines to change.
    pub fn contextualize(
        &self,
        serializer: &SharedSerializer,
        property: Option<&FieldInfo>,
    ) -> Result<SharedSerializer, SerializeError> {
        let contextual = match serializer.as_contextual() {
            Some(contextual) => contextual.create_contextual(self, property)?,
            None => None,
        };
        Ok(contextual.unwrap_or_else(|| serializer.clone()))
    }

    /// Writes the null placeholder.
    #[inline]
    pub fn default_serialize_null(&self, out: Output<'_>) -> Result<(), SerializeError> {
        out.write_null()
    }

    /// Follows [`Deferred`](lz_reflect::Deferred) values until a concrete
    /// value is reached. Resolution errors are returned unchanged.
    pub fn resolve<'v>(&self, mut value: &'v dyn Value) -> Result<Option<&'v dyn Value>, SerializeError> {
        loop {
            match value.reflect_ref() {
                ValueRef::Deferred(deferred) => match deferred.resolve()? {
                    Some(inner) => value = inner,
                    None => return Ok(None),
                },
                _ => return Ok(Some(value)),
            }
        }
    }

    /// Finds the serializer for the runtime type of `value`.
    ///
    /// A serializer registered for the value's own type wins; otherwise
    /// deferred values are resolved and the lookup repeats on the result.
    /// Returns `None` if a deferred value resolves to nothing.
    pub fn lookup<'v>(
        &self,
        mut value: &'v dyn Value,
    ) -> Result<Option<(&'v dyn Value, &'a SharedSerializer)>, SerializeError> {
        loop {
            if let Some(serializer) = self.find_value_serializer(value.value_type_id()) {
                return Ok(Some((value, serializer)));
            }
            match value.reflect_ref() {
                ValueRef::Deferred(deferred) => match deferred.resolve()? {
                    Some(inner) => value = inner,
                    None => return Ok(None),
                },
                _ => {
                    return Err(SerializeError::NoSerializer {
                        type_path: value.reflect_type().path(),
                    });
                }
            }
        }
    }

    /// Serializes `value` with the serializer registered for its runtime type.
    pub fn serialize_value(&self, value: &dyn Value, out: Output<'_>) -> Result<(), SerializeError> {
        match self.lookup(value)? {
            Some((value, serializer)) => serializer.serialize(value, out, self),
            None => self.default_serialize_null(out),
        }
    }

    /// Records `err` as the failure of this pass and converts it into the
    /// output format's error type. Only the first failure is kept.
    pub fn report<E: ser::Error>(&self, err: SerializeError) -> E {
        let message = err.to_string();
        let mut failure = self.failure.borrow_mut();
        if failure.is_none() {
            *failure = Some(err);
        }
        E::custom(message)
    }

    /// Takes the recorded failure, if any.
    #[inline]
    pub fn take_failure(&self) -> Option<SerializeError> {
        self.failure.borrow_mut().take()
    }
}
