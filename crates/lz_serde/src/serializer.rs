use alloc::sync::Arc;
use core::any::Any;

use lz_reflect::Value;
use lz_reflect::info::FieldInfo;

use crate::{Bound, Output, SerializeError, SerializerProvider, TypeSerializer};

/// A serializer shared between every property and pass that uses it.
pub type SharedSerializer = Arc<dyn ValueSerializer>;

// -----------------------------------------------------------------------------
// ValueSerializer

/// Serializes type-erased values.
///
/// Implementations are immutable once built; a single instance serves any
/// number of concurrent serialization passes.
pub trait ValueSerializer: Any + Send + Sync {
    /// Writes `value` into `out`.
    fn serialize(
        &self,
        value: &dyn Value,
        out: Output<'_>,
        provider: &SerializerProvider<'_>,
    ) -> Result<(), SerializeError>;

    /// Writes `value` together with its type id.
    ///
    /// The default wraps the output of [`serialize`](Self::serialize) with
    /// `type_ser`; serializers that unwrap or delegate should forward
    /// `type_ser` to the serializer that writes the final value instead.
    fn serialize_with_type(
        &self,
        value: &dyn Value,
        out: Output<'_>,
        provider: &SerializerProvider<'_>,
        type_ser: &TypeSerializer,
    ) -> Result<(), SerializeError> {
        let content = Bound::new(self, value, provider);
        type_ser.write(value, &content, out)
    }

    /// Returns `true` if `value` counts as empty for
    /// [`Inclusion::NonEmpty`](crate::Inclusion::NonEmpty).
    fn is_empty(&self, _value: &dyn Value, _provider: &SerializerProvider<'_>) -> bool {
        false
    }

    /// Narrows to the [`ContextualSerializer`] capability, if supported.
    fn as_contextual(&self) -> Option<&dyn ContextualSerializer> {
        None
    }

    /// A short name used in error messages.
    fn name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

impl dyn ValueSerializer {
    /// Returns `true` if the concrete serializer is `T`.
    #[inline]
    pub fn is<T: ValueSerializer>(&self) -> bool {
        (self as &dyn Any).is::<T>()
    }

    /// Downcasts to the concrete serializer.
    #[inline]
    pub fn downcast_ref<T: ValueSerializer>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }
}

impl core::fmt::Debug for dyn ValueSerializer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

// -----------------------------------------------------------------------------
// ContextualSerializer

/// Serializers that specialize themselves for the property they serialize.
pub trait ContextualSerializer {
    /// Returns the serializer to use for `property`.
    ///
    /// `Ok(None)` keeps the current instance. `property` is `None` for root
    /// values and values without an enclosing property.
    fn create_contextual(
        &self,
        provider: &SerializerProvider<'_>,
        property: Option<&FieldInfo>,
    ) -> Result<Option<SharedSerializer>, SerializeError>;
}
