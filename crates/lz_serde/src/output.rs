use serde_core::{Serialize, Serializer};

use lz_reflect::Value;

use crate::{SerializeError, SerializerProvider, TypeSerializer, ValueSerializer};

// -----------------------------------------------------------------------------
// Output

type Emit<'a> = dyn FnMut(&dyn erased_serde::Serialize) -> Result<(), SerializeError> + 'a;

/// The destination of one serialized value.
///
/// An `Output` accepts exactly one write; it is consumed by
/// [`write`](Self::write). Nested values are written by handing the output a
/// `serde` value that serializes them, usually a [`Bound`].
pub struct Output<'a> {
    emit: &'a mut Emit<'a>,
}

impl<'a> Output<'a> {
    #[inline]
    pub fn new(emit: &'a mut Emit<'a>) -> Self {
        Self { emit }
    }

    /// Writes `content` as the value.
    #[inline]
    pub fn write(self, content: &dyn erased_serde::Serialize) -> Result<(), SerializeError> {
        (self.emit)(content)
    }

    /// Writes the canonical null.
    #[inline]
    pub fn write_null(self) -> Result<(), SerializeError> {
        self.write(&Option::<()>::None)
    }
}

// -----------------------------------------------------------------------------
// Bound

/// A value bound to the serializer that writes it, usable wherever `serde`
/// expects a [`Serialize`].
///
/// Errors raised by the serializer are reported to the provider, so that
/// [`ObjectMapper::serialize`](crate::ObjectMapper::serialize) can return the
/// original error instead of the output format's copy of its message.
pub struct Bound<'a, V: ?Sized> {
    serializer: &'a V,
    value: &'a dyn Value,
    provider: &'a SerializerProvider<'a>,
    type_ser: Option<&'a TypeSerializer>,
}

impl<'a, V: ValueSerializer + ?Sized> Bound<'a, V> {
    #[inline]
    pub fn new(serializer: &'a V, value: &'a dyn Value, provider: &'a SerializerProvider<'a>) -> Self {
        Self {
            serializer,
            value,
            provider,
            type_ser: None,
        }
    }

    /// Writes through [`ValueSerializer::serialize_with_type`].
    #[inline]
    pub fn with_type(self, type_ser: &'a TypeSerializer) -> Self {
        Self {
            type_ser: Some(type_ser),
            ..self
        }
    }
}

impl<V: ValueSerializer + ?Sized> Serialize for Bound<'_, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut slot = Some(serializer);
        let mut result = None;

        let mut emit = |content: &dyn erased_serde::Serialize| -> Result<(), SerializeError> {
            let serializer = slot.take().ok_or(SerializeError::DuplicateOutput)?;
            result = Some(erased_serde::serialize(content, serializer));
            Ok(())
        };

        let outcome = match self.type_ser {
            Some(type_ser) => self.serializer.serialize_with_type(
                self.value,
                Output::new(&mut emit),
                self.provider,
                type_ser,
            ),
            None => self
                .serializer
                .serialize(self.value, Output::new(&mut emit), self.provider),
        };

        match (outcome, result) {
            (Err(err), _) => Err(self.provider.report(err)),
            (Ok(()), Some(result)) => result,
            (Ok(()), None) => Err(self.provider.report(SerializeError::MissingOutput)),
        }
    }
}
