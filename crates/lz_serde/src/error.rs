use alloc::boxed::Box;
use alloc::string::String;
use core::error::Error as CoreError;

use thiserror::Error;

use lz_reflect::{ResolveError, Value};

// -----------------------------------------------------------------------------
// SerializeError

/// Errors produced while building or running serializers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SerializeError {
    /// The serializer graph was assembled incorrectly.
    #[error("mapping error: {0}")]
    Mapping(String),

    #[error("no serializer registered for type `{type_path}`")]
    NoSerializer { type_path: &'static str },

    #[error("`{serializer}` cannot serialize a value of type `{type_path}`")]
    Unsupported {
        serializer: &'static str,
        type_path: &'static str,
    },

    #[error("map keys must be scalar values, found `{type_path}`")]
    UnsupportedKey { type_path: &'static str },

    #[error("field `{field}` is missing from a value of type `{type_path}`")]
    MissingField {
        field: &'static str,
        type_path: &'static str,
    },

    #[error("serializer returned without writing a value")]
    MissingOutput,

    #[error("serializer wrote more than one value")]
    DuplicateOutput,

    /// The output format rejected the data.
    #[error("output error: {0}")]
    Format(String),

    /// An error raised outside the serializer, e.g. while loading a deferred
    /// value. Carried unchanged.
    #[error(transparent)]
    Source(#[from] ResolveError),
}

impl SerializeError {
    /// Creates a [`SerializeError::Mapping`].
    #[inline]
    pub fn mapping(message: impl Into<String>) -> Self {
        Self::Mapping(message.into())
    }

    /// Wraps an external error into [`SerializeError::Source`].
    #[inline]
    pub fn source<E: CoreError + Send + Sync + 'static>(err: E) -> Self {
        Self::Source(Box::new(err))
    }

    #[cold]
    pub fn unsupported(serializer: &'static str, value: &dyn Value) -> Self {
        Self::Unsupported {
            serializer,
            type_path: value.reflect_type().path(),
        }
    }

    /// Returns the external error if it has type `E`.
    pub fn downcast_ref<E: CoreError + 'static>(&self) -> Option<&E> {
        match self {
            Self::Source(err) => err.downcast_ref::<E>(),
            _ => None,
        }
    }

    /// Returns `true` for [`SerializeError::Mapping`].
    #[inline]
    pub const fn is_mapping(&self) -> bool {
        matches!(self, Self::Mapping(_))
    }
}
