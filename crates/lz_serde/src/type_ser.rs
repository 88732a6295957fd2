use serde_core::ser::{SerializeMap, SerializeTuple};
use serde_core::{Serialize, Serializer};

use lz_reflect::Value;

use crate::{Output, SerializeError};

// -----------------------------------------------------------------------------
// TypeSerializer

/// How the type id is attached to a value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TypeInclusion {
    /// `{"Type": value}`
    #[default]
    WrapperObject,
    /// `["Type", value]`
    WrapperArray,
}

/// Which form of the type path is used as the type id.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TypeIdStyle {
    /// The last path segment without generics, e.g. `User`.
    #[default]
    Name,
    /// The full type path.
    Path,
}

/// Writes polymorphic type information around a serialized value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TypeSerializer {
    inclusion: TypeInclusion,
    style: TypeIdStyle,
}

impl TypeSerializer {
    #[inline]
    pub const fn new(inclusion: TypeInclusion, style: TypeIdStyle) -> Self {
        Self { inclusion, style }
    }

    #[inline]
    pub const fn wrapper_object() -> Self {
        Self::new(TypeInclusion::WrapperObject, TypeIdStyle::Name)
    }

    #[inline]
    pub const fn wrapper_array() -> Self {
        Self::new(TypeInclusion::WrapperArray, TypeIdStyle::Name)
    }

    #[inline]
    pub const fn inclusion(&self) -> TypeInclusion {
        self.inclusion
    }

    /// Returns the type id written for `value`.
    pub fn type_id_of(&self, value: &dyn Value) -> &'static str {
        let ty = value.reflect_type();
        match self.style {
            TypeIdStyle::Name => ty.name(),
            TypeIdStyle::Path => ty.path(),
        }
    }

    /// Writes `content` wrapped with the type id of `value`.
    ///
    /// `value` must be the concrete value `content` serializes; callers that
    /// unwrap lazy values pass the unwrapped one.
    pub fn write(
        &self,
        value: &dyn Value,
        content: &dyn erased_serde::Serialize,
        out: Output<'_>,
    ) -> Result<(), SerializeError> {
        out.write(&Typed {
            inclusion: self.inclusion,
            type_id: self.type_id_of(value),
            content,
        })
    }
}

struct Typed<'a> {
    inclusion: TypeInclusion,
    type_id: &'static str,
    content: &'a dyn erased_serde::Serialize,
}

impl Serialize for Typed<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.inclusion {
            TypeInclusion::WrapperObject => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(self.type_id, self.content)?;
                map.end()
            }
            TypeInclusion::WrapperArray => {
                let mut tuple = serializer.serialize_tuple(2)?;
                tuple.serialize_element(self.type_id)?;
                tuple.serialize_element(self.content)?;
                tuple.end()
            }
        }
    }
}
