use alloc::boxed::Box;
use alloc::vec::Vec;

use lz_reflect::info::FieldInfo;
use lz_reflect::registry::{TypeMeta, TypeRegistry};

use crate::SharedSerializer;

// -----------------------------------------------------------------------------
// Hooks

/// Provides serializers for specific types, ahead of the defaults.
pub trait Serializers: Send + Sync + 'static {
    /// Returns a serializer for `meta`, or `None` to leave the type to the
    /// next lookup.
    fn find_serializer(&self, meta: &TypeMeta) -> Option<SharedSerializer>;
}

/// Rewrites default serializers after they are created.
///
/// Every hook returns its input unchanged by default.
pub trait SerializerModifier: Send + Sync + 'static {
    /// Called for list-like types.
    fn modify_collection_serializer(&self, _meta: &TypeMeta, serializer: SharedSerializer) -> SharedSerializer {
        serializer
    }

    /// Called for map-like types.
    fn modify_map_serializer(&self, _meta: &TypeMeta, serializer: SharedSerializer) -> SharedSerializer {
        serializer
    }

    /// Called for struct types, after their property writers are built.
    fn modify_serializer(&self, _meta: &TypeMeta, serializer: SharedSerializer) -> SharedSerializer {
        serializer
    }
}

/// Removes struct properties from serialization.
pub trait PropertyFilter: Send + Sync + 'static {
    /// Returns `true` to skip `field`.
    fn exclude(&self, field: &FieldInfo) -> bool;
}

// -----------------------------------------------------------------------------
// Module

/// A bundle of serialization hooks.
pub trait Module {
    /// The name used in logs.
    fn name(&self) -> &str;

    /// Installs the hooks of this module.
    fn setup(&self, context: &mut SetupContext<'_>);
}

/// The view of an [`ObjectMapperBuilder`](crate::ObjectMapperBuilder) handed
/// to [`Module::setup`].
pub struct SetupContext<'a> {
    pub(crate) registry: &'a mut TypeRegistry,
    pub(crate) serializers: &'a mut Vec<Box<dyn Serializers>>,
    pub(crate) modifiers: &'a mut Vec<Box<dyn SerializerModifier>>,
    pub(crate) filters: &'a mut Vec<Box<dyn PropertyFilter>>,
}

impl SetupContext<'_> {
    /// Adds a lookup. Lookups added later take precedence.
    pub fn add_serializers(&mut self, serializers: impl Serializers) {
        self.serializers.push(Box::new(serializers));
    }

    /// Adds a modifier. Modifiers run in the order they are added.
    pub fn add_serializer_modifier(&mut self, modifier: impl SerializerModifier) {
        self.modifiers.push(Box::new(modifier));
    }

    pub fn add_property_filter(&mut self, filter: impl PropertyFilter) {
        self.filters.push(Box::new(filter));
    }

    /// Gives access to the registry, e.g. to register type traits.
    #[inline]
    pub fn registry_mut(&mut self) -> &mut TypeRegistry {
        self.registry
    }
}
