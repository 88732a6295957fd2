use alloc::sync::Arc;

use lz_persist::Mapping;
use lz_persist::annotation::Transient;
use lz_reflect::info::FieldInfo;
use lz_serde::{Module, PropertyFilter, SetupContext};

use crate::{Features, OrmConfig, OrmSerializerModifier, OrmSerializers};

/// Drops fields marked [`Transient`].
#[derive(Clone, Copy, Debug, Default)]
pub struct TransientFilter;

impl PropertyFilter for TransientFilter {
    #[inline]
    fn exclude(&self, field: &FieldInfo) -> bool {
        field.has_attribute::<Transient>()
    }
}

/// Installs lazy-aware serialization of persistence-layer values.
///
/// See the [crate documentation](crate) for what gets installed.
#[derive(Clone, Default)]
pub struct OrmModule {
    features: Features,
    mapping: Option<Arc<dyn Mapping>>,
}

impl OrmModule {
    /// Creates a module with the default [`Features`].
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &OrmConfig) -> Self {
        Self::new().with_features(config.features())
    }

    #[inline]
    pub fn with_features(mut self, features: Features) -> Self {
        self.features = features;
        self
    }

    #[inline]
    pub fn enable(self, features: Features) -> Self {
        self.configure(features, true)
    }

    #[inline]
    pub fn disable(self, features: Features) -> Self {
        self.configure(features, false)
    }

    pub fn configure(mut self, features: Features, enabled: bool) -> Self {
        self.features.set(features, enabled);
        self
    }

    /// Uses `mapping` to name identifiers of uninitialized proxies, instead
    /// of the mapping of the proxy's session.
    pub fn with_mapping(mut self, mapping: Arc<dyn Mapping>) -> Self {
        self.mapping = Some(mapping);
        self
    }

    #[inline]
    pub fn features(&self) -> Features {
        self.features
    }

    #[inline]
    pub fn is_enabled(&self, features: Features) -> bool {
        self.features.contains(features)
    }
}

impl Module for OrmModule {
    fn name(&self) -> &str {
        "lz-orm"
    }

    fn setup(&self, context: &mut SetupContext<'_>) {
        let force = self.is_enabled(Features::FORCE_LAZY_LOADING);
        let force_element_collection = self.is_enabled(Features::FORCE_LAZY_LOADING_ELEMENT_COLLECTION);

        context.add_serializers(OrmSerializers::new(
            force,
            force_element_collection,
            self.is_enabled(Features::SERIALIZE_IDENTIFIER_FOR_LAZY_NOT_LOADED_OBJECTS),
            self.mapping.clone(),
        ));
        context.add_serializer_modifier(OrmSerializerModifier::new(force, force_element_collection));
        if self.is_enabled(Features::USE_TRANSIENT_ANNOTATION) {
            context.add_property_filter(TransientFilter);
        }
    }
}

impl core::fmt::Debug for OrmModule {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OrmModule")
            .field("features", &self.features)
            .field("mapping", &self.mapping.is_some())
            .finish()
    }
}
