use bitflags::bitflags;
use serde::Deserialize;

bitflags! {
    /// Switches of [`OrmModule`](crate::OrmModule).
    ///
    /// The default enables [`USE_TRANSIENT_ANNOTATION`](Self::USE_TRANSIENT_ANNOTATION)
    /// only.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Features: u8 {
        /// Load uninitialized lazy values instead of writing them as null.
        const FORCE_LAZY_LOADING = 1 << 0;
        /// Skip fields marked `Transient`.
        const USE_TRANSIENT_ANNOTATION = 1 << 1;
        /// Write uninitialized proxies as `{id_name: id}` instead of null.
        const SERIALIZE_IDENTIFIER_FOR_LAZY_NOT_LOADED_OBJECTS = 1 << 2;
        /// Load uninitialized element collections.
        const FORCE_LAZY_LOADING_ELEMENT_COLLECTION = 1 << 3;
    }
}

impl Default for Features {
    #[inline]
    fn default() -> Self {
        Self::USE_TRANSIENT_ANNOTATION
    }
}

/// [`Features`] as a configuration document.
///
/// Missing fields keep their default.
///
/// ```
/// use lz_orm::{Features, OrmConfig};
///
/// let config: OrmConfig = ron::from_str("(force_lazy_loading: true)").unwrap();
/// assert_eq!(
///     config.features(),
///     Features::FORCE_LAZY_LOADING | Features::USE_TRANSIENT_ANNOTATION,
/// );
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrmConfig {
    pub force_lazy_loading: bool,
    pub use_transient_annotation: bool,
    pub serialize_identifier_for_lazy_not_loaded_objects: bool,
    pub force_lazy_loading_element_collection: bool,
}

impl Default for OrmConfig {
    fn default() -> Self {
        Self::from(Features::default())
    }
}

impl OrmConfig {
    pub fn features(&self) -> Features {
        let mut features = Features::empty();
        features.set(Features::FORCE_LAZY_LOADING, self.force_lazy_loading);
        features.set(Features::USE_TRANSIENT_ANNOTATION, self.use_transient_annotation);
        features.set(
            Features::SERIALIZE_IDENTIFIER_FOR_LAZY_NOT_LOADED_OBJECTS,
            self.serialize_identifier_for_lazy_not_loaded_objects,
        );
        features.set(
            Features::FORCE_LAZY_LOADING_ELEMENT_COLLECTION,
            self.force_lazy_loading_element_collection,
        );
        features
    }
}

impl From<Features> for OrmConfig {
    fn from(features: Features) -> Self {
        Self {
            force_lazy_loading: features.contains(Features::FORCE_LAZY_LOADING),
            use_transient_annotation: features.contains(Features::USE_TRANSIENT_ANNOTATION),
            serialize_identifier_for_lazy_not_loaded_objects: features
                .contains(Features::SERIALIZE_IDENTIFIER_FOR_LAZY_NOT_LOADED_OBJECTS),
            force_lazy_loading_element_collection: features
                .contains(Features::FORCE_LAZY_LOADING_ELEMENT_COLLECTION),
        }
    }
}

impl From<OrmConfig> for Features {
    #[inline]
    fn from(config: OrmConfig) -> Self {
        config.features()
    }
}

#[cfg(test)]
mod tests {
    use super::{Features, OrmConfig};

    #[test]
    fn empty_document_keeps_defaults() {
        let config: OrmConfig = ron::from_str("()").unwrap();
        assert_eq!(config, OrmConfig::default());
        assert_eq!(config.features(), Features::USE_TRANSIENT_ANNOTATION);
    }

    #[test]
    fn reads_every_switch() {
        let config: OrmConfig = ron::from_str(
            "(
                force_lazy_loading: false,
                use_transient_annotation: false,
                serialize_identifier_for_lazy_not_loaded_objects: true,
                force_lazy_loading_element_collection: true,
            )",
        )
        .unwrap();
        assert_eq!(
            Features::from(config),
            Features::SERIALIZE_IDENTIFIER_FOR_LAZY_NOT_LOADED_OBJECTS
                | Features::FORCE_LAZY_LOADING_ELEMENT_COLLECTION
        );

        let json: OrmConfig = serde_json::from_str(r#"{"force_lazy_loading": true}"#).unwrap();
        assert!(json.features().contains(Features::FORCE_LAZY_LOADING));
    }

    #[test]
    fn unknown_switches_are_rejected() {
        assert!(ron::from_str::<OrmConfig>("(lazy: true)").is_err());
    }

    #[test]
    fn features_round_trip_through_config() {
        let features = Features::FORCE_LAZY_LOADING | Features::FORCE_LAZY_LOADING_ELEMENT_COLLECTION;
        assert_eq!(OrmConfig::from(features).features(), features);
    }
}
