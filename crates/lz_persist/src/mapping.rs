use lz_utils::hash::{self, HashMap};

/// Identifier metadata of mapped entities.
pub trait Mapping: Send + Sync {
    /// Returns the name of the identifier property of `entity_name`.
    fn identifier_property_name(&self, entity_name: &str) -> Option<&str>;
}

/// A [`Mapping`] built from a table of entity names.
///
/// ```
/// use lz_persist::{EntityMappings, Mapping};
///
/// let mappings = EntityMappings::new().with_identifier("User", "userId");
/// assert_eq!(mappings.identifier_property_name("User"), Some("userId"));
/// assert_eq!(mappings.identifier_property_name("Order"), None);
/// ```
#[derive(Clone, Debug, Default)]
pub struct EntityMappings {
    identifiers: HashMap<String, String>,
}

impl EntityMappings {
    #[inline]
    pub const fn new() -> Self {
        Self {
            identifiers: hash::new_map(),
        }
    }

    pub fn with_identifier(mut self, entity_name: impl Into<String>, property: impl Into<String>) -> Self {
        self.insert(entity_name, property);
        self
    }

    pub fn insert(&mut self, entity_name: impl Into<String>, property: impl Into<String>) {
        self.identifiers.insert(entity_name.into(), property.into());
    }
}

impl Mapping for EntityMappings {
    fn identifier_property_name(&self, entity_name: &str) -> Option<&str> {
        self.identifiers.get(entity_name).map(String::as_str)
    }
}
