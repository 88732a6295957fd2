use lz_reflect::info::{CustomAttributes, FieldInfo};

use crate::annotation::{ElementCollection, FetchType, ManyToMany, ManyToOne, OneToMany, OneToOne};

// -----------------------------------------------------------------------------
// RelationKind

/// The kind of relation a field is mapped as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RelationKind {
    OneToMany,
    OneToOne,
    ManyToOne,
    ManyToMany,
    ElementCollection,
}

type Lookup = fn(&CustomAttributes) -> Option<FetchType>;

/// Relation annotations in precedence order. The first one present on a
/// field decides its fetch mode.
const RELATIONS: [(RelationKind, Lookup); 5] = [
    (RelationKind::OneToMany, |a: &CustomAttributes| a.get::<OneToMany>().map(|r| r.fetch)),
    (RelationKind::OneToOne, |a: &CustomAttributes| a.get::<OneToOne>().map(|r| r.fetch)),
    (RelationKind::ManyToOne, |a: &CustomAttributes| a.get::<ManyToOne>().map(|r| r.fetch)),
    (RelationKind::ManyToMany, |a: &CustomAttributes| a.get::<ManyToMany>().map(|r| r.fetch)),
    (RelationKind::ElementCollection, |a: &CustomAttributes| {
        a.get::<ElementCollection>().map(|r| r.fetch)
    }),
];

// -----------------------------------------------------------------------------
// FetchPolicy

/// How a field is fetched, as far as its annotations say.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FetchMode {
    Eager,
    Lazy,
    /// The field is not mapped as a relation.
    #[default]
    Unspecified,
}

/// The fetch behavior of one field, read from its relation annotations.
///
/// # Examples
///
/// ```
/// use lz_persist::annotation::{ElementCollection, ManyToOne};
/// use lz_persist::{FetchMode, FetchPolicy};
/// use lz_reflect::info::CustomAttributes;
///
/// let attrs = CustomAttributes::new().with_attribute(ElementCollection::default());
/// let policy = FetchPolicy::of(&attrs);
/// assert!(policy.uses_lazy_loading());
/// assert!(policy.is_element_collection());
///
/// let attrs = CustomAttributes::new().with_attribute(ManyToOne::default());
/// assert_eq!(FetchPolicy::of(&attrs).mode(), FetchMode::Eager);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FetchPolicy {
    mode: FetchMode,
    relation: Option<RelationKind>,
    element_collection: bool,
}

impl FetchPolicy {
    /// The policy of a field without relation annotations.
    pub const UNSPECIFIED: Self = Self {
        mode: FetchMode::Unspecified,
        relation: None,
        element_collection: false,
    };

    /// Reads the policy from field attributes.
    pub fn of(attributes: &CustomAttributes) -> Self {
        let element_collection = attributes.contains::<ElementCollection>();
        let found = RELATIONS
            .iter()
            .find_map(|(kind, lookup)| lookup(attributes).map(|fetch| (*kind, fetch)));

        match found {
            Some((kind, fetch)) => Self {
                mode: match fetch {
                    FetchType::Eager => FetchMode::Eager,
                    FetchType::Lazy => FetchMode::Lazy,
                },
                relation: Some(kind),
                element_collection,
            },
            None => Self::UNSPECIFIED,
        }
    }

    /// Reads the policy of `field`; no field means no relation.
    pub fn of_field(field: Option<&FieldInfo>) -> Self {
        field.map_or(Self::UNSPECIFIED, |field| Self::of(field.custom_attributes()))
    }

    #[inline]
    pub const fn mode(&self) -> FetchMode {
        self.mode
    }

    /// The annotation that decided the mode.
    #[inline]
    pub const fn relation(&self) -> Option<RelationKind> {
        self.relation
    }

    /// Returns `true` if the field is fetched lazily.
    #[inline]
    pub const fn uses_lazy_loading(&self) -> bool {
        matches!(self.mode, FetchMode::Lazy)
    }

    /// Returns `true` if the field carries [`ElementCollection`], whatever
    /// annotation decided the mode.
    #[inline]
    pub const fn is_element_collection(&self) -> bool {
        self.element_collection
    }
}

#[cfg(test)]
mod tests {
    use lz_reflect::info::{CustomAttributes, FieldInfo};

    use super::{FetchMode, FetchPolicy, RelationKind};
    use crate::annotation::{ElementCollection, ManyToMany, ManyToOne, OneToMany, OneToOne, Transient};

    #[test]
    fn no_annotation_is_unspecified() {
        let policy = FetchPolicy::of(&CustomAttributes::new().with_attribute(Transient));
        assert_eq!(policy, FetchPolicy::UNSPECIFIED);
        assert!(!policy.uses_lazy_loading());
        assert!(!FetchPolicy::of_field(None).uses_lazy_loading());
    }

    #[test]
    fn defaults_follow_the_relation_kind() {
        let lazy = |attrs: CustomAttributes| FetchPolicy::of(&attrs).uses_lazy_loading();
        assert!(lazy(CustomAttributes::new().with_attribute(OneToMany::default())));
        assert!(!lazy(CustomAttributes::new().with_attribute(OneToOne::default())));
        assert!(!lazy(CustomAttributes::new().with_attribute(ManyToOne::default())));
        assert!(lazy(CustomAttributes::new().with_attribute(ManyToMany::default())));
        assert!(lazy(CustomAttributes::new().with_attribute(ElementCollection::default())));
    }

    #[test]
    fn first_annotation_in_precedence_order_wins() {
        let attrs = CustomAttributes::new()
            .with_attribute(ElementCollection::LAZY)
            .with_attribute(OneToMany::EAGER);
        let policy = FetchPolicy::of(&attrs);
        assert_eq!(policy.mode(), FetchMode::Eager);
        assert_eq!(policy.relation(), Some(RelationKind::OneToMany));
        assert!(policy.is_element_collection());
    }

    #[test]
    fn reads_field_attributes() {
        let field = FieldInfo::new::<u32>("items")
            .with_custom_attributes(CustomAttributes::new().with_attribute(ManyToMany::EAGER));
        let policy = FetchPolicy::of_field(Some(&field));
        assert_eq!(policy.mode(), FetchMode::Eager);
        assert_eq!(policy.relation(), Some(RelationKind::ManyToMany));
    }
}
