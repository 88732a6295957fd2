//! Relation annotations, attached to struct fields with `#[attr(..)]`.
//!
//! Each relation annotation defaults to the fetch type relations of its kind
//! use when none is given: to-many relations and element collections are
//! lazy, to-one relations are eager.
//!
//! ```
//! use lz_persist::annotation::{FetchType, ManyToOne, OneToMany};
//!
//! assert_eq!(OneToMany::default().fetch, FetchType::Lazy);
//! assert_eq!(ManyToOne::default().fetch, FetchType::Eager);
//! assert_eq!(ManyToOne::LAZY.fetch, FetchType::Lazy);
//! ```

/// When the target of a relation is loaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FetchType {
    /// Together with the owning entity.
    Eager,
    /// On first access.
    Lazy,
}

macro_rules! relation {
    ($(#[$doc:meta])* $name:ident, $default:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub struct $name {
            pub fetch: FetchType,
        }

        impl $name {
            pub const EAGER: Self = Self::new(FetchType::Eager);
            pub const LAZY: Self = Self::new(FetchType::Lazy);

            #[inline]
            pub const fn new(fetch: FetchType) -> Self {
                Self { fetch }
            }
        }

        impl Default for $name {
            #[inline]
            fn default() -> Self {
                Self::new(FetchType::$default)
            }
        }
    };
}

relation!(
    /// A collection of entities owned by one entity.
    OneToMany,
    Lazy
);

relation!(
    /// A single entity owned by one entity.
    OneToOne,
    Eager
);

relation!(
    /// A single entity shared by many entities.
    ManyToOne,
    Eager
);

relation!(
    /// A collection of entities shared by many entities.
    ManyToMany,
    Lazy
);

relation!(
    /// A collection of plain values stored with the owning entity.
    ElementCollection,
    Lazy
);

/// Marks a field that is not persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Transient;
