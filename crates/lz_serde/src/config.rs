/// Which struct properties are written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Inclusion {
    /// Every property.
    #[default]
    Always,
    /// Properties whose value is not `None`.
    NonNull,
    /// Properties that are not `None` and whose serializer does not report
    /// them empty.
    NonEmpty,
}

/// Mapper-wide serialization settings.
#[derive(Clone, Debug, Default)]
pub struct SerializeConfig {
    pub inclusion: Inclusion,
}

impl SerializeConfig {
    #[inline]
    pub const fn new() -> Self {
        Self {
            inclusion: Inclusion::Always,
        }
    }

    #[inline]
    pub const fn with_inclusion(self, inclusion: Inclusion) -> Self {
        Self { inclusion }
    }
}
