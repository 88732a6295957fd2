use thiserror::Error;

use lz_reflect::ResolveError;

/// Errors raised when a lazy reference cannot be loaded.
///
/// `target` describes what was being loaded, e.g.
/// `a collection of role: Order.items` or `proxy [User#7]`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FetchError {
    #[error("failed to lazily initialize {target}, could not initialize proxy - no Session")]
    NoSession { target: String },

    #[error("failed to lazily initialize {target}, the owning Session was closed")]
    SessionClosed { target: String },

    #[error("failed to lazily initialize {target}, no loader was configured")]
    MissingLoader { target: String },

    #[error("no row with the given identifier exists: {target}")]
    NotFound { target: String },

    #[error("failed to lazily initialize {target}")]
    Load {
        target: String,
        #[source]
        source: ResolveError,
    },
}

impl FetchError {
    /// Describes what was being loaded.
    pub fn target(&self) -> &str {
        match self {
            Self::NoSession { target }
            | Self::SessionClosed { target }
            | Self::MissingLoader { target }
            | Self::NotFound { target }
            | Self::Load { target, .. } => target,
        }
    }
}
