use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::Mapping;

struct SessionInner {
    open: AtomicBool,
    fetches: AtomicUsize,
    mapping: Option<Arc<dyn Mapping>>,
}

/// A handle to the persistence session that lazy references load through.
///
/// Clones share the same session. Loading requires the session to be open;
/// every completed load is counted.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    /// Opens a session without identifier metadata.
    pub fn open() -> Self {
        Self::build(None)
    }

    /// Opens a session whose factory exposes `mapping`.
    pub fn with_mapping(mapping: Arc<dyn Mapping>) -> Self {
        Self::build(Some(mapping))
    }

    fn build(mapping: Option<Arc<dyn Mapping>>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                open: AtomicBool::new(true),
                fetches: AtomicUsize::new(0),
                mapping,
            }),
        }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.inner.open.load(Ordering::Acquire)
    }

    /// Closes the session. Uninitialized references can no longer load.
    pub fn close(&self) {
        if self.inner.open.swap(false, Ordering::AcqRel) {
            log::debug!("session closed after {} fetches", self.fetch_count());
        }
    }

    /// The number of loads performed through this session.
    #[inline]
    pub fn fetch_count(&self) -> usize {
        self.inner.fetches.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn mapping(&self) -> Option<&Arc<dyn Mapping>> {
        self.inner.mapping.as_ref()
    }

    pub(crate) fn record_fetch(&self) {
        self.inner.fetches.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns `true` if both handles refer to the same session.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl core::fmt::Debug for Session {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session")
            .field("open", &self.is_open())
            .field("fetches", &self.fetch_count())
            .finish_non_exhaustive()
    }
}
