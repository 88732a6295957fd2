use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, OnceLock, PoisonError};

use lz_reflect::info::{Type, TypeInfo, Typed};
use lz_reflect::ops::ValueRef;
use lz_reflect::registry::{FromType, GetTypeMeta, TypeMeta, TypeRegistry, TypeTrait};
use lz_reflect::{Deferred, ResolveError, Value};

use crate::{FetchError, Session};

// -----------------------------------------------------------------------------
// LazyHandle

/// A lazily loaded collection or map.
pub trait LazyHandle {
    /// Returns `true` once the contents are loaded.
    fn was_initialized(&self) -> bool;

    /// Returns the contents, loading them first if needed.
    ///
    /// `None` means the relation holds no collection at all.
    fn value(&self) -> Result<Option<&dyn Value>, FetchError>;

    /// The name of the relation, e.g. `Order.items`.
    fn role(&self) -> &str;
}

/// Recovers a [`LazyHandle`] from a type-erased value.
#[derive(Clone, Copy)]
pub struct TypeTraitLazyHandle {
    from_value: fn(&dyn Value) -> Option<&dyn LazyHandle>,
}

impl TypeTraitLazyHandle {
    #[inline]
    pub fn get<'a>(&self, value: &'a dyn Value) -> Option<&'a dyn LazyHandle> {
        (self.from_value)(value)
    }
}

impl TypeTrait for TypeTraitLazyHandle {}

impl<T: LazyHandle + Value> FromType<T> for TypeTraitLazyHandle {
    fn from_type() -> Self {
        Self {
            from_value: |value| value.downcast_ref::<T>().map(|handle| handle as &dyn LazyHandle),
        }
    }
}

/// Returns `value` as a [`LazyHandle`] if its type is registered as one.
pub fn lazy_handle<'a>(value: &'a dyn Value, registry: &TypeRegistry) -> Option<&'a dyn LazyHandle> {
    registry
        .get_type_trait::<TypeTraitLazyHandle>(value.value_type_id())?
        .get(value)
}

// -----------------------------------------------------------------------------
// PersistentCollection

type Loader<C> = Box<dyn Fn() -> Result<Option<C>, ResolveError> + Send + Sync>;

/// A collection-valued relation that loads on first access.
///
/// The contents are loaded at most once, through the owning [`Session`]; a
/// failed load can be retried. Reflection sees the same shape as `C`, and
/// the value resolves as a [`Deferred`].
///
/// # Examples
///
/// ```
/// use lz_persist::{LazyHandle, PersistentBag, Session};
///
/// let session = Session::open();
/// let items = PersistentBag::uninitialized("Order.items", &session, || Ok(Some(vec![1_u32, 2])));
/// assert!(!items.was_initialized());
///
/// assert!(items.value().unwrap().is_some());
/// assert!(items.was_initialized());
/// assert_eq!(session.fetch_count(), 1);
/// ```
pub struct PersistentCollection<C> {
    role: Cow<'static, str>,
    state: OnceLock<Option<C>>,
    lock: Mutex<()>,
    loader: Option<Loader<C>>,
    session: Option<Session>,
}

/// A list-valued relation without ordering.
pub type PersistentBag<T> = PersistentCollection<Vec<T>>;
/// A list-valued relation with an index column.
pub type PersistentList<T> = PersistentCollection<Vec<T>>;
pub type PersistentSet<T> = PersistentCollection<BTreeSet<T>>;
pub type PersistentMap<K, V> = PersistentCollection<BTreeMap<K, V>>;

impl<C: Send + Sync + 'static> PersistentCollection<C> {
    /// Creates a loaded collection. `None` stands for a relation without a
    /// collection.
    pub fn initialized(role: impl Into<Cow<'static, str>>, value: impl Into<Option<C>>) -> Self {
        Self {
            role: role.into(),
            state: OnceLock::from(value.into()),
            lock: Mutex::new(()),
            loader: None,
            session: None,
        }
    }

    /// Creates a collection that loads through `session` on first access.
    pub fn uninitialized(
        role: impl Into<Cow<'static, str>>,
        session: &Session,
        loader: impl Fn() -> Result<Option<C>, ResolveError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            role: role.into(),
            state: OnceLock::new(),
            lock: Mutex::new(()),
            loader: Some(Box::new(loader)),
            session: Some(session.clone()),
        }
    }

    /// Creates an uninitialized collection that is not attached to any
    /// session. Accessing it fails with [`FetchError::NoSession`].
    pub fn detached(role: impl Into<Cow<'static, str>>) -> Self {
        Self {
            role: role.into(),
            state: OnceLock::new(),
            lock: Mutex::new(()),
            loader: None,
            session: None,
        }
    }

    #[inline]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Returns the contents if they are loaded, without loading them.
    #[inline]
    pub fn get(&self) -> Option<Option<&C>> {
        self.state.get().map(Option::as_ref)
    }

    /// Returns the contents, loading them first if needed.
    pub fn load(&self) -> Result<Option<&C>, FetchError> {
        if let Some(value) = self.state.get() {
            return Ok(value.as_ref());
        }

        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(value) = self.state.get() {
            return Ok(value.as_ref());
        }

        let target = || format!("a collection of role: {}", self.role);
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| FetchError::NoSession { target: target() })?;
        if !session.is_open() {
            return Err(FetchError::SessionClosed { target: target() });
        }
        let loader = self
            .loader
            .as_ref()
            .ok_or_else(|| FetchError::MissingLoader { target: target() })?;

        log::trace!("initializing collection `{}`", self.role);
        let value = loader().map_err(|source| FetchError::Load {
            target: target(),
            source,
        })?;
        session.record_fetch();

        Ok(self.state.get_or_init(|| value).as_ref())
    }
}

impl<C: Value> LazyHandle for PersistentCollection<C> {
    #[inline]
    fn was_initialized(&self) -> bool {
        self.state.get().is_some()
    }

    fn value(&self) -> Result<Option<&dyn Value>, FetchError> {
        Ok(self.load()?.map(|value| value as &dyn Value))
    }

    #[inline]
    fn role(&self) -> &str {
        &self.role
    }
}

impl<C: Value> Deferred for PersistentCollection<C> {
    #[inline]
    fn is_resolved(&self) -> bool {
        self.was_initialized()
    }

    fn resolve(&self) -> Result<Option<&dyn Value>, ResolveError> {
        Ok(LazyHandle::value(self)?)
    }
}

impl<C: Value> Value for PersistentCollection<C> {
    #[inline]
    fn reflect_type(&self) -> Type {
        Type::of::<Self>()
    }

    #[inline]
    fn reflect_ref(&self) -> ValueRef<'_> {
        ValueRef::Deferred(self)
    }
}

impl<C: Typed> Typed for PersistentCollection<C> {
    fn type_info() -> TypeInfo {
        C::type_info().retyped(Type::of::<Self>())
    }
}

impl<C: GetTypeMeta + Value> GetTypeMeta for PersistentCollection<C> {
    fn get_type_meta() -> TypeMeta {
        let mut meta = TypeMeta::of::<Self>();
        meta.insert_trait(<TypeTraitLazyHandle as FromType<Self>>::from_type());
        meta
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<C>();
    }
}

impl<C> core::fmt::Debug for PersistentCollection<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PersistentCollection")
            .field("role", &self.role)
            .field("initialized", &self.state.get().is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use core::sync::atomic::{AtomicUsize, Ordering};

    use lz_reflect::Value;
    use lz_reflect::info::{TypeKind, Typed};
    use lz_reflect::ops::ValueRef;
    use lz_reflect::registry::TypeRegistry;

    use super::{LazyHandle, PersistentBag, PersistentMap, lazy_handle};
    use crate::{FetchError, Session};

    #[test]
    fn loads_once_through_the_session() {
        let session = Session::open();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let bag = PersistentBag::uninitialized("Order.items", &session, move || {
            counter.fetch_add(1, Ordering::Relaxed);
            Ok(Some(vec![1_u8, 2, 3]))
        });

        assert!(!bag.was_initialized());
        assert_eq!(bag.load().unwrap(), Some(&vec![1, 2, 3]));
        assert_eq!(bag.load().unwrap(), Some(&vec![1, 2, 3]));
        assert_eq!(calls.load(Ordering::Relaxed), 1);
        assert_eq!(session.fetch_count(), 1);
        assert!(bag.was_initialized());
    }

    #[test]
    fn loading_needs_an_open_session() {
        let session = Session::open();
        let bag = PersistentBag::<u8>::uninitialized("Order.items", &session, || Ok(Some(vec![])));
        session.close();

        let err = bag.value().unwrap_err();
        assert!(matches!(err, FetchError::SessionClosed { .. }));
        assert_eq!(
            err.to_string(),
            "failed to lazily initialize a collection of role: Order.items, the owning Session was closed"
        );

        let detached = PersistentBag::<u8>::detached("Order.items");
        let err = detached.value().unwrap_err();
        assert!(matches!(err, FetchError::NoSession { .. }));
        assert_eq!(session.fetch_count(), 0);
    }

    #[test]
    fn failed_loads_can_be_retried() {
        let session = Session::open();
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();
        let bag = PersistentBag::uninitialized("Order.items", &session, move || {
            if counter.fetch_add(1, Ordering::Relaxed) == 0 {
                Err("connection reset".into())
            } else {
                Ok(Some(vec![7_u8]))
            }
        });

        let err = bag.load().unwrap_err();
        assert_eq!(err.target(), "a collection of role: Order.items");
        assert!(matches!(err, FetchError::Load { .. }));
        assert_eq!(bag.load().unwrap(), Some(&vec![7]));
    }

    #[test]
    fn reflects_as_deferred_with_the_shape_of_its_contents() {
        assert_eq!(PersistentMap::<String, u8>::type_info().kind(), TypeKind::Map);
        assert_eq!(PersistentBag::<u8>::type_info().kind(), TypeKind::List);

        let bag = PersistentBag::<u8>::initialized("Order.items", None);
        let value: &dyn Value = &bag;
        let ValueRef::Deferred(deferred) = value.reflect_ref() else {
            panic!("expected a deferred value");
        };
        assert!(deferred.is_resolved());
        assert!(deferred.resolve().unwrap().is_none());
    }

    #[test]
    fn registered_handles_are_found_from_values() {
        let mut registry = TypeRegistry::new();
        registry.register::<PersistentBag<u8>>();
        assert!(registry.contains_type::<Vec<u8>>());

        let bag = PersistentBag::initialized("Order.items", vec![1_u8]);
        let handle = lazy_handle(&bag, &registry).unwrap();
        assert_eq!(handle.role(), "Order.items");
        assert!(lazy_handle(&vec![1_u8], &registry).is_none());
    }
}
