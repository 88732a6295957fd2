use alloc::boxed::Box;
use core::fmt::Display;
use std::sync::{Mutex, OnceLock, PoisonError};

use lz_reflect::info::{OpaqueInfo, Type, TypeInfo, Typed};
use lz_reflect::ops::ValueRef;
use lz_reflect::registry::{FromType, GetTypeMeta, TypeMeta, TypeRegistry, TypeTrait};
use lz_reflect::{Deferred, ResolveError, Value};

use crate::{FetchError, Session};

// -----------------------------------------------------------------------------
// Entity

/// A mapped entity type.
pub trait Entity: Value + GetTypeMeta {
    /// The name the entity is mapped under.
    const ENTITY_NAME: &'static str;

    type Id: Value + GetTypeMeta + Clone + Display;
}

// -----------------------------------------------------------------------------
// Proxy traits

/// The loading state behind an [`EntityProxy`].
pub trait LazyInitializer {
    fn entity_name(&self) -> &str;

    /// The identifier of the proxied entity. Available without loading.
    fn identifier(&self) -> &dyn Value;

    fn is_uninitialized(&self) -> bool;

    /// The session the entity loads through, if attached.
    fn session(&self) -> Option<&Session>;

    /// Returns the entity, loading it first if needed.
    fn implementation(&self) -> Result<&dyn Value, FetchError>;
}

/// A stand-in for an entity that may not be loaded yet.
pub trait EntityProxy {
    fn lazy_initializer(&self) -> &dyn LazyInitializer;
}

/// Marks a type as an [`EntityProxy`] and recovers it from a type-erased
/// value.
#[derive(Clone, Copy)]
pub struct TypeTraitProxy {
    from_value: fn(&dyn Value) -> Option<&dyn EntityProxy>,
}

impl TypeTraitProxy {
    #[inline]
    pub fn get<'a>(&self, value: &'a dyn Value) -> Option<&'a dyn EntityProxy> {
        (self.from_value)(value)
    }
}

impl TypeTrait for TypeTraitProxy {}

impl<T: EntityProxy + Value> FromType<T> for TypeTraitProxy {
    fn from_type() -> Self {
        Self {
            from_value: |value| value.downcast_ref::<T>().map(|proxy| proxy as &dyn EntityProxy),
        }
    }
}

/// Returns `value` as an [`EntityProxy`] if its type is registered as one.
pub fn entity_proxy<'a>(value: &'a dyn Value, registry: &TypeRegistry) -> Option<&'a dyn EntityProxy> {
    registry
        .get_type_trait::<TypeTraitProxy>(value.value_type_id())?
        .get(value)
}

// -----------------------------------------------------------------------------
// Proxy

type EntityLoader<E> =
    Box<dyn Fn(&<E as Entity>::Id) -> Result<Option<E>, ResolveError> + Send + Sync>;

/// A reference to an entity of type `E`, loaded on first access.
///
/// # Examples
///
/// ```
/// use lz_persist::{Entity, EntityProxy, Proxy, Session};
/// use lz_reflect::impl_struct;
///
/// struct User {
///     id: u64,
/// }
///
/// impl_struct! {
///     User { id: u64 }
/// }
///
/// impl Entity for User {
///     const ENTITY_NAME: &'static str = "User";
///     type Id = u64;
/// }
///
/// let session = Session::open();
/// let user = Proxy::<User>::uninitialized(7, &session, |id| Ok(Some(User { id: *id })));
///
/// let init = user.lazy_initializer();
/// assert!(init.is_uninitialized());
/// assert_eq!(init.identifier().downcast_ref::<u64>(), Some(&7));
///
/// assert_eq!(user.entity().unwrap().id, 7);
/// assert_eq!(session.fetch_count(), 1);
/// ```
pub struct Proxy<E: Entity> {
    id: E::Id,
    target: OnceLock<E>,
    lock: Mutex<()>,
    loader: Option<EntityLoader<E>>,
    session: Option<Session>,
}

impl<E: Entity> Proxy<E> {
    /// Creates a proxy around an already loaded entity.
    pub fn initialized(id: E::Id, entity: E) -> Self {
        Self {
            id,
            target: OnceLock::from(entity),
            lock: Mutex::new(()),
            loader: None,
            session: None,
        }
    }

    /// Creates a proxy that loads through `session` on first access.
    pub fn uninitialized(
        id: E::Id,
        session: &Session,
        loader: impl Fn(&E::Id) -> Result<Option<E>, ResolveError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            id,
            target: OnceLock::new(),
            lock: Mutex::new(()),
            loader: Some(Box::new(loader)),
            session: Some(session.clone()),
        }
    }

    /// Creates an uninitialized proxy that is not attached to any session.
    pub fn detached(id: E::Id) -> Self {
        Self {
            id,
            target: OnceLock::new(),
            lock: Mutex::new(()),
            loader: None,
            session: None,
        }
    }

    #[inline]
    pub fn id(&self) -> &E::Id {
        &self.id
    }

    /// Returns the entity, loading it first if needed.
    pub fn entity(&self) -> Result<&E, FetchError> {
        if let Some(entity) = self.target.get() {
            return Ok(entity);
        }

        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entity) = self.target.get() {
            return Ok(entity);
        }

        let target = || format!("proxy [{}#{}]", E::ENTITY_NAME, self.id);
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

        log::trace!("initializing proxy [{}#{}]", E::ENTITY_NAME, self.id);
        let entity = loader(&self.id)
            .map_err(|source| FetchError::Load {
                target: target(),
                source,
            })?
            .ok_or_else(|| FetchError::NotFound { target: target() })?;
        session.record_fetch();

        Ok(self.target.get_or_init(|| entity))
    }
}

impl<E: Entity> LazyInitializer for Proxy<E> {
    #[inline]
    fn entity_name(&self) -> &str {
        E::ENTITY_NAME
    }

    #[inline]
    fn identifier(&self) -> &dyn Value {
        &self.id
    }

    #[inline]
    fn is_uninitialized(&self) -> bool {
        self.target.get().is_none()
    }

    #[inline]
    fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    fn implementation(&self) -> Result<&dyn Value, FetchError> {
        Ok(self.entity()?)
    }
}

impl<E: Entity> EntityProxy for Proxy<E> {
    #[inline]
    fn lazy_initializer(&self) -> &dyn LazyInitializer {
        self
    }
}

impl<E: Entity> Deferred for Proxy<E> {
    #[inline]
    fn is_resolved(&self) -> bool {
        !self.is_uninitialized()
    }

    fn resolve(&self) -> Result<Option<&dyn Value>, ResolveError> {
        Ok(Some(self.implementation()?))
    }
}

impl<E: Entity> Value for Proxy<E> {
    #[inline]
    fn reflect_type(&self) -> Type {
        Type::of::<Self>()
    }

    #[inline]
    fn reflect_ref(&self) -> ValueRef<'_> {
        ValueRef::Deferred(self)
    }
}

impl<E: Entity> Typed for Proxy<E> {
    fn type_info() -> TypeInfo {
        TypeInfo::Opaque(OpaqueInfo::new::<Self>())
    }
}

impl<E: Entity> GetTypeMeta for Proxy<E> {
    fn get_type_meta() -> TypeMeta {
        let mut meta = TypeMeta::of::<Self>();
        meta.insert_trait(<TypeTraitProxy as FromType<Self>>::from_type());
        meta
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<E>();
        registry.register::<E::Id>();
    }
}

impl<E: Entity> core::fmt::Debug for Proxy<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Proxy")
            .field("entity", &E::ENTITY_NAME)
            .field("id", &format_args!("{}", self.id))
            .field("initialized", &self.target.get().is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use lz_reflect::Value;
    use lz_reflect::impl_struct;
    use lz_reflect::info::{TypeKind, Typed};
    use lz_reflect::registry::TypeRegistry;

    use super::{Entity, EntityProxy, LazyInitializer, Proxy, entity_proxy};
    use crate::{FetchError, Session};

    struct Customer {
        id: u32,
    }

    impl_struct! {
        Customer { id: u32 }
    }

    impl Entity for Customer {
        const ENTITY_NAME: &'static str = "Customer";
        type Id = u32;
    }

    #[test]
    fn identifier_is_known_without_loading() {
        let session = Session::open();
        let proxy = Proxy::<Customer>::uninitialized(3, &session, |_| panic!("must not load"));
        let init = proxy.lazy_initializer();
        assert_eq!(init.entity_name(), "Customer");
        assert_eq!(init.identifier().downcast_ref::<u32>(), Some(&3));
        assert!(init.is_uninitialized());
        assert!(init.session().is_some_and(|s| s.ptr_eq(&session)));
    }

    #[test]
    fn missing_rows_and_closed_sessions_fail() {
        let session = Session::open();
        let proxy = Proxy::<Customer>::uninitialized(9, &session, |_| Ok(None));
        let err = proxy.implementation().unwrap_err();
        assert!(matches!(err, FetchError::NotFound { .. }));
        assert_eq!(err.target(), "proxy [Customer#9]");

        session.close();
        let proxy = Proxy::<Customer>::uninitialized(9, &session, |id| Ok(Some(Customer { id: *id })));
        assert!(matches!(proxy.entity(), Err(FetchError::SessionClosed { .. })));
        assert!(matches!(
            Proxy::<Customer>::detached(1).entity(),
            Err(FetchError::NoSession { .. })
        ));
        assert_eq!(session.fetch_count(), 0);
    }

    #[test]
    fn registered_proxies_are_found_from_values() {
        let mut registry = TypeRegistry::new();
        registry.register::<Proxy<Customer>>();
        assert_eq!(Proxy::<Customer>::type_info().kind(), TypeKind::Opaque);
        assert!(registry.contains_type::<Customer>());

        let proxy = Proxy::initialized(4, Customer { id: 4 });
        let found = entity_proxy(&proxy, &registry).unwrap();
        assert!(!found.lazy_initializer().is_uninitialized());

        let customer = Customer { id: 4 };
        assert!(entity_proxy(&customer as &dyn Value, &registry).is_none());
    }
}
