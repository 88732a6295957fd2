use alloc::sync::Arc;

use lz_persist::{FetchPolicy, lazy_handle};
use lz_reflect::Value;
use lz_reflect::info::FieldInfo;
use lz_reflect::registry::TypeMeta;
use lz_serde::{
    ContextualSerializer, Output, SerializeError, SerializerModifier, SerializerProvider,
    SharedSerializer, TypeSerializer, ValueSerializer,
};

// -----------------------------------------------------------------------------
// PersistentCollectionSerializer

/// Wraps the serializer of a collection or map type and decides, per
/// property, whether lazy collections are loaded.
///
/// Bound to a property that is fetched lazily, and with neither force flag
/// applying, the wrapper stays in place: it writes uninitialized
/// [`LazyHandle`](lz_persist::LazyHandle)s as null without touching them and
/// unwraps initialized ones for the wrapped serializer. Bound to any other
/// property, or to no property at all, it is replaced by the wrapped
/// serializer.
#[derive(Clone, Debug)]
pub struct PersistentCollectionSerializer {
    force_lazy_loading: bool,
    force_loading_element_collection: bool,
    serializer: Option<SharedSerializer>,
}

impl PersistentCollectionSerializer {
    #[inline]
    pub const fn new(
        force_lazy_loading: bool,
        force_loading_element_collection: bool,
        serializer: Option<SharedSerializer>,
    ) -> Self {
        Self {
            force_lazy_loading,
            force_loading_element_collection,
            serializer,
        }
    }

    #[inline]
    pub const fn force_lazy_loading(&self) -> bool {
        self.force_lazy_loading
    }

    #[inline]
    pub const fn force_loading_element_collection(&self) -> bool {
        self.force_loading_element_collection
    }

    /// The wrapped serializer.
    #[inline]
    pub fn serializer(&self) -> Option<&SharedSerializer> {
        self.serializer.as_ref()
    }

    /// Returns `true` if `property` is mapped as a lazily fetched relation.
    pub fn uses_lazy_loading(property: Option<&FieldInfo>) -> bool {
        FetchPolicy::of_field(property).uses_lazy_loading()
    }

    /// Returns `true` if `property` is mapped as an element collection.
    pub fn is_element_collection(property: Option<&FieldInfo>) -> bool {
        FetchPolicy::of_field(property).is_element_collection()
    }

    #[inline]
    fn forces_loading(&self) -> bool {
        self.force_lazy_loading || self.force_loading_element_collection
    }

    fn delegate(&self) -> Result<&SharedSerializer, SerializeError> {
        self.serializer
            .as_ref()
            .ok_or_else(|| SerializeError::mapping("persistent collection does not have a serializer set"))
    }

    /// Unwraps lazy handles. `None` means null is written instead.
    fn unwrap<'v>(
        &self,
        value: &'v dyn Value,
        provider: &SerializerProvider<'_>,
    ) -> Result<Option<&'v dyn Value>, SerializeError> {
        let Some(handle) = lazy_handle(value, provider.registry()) else {
            return Ok(Some(value));
        };
        if !self.forces_loading() && !handle.was_initialized() {
            log::trace!("writing uninitialized collection `{}` as null", handle.role());
            return Ok(None);
        }
        handle.value().map_err(SerializeError::source)
    }
}

impl ValueSerializer for PersistentCollectionSerializer {
    fn serialize(
        &self,
        value: &dyn Value,
        out: Output<'_>,
        provider: &SerializerProvider<'_>,
    ) -> Result<(), SerializeError> {
        let Some(value) = self.unwrap(value, provider)? else {
            return provider.default_serialize_null(out);
        };
        self.delegate()?.serialize(value, out, provider)
    }

    fn serialize_with_type(
        &self,
        value: &dyn Value,
        out: Output<'_>,
        provider: &SerializerProvider<'_>,
        type_ser: &TypeSerializer,
    ) -> Result<(), SerializeError> {
        let Some(value) = self.unwrap(value, provider)? else {
            return provider.default_serialize_null(out);
        };
        self.delegate()?
            .serialize_with_type(value, out, provider, type_ser)
    }

    /// Never loads. An uninitialized handle is empty unless this wrapper
    /// forces loading, in which case it is reported non-empty, so a forced
    /// load that yields no elements is still written as `[]`. A handle that
    /// fails to produce its value is non-empty, leaving the error to
    /// `serialize`.
    fn is_empty(&self, value: &dyn Value, provider: &SerializerProvider<'_>) -> bool {
        let value = match lazy_handle(value, provider.registry()) {
            Some(handle) if !handle.was_initialized() => return !self.forces_loading(),
            Some(handle) => match handle.value() {
                Ok(Some(value)) => value,
                Ok(None) => return true,
                Err(_) => return false,
            },
            None => value,
        };
        self.serializer
            .as_ref()
            .is_some_and(|serializer| serializer.is_empty(value, provider))
    }

    fn as_contextual(&self) -> Option<&dyn ContextualSerializer> {
        Some(self)
    }

    fn name(&self) -> &'static str {
        "PersistentCollectionSerializer"
    }
}

impl ContextualSerializer for PersistentCollectionSerializer {
    fn create_contextual(
        &self,
        provider: &SerializerProvider<'_>,
        property: Option<&FieldInfo>,
    ) -> Result<Option<SharedSerializer>, SerializeError> {
        let policy = FetchPolicy::of_field(property);
        let force_element_collection =
            self.force_loading_element_collection && policy.is_element_collection();

        if self.force_lazy_loading || force_element_collection || !policy.uses_lazy_loading() {
            let Some(serializer) = &self.serializer else {
                return Ok(None);
            };
            log::trace!(
                "property `{}` is loaded eagerly, using the wrapped serializer",
                property.map_or("<root>", FieldInfo::name)
            );
            return provider.contextualize(serializer, property).map(Some);
        }

        log::trace!(
            "property `{}` is loaded lazily",
            property.map_or("<root>", FieldInfo::name)
        );
        Ok(None)
    }
}

// -----------------------------------------------------------------------------
// OrmSerializerModifier

/// Wraps collection and map serializers in a
/// [`PersistentCollectionSerializer`].
#[derive(Clone, Copy, Debug)]
pub struct OrmSerializerModifier {
    force_lazy_loading: bool,
    force_loading_element_collection: bool,
}

impl OrmSerializerModifier {
    #[inline]
    pub const fn new(force_lazy_loading: bool, force_loading_element_collection: bool) -> Self {
        Self {
            force_lazy_loading,
            force_loading_element_collection,
        }
    }

    fn wrap(&self, serializer: SharedSerializer) -> SharedSerializer {
        Arc::new(PersistentCollectionSerializer::new(
            self.force_lazy_loading,
            self.force_loading_element_collection,
            Some(serializer),
        ))
    }
}

impl SerializerModifier for OrmSerializerModifier {
    fn modify_collection_serializer(&self, _meta: &TypeMeta, serializer: SharedSerializer) -> SharedSerializer {
        self.wrap(serializer)
    }

    fn modify_map_serializer(&self, _meta: &TypeMeta, serializer: SharedSerializer) -> SharedSerializer {
        self.wrap(serializer)
    }
}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeSet;
    use alloc::string::{String, ToString};
    use alloc::sync::Arc;
    use alloc::vec;
    use alloc::vec::Vec;

    use lz_persist::{FetchError, PersistentBag, PersistentSet, Proxy, Session};
    use lz_reflect::info::{CustomAttributes, Type};
    use lz_serde::ser::{CollectionSerializer, ScalarSerializer, StructSerializer, UnwrapSingle};
    use lz_serde::{Inclusion, ObjectMapper, SerializeError, SharedSerializer, TypeSerializer};

    use super::PersistentCollectionSerializer;
    use crate::fixtures::{
        Order, Tripwire, eager_one_to_one, lazy_element_collection, lazy_one_to_many, plain_mapper,
        property, try_write, unannotated, write,
    };
    use crate::{Features, OrmModule};

    fn wrapped(force: bool, force_ec: bool) -> (SharedSerializer, SharedSerializer) {
        let delegate: SharedSerializer = Arc::new(CollectionSerializer::new());
        let wrapper: SharedSerializer =
            Arc::new(PersistentCollectionSerializer::new(force, force_ec, Some(delegate.clone())));
        (wrapper, delegate)
    }

    #[test]
    fn eager_properties_step_aside_for_the_delegate() {
        let mapper = plain_mapper();
        let provider = mapper.provider();
        let delegate: SharedSerializer = Arc::new(ScalarSerializer);
        let wrapper: SharedSerializer =
            Arc::new(PersistentCollectionSerializer::new(false, false, Some(delegate.clone())));

        for field in [Some(eager_one_to_one()), Some(unannotated()), None] {
            let resolved = provider.contextualize(&wrapper, field.as_ref()).unwrap();
            assert!(Arc::ptr_eq(&resolved, &delegate));
        }
    }

    #[test]
    fn contextual_delegates_are_contextualized() {
        let mapper = plain_mapper();
        let provider = mapper.provider();
        let (wrapper, delegate) = wrapped(false, false);

        let field = property(CustomAttributes::new().with_attribute(UnwrapSingle));
        let resolved = provider.contextualize(&wrapper, Some(&field)).unwrap();
        assert!(!Arc::ptr_eq(&resolved, &delegate));
        let resolved = resolved.downcast_ref::<CollectionSerializer>().unwrap();
        assert!(resolved.unwrap_single());
    }

    #[test]
    fn stepping_aside_writes_like_the_raw_value() {
        let mapper = plain_mapper();
        let provider = mapper.provider();
        let (wrapper, delegate) = wrapped(false, false);
        let resolved = provider.contextualize(&wrapper, Some(&eager_one_to_one())).unwrap();
        assert!(!resolved.is::<PersistentCollectionSerializer>());

        let bag = PersistentBag::initialized("Order.items", vec![1_u32, 2, 3]);
        assert_eq!(write(&*resolved, &bag, &mapper), write(&*delegate, &vec![1_u32, 2, 3], &mapper));
    }

    #[test]
    fn lazy_properties_keep_the_wrapper() {
        let mapper = plain_mapper();
        let provider = mapper.provider();
        let (wrapper, _) = wrapped(false, false);

        for field in [lazy_one_to_many(), lazy_element_collection()] {
            let resolved = provider.contextualize(&wrapper, Some(&field)).unwrap();
            assert!(Arc::ptr_eq(&resolved, &wrapper));
        }
    }

    #[test]
    fn force_flags_step_aside() {
        let mapper = plain_mapper();
        let provider = mapper.provider();

        let (wrapper, delegate) = wrapped(true, false);
        let resolved = provider.contextualize(&wrapper, Some(&lazy_one_to_many())).unwrap();
        assert!(Arc::ptr_eq(&resolved, &delegate));

        let (wrapper, delegate) = wrapped(false, true);
        let resolved = provider.contextualize(&wrapper, Some(&lazy_element_collection())).unwrap();
        assert!(Arc::ptr_eq(&resolved, &delegate));
        let resolved = provider.contextualize(&wrapper, Some(&lazy_one_to_many())).unwrap();
        assert!(Arc::ptr_eq(&resolved, &wrapper));
    }

    #[test]
    fn uninitialized_handles_are_null_without_access() {
        let mapper = plain_mapper();
        let (wrapper, _) = wrapped(false, false);
        let handle = Tripwire::armed();

        assert_eq!(write(&*wrapper, &handle, &mapper), "null");
        assert_eq!(handle.calls(), 0);
    }

    #[test]
    fn forced_loading_unwraps_once() {
        let mapper = plain_mapper();
        for (force, force_ec) in [(true, false), (false, true)] {
            let (wrapper, _) = wrapped(force, force_ec);
            let handle = Tripwire::uninitialized(vec![4, 5]);

            assert_eq!(write(&*wrapper, &handle, &mapper), "[4,5]");
            assert_eq!(handle.calls(), 1);
        }
    }

    #[test]
    fn initialized_null_is_null() {
        let mapper = plain_mapper();
        for (force, force_ec) in [(false, false), (true, false), (false, true), (true, true)] {
            let (wrapper, _) = wrapped(force, force_ec);
            let handle = Tripwire::initialized(None);
            assert_eq!(write(&*wrapper, &handle, &mapper), "null");
        }
    }

    #[test]
    fn initialized_handles_write_like_their_contents() {
        let mapper = plain_mapper();
        let (wrapper, delegate) = wrapped(false, false);
        let bag = PersistentBag::initialized("Order.items", vec![1_u32, 2, 3]);

        let direct = write(&*delegate, &vec![1_u32, 2, 3], &mapper);
        assert_eq!(direct, "[1,2,3]");
        assert_eq!(write(&*wrapper, &bag, &mapper), direct);
        assert_eq!(write(&*wrapper, &bag, &mapper), direct);
    }

    #[test]
    fn plain_values_pass_through() {
        let mapper = plain_mapper();
        let (wrapper, _) = wrapped(false, false);
        assert_eq!(write(&*wrapper, &vec![9_u32], &mapper), "[9]");
    }

    #[test]
    fn type_information_is_forwarded() {
        let mapper = plain_mapper();
        let (wrapper, _) = wrapped(false, false);
        let bag = PersistentBag::initialized("Order.items", vec![1_u32]);

        let json = try_write(&*wrapper, &bag, &mapper, Some(&TypeSerializer::wrapper_object())).unwrap();
        assert_eq!(json, r#"{"Vec":[1]}"#);

        let handle = Tripwire::armed();
        let json = try_write(&*wrapper, &handle, &mapper, Some(&TypeSerializer::wrapper_array())).unwrap();
        assert_eq!(json, "null");
    }

    #[test]
    fn missing_delegate_is_a_mapping_error() {
        let mapper = plain_mapper();
        let provider = mapper.provider();
        let wrapper: SharedSerializer = Arc::new(PersistentCollectionSerializer::new(false, false, None));

        let resolved = provider.contextualize(&wrapper, Some(&eager_one_to_one())).unwrap();
        assert!(Arc::ptr_eq(&resolved, &wrapper));

        let bag = PersistentBag::initialized("Order.items", vec![1_u32]);
        let err = try_write(&*wrapper, &bag, &mapper, None).unwrap_err();
        assert!(err.is_mapping());
        assert_eq!(
            err.to_string(),
            "mapping error: persistent collection does not have a serializer set"
        );
    }

    #[test]
    fn empty_lazy_values_are_skipped_with_non_empty_inclusion() {
        let mapper = plain_mapper();
        let provider = mapper.provider();
        let (wrapper, _) = wrapped(false, false);

        assert!(wrapper.is_empty(&Tripwire::armed(), &provider));
        assert!(wrapper.is_empty(&Tripwire::initialized(None), &provider));
        assert!(wrapper.is_empty(&Tripwire::initialized(Some(Vec::new())), &provider));
        assert!(!wrapper.is_empty(&Tripwire::initialized(Some(vec![1])), &provider));

        let (forcing, _) = wrapped(true, false);
        let handle = Tripwire::armed();
        assert!(!forcing.is_empty(&handle, &provider));
        assert_eq!(handle.calls(), 0);
    }

    #[test]
    fn failing_lazy_values_are_not_empty() {
        let mapper = plain_mapper();
        let provider = mapper.provider();
        let (wrapper, _) = wrapped(false, false);

        let handle = Tripwire::failing();
        assert!(!wrapper.is_empty(&handle, &provider));
        assert_eq!(handle.calls(), 1);

        let err = try_write(&*wrapper, &handle, &mapper, None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FetchError>(),
            Some(FetchError::SessionClosed { .. })
        ));
    }

    fn order(session: &Session) -> Order {
        Order {
            id: 1,
            items: PersistentBag::uninitialized("Order.items", session, || Ok(Some(vec![10, 20]))),
            tags: PersistentSet::uninitialized("Order.tags", session, || {
                Ok(Some(BTreeSet::from([String::from("new")])))
            }),
            customer: Proxy::detached(7),
            note: "internal".into(),
        }
    }

    #[test]
    fn lazy_properties_of_entities_follow_the_features() {
        let session = Session::open();
        let value = order(&session);

        let mapper = ObjectMapper::builder()
            .register::<Order>()
            .module(OrmModule::new())
            .build()
            .unwrap();
        let json = serde_json::to_string(&mapper.driver(&value)).unwrap();
        assert_eq!(json, r#"{"id":1,"items":null,"tags":null,"customer":null}"#);
        assert_eq!(session.fetch_count(), 0);

        let mapper = ObjectMapper::builder()
            .register::<Order>()
            .module(OrmModule::new().enable(Features::FORCE_LAZY_LOADING_ELEMENT_COLLECTION))
            .build()
            .unwrap();
        let json = serde_json::to_string(&mapper.driver(&value)).unwrap();
        assert_eq!(json, r#"{"id":1,"items":[10,20],"tags":["new"],"customer":null}"#);
        assert_eq!(session.fetch_count(), 2);
    }

    #[test]
    fn non_empty_inclusion_drops_unloaded_collections() {
        let session = Session::open();
        let value = order(&session);
        let mapper = ObjectMapper::builder()
            .register::<Order>()
            .inclusion(Inclusion::NonEmpty)
            .module(OrmModule::new())
            .build()
            .unwrap();
        let json = serde_json::to_string(&mapper.driver(&value)).unwrap();
        assert_eq!(json, r#"{"id":1}"#);
        assert_eq!(session.fetch_count(), 0);
    }

    #[test]
    fn fetch_failures_surface_unchanged() {
        let session = Session::open();
        let value = order(&session);
        session.close();

        let mapper = ObjectMapper::builder()
            .register::<Order>()
            .module(OrmModule::new().enable(Features::FORCE_LAZY_LOADING))
            .build()
            .unwrap();
        let mut out = Vec::new();
        let err = mapper
            .serialize(&value, &mut serde_json::Serializer::new(&mut out))
            .unwrap_err();
        assert!(matches!(err, SerializeError::Source(_)));
        let fetch = err.downcast_ref::<FetchError>().unwrap();
        assert!(matches!(fetch, FetchError::SessionClosed { .. }));
        assert_eq!(fetch.target(), "a collection of role: Order.items");
    }

    #[test]
    fn property_writers_hold_the_contextualized_serializers() {
        let mapper = ObjectMapper::builder()
            .register::<Order>()
            .module(OrmModule::new())
            .build()
            .unwrap();

        let root = mapper.root_serializer(Type::of::<Order>().id()).unwrap();
        let order = root.downcast_ref::<StructSerializer>().unwrap();
        let items = order.property("items").unwrap().serializer();
        assert!(items.is::<PersistentCollectionSerializer>());
        assert!(order.property("note").is_none());

        let bag = mapper.root_serializer(Type::of::<PersistentBag<u32>>().id()).unwrap();
        assert!(bag.is::<CollectionSerializer>());
    }
}
