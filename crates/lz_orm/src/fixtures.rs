use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

use lz_persist::annotation::{ElementCollection, ManyToOne, OneToMany, OneToOne, Transient};
use lz_persist::{
    Entity, FetchError, LazyHandle, PersistentBag, PersistentSet, Proxy, TypeTraitLazyHandle,
};
use lz_reflect::info::{CustomAttributes, FieldInfo, Type, TypeInfo, Typed};
use lz_reflect::ops::ValueRef;
use lz_reflect::registry::{FromType, GetTypeMeta, TypeMeta, TypeRegistry};
use lz_reflect::{Deferred, ResolveError, Value, impl_struct};
use lz_serde::{Bound, ObjectMapper, SerializeError, TypeSerializer, ValueSerializer};

// -----------------------------------------------------------------------------
// Entities

pub struct Customer {
    pub id: u64,
    pub name: String,
}

impl_struct! {
    Customer {
        id: u64,
        name: String,
    }
}

impl Entity for Customer {
    const ENTITY_NAME: &'static str = "Customer";
    type Id = u64;
}

pub struct Order {
    pub id: u32,
    pub items: PersistentBag<u32>,
    pub tags: PersistentSet<String>,
    pub customer: Proxy<Customer>,
    pub note: String,
}

impl_struct! {
    Order {
        id: u32,
        #[attr(OneToMany::LAZY)]
        items: PersistentBag<u32>,
        #[attr(ElementCollection::default())]
        tags: PersistentSet<String>,
        #[attr(ManyToOne::LAZY)]
        customer: Proxy<Customer>,
        #[attr(Transient)]
        note: String,
    }
}

// -----------------------------------------------------------------------------
// Properties

pub fn property(attributes: CustomAttributes) -> FieldInfo {
    FieldInfo::new::<PersistentBag<u32>>("items").with_custom_attributes(attributes)
}

pub fn lazy_one_to_many() -> FieldInfo {
    property(CustomAttributes::new().with_attribute(OneToMany::LAZY))
}

pub fn eager_one_to_one() -> FieldInfo {
    property(CustomAttributes::new().with_attribute(OneToOne::EAGER))
}

pub fn lazy_element_collection() -> FieldInfo {
    property(CustomAttributes::new().with_attribute(ElementCollection::LAZY))
}

pub fn unannotated() -> FieldInfo {
    property(CustomAttributes::new())
}

// -----------------------------------------------------------------------------
// Tripwire

/// A lazy handle that counts accesses to its value and can be armed to
/// panic on access.
pub struct Tripwire {
    initialized: bool,
    armed: bool,
    failing: bool,
    contents: Option<Vec<u32>>,
    calls: AtomicUsize,
}

impl Tripwire {
    /// Uninitialized; accessing the value panics.
    pub fn armed() -> Self {
        Self {
            initialized: false,
            armed: true,
            failing: false,
            contents: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Uninitialized; accessing the value yields `contents`.
    pub fn uninitialized(contents: Vec<u32>) -> Self {
        Self {
            initialized: false,
            armed: false,
            failing: false,
            contents: Some(contents),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn initialized(contents: Option<Vec<u32>>) -> Self {
        Self {
            initialized: true,
            armed: false,
            failing: false,
            contents,
            calls: AtomicUsize::new(0),
        }
    }

    /// Initialized, but accessing the value fails as if the session closed.
    pub fn failing() -> Self {
        Self {
            initialized: true,
            armed: false,
            failing: true,
            contents: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl LazyHandle for Tripwire {
    fn was_initialized(&self) -> bool {
        self.initialized
    }

    fn value(&self) -> Result<Option<&dyn Value>, FetchError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        assert!(!self.armed, "lazy value was accessed");
        if self.failing {
            return Err(FetchError::SessionClosed {
                target: self.role().to_string(),
            });
        }
        Ok(self.contents.as_ref().map(|c| c as &dyn Value))
    }

    fn role(&self) -> &str {
        "Tripwire.contents"
    }
}

impl Deferred for Tripwire {
    fn is_resolved(&self) -> bool {
        self.initialized
    }

    fn resolve(&self) -> Result<Option<&dyn Value>, ResolveError> {
        Ok(LazyHandle::value(self)?)
    }
}

impl Value for Tripwire {
    fn reflect_type(&self) -> Type {
        Type::of::<Self>()
    }

    fn reflect_ref(&self) -> ValueRef<'_> {
        ValueRef::Deferred(self)
    }
}

impl Typed for Tripwire {
    fn type_info() -> TypeInfo {
        Vec::<u32>::type_info().retyped(Type::of::<Self>())
    }
}

impl GetTypeMeta for Tripwire {
    fn get_type_meta() -> TypeMeta {
        let mut meta = TypeMeta::of::<Self>();
        meta.insert_trait(<TypeTraitLazyHandle as FromType<Self>>::from_type());
        meta
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<Vec<u32>>();
    }
}

// -----------------------------------------------------------------------------
// Output

/// A mapper that only knows the host defaults for the fixture types.
pub fn plain_mapper() -> ObjectMapper {
    ObjectMapper::builder()
        .register::<Tripwire>()
        .register::<PersistentBag<u32>>()
        .build()
        .unwrap()
}

/// Writes `value` with `serializer` as JSON.
pub fn try_write(
    serializer: &dyn ValueSerializer,
    value: &dyn Value,
    mapper: &ObjectMapper,
    type_ser: Option<&TypeSerializer>,
) -> Result<String, SerializeError> {
    let provider = mapper.provider();
    let bound = Bound::new(serializer, value, &provider);
    let result = match type_ser {
        Some(type_ser) => serde_json::to_string(&bound.with_type(type_ser)),
        None => serde_json::to_string(&bound),
    };
    result.map_err(|err| {
        provider
            .take_failure()
            .unwrap_or_else(|| SerializeError::Format(err.to_string()))
    })
}

pub fn write(serializer: &dyn ValueSerializer, value: &dyn Value, mapper: &ObjectMapper) -> String {
    try_write(serializer, value, mapper, None).unwrap()
}
