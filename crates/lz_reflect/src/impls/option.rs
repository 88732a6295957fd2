use crate::Value;
use crate::info::{OptionInfo, Type, TypeInfo, Typed};
use crate::ops::ValueRef;
use crate::registry::{GetTypeMeta, TypeRegistry};

impl<T: Typed> Typed for Option<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::Option(OptionInfo::new::<Self, T>())
    }
}

impl<T: GetTypeMeta> GetTypeMeta for Option<T> {
    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<T>();
    }
}

impl<T: Value> Value for Option<T> {
    #[inline]
    fn reflect_type(&self) -> Type {
        Type::of::<Self>()
    }

    #[inline]
    fn reflect_ref(&self) -> ValueRef<'_> {
        ValueRef::Option(self.as_ref().map(|v| v as &dyn Value))
    }
}
