use alloc::string::String;

use crate::Value;
use crate::info::{ScalarInfo, Type, TypeInfo, Typed};
use crate::ops::ValueRef;
use crate::registry::GetTypeMeta;

macro_rules! impl_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Typed for $ty {
                fn type_info() -> TypeInfo {
                    TypeInfo::Scalar(ScalarInfo::new::<Self>())
                }
            }

            impl GetTypeMeta for $ty {}

            impl Value for $ty {
                #[inline]
                fn reflect_type(&self) -> Type {
                    Type::of::<Self>()
                }

                #[inline]
                fn reflect_ref(&self) -> ValueRef<'_> {
                    ValueRef::Scalar(self)
                }
            }
        )*
    };
}

impl_scalar!(
    (),
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    f32,
    f64,
    String,
    &'static str,
);
