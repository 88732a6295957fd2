/// Implements [`Value`](crate::Value), [`Struct`](crate::ops::Struct),
/// [`Typed`](crate::info::Typed) and [`GetTypeMeta`](crate::registry::GetTypeMeta)
/// for a struct with named fields.
///
/// Fields may carry attributes with `#[attr(expr)]`; they end up in the
/// field's [`CustomAttributes`](crate::info::CustomAttributes).
///
/// ```
/// use lz_reflect::{impl_struct, info::Typed};
///
/// struct Hidden;
///
/// struct User {
///     name: String,
///     password: String,
/// }
///
/// impl_struct! {
///     User {
///         name: String,
///         #[attr(Hidden)]
///         password: String,
///     }
/// }
///
/// let info = User::type_info();
/// let info = info.as_struct().unwrap();
/// assert!(info.field("password").unwrap().has_attribute::<Hidden>());
/// assert!(!info.field("name").unwrap().has_attribute::<Hidden>());
/// ```
#[macro_export]
macro_rules! impl_struct {
    (
        $ty:ident {
            $( $(#[attr($attr:expr)])* $field:ident : $fty:ty ),* $(,)?
        }
    ) => {
        impl $ty {
            #[doc(hidden)]
            const __FIELD_NAMES: &'static [&'static str] = &[$(::core::stringify!($field)),*];
        }

        impl $crate::info::Typed for $ty {
            fn type_info() -> $crate::info::TypeInfo {
                $crate::info::TypeInfo::Struct($crate::info::StructInfo::new::<Self>([
                    $(
                        $crate::info::FieldInfo::new::<$fty>(::core::stringify!($field))
                            .with_custom_attributes(
                                $crate::info::CustomAttributes::new()
                                    $(.with_attribute($attr))*
                            ),
                    )*
                ]))
            }
        }

        impl $crate::registry::GetTypeMeta for $ty {
            fn register_dependencies(_registry: &mut $crate::registry::TypeRegistry) {
                $( _registry.register::<$fty>(); )*
            }
        }

        impl $crate::ops::Struct for $ty {
            fn field(&self, name: &str) -> ::core::option::Option<&dyn $crate::Value> {
                match name {
                    $( ::core::stringify!($field) => ::core::option::Option::Some(&self.$field), )*
                    _ => ::core::option::Option::None,
                }
            }

            fn field_at(&self, index: usize) -> ::core::option::Option<&dyn $crate::Value> {
                let name = Self::__FIELD_NAMES.get(index)?;
                $crate::ops::Struct::field(self, name)
            }

            fn field_len(&self) -> usize {
                Self::__FIELD_NAMES.len()
            }
        }

        impl $crate::Value for $ty {
            #[inline]
            fn reflect_type(&self) -> $crate::info::Type {
                $crate::info::Type::of::<Self>()
            }

            #[inline]
            fn reflect_ref(&self) -> $crate::ops::ValueRef<'_> {
                $crate::ops::ValueRef::Struct(self)
            }
        }
    };
}
