use alloc::boxed::Box;
use alloc::collections::{BTreeMap, BTreeSet, VecDeque};
use alloc::vec::Vec;

use crate::Value;
use crate::info::{ListInfo, MapInfo, Type, TypeInfo, Typed};
use crate::ops::{List, Map, ValueRef};
use crate::registry::{GetTypeMeta, TypeRegistry};

// -----------------------------------------------------------------------------
// Lists

macro_rules! impl_list {
    ($($ty:ident),*) => {
        $(
            impl<T: Typed> Typed for $ty<T> {
                fn type_info() -> TypeInfo {
                    TypeInfo::List(ListInfo::new::<Self, T>())
                }
            }

            impl<T: GetTypeMeta> GetTypeMeta for $ty<T> {
                fn register_dependencies(registry: &mut TypeRegistry) {
                    registry.register::<T>();
                }
            }

            impl<T: Value> List for $ty<T> {
                #[inline]
                fn len(&self) -> usize {
                    <$ty<T>>::len(self)
                }

                fn iter(&self) -> Box<dyn Iterator<Item = &dyn Value> + '_> {
                    Box::new(IntoIterator::into_iter(self).map(|v| v as &dyn Value))
                }
            }

            impl<T: Value> Value for $ty<T> {
                #[inline]
                fn reflect_type(&self) -> Type {
                    Type::of::<Self>()
                }

                #[inline]
                fn reflect_ref(&self) -> ValueRef<'_> {
                    ValueRef::List(self)
                }
            }
        )*
    };
}

impl_list!(Vec, VecDeque, BTreeSet);

// -----------------------------------------------------------------------------
// Maps

impl<K: Typed, V: Typed> Typed for BTreeMap<K, V> {
    fn type_info() -> TypeInfo {
        TypeInfo::Map(MapInfo::new::<Self, K, V>())
    }
}

impl<K: GetTypeMeta, V: GetTypeMeta> GetTypeMeta for BTreeMap<K, V> {
    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<K>();
        registry.register::<V>();
    }
}

impl<K: Value, V: Value> Map for BTreeMap<K, V> {
    #[inline]
    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (&dyn Value, &dyn Value)> + '_> {
        Box::new(BTreeMap::iter(self).map(|(k, v)| (k as &dyn Value, v as &dyn Value)))
    }
}

impl<K: Value, V: Value> Value for BTreeMap<K, V> {
    #[inline]
    fn reflect_type(&self) -> Type {
        Type::of::<Self>()
    }

    #[inline]
    fn reflect_ref(&self) -> ValueRef<'_> {
        ValueRef::Map(self)
    }
}

#[cfg(test)]
mod tests {
    use alloc::collections::{BTreeMap, BTreeSet, VecDeque};
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;

    use crate::Value;
    use crate::ops::ValueRef;

    #[test]
    fn list_iterates_in_order() {
        let value: &dyn Value = &vec![1_u8, 2, 3];
        let ValueRef::List(list) = value.reflect_ref() else {
            panic!("expected a list");
        };
        let items: Vec<u8> = list
            .iter()
            .filter_map(|v| v.downcast_ref::<u8>().copied())
            .collect();
        assert_eq!(items, [1, 2, 3]);
    }

    #[test]
    fn vec_and_deque_list_every_item() {
        let vec: &dyn Value = &vec![String::from("a"), String::from("b")];
        let deque: &dyn Value = &VecDeque::from([4_u16, 5, 6]);
        for (value, expected) in [(vec, 2), (deque, 3)] {
            let ValueRef::List(list) = value.reflect_ref() else {
                panic!("expected a list");
            };
            assert_eq!(list.len(), expected);
            assert_eq!(list.iter().count(), expected);
        }
    }

    #[test]
    fn set_is_a_list() {
        let set: BTreeSet<u8> = [3, 1].into_iter().collect();
        let value: &dyn Value = &set;
        assert!(matches!(value.reflect_ref(), ValueRef::List(l) if l.len() == 2));
    }

    #[test]
    fn map_pairs() {
        let mut map = BTreeMap::new();
        map.insert(String::from("a"), 1_i32);
        let value: &dyn Value = &map;
        let ValueRef::Map(map) = value.reflect_ref() else {
            panic!("expected a map");
        };
        let (k, v) = map.iter().next().unwrap();
        assert_eq!(k.downcast_ref::<String>().map(String::as_str), Some("a"));
        assert_eq!(v.downcast_ref::<i32>(), Some(&1));
    }

    #[test]
    fn option_none() {
        let value: &dyn Value = &None::<u8>;
        assert!(value.reflect_ref().is_none());
    }
}
