//! [`Reflect`] for standard library and `serde_json` types

use super::{Reflect, TypeDescriptor};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

macro_rules! reflect_as {
    ($constructor:ident => $($ty:ty),+ $(,)?) => {
        $(
            impl Reflect for $ty {
                fn reflect() -> TypeDescriptor {
                    TypeDescriptor::$constructor()
                }
            }
        )+
    };
}

reflect_as!(string => String, str);
reflect_as!(boolean => bool);
reflect_as!(integer => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
reflect_as!(number => f32, f64);
reflect_as!(null => ());

impl<T: Reflect> Reflect for Option<T> {
    fn reflect() -> TypeDescriptor {
        TypeDescriptor::optional(T::reflect())
    }
}

impl<T: Reflect + ?Sized> Reflect for Box<T> {
    fn reflect() -> TypeDescriptor {
        T::reflect()
    }
}

impl<T: Reflect + ?Sized> Reflect for Rc<T> {
    fn reflect() -> TypeDescriptor {
        T::reflect()
    }
}

impl<T: Reflect + ?Sized> Reflect for Arc<T> {
    fn reflect() -> TypeDescriptor {
        T::reflect()
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn reflect() -> TypeDescriptor {
        TypeDescriptor::sequence(T::reflect())
    }
}

impl<T: Reflect> Reflect for VecDeque<T> {
    fn reflect() -> TypeDescriptor {
        TypeDescriptor::sequence(T::reflect())
    }
}

impl<T: Reflect> Reflect for [T] {
    fn reflect() -> TypeDescriptor {
        TypeDescriptor::sequence(T::reflect())
    }
}

impl<T: Reflect, S> Reflect for HashSet<T, S> {
    fn reflect() -> TypeDescriptor {
        TypeDescriptor::sequence(T::reflect())
    }
}

impl<T: Reflect> Reflect for BTreeSet<T> {
    fn reflect() -> TypeDescriptor {
        TypeDescriptor::sequence(T::reflect())
    }
}

impl<V: Reflect, S> Reflect for HashMap<String, V, S> {
    fn reflect() -> TypeDescriptor {
        TypeDescriptor::map(V::reflect())
    }
}

impl<V: Reflect> Reflect for BTreeMap<String, V> {
    fn reflect() -> TypeDescriptor {
        TypeDescriptor::map(V::reflect())
    }
}

impl Reflect for serde_json::Value {
    fn reflect() -> TypeDescriptor {
        TypeDescriptor::Any
    }
}

impl Reflect for serde_json::Map<String, serde_json::Value> {
    fn reflect() -> TypeDescriptor {
        TypeDescriptor::map(TypeDescriptor::Any)
    }
}
