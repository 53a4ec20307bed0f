//! Reflection of host types into [`TypeDescriptor`]s.
//!
//! `evaluate::<T>` spells the compiled accessor's return type from
//! `T::descriptor()`, then moves a `T` out of the loaded library. Both sides
//! must therefore agree on the type's layout, and the value must not point
//! back into the library once it is unloaded.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use crate::{ModuleRef, QualifiedName, TypeDescriptor};

/// Types that can be returned from a compiled expression.
///
/// # Safety
///
/// Implementors promise that:
///
/// - `descriptor()` renders to a spelling that names exactly `Self` when
///   compiled against the same references by the same `rustc` that built the
///   host, so both sides share one layout.
/// - A value of `Self` owns all of its data. It holds no references, function
///   pointers, trait objects or other pointers into the compiled library's
///   code or statics, because the library is unloaded before the value is
///   handed back.
/// - Any heap memory it owns is allocated through the system allocator, which
///   the compiled library also uses.
pub unsafe trait Reflect: Sized + 'static {
    /// Describe this type.
    fn descriptor() -> TypeDescriptor;
}

macro_rules! reflect_primitive {
    ($($ty:ty),* $(,)?) => {
        $(
            unsafe impl Reflect for $ty {
                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::new(QualifiedName::global(stringify!($ty)), ModuleRef::core())
                }
            }
        )*
    };
}

reflect_primitive!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, ()
);

unsafe impl Reflect for String {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new("std::string::String", ModuleRef::std())
    }
}

macro_rules! reflect_generic {
    ($path:literal, $ty:ident < $($param:ident),+ >) => {
        unsafe impl<$($param: Reflect),+> Reflect for $ty<$($param),+> {
            fn descriptor() -> TypeDescriptor {
                let args = vec![$($param::descriptor()),+];
                TypeDescriptor::generic($path, ModuleRef::std(), args.len()).instantiate(args)
            }
        }
    };
}

reflect_generic!("std::vec::Vec", Vec<T>);
reflect_generic!("std::collections::VecDeque", VecDeque<T>);
reflect_generic!("std::option::Option", Option<T>);
reflect_generic!("std::result::Result", Result<T, E>);
reflect_generic!("std::boxed::Box", Box<T>);
reflect_generic!("std::collections::HashSet", HashSet<T>);
reflect_generic!("std::collections::BTreeSet", BTreeSet<T>);
reflect_generic!("std::collections::HashMap", HashMap<K, V>);
reflect_generic!("std::collections::BTreeMap", BTreeMap<K, V>);
