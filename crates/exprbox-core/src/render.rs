//! Type-name rendering.
//!
//! Converts a [`TypeDescriptor`] into the exact spelling the generated source
//! uses for it. Names are rendered bare; the import header is responsible for
//! bringing their module paths into scope.
//!
//! A nested generic's argument list is the flattened combination of every
//! enclosing level, so rendering threads one queue of remaining arguments
//! through the declaring chain, outermost level first:
//!
//! ```text
//! Outer`1::Inner`1  args = [i32, String]
//!   render Outer     pops i32     -> Outer<i32>
//!   render Inner     pops String  -> Outer<i32>::Inner<String>
//! ```

use std::collections::VecDeque;

use crate::TypeDescriptor;
use crate::descriptor::ARITY_MARKER;

/// Separator between a declaring type and a nested type.
pub const NESTING_SEPARATOR: &str = "::";

/// Render a descriptor as source syntax.
///
/// Nested descriptors render in reflective form only; see
/// [`TypeDescriptor::nested_in`].
///
/// # Examples
///
/// ```
/// use exprbox_core::{Reflect, render_type_name};
/// use std::collections::HashMap;
///
/// assert_eq!(render_type_name(&<Vec<i32>>::descriptor()), "Vec<i32>");
/// assert_eq!(
///     render_type_name(&<HashMap<String, Vec<u8>>>::descriptor()),
///     "HashMap<String, Vec<u8>>"
/// );
/// ```
pub fn render_type_name(ty: &TypeDescriptor) -> String {
    let mut pool: VecDeque<&TypeDescriptor> = ty.generic_args().iter().collect();
    render_with_pool(ty, &mut pool)
}

/// Render `ty`, drawing its generic arguments from `pool`.
///
/// Declaring types consume from the same pool before `ty` does. When the
/// pool runs dry, only the slots filled so far are rendered.
fn render_with_pool<'a>(ty: &'a TypeDescriptor, pool: &mut VecDeque<&'a TypeDescriptor>) -> String {
    let mut rendered = match ty.declaring_type() {
        Some(declaring) => {
            let mut outer = render_with_pool(declaring, pool);
            outer.push_str(NESTING_SEPARATOR);
            outer
        }
        None => String::new(),
    };
    rendered.push_str(strip_arity_marker(ty.name().simple_name()));

    let mut args = Vec::with_capacity(ty.generic_params());
    for _ in 0..ty.generic_params() {
        let Some(arg) = pool.pop_front() else {
            break;
        };
        // An argument's own arguments are independent of the outer pool.
        args.push(render_type_name(arg));
    }

    if !args.is_empty() {
        rendered.push('<');
        rendered.push_str(&args.join(", "));
        rendered.push('>');
    }
    rendered
}

/// Strip a trailing `` `N `` arity marker from a reflected name.
///
/// Names without a well-formed marker are returned unchanged.
pub fn strip_arity_marker(name: &str) -> &str {
    match name.rfind(ARITY_MARKER) {
        Some(idx) => {
            let digits = &name[idx + ARITY_MARKER.len_utf8()..];
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                &name[..idx]
            } else {
                name
            }
        }
        None => name,
    }
}
