//! Source synthesis.
//!
//! Wraps a raw expression in the synthetic container described by
//! [`exprbox_core::shape`]. The expression text is spliced in verbatim and
//! never inspected; anything wrong with it surfaces as a compiler diagnostic.
//!
//! ```text
//! <import header>
//! pub mod __ExprboxContainer {
//!     use super::*;
//!     #[unsafe(no_mangle)] pub static __ExprboxContainer: u32 = <shape version>;
//!     #[unsafe(no_mangle)] pub extern "Rust" fn __ExprboxContainer__VALUE()
//!         -> Result<T, String> { catch_unwind(|| -> T { (<expression>) }) ... }
//! }
//! ```
//!
//! The expression sits inside parentheses, so statement sequences are
//! rejected by the parser. While it runs, the library's own panic hook is
//! replaced with a silent one: the default hook may capture a backtrace,
//! which pins the library in memory after it is closed.

use exprbox_core::shape::{CONTAINER_NAME, SHAPE_VERSION, field_symbol};

use crate::imports::ImportHeader;

/// Produce the complete source unit for `expression` evaluated as `return_type`.
///
/// `return_type` is the rendered spelling of the caller's requested type.
pub fn synthesize(header: &ImportHeader, return_type: &str, expression: &str) -> String {
    let field = field_symbol();
    let mut source = String::with_capacity(header.as_str().len() + expression.len() + 1024);
    source.push_str(header.as_str());
    source.push('\n');
    source.push_str(&format!(
        "#[allow(non_snake_case, non_upper_case_globals)]
pub mod {CONTAINER_NAME} {{
    use super::*;

    #[unsafe(no_mangle)]
    pub static {CONTAINER_NAME}: u32 = {SHAPE_VERSION};

    #[unsafe(no_mangle)]
    pub extern \"Rust\" fn {field}() -> ::std::result::Result<{return_type}, ::std::string::String> {{
        let evaluate = || -> {return_type} {{ (
{expression}
        ) }};
        let previous_hook = ::std::panic::take_hook();
        ::std::panic::set_hook(::std::boxed::Box::new(|_| {{}}));
        let outcome = ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(evaluate));
        ::std::panic::set_hook(previous_hook);
        outcome.map_err(|payload| {{
            match payload.downcast::<::std::string::String>() {{
                Ok(message) => *message,
                Err(payload) => match payload.downcast_ref::<&'static str>() {{
                    Some(message) => ::std::string::ToString::to_string(message),
                    None => ::std::string::String::from(\"non-string panic payload\"),
                }},
            }}
        }})
    }}
}}
"
    ));
    source
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> ImportHeader {
        ImportHeader::build(["preds::filters"])
    }

    #[test]
    fn header_comes_first() {
        let source = synthesize(&header(), "i32", "1 + 1");
        assert!(source.starts_with(header().as_str()));
    }

    #[test]
    fn declares_reserved_shape() {
        let source = synthesize(&header(), "bool", "1 == 2");
        assert!(source.contains("pub mod __ExprboxContainer {"));
        assert!(source.contains("pub static __ExprboxContainer: u32 = 1;"));
        assert!(source.contains(
            "pub extern \"Rust\" fn __ExprboxContainer__VALUE() -> ::std::result::Result<bool, ::std::string::String>"
        ));
        assert_eq!(source.matches("#[unsafe(no_mangle)]").count(), 2);
    }

    #[test]
    fn return_type_spelled_verbatim() {
        let source = synthesize(&header(), "HashMap<String, Vec<i32>>", "HashMap::new()");
        assert!(source.contains("let evaluate = || -> HashMap<String, Vec<i32>> { ("));
    }

    #[test]
    fn expression_is_parenthesized() {
        let source = synthesize(&header(), "i32", "let x = 3; x + 1");
        assert!(source.contains("{ (\nlet x = 3; x + 1\n        ) }"));
    }

    #[test]
    fn panic_hook_is_silenced_and_restored() {
        let source = synthesize(&header(), "i32", "1");
        let take = source.find("::std::panic::take_hook()").unwrap();
        let silence = source.find("::std::panic::set_hook(::std::boxed::Box::new(|_| {}))").unwrap();
        let catch = source.find("::std::panic::catch_unwind(").unwrap();
        let restore = source.find("::std::panic::set_hook(previous_hook)").unwrap();
        assert!(take < silence && silence < catch && catch < restore);
    }

    #[test]
    fn expression_is_not_validated() {
        let source = synthesize(&header(), "i32", "1 +");
        assert!(source.contains("\n1 +\n"));

        let braces = synthesize(&header(), "String", "format!(\"{}{{}}\", 1)");
        assert!(braces.contains("format!(\"{}{{}}\", 1)"));
    }
}
