//! The synthetic shape shared by source synthesis and value extraction.
//!
//! Generated code declares a container module named [`CONTAINER_NAME`]. It
//! exports two unmangled symbols:
//!
//! - `CONTAINER_NAME` itself, a `u32` static holding [`SHAPE_VERSION`]
//! - [`field_symbol()`], the accessor that evaluates the expression
//!
//! The extractor looks both up by these names and nothing else.

/// Reserved name of the synthetic container.
pub const CONTAINER_NAME: &str = "__ExprboxContainer";

/// Reserved name of the container's single value field.
pub const FIELD_NAME: &str = "VALUE";

/// Version stamped into every container, bumped when the accessor signature
/// changes.
pub const SHAPE_VERSION: u32 = 1;

/// Exported symbol of the value accessor.
pub fn field_symbol() -> String {
    format!("{CONTAINER_NAME}__{FIELD_NAME}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_symbol_is_scoped_by_container() {
        assert_eq!(field_symbol(), "__ExprboxContainer__VALUE");
        assert!(field_symbol().starts_with(CONTAINER_NAME));
    }
}
