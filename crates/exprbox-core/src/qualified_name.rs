use std::fmt;

/// Path-qualified name of a reflected type, stored as its `::`-separated
/// segments.
///
/// Everything before the last segment is the module path a caller would
/// `use`; rendered source only ever spells the last segment.
///
/// # Examples
///
/// ```
/// use exprbox_core::QualifiedName;
///
/// let int = QualifiedName::global("i32");
/// assert!(int.is_global());
///
/// let map = QualifiedName::from_path("::std::collections::HashMap");
/// assert_eq!(map.simple_name(), "HashMap");
/// assert_eq!(map.module_path(), "std::collections");
/// assert_eq!(map.to_string(), "std::collections::HashMap");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    segments: Vec<String>,
}

impl QualifiedName {
    /// A name with no module path, such as a primitive.
    pub fn global(name: impl Into<String>) -> Self {
        Self {
            segments: vec![name.into()],
        }
    }

    /// Parse `a::b::Name`. Empty segments, including a leading `::`, are
    /// dropped.
    pub fn from_path(path: &str) -> Self {
        let segments: Vec<String> = path
            .split("::")
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();
        if segments.is_empty() {
            return Self::global("");
        }
        Self { segments }
    }

    /// Last segment, possibly carrying a generic arity marker.
    pub fn simple_name(&self) -> &str {
        self.segments.last().map_or("", String::as_str)
    }

    /// Segments before the simple name.
    pub fn module_segments(&self) -> &[String] {
        &self.segments[..self.segments.len().saturating_sub(1)]
    }

    /// Module path joined with `::`, empty for global names.
    pub fn module_path(&self) -> String {
        self.module_segments().join("::")
    }

    pub fn is_global(&self) -> bool {
        self.segments.len() <= 1
    }

    /// The same path with `suffix` appended to the simple name.
    pub(crate) fn with_suffix(mut self, suffix: &str) -> Self {
        match self.segments.last_mut() {
            Some(last) => last.push_str(suffix),
            None => self.segments.push(suffix.to_string()),
        }
        self
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("::"))
    }
}

impl From<&str> for QualifiedName {
    fn from(path: &str) -> Self {
        Self::from_path(path)
    }
}

impl From<String> for QualifiedName {
    fn from(path: String) -> Self {
        Self::from_path(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_has_no_module() {
        let name = QualifiedName::global("bool");
        assert!(name.is_global());
        assert_eq!(name.simple_name(), "bool");
        assert!(name.module_segments().is_empty());
        assert_eq!(name.to_string(), "bool");
    }

    #[test]
    fn caller_type_path() {
        let name = QualifiedName::from_path("my_preds::filters::Range");
        assert_eq!(name.simple_name(), "Range");
        assert_eq!(name.module_segments(), ["my_preds", "filters"]);
        assert_eq!(name.module_path(), "my_preds::filters");
        assert!(!name.is_global());
    }

    #[test]
    fn arity_marker_stays_on_simple_name() {
        let name: QualifiedName = "std::collections::BTreeMap`2".into();
        assert_eq!(name.simple_name(), "BTreeMap`2");
        assert_eq!(name.module_path(), "std::collections");
    }

    #[test]
    fn leading_and_empty_segments_are_dropped() {
        assert_eq!(
            QualifiedName::from_path("::std::string::String"),
            QualifiedName::from_path("std::string::String")
        );

        let empty = QualifiedName::from_path("::");
        assert_eq!(empty.simple_name(), "");
        assert!(empty.is_global());
    }
}
