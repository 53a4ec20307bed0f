//! Import header construction.

use std::fmt;

/// Namespaces every compilation imports, in canonical order.
pub const BASELINE_NAMESPACES: [&str; 3] = ["std::collections", "std::convert", "std::iter"];

/// The import preamble shared by every unit a compiler synthesizes.
///
/// Baseline namespaces come first, then the caller's in the order given.
/// Duplicates are kept; the compiler accepts repeated glob imports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportHeader {
    namespaces: Vec<String>,
    text: String,
}

impl ImportHeader {
    /// Build the header for the given caller namespaces.
    ///
    /// A trailing `::*` on a namespace is dropped, both in the header and in
    /// [`namespaces`](Self::namespaces); every namespace is glob-imported.
    pub fn build<I, S>(usings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let namespaces: Vec<String> = BASELINE_NAMESPACES
            .iter()
            .map(|ns| ns.to_string())
            .chain(usings.into_iter().map(|ns| {
                let mut ns: String = ns.into();
                if ns.ends_with("::*") {
                    ns.truncate(ns.len() - "::*".len());
                }
                ns
            }))
            .collect();

        let mut text = String::from("#![allow(unused_imports)]\n");
        for ns in &namespaces {
            text.push_str("use ");
            text.push_str(ns);
            text.push_str("::*;\n");
        }

        Self { namespaces, text }
    }

    /// Imported namespaces, baseline first.
    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    /// The header as source text.
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for ImportHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_only() {
        let header = ImportHeader::build(Vec::<String>::new());
        assert_eq!(
            header.as_str(),
            "#![allow(unused_imports)]\n\
             use std::collections::*;\n\
             use std::convert::*;\n\
             use std::iter::*;\n"
        );
        assert_eq!(header.namespaces().len(), 3);
    }

    #[test]
    fn caller_namespaces_follow_baseline_in_order() {
        let header = ImportHeader::build(["preds::filters", "geo", "preds::filters"]);
        assert_eq!(
            header.namespaces(),
            [
                "std::collections",
                "std::convert",
                "std::iter",
                "preds::filters",
                "geo",
                "preds::filters",
            ]
        );
        assert!(header.as_str().ends_with(
            "use preds::filters::*;\nuse geo::*;\nuse preds::filters::*;\n"
        ));
    }

    #[test]
    fn explicit_glob_is_not_doubled() {
        let header = ImportHeader::build(["geo::*"]);
        assert!(header.as_str().contains("use geo::*;\n"));
        assert!(!header.as_str().contains("::*::*"));
        assert_eq!(header.namespaces().last().map(String::as_str), Some("geo"));
    }
}
