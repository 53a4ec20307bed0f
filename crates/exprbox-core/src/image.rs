//! In-memory compiled output.

use std::fmt;

/// The bytes of one compiled library, prior to loading.
///
/// `dependencies` names the dynamic Rust libraries the image needs at load
/// time. Images compiled against static references only have none.
#[derive(Clone, PartialEq, Eq)]
pub struct BinaryImage {
    bytes: Vec<u8>,
    dependencies: Vec<String>,
}

impl BinaryImage {
    /// Wrap compiled bytes with no dynamic dependencies.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            dependencies: Vec::new(),
        }
    }

    /// Record the dynamic libraries this image needs at load time.
    pub fn with_dependencies(mut self, dependencies: Vec<String>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// Raw library bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size of the image in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the image is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Dynamic libraries required at load time.
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }
}

impl fmt::Debug for BinaryImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinaryImage")
            .field("len", &self.bytes.len())
            .field("dependencies", &self.dependencies)
            .finish()
    }
}
