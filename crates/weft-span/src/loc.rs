//! Source locations attached to IR entities and diagnostics.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

/// A location in an analyzed source file.
///
/// Locations originate in the syntax-tree walker, travel through the
/// persisted IR artifact, and end up on diagnostics. Line and column are
/// one-based; zero means the walker could not determine them.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SrcLoc {
    pub file: Utf8PathBuf,
    pub line: u32,
    pub column: u32,
}

impl SrcLoc {
    pub fn new(file: impl Into<Utf8PathBuf>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// Location for an entity that only has a file, no position within it.
    pub fn file_only(file: impl Into<Utf8PathBuf>) -> Self {
        Self::new(file, 0, 0)
    }

    #[inline]
    pub fn file(&self) -> &Utf8Path {
        &self.file
    }
}

impl fmt::Display for SrcLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            write!(f, "{}", self.file)
        } else {
            write!(f, "{}:{}:{}", self.file, self.line, self.column)
        }
    }
}
