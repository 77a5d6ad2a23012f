//! Resolution options, passed explicitly into the resolver entry points.

use weft_ir::diag::Diagnostic;

/// Options for controlling the resolver's reporting.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Provider type names whose diagnostics are suppressed entirely.
    /// Exclusion affects reporting, not graph traversal.
    pub exclude_providers: Vec<String>,
}

impl ResolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_excluded<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.exclude_providers = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_excluded(&self, diagnostic: &Diagnostic) -> bool {
        diagnostic
            .key()
            .is_some_and(|key| self.exclude_providers.iter().any(|name| *name == key.name))
    }
}
