//! Module for run configuration options.

use camino::Utf8PathBuf;

/// Options controlling a validation run.
///
/// Passed explicitly into the driver; nothing reads ambient state.
#[derive(Debug, Clone)]
pub struct Config {
    /// Where the current target's artifact is written.
    pub artifact_dir: Utf8PathBuf,

    /// Directories scanned for dependency-target artifacts.
    pub search_paths: Vec<Utf8PathBuf>,

    /// Provider type names excluded from reports (not from resolution).
    pub exclude_providers: Vec<String>,

    /// Whether to resolve root components on separate threads.
    pub parallel_roots: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            artifact_dir: Utf8PathBuf::from("weft-out"),
            search_paths: Vec::new(),
            exclude_providers: Vec::new(),
            parallel_roots: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_artifact_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.artifact_dir = dir.into();
        self
    }

    pub fn with_search_paths<P: Into<Utf8PathBuf>>(
        mut self,
        paths: impl IntoIterator<Item = P>,
    ) -> Self {
        self.search_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_excluded<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.exclude_providers = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_parallel_roots(mut self) -> Self {
        self.parallel_roots = true;
        self
    }
}
