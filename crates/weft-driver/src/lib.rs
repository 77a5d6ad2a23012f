//! Orchestration of one validation run: load dependency artifacts, link,
//! resolve every root, and persist the current target's artifact.

pub mod config;
pub mod error;

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info};
use weft_ir::codec;
use weft_ir::diag::{Diagnostic, Report};
use weft_ir::model::Document;
use weft_link::interface::LinkedInterface;
use weft_link::linker::{link, LinkOutput};
use weft_resolve::options::ResolveOptions;
use weft_resolve::resolved::ResolvedComponent;
use weft_resolve::resolver::Resolver;

pub use config::Config;
pub use error::DriverError;

const ARTIFACT_SUFFIX: &str = ".weft.json";

/// Everything a run produced. The run failed iff any diagnostics
/// accumulated, but output is complete either way.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub link_report: Report,
    pub resolved: Vec<ResolvedComponent>,
    /// Where the current target's artifact was written.
    pub artifact: Utf8PathBuf,
}

impl RunOutcome {
    /// Link-time diagnostics first, then per-root diagnostics in root order.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.link_report
            .iter()
            .chain(self.resolved.iter().flat_map(|r| r.diagnostics().iter()))
    }

    pub fn is_failure(&self) -> bool {
        self.diagnostics().next().is_some()
    }
}

/// Drives a whole validation run from an explicit [`Config`].
pub struct Driver {
    config: Config,
}

impl Driver {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Reads and decodes one artifact.
    pub fn load_document(path: &Utf8Path) -> Result<Document, DriverError> {
        let bytes = fs::read(path).map_err(|source| DriverError::Read {
            path: path.to_owned(),
            source,
        })?;

        codec::decode(&bytes).map_err(|source| DriverError::Malformed {
            path: path.to_owned(),
            source,
        })
    }

    /// Validates one target's document against its dependency artifacts.
    ///
    /// The current target's trimmed document is persisted before resolution,
    /// so downstream targets can link against it even when this run reports
    /// graph errors.
    pub fn check(&self, document: Document) -> Result<RunOutcome, DriverError> {
        let deps = self.load_dependencies(&document.target)?;
        let artifact = self.persist(&document)?;

        let LinkOutput {
            interface,
            report: link_report,
        } = link(document, deps);

        let options = ResolveOptions::new().with_excluded(self.config.exclude_providers.clone());
        let resolver = Resolver::new(&interface, &options);

        let resolved = if self.config.parallel_roots {
            resolve_parallel(&resolver, &interface)
        } else {
            resolver.resolve_all()
        };

        info!(
            "resolved {} root component(s), {} failing",
            resolved.len(),
            resolved.iter().filter(|r| !r.is_resolved()).count()
        );

        Ok(RunOutcome {
            link_report,
            resolved,
            artifact,
        })
    }

    /// Writes the trimmed document to `<artifact_dir>/<target>.weft.json`.
    pub fn persist(&self, document: &Document) -> Result<Utf8PathBuf, DriverError> {
        let dir = &self.config.artifact_dir;
        fs::create_dir_all(dir).map_err(|source| DriverError::Write {
            path: dir.clone(),
            source,
        })?;

        let path = self.artifact_path(&document.target);
        let bytes = codec::encode(document).map_err(|source| DriverError::Malformed {
            path: path.clone(),
            source,
        })?;

        fs::write(&path, bytes).map_err(|source| DriverError::Write {
            path: path.clone(),
            source,
        })?;

        debug!("persisted artifact {path}");
        Ok(path)
    }

    pub fn artifact_path(&self, target: &str) -> Utf8PathBuf {
        self.config.artifact_dir.join(format!("{target}{ARTIFACT_SUFFIX}"))
    }

    /// Loads every artifact under the search paths, lexicographically per
    /// directory so linking order (and thus duplicate reporting) is stable.
    /// A stale artifact of the current target never links against itself.
    fn load_dependencies(&self, target: &str) -> Result<Vec<Document>, DriverError> {
        let own = format!("{target}{ARTIFACT_SUFFIX}");
        let mut documents = Vec::new();

        for dir in &self.config.search_paths {
            let entries = dir.read_dir_utf8().map_err(|source| DriverError::Read {
                path: dir.clone(),
                source,
            })?;

            let mut paths: Vec<Utf8PathBuf> = Vec::new();
            for entry in entries {
                let entry = entry.map_err(|source| DriverError::Read {
                    path: dir.clone(),
                    source,
                })?;
                let name = entry.file_name();
                if name.ends_with(ARTIFACT_SUFFIX) && name != own {
                    paths.push(entry.into_path());
                }
            }
            paths.sort();

            for path in paths {
                debug!("loading dependency artifact {path}");
                documents.push(Self::load_document(&path)?);
            }
        }

        Ok(documents)
    }
}

/// Resolves roots on scoped threads. Each root owns its bookkeeping and the
/// interface is immutable, so the only coordination is reassembling results
/// in root order; output is identical to the serial path.
fn resolve_parallel<'a>(
    resolver: &Resolver<'a>,
    interface: &'a LinkedInterface,
) -> Vec<ResolvedComponent> {
    let roots: Vec<_> = interface.roots().collect();

    std::thread::scope(|scope| {
        let handles: Vec<_> = roots
            .into_iter()
            .map(|decl| scope.spawn(move || resolver.resolve_root(decl)))
            .collect();

        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(resolved) => resolved,
                Err(payload) => std::panic::resume_unwind(payload),
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use weft_ir::model::{Component, DependencyRef, FileUnit, Module, Provider, TypeKey};
    use weft_span::SrcLoc;

    use super::*;

    fn loc(line: u32) -> SrcLoc {
        SrcLoc::new("graph.src", line, 1)
    }

    fn temp_dir(label: &str) -> Utf8PathBuf {
        let dir = Utf8PathBuf::from_path_buf(std::env::temp_dir())
            .expect("temp dir is not UTF-8")
            .join(format!("weft-driver-{label}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    fn core_doc() -> Document {
        Document::new("core").with_units([FileUnit::new("core.src").with_modules([
            Module::new("CoreModule", loc(1)).with_providers([Provider::new(
                TypeKey::new("Config"),
                loc(2),
            )]),
        ])])
    }

    fn app_doc() -> Document {
        Document::new("app").with_units([FileUnit::new("app.src").with_components([
            Component::new("AppComponent", loc(1))
                .with_root()
                .with_installs(["CoreModule"])
                .with_providers([Provider::new(TypeKey::new("App"), loc(2))
                    .with_dependencies([DependencyRef::new(TypeKey::new("Config"))])]),
        ])])
    }

    #[test]
    fn artifact_paths_are_keyed_by_target() {
        let driver = Driver::new(Config::new().with_artifact_dir("out"));
        assert_eq!(driver.artifact_path("app"), "out/app.weft.json");
    }

    #[test]
    fn check_links_against_persisted_dependency_artifacts() {
        let dir = temp_dir("link");
        let config = Config::new()
            .with_artifact_dir(&dir)
            .with_search_paths([&dir]);

        // First run analyzes the dependency target and persists it.
        let driver = Driver::new(config.clone());
        let outcome = driver.check(core_doc()).expect("core run");
        assert!(!outcome.is_failure());

        // Second run links the app against core's artifact.
        let outcome = driver.check(app_doc()).expect("app run");
        assert!(!outcome.is_failure(), "diagnostics: {:?}", outcome.diagnostics().collect::<Vec<_>>());
        assert_eq!(outcome.resolved.len(), 1);
        assert!(outcome.resolved[0].is_resolved());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn artifact_is_written_even_when_resolution_fails() {
        let dir = temp_dir("persist");
        let driver = Driver::new(Config::new().with_artifact_dir(&dir).with_search_paths([&dir]));

        // No core artifact: the install edge dangles and App's dependency
        // is missing, but the artifact must still land on disk.
        let outcome = driver.check(app_doc()).expect("run completes");
        assert!(outcome.is_failure());
        assert!(outcome.artifact.exists());

        let reloaded = Driver::load_document(&outcome.artifact).expect("reload");
        assert_eq!(reloaded, app_doc().trimmed());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn parallel_and_serial_runs_agree() {
        let dir = temp_dir("parallel");
        let serial = Driver::new(Config::new().with_artifact_dir(&dir))
            .check(app_doc())
            .expect("serial run");
        let parallel = Driver::new(Config::new().with_artifact_dir(&dir).with_parallel_roots())
            .check(app_doc())
            .expect("parallel run");

        let serial_diags: Vec<_> = serial.diagnostics().collect();
        let parallel_diags: Vec<_> = parallel.diagnostics().collect();
        assert_eq!(serial_diags, parallel_diags);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn malformed_dependency_artifact_aborts() {
        let dir = temp_dir("malformed");
        fs::write(dir.join("broken.weft.json"), b"{ not json").expect("write");

        let driver = Driver::new(Config::new().with_artifact_dir(&dir).with_search_paths([&dir]));
        let err = driver.check(app_doc()).unwrap_err();
        assert!(matches!(err, DriverError::Malformed { .. }));

        let _ = fs::remove_dir_all(&dir);
    }
}
