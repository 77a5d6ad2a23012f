use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;
use weft_ir::codec::CodecError;

/// Fatal run errors. Graph-validity problems are never errors here; they
/// accumulate as diagnostics and the run still produces full output.
#[derive(Error, Debug, Diagnostic)]
pub enum DriverError {
    #[error("failed to read `{path}`")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write `{path}`")]
    Write {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A persisted artifact could not be decoded. Aborts the run; no
    /// meaningful linking is possible past this point.
    #[error("malformed document `{path}`")]
    Malformed {
        path: Utf8PathBuf,
        #[source]
        source: CodecError,
    },
}
