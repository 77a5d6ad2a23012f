//! Persistence of IR documents as per-target artifacts.
//!
//! The artifact plays the role of an object file: each analysis invocation
//! encodes its target's [`Document`]; dependent targets decode it as a
//! linker input. Encoding is deterministic (struct field order plus `Vec`
//! collection order), so an unchanged document encodes byte-identically.

use thiserror::Error;

use crate::model::Document;

#[derive(Debug, Error)]
pub enum CodecError {
    /// The persisted artifact is structurally invalid. Fatal for any run
    /// that needed it; nothing meaningful can be linked from it.
    #[error("malformed document: {0}")]
    Malformed(#[source] serde_json::Error),
}

/// Encodes the trimmed form of a document.
///
/// Trimming here keeps the round-trip law simple: `decode(encode(x))`
/// reproduces `x.trimmed()` exactly, and is the identity on trimmed
/// documents.
pub fn encode(document: &Document) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(&document.trimmed()).map_err(CodecError::Malformed)
}

/// Decodes a persisted artifact.
///
/// Fails with [`CodecError::Malformed`] on structurally invalid input;
/// unknown fields are rejected rather than silently dropped.
pub fn decode(bytes: &[u8]) -> Result<Document, CodecError> {
    serde_json::from_slice(bytes).map_err(CodecError::Malformed)
}

#[cfg(test)]
mod tests {
    use weft_span::SrcLoc;

    use super::*;
    use crate::model::{
        Component, DanglingProvider, DependencyRef, FileUnit, Module, Provider, TypeKey,
    };

    fn loc(line: u32) -> SrcLoc {
        SrcLoc::new("lib/Graph.src", line, 1)
    }

    fn sample() -> Document {
        let provider = Provider::new(TypeKey::tagged("Database", "replica"), loc(3))
            .with_dependencies([
                DependencyRef::new(TypeKey::new("Config")),
                DependencyRef::deferred(TypeKey::new("Pool")),
            ])
            .with_scope("singleton");

        let module = Module::new("StorageModule", loc(1))
            .with_providers([provider])
            .with_installs(["ConfigModule"]);

        let component = Component::new("AppComponent", loc(10))
            .with_installs(["StorageModule"])
            .with_scope("singleton")
            .with_root();

        Document::new("app").with_units([
            FileUnit::new("lib/Graph.src")
                .with_modules([module])
                .with_components([component])
                .with_dangling([DanglingProvider::new(TypeKey::new("Logger"), loc(20))]),
            FileUnit::new("lib/Empty.src"),
        ])
    }

    #[test]
    fn round_trip_reproduces_trimmed_document() {
        let doc = sample();
        let bytes = encode(&doc).unwrap();
        let decoded = decode(&bytes).unwrap();

        assert_eq!(decoded, doc.trimmed());
        // The sample has an empty unit, so it is not its own trimmed form.
        assert_ne!(decoded, doc);
    }

    #[test]
    fn repeated_encodes_are_byte_identical() {
        let doc = sample();
        assert_eq!(encode(&doc).unwrap(), encode(&doc).unwrap());
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            decode(b"not a document"),
            Err(CodecError::Malformed(_))
        ));
    }

    #[test]
    fn decode_rejects_unknown_fields() {
        let bytes = encode(&sample()).unwrap();
        let mut value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        value["injected"] = serde_json::json!(true);
        let tampered = serde_json::to_vec(&value).unwrap();

        assert!(matches!(
            decode(&tampered),
            Err(CodecError::Malformed(_))
        ));
    }
}
