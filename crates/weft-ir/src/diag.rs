//! Structured diagnostics produced by linking and resolution.
//!
//! These are data records, not rendered text: external reporting consumes
//! them as-is (they serialize), and the CLI renders the `Display` form. The
//! fatal `MalformedDocument` case is deliberately absent here; it lives on
//! the codec/driver error path since no diagnostics can follow it.

use std::fmt;

use serde::{Deserialize, Serialize};
use weft_span::SrcLoc;
use weft_utils::fmt::Chain;

use crate::model::TypeKey;

/// A graph-validity failure with full source traceability.
///
/// There is no severity dimension: every record here fails the run, and
/// anything milder stays on the `log` facade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Two modules or components collide on a qualified name across the
    /// merged targets. The earlier declaration keeps the table slot.
    DuplicateDeclaration {
        name: String,
        kept: SrcLoc,
        duplicate: SrcLoc,
    },
    /// An "installs" edge names a module the linked set does not contain.
    UnresolvedModuleReference {
        /// The module or component declaring the edge.
        owner: String,
        module: String,
        at: SrcLoc,
    },
    /// A requested type has no visible provider.
    MissingProvider {
        key: TypeKey,
        /// The requesting chain, ending in the missing key.
        chain: Vec<TypeKey>,
        component: String,
        at: SrcLoc,
    },
    /// A requested type has multiple visible providers that do not form one
    /// aggregate binding.
    AmbiguousProvider {
        key: TypeKey,
        component: String,
        locations: Vec<SrcLoc>,
    },
    /// A non-deferred cycle in the type-dependency graph.
    CyclicDependency {
        /// The full cycle, first key repeated at the end.
        path: Vec<TypeKey>,
        component: String,
        at: SrcLoc,
    },
    /// A scoped provider is used where no component in the ancestry uniquely
    /// owns its scope.
    ScopeViolation {
        key: TypeKey,
        scope: String,
        component: String,
        at: SrcLoc,
    },
}

impl Diagnostic {
    /// The offending type key, where the diagnostic has one. Used by report
    /// filtering (provider exclusion lists).
    pub fn key(&self) -> Option<&TypeKey> {
        match self {
            Diagnostic::MissingProvider { key, .. }
            | Diagnostic::AmbiguousProvider { key, .. }
            | Diagnostic::ScopeViolation { key, .. } => Some(key),
            Diagnostic::CyclicDependency { path, .. } => path.first(),
            _ => None,
        }
    }

    /// The primary source location, where the diagnostic has a single one.
    pub fn location(&self) -> Option<&SrcLoc> {
        match self {
            Diagnostic::DuplicateDeclaration { duplicate, .. } => Some(duplicate),
            Diagnostic::UnresolvedModuleReference { at, .. }
            | Diagnostic::MissingProvider { at, .. }
            | Diagnostic::CyclicDependency { at, .. }
            | Diagnostic::ScopeViolation { at, .. } => Some(at),
            Diagnostic::AmbiguousProvider { locations, .. } => locations.first(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DuplicateDeclaration {
                name,
                kept,
                duplicate,
            } => write!(
                f,
                "duplicate declaration of `{name}` at {duplicate}; first declared at {kept}"
            ),
            Diagnostic::UnresolvedModuleReference { owner, module, at } => write!(
                f,
                "`{owner}` installs unknown module `{module}` at {at}"
            ),
            Diagnostic::MissingProvider {
                key,
                chain,
                component,
                at,
            } => {
                write!(f, "no provider for `{key}` in component `{component}`")?;
                if chain.len() > 1 {
                    write!(f, " (requested via {})", Chain(chain))?;
                }
                write!(f, " at {at}")
            }
            Diagnostic::AmbiguousProvider {
                key,
                component,
                locations,
            } => {
                write!(
                    f,
                    "multiple providers for `{key}` visible from component `{component}`: "
                )?;
                let mut iter = locations.iter();
                if let Some(first) = iter.next() {
                    write!(f, "{first}")?;
                }
                for loc in iter {
                    write!(f, ", {loc}")?;
                }
                Ok(())
            }
            Diagnostic::CyclicDependency {
                path,
                component,
                at,
            } => write!(
                f,
                "dependency cycle in component `{component}`: {} at {at}",
                Chain(path)
            ),
            Diagnostic::ScopeViolation {
                key,
                scope,
                component,
                at,
            } => write!(
                f,
                "provider for `{key}` requires scope `{scope}`, which no component in the \
                 ancestry of `{component}` uniquely owns; declared at {at}"
            ),
        }
    }
}

/// Accumulates diagnostics across linking and resolution.
///
/// Nothing short-circuits on the first error: a run reports every problem it
/// found, and is considered failed iff the report is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl IntoIterator for Report {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_provider_renders_chain() {
        let diag = Diagnostic::MissingProvider {
            key: TypeKey::new("C"),
            chain: vec![TypeKey::new("A"), TypeKey::new("B"), TypeKey::new("C")],
            component: "Root".to_owned(),
            at: SrcLoc::new("a.src", 2, 1),
        };

        assert_eq!(
            diag.to_string(),
            "no provider for `C` in component `Root` (requested via A -> B -> C) at a.src:2:1"
        );
    }

    #[test]
    fn diagnostics_serialize_with_kind_tags() {
        let diag = Diagnostic::DuplicateDeclaration {
            name: "M".to_owned(),
            kept: SrcLoc::new("a.src", 1, 1),
            duplicate: SrcLoc::new("b.src", 1, 1),
        };

        let json = serde_json::to_string(&diag).unwrap();
        assert!(json.contains("\"kind\":\"duplicate_declaration\""));
    }
}
