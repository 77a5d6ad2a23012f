//! IR entities describing one target's slice of the dependency-injection graph.
//!
//! The syntax-tree walker (external) produces these per source file; the
//! codec persists one [`Document`] per analyzed target; the linker merges
//! documents from the current target and its dependency targets.

use std::fmt;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use weft_span::SrcLoc;

/// Canonical type name plus an optional disambiguating tag.
///
/// Two keys are equal iff name and tag match exactly.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeKey {
    pub name: String,
    pub tag: Option<String>,
}

impl TypeKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: None,
        }
    }

    pub fn tagged(name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: Some(tag.into()),
        }
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            Some(tag) => write!(f, "{}#{tag}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// A dependency edge to another type.
///
/// A deferred edge means the dependent receives a lazy accessor instead of a
/// constructed value; it is the one legal way to break a dependency cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DependencyRef {
    pub key: TypeKey,
    pub deferred: bool,
}

impl DependencyRef {
    pub fn new(key: TypeKey) -> Self {
        Self {
            key,
            deferred: false,
        }
    }

    pub fn deferred(key: TypeKey) -> Self {
        Self {
            key,
            deferred: true,
        }
    }

    /// Parses a walker-decorated dependency name.
    ///
    /// This is the only place that understands the textual decorations: a
    /// name wrapped as `Deferred<T>` is a deferred reference, and `T#tag`
    /// carries a qualifier tag. Everything past this boundary works on
    /// structured [`DependencyRef`]s.
    pub fn parse_decorated(raw: &str) -> Self {
        let raw = raw.trim();

        let (inner, deferred) = match raw
            .strip_prefix("Deferred<")
            .and_then(|rest| rest.strip_suffix('>'))
        {
            Some(inner) => (inner.trim(), true),
            None => (raw, false),
        };

        let key = match inner.split_once('#') {
            Some((name, tag)) => TypeKey::tagged(name.trim(), tag.trim()),
            None => TypeKey::new(inner),
        };

        Self { key, deferred }
    }
}

impl fmt::Display for DependencyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.deferred {
            write!(f, "Deferred<{}>", self.key)
        } else {
            self.key.fmt(f)
        }
    }
}

/// A provider bound into a module or component ("standard" form).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Provider {
    /// The type this provider produces.
    pub key: TypeKey,
    /// Types required to produce it, in declaration order.
    pub dependencies: Vec<DependencyRef>,
    /// Lifetime scope; absent means unscoped, usable anywhere.
    pub scope: Option<String>,
    /// Marks one contributor to a named aggregate binding (e.g. "set").
    pub collection: Option<String>,
    /// Declaration site, for diagnostics.
    pub debug: SrcLoc,
}

impl Provider {
    pub fn new(key: TypeKey, debug: SrcLoc) -> Self {
        Self {
            key,
            dependencies: Vec::new(),
            scope: None,
            collection: None,
            debug,
        }
    }

    pub fn with_dependencies(mut self, deps: impl IntoIterator<Item = DependencyRef>) -> Self {
        self.dependencies = deps.into_iter().collect();
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    pub fn is_collection(&self) -> bool {
        self.collection.is_some()
    }
}

/// A provider whose dependencies are known but which is not yet attached to
/// any module or component, e.g. extracted from a free-standing provider
/// function. An external binding step turns it into a [`Provider`] via
/// [`DanglingProvider::bind`]; the linker and resolver never consult it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DanglingProvider {
    pub key: TypeKey,
    pub dependencies: Vec<DependencyRef>,
    pub scope: Option<String>,
    pub collection: Option<String>,
    pub debug: SrcLoc,
}

impl DanglingProvider {
    pub fn new(key: TypeKey, debug: SrcLoc) -> Self {
        Self {
            key,
            dependencies: Vec::new(),
            scope: None,
            collection: None,
            debug,
        }
    }

    pub fn with_dependencies(mut self, deps: impl IntoIterator<Item = DependencyRef>) -> Self {
        self.dependencies = deps.into_iter().collect();
        self
    }

    /// Attaches the provider, producing its bound form.
    pub fn bind(self) -> Provider {
        Provider {
            key: self.key,
            dependencies: self.dependencies,
            scope: self.scope,
            collection: self.collection,
            debug: self.debug,
        }
    }
}

/// A named, reusable bundle of providers plus install edges to other modules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Module {
    pub name: String,
    pub providers: Vec<Provider>,
    /// Qualified names of modules this one transitively pulls in.
    pub installs: Vec<String>,
    pub debug: SrcLoc,
}

impl Module {
    pub fn new(name: impl Into<String>, debug: SrcLoc) -> Self {
        Self {
            name: name.into(),
            providers: Vec::new(),
            installs: Vec::new(),
            debug,
        }
    }

    pub fn with_providers(mut self, providers: impl IntoIterator<Item = Provider>) -> Self {
        self.providers = providers.into_iter().collect();
        self
    }

    pub fn with_installs<S: Into<String>>(mut self, installs: impl IntoIterator<Item = S>) -> Self {
        self.installs = installs.into_iter().map(Into::into).collect();
        self
    }
}

/// A graph entry point.
///
/// Root components start resolution; subcomponents carry a `parent`
/// reference and see every ancestor's providers, never the reverse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Component {
    pub name: String,
    pub providers: Vec<Provider>,
    pub installs: Vec<String>,
    /// Scope identity this component owns, if any. Immutable once assigned.
    pub scope: Option<String>,
    pub root: bool,
    /// Qualified name of the parent component, present for subcomponents.
    pub parent: Option<String>,
    pub debug: SrcLoc,
}

impl Component {
    pub fn new(name: impl Into<String>, debug: SrcLoc) -> Self {
        Self {
            name: name.into(),
            providers: Vec::new(),
            installs: Vec::new(),
            scope: None,
            root: false,
            parent: None,
            debug,
        }
    }

    pub fn with_providers(mut self, providers: impl IntoIterator<Item = Provider>) -> Self {
        self.providers = providers.into_iter().collect();
        self
    }

    pub fn with_installs<S: Into<String>>(mut self, installs: impl IntoIterator<Item = S>) -> Self {
        self.installs = installs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_root(mut self) -> Self {
        self.root = true;
        self
    }
}

/// Modules and components declared in one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileUnit {
    pub path: Utf8PathBuf,
    pub modules: Vec<Module>,
    pub components: Vec<Component>,
    /// Providers awaiting attachment by an external binding step.
    pub dangling: Vec<DanglingProvider>,
}

impl FileUnit {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            path: path.into(),
            modules: Vec::new(),
            components: Vec::new(),
            dangling: Vec::new(),
        }
    }

    pub fn with_modules(mut self, modules: impl IntoIterator<Item = Module>) -> Self {
        self.modules = modules.into_iter().collect();
        self
    }

    pub fn with_components(mut self, components: impl IntoIterator<Item = Component>) -> Self {
        self.components = components.into_iter().collect();
        self
    }

    pub fn with_dangling(mut self, dangling: impl IntoIterator<Item = DanglingProvider>) -> Self {
        self.dangling = dangling.into_iter().collect();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty() && self.components.is_empty() && self.dangling.is_empty()
    }
}

/// The persisted unit for one analyzed target: its file units in file order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Document {
    /// The analyzed target's name; keys the persisted artifact.
    pub target: String,
    pub units: Vec<FileUnit>,
}

impl Document {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            units: Vec::new(),
        }
    }

    pub fn with_units(mut self, units: impl IntoIterator<Item = FileUnit>) -> Self {
        self.units = units.into_iter().collect();
        self
    }

    pub fn push_unit(&mut self, unit: FileUnit) {
        self.units.push(unit);
    }

    /// Drops file units with nothing to contribute, preserving order.
    /// Persisted documents are always trimmed.
    pub fn trimmed(&self) -> Self {
        Self {
            target: self.target.clone(),
            units: self
                .units
                .iter()
                .filter(|unit| !unit.is_empty())
                .cloned()
                .collect(),
        }
    }

    pub fn modules(&self) -> impl Iterator<Item = (&FileUnit, &Module)> {
        self.units
            .iter()
            .flat_map(|unit| unit.modules.iter().map(move |m| (unit, m)))
    }

    pub fn components(&self) -> impl Iterator<Item = (&FileUnit, &Component)> {
        self.units
            .iter()
            .flat_map(|unit| unit.components.iter().map(move |c| (unit, c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> SrcLoc {
        SrcLoc::new("test.src", 1, 1)
    }

    #[test]
    fn type_key_equality_is_exact() {
        assert_eq!(TypeKey::new("Foo"), TypeKey::new("Foo"));
        assert_ne!(TypeKey::new("Foo"), TypeKey::tagged("Foo", "blue"));
        assert_ne!(TypeKey::tagged("Foo", "blue"), TypeKey::tagged("Foo", "red"));
    }

    #[test]
    fn parse_decorated_dependency_names() {
        let plain = DependencyRef::parse_decorated("Database");
        assert_eq!(plain.key, TypeKey::new("Database"));
        assert!(!plain.deferred);

        let deferred = DependencyRef::parse_decorated("Deferred<Database>");
        assert_eq!(deferred.key, TypeKey::new("Database"));
        assert!(deferred.deferred);

        let tagged = DependencyRef::parse_decorated("Deferred< Database#replica >");
        assert_eq!(tagged.key, TypeKey::tagged("Database", "replica"));
        assert!(tagged.deferred);
    }

    #[test]
    fn dangling_provider_binds_losslessly() {
        let dangling = DanglingProvider::new(TypeKey::new("Cache"), loc())
            .with_dependencies([DependencyRef::new(TypeKey::new("Clock"))]);
        let bound = dangling.clone().bind();

        assert_eq!(bound.key, dangling.key);
        assert_eq!(bound.dependencies, dangling.dependencies);
    }

    #[test]
    fn trimming_drops_empty_units_only() {
        let doc = Document::new("app").with_units([
            FileUnit::new("a.src"),
            FileUnit::new("b.src").with_modules([Module::new("M", loc())]),
            FileUnit::new("c.src")
                .with_dangling([DanglingProvider::new(TypeKey::new("Cache"), loc())]),
        ]);

        let trimmed = doc.trimmed();
        assert_eq!(trimmed.units.len(), 2);
        assert_eq!(trimmed.units[0].path, "b.src");
        assert_eq!(trimmed.units[1].path, "c.src");

        // Trimming is idempotent.
        assert_eq!(trimmed.trimmed(), trimmed);
    }
}
