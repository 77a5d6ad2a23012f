//! The merge product of linking: global, order-stable lookup tables.

use indexmap::IndexMap;
use weft_ir::model::{Component, Module, Provider, TypeKey};

/// One provider in the global table, with its origin recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSite {
    pub provider: Provider,
    /// Qualified name of the declaring module or component.
    pub owner: String,
    /// The target whose document contributed this provider.
    pub target: String,
}

/// A module declaration and its origin target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDecl {
    pub module: Module,
    pub target: String,
}

/// A component declaration and its origin target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDecl {
    pub component: Component,
    pub target: String,
}

/// Global symbol tables over all linked documents.
///
/// Iteration order everywhere is input order (current target first, then
/// dependency targets in their given order), which keeps downstream
/// diagnostics deterministic. Immutable once linking completes; the resolver
/// shares it read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkedInterface {
    /// Every provider across all targets, keyed by the type it produces.
    /// Multiple entries per key are expected; the resolver disambiguates.
    pub providers: IndexMap<TypeKey, Vec<ProviderSite>>,
    /// Module declarations by qualified name.
    pub modules: IndexMap<String, ModuleDecl>,
    /// Component declarations by qualified name.
    pub components: IndexMap<String, ComponentDecl>,
}

impl LinkedInterface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn module(&self, name: &str) -> Option<&ModuleDecl> {
        self.modules.get(name)
    }

    pub fn component(&self, name: &str) -> Option<&ComponentDecl> {
        self.components.get(name)
    }

    pub fn providers_of(&self, key: &TypeKey) -> &[ProviderSite] {
        self.providers.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Components flagged as graph roots, in linked order.
    pub fn roots(&self) -> impl Iterator<Item = &ComponentDecl> {
        self.components.values().filter(|decl| decl.component.root)
    }

    /// Components declaring `parent` as their parent, in linked order.
    pub fn children_of<'a>(&'a self, parent: &'a str) -> impl Iterator<Item = &'a ComponentDecl> {
        self.components
            .values()
            .filter(move |decl| decl.component.parent.as_deref() == Some(parent))
    }
}
