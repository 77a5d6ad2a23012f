//! Resolution output per root component.

use weft_ir::diag::Diagnostic;
use weft_ir::model::{DependencyRef, TypeKey};
use weft_span::SrcLoc;

/// The outcome for one root component: a fully satisfied binding tree, or a
/// non-empty list of diagnostics covering its whole subtree. Never both.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedComponent {
    Resolved(ComponentTree),
    Failed {
        name: String,
        diagnostics: Vec<Diagnostic>,
    },
}

impl ResolvedComponent {
    pub fn name(&self) -> &str {
        match self {
            ResolvedComponent::Resolved(tree) => &tree.name,
            ResolvedComponent::Failed { name, .. } => name,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, ResolvedComponent::Resolved(_))
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            ResolvedComponent::Resolved(_) => &[],
            ResolvedComponent::Failed { diagnostics, .. } => diagnostics,
        }
    }
}

/// A component with every binding satisfied, including its subcomponents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentTree {
    pub name: String,
    pub scope: Option<String>,
    /// Satisfied bindings in resolution order.
    pub bindings: Vec<ResolvedBinding>,
    /// Resolved subcomponents in linked order.
    pub children: Vec<ComponentTree>,
}

impl ComponentTree {
    /// Looks up a binding resolved in this component's own context.
    pub fn binding(&self, key: &TypeKey) -> Option<&ResolvedBinding> {
        self.bindings.iter().find(|b| &b.key == key)
    }
}

/// One satisfied binding: the providers selected for a type key and the
/// dependency edges they carry. An aggregate multibinding has one site per
/// contributor; anything else has exactly one.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBinding {
    pub key: TypeKey,
    pub sites: Vec<SrcLoc>,
    /// The aggregation kind when this is a multibinding.
    pub collection: Option<String>,
    /// Dependencies of all selected providers, in site order.
    pub dependencies: Vec<DependencyRef>,
}
