//! Merges per-target IR documents into one [`LinkedInterface`].
//!
//! The linker only merges and indexes. It detects qualified-name collisions;
//! provider multiplicity, cycles, and scoping are the resolver's business.

use log::debug;
use weft_ir::diag::{Diagnostic, Report};
use weft_ir::model::{Component, Document, Module};
use weft_span::SrcLoc;

use crate::interface::{ComponentDecl, LinkedInterface, ModuleDecl, ProviderSite};

/// The linked tables plus any link-time diagnostics.
#[derive(Debug, Clone, Default)]
pub struct LinkOutput {
    pub interface: LinkedInterface,
    pub report: Report,
}

/// Links the current target's document with documents loaded from its
/// dependency targets, in that stable order.
///
/// On a name collision the earlier declaration keeps the table slot and the
/// later one is reported as the duplicate, so duplicate detection does not
/// depend on anything but input order.
pub fn link(current: Document, deps: Vec<Document>) -> LinkOutput {
    let mut out = LinkOutput::default();

    debug!(
        "linking `{}` against {} dependency document(s)",
        current.target,
        deps.len()
    );

    for document in std::iter::once(current).chain(deps) {
        merge(document, &mut out);
    }

    out
}

fn merge(document: Document, out: &mut LinkOutput) {
    let target = document.target;

    for unit in document.units {
        if !unit.dangling.is_empty() {
            // Dangling providers await an external binding step; they are
            // carried by the artifact but never linked.
            debug!(
                "skipping {} dangling provider(s) in {}",
                unit.dangling.len(),
                unit.path
            );
        }

        for module in unit.modules {
            insert_module(module, &target, out);
        }

        for component in unit.components {
            insert_component(component, &target, out);
        }
    }
}

fn insert_module(module: Module, target: &str, out: &mut LinkOutput) {
    if let Some(kept) = declared_at(&out.interface, &module.name) {
        out.report.add(Diagnostic::DuplicateDeclaration {
            name: module.name.clone(),
            kept,
            duplicate: module.debug.clone(),
        });
        return;
    }

    for provider in &module.providers {
        out.interface
            .providers
            .entry(provider.key.clone())
            .or_default()
            .push(ProviderSite {
                provider: provider.clone(),
                owner: module.name.clone(),
                target: target.to_owned(),
            });
    }

    out.interface.modules.insert(
        module.name.clone(),
        ModuleDecl {
            module,
            target: target.to_owned(),
        },
    );
}

fn insert_component(component: Component, target: &str, out: &mut LinkOutput) {
    if let Some(kept) = declared_at(&out.interface, &component.name) {
        out.report.add(Diagnostic::DuplicateDeclaration {
            name: component.name.clone(),
            kept,
            duplicate: component.debug.clone(),
        });
        return;
    }

    for provider in &component.providers {
        out.interface
            .providers
            .entry(provider.key.clone())
            .or_default()
            .push(ProviderSite {
                provider: provider.clone(),
                owner: component.name.clone(),
                target: target.to_owned(),
            });
    }

    out.interface.components.insert(
        component.name.clone(),
        ComponentDecl {
            component,
            target: target.to_owned(),
        },
    );
}

/// Where `name` is already declared, if anywhere. Modules and components
/// share one qualified namespace, so cross-kind collisions count too.
fn declared_at(interface: &LinkedInterface, name: &str) -> Option<SrcLoc> {
    if let Some(decl) = interface.modules.get(name) {
        return Some(decl.module.debug.clone());
    }

    if let Some(decl) = interface.components.get(name) {
        return Some(decl.component.debug.clone());
    }

    None
}

#[cfg(test)]
mod tests {
    use weft_ir::model::{Component, Document, FileUnit, Module, Provider, TypeKey};
    use weft_span::SrcLoc;

    use super::*;

    fn loc(file: &str, line: u32) -> SrcLoc {
        SrcLoc::new(file, line, 1)
    }

    fn doc(target: &str, units: Vec<FileUnit>) -> Document {
        Document::new(target).with_units(units)
    }

    #[test]
    fn merges_providers_in_input_order() {
        let a = doc(
            "a",
            vec![FileUnit::new("a.src").with_modules([Module::new("MA", loc("a.src", 1))
                .with_providers([Provider::new(TypeKey::new("Svc"), loc("a.src", 2))])])],
        );
        let b = doc(
            "b",
            vec![FileUnit::new("b.src").with_modules([Module::new("MB", loc("b.src", 1))
                .with_providers([Provider::new(TypeKey::new("Svc"), loc("b.src", 2))])])],
        );

        let out = link(a, vec![b]);
        assert!(out.report.is_empty());

        let sites = out.interface.providers_of(&TypeKey::new("Svc"));
        assert_eq!(sites.len(), 2);
        assert_eq!(sites[0].target, "a");
        assert_eq!(sites[1].target, "b");
        assert_eq!(sites[0].owner, "MA");
    }

    #[test]
    fn later_input_is_reported_as_duplicate() {
        let a = doc(
            "a",
            vec![FileUnit::new("a.src").with_modules([Module::new("Shared", loc("a.src", 1))])],
        );
        let b = doc(
            "b",
            vec![FileUnit::new("b.src").with_modules([Module::new("Shared", loc("b.src", 5))])],
        );

        let out = link(a, vec![b]);
        let diags: Vec<_> = out.report.iter().collect();
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0],
            &Diagnostic::DuplicateDeclaration {
                name: "Shared".to_owned(),
                kept: loc("a.src", 1),
                duplicate: loc("b.src", 5),
            }
        );

        // The earlier declaration keeps the slot.
        assert_eq!(out.interface.module("Shared").unwrap().target, "a");
    }

    #[test]
    fn modules_and_components_share_one_namespace() {
        let a = doc(
            "a",
            vec![FileUnit::new("a.src")
                .with_modules([Module::new("App", loc("a.src", 1))])
                .with_components([Component::new("App", loc("a.src", 9))])],
        );

        let out = link(a, vec![]);
        assert_eq!(out.report.len(), 1);
        assert!(out.interface.component("App").is_none());
    }

    #[test]
    fn roots_and_children_enumerate_in_linked_order() {
        let a = doc(
            "a",
            vec![FileUnit::new("a.src").with_components([
                Component::new("Root", loc("a.src", 1)).with_root(),
                Component::new("Child", loc("a.src", 5)).with_parent("Root"),
                Component::new("Other", loc("a.src", 9)).with_root(),
            ])],
        );

        let out = link(a, vec![]);
        let roots: Vec<_> = out
            .interface
            .roots()
            .map(|d| d.component.name.as_str())
            .collect();
        assert_eq!(roots, ["Root", "Other"]);

        let children: Vec<_> = out
            .interface
            .children_of("Root")
            .map(|d| d.component.name.as_str())
            .collect();
        assert_eq!(children, ["Child"]);
    }
}
