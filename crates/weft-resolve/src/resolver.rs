//! Recursive, per-root resolution over a [`LinkedInterface`].
//!
//! Each root component is an independent resolution problem with its own
//! bookkeeping; the interface itself is shared read-only, so callers may run
//! roots on separate threads and still get identical output in root order.

use std::collections::HashSet;

use indexmap::IndexMap;
use log::debug;
use weft_ir::diag::{Diagnostic, Report};
use weft_ir::model::{Component, Provider, TypeKey};
use weft_link::interface::{ComponentDecl, LinkedInterface};
use weft_span::SrcLoc;
use weft_utils::visit::{VisitMap, VisitState};

use crate::options::ResolveOptions;
use crate::resolved::{ComponentTree, ResolvedBinding, ResolvedComponent};

/// Resolves root component graphs against a linked interface.
pub struct Resolver<'a> {
    interface: &'a LinkedInterface,
    options: &'a ResolveOptions,
}

/// One level of the component ancestry during resolution.
struct Frame<'a> {
    component: &'a Component,
    /// The component's own providers plus those of all transitively
    /// installed modules, in declaration-then-install order.
    effective: IndexMap<TypeKey, Vec<&'a Provider>>,
}

/// Per-root traversal state. Never shared between roots.
struct State<'a> {
    /// Ancestry chain, root first, current component last.
    chain: Vec<Frame<'a>>,
    /// Type keys currently being expanded on this DFS path (gray nodes).
    stack: Vec<TypeKey>,
    /// Memoization per (component context, key): a pair is diagnosed and
    /// expanded at most once per root.
    visit: VisitMap<(String, TypeKey)>,
    report: Report,
}

impl<'a> State<'a> {
    fn new() -> Self {
        Self {
            chain: Vec::new(),
            stack: Vec::new(),
            visit: VisitMap::new(),
            report: Report::new(),
        }
    }
}

impl<'a> Resolver<'a> {
    pub fn new(interface: &'a LinkedInterface, options: &'a ResolveOptions) -> Self {
        Self { interface, options }
    }

    /// Resolves every root component in linked order.
    pub fn resolve_all(&self) -> Vec<ResolvedComponent> {
        self.interface
            .roots()
            .map(|decl| self.resolve_root(decl))
            .collect()
    }

    /// Resolves one root component, including its subcomponents.
    pub fn resolve_root(&self, decl: &'a ComponentDecl) -> ResolvedComponent {
        debug!("resolving root component `{}`", decl.component.name);

        let mut state = State::new();
        let tree = self.resolve_component(decl, &mut state);

        if state.report.is_empty() {
            ResolvedComponent::Resolved(tree)
        } else {
            ResolvedComponent::Failed {
                name: decl.component.name.clone(),
                diagnostics: state.report.into_vec(),
            }
        }
    }

    fn resolve_component(&self, decl: &'a ComponentDecl, state: &mut State<'a>) -> ComponentTree {
        let component = &decl.component;
        let frame = self.effective_frame(component, &mut state.report);
        let keys: Vec<TypeKey> = frame.effective.keys().cloned().collect();
        state.chain.push(frame);

        // Every provider this component contributes must itself be
        // constructible here; dependency requests fan out from these.
        let mut bindings = Vec::new();
        for key in &keys {
            self.request(key, &component.debug, &mut bindings, state);
        }

        let mut children = Vec::new();
        for child in self.interface.children_of(&component.name) {
            let name = &child.component.name;
            if state.chain.iter().any(|f| &f.component.name == name) {
                // Ancestry is acyclic by construction; refuse to recurse on
                // malformed input rather than hang.
                debug!("skipping `{name}`: already on the ancestry chain");
                continue;
            }
            children.push(self.resolve_component(child, state));
        }

        state.chain.pop();

        ComponentTree {
            name: component.name.clone(),
            scope: component.scope.clone(),
            bindings,
            children,
        }
    }

    /// Resolves one requested type key in the current component context.
    fn request(
        &self,
        key: &TypeKey,
        at: &SrcLoc,
        bindings: &mut Vec<ResolvedBinding>,
        state: &mut State<'a>,
    ) {
        let Some(frame) = state.chain.last() else {
            return;
        };
        let context = frame.component.name.clone();

        let memo = (context.clone(), key.clone());
        if state.visit.state(&memo) != VisitState::Unvisited {
            return;
        }
        state.visit.begin(memo.clone());

        // Visible candidates: this component's effective set first, then
        // each ancestor's. Never sideways into sibling subcomponents. A
        // provider reachable through several frames (a module installed at
        // more than one level) still counts as one candidate.
        let mut candidates: Vec<&'a Provider> = Vec::new();
        for frame in state.chain.iter().rev() {
            for provider in frame.effective.get(key).into_iter().flatten().copied() {
                if !candidates.iter().any(|c| std::ptr::eq(*c, provider)) {
                    candidates.push(provider);
                }
            }
        }

        if candidates.is_empty() {
            let mut chain = state.stack.clone();
            chain.push(key.clone());
            self.emit(
                &mut state.report,
                Diagnostic::MissingProvider {
                    key: key.clone(),
                    chain,
                    component: context,
                    at: at.clone(),
                },
            );
            state.visit.finish(memo);
            return;
        }

        let Some(selected) = self.select(key, &context, candidates, &mut state.report) else {
            state.visit.finish(memo);
            return;
        };

        for provider in &selected {
            self.check_scope(key, provider, &context, state);
        }

        bindings.push(ResolvedBinding {
            key: key.clone(),
            sites: selected.iter().map(|p| p.debug.clone()).collect(),
            collection: selected[0].collection.clone(),
            dependencies: selected
                .iter()
                .flat_map(|p| p.dependencies.iter().cloned())
                .collect(),
        });

        state.stack.push(key.clone());

        for provider in &selected {
            for dep in &provider.dependencies {
                if let Some(start) = state.stack.iter().position(|k| k == &dep.key) {
                    if dep.deferred {
                        // The one legal way to close a cycle: the edge is
                        // accepted without expanding further.
                        debug!("deferred edge to `{}` breaks the cycle", dep.key);
                        continue;
                    }

                    let mut path = state.stack[start..].to_vec();
                    path.push(dep.key.clone());
                    self.emit(
                        &mut state.report,
                        Diagnostic::CyclicDependency {
                            path,
                            component: context.clone(),
                            at: provider.debug.clone(),
                        },
                    );
                    continue;
                }

                // A deferred edge to a type not on the path is validated
                // like any other: deferral postpones construction, not
                // build-time checking.
                self.request(&dep.key, &provider.debug, bindings, state);
            }
        }

        state.stack.pop();
        state.visit.finish(memo);
    }

    /// Applies the selection rules: one provider, or several forming a
    /// single aggregate binding. Returns `None` after diagnosing ambiguity.
    fn select(
        &self,
        key: &TypeKey,
        context: &str,
        candidates: Vec<&'a Provider>,
        report: &mut Report,
    ) -> Option<Vec<&'a Provider>> {
        if candidates.len() == 1 {
            return Some(candidates);
        }

        let collection = &candidates[0].collection;
        let aggregable =
            collection.is_some() && candidates.iter().all(|p| &p.collection == collection);

        if aggregable {
            return Some(candidates);
        }

        self.emit(
            report,
            Diagnostic::AmbiguousProvider {
                key: key.clone(),
                component: context.to_owned(),
                locations: candidates.iter().map(|p| p.debug.clone()).collect(),
            },
        );

        None
    }

    /// A scoped provider must be anchored at exactly one component of the
    /// current ancestry chain that declares its scope.
    fn check_scope(&self, key: &TypeKey, provider: &Provider, context: &str, state: &mut State<'a>) {
        let Some(scope) = &provider.scope else {
            // Unscoped providers carry no ownership constraint and may be
            // re-resolved wherever they are requested.
            return;
        };

        let owners = state
            .chain
            .iter()
            .filter(|f| f.component.scope.as_deref() == Some(scope))
            .count();

        if owners != 1 {
            self.emit(
                &mut state.report,
                Diagnostic::ScopeViolation {
                    key: key.clone(),
                    scope: scope.clone(),
                    component: context.to_owned(),
                    at: provider.debug.clone(),
                },
            );
        }
    }

    /// Computes a component's effective provider set: its own providers plus
    /// the providers of all modules reachable through "installs" edges,
    /// depth-first in declaration order, each module contributing once.
    fn effective_frame(&self, component: &'a Component, report: &mut Report) -> Frame<'a> {
        let mut effective: IndexMap<TypeKey, Vec<&'a Provider>> = IndexMap::new();

        for provider in &component.providers {
            effective
                .entry(provider.key.clone())
                .or_default()
                .push(provider);
        }

        let mut seen: HashSet<&'a str> = HashSet::new();
        let mut work: Vec<(String, SrcLoc, &'a str)> = component
            .installs
            .iter()
            .rev()
            .map(|name| (component.name.clone(), component.debug.clone(), name.as_str()))
            .collect();

        while let Some((owner, owner_loc, name)) = work.pop() {
            if !seen.insert(name) {
                continue;
            }

            let Some(decl) = self.interface.module(name) else {
                // The edge contributes nothing further.
                self.emit(
                    report,
                    Diagnostic::UnresolvedModuleReference {
                        owner,
                        module: name.to_owned(),
                        at: owner_loc,
                    },
                );
                continue;
            };

            for provider in &decl.module.providers {
                effective
                    .entry(provider.key.clone())
                    .or_default()
                    .push(provider);
            }

            for install in decl.module.installs.iter().rev() {
                work.push((decl.module.name.clone(), decl.module.debug.clone(), install));
            }
        }

        Frame {
            component,
            effective,
        }
    }

    fn emit(&self, report: &mut Report, diagnostic: Diagnostic) {
        if self.options.is_excluded(&diagnostic) {
            debug!("suppressed excluded diagnostic: {diagnostic}");
            return;
        }
        report.add(diagnostic);
    }
}
