//! Three-color bookkeeping for depth-first traversals.

use std::collections::HashMap;
use std::hash::Hash;

use derive_more::Display;

/// DFS coloring: unvisited (white), on the current path (gray), done (black).
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VisitState {
    #[default]
    Unvisited,
    Visiting,
    Visited,
}

/// Map from node to its [`VisitState`], defaulting to `Unvisited`.
#[derive(Debug, Clone)]
pub struct VisitMap<T>(HashMap<T, VisitState>);

impl<T> VisitMap<T>
where
    T: Eq + Hash,
{
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn state(&self, key: &T) -> VisitState {
        self.0.get(key).copied().unwrap_or(VisitState::Unvisited)
    }

    /// Marks a node gray. Returns `false` if it was already entered.
    pub fn begin(&mut self, key: T) -> bool {
        match self.0.get(&key) {
            Some(VisitState::Visiting) | Some(VisitState::Visited) => false,
            _ => {
                self.0.insert(key, VisitState::Visiting);
                true
            }
        }
    }

    /// Marks a node black once its subtree is exhausted.
    pub fn finish(&mut self, key: T) {
        self.0.insert(key, VisitState::Visited);
    }

    pub fn is_visiting(&self, key: &T) -> bool {
        self.state(key) == VisitState::Visiting
    }

    pub fn is_visited(&self, key: &T) -> bool {
        self.state(key) == VisitState::Visited
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T> Default for VisitMap<T>
where
    T: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coloring_transitions() {
        let mut map = VisitMap::new();
        assert_eq!(map.state(&"a"), VisitState::Unvisited);

        assert!(map.begin("a"));
        assert!(map.is_visiting(&"a"));
        assert!(!map.begin("a"));

        map.finish("a");
        assert!(map.is_visited(&"a"));
        assert!(!map.begin("a"));
    }
}
