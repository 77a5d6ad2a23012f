//! Display helpers for dependency chains.

use std::fmt;

/// Renders a slice as `A -> B -> C`.
///
/// Used for requesting chains and cycle paths in diagnostics.
pub struct Chain<'a, T>(pub &'a [T]);

impl<T: fmt::Display> fmt::Display for Chain<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut iter = self.0.iter();

        if let Some(first) = iter.next() {
            write!(f, "{first}")?;
        }

        for el in iter {
            write!(f, " -> {el}")?;
        }

        Ok(())
    }
}
