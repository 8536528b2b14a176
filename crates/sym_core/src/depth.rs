//! Recursion depth accounting for the tree-walking rewriters.
//!
//! The recursive algorithms (`eval`, `expand`, `subs`, `diff`,
//! `series`, normalization) carry an explicit depth and abort with
//! [`KernelError::RecursionLimit`] instead of overflowing the stack.

use crate::error::{KernelError, Result};

/// Maximum nesting depth a single rewrite will follow.
pub const MAX_RECURSION: usize = 1024;

/// One step deeper, or the limit error tagged with the algorithm name.
#[inline]
pub(crate) fn descend(depth: usize, what: &'static str) -> Result<usize> {
    if depth >= MAX_RECURSION {
        Err(KernelError::RecursionLimit(what))
    } else {
        Ok(depth + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descend_counts_and_stops() {
        assert_eq!(descend(0, "test").unwrap(), 1);
        assert!(matches!(
            descend(MAX_RECURSION, "test"),
            Err(KernelError::RecursionLimit("test"))
        ));
    }
}
