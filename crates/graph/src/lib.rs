//! Dependency graph: lazily recomputed, memoized cells.
//!
//! # Invariants
//! - Reading a mutable cell returns the most recent write.
//! - Writes mark every transitive dependent dirty immediately; nothing is
//!   recomputed until the next read (push-mark, pull-evaluate).
//! - A clean derived cell is never recomputed; a dirty one is recomputed at
//!   most once per invalidation.
//! - A failed recomputation leaves the cell dirty so the next read retries.

mod error;
mod graph;

pub use error::GraphError;
pub use graph::{Cell, CellId, Graph, GraphStats, Inputs};

pub fn crate_info() -> &'static str {
    "softraster-graph v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("graph"));
    }
}
