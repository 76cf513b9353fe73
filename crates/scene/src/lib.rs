//! Scene transform nodes.
//!
//! Each node is one renderable sub-mesh with a local rotation, a local
//! origin offset and an optional parent. World-space geometry is derived
//! through the dependency graph, so rotating or reparenting a node
//! invalidates it and all of its descendants without any propagation code.
//!
//! # Invariants
//! - `model = parent_model * translate(origin) * rotation` (identity parent
//!   for roots).
//! - World vertices are recomputed at most once per change upstream.
//! - The parent relation is acyclic.

mod mesh;
mod scene;

pub use mesh::{MeshData, MeshNode};
pub use scene::{Scene, SceneError};

pub fn crate_info() -> &'static str {
    "softraster-scene v0.1.0"
}
