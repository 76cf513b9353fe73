//! Shared value types used across the softraster crates.
//!
//! Nothing in here owns state; these are the small handles and policies that
//! cross crate boundaries (node handles, cull policy, index topology, packed
//! ARGB colors).

mod color;
mod types;

pub use color::{argb, argb_to_rgba, grayscale, lerp_argb, unpack_argb};
pub use types::{CullMode, NodeId, Topology};

pub fn crate_info() -> &'static str {
    "softraster-common v0.1.0"
}
