use serde::{Deserialize, Serialize};

/// Handle to a node in a scene arena.
///
/// Handles are plain indices: they are only meaningful for the scene that
/// issued them and stay valid for that scene's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Back-face cull policy, expressed in terms of the sign of the screen-space
/// edge-function area `E(v0, v1, v2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CullMode {
    /// Draw both windings.
    #[default]
    None,
    /// Discard triangles whose signed area is `>= 0`.
    Clockwise,
    /// Discard triangles whose signed area is `<= 0`.
    CounterClockwise,
}

impl CullMode {
    /// Whether a triangle with the given signed area survives this policy.
    ///
    /// Zero-area triangles never survive, whatever the policy.
    pub fn keeps(self, signed_area: f32) -> bool {
        match self {
            CullMode::None => signed_area != 0.0,
            CullMode::Clockwise => signed_area < 0.0,
            CullMode::CounterClockwise => signed_area > 0.0,
        }
    }
}

/// How an index buffer groups vertices into triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    /// Every three indices form one independent triangle.
    #[default]
    TriangleList,
    /// Every index after the first two forms a triangle with its two
    /// predecessors; odd triangles are re-wound.
    TriangleStrip,
}

impl Topology {
    /// Number of triangles an index buffer of `len` indices produces.
    pub fn triangle_count(self, len: usize) -> usize {
        match self {
            Topology::TriangleList => len / 3,
            Topology::TriangleStrip => len.saturating_sub(2),
        }
    }
}
