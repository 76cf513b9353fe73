use std::rc::Rc;

use glam::{Mat4, Vec2, Vec3};
use softraster_common::{NodeId, Topology};
use softraster_graph::Cell;

use crate::scene::SceneError;

/// Geometry handed over by a geometry provider when a node is created.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub name: String,
    /// Local-space vertex positions.
    pub positions: Vec<Vec3>,
    /// Per-vertex texture coordinates. Either empty or one per position.
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
    pub topology: Topology,
    /// Offset of the local frame inside the parent frame.
    pub origin: Vec3,
}

impl MeshData {
    /// Check that attributes and indices agree with the vertex count.
    pub fn validate(&self) -> Result<(), SceneError> {
        if !self.uvs.is_empty() && self.uvs.len() != self.positions.len() {
            return Err(SceneError::InvalidMesh(format!(
                "{}: {} uvs for {} positions",
                self.name,
                self.uvs.len(),
                self.positions.len()
            )));
        }
        if let Some(&index) = self
            .indices
            .iter()
            .find(|&&i| i as usize >= self.positions.len())
        {
            return Err(SceneError::InvalidMesh(format!(
                "{}: index {index} out of range for {} positions",
                self.name,
                self.positions.len()
            )));
        }
        Ok(())
    }

    /// Axis-aligned cube centered on the local origin, four vertices per
    /// face so each face gets its own texture coordinates.
    pub fn cube(name: impl Into<String>, half_extent: f32) -> Self {
        let h = half_extent;
        // (normal axis, u axis, v axis) per face; u x v points along the normal
        let faces = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];
        let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

        let mut positions = Vec::with_capacity(24);
        let mut uvs = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, u, v) in faces {
            let base = positions.len() as u32;
            for (su, sv) in corners {
                positions.push((normal + u * su + v * sv) * h);
                uvs.push(Vec2::new((su + 1.0) * 0.5, (1.0 - sv) * 0.5));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self {
            name: name.into(),
            positions,
            uvs,
            indices,
            topology: Topology::TriangleList,
            origin: Vec3::ZERO,
        }
    }

    /// Flat grid in the XZ plane laid out as one triangle strip per row,
    /// joined with repeated indices.
    pub fn grid_strip(name: impl Into<String>, cells: u32, size: f32) -> Self {
        let cells = cells.max(1);
        let step = size / cells as f32;
        let half = size * 0.5;
        let row_len = cells + 1;

        let mut positions = Vec::new();
        let mut uvs = Vec::new();
        let n = cells as f32;
        for z in 0..=cells {
            for x in 0..=cells {
                let (fx, fz) = (x as f32, z as f32);
                positions.push(Vec3::new(fx * step - half, 0.0, fz * step - half));
                uvs.push(Vec2::new(fx / n, fz / n));
            }
        }

        let mut indices = Vec::new();
        for z in 0..cells {
            if z > 0 {
                // degenerate bridge from the previous row
                indices.push(z * row_len);
            }
            for x in 0..=cells {
                indices.push(z * row_len + x);
                indices.push((z + 1) * row_len + x);
            }
            if z + 1 < cells {
                indices.push((z + 1) * row_len + cells);
            }
        }

        Self {
            name: name.into(),
            positions,
            uvs,
            indices,
            topology: Topology::TriangleStrip,
            origin: Vec3::ZERO,
        }
    }

    pub fn with_origin(mut self, origin: Vec3) -> Self {
        self.origin = origin;
        self
    }
}

/// One node of a [`Scene`](crate::Scene).
///
/// The immutable geometry lives here directly; everything that changes per
/// frame is a cell in the scene's graph.
#[derive(Debug)]
pub struct MeshNode {
    pub(crate) id: NodeId,
    pub(crate) name: String,
    pub(crate) local_vertices: Rc<[Vec3]>,
    pub(crate) uvs: Rc<[Vec2]>,
    pub(crate) indices: Rc<[u32]>,
    pub(crate) topology: Topology,
    pub(crate) origin: Vec3,
    pub(crate) parent: Option<NodeId>,
    pub(crate) rotation: Cell<Mat4>,
    /// Holds the parent's model-matrix cell, or the scene identity cell.
    pub(crate) parent_link: Cell<Cell<Mat4>>,
    pub(crate) model_matrix: Cell<Mat4>,
    pub(crate) world_vertices: Cell<Rc<[Vec3]>>,
}

impl MeshNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn local_vertices(&self) -> &[Vec3] {
        &self.local_vertices
    }

    pub fn uvs(&self) -> &[Vec2] {
        &self.uvs
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}
