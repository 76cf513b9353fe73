use std::rc::Rc;

use glam::{Mat4, Quat, Vec3};
use softraster_common::NodeId;
use softraster_graph::{Cell, Graph, GraphError, GraphStats};

use crate::mesh::{MeshData, MeshNode};

/// Errors from scene operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),
    #[error("making {parent} the parent of {node} would create a cycle")]
    ParentCycle { node: NodeId, parent: NodeId },
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),
    #[error("dependency graph error: {0}")]
    Graph(#[from] GraphError),
}

/// Arena of mesh nodes sharing one dependency graph.
///
/// Parent links are stored as optional [`NodeId`]s for queries and as a cell
/// holding the parent's model-matrix cell for the graph, so reparenting is a
/// single write that the graph turns into invalidation of the whole subtree.
#[derive(Debug)]
pub struct Scene {
    graph: Graph,
    nodes: Vec<MeshNode>,
    identity: Cell<Mat4>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        let mut graph = Graph::new();
        let identity = graph.mutable(Mat4::IDENTITY);
        Self {
            graph,
            nodes: Vec::new(),
            identity,
        }
    }

    /// Number of nodes in the scene.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All node ids in creation order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().map(|n| n.id)
    }

    pub fn node(&self, id: NodeId) -> Result<&MeshNode, SceneError> {
        self.nodes
            .get(id.index())
            .ok_or(SceneError::UnknownNode(id))
    }

    pub fn graph_stats(&self) -> GraphStats {
        self.graph.stats()
    }

    /// Add a mesh with an identity rotation under `parent` (or at the root).
    pub fn add_mesh(
        &mut self,
        data: MeshData,
        parent: Option<NodeId>,
    ) -> Result<NodeId, SceneError> {
        data.validate()?;
        let parent_matrix_cell = match parent {
            Some(p) => self.node(p)?.model_matrix,
            None => self.identity,
        };

        let id = NodeId(self.nodes.len());
        let rotation = self.graph.mutable(Mat4::IDENTITY);
        let parent_link = self.graph.mutable(parent_matrix_cell);
        let parent_matrix = self.graph.unwrap(parent_link)?;

        let origin = data.origin;
        let model_matrix = self.graph.map2(rotation, parent_matrix, move |rotation, parent| {
            *parent * Mat4::from_translation(origin) * *rotation
        })?;

        let local_vertices: Rc<[Vec3]> = data.positions.into();
        let local = local_vertices.clone();
        let world_vertices = self.graph.map(model_matrix, move |model: &Mat4| {
            local
                .iter()
                .map(|v| model.transform_point3(*v))
                .collect::<Rc<[Vec3]>>()
        })?;

        tracing::trace!(node = %id, name = %data.name, ?parent, "mesh added");
        self.nodes.push(MeshNode {
            id,
            name: data.name,
            local_vertices,
            uvs: data.uvs.into(),
            indices: data.indices.into(),
            topology: data.topology,
            origin,
            parent,
            rotation,
            parent_link,
            model_matrix,
            world_vertices,
        });
        Ok(id)
    }

    /// Replace a node's local rotation.
    pub fn set_rotation(&mut self, id: NodeId, rotation: Mat4) -> Result<(), SceneError> {
        let cell = self.node(id)?.rotation;
        self.graph.write(cell, rotation)?;
        Ok(())
    }

    pub fn set_rotation_quat(&mut self, id: NodeId, rotation: Quat) -> Result<(), SceneError> {
        self.set_rotation(id, Mat4::from_quat(rotation))
    }

    pub fn rotation(&mut self, id: NodeId) -> Result<Mat4, SceneError> {
        let cell = self.node(id)?.rotation;
        Ok(self.graph.read(cell)?)
    }

    /// Move a node under `parent`, or to the root with `None`.
    ///
    /// Rejects links that would make a node its own ancestor.
    pub fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) -> Result<(), SceneError> {
        let link = self.node(id)?.parent_link;
        let target = match parent {
            Some(p) => {
                if self.ancestors_and_self(p)?.contains(&id) {
                    return Err(SceneError::ParentCycle {
                        node: id,
                        parent: p,
                    });
                }
                self.node(p)?.model_matrix
            }
            None => self.identity,
        };

        let previous = self.nodes[id.index()].parent;
        if previous == parent {
            return Ok(());
        }
        self.nodes[id.index()].parent = parent;
        self.graph.write(link, target)?;
        tracing::debug!(node = %id, ?previous, ?parent, "reparented");
        Ok(())
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, SceneError> {
        Ok(self.node(id)?.parent)
    }

    /// Direct children of a node, in creation order.
    pub fn children(&self, id: NodeId) -> Result<Vec<NodeId>, SceneError> {
        self.node(id)?;
        Ok(self
            .nodes
            .iter()
            .filter(|n| n.parent == Some(id))
            .map(|n| n.id)
            .collect())
    }

    /// Nodes without a parent.
    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.parent.is_none())
            .map(|n| n.id)
            .collect()
    }

    /// Model-to-world matrix, recomputed only if something upstream changed.
    pub fn model_matrix(&mut self, id: NodeId) -> Result<Mat4, SceneError> {
        let cell = self.node(id)?.model_matrix;
        Ok(self.graph.read(cell)?)
    }

    /// World-space vertices, recomputed only if something upstream changed.
    pub fn world_vertices(&mut self, id: NodeId) -> Result<Rc<[Vec3]>, SceneError> {
        let cell = self.node(id)?.world_vertices;
        Ok(self.graph.read(cell)?)
    }

    /// Whether the node's world vertices are stale.
    pub fn is_stale(&self, id: NodeId) -> Result<bool, SceneError> {
        Ok(self.graph.is_dirty(self.node(id)?.world_vertices))
    }

    fn ancestors_and_self(&self, id: NodeId) -> Result<Vec<NodeId>, SceneError> {
        let mut chain = vec![id];
        let mut current = self.node(id)?.parent;
        while let Some(p) = current {
            chain.push(p);
            current = self.node(p)?.parent;
        }
        Ok(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn assert_vec_close(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-5, "{a} != {b}");
    }

    fn point(name: &str, origin: Vec3) -> MeshData {
        MeshData {
            name: name.into(),
            positions: vec![Vec3::X],
            origin,
            ..MeshData::default()
        }
    }

    /// World position of a point mesh's single vertex.
    fn world0(scene: &mut Scene, id: NodeId) -> Vec3 {
        scene.world_vertices(id).unwrap()[0]
    }

    fn quarter_turn_z() -> Quat {
        Quat::from_rotation_z(FRAC_PI_2)
    }

    #[test]
    fn root_applies_rotation_then_origin() {
        let mut scene = Scene::new();
        let mesh = point("p", Vec3::new(0.0, 0.0, 5.0));
        let id = scene.add_mesh(mesh, None).unwrap();
        scene.set_rotation_quat(id, quarter_turn_z()).unwrap();

        assert_vec_close(world0(&mut scene, id), Vec3::new(0.0, 1.0, 5.0));
    }

    #[test]
    fn rotation_reads_back_what_was_set() {
        let mut scene = Scene::new();
        let id = scene.add_mesh(point("p", Vec3::Y), None).unwrap();
        assert_eq!(scene.rotation(id).unwrap(), Mat4::IDENTITY);

        scene.set_rotation_quat(id, quarter_turn_z()).unwrap();
        let expected = Mat4::from_quat(quarter_turn_z());
        assert!(scene.rotation(id).unwrap().abs_diff_eq(expected, 1e-6));
        assert_eq!(scene.node(id).unwrap().origin(), Vec3::Y);
    }

    #[test]
    fn child_follows_parent_rotation() {
        let mut scene = Scene::new();
        let parent = scene.add_mesh(point("arm", Vec3::ZERO), None).unwrap();
        let hand = point("hand", Vec3::new(2.0, 0.0, 0.0));
        let child = scene.add_mesh(hand, Some(parent)).unwrap();
        assert_vec_close(world0(&mut scene, child), Vec3::new(3.0, 0.0, 0.0));

        scene.set_rotation_quat(parent, quarter_turn_z()).unwrap();
        assert!(scene.is_stale(child).unwrap());
        assert_vec_close(world0(&mut scene, child), Vec3::new(0.0, 3.0, 0.0));
    }

    #[test]
    fn world_vertices_are_memoized() {
        let mut scene = Scene::new();
        let id = scene.add_mesh(MeshData::cube("cube", 1.0), None).unwrap();
        scene.world_vertices(id).unwrap();
        let after_first = scene.graph_stats().recomputations;

        let a = scene.world_vertices(id).unwrap();
        let b = scene.world_vertices(id).unwrap();
        assert_eq!(scene.graph_stats().recomputations, after_first);
        assert!(Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn reparenting_invalidates_subtree() {
        let mut scene = Scene::new();
        let left = point("left", Vec3::new(-10.0, 0.0, 0.0));
        let right = point("right", Vec3::new(10.0, 0.0, 0.0));
        let left = scene.add_mesh(left, None).unwrap();
        let right = scene.add_mesh(right, None).unwrap();
        let mid = scene.add_mesh(point("mid", Vec3::Y), Some(left)).unwrap();
        let leaf = scene.add_mesh(point("leaf", Vec3::Z), Some(mid)).unwrap();

        assert_vec_close(world0(&mut scene, leaf), Vec3::new(-9.0, 1.0, 1.0));
        assert!(!scene.is_stale(leaf).unwrap());

        scene.set_parent(mid, Some(right)).unwrap();
        assert!(scene.is_stale(mid).unwrap());
        assert!(scene.is_stale(leaf).unwrap());
        assert_vec_close(world0(&mut scene, leaf), Vec3::new(11.0, 1.0, 1.0));

        // The old parent no longer affects the moved subtree.
        scene.set_rotation_quat(left, quarter_turn_z()).unwrap();
        assert!(!scene.is_stale(leaf).unwrap());
    }

    #[test]
    fn detach_to_root() {
        let mut scene = Scene::new();
        let parent = point("parent", Vec3::new(4.0, 0.0, 0.0));
        let parent = scene.add_mesh(parent, None).unwrap();
        let child = point("child", Vec3::ZERO);
        let child = scene.add_mesh(child, Some(parent)).unwrap();
        assert_vec_close(world0(&mut scene, child), Vec3::new(5.0, 0.0, 0.0));

        scene.set_parent(child, None).unwrap();
        assert_eq!(scene.parent(child).unwrap(), None);
        assert_vec_close(world0(&mut scene, child), Vec3::X);
        assert_eq!(scene.roots(), vec![parent, child]);
    }

    #[test]
    fn parent_cycle_rejected() {
        let mut scene = Scene::new();
        let a = scene.add_mesh(point("a", Vec3::ZERO), None).unwrap();
        let b = scene.add_mesh(point("b", Vec3::ZERO), Some(a)).unwrap();
        let c = scene.add_mesh(point("c", Vec3::ZERO), Some(b)).unwrap();

        assert_eq!(
            scene.set_parent(a, Some(c)),
            Err(SceneError::ParentCycle { node: a, parent: c })
        );
        assert_eq!(
            scene.set_parent(a, Some(a)),
            Err(SceneError::ParentCycle { node: a, parent: a })
        );
        assert_eq!(scene.children(a).unwrap(), vec![b]);
    }

    #[test]
    fn unknown_node_errors() {
        let mut scene = Scene::new();
        let ghost = NodeId(3);
        let missing = Err(SceneError::UnknownNode(ghost));
        assert_eq!(scene.world_vertices(ghost), missing);
        assert!(scene.rotation(ghost).is_err());
        let orphan = point("x", Vec3::ZERO);
        assert!(scene.add_mesh(orphan, Some(ghost)).is_err());
    }

    #[test]
    fn invalid_mesh_is_rejected_before_insert() {
        let mut scene = Scene::new();
        let mut bad = MeshData::cube("bad", 1.0);
        bad.indices.push(1000);
        assert!(scene.add_mesh(bad, None).is_err());
        assert!(scene.is_empty());
    }
}
