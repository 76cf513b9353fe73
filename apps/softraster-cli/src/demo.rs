use glam::{Quat, Vec3};
use softraster_common::NodeId;
use softraster_scene::{MeshData, Scene, SceneError};

/// Built-in hierarchy: a spinning hub cube, an orbiting arm cube, a small
/// cube riding on the arm, and a floor grid drawn as one triangle strip.
pub struct DemoScene {
    pub scene: Scene,
    hub: NodeId,
    arm: NodeId,
    tip: NodeId,
}

impl DemoScene {
    pub fn build() -> Result<Self, SceneError> {
        let mut scene = Scene::new();
        let hub = scene.add_mesh(MeshData::cube("hub", 0.6), None)?;
        let arm = MeshData::cube("arm", 0.35).with_origin(Vec3::X * 1.8);
        let arm = scene.add_mesh(arm, Some(hub))?;
        let tip = MeshData::cube("tip", 0.15).with_origin(Vec3::Y * 0.7);
        let tip = scene.add_mesh(tip, Some(arm))?;
        let floor = MeshData::grid_strip("floor", 8, 8.0);
        scene.add_mesh(floor.with_origin(Vec3::NEG_Y * 1.2), None)?;
        Ok(Self {
            scene,
            hub,
            arm,
            tip,
        })
    }

    /// Pose every animated node for time `t` in seconds.
    pub fn animate(&mut self, t: f32) -> Result<(), SceneError> {
        let poses = [
            (self.hub, Quat::from_rotation_y(t * 0.8)),
            (self.arm, Quat::from_rotation_x(t * 2.0)),
            (self.tip, Quat::from_rotation_z(t * 3.0)),
        ];
        for (id, rotation) in poses {
            self.scene.set_rotation_quat(id, rotation)?;
        }
        Ok(())
    }
}
