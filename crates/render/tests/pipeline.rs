use glam::{Quat, Vec3};
use softraster_camera::Camera;
use softraster_common::{CullMode, NodeId, Topology};
use softraster_raster::{FrameBuffer, draw_strip};
use softraster_render::{PipelineConfig, Renderer, Shader, SoftwareRenderer};
use softraster_scene::{MeshData, Scene};

fn camera(width: u32, height: u32) -> Camera {
    let mut camera = Camera::default();
    camera.resize(width, height);
    camera
}

fn parent_and_child() -> (Scene, NodeId, NodeId) {
    let mut scene = Scene::new();
    let parent = MeshData::cube("parent", 0.5);
    let child = MeshData::cube("child", 0.25).with_origin(Vec3::X * 1.5);
    let parent = scene.add_mesh(parent, None).unwrap();
    let child = scene.add_mesh(child, Some(parent)).unwrap();
    (scene, parent, child)
}

#[test]
fn unchanged_scene_is_not_recomputed() {
    let (mut scene, _, _) = parent_and_child();
    let camera = camera(64, 48);
    let mut renderer = SoftwareRenderer::new(64, 48);

    let first = renderer.render(&mut scene, &camera).unwrap();
    let image = renderer.frame().clone();
    let second = renderer.render(&mut scene, &camera).unwrap();

    assert!(first.recomputations > 0);
    assert_eq!(second.recomputations, 0);
    assert_eq!(renderer.frame(), &image);
    assert_eq!(first.raster, second.raster);
}

#[test]
fn rotating_parent_moves_child_on_screen() {
    let (mut scene, parent, child) = parent_and_child();
    let camera = camera(64, 48);
    let mut renderer = SoftwareRenderer::new(64, 48);
    renderer.render(&mut scene, &camera).unwrap();
    let before = renderer.frame().clone();

    let quarter_turn = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);
    scene.set_rotation_quat(parent, quarter_turn).unwrap();
    assert!(scene.is_stale(child).unwrap());

    let stats = renderer.render(&mut scene, &camera).unwrap();
    assert!(!scene.is_stale(child).unwrap());
    assert!(stats.recomputations > 0);
    assert_ne!(renderer.frame(), &before);

    // The child now sits above the parent instead of to its right.
    let model = scene.model_matrix(child).unwrap();
    let center = model.transform_point3(Vec3::ZERO);
    assert!((center - Vec3::new(0.0, 1.5, 0.0)).length() < 1e-5);
}

#[test]
fn moving_camera_only_reprojects() {
    let (mut scene, _, _) = parent_and_child();
    let mut camera = camera(64, 48);
    let mut renderer = SoftwareRenderer::new(64, 48);
    renderer.render(&mut scene, &camera).unwrap();
    let before = renderer.frame().clone();

    camera.translate_local(Vec3::new(0.5, 0.0, 0.0));
    let stats = renderer.render(&mut scene, &camera).unwrap();
    assert_eq!(stats.recomputations, 0);
    assert_ne!(renderer.frame(), &before);
}

#[test]
fn nearer_node_occludes_regardless_of_order() {
    let near = MeshData::cube("near", 0.5).with_origin(Vec3::Z);
    let far = MeshData::cube("far", 1.0).with_origin(Vec3::Z * -2.0);
    let camera = camera(48, 48);

    let render = |meshes: [MeshData; 2]| {
        let mut scene = Scene::new();
        let ids: Vec<NodeId> = meshes
            .into_iter()
            .map(|m| scene.add_mesh(m, None).unwrap())
            .collect();
        let mut target = FrameBuffer::new(48, 48);
        let first_is_near = scene.node(ids[0]).unwrap().name() == "near";
        let near_id = if first_is_near { ids[0] } else { ids[1] };
        let mut renderer = SoftwareRenderer::new(48, 48);
        let result = renderer.render_with(&mut scene, &camera, &mut target, |id, _| {
            if id == near_id {
                0xFFFF_FFFF
            } else {
                0xFF00_00FF
            }
        });
        assert!(result.is_ok());
        target
    };

    let near_first = render([near.clone(), far.clone()]);
    let far_first = render([far, near]);
    assert_eq!(near_first.pixels(), far_first.pixels());
    assert_eq!(near_first.depth(), far_first.depth());
    assert_eq!(near_first.pixel(24, 24), Some(0xFFFF_FFFF));
}

#[test]
fn strip_and_equivalent_list_render_identically() {
    let strip = MeshData::grid_strip("strip", 4, 4.0);
    let mut list_indices = Vec::new();
    let collect = |ids: [u32; 3], _: [u32; 3]| list_indices.extend_from_slice(&ids);
    draw_strip(&strip.indices, |i| i, collect);
    let list = MeshData {
        name: "list".into(),
        indices: list_indices,
        topology: Topology::TriangleList,
        ..strip.clone()
    };

    let mut camera = camera(64, 64);
    camera.set_position(Vec3::new(0.0, 4.0, 4.0));
    camera.look_at(Vec3::ZERO);

    let render = |mesh: MeshData| {
        let mut scene = Scene::new();
        scene.add_mesh(mesh, None).unwrap();
        let mut renderer = SoftwareRenderer::new(64, 64)
            .with_cull(CullMode::None)
            .with_shader(Shader::UvGradient);
        let stats = renderer.render(&mut scene, &camera).unwrap();
        (renderer.frame().clone(), stats)
    };

    let (strip_frame, strip_stats) = render(strip);
    let (list_frame, list_stats) = render(list);
    assert!(strip_stats.raster.pixels_written > 0);
    assert_eq!(strip_frame, list_frame);
    let (strip_raster, list_raster) = (strip_stats.raster, list_stats.raster);
    assert_eq!(strip_raster.triangles_drawn, list_raster.triangles_drawn);
}

#[test]
fn strip_grid_seen_from_above_survives_back_face_culling() {
    let mut scene = Scene::new();
    let floor = MeshData::grid_strip("floor", 3, 3.0);
    scene.add_mesh(floor, None).unwrap();
    let mut camera = camera(64, 64);
    camera.set_position(Vec3::new(0.0, 5.0, 0.5));
    camera.look_at(Vec3::ZERO);

    let cull = CullMode::CounterClockwise;
    let mut renderer = SoftwareRenderer::new(64, 64).with_cull(cull);
    let stats = renderer.render(&mut scene, &camera).unwrap();
    // 3 rows of 6 triangles plus 4 degenerate bridge triangles per join.
    assert_eq!(stats.raster.triangles_submitted, 26);
    assert_eq!(stats.raster.triangles_drawn, 18);
    assert_eq!(stats.raster.triangles_culled, 0);
}

#[test]
fn pipeline_from_saved_config() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    let mut config = PipelineConfig::default();
    config.camera.width = 40;
    config.camera.height = 30;
    config.clear_color = 0xFF12_3456;
    config.save(tmp.path()).unwrap();

    let loaded = PipelineConfig::load(tmp.path()).unwrap();
    let camera = loaded.build_camera().unwrap();
    let mut renderer = SoftwareRenderer::from_config(&loaded);
    let mut scene = Scene::new();
    scene.add_mesh(MeshData::cube("cube", 0.5), None).unwrap();
    renderer.render(&mut scene, &camera).unwrap();

    assert_eq!(renderer.frame().width(), 40);
    assert_eq!(renderer.frame().pixel(0, 0), Some(0xFF12_3456));
    assert_ne!(renderer.frame().pixel(20, 15), Some(0xFF12_3456));
}
