use std::fmt::Write as _;

use glam::{Vec2, Vec3};
use softraster_camera::Camera;
use softraster_common::{CullMode, NodeId};
use softraster_raster::{Fragment, FrameBuffer, RasterStats, Rasterizer, ScreenVertex};
use softraster_scene::{Scene, SceneError};

use crate::config::PipelineConfig;
use crate::shader::Shader;

/// Errors that abort a frame.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),
    #[error("target size {target:?} does not match viewport {viewport:?}")]
    ViewportMismatch {
        target: (u32, u32),
        viewport: (u32, u32),
    },
}

/// Renderer-agnostic interface.
///
/// A renderer reads the scene through a camera and produces output. Reading
/// may bring stale world geometry up to date, which is why the scene is
/// borrowed mutably, but node state is never modified.
pub trait Renderer {
    type Output;

    fn render(&mut self, scene: &mut Scene, camera: &Camera) -> Result<Self::Output, RenderError>;
}

/// Counters for one rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub nodes: usize,
    /// Derived cells the scene graph had to recompute for this frame.
    pub recomputations: u64,
    pub raster: RasterStats,
}

/// CPU renderer: projects every node's world vertices, assembles triangles
/// from its index buffer and fills them into a [`FrameBuffer`].
#[derive(Debug)]
pub struct SoftwareRenderer {
    rasterizer: Rasterizer,
    frame: FrameBuffer,
    cull: CullMode,
    clear_color: u32,
    shader: Shader,
}

impl SoftwareRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        let defaults = PipelineConfig::default();
        Self {
            rasterizer: Rasterizer::new(),
            frame: FrameBuffer::new(width, height),
            cull: defaults.cull,
            clear_color: defaults.clear_color,
            shader: defaults.shader,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        let (width, height) = config.camera.clamped_viewport();
        Self {
            cull: config.cull,
            clear_color: config.clear_color,
            shader: config.shader,
            ..Self::new(width, height)
        }
    }

    pub fn with_cull(mut self, cull: CullMode) -> Self {
        self.cull = cull;
        self
    }

    pub fn with_clear_color(mut self, color: u32) -> Self {
        self.clear_color = color;
        self
    }

    pub fn with_shader(mut self, shader: Shader) -> Self {
        self.shader = shader;
        self
    }

    /// The image produced by the last [`Renderer::render`] call.
    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn cull(&self) -> CullMode {
        self.cull
    }

    /// Draw the scene into a caller-owned target with a custom shader.
    ///
    /// The target is cleared first and must already match the camera
    /// viewport.
    pub fn render_with<F>(
        &mut self,
        scene: &mut Scene,
        camera: &Camera,
        target: &mut FrameBuffer,
        shader: F,
    ) -> Result<FrameStats, RenderError>
    where
        F: FnMut(NodeId, &Fragment<'_, Vec2>) -> u32,
    {
        draw_frame(
            &mut self.rasterizer,
            self.cull,
            self.clear_color,
            scene,
            camera,
            target,
            shader,
        )
    }
}

impl Renderer for SoftwareRenderer {
    type Output = FrameStats;

    /// Draw into the owned frame, resizing it to the camera viewport first.
    fn render(&mut self, scene: &mut Scene, camera: &Camera) -> Result<FrameStats, RenderError> {
        self.frame.resize(camera.width(), camera.height());
        let shader = self.shader;
        draw_frame(
            &mut self.rasterizer,
            self.cull,
            self.clear_color,
            scene,
            camera,
            &mut self.frame,
            |node, fragment| shader.shade(node, fragment),
        )
    }
}

fn draw_frame<F>(
    rasterizer: &mut Rasterizer,
    cull: CullMode,
    clear_color: u32,
    scene: &mut Scene,
    camera: &Camera,
    target: &mut FrameBuffer,
    mut shader: F,
) -> Result<FrameStats, RenderError>
where
    F: FnMut(NodeId, &Fragment<'_, Vec2>) -> u32,
{
    let size = (target.width(), target.height());
    let viewport = (camera.width(), camera.height());
    if size != viewport {
        return Err(RenderError::ViewportMismatch {
            target: size,
            viewport,
        });
    }

    let _span = tracing::info_span!(
        "render_frame",
        nodes = scene.len(),
        width = target.width(),
        height = target.height()
    )
    .entered();

    target.clear(clear_color);
    rasterizer.reset_stats();
    let recomputed_before = scene.graph_stats().recomputations;

    let ids: Vec<NodeId> = scene.ids().collect();
    for &id in &ids {
        let world = scene.world_vertices(id)?;
        let node = scene.node(id)?;
        let uvs = node.uvs();
        let screen: Vec<ScreenVertex<Vec2>> = world
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let uv = uvs.get(i).copied().unwrap_or(Vec2::ZERO);
                ScreenVertex::new(camera.world_to_screen(p), uv)
            })
            .collect();

        let pixels_before = rasterizer.stats().pixels_written;
        let triangles = softraster_raster::draw_indexed(
            node.topology(),
            node.indices(),
            |i| screen[i as usize],
            |_, vertices| {
                rasterizer.fill_triangle(target, &vertices, cull, |f| shader(id, f));
            },
        );
        tracing::debug!(
            node = %id,
            name = node.name(),
            triangles,
            pixels = rasterizer.stats().pixels_written - pixels_before,
            "node drawn"
        );
    }

    let stats = FrameStats {
        nodes: ids.len(),
        recomputations: scene.graph_stats().recomputations - recomputed_before,
        raster: rasterizer.stats(),
    };
    tracing::info!(
        triangles = stats.raster.triangles_drawn,
        culled = stats.raster.triangles_culled,
        pixels = stats.raster.pixels_written,
        recomputations = stats.recomputations,
        "frame rendered"
    );
    Ok(stats)
}

/// Text renderer for inspecting a scene from the command line.
///
/// Lists every node with its parent, triangle count, world-space bounds and
/// where the bounds' center lands on screen.
#[derive(Debug, Default)]
pub struct TextSummaryRenderer;

impl TextSummaryRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for TextSummaryRenderer {
    type Output = String;

    fn render(&mut self, scene: &mut Scene, camera: &Camera) -> Result<String, RenderError> {
        let mut out = String::new();
        let _ = writeln!(out, "=== Scene ({} nodes) ===", scene.len());
        let _ = writeln!(
            out,
            "Camera: pos={} dir={} fov={:.0} viewport={}x{}",
            fmt3(camera.position()),
            fmt3(camera.direction()),
            camera.fov().to_degrees(),
            camera.width(),
            camera.height()
        );

        let ids: Vec<NodeId> = scene.ids().collect();
        for id in ids {
            let world = scene.world_vertices(id)?;
            let node = scene.node(id)?;
            let empty = (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY));
            let grow = |(lo, hi): (Vec3, Vec3), v: &Vec3| (lo.min(*v), hi.max(*v));
            let (min, max) = world.iter().fold(empty, grow);
            let parent = match node.parent() {
                Some(p) => p.to_string(),
                None => "-".into(),
            };
            let triangles = node.topology().triangle_count(node.indices().len());
            let _ = write!(
                out,
                "  [{id}] {} parent={parent} triangles={triangles}",
                node.name()
            );
            if world.is_empty() {
                let _ = writeln!(out, " (empty)");
                continue;
            }
            let center = camera.world_to_screen((min + max) * 0.5);
            let _ = writeln!(
                out,
                " bounds={}..{} screen=({:.1}, {:.1})",
                fmt3(min),
                fmt3(max),
                center.x,
                center.y
            );
        }
        Ok(out)
    }
}

fn fmt3(v: Vec3) -> String {
    format!("({:.2}, {:.2}, {:.2})", v.x, v.y, v.z)
}
