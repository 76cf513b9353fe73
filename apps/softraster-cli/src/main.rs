mod demo;

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use glam::Vec3;
use softraster_raster::FrameBuffer;
use softraster_render::{PipelineConfig, Renderer, Shader, SoftwareRenderer, TextSummaryRenderer};
use tracing_subscriber::EnvFilter;

use crate::demo::DemoScene;

const FRAME_STEP: f32 = 1.0 / 30.0;

#[derive(Parser)]
#[command(name = "softraster-cli", about = "Software rasterizer demo")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ShaderArg {
    Flat,
    Depth,
    UvGradient,
}

impl From<ShaderArg> for Shader {
    fn from(arg: ShaderArg) -> Self {
        match arg {
            ShaderArg::Flat => Shader::Flat,
            ShaderArg::Depth => Shader::Depth,
            ShaderArg::UvGradient => Shader::UvGradient,
        }
    }
}

#[derive(clap::Args)]
struct ViewArgs {
    /// Pipeline configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Viewport width in pixels
    #[arg(long)]
    width: Option<u32>,
    /// Viewport height in pixels
    #[arg(long)]
    height: Option<u32>,
    /// Shader override
    #[arg(long, value_enum)]
    shader: Option<ShaderArg>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate info and a summary of the demo scene
    Info,
    /// Render frames of the animated demo scene to PNG
    Render {
        #[command(flatten)]
        view: ViewArgs,
        /// Number of frames to render
        #[arg(short, long, default_value = "1")]
        frames: u32,
        /// Output PNG; with several frames a frame number is appended
        #[arg(short, long, default_value = "frame.png")]
        output: PathBuf,
        /// Write the resolved pipeline configuration here
        #[arg(long)]
        save_config: Option<PathBuf>,
    },
    /// Time frame rendering of the demo scene
    Bench {
        #[command(flatten)]
        view: ViewArgs,
        /// Number of frames to render
        #[arg(short, long, default_value = "120")]
        frames: u32,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("softraster-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", softraster_common::crate_info());
            println!("graph: {}", softraster_graph::crate_info());
            println!("scene: {}", softraster_scene::crate_info());
            println!("camera: {}", softraster_camera::crate_info());
            println!("raster: {}", softraster_raster::crate_info());
            println!("render: {}", softraster_render::crate_info());

            let config = demo_config();
            let camera = config.build_camera()?;
            let mut demo = DemoScene::build()?;
            let mut text = TextSummaryRenderer::new();
            let summary = text.render(&mut demo.scene, &camera)?;
            print!("{summary}");
        }
        Commands::Render {
            view,
            frames,
            output,
            save_config,
        } => render_frames(&view, frames, &output, save_config.as_deref())?,
        Commands::Bench { view, frames } => {
            let config = resolve_config(&view)?;
            let camera = config.build_camera()?;
            let mut renderer = SoftwareRenderer::from_config(&config);
            let mut demo = DemoScene::build()?;
            let frames = frames.max(1);

            let mut pixels = 0u64;
            let start = Instant::now();
            for frame in 0..frames {
                demo.animate(frame as f32 * FRAME_STEP)?;
                let stats = renderer.render(&mut demo.scene, &camera)?;
                pixels += stats.raster.pixels_written;
            }
            let elapsed = start.elapsed();
            let per_frame = elapsed / frames;
            println!(
                "{frames} frames at {}x{}: {per_frame:?}/frame, {:.1} fps, {:.2} Mpx/s written",
                camera.width(),
                camera.height(),
                frames as f64 / elapsed.as_secs_f64(),
                pixels as f64 / elapsed.as_secs_f64() / 1e6
            );
        }
    }

    Ok(())
}

/// Render `frames` frames of the demo animation to PNG files.
fn render_frames(
    view: &ViewArgs,
    frames: u32,
    output: &Path,
    save_config: Option<&Path>,
) -> anyhow::Result<()> {
    let config = resolve_config(view)?;
    if let Some(path) = save_config {
        config.save(path)?;
        tracing::info!("saved config to {}", path.display());
    }
    let camera = config.build_camera()?;
    let mut renderer = SoftwareRenderer::from_config(&config);
    let mut demo = DemoScene::build()?;

    for frame in 0..frames {
        demo.animate(frame as f32 * FRAME_STEP)?;
        let stats = renderer.render(&mut demo.scene, &camera)?;
        let path = frame_path(output, frame, frames);
        write_png(renderer.frame(), &path)?;
        tracing::info!(
            frame,
            triangles = stats.raster.triangles_drawn,
            culled = stats.raster.triangles_culled,
            recomputed = stats.recomputations,
            "wrote {}",
            path.display()
        );
    }
    Ok(())
}

/// Camera framing the demo scene from above and in front.
fn demo_config() -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.camera.position = Vec3::new(0.0, 3.0, 7.0);
    config.camera.direction = -config.camera.position;
    config.camera.near = 0.5;
    config.camera.far = 50.0;
    config
}

fn resolve_config(view: &ViewArgs) -> anyhow::Result<PipelineConfig> {
    let mut config = match &view.config {
        Some(path) => PipelineConfig::load(path)?,
        None => demo_config(),
    };
    if let Some(width) = view.width {
        config.camera.width = width;
    }
    if let Some(height) = view.height {
        config.camera.height = height;
    }
    (config.camera.width, config.camera.height) = config.camera.clamped_viewport();
    if let Some(shader) = view.shader {
        config.shader = shader.into();
    }
    tracing::debug!(
        width = config.camera.width,
        height = config.camera.height,
        shader = ?config.shader,
        "resolved pipeline config"
    );
    Ok(config)
}

fn frame_path(output: &Path, frame: u32, frames: u32) -> PathBuf {
    if frames <= 1 {
        return output.to_path_buf();
    }
    let stem = output
        .file_stem()
        .map_or_else(|| "frame".into(), |s| s.to_string_lossy().into_owned());
    output.with_file_name(format!("{stem}_{frame:03}.png"))
}

fn write_png(frame: &FrameBuffer, path: &Path) -> anyhow::Result<()> {
    let bytes = frame.to_rgba_bytes();
    let Some(image) = image::RgbaImage::from_raw(frame.width(), frame.height(), bytes) else {
        anyhow::bail!("framebuffer size does not match its pixel data");
    };
    image.save(path)?;
    Ok(())
}
