use std::hint::black_box;
use std::time::{Duration, Instant};

use glam::Vec4;
use softraster_common::{CullMode, Topology, grayscale};
use softraster_raster::{FrameBuffer, Rasterizer, ScreenVertex, draw_indexed};

fn triangle(size: f32, depth: f32) -> [ScreenVertex<()>; 3] {
    [
        ScreenVertex::new(Vec4::new(0.0, 0.0, depth, 1.0), ()),
        ScreenVertex::new(Vec4::new(size, 0.0, depth, 1.0), ()),
        ScreenVertex::new(Vec4::new(0.0, size, depth, 1.0), ()),
    ]
}

fn report(label: &str, iterations: usize, elapsed: Duration) {
    let per_iter = elapsed / iterations as u32;
    println!("  {label}: {per_iter:?}/iter, total {elapsed:?}");
}

fn bench_large_triangle(width: u32, height: u32, iterations: usize) {
    let mut fb = FrameBuffer::new(width, height);
    let mut raster = Rasterizer::new();
    let shape = triangle(width.max(height) as f32, 0.5);

    let start = Instant::now();
    for _ in 0..iterations {
        fb.clear(0);
        let input = black_box(&shape);
        let outcome = raster.fill_triangle(&mut fb, input, CullMode::None, |_| 0xFFFF_FFFF);
        black_box(outcome);
    }
    let label = format!("large triangle ({width}x{height}, {iterations} iters)");
    report(&label, iterations, start.elapsed());
}

fn bench_overdraw(layers: usize, iterations: usize) {
    let mut fb = FrameBuffer::new(256, 256);
    let mut raster = Rasterizer::new();
    // Back to front so every layer passes the depth test.
    let shapes: Vec<_> = (0..layers)
        .map(|i| triangle(256.0, 1.0 - i as f32 / (layers as f32 + 1.0)))
        .collect();

    let start = Instant::now();
    for _ in 0..iterations {
        fb.clear(0);
        for shape in &shapes {
            let input = black_box(shape);
            raster.fill_triangle(&mut fb, input, CullMode::None, |f| grayscale(f.depth()));
        }
    }
    let label = format!("overdraw ({layers} layers, {iterations} iters)");
    report(&label, iterations, start.elapsed());
}

fn bench_strip_grid(cells: u32, iterations: usize) {
    let size = 512u32;
    let step = size as f32 / cells as f32;
    let mut positions = Vec::new();
    for row in 0..=cells {
        for col in 0..=cells {
            positions.push(Vec4::new(col as f32 * step, row as f32 * step, 0.5, 1.0));
        }
    }
    let stride = cells + 1;
    let mut indices = Vec::new();
    for row in 0..cells {
        if row > 0 {
            indices.push(row * stride);
        }
        for col in 0..=cells {
            indices.push(row * stride + col);
            indices.push((row + 1) * stride + col);
        }
        if row + 1 < cells {
            indices.push((row + 1) * stride + cells);
        }
    }

    let mut fb = FrameBuffer::new(size, size);
    let mut raster = Rasterizer::new();
    let start = Instant::now();
    for _ in 0..iterations {
        fb.clear(0);
        draw_indexed(
            Topology::TriangleStrip,
            black_box(&indices),
            |i| ScreenVertex::new(positions[i as usize], ()),
            |_, verts| {
                raster.fill_triangle(&mut fb, &verts, CullMode::None, |_| 0xFF80_8080);
            },
        );
    }
    let label = format!("strip grid ({cells}x{cells} cells, {iterations} iters)");
    report(&label, iterations, start.elapsed());
}

fn main() {
    println!("=== Rasterizer Benchmarks ===\n");

    println!("Single large triangle:");
    bench_large_triangle(320, 240, 1000);
    bench_large_triangle(640, 480, 200);
    bench_large_triangle(1920, 1080, 20);

    println!("\nOverdraw:");
    bench_overdraw(4, 200);
    bench_overdraw(16, 50);

    println!("\nStrip grid:");
    bench_strip_grid(8, 200);
    bench_strip_grid(64, 50);

    println!("\n=== Done ===");
}
