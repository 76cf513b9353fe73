use std::ops::{Add, Mul};

use glam::{Vec2, Vec3, Vec4};
use softraster_common::CullMode;

use crate::framebuffer::FrameBuffer;

/// A vertex already transformed to screen space: `x`, `y` in pixels, `z`
/// the depth to test, `w` the clip-space w. `attributes` is carried to the
/// shader untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenVertex<A> {
    pub position: Vec4,
    pub attributes: A,
}

impl<A> ScreenVertex<A> {
    pub fn new(position: Vec4, attributes: A) -> Self {
        Self {
            position,
            attributes,
        }
    }
}

/// What the shader sees for one covered pixel that passed the depth test.
#[derive(Debug)]
pub struct Fragment<'a, A> {
    pub x: u32,
    pub y: u32,
    /// Barycentric weights of the pixel center with respect to `v0, v1, v2`.
    pub weights: Vec3,
    /// `[z0, z1, z2, z_interpolated]`.
    pub depths: [f32; 4],
    pub attributes: [&'a A; 3],
}

impl<A> Fragment<'_, A> {
    /// Interpolated depth written to the depth buffer.
    pub fn depth(&self) -> f32 {
        self.depths[3]
    }

    /// Blend a per-vertex quantity with the barycentric weights.
    pub fn interpolate<T, F>(&self, attribute: F) -> T
    where
        T: Mul<f32, Output = T> + Add<Output = T>,
        F: Fn(&A) -> T,
    {
        attribute(self.attributes[0]) * self.weights.x
            + attribute(self.attributes[1]) * self.weights.y
            + attribute(self.attributes[2]) * self.weights.z
    }
}

/// Result of one fill call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillOutcome {
    /// The triangle was scanned; `pixels` passed the depth test.
    Drawn { pixels: usize },
    /// A coordinate was NaN or infinite.
    NonFinite,
    /// Zero signed area.
    Degenerate,
    /// Removed by the cull policy.
    Culled,
    /// Every vertex has `z < 0`.
    BehindCamera,
    /// The bounding box does not intersect the framebuffer.
    Offscreen,
}

/// Counters accumulated across fill calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RasterStats {
    pub triangles_submitted: u64,
    pub triangles_drawn: u64,
    pub triangles_culled: u64,
    pub triangles_rejected: u64,
    pub pixels_written: u64,
    pub spans_flushed: u64,
}

/// 2D edge function `E(a, b, c) = (c.x - a.x)(b.y - a.y) - (c.y - a.y)(b.x - a.x)`.
///
/// `E(v0, v1, v2)` is the signed area (doubled) of the triangle, and the
/// three edge values of a point sum to it.
#[inline]
pub fn edge_function(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (c.x - a.x) * (b.y - a.y) - (c.y - a.y) * (b.x - a.x)
}

#[inline]
fn cross2(u: Vec2, v: Vec2) -> f32 {
    u.x * v.y - u.y * v.x
}

/// Barycentric weights of `p` from the triangle's edge vectors
/// `u = v1 - v0`, `v = v2 - v0`, `w = p - v0`.
#[inline]
fn barycentric(v0: Vec2, v1: Vec2, v2: Vec2, p: Vec2) -> Vec3 {
    let u = v1 - v0;
    let v = v2 - v0;
    let w = p - v0;
    let denom = cross2(u, v);
    let b1 = cross2(w, v) / denom;
    let b2 = cross2(u, w) / denom;
    Vec3::new(1.0 - b1 - b2, b1, b2)
}

/// Triangle filler with a reusable scanline scratch buffer.
#[derive(Debug, Default)]
pub struct Rasterizer {
    scratch: Vec<u32>,
    stats: RasterStats,
}

impl Rasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> RasterStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = RasterStats::default();
    }

    /// Fill one triangle into `target`.
    ///
    /// `shade` is called once per pixel that is inside the triangle and
    /// closer than what the depth buffer holds; its return value is stored as
    /// the pixel color.
    pub fn fill_triangle<A, F>(
        &mut self,
        target: &mut FrameBuffer,
        vertices: &[ScreenVertex<A>; 3],
        cull: CullMode,
        mut shade: F,
    ) -> FillOutcome
    where
        F: FnMut(&Fragment<'_, A>) -> u32,
    {
        self.stats.triangles_submitted += 1;
        let outcome = self.fill_inner(target, vertices, cull, &mut shade);
        match outcome {
            FillOutcome::Drawn { pixels } => {
                self.stats.triangles_drawn += 1;
                self.stats.pixels_written += pixels as u64;
            }
            FillOutcome::Culled => self.stats.triangles_culled += 1,
            _ => self.stats.triangles_rejected += 1,
        }
        tracing::trace!(?outcome, "fill_triangle");
        outcome
    }

    fn fill_inner<A, F>(
        &mut self,
        target: &mut FrameBuffer,
        vertices: &[ScreenVertex<A>; 3],
        cull: CullMode,
        shade: &mut F,
    ) -> FillOutcome
    where
        F: FnMut(&Fragment<'_, A>) -> u32,
    {
        let [p0, p1, p2] = [0, 1, 2].map(|i| vertices[i].position);
        if [p0, p1, p2].iter().any(|p| !p.truncate().is_finite()) {
            return FillOutcome::NonFinite;
        }
        let xy = |p: Vec4| Vec2::new(p.x, p.y);
        let (v0, v1, v2) = (xy(p0), xy(p1), xy(p2));
        let (z0, z1, z2) = (p0.z, p1.z, p2.z);

        let area = edge_function(v0, v1, v2);
        if area == 0.0 {
            return FillOutcome::Degenerate;
        }
        if !cull.keeps(area) {
            return FillOutcome::Culled;
        }
        if z0.max(z1).max(z2) < 0.0 {
            return FillOutcome::BehindCamera;
        }

        let (width, height) = (target.width() as i64, target.height() as i64);
        let min_x = (v0.x.min(v1.x).min(v2.x).floor() as i64).max(0);
        let min_y = (v0.y.min(v1.y).min(v2.y).floor() as i64).max(0);
        let max_x = (v0.x.max(v1.x).max(v2.x).ceil() as i64).min(width - 1);
        let max_y = (v0.y.max(v1.y).max(v2.y).ceil() as i64).min(height - 1);
        if min_x > max_x || min_y > max_y {
            return FillOutcome::Offscreen;
        }
        let (min_x, max_x) = (min_x as usize, max_x as usize);
        let (min_y, max_y) = (min_y as usize, max_y as usize);

        // Orient so that inside points have non-negative edge values.
        let sign = area.signum();
        let abs_area = area.abs();
        let attributes = [
            &vertices[0].attributes,
            &vertices[1].attributes,
            &vertices[2].attributes,
        ];

        let span = max_x - min_x + 1;
        if self.scratch.len() < span {
            self.scratch.resize(span, 0);
        }
        let row_stride = width as usize;
        let (pixels, depth) = target.planes_mut();
        let mut written = 0usize;

        for y in min_y..=max_y {
            let py = y as f32 + 0.5;
            let row = y * row_stride;
            // Start of the current inside run and how much of the scratch
            // buffer has been written since.
            let mut run: Option<usize> = None;
            let mut touched = 0usize;

            for x in min_x..=max_x {
                let p = Vec2::new(x as f32 + 0.5, py);
                let e0 = edge_function(v1, v2, p) * sign;
                let e1 = edge_function(v2, v0, p) * sign;
                let e2 = edge_function(v0, v1, p) * sign;

                if e0 < 0.0 || e1 < 0.0 || e2 < 0.0 {
                    if let Some(start) = run.take() {
                        self.flush(pixels, row + start, touched);
                        touched = 0;
                    }
                    continue;
                }

                let start = match run {
                    Some(start) => start,
                    None => {
                        let len = max_x + 1 - x;
                        self.scratch[..len].copy_from_slice(&pixels[row + x..row + max_x + 1]);
                        run = Some(x);
                        x
                    }
                };

                let z = (e0 * z0 + e1 * z1 + e2 * z2) / abs_area;
                let index = row + x;
                if z > 0.0 && z < depth[index] {
                    let fragment = Fragment {
                        x: x as u32,
                        y: y as u32,
                        weights: barycentric(v0, v1, v2, p),
                        depths: [z0, z1, z2, z],
                        attributes,
                    };
                    self.scratch[x - start] = shade(&fragment);
                    depth[index] = z;
                    touched = x - start + 1;
                    written += 1;
                }
            }

            if let Some(start) = run {
                self.flush(pixels, row + start, touched);
            }
        }

        FillOutcome::Drawn { pixels: written }
    }

    /// Copy the first `touched` scratch pixels back to `pixels[offset..]`.
    fn flush(&mut self, pixels: &mut [u32], offset: usize, touched: usize) {
        if touched == 0 {
            return;
        }
        pixels[offset..offset + touched].copy_from_slice(&self.scratch[..touched]);
        self.stats.spans_flushed += 1;
    }
}
