//! Software rasterizer.
//!
//! # Invariants
//! - A pixel is covered iff all three edge functions at its center are
//!   non-negative after orienting the triangle by the sign of its area.
//! - Depth test is strict: `0 < z < stored`. Equal depth never overwrites.
//! - Degenerate, non-finite, culled, fully-behind and fully-offscreen
//!   triangles write nothing; they are reported, never raised.
//! - Pixel storage is touched with at most two bulk copies per inside run of
//!   a scanline.
//!
//! Depth and attributes are interpolated linearly in screen space; there is
//! no perspective correction.

mod assembly;
mod framebuffer;
mod triangle;

pub use assembly::{draw_indexed, draw_list, draw_strip};
pub use framebuffer::FrameBuffer;
pub use triangle::{FillOutcome, Fragment, RasterStats, Rasterizer, ScreenVertex, edge_function};

pub fn crate_info() -> &'static str {
    "softraster-raster v0.1.0"
}
