use softraster_common::argb_to_rgba;

/// ARGB32 color storage plus a same-sized depth buffer.
///
/// Both buffers are row-major with the origin at the top-left. Depth is
/// cleared to `+inf` so the first surface at any depth in `(0, inf)` wins.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
    depth: Vec<f32>,
}

impl FrameBuffer {
    /// Allocate a cleared buffer (black, depth `+inf`).
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            pixels: vec![0; len],
            depth: vec![f32::INFINITY; len],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn depth(&self) -> &[f32] {
        &self.depth
    }

    /// Reset every pixel to `color` and every depth to `+inf`. Call once per
    /// frame before drawing.
    pub fn clear(&mut self, color: u32) {
        self.pixels.fill(color);
        self.depth.fill(f32::INFINITY);
    }

    /// Reallocate for a new viewport size. Contents are cleared.
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        *self = Self::new(width, height);
        tracing::debug!(width, height, "framebuffer resized");
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    pub fn depth_at(&self, x: u32, y: u32) -> Option<f32> {
        self.index(x, y).map(|i| self.depth[i])
    }

    /// Number of pixels whose depth was written since the last clear.
    pub fn covered(&self) -> usize {
        self.depth.iter().filter(|d| d.is_finite()).count()
    }

    /// Pixels as `[r, g, b, a]` bytes for image encoders and presenters.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|&p| argb_to_rgba(p)).collect()
    }

    /// Split-borrow color and depth storage for the rasterizer.
    pub(crate) fn planes_mut(&mut self) -> (&mut [u32], &mut [f32]) {
        (&mut self.pixels, &mut self.depth)
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        let inside = x < self.width && y < self.height;
        let row = y as usize * self.width as usize;
        inside.then(|| row + x as usize)
    }
}
