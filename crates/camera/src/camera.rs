use std::cell::Cell;

use glam::{Mat4, Quat, Vec3, Vec4, Vec4Swizzles};

/// Perspective camera with lazily computed, cached matrices.
///
/// Matrices follow glam's column-vector convention, so the combined matrix is
/// `projection * view` and a world point `p` lands in clip space as
/// `combined * p.extend(1.0)`. Depth maps to `[0, 1]` between the near and
/// far planes.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    direction: Vec3,
    up: Vec3,
    fov: f32,
    width: u32,
    height: u32,
    near: f32,
    far: f32,
    view: Cell<Option<Mat4>>,
    projection: Cell<Option<Mat4>>,
    combined: Cell<Option<Mat4>>,
    inverse: Cell<Option<Option<Mat4>>>,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::NEG_Z,
            Vec3::Y,
            60.0_f32.to_radians(),
            640,
            480,
            0.1,
            1000.0,
        )
    }
}

impl Camera {
    /// Build a camera. `direction` and `up` are normalized.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        position: Vec3,
        direction: Vec3,
        up: Vec3,
        fov: f32,
        width: u32,
        height: u32,
        near: f32,
        far: f32,
    ) -> Self {
        Self {
            position,
            direction: direction.normalize(),
            up: up.normalize(),
            fov,
            width,
            height,
            near,
            far,
            view: Cell::new(None),
            projection: Cell::new(None),
            combined: Cell::new(None),
            inverse: Cell::new(None),
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Vertical field of view in radians.
    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn set_position(&mut self, position: Vec3) {
        if self.position != position {
            self.position = position;
            self.invalidate();
        }
    }

    pub fn set_direction(&mut self, direction: Vec3) {
        let direction = direction.normalize();
        if self.direction != direction {
            self.direction = direction;
            self.invalidate();
        }
    }

    pub fn set_up(&mut self, up: Vec3) {
        let up = up.normalize();
        if self.up != up {
            self.up = up;
            self.invalidate();
        }
    }

    pub fn set_fov(&mut self, fov: f32) {
        if self.fov != fov {
            self.fov = fov;
            self.invalidate();
        }
    }

    pub fn set_width(&mut self, width: u32) {
        if self.width != width {
            self.width = width;
            self.invalidate();
        }
    }

    pub fn set_height(&mut self, height: u32) {
        if self.height != height {
            self.height = height;
            self.invalidate();
        }
    }

    /// Change the viewport size. Framebuffers sized for the old viewport must
    /// be reallocated by the caller.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.set_width(width);
        self.set_height(height);
    }

    pub fn set_near(&mut self, near: f32) {
        if self.near != near {
            self.near = near;
            self.invalidate();
        }
    }

    pub fn set_far(&mut self, far: f32) {
        if self.far != far {
            self.far = far;
            self.invalidate();
        }
    }

    /// Unit vector to the viewer's right.
    pub fn right(&self) -> Vec3 {
        self.direction.cross(self.up).normalize()
    }

    /// Point the camera at `target`.
    pub fn look_at(&mut self, target: Vec3) {
        self.set_direction(target - self.position);
    }

    /// Move along the camera's own axes: `x` right, `y` up, `z` forward.
    pub fn translate_local(&mut self, offset: Vec3) {
        let moved = self.position
            + self.right() * offset.x
            + self.up * offset.y
            + self.direction * offset.z;
        self.set_position(moved);
    }

    /// Rotate the view direction by `yaw` about the up vector, then by
    /// `pitch` about the right vector (radians). The up vector is kept.
    pub fn turn(&mut self, yaw: f32, pitch: f32) {
        let right = self.right();
        let rotation = Quat::from_axis_angle(right, pitch) * Quat::from_axis_angle(self.up, yaw);
        self.set_direction(rotation * self.direction);
    }

    fn invalidate(&mut self) {
        self.view.set(None);
        self.projection.set(None);
        self.combined.set(None);
        self.inverse.set(None);
        tracing::trace!("camera matrices invalidated");
    }

    /// World-to-camera matrix.
    pub fn view_matrix(&self) -> Mat4 {
        let compute = || Mat4::look_to_rh(self.position, self.direction, self.up);
        cached(&self.view, compute)
    }

    /// Camera-to-clip matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        let compute = || Mat4::perspective_rh(self.fov, self.aspect(), self.near, self.far);
        cached(&self.projection, compute)
    }

    /// World-to-clip matrix.
    pub fn matrix(&self) -> Mat4 {
        let compute = || self.projection_matrix() * self.view_matrix();
        cached(&self.combined, compute)
    }

    /// Clip-to-world matrix, or `None` when the combined matrix is singular.
    pub fn inverse(&self) -> Option<Mat4> {
        if let Some(inverse) = self.inverse.get() {
            return inverse;
        }
        let matrix = self.matrix();
        let det = matrix.determinant();
        let inverse = (det != 0.0 && det.is_finite()).then(|| matrix.inverse());
        if inverse.is_none() {
            tracing::debug!(det, "camera matrix is not invertible");
        }
        self.inverse.set(Some(inverse));
        inverse
    }

    pub fn world_to_clip(&self, world: Vec3) -> Vec4 {
        self.matrix() * world.extend(1.0)
    }

    /// Undo [`world_to_clip`](Self::world_to_clip). `None` if the matrix
    /// cannot be inverted.
    pub fn clip_to_world(&self, clip: Vec4) -> Option<Vec3> {
        let world = self.inverse()? * clip;
        Some(world.xyz() / world.w)
    }

    /// Perspective divide. Depth is divided by `|w|` so its sign survives
    /// points behind the eye; `w` is carried through unchanged.
    pub fn clip_to_ndc(clip: Vec4) -> Vec4 {
        Vec4::new(
            clip.x / clip.w,
            clip.y / clip.w,
            clip.z / clip.w.abs(),
            clip.w,
        )
    }

    /// Exact inverse of [`clip_to_ndc`](Self::clip_to_ndc).
    pub fn ndc_to_clip(ndc: Vec4) -> Vec4 {
        Vec4::new(ndc.x * ndc.w, ndc.y * ndc.w, ndc.z * ndc.w.abs(), ndc.w)
    }

    /// NDC to pixels, origin top-left, y down.
    pub fn ndc_to_screen(&self, ndc: Vec4) -> Vec4 {
        Vec4::new(
            (ndc.x + 1.0) * 0.5 * self.width as f32,
            (1.0 - ndc.y) * 0.5 * self.height as f32,
            ndc.z,
            ndc.w,
        )
    }

    pub fn screen_to_ndc(&self, screen: Vec4) -> Vec4 {
        Vec4::new(
            screen.x / self.width as f32 * 2.0 - 1.0,
            1.0 - screen.y / self.height as f32 * 2.0,
            screen.z,
            screen.w,
        )
    }

    pub fn world_to_screen(&self, world: Vec3) -> Vec4 {
        self.ndc_to_screen(Self::clip_to_ndc(self.world_to_clip(world)))
    }

    pub fn screen_to_world(&self, screen: Vec4) -> Option<Vec3> {
        self.clip_to_world(Self::ndc_to_clip(self.screen_to_ndc(screen)))
    }
}

fn cached(slot: &Cell<Option<Mat4>>, compute: impl FnOnce() -> Mat4) -> Mat4 {
    if let Some(m) = slot.get() {
        return m;
    }
    let m = compute();
    slot.set(Some(m));
    m
}
