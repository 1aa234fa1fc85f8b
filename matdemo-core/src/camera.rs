//! A simple fly camera.
//!
//! The view and projection matrices are pure functions of the camera fields, recomputed on every
//! [`Camera::update`] and uploaded to the `view_mat` and `projection_mat` uniforms.

use glam::{Mat4, Vec3};

use crate::{gpu::Gpu, shader::ShaderProgram};

/// Perspective projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Projection {
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            aspect: 4.0 / 3.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub up: Vec3,
    pub forward: Vec3,
    pub projection: Projection,
    view_matrix: Mat4,
    projection_matrix: Mat4,
}

impl Camera {
    /// Creates a camera at `(0, 0, 5)` looking down `-Z`.
    pub fn new(projection: Projection) -> Self {
        let mut camera = Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            up: Vec3::Y,
            forward: Vec3::NEG_Z,
            projection,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
        };
        camera.recompute();
        camera
    }

    /// Recomputes the derived matrices from the current fields.
    pub fn recompute(&mut self) {
        self.view_matrix =
            Mat4::look_at_rh(self.position, self.position + self.forward, self.up);
        self.projection_matrix = self.projection.matrix();
    }

    /// Recomputes the matrices and uploads them to `program`, which must be current.
    /// Programs without the matrix uniforms are left untouched.
    pub fn update<G: Gpu>(&mut self, program: &ShaderProgram<G>) {
        self.recompute();
        program.set_uniform("projection_mat", self.projection_matrix);
        program.set_uniform("view_mat", self.view_matrix);
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.projection.aspect = aspect;
    }

    /// Turns the camera by the given yaw and pitch deltas in degrees. Pitch is clamped to
    /// ±89° so the view never flips over the up axis.
    pub fn look(&mut self, yaw_delta: f32, pitch_delta: f32) {
        let forward = self.forward.normalize_or(Vec3::NEG_Z);
        let yaw = forward.z.atan2(forward.x).to_degrees() + yaw_delta;
        let pitch = (forward.y.clamp(-1.0, 1.0).asin().to_degrees() + pitch_delta).clamp(-89.0, 89.0);

        let (yaw, pitch) = (yaw.to_radians(), pitch.to_radians());
        self.forward = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
    }

    /// Moves the camera in its local frame: `x` right, `y` up, `z` forward.
    pub fn fly(&mut self, movement: Vec3) {
        let forward = self.forward.normalize_or_zero();
        let right = forward.cross(self.up).normalize_or_zero();
        let up = self.up.normalize_or_zero();
        self.position += right * movement.x + up * movement.y + forward * movement.z;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Projection::default())
    }
}
