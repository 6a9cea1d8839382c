use glam::{Mat4, Vec3};

use crate::key::assert_finite_camera;

/// Tracks the camera's view matrix and derives its world space location.
#[derive(Debug, Clone)]
pub struct CameraManager {
    inv_view: Mat4,
}
impl CameraManager {
    /// Builds a camera from a world -> view matrix.
    ///
    /// # Panics
    ///
    /// Panics if the matrix does not yield a finite camera location.
    pub fn new(view: Mat4) -> Self {
        let inv_view = view.inverse();
        assert_finite_camera(inv_view.w_axis.truncate());

        Self { inv_view }
    }

    /// Builds a camera sitting at `location` looking down its -Z axis.
    pub fn from_location(location: Vec3) -> Self {
        Self::new(Mat4::from_translation(-location))
    }

    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        Self::new(Mat4::look_at_rh(eye, target, up))
    }

    pub fn location(&self) -> Vec3 {
        self.inv_view.w_axis.truncate()
    }
}

impl Default for CameraManager {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY)
    }
}
