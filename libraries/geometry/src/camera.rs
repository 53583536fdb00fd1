use glam::{Mat4, Vec3};

/// A look-at camera in a Z-up world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,
}

impl Camera {
    #[must_use]
    pub fn new(eye: Vec3, center: Vec3) -> Self {
        Self {
            eye,
            look_at: center,
            up: Vec3::Z,
        }
    }

    /// Distance between the eye and the point looked at.
    #[must_use]
    pub fn distance(&self) -> f32 {
        self.eye.distance(self.look_at)
    }

    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.look_at, self.up)
    }
}
