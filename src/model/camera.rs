use glam::{Mat4, Vec3};

use crate::config::CameraConfig;

/// Camera fixed on a ray through the origin; only its distance along the ray changes
#[derive(Debug, Clone)]
pub struct Camera {
    pub direction: Vec3,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Camera {
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        Self {
            direction: config.direction.normalize(),
            up: config.up,
            fov_y: config.fov_y,
            aspect,
            z_near: config.z_near,
            z_far: config.z_far,
        }
    }

    pub fn eye(&self, distance: f32) -> Vec3 {
        self.direction * distance
    }

    /// Ignores zero-sized (minimized) windows
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view(&self, distance: f32) -> Mat4 {
        Mat4::look_at_rh(self.eye(distance), Vec3::ZERO, self.up)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far)
    }
}
