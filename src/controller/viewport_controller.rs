use glam::{Mat3, Mat4, Vec3};

use crate::config::{CameraConfig, ControlConfig};
use crate::controller::InputState;
use crate::model::{Camera, ViewState};

/// Matrices produced for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMatrices {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    /// projection * view * model
    pub mvp: Mat4,
    /// Inverse-transpose of the model's upper 3x3, for normals
    pub normal_matrix: Mat3,
    pub eye: Vec3,
}

/// Model rotation: about Y first, then about Z inside the Y-rotated frame
pub fn model_matrix(angle_y: f32, angle_z: f32) -> Mat4 {
    Mat4::from_rotation_y(angle_y) * Mat4::from_rotation_z(angle_z)
}

pub fn normal_matrix(model: &Mat4) -> Mat3 {
    Mat3::from_mat4(*model).inverse().transpose()
}

/// Turns held keys and elapsed time into rotation/zoom, and rotation/zoom into matrices
pub struct ViewportController {
    pub camera: Camera,
    pub state: ViewState,
    pub rotation_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl ViewportController {
    pub fn new(camera_config: &CameraConfig, controls: &ControlConfig, aspect: f32) -> Self {
        let min_distance = camera_config.min_distance.min(camera_config.max_distance);
        let max_distance = camera_config.max_distance.max(camera_config.min_distance);
        Self {
            camera: Camera::new(camera_config, aspect),
            state: ViewState::new(camera_config.initial_distance.clamp(min_distance, max_distance)),
            rotation_speed: controls.rotation_speed,
            zoom_speed: controls.zoom_speed,
            min_distance,
            max_distance,
        }
    }

    /// Advance by `dt` seconds of held input and return this frame's matrices
    pub fn update(&mut self, dt: f32, input: &InputState) -> FrameMatrices {
        let rotation_step = self.rotation_speed * dt;
        self.state.angle_y += input.horizontal() * rotation_step;
        self.state.angle_z += input.vertical() * rotation_step;

        let distance = self.state.camera_distance + input.zoom() * self.zoom_speed * dt;
        self.state.camera_distance = distance.clamp(self.min_distance, self.max_distance);

        self.matrices()
    }

    /// Matrices for the current state, without advancing it
    pub fn matrices(&self) -> FrameMatrices {
        let model = model_matrix(self.state.angle_y, self.state.angle_z);
        let view = self.camera.view(self.state.camera_distance);
        let projection = self.camera.projection();
        FrameMatrices {
            model,
            view,
            projection,
            mvp: projection * view * model,
            normal_matrix: normal_matrix(&model),
            eye: self.camera.eye(self.state.camera_distance),
        }
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.camera.set_aspect(width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn controller() -> ViewportController {
        ViewportController::new(&CameraConfig::default(), &ControlConfig::default(), 800.0 / 600.0)
    }

    #[test]
    fn test_initial_state() {
        let c = controller();
        assert_eq!(c.state.angle_y, 0.0);
        assert_eq!(c.state.angle_z, 0.0);
        assert_eq!(c.state.camera_distance, 5.196);
        assert_eq!(c.matrices().model, Mat4::IDENTITY);
    }

    #[test]
    fn test_rotation_directions() {
        let mut c = controller();
        c.update(0.5, &InputState { rotate_left: true, rotate_up: true, ..InputState::new() });
        assert!((c.state.angle_y - 1.0).abs() < 1e-6);
        assert!((c.state.angle_z - 1.0).abs() < 1e-6);

        c.update(0.25, &InputState { rotate_right: true, rotate_down: true, ..InputState::new() });
        assert!((c.state.angle_y - 0.5).abs() < 1e-6);
        assert!((c.state.angle_z - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_clamped_to_max() {
        let mut c = controller();
        let out = InputState { zoom_out: true, ..InputState::new() };
        for _ in 0..100 {
            c.update(0.5, &out);
            assert!(c.state.camera_distance <= 40.0);
        }
        c.update(1_000.0, &out);
        assert_eq!(c.state.camera_distance, 40.0);
    }

    #[test]
    fn test_zoom_clamped_to_min() {
        let mut c = controller();
        let zoom_in = InputState { zoom_in: true, ..InputState::new() };
        for _ in 0..100 {
            c.update(0.05, &zoom_in);
            assert!(c.state.camera_distance >= 1.5);
        }
        c.update(f32::MAX, &zoom_in);
        assert_eq!(c.state.camera_distance, 1.5);
    }

    #[test]
    fn test_zoom_moves_eye_along_fixed_ray() {
        let mut c = controller();
        let before = c.matrices().eye.normalize();
        let m = c.update(0.1, &InputState { zoom_out: true, ..InputState::new() });
        assert!((c.state.camera_distance - 6.196).abs() < 1e-4);
        assert!(m.eye.normalize().abs_diff_eq(before, 1e-6));
        assert!((m.eye.length() - 6.196).abs() < 1e-4);
    }

    #[test]
    fn test_rotation_accumulates_over_any_partition() {
        let input = InputState { rotate_left: true, rotate_down: true, ..InputState::new() };

        let mut whole = controller();
        whole.update(1.2, &input);

        let mut split = controller();
        for dt in [0.1, 0.35, 0.05, 0.3, 0.4] {
            split.update(dt, &input);
        }

        assert!((whole.state.angle_y - split.state.angle_y).abs() < 1e-5);
        assert!((whole.state.angle_z - split.state.angle_z).abs() < 1e-5);
    }

    #[test]
    fn test_idle_input_changes_nothing() {
        let mut c = controller();
        let before = c.state;
        c.update(3.0, &InputState::new());
        assert_eq!(c.state, before);
    }

    #[test]
    fn test_model_matrix_applies_y_then_z() {
        let (ay, az) = (0.7f32, -1.3f32);
        let (sy, cy) = ay.sin_cos();
        let (sz, cz) = az.sin_cos();

        // Column-major reference rotations
        let ry = Mat4::from_cols(
            Vec4::new(cy, 0.0, -sy, 0.0),
            Vec4::new(0.0, 1.0, 0.0, 0.0),
            Vec4::new(sy, 0.0, cy, 0.0),
            Vec4::W,
        );
        let rz = Mat4::from_cols(
            Vec4::new(cz, sz, 0.0, 0.0),
            Vec4::new(-sz, cz, 0.0, 0.0),
            Vec4::Z,
            Vec4::W,
        );

        let model = model_matrix(ay, az);
        assert!(model.abs_diff_eq(ry * rz, 1e-6));
        // Order matters
        assert!(!model.abs_diff_eq(rz * ry, 1e-3));

        // A point on +X is first swung about Z, then the result about Y
        let p = model.transform_point3(Vec3::X);
        let expected = Vec3::new(cz * cy, sz, -cz * sy);
        assert!(p.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn test_mvp_and_normal_matrix() {
        let mut c = controller();
        let m = c.update(0.3, &InputState { rotate_left: true, rotate_up: true, ..InputState::new() });
        assert!(m.mvp.abs_diff_eq(m.projection * m.view * m.model, 1e-6));
        // Pure rotation: inverse-transpose equals the rotation itself
        assert!(m.normal_matrix.abs_diff_eq(Mat3::from_mat4(m.model), 1e-5));
    }

    #[test]
    fn test_normal_matrix_under_non_uniform_scale() {
        let model = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let n = normal_matrix(&model);
        // The normal of the plane x + y = 0 stays perpendicular after scaling
        let normal = (n * Vec3::new(1.0, 1.0, 0.0)).normalize();
        let tangent = model.transform_vector3(Vec3::new(1.0, -1.0, 0.0));
        assert!(normal.dot(tangent).abs() < 1e-6);
    }

    #[test]
    fn test_aspect_follows_window() {
        let mut c = controller();
        c.set_aspect(1000, 500);
        let expected = Mat4::perspective_rh(45f32.to_radians(), 2.0, 0.1, 100.0);
        assert!(c.matrices().projection.abs_diff_eq(expected, 1e-6));
    }
}
