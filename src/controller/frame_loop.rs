use glam::Mat4;

use crate::config::LightingConfig;
use crate::controller::FrameMatrices;

/// Per-draw transforms, laid out like `Transforms` in mesh.wgsl
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniform {
    pub mvp: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    /// mat3 widened to mat4 to satisfy uniform alignment
    pub normal_matrix: [[f32; 4]; 4],
}

impl TransformUniform {
    pub fn from_matrices(m: &FrameMatrices) -> Self {
        Self {
            mvp: m.mvp.to_cols_array_2d(),
            model: m.model.to_cols_array_2d(),
            normal_matrix: Mat4::from_mat3(m.normal_matrix).to_cols_array_2d(),
        }
    }
}

/// Directional light and surface color, laid out like `Lighting` in mesh.wgsl
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingUniform {
    pub light_dir: [f32; 3],
    pub ambient_strength: f32,
    pub light_color: [f32; 3],
    pub _pad0: f32,
    pub object_color: [f32; 3],
    pub _pad1: f32,
}

impl LightingUniform {
    pub fn from_config(config: &LightingConfig) -> Self {
        Self {
            light_dir: config.light_dir.to_array(),
            ambient_strength: config.ambient_strength,
            light_color: config.light_color.to_array(),
            _pad0: 0.0,
            object_color: config.object_color.to_array(),
            _pad1: 0.0,
        }
    }
}

/// Frames-per-second averaged over roughly one second
#[derive(Debug, Default)]
pub struct FpsCounter {
    fps: f32,
    frame_count: u32,
    timer: f32,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self, dt: f32) {
        self.frame_count += 1;
        self.timer += dt;
        if self.timer >= 1.0 {
            self.fps = self.frame_count as f32 / self.timer;
            self.frame_count = 0;
            self.timer = 0.0;
        }
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}
