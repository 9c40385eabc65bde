// VIEW: GPU setup, shading program and rendering
pub mod render;
pub mod gpu_init;
pub mod shader;

pub use render::{GpuMesh, OverlayFrame, PipelineResources, RenderState, SceneResources};
pub use gpu_init::GpuContext;
pub use shader::{ShaderProgramSpec, MESH_PROGRAM};
