// CONTROLLER: input mapping and the per-frame update
pub mod input;
pub mod viewport_controller;
pub mod frame_loop;

pub use input::{InputState, InputProcessor, KeyBindings};
pub use viewport_controller::{FrameMatrices, ViewportController};
pub use frame_loop::{FpsCounter, LightingUniform, TransformUniform};
