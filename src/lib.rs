pub mod config;
pub mod error;
pub mod logging;
pub mod ui;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

pub use config::ViewerConfig;
pub use error::{LoadError, ParseErrorKind, ShaderError, ViewerError};
pub use model::{load_obj, parse_obj, Mesh, ViewState};
pub use controller::{FrameMatrices, InputState, ViewportController};
