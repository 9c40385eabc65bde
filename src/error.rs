//! Error types for loading geometry, building shading programs and running the viewer

use std::path::PathBuf;
use thiserror::Error;

/// Why a single line of a geometry file was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("expected 3 components after '{tag}', found {found}")]
    MissingComponents { tag: &'static str, found: usize },

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("face has {0} corners, at least 3 are required")]
    TooFewCorners(usize),

    #[error("face corner '{0}' has no normal index (expected position/[texture]/normal)")]
    MissingNormal(String),

    #[error("invalid index '{0}' (indices are 1-based positive integers)")]
    InvalidIndex(String),

    #[error("position index {index} is out of range ({count} positions declared)")]
    PositionOutOfRange { index: usize, count: usize },

    #[error("normal index {index} is out of range ({count} normals declared)")]
    NormalOutOfRange { index: usize, count: usize },

    #[error("mesh references more vertices than a 32-bit index buffer can address")]
    IndexOverflow,
}

/// Errors produced by the geometry loader
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("geometry file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {kind}")]
    Parse { line: usize, kind: ParseErrorKind },
}

impl LoadError {
    pub fn parse(line: usize, kind: ParseErrorKind) -> Self {
        LoadError::Parse { line, kind }
    }
}

/// Errors from building a shading program
#[derive(Debug, Error)]
pub enum ShaderError {
    /// Source failed to parse
    #[error("shader '{label}' failed to compile:\n{message}")]
    Compile { label: String, message: String },

    /// Source parsed, but the program is invalid or does not match its description
    #[error("shader '{label}' failed to link: {message}")]
    Link { label: String, message: String },
}

/// Top-level viewer failure
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

pub type Result<T> = std::result::Result<T, ViewerError>;
