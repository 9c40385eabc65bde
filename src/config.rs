use std::env;
use std::path::PathBuf;

use glam::Vec3;

/// Environment variable consulted for the mesh path when no argument is given
pub const MESH_PATH_ENV: &str = "MESHVIEW_MESH";
pub const DEFAULT_MESH_PATH: &str = "assets/cube.obj";

/// Everything the viewer needs to know before the first frame
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub mesh_path: PathBuf,
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub controls: ControlConfig,
    pub lighting: LightingConfig,
}

#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub clear_color: [f64; 4],
}

#[derive(Debug, Clone)]
pub struct CameraConfig {
    pub fov_y: f32,
    pub z_near: f32,
    pub z_far: f32,
    /// Unit ray along which the eye sits, looking back at the origin
    pub direction: Vec3,
    pub up: Vec3,
    pub initial_distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

#[derive(Debug, Clone)]
pub struct ControlConfig {
    /// Radians per second
    pub rotation_speed: f32,
    /// World units per second
    pub zoom_speed: f32,
}

#[derive(Debug, Clone)]
pub struct LightingConfig {
    pub light_dir: Vec3,
    pub light_color: Vec3,
    pub object_color: Vec3,
    pub ambient_strength: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "meshview".to_string(),
            width: 800,
            height: 600,
            clear_color: [0.2, 0.2, 0.2, 1.0],
        }
    }
}

impl WindowConfig {
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y: 45f32.to_radians(),
            z_near: 0.1,
            z_far: 100.0,
            direction: Vec3::ONE.normalize(),
            up: Vec3::Y,
            // |(3, 3, 3)|
            initial_distance: 5.196,
            min_distance: 1.5,
            max_distance: 40.0,
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            rotation_speed: 2.0,
            zoom_speed: 10.0,
        }
    }
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            light_dir: Vec3::new(-0.2, -1.0, -0.3),
            light_color: Vec3::ONE,
            object_color: Vec3::new(1.0, 0.0, 0.0),
            ambient_strength: 0.1,
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            mesh_path: PathBuf::from(DEFAULT_MESH_PATH),
            window: WindowConfig::default(),
            camera: CameraConfig::default(),
            controls: ControlConfig::default(),
            lighting: LightingConfig::default(),
        }
    }
}

impl ViewerConfig {
    /// Build the config from process arguments (program name excluded).
    /// The first positional argument wins over `MESHVIEW_MESH`.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let env_path = env::var(MESH_PATH_ENV).ok().filter(|p| !p.is_empty());
        Self::resolve(args.into_iter().next(), env_path)
    }

    fn resolve(arg: Option<String>, env_path: Option<String>) -> Self {
        let mesh_path = arg
            .or(env_path)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MESH_PATH));
        Self {
            mesh_path,
            ..Self::default()
        }
    }
}
