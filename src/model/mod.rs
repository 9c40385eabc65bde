// MODEL: loaded geometry and view state
pub mod camera;
pub mod mesh;
pub mod obj_loader;
pub mod view_state;

pub use camera::Camera;
pub use mesh::Mesh;
pub use obj_loader::{load_obj, parse_obj};
pub use view_state::ViewState;
