/// Orientation and zoom carried from one frame to the next
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    /// Radians about +Y, unbounded
    pub angle_y: f32,
    /// Radians about +Z (in the frame already rotated about Y), unbounded
    pub angle_z: f32,
    pub camera_distance: f32,
    /// Clock sample of the previous frame, seconds since the loop started
    pub last_frame_time: f64,
}

impl ViewState {
    pub fn new(initial_distance: f32) -> Self {
        Self {
            angle_y: 0.0,
            angle_z: 0.0,
            camera_distance: initial_distance,
            last_frame_time: 0.0,
        }
    }

    /// Seconds elapsed since the previous sample; records `now` as the new sample.
    /// A clock that appears to run backwards yields zero.
    pub fn advance_clock(&mut self, now: f64) -> f32 {
        let dt = (now - self.last_frame_time).max(0.0);
        self.last_frame_time = now;
        dt as f32
    }
}
