mod controls;
mod markers;
mod projection;
mod scene;

pub use controls::{
    Camera, Controls, GlobeOrientation, OrbitHelper, MAX_CAMERA_DISTANCE, MAX_PITCH,
    MIN_CAMERA_DISTANCE, ROTATE_SPEED, ZOOM_STEP,
};
pub use markers::{CycleReport, Label, Marker, MarkerRegistry, DEFAULT_COLOR, ISS_COLOR};
pub use projection::{
    marker_radius, project, ALTITUDE_SCALE, GLOBE_RADIUS, MIN_ALTITUDE_OFFSET,
};
pub use scene::{hidden_by_globe, DrawItem, Scene};
