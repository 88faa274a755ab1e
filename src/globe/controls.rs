//! Manual globe rotation, wheel zoom and the auxiliary orbit helper.
//!
//! Pointer drags rotate the globe itself, never the camera. The wheel owns the
//! camera distance. The orbit helper only keeps the camera aimed at its target
//! and smooths any motion it is allowed to make; its own rotate and pan stay
//! off so it never competes with the two manual paths.

use std::f64::consts::{FRAC_PI_2, PI};

use nalgebra::{Rotation3, Vector3};

use super::projection::GLOBE_RADIUS;

pub const ROTATE_SPEED: f64 = 0.005;
pub const MAX_PITCH: f64 = FRAC_PI_2 - 0.01;
pub const ZOOM_STEP: f64 = 0.12;
pub const MIN_CAMERA_DISTANCE: f64 = GLOBE_RADIUS * 1.05;
pub const MAX_CAMERA_DISTANCE: f64 = GLOBE_RADIUS * 6.0;

const PRIMARY_BUTTON: u16 = 0;
const POLAR_EPSILON: f64 = 1e-6;

/// Globe rotation as yaw about `y` followed by pitch about `x`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GlobeOrientation {
    pub yaw: f64,
    pub pitch: f64,
}

impl GlobeOrientation {
    pub fn rotation(&self) -> Rotation3<f64> {
        Rotation3::from_axis_angle(&Vector3::x_axis(), self.pitch)
            * Rotation3::from_axis_angle(&Vector3::y_axis(), self.yaw)
    }

    /// Applies a drag delta in pixels. The globe turns the same way the
    /// pointer moves.
    pub fn drag(&mut self, dx: f64, dy: f64) {
        self.yaw += dx * ROTATE_SPEED;
        self.pitch = (self.pitch + dy * ROTATE_SPEED).clamp(-MAX_PITCH, MAX_PITCH);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vector3<f64>,
    pub target: Vector3<f64>,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vector3::new(GLOBE_RADIUS * 2.6, GLOBE_RADIUS * 0.8, GLOBE_RADIUS * 2.6),
            target: Vector3::zeros(),
        }
    }
}

impl Camera {
    pub fn distance(&self) -> f64 {
        self.position.norm()
    }

    /// Moves the camera along its ray from the origin. One wheel tick scales
    /// the distance by `1 ± ZOOM_STEP`; a zero delta does nothing.
    pub fn zoom(&mut self, delta_y: f64) {
        if delta_y == 0.0 || delta_y.is_nan() {
            return;
        }
        let distance = self.distance();
        if distance == 0.0 {
            return;
        }
        let factor = 1.0 + delta_y.signum() * ZOOM_STEP;
        let next = (distance * factor).clamp(MIN_CAMERA_DISTANCE, MAX_CAMERA_DISTANCE);
        self.position = self.position / distance * next;
    }
}

/// Damped orbit helper around a target point.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitHelper {
    pub enabled: bool,
    pub enable_rotate: bool,
    pub enable_pan: bool,
    pub enable_damping: bool,
    pub damping_factor: f64,
    pub target: Vector3<f64>,
    spin: (f64, f64),
    pan_offset: Vector3<f64>,
}

impl Default for OrbitHelper {
    fn default() -> Self {
        Self {
            enabled: true,
            enable_rotate: false,
            enable_pan: false,
            enable_damping: true,
            damping_factor: 0.1,
            target: Vector3::zeros(),
            spin: (0.0, 0.0),
            pan_offset: Vector3::zeros(),
        }
    }
}

impl OrbitHelper {
    pub fn rotate(&mut self, azimuth: f64, polar: f64) {
        if self.enabled && self.enable_rotate {
            self.spin.0 += azimuth;
            self.spin.1 += polar;
        }
    }

    pub fn pan(&mut self, offset: Vector3<f64>) {
        if self.enabled && self.enable_pan {
            self.pan_offset += offset;
        }
    }

    /// Advances one frame: applies pending motion around the target, keeps
    /// the camera distance and aims the camera at the target.
    pub fn update(&mut self, camera: &mut Camera) {
        if !self.enabled {
            return;
        }

        self.target += self.pan_offset;
        camera.position += self.pan_offset;
        self.pan_offset = Vector3::zeros();

        let offset = camera.position - self.target;
        let radius = offset.norm();
        if radius > 0.0 && (self.spin.0 != 0.0 || self.spin.1 != 0.0) {
            let step = if self.enable_damping {
                self.damping_factor
            } else {
                1.0
            };
            let theta = offset.x.atan2(offset.z) + self.spin.0 * step;
            let phi = ((offset.y / radius).clamp(-1.0, 1.0).acos() + self.spin.1 * step)
                .clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
            camera.position = self.target
                + Vector3::new(
                    radius * phi.sin() * theta.sin(),
                    radius * phi.cos(),
                    radius * phi.sin() * theta.cos(),
                );
        }

        if self.enable_damping {
            self.spin.0 *= 1.0 - self.damping_factor;
            self.spin.1 *= 1.0 - self.damping_factor;
        } else {
            self.spin = (0.0, 0.0);
        }

        camera.target = self.target;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragState {
    last_x: f64,
    last_y: f64,
}

/// Pointer and wheel handling for one globe view.
#[derive(Debug, Clone, Default)]
pub struct Controls {
    pub orientation: GlobeOrientation,
    pub camera: Camera,
    pub orbit: OrbitHelper,
    drag: Option<DragState>,
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Starts a drag. Only the primary button rotates the globe.
    pub fn pointer_down(&mut self, button: u16, x: f64, y: f64) {
        if button != PRIMARY_BUTTON {
            return;
        }
        self.drag = Some(DragState {
            last_x: x,
            last_y: y,
        });
        self.orbit.enabled = false;
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        let (dx, dy) = (x - drag.last_x, y - drag.last_y);
        drag.last_x = x;
        drag.last_y = y;
        self.orientation.drag(dx, dy);
    }

    pub fn pointer_up(&mut self) {
        self.drag = None;
        self.orbit.enabled = true;
    }

    pub fn pointer_cancel(&mut self) {
        self.pointer_up();
    }

    pub fn wheel(&mut self, delta_y: f64) {
        self.camera.zoom(delta_y);
        self.orbit.update(&mut self.camera);
    }

    /// Per-frame tick.
    pub fn update(&mut self) {
        self.orbit.update(&mut self.camera);
    }
}
