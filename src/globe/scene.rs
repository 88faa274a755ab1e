use nalgebra::Vector3;

use super::controls::Controls;
use super::markers::{CycleReport, MarkerRegistry};
use super::projection::GLOBE_RADIUS;
use crate::positions::PositionSample;

/// A marker ready to draw, already moved into world space.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub id: u32,
    pub world_position: Vector3<f64>,
    pub sphere_radius: f64,
    pub color: u32,
    pub label: String,
    pub label_revision: u64,
    pub camera_distance: f64,
    /// The globe sits between the camera and the marker.
    pub occluded: bool,
}

#[derive(Debug, Default)]
pub struct Scene {
    pub controls: Controls,
    pub markers: MarkerRegistry,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, samples: &[PositionSample]) -> CycleReport {
        self.markers.apply(samples)
    }

    /// Visible markers with the globe orientation composed onto each local
    /// position.
    pub fn draw_list(&self) -> Vec<DrawItem> {
        let rotation = self.controls.orientation.rotation();
        let eye = self.controls.camera.position;

        self.markers
            .iter()
            .filter(|marker| marker.visible)
            .map(|marker| {
                let world_position = rotation * marker.local_position;
                DrawItem {
                    id: marker.id,
                    world_position,
                    sphere_radius: marker.sphere_radius,
                    color: marker.color,
                    label: marker.label.text().to_string(),
                    label_revision: marker.label.revision(),
                    camera_distance: (world_position - eye).norm(),
                    occluded: hidden_by_globe(&eye, &world_position),
                }
            })
            .collect()
    }
}

/// True when the segment from `eye` to `point` passes through the globe.
pub fn hidden_by_globe(eye: &Vector3<f64>, point: &Vector3<f64>) -> bool {
    let d = point - eye;
    let a = d.dot(&d);
    if a == 0.0 {
        return false;
    }
    let b = 2.0 * eye.dot(&d);
    let c = eye.dot(eye) - GLOBE_RADIUS * GLOBE_RADIUS;
    let discriminant = b * b - 4.0 * a * c;
    if discriminant <= 0.0 {
        return false;
    }
    let t = (-b - discriminant.sqrt()) / (2.0 * a);
    t > 0.0 && t < 1.0
}
