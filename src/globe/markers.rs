use std::collections::{BTreeMap, HashSet};

use nalgebra::Vector3;

use super::projection::{marker_radius, project};
use crate::positions::PositionSample;
use crate::roster::ISS_NORAD_ID;

pub const ISS_COLOR: u32 = 0x2aa6ff;
pub const DEFAULT_COLOR: u32 = 0x6df0e8;

/// Billboard text. `revision` moves only when the text does, so the drawing
/// side knows when to regenerate the label texture.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    text: String,
    revision: u64,
}

impl Label {
    fn new(text: String) -> Self {
        Self { text, revision: 0 }
    }

    fn set(&mut self, text: &str) -> bool {
        if self.text == text {
            return false;
        }
        self.text = text.to_string();
        self.revision += 1;
        true
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// One satellite marker in globe-local space.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: u32,
    pub local_position: Vector3<f64>,
    pub sphere_radius: f64,
    pub color: u32,
    pub visible: bool,
    pub label: Label,
}

/// What changed during one [`MarkerRegistry::apply`] call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    pub created: Vec<u32>,
    pub updated: Vec<u32>,
    pub hidden: Vec<u32>,
    /// Markers dropped because their satellite left the sample list. Their
    /// drawing resources must be released.
    pub removed: Vec<u32>,
    pub relabeled: Vec<u32>,
}

#[derive(Debug, Default)]
pub struct MarkerRegistry {
    markers: BTreeMap<u32, Marker>,
}

impl MarkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, samples: &[PositionSample]) -> CycleReport {
        let mut report = CycleReport::default();

        for sample in samples {
            let label = label_text(sample);
            match (sample.coordinates(), self.markers.get_mut(&sample.id)) {
                (Some((lat, lon)), Some(marker)) => {
                    marker.local_position = project(lon, lat, sample.altitude_km.unwrap_or(0.0));
                    marker.sphere_radius = marker_radius(sample.altitude_km);
                    marker.visible = true;
                    if marker.label.set(&label) {
                        report.relabeled.push(sample.id);
                    }
                    report.updated.push(sample.id);
                }
                (Some((lat, lon)), None) => {
                    self.markers.insert(
                        sample.id,
                        Marker {
                            id: sample.id,
                            local_position: project(lon, lat, sample.altitude_km.unwrap_or(0.0)),
                            sphere_radius: marker_radius(sample.altitude_km),
                            color: marker_color(sample.id),
                            visible: true,
                            label: Label::new(label),
                        },
                    );
                    report.created.push(sample.id);
                }
                (None, Some(marker)) => {
                    marker.visible = false;
                    report.hidden.push(sample.id);
                }
                (None, None) => {}
            }
        }

        let seen: HashSet<u32> = samples.iter().map(|s| s.id).collect();
        self.markers.retain(|id, _| {
            let keep = seen.contains(id);
            if !keep {
                report.removed.push(*id);
            }
            keep
        });

        report
    }

    pub fn get(&self, id: u32) -> Option<&Marker> {
        self.markers.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.values()
    }

    pub fn ids(&self) -> Vec<u32> {
        self.markers.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

fn label_text(sample: &PositionSample) -> String {
    if sample.display_name.is_empty() {
        sample.id.to_string()
    } else {
        sample.display_name.clone()
    }
}

fn marker_color(id: u32) -> u32 {
    if id == ISS_NORAD_ID {
        ISS_COLOR
    } else {
        DEFAULT_COLOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn located(id: u32, name: &str, lat: f64, lon: f64) -> PositionSample {
        PositionSample {
            id,
            display_name: name.to_string(),
            latitude: Some(lat),
            longitude: Some(lon),
            altitude_km: Some(420.0),
            timestamp: 0.0,
            azimuth: None,
            elevation: None,
            error: None,
        }
    }

    fn errored(id: u32, name: &str) -> PositionSample {
        PositionSample::failed(id, name.to_string(), 0.0, "no positions returned")
    }

    #[test]
    fn create_hide_remove_lifecycle() {
        let mut registry = MarkerRegistry::new();

        let report = registry.apply(&[located(1, "A", 10.0, 20.0), located(2, "B", -5.0, 40.0)]);
        assert_eq!(report.created, vec![1, 2]);
        assert_eq!(registry.len(), 2);
        assert!(registry.iter().all(|m| m.visible));

        let b_before = registry.get(2).unwrap().local_position;
        let report = registry.apply(&[errored(1, "A"), located(2, "B", -6.0, 41.0)]);
        assert_eq!(report.hidden, vec![1]);
        assert_eq!(report.updated, vec![2]);
        assert!(!registry.get(1).unwrap().visible);
        assert!(registry.get(2).unwrap().visible);
        assert_ne!(registry.get(2).unwrap().local_position, b_before);

        let report = registry.apply(&[located(2, "B", -7.0, 42.0)]);
        assert_eq!(report.removed, vec![1]);
        assert_eq!(registry.ids(), vec![2]);
    }

    #[test]
    fn never_seen_error_creates_nothing() {
        let mut registry = MarkerRegistry::new();
        let report = registry.apply(&[errored(5, "E")]);
        assert!(registry.is_empty());
        assert_eq!(report, CycleReport::default());
    }

    #[test]
    fn marker_ids_match_located_history() {
        let mut registry = MarkerRegistry::new();
        registry.apply(&[located(1, "A", 0.0, 0.0), errored(2, "B"), located(3, "C", 1.0, 1.0)]);
        assert_eq!(registry.ids(), vec![1, 3]);

        registry.apply(&[errored(1, "A"), located(2, "B", 2.0, 2.0), errored(3, "C")]);
        assert_eq!(registry.ids(), vec![1, 2, 3]);

        registry.apply(&[errored(3, "C")]);
        assert_eq!(registry.ids(), vec![3]);
    }

    #[test]
    fn label_revision_moves_only_on_text_change() {
        let mut registry = MarkerRegistry::new();
        registry.apply(&[located(1, "ISS", 0.0, 0.0)]);
        let report = registry.apply(&[located(1, "ISS", 1.0, 1.0)]);
        assert!(report.relabeled.is_empty());
        assert_eq!(registry.get(1).unwrap().label.revision(), 0);

        let report = registry.apply(&[located(1, "ISS (ZARYA)", 1.0, 1.0)]);
        assert_eq!(report.relabeled, vec![1]);
        let label = &registry.get(1).unwrap().label;
        assert_eq!(label.text(), "ISS (ZARYA)");
        assert_eq!(label.revision(), 1);
    }

    #[test]
    fn iss_gets_its_own_color() {
        let mut registry = MarkerRegistry::new();
        registry.apply(&[located(ISS_NORAD_ID, "ISS", 0.0, 0.0), located(7, "S", 0.0, 0.0)]);
        assert_eq!(registry.get(ISS_NORAD_ID).unwrap().color, ISS_COLOR);
        assert_eq!(registry.get(7).unwrap().color, DEFAULT_COLOR);
    }
}
