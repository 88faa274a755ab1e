use chrono::DateTime;

use crate::globe::{CycleReport, DrawItem, Scene};
use crate::positions::PositionsResponse;

struct PendingUpdate {
    sequence: u64,
    response: PositionsResponse,
}

/// Output of one render tick.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    /// Set when this frame applied a newly arrived batch.
    pub applied: Option<CycleReport>,
    pub items: Vec<DrawItem>,
}

/// Client-side view state. Fetch results are queued with their sequence
/// number and applied on the next frame; anything older than what is already
/// queued or applied is dropped.
pub struct Viewer {
    scene: Scene,
    pending: Option<PendingUpdate>,
    last_applied: u64,
    status: String,
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewer {
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            pending: None,
            last_applied: 0,
            status: "Waiting for positions".to_string(),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Queues a response for the next frame. Returns false when a newer
    /// result has already been queued or applied.
    pub fn submit(&mut self, sequence: u64, response: PositionsResponse) -> bool {
        let newest = self
            .pending
            .as_ref()
            .map_or(self.last_applied, |p| p.sequence.max(self.last_applied));
        if sequence <= newest {
            log::debug!(
                "Dropping stale positions response #{} (newest #{})",
                sequence,
                newest
            );
            return false;
        }
        self.status = format!(
            "Updated: {}{}",
            format_updated(response.updated),
            if response.cached { " (cached)" } else { "" }
        );
        self.pending = Some(PendingUpdate { sequence, response });
        true
    }

    pub fn report_error(&mut self, message: impl std::fmt::Display) {
        self.status = format!("Error fetching positions: {}", message);
    }

    pub fn frame(&mut self) -> Frame {
        let applied = self.pending.take().map(|update| {
            self.last_applied = update.sequence;
            self.scene.apply(&update.response.sats)
        });
        self.scene.controls.update();
        Frame {
            applied,
            items: self.scene.draw_list(),
        }
    }
}

fn format_updated(updated_ms: i64) -> String {
    DateTime::from_timestamp_millis(updated_ms)
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| updated_ms.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::positions::PositionSample;

    fn response(updated: i64, samples: &[(u32, Option<(f64, f64)>)]) -> PositionsResponse {
        PositionsResponse {
            cached: false,
            updated,
            sats: samples
                .iter()
                .map(|(id, coords)| match coords {
                    Some((lat, lon)) => PositionSample {
                        id: *id,
                        display_name: format!("SAT {}", id),
                        latitude: Some(*lat),
                        longitude: Some(*lon),
                        altitude_km: Some(550.0),
                        timestamp: 0.0,
                        azimuth: None,
                        elevation: None,
                        error: None,
                    },
                    None => PositionSample::failed(*id, format!("SAT {}", id), 0.0, "down"),
                })
                .collect(),
            raw: None,
        }
    }

    #[test]
    fn results_apply_on_next_frame() {
        let mut viewer = Viewer::new();
        assert!(viewer.submit(1, response(0, &[(1, Some((0.0, 0.0)))])));
        assert!(viewer.scene().markers.is_empty());

        let frame = viewer.frame();
        assert_eq!(frame.applied.unwrap().created, vec![1]);
        assert_eq!(frame.items.len(), 1);

        let frame = viewer.frame();
        assert!(frame.applied.is_none());
        assert_eq!(frame.items.len(), 1);
    }

    #[test]
    fn late_responses_do_not_overwrite_newer_ones() {
        let mut viewer = Viewer::new();
        assert!(viewer.submit(2, response(2_000, &[(1, Some((5.0, 5.0)))])));
        assert!(!viewer.submit(1, response(1_000, &[(1, Some((9.0, 9.0)))])));
        viewer.frame();
        let expected = crate::globe::project(5.0, 5.0, 550.0);
        assert_eq!(viewer.scene().markers.get(1).unwrap().local_position, expected);

        assert!(!viewer.submit(2, response(2_000, &[])));
        assert!(viewer.submit(3, response(3_000, &[])));
    }

    #[test]
    fn two_satellite_scenario() {
        let mut viewer = Viewer::new();

        viewer.submit(1, response(1, &[(1, Some((10.0, 10.0))), (2, Some((20.0, 20.0)))]));
        let frame = viewer.frame();
        assert_eq!(frame.items.len(), 2);

        viewer.submit(2, response(2, &[(1, None), (2, Some((21.0, 21.0)))]));
        let frame = viewer.frame();
        assert_eq!(viewer.scene().markers.ids(), vec![1, 2]);
        assert!(!viewer.scene().markers.get(1).unwrap().visible);
        assert_eq!(frame.items.iter().map(|d| d.id).collect::<Vec<_>>(), vec![2]);

        viewer.submit(3, response(3, &[(2, Some((22.0, 22.0)))]));
        let frame = viewer.frame();
        assert_eq!(frame.applied.unwrap().removed, vec![1]);
        assert_eq!(viewer.scene().markers.ids(), vec![2]);
    }

    #[test]
    fn status_tracks_errors_and_cache_flag() {
        let mut viewer = Viewer::new();
        viewer.report_error("HTTP 500: boom");
        assert_eq!(viewer.status(), "Error fetching positions: HTTP 500: boom");

        let mut cached = response(0, &[]);
        cached.cached = true;
        viewer.submit(1, cached);
        assert_eq!(viewer.status(), "Updated: 00:00:00 (cached)");
    }
}
