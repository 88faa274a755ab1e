use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use sat_globe::client::Viewer;
use sat_globe::positions::{
    ManualClock, Observer, PositionCache, PositionFetcher, PositionSource, PositionsResponse,
    UpstreamError, UpstreamReply,
};
use sat_globe::{Roster, SatelliteDescriptor};

/// Upstream whose per-satellite answers can be changed between cycles.
/// Grouped requests always come back in the single-object shape, which forces
/// the per-satellite path.
#[derive(Default)]
struct ScriptedUpstream {
    answers: Mutex<HashMap<u32, Option<(f64, f64)>>>,
}

impl ScriptedUpstream {
    fn set(&self, id: u32, position: Option<(f64, f64)>) {
        self.answers.lock().unwrap().insert(id, position);
    }
}

#[async_trait]
impl PositionSource for ScriptedUpstream {
    async fn positions(
        &self,
        ids: &[u32],
        _observer: &Observer,
    ) -> Result<UpstreamReply, UpstreamError> {
        if ids.len() != 1 {
            return Ok(UpstreamReply::ok(json!({ "info": { "satcount": ids.len() } })));
        }
        let answers = self.answers.lock().unwrap();
        let body: Value = match answers.get(&ids[0]).copied().flatten() {
            Some((lat, lon)) => json!({
                "info": { "satid": ids[0] },
                "positions": [{ "satlatitude": lat, "satlongitude": lon, "sataltitude": 420.0 }]
            }),
            None => json!({ "info": { "satid": ids[0] }, "positions": [] }),
        };
        Ok(UpstreamReply::ok(body))
    }
}

fn service(roster: Roster, upstream: Arc<ScriptedUpstream>, clock: Arc<ManualClock>) -> PositionCache {
    let fetcher = PositionFetcher::new(upstream, Arc::new(roster), clock.clone());
    PositionCache::new(fetcher, clock, Duration::from_secs(2))
}

#[tokio::test]
async fn markers_follow_service_batches() {
    let upstream = Arc::new(ScriptedUpstream::default());
    upstream.set(1, Some((10.0, 20.0)));
    upstream.set(2, Some((-30.0, 40.0)));
    let clock = Arc::new(ManualClock::new(0));
    let roster = Roster::new(vec![
        SatelliteDescriptor::new(1, "A"),
        SatelliteDescriptor::new(2, "B"),
    ]);
    let cache = service(roster, upstream.clone(), clock.clone());
    let mut viewer = Viewer::new();

    // cycle 1: both located
    let response: PositionsResponse = cache
        .get_positions(&Observer::default(), false)
        .await
        .unwrap()
        .into();
    viewer.submit(1, response);
    let frame = viewer.frame();
    assert_eq!(frame.items.len(), 2);

    // cycle 2: A loses its position
    upstream.set(1, None);
    upstream.set(2, Some((-31.0, 41.0)));
    clock.advance(2_000);
    let response: PositionsResponse = cache
        .get_positions(&Observer::default(), false)
        .await
        .unwrap()
        .into();
    assert!(!response.cached);
    assert_eq!(response.sats[0].error.as_deref(), Some("no positions returned"));
    viewer.submit(2, response);
    let frame = viewer.frame();
    assert_eq!(viewer.scene().markers.ids(), vec![1, 2]);
    assert_eq!(frame.items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![2]);

    // a poll inside the cooldown sees the same batch
    clock.advance(500);
    let cached: PositionsResponse = cache
        .get_positions(&Observer::default(), false)
        .await
        .unwrap()
        .into();
    assert!(cached.cached);

    // cycle 3: A disappears from the sample list entirely
    let mut response = cached;
    response.sats.retain(|s| s.id != 1);
    viewer.submit(3, response);
    let frame = viewer.frame();
    assert_eq!(frame.applied.unwrap().removed, vec![1]);
    assert_eq!(viewer.scene().markers.ids(), vec![2]);
}

#[tokio::test]
async fn roster_length_survives_fallback() {
    let upstream = Arc::new(ScriptedUpstream::default());
    let clock = Arc::new(ManualClock::new(0));
    let roster = Roster::default();
    let expected = roster.len();
    let cache = service(roster, upstream, clock);

    let positions = cache.get_positions(&Observer::default(), true).await.unwrap();
    assert_eq!(positions.batch.samples.len(), expected);
    assert!(positions
        .batch
        .samples
        .iter()
        .all(|s| s.error.as_deref() == Some("no positions returned")));
    assert_eq!(
        positions.raw.and_then(|raw| raw.as_array().map(Vec::len)),
        Some(expected)
    );
}
