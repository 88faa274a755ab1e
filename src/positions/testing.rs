use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::error::UpstreamError;
use super::types::Observer;
use super::upstream::{PositionSource, UpstreamReply};

type Handler = dyn Fn(&[u32]) -> Result<UpstreamReply, UpstreamError> + Send + Sync;

/// Scripted upstream that records every request it sees.
pub struct FakeSource {
    handler: Box<Handler>,
    delay: Duration,
    calls: Mutex<Vec<Vec<u32>>>,
}

impl FakeSource {
    pub fn new(
        handler: impl Fn(&[u32]) -> Result<UpstreamReply, UpstreamError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<Vec<u32>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PositionSource for FakeSource {
    async fn positions(
        &self,
        ids: &[u32],
        _observer: &Observer,
    ) -> Result<UpstreamReply, UpstreamError> {
        self.calls.lock().unwrap().push(ids.to_vec());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        (self.handler)(ids)
    }
}

/// Upstream-shaped body with one position record.
pub fn position_body(id: u32, lat: f64, lon: f64) -> Value {
    json!({
        "info": { "satid": id, "satname": format!("SAT {}", id), "transactionscount": 1 },
        "positions": [{
            "satlatitude": lat,
            "satlongitude": lon,
            "sataltitude": 550.0,
            "azimuth": 180.0,
            "elevation": -30.0,
            "timestamp": 1700000000
        }]
    })
}

/// Source where every satellite is reported at `lat`/`lon`.
pub fn healthy_source(lat: f64, lon: f64) -> FakeSource {
    FakeSource::new(move |ids| {
        Ok(UpstreamReply::ok(Value::Array(
            ids.iter().map(|id| position_body(*id, lat, lon)).collect(),
        )))
    })
}
