use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Observer location forwarded to the upstream API.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Observer {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_m: f64,
}

impl Observer {
    /// Parses `"lat,lon"` the way station coordinates are written in config
    /// files.
    pub fn from_coordinates(coordinates: &str, altitude_m: Option<f64>) -> Option<Self> {
        let parts: Vec<_> = coordinates.split(',').map(|s| s.trim()).collect();
        if parts.len() < 2 {
            return None;
        }
        let lat: f64 = parts[0].parse().ok()?;
        let lon: f64 = parts[1].parse().ok()?;
        let observer = Self {
            latitude_deg: lat,
            longitude_deg: lon,
            altitude_m: altitude_m.unwrap_or(0.0),
        };
        observer.is_valid().then_some(observer)
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude_deg)
            && (-180.0..=180.0).contains(&self.longitude_deg)
            && self.altitude_m.is_finite()
    }
}

/// Normalized position of one satellite for one fetch cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PositionSample {
    #[serde(rename = "satid")]
    pub id: u32,
    #[serde(rename = "name")]
    pub display_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude_km: Option<f64>,
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
    pub azimuth: Option<f64>,
    pub elevation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PositionSample {
    pub fn failed(id: u32, display_name: String, timestamp: f64, error: impl Into<String>) -> Self {
        Self {
            id,
            display_name,
            latitude: None,
            longitude: None,
            altitude_km: None,
            timestamp,
            azimuth: None,
            elevation: None,
            error: Some(error.into()),
        }
    }

    /// Latitude and longitude when both are present.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

/// Result of one successful fetch cycle. Replaced wholesale, never edited.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionBatch {
    pub fetched_at_ms: i64,
    pub samples: Vec<PositionSample>,
}

/// What `PositionCache::get_positions` hands back to callers.
#[derive(Debug, Clone)]
pub struct Positions {
    pub batch: Arc<PositionBatch>,
    pub served_from_cache: bool,
    pub raw: Option<Value>,
}

/// Body of `GET /api/positions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PositionsResponse {
    pub cached: bool,
    /// Milliseconds since the Unix epoch of the fetch that produced `sats`.
    pub updated: i64,
    pub sats: Vec<PositionSample>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub raw: Option<Value>,
}

impl From<Positions> for PositionsResponse {
    fn from(positions: Positions) -> Self {
        PositionsResponse {
            cached: positions.served_from_cache,
            updated: positions.batch.fetched_at_ms,
            sats: positions.batch.samples.clone(),
            raw: positions.raw,
        }
    }
}
