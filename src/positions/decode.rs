//! Classification of raw upstream payloads.
//!
//! The upstream API answers with `{ info, positions: [...] }` on success and
//! with an object carrying `error` when it refuses a request. Grouped requests
//! sometimes come back as a list of such objects. Every payload is sorted into
//! a [`Decoded`] variant before anything is mapped into a [`PositionSample`].

use serde::Deserialize;
use serde_json::Value;

use super::types::PositionSample;

/// A single position record as the upstream reports it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PositionRecord {
    #[serde(default, alias = "satlat")]
    pub satlatitude: Option<f64>,
    #[serde(default, alias = "satlng")]
    pub satlongitude: Option<f64>,
    #[serde(default, alias = "alt")]
    pub sataltitude: Option<f64>,
    #[serde(default)]
    pub azimuth: Option<f64>,
    #[serde(default)]
    pub elevation: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Position(PositionRecord),
    ReportedError(String),
    Empty,
    Malformed(String),
}

pub fn classify(raw: &Value) -> Decoded {
    let Some(object) = raw.as_object() else {
        return Decoded::Malformed(describe_unexpected(raw));
    };

    if let Some(message) = ["error", "message"]
        .iter()
        .find_map(|key| object.get(*key).and_then(error_text))
    {
        return Decoded::ReportedError(message);
    }

    let record = match object.get("positions") {
        Some(Value::Array(list)) => match list.first() {
            Some(first) => first,
            None => return Decoded::Empty,
        },
        Some(Value::Null) | None => raw,
        Some(single) => single,
    };

    match PositionRecord::deserialize(record) {
        Ok(record) if record.satlatitude.is_some() && record.satlongitude.is_some() => {
            Decoded::Position(record)
        }
        Ok(_) => Decoded::Malformed("position record has no coordinates".to_string()),
        Err(e) => Decoded::Malformed(format!("invalid position record: {}", e)),
    }
}

/// Satellite id carried by a payload, either in `info.satid` or at the top
/// level.
pub fn satellite_id(raw: &Value) -> Option<u32> {
    raw.get("info")
        .and_then(|info| info.get("satid"))
        .or_else(|| raw.get("satid"))
        .and_then(Value::as_u64)
        .and_then(|id| u32::try_from(id).ok())
}

/// Maps one raw payload onto a sample for satellite `id`. `now_s` stands in
/// for the timestamp when neither the record nor `info` carries one.
pub fn to_sample(id: u32, display_name: String, raw: &Value, now_s: f64) -> PositionSample {
    let info_timestamp = raw
        .get("info")
        .and_then(|info| info.get("timestamp"))
        .and_then(Value::as_f64);

    match classify(raw) {
        Decoded::Position(record) => PositionSample {
            id,
            display_name,
            latitude: record.satlatitude,
            longitude: record.satlongitude,
            altitude_km: record.sataltitude,
            timestamp: record.timestamp.or(info_timestamp).unwrap_or(now_s),
            azimuth: record.azimuth,
            elevation: record.elevation,
            error: None,
        },
        Decoded::ReportedError(message) => {
            PositionSample::failed(id, display_name, info_timestamp.unwrap_or(now_s), message)
        }
        Decoded::Empty => PositionSample::failed(
            id,
            display_name,
            info_timestamp.unwrap_or(now_s),
            "no positions returned",
        ),
        Decoded::Malformed(reason) => {
            PositionSample::failed(id, display_name, info_timestamp.unwrap_or(now_s), reason)
        }
    }
}

fn error_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn describe_unexpected(raw: &Value) -> String {
    match raw {
        Value::String(text) if !text.trim().is_empty() => text.trim().to_string(),
        Value::String(_) => "empty response body".to_string(),
        other => format!("unexpected payload: {}", other),
    }
}
