use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::error::UpstreamError;
use super::types::Observer;

pub const DEFAULT_BASE_URL: &str = "https://api.n2yo.com/rest/v1/satellite";

/// Response body as received: JSON when it parses, raw text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum RawBody {
    Json(Value),
    Text(String),
}

impl RawBody {
    pub fn parse(text: String) -> Self {
        match serde_json::from_str(&text) {
            Ok(value) => RawBody::Json(value),
            Err(_) => RawBody::Text(text),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            RawBody::Json(value) => value,
            RawBody::Text(text) => Value::String(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReply {
    pub status: u16,
    pub reason: Option<String>,
    pub body: RawBody,
}

impl UpstreamReply {
    pub fn ok(body: Value) -> Self {
        Self {
            status: 200,
            reason: Some("OK".to_string()),
            body: RawBody::Json(body),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Where satellite positions come from. `ids` holds every roster id for the
/// grouped request and a single id for the per-satellite fallback.
#[async_trait]
pub trait PositionSource: Send + Sync {
    async fn positions(
        &self,
        ids: &[u32],
        observer: &Observer,
    ) -> Result<UpstreamReply, UpstreamError>;
}

pub struct N2yoClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    seconds: u32,
}

impl N2yoClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        seconds: u32,
        timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            seconds,
        })
    }

    fn url(&self, ids: &[u32], observer: &Observer) -> String {
        let ids = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join("%2C");
        format!(
            "{}/positions/{}/{}/{}/{}/{}",
            self.base_url,
            ids,
            observer.latitude_deg,
            observer.longitude_deg,
            observer.altitude_m,
            self.seconds
        )
    }
}

#[async_trait]
impl PositionSource for N2yoClient {
    async fn positions(
        &self,
        ids: &[u32],
        observer: &Observer,
    ) -> Result<UpstreamReply, UpstreamError> {
        let url = self.url(ids, observer);
        log::debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .query(&[("apiKey", self.api_key.as_str())])
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        Ok(UpstreamReply {
            status: status.as_u16(),
            reason: status.canonical_reason().map(String::from),
            body: RawBody::parse(text),
        })
    }
}
