use std::time::Duration;

use serde_json::Value;

use super::error::ClientError;
use crate::positions::PositionsResponse;
use crate::roster::SatelliteDescriptor;

/// HTTP client for a running positions service.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            http: reqwest::Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn satellites(&self) -> Result<Vec<SatelliteDescriptor>, ClientError> {
        let body = self.get_json(&format!("{}/api/satellites", self.base_url)).await?;
        Ok(serde_json::from_value(body)?)
    }

    pub async fn positions(&self, debug: bool) -> Result<PositionsResponse, ClientError> {
        let url = if debug {
            format!("{}/api/positions?debug=true", self.base_url)
        } else {
            format!("{}/api/positions", self.base_url)
        };
        let body = self.get_json(&url).await?;
        log::trace!("Raw /api/positions response: {}", body);
        Ok(serde_json::from_value(body)?)
    }

    async fn get_json(&self, url: &str) -> Result<Value, ClientError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(serde_json::from_str(&text)?)
    }
}
