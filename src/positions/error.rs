use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("transport error: {0}")]
    Transport(String),
}

#[derive(Debug, Error)]
pub enum FetchError {
    /// Neither the grouped request nor any per-satellite request got an answer.
    #[error("upstream unreachable: {details}")]
    Unreachable { details: String, raw: Value },
}

impl FetchError {
    pub fn details(&self) -> &str {
        match self {
            FetchError::Unreachable { details, .. } => details,
        }
    }

    pub fn raw(&self) -> &Value {
        match self {
            FetchError::Unreachable { raw, .. } => raw,
        }
    }
}
