use std::sync::Arc;

use serde_json::{json, Value};

use super::clock::Clock;
use super::decode::{satellite_id, to_sample};
use super::error::FetchError;
use super::types::{Observer, PositionSample};
use super::upstream::{PositionSource, RawBody, UpstreamReply};
use crate::roster::Roster;

/// Samples from one fetch cycle plus the upstream payload(s) they came from.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub samples: Vec<PositionSample>,
    pub raw: Value,
}

/// Two-tier fetch: one grouped request, then one request per satellite when
/// the grouped answer is unusable.
pub struct PositionFetcher {
    source: Arc<dyn PositionSource>,
    roster: Arc<Roster>,
    clock: Arc<dyn Clock>,
}

impl PositionFetcher {
    pub fn new(source: Arc<dyn PositionSource>, roster: Arc<Roster>, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            roster,
            clock,
        }
    }

    pub async fn fetch(&self, observer: &Observer) -> Result<FetchOutcome, FetchError> {
        let ids = self.roster.ids();
        log::info!("Attempting grouped positions request for {} satellites", ids.len());

        match self.source.positions(&ids, observer).await {
            Ok(reply) => {
                let status = reply.status;
                let raw = reply.body.into_value();
                if let Some(samples) = self.grouped_samples(&raw) {
                    log::info!("Grouped positions returned {} entries", samples.len());
                    return Ok(FetchOutcome { samples, raw });
                }
                log::warn!(
                    "Grouped positions returned unexpected shape (HTTP {}), falling back to per-satellite requests",
                    status
                );
            }
            Err(e) => {
                log::error!("Grouped positions request failed: {}", e);
            }
        }

        self.fetch_each(observer).await
    }

    /// Accepts the grouped answer only as a non-empty list whose every entry
    /// names the satellite it belongs to.
    fn grouped_samples(&self, raw: &Value) -> Option<Vec<PositionSample>> {
        let entries = raw.as_array().filter(|entries| !entries.is_empty())?;
        let now_s = self.clock.now_seconds();
        entries
            .iter()
            .map(|entry| {
                let id = satellite_id(entry)?;
                Some(to_sample(id, self.roster.display_name(id), entry, now_s))
            })
            .collect()
    }

    async fn fetch_each(&self, observer: &Observer) -> Result<FetchOutcome, FetchError> {
        let mut samples = Vec::with_capacity(self.roster.len());
        let mut raw_entries = Vec::with_capacity(self.roster.len());
        let mut transport_failures = 0;
        let mut last_failure = String::new();

        for sat in self.roster.satellites() {
            log::debug!("Fetching per-satellite position for {}", sat.id);
            let now_s = self.clock.now_seconds();

            match self.source.positions(&[sat.id], observer).await {
                Ok(reply) if reply.is_success() => {
                    let raw = reply.body.into_value();
                    let sample = to_sample(sat.id, sat.display_name.clone(), &raw, now_s);
                    if let Some(error) = &sample.error {
                        log::warn!("No position for satellite {}: {}", sat.id, error);
                    }
                    samples.push(sample);
                    raw_entries.push(json!({ "satid": sat.id, "raw": raw }));
                }
                Ok(reply) => {
                    let error = non_success_text(&reply);
                    log::warn!("Per-satellite request non-OK for {}: {}", sat.id, error);
                    samples.push(PositionSample::failed(
                        sat.id,
                        sat.display_name.clone(),
                        now_s,
                        error.clone(),
                    ));
                    raw_entries.push(json!({
                        "satid": sat.id,
                        "error": error,
                        "raw": reply.body.into_value(),
                    }));
                }
                Err(e) => {
                    let error = e.to_string();
                    log::error!("Per-satellite request failed for {}: {}", sat.id, error);
                    samples.push(PositionSample::failed(
                        sat.id,
                        sat.display_name.clone(),
                        now_s,
                        error.clone(),
                    ));
                    raw_entries.push(json!({ "satid": sat.id, "error": error }));
                    transport_failures += 1;
                    last_failure = error;
                }
            }
        }

        if !self.roster.is_empty() && transport_failures == self.roster.len() {
            return Err(FetchError::Unreachable {
                details: last_failure,
                raw: Value::Array(raw_entries),
            });
        }

        Ok(FetchOutcome {
            samples,
            raw: Value::Array(raw_entries),
        })
    }
}

fn non_success_text(reply: &UpstreamReply) -> String {
    let from_body = match &reply.body {
        RawBody::Text(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        RawBody::Json(body) => body.get("error").and_then(|e| match e {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }),
        RawBody::Text(_) => None,
    };
    from_body
        .or_else(|| reply.reason.clone())
        .unwrap_or_else(|| format!("HTTP {}", reply.status))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::positions::clock::ManualClock;
    use crate::positions::error::UpstreamError;
    use crate::positions::testing::{position_body, FakeSource};
    use crate::roster::SatelliteDescriptor;

    fn roster() -> Arc<Roster> {
        Arc::new(Roster::new(vec![
            SatelliteDescriptor::new(1, "Alpha"),
            SatelliteDescriptor::new(2, "Bravo"),
            SatelliteDescriptor::new(3, "Charlie"),
        ]))
    }

    fn fetcher(source: FakeSource) -> (PositionFetcher, Arc<FakeSource>) {
        let source = Arc::new(source);
        let fetcher = PositionFetcher::new(
            source.clone(),
            roster(),
            Arc::new(ManualClock::new(1_700_000_000_000)),
        );
        (fetcher, source)
    }

    #[tokio::test]
    async fn grouped_list_is_used_as_is() {
        let (fetcher, source) = fetcher(FakeSource::new(|ids| {
            assert_eq!(ids, &[1, 2, 3]);
            Ok(UpstreamReply::ok(json!([
                position_body(2, 10.0, 20.0),
                position_body(1, 11.0, 21.0),
            ])))
        }));

        let outcome = fetcher.fetch(&Observer::default()).await.unwrap();
        assert_eq!(source.calls().len(), 1);
        assert_eq!(outcome.samples.len(), 2);
        assert_eq!(outcome.samples[0].id, 2);
        assert_eq!(outcome.samples[0].display_name, "Bravo");
        assert!(outcome.raw.is_array());
    }

    #[tokio::test]
    async fn unexpected_grouped_shapes_fall_back_per_satellite() {
        let grouped_replies = [
            json!({ "info": { "satcount": 0 } }),
            json!([]),
            json!("Too many requests"),
            json!([{ "positions": [] }]),
        ];

        for grouped in grouped_replies {
            let (fetcher, source) = fetcher(FakeSource::new(move |ids| {
                if ids.len() > 1 {
                    Ok(UpstreamReply::ok(grouped.clone()))
                } else {
                    Ok(UpstreamReply::ok(position_body(ids[0], 1.0, 2.0)))
                }
            }));

            let outcome = fetcher.fetch(&Observer::default()).await.unwrap();
            assert_eq!(outcome.samples.len(), 3);
            assert_eq!(source.calls().len(), 4);
            assert!(outcome.samples.iter().all(|s| s.error.is_none()));
        }
    }

    #[tokio::test]
    async fn grouped_transport_error_falls_back() {
        let (fetcher, _) = fetcher(FakeSource::new(|ids| {
            if ids.len() > 1 {
                Err(UpstreamError::Transport("connection reset".into()))
            } else {
                Ok(UpstreamReply::ok(position_body(ids[0], 1.0, 2.0)))
            }
        }));

        let outcome = fetcher.fetch(&Observer::default()).await.unwrap();
        assert_eq!(outcome.samples.len(), 3);
    }

    #[tokio::test]
    async fn one_failed_satellite_does_not_touch_the_others() {
        let (fetcher, _) = fetcher(FakeSource::new(|ids| match ids {
            [2] => Err(UpstreamError::Transport("timed out".into())),
            [id] => Ok(UpstreamReply::ok(position_body(*id, 5.0, 6.0))),
            _ => Ok(UpstreamReply::ok(json!({ "error": "grouped not supported" }))),
        }));

        let outcome = fetcher.fetch(&Observer::default()).await.unwrap();
        let failed: Vec<_> = outcome.samples.iter().filter(|s| s.error.is_some()).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].id, 2);
        assert!(failed[0].coordinates().is_none());
        assert!(outcome
            .samples
            .iter()
            .filter(|s| s.id != 2)
            .all(|s| s.coordinates() == Some((5.0, 6.0))));
        assert_eq!(outcome.raw[1]["error"], "transport error: timed out");
    }

    #[tokio::test]
    async fn non_success_status_carries_body_text() {
        let (fetcher, _) = fetcher(FakeSource::new(|ids| match ids {
            [1] => Ok(UpstreamReply {
                status: 502,
                reason: Some("Bad Gateway".into()),
                body: RawBody::Text("<html>upstream down</html>".into()),
            }),
            [3] => Ok(UpstreamReply {
                status: 429,
                reason: None,
                body: RawBody::Json(json!({})),
            }),
            [id] => Ok(UpstreamReply::ok(position_body(*id, 5.0, 6.0))),
            _ => Ok(UpstreamReply::ok(json!({}))),
        }));

        let outcome = fetcher.fetch(&Observer::default()).await.unwrap();
        assert_eq!(
            outcome.samples[0].error.as_deref(),
            Some("<html>upstream down</html>")
        );
        assert!(outcome.samples[1].error.is_none());
        assert_eq!(outcome.samples[2].error.as_deref(), Some("HTTP 429"));
    }

    #[tokio::test]
    async fn everything_unreachable_is_a_fetch_error() {
        let (fetcher, _) = fetcher(FakeSource::new(|_| {
            Err(UpstreamError::Transport("dns failure".into()))
        }));

        let err = fetcher.fetch(&Observer::default()).await.unwrap_err();
        assert_eq!(err.details(), "transport error: dns failure");
        assert_eq!(err.raw().as_array().map(Vec::len), Some(3));
    }
}
