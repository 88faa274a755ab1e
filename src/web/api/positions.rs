use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::{Deserialize, Deserializer};
use utoipa::IntoParams;

use crate::positions::{Observer, PositionsResponse};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse, FetchFailedResponse};
use crate::web::state::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PositionsQuery {
    /// Observer latitude in degrees.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub obslat: Option<f64>,
    /// Observer longitude in degrees.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub obslng: Option<f64>,
    /// Observer altitude in metres.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub obsalt: Option<f64>,
    /// `true` attaches the raw upstream payload(s).
    pub debug: Option<String>,
}

/// Blank values such as `?obslat=` fall back to the default observer.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid number: {}", value))),
    }
}

impl PositionsQuery {
    fn observer(&self, default: Observer) -> Result<Observer, ApiError> {
        let observer = Observer {
            latitude_deg: self.obslat.unwrap_or(default.latitude_deg),
            longitude_deg: self.obslng.unwrap_or(default.longitude_deg),
            altitude_m: self.obsalt.unwrap_or(default.altitude_m),
        };
        if !observer.is_valid() {
            return Err(ApiError::Validation(format!(
                "observer out of range: lat={} lng={} alt={}",
                observer.latitude_deg, observer.longitude_deg, observer.altitude_m
            )));
        }
        Ok(observer)
    }

    fn debug(&self) -> bool {
        self.debug.as_deref() == Some("true")
    }
}

#[utoipa::path(
    get,
    path = "/api/positions",
    tag = "positions",
    params(PositionsQuery),
    responses(
        (status = 200, description = "Current satellite positions", body = PositionsResponse),
        (status = 400, description = "Invalid observer", body = ErrorResponse),
        (status = 500, description = "Upstream unreachable", body = FetchFailedResponse)
    )
)]
pub async fn get_positions(
    State(state): State<AppState>,
    query: Result<Query<PositionsQuery>, QueryRejection>,
) -> ApiResult<Json<PositionsResponse>> {
    let Query(query) = query.map_err(|e| ApiError::Validation(e.body_text()))?;
    let observer = query.observer(state.default_observer)?;
    let debug = query.debug();
    log::info!(
        "/api/positions requested (debug={}) obslat={} obslng={} obsalt={}",
        debug,
        observer.latitude_deg,
        observer.longitude_deg,
        observer.altitude_m
    );

    let positions = state.positions.get_positions(&observer, debug).await?;
    Ok(Json(positions.into()))
}
