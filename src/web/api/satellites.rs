use axum::{extract::State, Json};

use crate::roster::SatelliteDescriptor;
use crate::web::state::AppState;

#[utoipa::path(
    get,
    path = "/api/satellites",
    tag = "satellites",
    responses(
        (status = 200, description = "Tracked satellites", body = Vec<SatelliteDescriptor>)
    )
)]
pub async fn list_satellites(State(state): State<AppState>) -> Json<Vec<SatelliteDescriptor>> {
    Json(state.roster.satellites().to_vec())
}
