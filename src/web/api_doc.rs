use utoipa::OpenApi;

use super::api::error::{ErrorResponse, FetchFailedResponse};
use crate::positions::{PositionSample, PositionsResponse};
use crate::roster::SatelliteDescriptor;

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::satellites::list_satellites,
        super::api::positions::get_positions,
    ),
    components(
        schemas(
            SatelliteDescriptor,
            PositionSample,
            PositionsResponse,
            ErrorResponse,
            FetchFailedResponse,
        )
    ),
    info(
        title = "Sat-Globe Positions API",
        description = "Cached satellite positions for the globe viewer",
        version = "0.1.0"
    ),
    tags(
        (name = "satellites", description = "Tracked satellite roster"),
        (name = "positions", description = "Current satellite positions")
    )
)]
pub struct ApiDoc;
