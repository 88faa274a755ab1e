use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::{Config, ConfigError};
use crate::positions::{N2yoClient, PositionCache, PositionFetcher, SystemClock, UpstreamError};

use super::api::positions as position_handlers;
use super::api::satellites as satellite_handlers;
use super::api_doc::ApiDoc;
use super::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("upstream client error: {0}")]
    Upstream(#[from] UpstreamError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn build_state(config: &Config) -> Result<AppState, ServerError> {
    if config.upstream.api_key.is_empty() {
        log::warn!("N2YO_API_KEY not set; upstream requests will be rejected");
    }

    let roster = Arc::new(config.roster());
    let default_observer = config.default_observer()?;
    let clock = Arc::new(SystemClock);
    let source = Arc::new(N2yoClient::new(
        config.upstream.base_url.clone(),
        config.upstream.api_key.clone(),
        config.upstream.seconds,
        config.upstream.timeout,
    )?);
    let fetcher = PositionFetcher::new(source, roster.clone(), clock.clone());
    let positions = PositionCache::new(fetcher, clock, config.cache.min_interval);

    Ok(AppState {
        roster,
        positions: Arc::new(positions),
        default_observer,
    })
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/satellites", get(satellite_handlers::list_satellites))
        .route("/api/positions", get(position_handlers::get_positions))
        // Globe texture
        .route_service("/map/world.svg", ServeFile::new(&config.assets.world_map))
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Client bundle
        .fallback_service(ServeDir::new(&config.assets.public_dir))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(config: Config) -> Result<(), ServerError> {
    let state = build_state(&config)?;
    log::info!(
        "Tracking {} satellites, cache interval {}",
        state.roster.len(),
        humantime::format_duration(config.cache.min_interval)
    );
    let app = build_router(state, &config);

    log::info!("Starting server on {}", config.web.bind);

    let listener = tokio::net::TcpListener::bind(&config.web.bind).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
