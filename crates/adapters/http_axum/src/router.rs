//! Axum router assembly.

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_http::validate_request::ValidateRequestHeaderLayer;

use crate::api;
use crate::state::AppState;

/// Authentication and CORS settings for the router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub username: String,
    pub password: String,
    pub allowed_origins: Vec<String>,
}

/// Build the top-level axum [`Router`].
///
/// Everything except `/health` sits behind HTTP basic auth. A
/// [`TraceLayer`] logs each request/response at the `DEBUG` level using
/// the `tracing` ecosystem.
pub fn build(state: AppState, config: &RouterConfig) -> Router {
    let protected = Router::new()
        .route("/shutter/deviceGroups", get(api::list_device_groups))
        .route("/shutter/schedules", get(api::list_schedules))
        .route("/schedule/execute", post(api::execute_schedule))
        .route("/shutter/up", post(api::shutter_up))
        .route("/shutter/down", post(api::shutter_down))
        .route("/shutter/stop", post(api::shutter_stop))
        .route("/shutter/wink", post(api::shutter_wink))
        .route("/shutter/identify", post(api::shutter_identify))
        .route("/shutter/my", post(api::shutter_my))
        .layer(ValidateRequestHeaderLayer::basic(
            &config.username,
            &config.password,
        ))
        .with_state(state);

    Router::new()
        .route("/health", get(health_check))
        .merge(protected)
        .layer(cors_layer(&config.allowed_origins))
        .layer(TraceLayer::new_for_http())
}

async fn health_check() -> &'static str {
    "OK"
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
