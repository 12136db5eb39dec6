//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use shutterhub_domain::error::ShutterHubError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`ShutterHubError`] to an HTTP response with appropriate status code.
pub struct ApiError(ShutterHubError);

impl From<ShutterHubError> for ApiError {
    fn from(err: ShutterHubError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            ShutterHubError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            ShutterHubError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            ShutterHubError::Gateway(err) => {
                tracing::error!(error = %err, "gateway error surfaced through the API");
                (StatusCode::BAD_GATEWAY, "gateway error".to_string())
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
