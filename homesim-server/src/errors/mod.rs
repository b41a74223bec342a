pub mod api;
pub mod auth;
pub mod device;
pub mod preset;
pub mod validation;

pub use api::ApiError;
pub use auth::AuthError;
pub use device::DeviceError;
pub use preset::PresetError;
pub use validation::ValidationErrors;

use axum::Json;
use axum::extract::path::ErrorKind;
use axum::extract::rejection::PathRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use homesim_api::models::ApiResponse;
use uuid::Uuid;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::AuthError(e) => (
                e.status_code(),
                ApiResponse::<()>::failure(e.to_string()),
            ),
            ApiError::DeviceError(e) => (
                e.status_code(),
                ApiResponse::<()>::failure(e.to_string()).with_error(e.detail()),
            ),
            ApiError::PresetError(e) => (
                e.status_code(),
                ApiResponse::<()>::failure(e.to_string()).with_error(e.detail()),
            ),
            ApiError::ValidationError(e) => (
                e.status_code(),
                ApiResponse::<()>::failure(e.to_string()).with_errors(e.into_fields()),
            ),
            ApiError::DatabaseError(e) => internal_error("Database error", e.to_string()),
            ApiError::InternalError(e) => internal_error("Internal error", format!("{e:#}")),
        };

        (status, Json(body)).into_response()
    }
}

fn internal_error(kind: &str, error: String) -> (StatusCode, ApiResponse<()>) {
    let error_id = Uuid::new_v4();
    tracing::error!(error_id = ?error_id, "{}: {}", kind, error);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ApiResponse::<()>::failure("Internal server error").with_error(error),
    )
}

/// Raw path segment that failed to parse, e.g. `abc` for `/api/devices/abc`.
fn rejected_segment(rejection: &PathRejection) -> String {
    if let PathRejection::FailedToDeserializePathParams(error) = rejection {
        match error.kind() {
            ErrorKind::ParseErrorAtKey { value, .. }
            | ErrorKind::ParseErrorAtIndex { value, .. }
            | ErrorKind::ParseError { value, .. } => return value.clone(),
            _ => {}
        }
    }

    rejection.body_text()
}
