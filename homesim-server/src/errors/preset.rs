use axum::extract::rejection::PathRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use homesim_api::models::Id;

use super::{ApiError, rejected_segment};

#[derive(Debug, thiserror::Error)]
pub enum PresetError {
    #[error("Preset not found")]
    PresetNotFound(Id),

    /// Path segment that cannot name any stored preset
    #[error("Preset not found")]
    InvalidPresetId(String),
}

impl PresetError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PresetError::PresetNotFound(_) | PresetError::InvalidPresetId(_) => StatusCode::NOT_FOUND,
        }
    }

    pub fn detail(&self) -> String {
        match self {
            PresetError::PresetNotFound(id) => format!("No preset with id {id}"),
            PresetError::InvalidPresetId(segment) => format!("No preset with id {segment}"),
        }
    }
}

impl From<PathRejection> for PresetError {
    fn from(rejection: PathRejection) -> Self {
        PresetError::InvalidPresetId(rejected_segment(&rejection))
    }
}

impl IntoResponse for PresetError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
