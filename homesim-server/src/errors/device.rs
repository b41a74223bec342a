use axum::extract::rejection::PathRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use homesim_api::models::Id;

use super::{ApiError, rejected_segment};

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("Device not found")]
    DeviceNotFound(Id),

    /// Path segment that cannot name any stored device
    #[error("Device not found")]
    InvalidDeviceId(String),
}

impl DeviceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DeviceError::DeviceNotFound(_) | DeviceError::InvalidDeviceId(_) => StatusCode::NOT_FOUND,
        }
    }

    pub fn detail(&self) -> String {
        match self {
            DeviceError::DeviceNotFound(id) => format!("No device with id {id}"),
            DeviceError::InvalidDeviceId(segment) => format!("No device with id {segment}"),
        }
    }
}

impl From<PathRejection> for DeviceError {
    fn from(rejection: PathRejection) -> Self {
        DeviceError::InvalidDeviceId(rejected_segment(&rejection))
    }
}

impl IntoResponse for DeviceError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
