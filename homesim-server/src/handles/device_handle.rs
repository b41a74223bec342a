use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use axum_extra::extract::WithRejection;
use homesim_api::models::*;
use serde_json::Value;

use crate::errors::{ApiError, DeviceError};
use crate::models::Device;
use crate::repositories::DeviceRepository;
use crate::validation::{validate_create_device, validate_update_device};

#[derive(Clone)]
pub struct DeviceState {
    pub device_repository: Arc<DeviceRepository>,
}

pub fn device_router(device_state: DeviceState) -> Router {
    Router::new()
        .route(
            "/api/devices",
            get(get_devices).post(create_device).delete(delete_all_devices),
        )
        .route(
            "/api/devices/:device_id",
            get(get_device_by_id).put(update_device).delete(delete_device),
        )
        .with_state(device_state)
}

#[utoipa::path(
    get,
    path = "/api/devices",
    tag = "device",
    responses(
        (status = 200, description = "Successfully retrieved device list", body = Vec<DeviceResponse>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_devices(
    State(state): State<DeviceState>,
) -> Result<Json<ApiResponse<Vec<DeviceResponse>>>, ApiError> {
    let devices = state.device_repository.find_all().await?;

    Ok(Json(ApiResponse::data(
        devices.into_iter().map(DeviceResponse::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/devices",
    tag = "device",
    request_body = CreateDeviceRequest,
    responses(
        (status = 201, description = "Device created successfully", body = DeviceResponse),
        (status = 422, description = "Validation error"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_device(
    State(state): State<DeviceState>,
    WithRejection(Json(body), _): WithRejection<Json<Value>, ApiError>,
) -> Result<(StatusCode, Json<ApiResponse<DeviceResponse>>), ApiError> {
    let request = validate_create_device(&body)?;
    let device = Device::new(request);

    let pool = state.device_repository.get_pool();
    let mut tx = pool.begin().await?;

    let device_id = state.device_repository.create(&device, &mut tx).await?;

    tx.commit().await?;

    let created_device = state
        .device_repository
        .find_by_id(device_id)
        .await?
        .ok_or(DeviceError::DeviceNotFound(device_id))?;

    tracing::info!(device_id, device_type = %created_device.device_type, "device created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(created_device.into()).with_message("Device created successfully")),
    ))
}

#[utoipa::path(
    get,
    path = "/api/devices/{device_id}",
    tag = "device",
    params(
        ("device_id" = i32, Path, description = "Device ID")
    ),
    responses(
        (status = 200, description = "Successfully retrieved device", body = DeviceResponse),
        (status = 404, description = "Device not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_device_by_id(
    State(state): State<DeviceState>,
    WithRejection(Path(device_id), _): WithRejection<Path<Id>, DeviceError>,
) -> Result<Json<ApiResponse<DeviceResponse>>, ApiError> {
    let device = state
        .device_repository
        .find_by_id(device_id)
        .await?
        .ok_or(DeviceError::DeviceNotFound(device_id))?;

    Ok(Json(ApiResponse::data(device.into())))
}

#[utoipa::path(
    put,
    path = "/api/devices/{device_id}",
    tag = "device",
    params(
        ("device_id" = i32, Path, description = "Device ID")
    ),
    request_body = UpdateDeviceRequest,
    responses(
        (status = 200, description = "Device updated successfully", body = DeviceResponse),
        (status = 404, description = "Device not found"),
        (status = 422, description = "Validation error"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn update_device(
    State(state): State<DeviceState>,
    WithRejection(Path(device_id), _): WithRejection<Path<Id>, DeviceError>,
    WithRejection(Json(body), _): WithRejection<Json<Value>, ApiError>,
) -> Result<Json<ApiResponse<DeviceResponse>>, ApiError> {
    let request = validate_update_device(&body)?;

    let mut device = state
        .device_repository
        .find_by_id(device_id)
        .await?
        .ok_or(DeviceError::DeviceNotFound(device_id))?;

    device.apply(request);

    let pool = state.device_repository.get_pool();
    let mut tx = pool.begin().await?;

    state
        .device_repository
        .update(device_id, &device, &mut tx)
        .await?;

    tx.commit().await?;

    let updated_device = state
        .device_repository
        .find_by_id(device_id)
        .await?
        .ok_or(DeviceError::DeviceNotFound(device_id))?;

    tracing::info!(device_id, "device updated");

    Ok(Json(
        ApiResponse::data(updated_device.into()).with_message("Device updated successfully"),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/devices/{device_id}",
    tag = "device",
    params(
        ("device_id" = i32, Path, description = "Device ID")
    ),
    responses(
        (status = 200, description = "Device deleted successfully"),
        (status = 404, description = "Device not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_device(
    State(state): State<DeviceState>,
    WithRejection(Path(device_id), _): WithRejection<Path<Id>, DeviceError>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let pool = state.device_repository.get_pool();
    let mut tx = pool.begin().await?;

    let deleted = state.device_repository.delete(device_id, &mut tx).await?;

    if !deleted {
        return Err(DeviceError::DeviceNotFound(device_id).into());
    }

    tx.commit().await?;

    tracing::info!(device_id, "device deleted");

    Ok(Json(ApiResponse::<()>::message("Device deleted successfully")))
}

#[utoipa::path(
    delete,
    path = "/api/devices",
    tag = "device",
    responses(
        (status = 200, description = "All devices deleted successfully"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_all_devices(
    State(state): State<DeviceState>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let pool = state.device_repository.get_pool();
    let mut tx = pool.begin().await?;

    let removed = state.device_repository.delete_all(&mut tx).await?;

    tx.commit().await?;

    tracing::info!(removed, "all devices deleted");

    Ok(Json(ApiResponse::<()>::message("All devices deleted successfully")))
}
