use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use axum_extra::extract::WithRejection;
use homesim_api::models::*;
use serde_json::Value;

use crate::errors::{ApiError, PresetError};
use crate::models::Preset;
use crate::repositories::PresetRepository;
use crate::validation::{validate_create_preset, validate_update_preset};

#[derive(Clone)]
pub struct PresetState {
    pub preset_repository: Arc<PresetRepository>,
}

pub fn preset_router(preset_state: PresetState) -> Router {
    Router::new()
        .route("/api/presets", get(get_presets).post(create_preset))
        .route(
            "/api/presets/:preset_id",
            get(get_preset_by_id).put(update_preset).delete(delete_preset),
        )
        .route("/api/presets/:preset_id/load", get(load_preset))
        .with_state(preset_state)
}

async fn find_preset(state: &PresetState, preset_id: Id) -> Result<Preset, ApiError> {
    let preset = state
        .preset_repository
        .find_by_id(preset_id)
        .await?
        .ok_or(PresetError::PresetNotFound(preset_id))?;

    Ok(preset)
}

#[utoipa::path(
    get,
    path = "/api/presets",
    tag = "preset",
    responses(
        (status = 200, description = "Successfully retrieved preset list", body = Vec<PresetResponse>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_presets(
    State(state): State<PresetState>,
) -> Result<Json<ApiResponse<Vec<PresetResponse>>>, ApiError> {
    let presets = state.preset_repository.find_all().await?;

    Ok(Json(ApiResponse::data(
        presets.into_iter().map(PresetResponse::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/presets",
    tag = "preset",
    request_body = CreatePresetRequest,
    responses(
        (status = 201, description = "Preset created successfully", body = PresetResponse),
        (status = 422, description = "Validation error"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_preset(
    State(state): State<PresetState>,
    WithRejection(Json(body), _): WithRejection<Json<Value>, ApiError>,
) -> Result<(StatusCode, Json<ApiResponse<PresetResponse>>), ApiError> {
    let request = validate_create_preset(&body)?;
    let preset = Preset::new(request);

    let pool = state.preset_repository.get_pool();
    let mut tx = pool.begin().await?;

    let preset_id = state.preset_repository.create(&preset, &mut tx).await?;

    tx.commit().await?;

    let created_preset = find_preset(&state, preset_id).await?;

    tracing::info!(preset_id, devices = created_preset.devices.0.len(), "preset created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(created_preset.into()).with_message("Preset created successfully")),
    ))
}

#[utoipa::path(
    get,
    path = "/api/presets/{preset_id}",
    tag = "preset",
    params(
        ("preset_id" = i32, Path, description = "Preset ID")
    ),
    responses(
        (status = 200, description = "Successfully retrieved preset", body = PresetResponse),
        (status = 404, description = "Preset not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_preset_by_id(
    State(state): State<PresetState>,
    WithRejection(Path(preset_id), _): WithRejection<Path<Id>, PresetError>,
) -> Result<Json<ApiResponse<PresetResponse>>, ApiError> {
    let preset = find_preset(&state, preset_id).await?;

    Ok(Json(ApiResponse::data(preset.into())))
}

#[utoipa::path(
    put,
    path = "/api/presets/{preset_id}",
    tag = "preset",
    params(
        ("preset_id" = i32, Path, description = "Preset ID")
    ),
    request_body = UpdatePresetRequest,
    responses(
        (status = 200, description = "Preset updated successfully", body = PresetResponse),
        (status = 404, description = "Preset not found"),
        (status = 422, description = "Validation error"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn update_preset(
    State(state): State<PresetState>,
    WithRejection(Path(preset_id), _): WithRejection<Path<Id>, PresetError>,
    WithRejection(Json(body), _): WithRejection<Json<Value>, ApiError>,
) -> Result<Json<ApiResponse<PresetResponse>>, ApiError> {
    let request = validate_update_preset(&body)?;

    let mut preset = find_preset(&state, preset_id).await?;
    preset.apply(request);

    let pool = state.preset_repository.get_pool();
    let mut tx = pool.begin().await?;

    state
        .preset_repository
        .update(preset_id, &preset, &mut tx)
        .await?;

    tx.commit().await?;

    let updated_preset = find_preset(&state, preset_id).await?;

    tracing::info!(preset_id, "preset updated");

    Ok(Json(
        ApiResponse::data(updated_preset.into()).with_message("Preset updated successfully"),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/presets/{preset_id}",
    tag = "preset",
    params(
        ("preset_id" = i32, Path, description = "Preset ID")
    ),
    responses(
        (status = 200, description = "Preset deleted successfully"),
        (status = 404, description = "Preset not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_preset(
    State(state): State<PresetState>,
    WithRejection(Path(preset_id), _): WithRejection<Path<Id>, PresetError>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let pool = state.preset_repository.get_pool();
    let mut tx = pool.begin().await?;

    let deleted = state.preset_repository.delete(preset_id, &mut tx).await?;

    if !deleted {
        return Err(PresetError::PresetNotFound(preset_id).into());
    }

    tx.commit().await?;

    tracing::info!(preset_id, "preset deleted");

    Ok(Json(ApiResponse::<()>::message("Preset deleted successfully")))
}

/// Returns the stored snapshot as-is; nothing is materialized server side.
#[utoipa::path(
    get,
    path = "/api/presets/{preset_id}/load",
    tag = "preset",
    params(
        ("preset_id" = i32, Path, description = "Preset ID")
    ),
    responses(
        (status = 200, description = "Preset loaded successfully", body = PresetResponse),
        (status = 404, description = "Preset not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn load_preset(
    State(state): State<PresetState>,
    WithRejection(Path(preset_id), _): WithRejection<Path<Id>, PresetError>,
) -> Result<Json<ApiResponse<PresetResponse>>, ApiError> {
    let preset = find_preset(&state, preset_id).await?;

    Ok(Json(
        ApiResponse::data(preset.into()).with_message("Preset loaded successfully"),
    ))
}
