use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::configs::{SchemaManager, Settings, Storage};
use crate::docs::docs_router;
use crate::handles::*;
use crate::middlewares::TokenState;
use crate::repositories::{DeviceRepository, PresetRepository};
use crate::services::TokenService;

pub async fn create_app(settings: &Arc<Settings>) -> anyhow::Result<Router> {
    let storage = Arc::new(Storage::new(settings.database.clone(), SchemaManager::default()).await?);
    let token_service = Arc::new(TokenService::new(settings.auth.clone()));

    Ok(build_router(storage, token_service))
}

/// Wires every resource router onto shared storage.
pub fn build_router(storage: Arc<Storage>, token_service: Arc<TokenService>) -> Router {
    let device_state = DeviceState {
        device_repository: Arc::new(DeviceRepository::new(storage.clone())),
    };
    let preset_state = PresetState {
        preset_repository: Arc::new(PresetRepository::new(storage.clone())),
    };
    let token_state = TokenState { token_service };

    Router::new()
        .merge(device_router(device_state))
        .merge(preset_router(preset_state))
        .merge(user_router(token_state))
        .merge(docs_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
