use axum::routing::get;
use axum::{Json, Router};
use homesim_api::models::*;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handles;
use crate::services::TokenClaims;

#[derive(OpenApi)]
#[openapi(
    paths(
        handles::get_devices,
        handles::create_device,
        handles::get_device_by_id,
        handles::update_device,
        handles::delete_device,
        handles::delete_all_devices,
        handles::get_presets,
        handles::create_preset,
        handles::get_preset_by_id,
        handles::update_preset,
        handles::delete_preset,
        handles::load_preset,
        handles::get_current_user,
    ),
    components(schemas(
        DeviceType,
        CreateDeviceRequest,
        UpdateDeviceRequest,
        DeviceResponse,
        DeviceTemplate,
        CreatePresetRequest,
        UpdatePresetRequest,
        PresetResponse,
        TokenClaims,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "device", description = "Simulated devices on the shared canvas"),
        (name = "preset", description = "Saved device templates"),
        (name = "user", description = "Token echo")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

pub fn docs_router() -> Router {
    Router::new().route("/api/docs/openapi.json", get(openapi))
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
