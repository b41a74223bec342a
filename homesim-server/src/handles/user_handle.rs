use axum::routing::get;
use axum::{Extension, Json, Router, middleware};
use homesim_api::models::ApiResponse;

use crate::middlewares::{TokenState, auth};
use crate::services::TokenClaims;

pub fn user_router(token_state: TokenState) -> Router {
    Router::new()
        .route("/api/user", get(get_current_user))
        .route_layer(middleware::from_fn_with_state(token_state, auth))
}

#[utoipa::path(
    get,
    path = "/api/user",
    tag = "user",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Claims of the presented token", body = TokenClaims),
        (status = 400, description = "Missing authorization header"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_current_user(
    Extension(token_data): Extension<TokenClaims>,
) -> Json<ApiResponse<TokenClaims>> {
    Json(ApiResponse::data(token_data))
}
