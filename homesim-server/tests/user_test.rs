use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

mod common;
use common::mock_app::MockApp;

async fn get_user(app: &MockApp, authorization: Option<String>) -> (StatusCode, Value) {
    let mut request = Request::builder().uri("/api/user").method(Method::GET);
    if let Some(authorization) = authorization {
        request = request.header("Authorization", authorization);
    }

    let response = app
        .router
        .clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_user_echoes_token_claims() {
    let app = MockApp::new().await;

    let (status, body) = get_user(&app, Some(format!("Bearer {}", app.token))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["sub"], json!("simulator"));
    assert_eq!(body["data"]["role"], json!("guest"));
}

#[tokio::test]
async fn test_user_without_token() {
    let app = MockApp::new().await;

    let (status, body) = get_user(&app, None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn test_user_with_invalid_token() {
    let app = MockApp::new().await;

    let (status, _) = get_user(&app, Some(String::from("Bearer not-a-token"))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_openapi_document_lists_routes() {
    let app = MockApp::new().await;

    let (status, body) = app.send(Method::GET, "/api/docs/openapi.json", None).await;

    assert_eq!(status, StatusCode::OK);
    let paths = body["paths"].as_object().unwrap();
    assert!(paths.contains_key("/api/devices"));
    assert!(paths.contains_key("/api/devices/{device_id}"));
    assert!(paths.contains_key("/api/presets/{preset_id}/load"));
    assert!(paths.contains_key("/api/user"));
}
