use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use homesim_server::app::build_router;
use homesim_server::configs::{Auth, Storage};
use homesim_server::services::TokenService;
use homesim_server::tests::create_test_storage;
use serde_json::Value;
use tower::ServiceExt;

pub struct MockApp {
    pub storage: Arc<Storage>,
    pub token_service: Arc<TokenService>,
    pub token: String,
    pub router: Router,
}

impl MockApp {
    pub async fn new() -> Self {
        let storage = create_test_storage().await;
        let token_service = Arc::new(TokenService::new(Auth {
            secret: String::from("test"),
            expiration: 1000,
        }));
        let token = token_service.generate_token("simulator", "guest").unwrap().token;
        let router = build_router(storage.clone(), token_service.clone());

        Self {
            storage,
            token_service,
            token,
            router,
        }
    }

    /// Sends a JSON request and decodes the envelope.
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().uri(uri).method(method);
        let body = match body {
            Some(body) => {
                request = request.header("Content-Type", "application/json");
                Body::from(serde_json::to_string(&body).unwrap())
            }
            None => Body::empty(),
        };

        self.dispatch(request.body(body).unwrap()).await
    }

    /// Sends `body` verbatim, with an optional content type.
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        content_type: Option<&str>,
        body: &str,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().uri(uri).method(method);
        if let Some(content_type) = content_type {
            request = request.header("Content-Type", content_type);
        }

        self.dispatch(request.body(Body::from(body.to_string())).unwrap()).await
    }

    async fn dispatch(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, value)
    }
}
