#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use tourline_api::auth::jwt::{generate_access_token, JwtConfig};
use tourline_api::config::ServerConfig;
use tourline_api::router::build_app_router;
use tourline_api::state::AppState;
use tourline_core::representation::ProfitStrategy;
use tourline_core::types::EntityId;
use tourline_db::repositories::MemoryTourRepo;

/// Manager owning the Villains tour in the demo data.
pub const KEVIN: EntityId = Uuid::from_u128(0xfec0a4d6_5830_4eb8_8024_272bd5d6d2bb);
/// Manager owning the Skeleton Tree tour in the demo data.
pub const SVEN: EntityId = Uuid::from_u128(0xc3b7f625_c07f_4d7d_9be1_ddff8ff93b4d);
pub const QOTSA: EntityId = Uuid::from_u128(0x25320c5e_f58a_4b1f_b63a_8ee07a840bdf);
pub const BAD_SEEDS: EntityId = Uuid::from_u128(0x83b126b9_d7bf_4f50_96dc_860884155f8b);
/// Tour with one show, managed by [`KEVIN`].
pub const VILLAINS: EntityId = Uuid::from_u128(0xc7ba6add_09c4_45f8_8dd0_eaca221e5d93);
/// Tour without shows, managed by [`SVEN`].
pub const SKELETON_TREE: EntityId = Uuid::from_u128(0xf67ba678_b6e0_4307_afd9_e804c23b3cd3);

pub const PATCH_CONTENT_TYPE: &str = "application/json-patch+json";

/// Build a test `ServerConfig` with safe defaults.
///
/// No database URL, no fallback manager, recorded profits.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:4200".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
        database_url: None,
        fallback_manager_id: None,
        profit_strategy: ProfitStrategy::Recorded,
        log_json: false,
    }
}

/// Full application router over a seeded in-memory store.
pub struct TestApp {
    pub router: Router,
    pub repo: Arc<MemoryTourRepo>,
    pub config: ServerConfig,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    /// Build the app with the same middleware stack `main.rs` uses.
    pub async fn with_config(config: ServerConfig) -> Self {
        let repo = Arc::new(MemoryTourRepo::with_demo_data().await);
        let state = AppState::new(repo.clone(), config.clone()).unwrap();
        let router = build_app_router(state, &config);
        Self {
            router,
            repo,
            config,
        }
    }

    /// Bearer token for `subject` with `role`.
    pub fn token(&self, subject: impl ToString, role: &str) -> String {
        generate_access_token(&subject.to_string(), role, &self.config.jwt).unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, token: Option<&str>, accept: Option<&str>) -> Response {
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(accept) = accept {
            builder = builder.header(ACCEPT, accept);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post(
        &self,
        uri: &str,
        token: Option<&str>,
        content_type: &str,
        body: &Value,
    ) -> Response {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, content_type);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// PATCH with a raw body so tests can send empty or malformed documents.
    pub async fn patch_raw(&self, uri: &str, token: Option<&str>, body: String) -> Response {
        let mut builder = Request::builder()
            .method(Method::PATCH)
            .uri(uri)
            .header(CONTENT_TYPE, PATCH_CONTENT_TYPE);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(builder.body(Body::from(body)).unwrap()).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, document: &Value) -> Response {
        self.patch_raw(uri, token, document.to_string()).await
    }
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn tour_uri(id: EntityId) -> String {
    format!("/api/tours/{id}")
}
