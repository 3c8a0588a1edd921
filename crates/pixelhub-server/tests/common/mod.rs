//! Shared helpers for PixelHub server integration tests
//!
//! Every test builds its own router over fresh in-memory repositories. The
//! deposition client points at whatever URL the test passes in: a live
//! fakenodo bound to an ephemeral port, a wiremock server, or an address
//! nothing listens on.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use pixelhub_server::{
    api,
    config::{CorsConfig, SiteConfig, ZenodoConfig},
    db::Repositories,
    features::{zenodo::ZenodoClient, FeatureState},
};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Port 9 (discard) is closed on test machines, so requests fail fast.
pub const UNREACHABLE_ZENODO_URL: &str = "http://127.0.0.1:9/api";

pub struct TestApp {
    pub router: Router,
    pub repos: Repositories,
    pub site: SiteConfig,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_zenodo_url(UNREACHABLE_ZENODO_URL)
    }

    pub fn with_zenodo_url(url: &str) -> Self {
        let repos = Repositories::in_memory();
        let site = SiteConfig {
            environment: "development".to_string(),
            domain: "localhost:5000".to_string(),
            public_url: "http://localhost:5000".to_string(),
        };
        let zenodo = ZenodoClient::new(&ZenodoConfig {
            url: url.to_string(),
            access_token: None,
            timeout_secs: 5,
        })
        .unwrap();

        let state = FeatureState::new(repos.clone(), zenodo, site.clone());
        let cors = CorsConfig {
            allowed_origins: vec![],
            allow_credentials: false,
        };

        Self {
            router: api::create_router(state, &cors),
            repos,
            site,
        }
    }

    pub async fn request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(
            Request::builder()
                .uri(uri)
                .method("POST")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn post_empty(&self, uri: &str) -> (StatusCode, Value) {
        self.request(
            Request::builder()
                .uri(uri)
                .method("POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(
            Request::builder()
                .uri(uri)
                .method("DELETE")
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Create a dataset through the API and return its JSON representation.
    pub async fn create_dataset(&self, body: Value) -> Value {
        let (status, json) = self.post("/api/v1/datasets", body).await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", json);
        json["data"].clone()
    }
}

/// Request body for a root dataset with two files.
pub fn dataset_body(title: &str, tags: &[&str], authors: &[&str]) -> Value {
    json!({
        "user_id": 1,
        "title": title,
        "description": format!("{} description", title),
        "publication_type": "article",
        "tags": tags,
        "authors": authors.iter().map(|name| json!({ "name": name })).collect::<Vec<_>>(),
        "files": [
            { "name": format!("{}_a.pix", title), "size": 100, "checksum": "aaa" },
            { "name": format!("{}_b.pix", title), "size": 50, "checksum": "bbb" }
        ],
        "kind": { "type": "pix", "games_count": 2 }
    })
}
