//! API integration tests for the PixelHub server
//!
//! Runs the full router, middleware included, over in-memory repositories.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::{Duration, Utc};
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{dataset_body, TestApp};

// ============================================================================
// Root and health
// ============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::new();
    let (status, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_root_endpoint() {
    let app = TestApp::new();
    let (status, body) = app.get("/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "PixelHub Server");
}

// ============================================================================
// Datasets
// ============================================================================

#[tokio::test]
async fn test_create_and_get_dataset() {
    let app = TestApp::new();
    let created = app
        .create_dataset(dataset_body("sprites", &["retro"], &["Ada"]))
        .await;

    assert_eq!(created["version"], 1);
    assert!(created["previous_version_id"].is_null());
    assert_eq!(created["kind"]["type"], "pix");
    assert_eq!(created["files"].as_array().unwrap().len(), 2);

    let id = created["id"].as_i64().unwrap();
    let (status, body) = app.get(&format!("/api/v1/datasets/{}", id)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["metadata"]["title"], "sprites");
    assert_eq!(body["data"]["download_count"], 0);
    assert_eq!(body["data"]["total_size"], 150);
    assert!(body["data"]["doi_url"].is_null());
}

#[tokio::test]
async fn test_create_dataset_validation_errors() {
    let app = TestApp::new();

    let (status, body) = app
        .post("/api/v1/datasets", json!({ "user_id": 1, "title": "   " }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, _) = app
        .post(
            "/api/v1/datasets",
            json!({ "user_id": 1, "title": "ok", "publication_doi": "not-a-doi" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/v1/datasets",
            json!({ "user_id": 1, "title": "ok", "files": [{ "name": "x", "size": -5 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_unknown_dataset_is_404() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/v1/datasets/999").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_list_datasets_newest_first_with_pagination() {
    let app = TestApp::new();
    for title in ["one", "two", "three"] {
        app.create_dataset(dataset_body(title, &[], &[])).await;
    }

    let (status, body) = app.get("/api/v1/datasets?page=1&per_page=2").await;

    assert_eq!(status, StatusCode::OK);
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["metadata"]["title"], "three");
    assert_eq!(items[1]["metadata"]["title"], "two");
    assert_eq!(body["meta"]["pagination"]["total"], 3);
    assert_eq!(body["meta"]["pagination"]["has_next"], true);
}

#[tokio::test]
async fn test_delete_dataset() {
    let app = TestApp::new();
    let created = app.create_dataset(dataset_body("gone", &[], &[])).await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = app.delete(&format!("/api/v1/datasets/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted"], true);

    let (status, _) = app.get(&format!("/api/v1/datasets/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete(&format!("/api/v1/datasets/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Versions
// ============================================================================

#[tokio::test]
async fn test_new_version_and_history() {
    let app = TestApp::new();
    let root = app
        .create_dataset(dataset_body("tiles", &["retro"], &["Ada"]))
        .await;
    let root_id = root["id"].as_i64().unwrap();

    let v2 = app
        .create_dataset(json!({
            "user_id": 1,
            "parent_id": root_id,
            "description": "second pass"
        }))
        .await;
    let v2_id = v2["id"].as_i64().unwrap();
    assert_eq!(v2["version"], 2);
    assert_eq!(v2["previous_version_id"], root_id);
    assert_eq!(v2["metadata"]["title"], "tiles");
    assert_eq!(v2["files"].as_array().unwrap().len(), 2);

    let v3 = app
        .create_dataset(json!({ "user_id": 1, "parent_id": v2_id, "title": "tiles hd" }))
        .await;
    let v3_id = v3["id"].as_i64().unwrap();

    // Any member of the chain yields the whole chain
    for id in [root_id, v2_id, v3_id] {
        let (status, body) = app.get(&format!("/api/v1/datasets/{}/history", id)).await;
        assert_eq!(status, StatusCode::OK);

        let versions: Vec<i64> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["version"].as_i64().unwrap())
            .collect();
        assert_eq!(versions, vec![1, 2, 3]);
        assert_eq!(body["meta"]["count"], 3);
    }
}

#[tokio::test]
async fn test_history_of_unknown_dataset_is_empty() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/v1/datasets/77/history").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["meta"]["count"], 0);
}

#[tokio::test]
async fn test_version_of_unknown_parent_is_404() {
    let app = TestApp::new();
    let (status, _) = app
        .post("/api/v1/datasets", json!({ "user_id": 1, "parent_id": 12 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_compare_versions() {
    let app = TestApp::new();
    let root = app.create_dataset(dataset_body("maps", &["a"], &["Ada"])).await;
    let root_id = root["id"].as_i64().unwrap();

    let v2 = app
        .create_dataset(json!({
            "user_id": 1,
            "parent_id": root_id,
            "title": "maps v2",
            "files": [
                { "name": "maps_a.pix", "size": 100, "checksum": "aaa" },
                { "name": "maps_b.pix", "size": 75, "checksum": "ccc" },
                { "name": "maps_c.pix", "size": 10, "checksum": "ddd" }
            ]
        }))
        .await;
    let v2_id = v2["id"].as_i64().unwrap();

    let (status, body) = app
        .get(&format!("/api/v1/datasets/{}/compare/{}", root_id, v2_id))
        .await;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert_eq!(data["old_id"], root_id);
    assert_eq!(data["new_id"], v2_id);

    let changes = data["metadata"].as_array().unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0]["field"], "Title");
    assert_eq!(changes[0]["old"], "maps");
    assert_eq!(changes[0]["new"], "maps v2");

    assert_eq!(data["files"]["added"][0]["name"], "maps_c.pix");
    assert_eq!(data["files"]["modified"][0]["new"]["name"], "maps_b.pix");
    assert_eq!(data["files"]["unchanged"][0]["name"], "maps_a.pix");
    assert!(data["files"]["deleted"].as_array().unwrap().is_empty());
}

// ============================================================================
// Activity
// ============================================================================

#[tokio::test]
async fn test_record_download_counts_and_reuses_cookie() {
    let app = TestApp::new();
    let created = app.create_dataset(dataset_body("dl", &[], &[])).await;
    let id = created["id"].as_i64().unwrap();
    let uri = format!("/api/v1/datasets/{}/downloads", id);

    let (status, body) = app.post_empty(&uri).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["download_count"], 1);
    let cookie = body["data"]["cookie"].as_str().unwrap().to_string();
    assert!(!cookie.is_empty());

    let (status, body) = app.post(&uri, json!({ "cookie": cookie, "user_id": 4 })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["cookie"], cookie.as_str());
    assert_eq!(body["data"]["download_count"], 2);

    let (_, body) = app.get(&format!("/api/v1/datasets/{}", id)).await;
    assert_eq!(body["data"]["download_count"], 2);
}

#[tokio::test]
async fn test_download_of_unknown_dataset_is_404() {
    let app = TestApp::new();
    let (status, _) = app.post_empty("/api/v1/datasets/5/downloads").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_view_is_recorded_once_per_cookie() {
    let app = TestApp::new();
    let created = app.create_dataset(dataset_body("seen", &[], &[])).await;
    let uri = format!("/api/v1/datasets/{}/views", created["id"]);

    let (status, body) = app.post(&uri, json!({ "cookie": "c-1" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["recorded"], true);

    let (_, body) = app.post(&uri, json!({ "cookie": "c-1" })).await;
    assert_eq!(body["data"]["recorded"], false);

    let (_, body) = app.post(&uri, json!({ "cookie": "c-2" })).await;
    assert_eq!(body["data"]["recorded"], true);
}

// ============================================================================
// Recommendations and leaderboard
// ============================================================================

#[tokio::test]
async fn test_recommendations_ranked_by_shared_metadata() {
    let app = TestApp::new();
    let target = app
        .create_dataset(dataset_body("target", &["retro", "rpg"], &["Ada", "Bob"]))
        .await;
    let close = app
        .create_dataset(dataset_body("close", &["RPG ", "retro"], &["Ada"]))
        .await;
    let far = app
        .create_dataset(dataset_body("far", &["space"], &["Zed"]))
        .await;

    let (status, body) = app
        .get(&format!("/api/v1/datasets/{}/recommendations", target["id"]))
        .await;
    assert_eq!(status, StatusCode::OK);

    let ranked = body["data"].as_array().unwrap();
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0]["id"], close["id"]);
    // Two tags, one author, same publication type
    assert_eq!(ranked[0]["score"], 4.0);
    assert_eq!(ranked[1]["id"], far["id"]);
    assert_eq!(ranked[1]["score"], 1.0);
    assert!(ranked.iter().all(|d| d["id"] != target["id"]));
}

#[tokio::test]
async fn test_recommendations_break_ties_by_downloads_and_respect_limit() {
    let app = TestApp::new();
    let target = app.create_dataset(dataset_body("target", &[], &[])).await;
    app.create_dataset(dataset_body("quiet", &[], &[])).await;
    let popular = app.create_dataset(dataset_body("popular", &[], &[])).await;
    app.create_dataset(dataset_body("other", &[], &[])).await;

    app.post_empty(&format!("/api/v1/datasets/{}/downloads", popular["id"]))
        .await;

    let (_, body) = app
        .get(&format!(
            "/api/v1/datasets/{}/recommendations?limit=2",
            target["id"]
        ))
        .await;
    let ranked = body["data"].as_array().unwrap();
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0]["id"], popular["id"]);
    assert_eq!(ranked[0]["download_count"], 1);
    assert_eq!(ranked[1]["download_count"], 0);
    assert!(ranked.iter().all(|d| d["score"] == 1.0));
}

#[tokio::test]
async fn test_leaderboard_only_lists_synchronized_datasets_in_window() {
    let app = TestApp::new();
    let published = app.create_dataset(dataset_body("published", &[], &[])).await;
    let draft = app.create_dataset(dataset_body("draft", &[], &[])).await;
    let published_id = published["id"].as_i64().unwrap();
    let draft_id = draft["id"].as_i64().unwrap();

    app.repos
        .datasets
        .record_publication(published_id, 1, Some("10.5281/zenodo.1000001".to_string()))
        .await
        .unwrap();

    for _ in 0..3 {
        app.post_empty(&format!("/api/v1/datasets/{}/downloads", published_id))
            .await;
        app.post_empty(&format!("/api/v1/datasets/{}/downloads", draft_id))
            .await;
    }

    let (status, body) = app.get("/api/v1/datasets/leaderboard?period=week").await;
    assert_eq!(status, StatusCode::OK);
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["id"], published_id);
    assert_eq!(entries[0]["downloads"], 3);
}

#[tokio::test]
async fn test_leaderboard_rejects_unknown_period() {
    let app = TestApp::new();
    let (status, _) = app.get("/api/v1/datasets/leaderboard?period=year").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_leaderboard_month_includes_older_downloads() {
    let store = pixelhub_server::db::memory::MemoryStore::new();
    let repos = pixelhub_server::db::Repositories::from_store(store.clone());
    let dataset = pixelhub_server::features::datasets::commands::create::handle(
        &repos,
        serde_json::from_value(dataset_body("old", &[], &[])).unwrap(),
    )
    .await
    .unwrap();
    repos
        .datasets
        .record_publication(dataset.id, 1, Some("10.5281/zenodo.1000001".to_string()))
        .await
        .unwrap();
    store
        .record_download_at(dataset.id, "c", Utc::now() - Duration::days(10))
        .await
        .unwrap();

    use pixelhub_server::features::datasets::queries::{leaderboard, LeaderboardQuery};
    let week = leaderboard::handle(
        &repos,
        LeaderboardQuery {
            period: Some("week".to_string()),
        },
    )
    .await
    .unwrap();
    assert!(week.is_empty());

    let month = leaderboard::handle(
        &repos,
        LeaderboardQuery {
            period: Some("month".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(month.len(), 1);
    assert_eq!(month[0].downloads, 1);
}

// ============================================================================
// Statistics
// ============================================================================

#[tokio::test]
async fn test_stats() {
    let app = TestApp::new();
    let a = app.create_dataset(dataset_body("a", &[], &["Ada", "Bob"])).await;
    app.create_dataset(dataset_body("b", &[], &["Ada"])).await;
    app.post_empty(&format!("/api/v1/datasets/{}/downloads", a["id"]))
        .await;
    app.post(&format!("/api/v1/datasets/{}/views", a["id"]), json!({ "cookie": "v" }))
        .await;

    let (status, body) = app.get("/api/v1/stats").await;
    assert_eq!(status, StatusCode::OK);
    let stats = &body["data"];
    assert_eq!(stats["datasets"], 2);
    assert_eq!(stats["synchronized_datasets"], 0);
    assert_eq!(stats["files"], 4);
    assert_eq!(stats["downloads"], 1);
    assert_eq!(stats["views"], 1);
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
async fn test_cart_flow_and_checkout() {
    let app = TestApp::new();
    let source = app.create_dataset(dataset_body("src", &[], &["Ada"])).await;
    let file_a = source["files"][0]["id"].as_i64().unwrap();
    let file_b = source["files"][1]["id"].as_i64().unwrap();

    let (status, _) = app
        .post("/api/v1/carts/7/items", json!({ "file_id": file_a }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app
        .post("/api/v1/carts/7/items", json!({ "file_id": file_b }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // Same file twice is rejected
    let (status, _) = app
        .post("/api/v1/carts/7/items", json!({ "file_id": file_a }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.get("/api/v1/carts/7").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["total_size"], 150);

    let (status, body) = app
        .delete(&format!("/api/v1/carts/7/items/{}", file_b))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["removed"], 1);

    let (status, body) = app
        .post(
            "/api/v1/carts/7/checkout",
            json!({ "title": "bundle", "authors": [{ "name": "Cy" }] }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let bundle = &body["data"];
    assert_eq!(bundle["version"], 1);
    assert_eq!(bundle["user_id"], 7);
    assert_eq!(bundle["metadata"]["title"], "bundle");
    assert_eq!(bundle["files"].as_array().unwrap().len(), 1);
    assert_eq!(bundle["files"][0]["name"], "src_a.pix");

    let (_, body) = app.get("/api/v1/carts/7").await;
    assert!(body["data"]["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_checkout_of_empty_cart_fails() {
    let app = TestApp::new();
    let (status, body) = app
        .post("/api/v1/carts/3/checkout", json!({ "title": "nothing" }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Cart is empty");
}

#[tokio::test]
async fn test_add_unknown_file_to_cart_is_404() {
    let app = TestApp::new();
    let (status, _) = app
        .post("/api/v1/carts/3/items", json!({ "file_id": 4040 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_clear_cart() {
    let app = TestApp::new();
    let source = app.create_dataset(dataset_body("c", &[], &[])).await;
    for file in source["files"].as_array().unwrap() {
        app.post("/api/v1/carts/2/items", json!({ "file_id": file["id"] }))
            .await;
    }

    let (status, body) = app.delete("/api/v1/carts/2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["removed"], 2);
}

// ============================================================================
// Badges
// ============================================================================

async fn raw_get(app: &TestApp, uri: &str) -> axum::response::Response {
    app.router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_badge_svg_headers_and_body() {
    let app = TestApp::new();
    let created = app
        .create_dataset(dataset_body("Tom & Jerry", &[], &[]))
        .await;
    let id = created["id"].as_i64().unwrap();

    let response = raw_get(&app, &format!("/badge/{}.svg", id)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert_eq!(headers[header::CONTENT_TYPE], "image/svg+xml");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(headers[header::CACHE_CONTROL], "no-cache");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        format!("attachment; filename=\"badge_{}.svg\"", id).as_str()
    );

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let svg = String::from_utf8(body.to_vec()).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("Tom &amp; Jerry"));
}

#[tokio::test]
async fn test_inline_badge_has_no_attachment() {
    let app = TestApp::new();
    let created = app.create_dataset(dataset_body("inline", &[], &[])).await;

    let response = raw_get(&app, &format!("/badge/{}/svg", created["id"])).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::CONTENT_DISPOSITION).is_none());
}

#[tokio::test]
async fn test_badge_embed_snippets() {
    let app = TestApp::new();
    let created = app.create_dataset(dataset_body("embed", &[], &[])).await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = app.get(&format!("/badge/{}/embed", id)).await;
    assert_eq!(status, StatusCode::OK);

    let svg_url = format!("{}/badge/{}/svg", app.site.public_url, id);
    assert!(body["markdown"].as_str().unwrap().contains(&svg_url));
    assert!(body["html"].as_str().unwrap().contains(&svg_url));
}

#[tokio::test]
async fn test_badge_for_unknown_dataset_is_404() {
    let app = TestApp::new();
    let response = raw_get(&app, "/badge/404.svg").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// PIX checker
// ============================================================================

async fn post_model(app: &TestApp, content: &str) -> (StatusCode, serde_json::Value) {
    app.request(
        Request::builder()
            .uri("/api/v1/pixchecker/check")
            .method("POST")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from(content.to_string()))
            .unwrap(),
    )
    .await
}

#[tokio::test]
async fn test_pixchecker_accepts_valid_model() {
    let app = TestApp::new();
    let (status, body) = post_model(&app, "sprite{\n  width: 16\n}\n").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Valid Model" }));
}

#[tokio::test]
async fn test_pixchecker_lists_every_error() {
    let app = TestApp::new();
    let (status, body) = post_model(&app, "sprite{\n  width = 16\n  data: {1}\n").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 3);
    assert!(errors[0].as_str().unwrap().starts_with("Line 2: Invalid attribute format"));
    assert!(errors[1].as_str().unwrap().starts_with("Line 3: Attribute value must not contain"));
    assert_eq!(
        errors[2],
        "Unexpected end of file: missing closing '}' for element \"sprite\""
    );
}

#[tokio::test]
async fn test_pixchecker_valid_file() {
    let app = TestApp::new();
    let created = app.create_dataset(dataset_body("checked", &[], &[])).await;
    let file_id = created["files"][0]["id"].as_i64().unwrap();

    let (status, body) = app.get(&format!("/api/v1/pixchecker/valid/{}", file_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "file_id": file_id }));
}

#[tokio::test]
async fn test_pixchecker_valid_unknown_file_is_404() {
    let app = TestApp::new();
    let (status, _) = app.get("/api/v1/pixchecker/valid/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
