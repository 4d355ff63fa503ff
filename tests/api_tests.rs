use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use dealer_catalog::config::{EnvironmentConfig, StorageConfig};
use dealer_catalog::routes::create_router;
use dealer_catalog::state::AppState;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "dealer-catalog-test-boundary";

struct TestApp {
    dir: TempDir,
    router: Router,
}

async fn create_test_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let config = EnvironmentConfig {
        environment: "test".to_string(),
        storage: StorageConfig {
            data_dir: dir.path().join("data"),
            uploads_dir: dir.path().join("uploads"),
            ..StorageConfig::default()
        },
        ..EnvironmentConfig::default()
    };
    let state = AppState::from_config(config).await.unwrap();
    TestApp {
        dir,
        router: create_router(state),
    }
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn create_vehicle(&self, fields: &[(&str, &str)], images: usize) -> (StatusCode, Value) {
        let request = Request::post("/api/admin/vehicles")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(fields, images)))
            .unwrap();
        self.send(request).await
    }

    fn uploaded_files(&self) -> usize {
        std::fs::read_dir(self.dir.path().join("uploads"))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

fn multipart_body(fields: &[(&str, &str)], images: usize) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for i in 0..images {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"images\"; filename=\"photo {i}.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(&[0xFF, 0xD8, 0xFF, 0xE0, i as u8]);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn fiat() -> Vec<(&'static str, &'static str)> {
    vec![
        ("title", "Fiat Panda 1.2"),
        ("type", "auto"),
        ("price", "15000"),
        ("year", "2019"),
        ("km", "42000"),
        ("fuel", "Benzina"),
        ("transmission", "Manuale"),
    ]
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app().await;
    let (status, body) = app.get("/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["environment"], "test");
}

#[tokio::test]
async fn test_create_then_query_by_type() {
    let app = create_test_app().await;

    let (status, body) = app.create_vehicle(&fiat(), 5).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    let id = body["data"]["id"].as_u64().unwrap();
    assert_eq!(body["data"]["images"].as_array().unwrap().len(), 5);
    assert_eq!(app.uploaded_files(), 5);

    let (status, body) = app
        .get("/api/vehicles?type=auto&sort=price-asc&page=1&limit=6")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["total"].as_u64().unwrap() >= 1);
    assert!(body["data"]
        .as_array()
        .unwrap()
        .iter()
        .any(|v| v["id"].as_u64() == Some(id)));
    assert_eq!(body["totalPages"], 1);
}

#[tokio::test]
async fn test_create_with_four_images_is_rejected() {
    let app = create_test_app().await;

    let (status, body) = app.create_vehicle(&fiat(), 4).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(app.uploaded_files(), 0);

    let (_, list) = app.get("/api/admin/vehicles").await;
    assert_eq!(list["count"], 0);
}

#[tokio::test]
async fn test_create_with_non_positive_price_is_rejected() {
    let app = create_test_app().await;

    let (status, body) = app
        .create_vehicle(&[("title", "Fiat Panda"), ("price", "gratis")], 5)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_get_unknown_vehicle() {
    let app = create_test_app().await;

    let (status, body) = app.get("/api/vehicles/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = app.get("/api/vehicles/not-a-number").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_query_defaults_malformed_parameters() {
    let app = create_test_app().await;
    app.create_vehicle(&fiat(), 5).await;

    let (status, body) = app
        .get("/api/vehicles?page=abc&limit=lots&sort=cheapest")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 6);
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn test_search_is_case_insensitive() {
    let app = create_test_app().await;
    app.create_vehicle(&fiat(), 5).await;

    let (_, body) = app.get("/api/vehicles?search=PAN").await;
    assert_eq!(body["total"], 1);

    let (_, body) = app.get("/api/vehicles?search=ducati").await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_update_appends_images() {
    let app = create_test_app().await;
    let (_, created) = app.create_vehicle(&fiat(), 5).await;
    let id = created["data"]["id"].as_u64().unwrap();

    let request = Request::put(format!("/api/admin/vehicles/{}", id))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(&[("price", "13900"), ("status", "reserved")], 2)))
        .unwrap();
    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["price"], 13900.0);
    assert_eq!(body["data"]["status"], "reserved");
    assert_eq!(body["data"]["title"], "Fiat Panda 1.2");
    assert_eq!(body["data"]["images"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn test_delete_image() {
    let app = create_test_app().await;
    let (_, created) = app.create_vehicle(&fiat(), 6).await;
    let id = created["data"]["id"].as_u64().unwrap();
    let image = created["data"]["images"][0].as_str().unwrap().to_string();

    let request = Request::delete(format!("/api/admin/vehicles/{}/images", id))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "imagePath": image }).to_string()))
        .unwrap();
    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["images"].as_array().unwrap().len(), 5);
    assert_eq!(app.uploaded_files(), 5);

    let missing = Request::delete(format!("/api/admin/vehicles/{}/images", id))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({}).to_string()))
        .unwrap();
    let (status, _) = app.send(missing).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_vehicle_removes_files() {
    let app = create_test_app().await;
    let (_, created) = app.create_vehicle(&fiat(), 5).await;
    let id = created["data"]["id"].as_u64().unwrap();

    let (status, body) = app
        .send(
            Request::delete(format!("/api/admin/vehicles/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedId"], id);
    assert_eq!(body["assetFailures"], json!([]));
    assert_eq!(app.uploaded_files(), 0);

    let (status, _) = app.get(&format!("/api/vehicles/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(
            Request::delete(format!("/api/admin/vehicles/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_uploads_are_served() {
    let app = create_test_app().await;
    let (_, created) = app.create_vehicle(&fiat(), 5).await;
    let image = created["data"]["images"][0].as_str().unwrap().to_string();

    let response = app
        .router
        .clone()
        .oneshot(Request::get(image.as_str()).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_endpoint() {
    let app = create_test_app().await;
    let (status, body) = app.get("/api/nothing-here").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "success": false, "error": "Endpoint not found" }));
}

#[tokio::test]
async fn test_reload_picks_up_document_edits() {
    let app = create_test_app().await;
    let (_, body) = app.create_vehicle(&fiat(), 5).await;
    let id = body["data"]["id"].as_u64().unwrap();

    let path = app.dir.path().join("data").join("vehicles.json");
    let mut document: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    document[0]["title"] = json!("Fiat Panda Cross");
    std::fs::write(&path, serde_json::to_vec(&document).unwrap()).unwrap();

    let (_, body) = app.get(&format!("/api/vehicles/{id}")).await;
    assert_eq!(body["data"]["title"], "Fiat Panda 1.2");

    let (status, body) = app
        .send(Request::post("/api/admin/reload").body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);

    let (_, body) = app.get(&format!("/api/vehicles/{id}")).await;
    assert_eq!(body["data"]["title"], "Fiat Panda Cross");
}
