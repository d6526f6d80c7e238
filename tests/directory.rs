mod common;

use axum::{body::to_bytes, http::Request, Router};
use common::{sample_gpx, test_config, FakeArchive};
use ridewx_rs::{config::Config, pipeline::aggregate::BatchPolicy, routes, state::AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app(config: Config) -> Router {
    routes::router().with_state(AppState::new(config))
}

fn directory_request(directory: &str) -> Request<axum::body::Body> {
    Request::builder()
        .uri("/api/enrich/directory")
        .method("POST")
        .header("content-type", "application/json")
        .body(axum::body::Body::from(
            json!({ "directory": directory }).to_string(),
        ))
        .expect("request")
}

#[tokio::test]
async fn directory_returns_one_table_per_file() {
    let fake = FakeArchive::healthy();
    let url = fake.spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let config = test_config(url, dir.path());

    let rides = config.track_root.join("june");
    std::fs::create_dir_all(&rides).expect("mkdir");
    std::fs::write(rides.join("morning.gpx"), sample_gpx()).expect("write");
    std::fs::write(rides.join("evening.gpx"), sample_gpx()).expect("write");
    std::fs::write(rides.join("readme.md"), "ignored").expect("write");

    let response = app(config)
        .oneshot(directory_request("june"))
        .await
        .expect("response");
    assert_eq!(response.status(), axum::http::StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json: Value = serde_json::from_slice(&body).expect("json");
    let tables = json["tables"].as_array().expect("tables");

    assert_eq!(tables.len(), 2);
    assert_eq!(tables[0]["filename"], "evening.gpx");
    assert_eq!(tables[1]["filename"], "morning.gpx");
    for table in tables {
        let records = table["table"]["records"].as_array().expect("records");
        assert_eq!(records.len(), 4);
        assert!(records.iter().all(|r| r["filename"] == table["filename"]));
        assert_eq!(table["summary"]["rows"], 4);
    }

    // identical files share both weather requests
    assert_eq!(fake.hits(), 2);
}

#[tokio::test]
async fn directory_skips_bad_files_when_configured() {
    let fake = FakeArchive::healthy();
    let url = fake.spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = test_config(url, dir.path());

    let rides = config.track_root.join("mixed");
    std::fs::create_dir_all(&rides).expect("mkdir");
    std::fs::write(rides.join("good.gpx"), sample_gpx()).expect("write");
    std::fs::write(rides.join("broken.gpx"), "<gpx><trk></trk></gpx>").expect("write");

    let response = app(config.clone())
        .oneshot(directory_request("mixed"))
        .await
        .expect("response");
    assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);

    config.batch_policy = BatchPolicy::Skip;
    let response = app(config)
        .oneshot(directory_request("mixed"))
        .await
        .expect("response");
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json: Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(json["tables"].as_array().expect("tables").len(), 1);
}

#[tokio::test]
async fn directory_outside_track_root_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = test_config("http://127.0.0.1:1/".to_string(), dir.path());
    std::fs::create_dir_all(&config.track_root).expect("mkdir");

    for path in ["../", "/etc", "june/../../"] {
        let response = app(config.clone())
            .oneshot(directory_request(path))
            .await
            .expect("response");
        assert_eq!(
            response.status(),
            axum::http::StatusCode::BAD_REQUEST,
            "{path}"
        );
    }

    let response = app(config)
        .oneshot(directory_request("missing"))
        .await
        .expect("response");
    assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn directory_naming_a_file_is_not_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = test_config("http://127.0.0.1:1/".to_string(), dir.path());
    std::fs::create_dir_all(&config.track_root).expect("mkdir");
    std::fs::write(config.track_root.join("ride.gpx"), sample_gpx()).expect("write");

    let response = app(config)
        .oneshot(directory_request("ride.gpx"))
        .await
        .expect("response");
    assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);
}
