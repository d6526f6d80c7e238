#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use ridewx_rs::config::Config;
use serde_json::json;

/// Stand-in for the archive API. Serves 24 hourly observations for
/// 2025-06-09 with `temperature = 10 + hour / 2`, wind from 270° at 12.
#[derive(Clone)]
pub struct FakeArchive {
    pub hits: Arc<AtomicUsize>,
    pub failures_left: Arc<AtomicUsize>,
    pub failure_status: StatusCode,
    pub last_query: Arc<Mutex<Option<HashMap<String, String>>>>,
}

impl FakeArchive {
    pub fn healthy() -> Self {
        Self::failing(0, StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn failing(times: usize, status: StatusCode) -> Self {
        Self {
            hits: Arc::new(AtomicUsize::new(0)),
            failures_left: Arc::new(AtomicUsize::new(times)),
            failure_status: status,
            last_query: Arc::new(Mutex::new(None)),
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Starts the server and returns its archive URL.
    pub async fn spawn(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        let app = Router::new()
            .route("/v1/archive", get(archive))
            .with_state(self.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake archive");
        });
        format!("http://{addr}/v1/archive")
    }
}

async fn archive(
    State(fake): State<FakeArchive>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    fake.hits.fetch_add(1, Ordering::SeqCst);
    *fake.last_query.lock().expect("lock") = Some(query);

    let should_fail = fake
        .failures_left
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
        .is_ok();
    if should_fail {
        return (
            fake.failure_status,
            Json(json!({"error": true, "reason": "simulated failure"})),
        )
            .into_response();
    }

    let hours: Vec<u32> = (0..24).collect();
    Json(json!({
        "latitude": 44.46,
        "longitude": 26.13,
        "timezone": "GMT",
        "hourly": {
            "time": hours.iter().map(|h| format!("2025-06-09T{h:02}:00")).collect::<Vec<_>>(),
            "temperature_2m": hours.iter().map(|h| 10.0 + *h as f64 / 2.0).collect::<Vec<_>>(),
            "wind_direction_10m": hours.iter().map(|_| 270.0).collect::<Vec<_>>(),
            "wind_speed_10m": hours.iter().map(|_| 12.0).collect::<Vec<_>>(),
        }
    }))
    .into_response()
}

pub fn test_config(archive_url: String, cache_dir: &Path) -> Config {
    Config {
        weather_api_url: archive_url,
        weather_cache_dir: Some(cache_dir.to_path_buf()),
        weather_max_retries: 3,
        weather_backoff: Duration::from_millis(1),
        weather_timeout: Duration::from_secs(5),
        track_root: cache_dir.join("tracks"),
        ..Config::default()
    }
}

/// Two segments on 2025-06-09: the first at 14:27 heading due east, the
/// second at 15:10 heading north.
pub fn sample_gpx() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test">
  <trk><name>Test Ride</name>
    <trkseg>
      <trkpt lat="0.0" lon="0.0"><ele>0.0</ele><time>2025-06-09T14:27:00Z</time></trkpt>
      <trkpt lat="0.0" lon="0.001"><ele>0.0</ele><time>2025-06-09T14:27:10Z</time></trkpt>
    </trkseg>
    <trkseg>
      <trkpt lat="0.01" lon="0.0"><ele>5.0</ele><time>2025-06-09T15:10:00Z</time></trkpt>
      <trkpt lat="0.011" lon="0.0"><ele>6.0</ele><time>2025-06-09T15:10:20Z</time></trkpt>
    </trkseg>
  </trk>
</gpx>"#
}

pub fn multipart_body(file_name: &str, file_body: &str, boundary: &str) -> String {
    format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n{file_body}\r\n--{boundary}--\r\n"
    )
}
