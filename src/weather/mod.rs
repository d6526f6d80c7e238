//! Open-Meteo historical archive client.
//!
//! Successful responses are cached on disk indefinitely and memoised in
//! process, so a request for the same location and date range goes to the
//! network at most once. Concurrent callers with the same key share one
//! in-flight load.

mod archive;
mod cache;
mod retry;

pub use archive::parse_series;
pub use cache::ResponseCache;

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use reqwest::Client;
use tokio::sync::OnceCell;

use crate::config::Config;
use crate::error::FetchError;
use crate::pipeline::correlate::WeatherSource;
use crate::types::weather::{WeatherRequest, WeatherSeries};

pub struct WeatherClient {
    http: Client,
    base_url: String,
    cache: ResponseCache,
    memo: DashMap<String, MemoEntry>,
    max_retries: u32,
    backoff: Duration,
}

struct MemoEntry {
    series: Arc<OnceCell<WeatherSeries>>,
    created_at: Instant,
}

impl MemoEntry {
    fn new() -> Self {
        Self {
            series: Arc::new(OnceCell::new()),
            created_at: Instant::now(),
        }
    }
}

impl WeatherClient {
    pub fn new(config: &Config) -> Self {
        let http = Client::builder()
            .timeout(config.weather_timeout)
            .build()
            .unwrap_or_else(|err| {
                tracing::warn!("Falling back to default HTTP client: {}", err);
                Client::new()
            });

        Self {
            http,
            base_url: config.weather_api_url.clone(),
            cache: ResponseCache::new(config.weather_cache_dir.clone()),
            memo: DashMap::new(),
            max_retries: config.weather_max_retries,
            backoff: config.weather_backoff,
        }
    }

    /// Drops resolved memo entries older than `ttl`. Loads still in flight
    /// are kept so their waiters stay deduplicated.
    pub fn evict_expired(&self, ttl: Duration) {
        let now = Instant::now();
        self.memo.retain(|_, entry| {
            !entry.series.initialized() || now.duration_since(entry.created_at) < ttl
        });
        tracing::debug!("Weather memo eviction complete. Current size: {}", self.memo.len());
    }

    /// Number of requests currently memoised or in flight.
    pub fn memoised(&self) -> usize {
        self.memo.len()
    }

    async fn download(&self, request: &WeatherRequest) -> Result<String, FetchError> {
        let query = [
            ("latitude", request.latitude.to_string()),
            ("longitude", request.longitude.to_string()),
            ("start_date", request.start_date.to_string()),
            ("end_date", request.end_date.to_string()),
            ("hourly", archive::HOURLY_VARIABLES.to_string()),
            ("timezone", "GMT".to_string()),
        ];

        let response = retry::send_with_retry(
            &self.http,
            |client| client.get(&self.base_url).query(&query),
            self.max_retries,
            self.backoff,
            "weather archive",
        )
        .await?;

        response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))
    }

    async fn load(&self, request: &WeatherRequest, key: &str) -> Result<WeatherSeries, FetchError> {
        if let Some(body) = self.cache.get(key).await {
            match parse_series(&body) {
                Ok(series) => {
                    tracing::debug!("Weather cache hit for {}", key);
                    return Ok(series);
                }
                Err(err) => tracing::warn!("Ignoring unreadable cache entry {}: {}", key, err),
            }
        }

        tracing::info!(
            "Fetching weather for ({}, {}) {}..{}",
            request.latitude,
            request.longitude,
            request.start_date,
            request.end_date
        );
        let body = self.download(request).await?;
        let series = parse_series(&body)?;
        if let Err(err) = self.cache.put(key, &body).await {
            tracing::warn!("{}", err);
        }
        Ok(series)
    }
}

impl WeatherSource for WeatherClient {
    async fn fetch(&self, request: &WeatherRequest) -> Result<WeatherSeries, FetchError> {
        let key = request.cache_key();

        let cell = self
            .memo
            .entry(key.clone())
            .or_insert_with(MemoEntry::new)
            .series
            .clone();

        match cell.get_or_try_init(|| self.load(request, &key)).await {
            Ok(series) => Ok(series.clone()),
            Err(err) => {
                // failures are never memoised
                self.memo.remove_if(&key, |_, entry| {
                    Arc::ptr_eq(&entry.series, &cell) && !cell.initialized()
                });
                Err(err)
            }
        }
    }
}
