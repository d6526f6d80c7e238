use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::pipeline::aggregate::BatchPolicy;

const DEFAULT_WEATHER_API_URL: &str = "https://archive-api.open-meteo.com/v1/archive";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub max_file_size: usize,
    pub cache_ttl: Duration,
    pub weather_api_url: String,
    /// `None` disables the on-disk response cache.
    pub weather_cache_dir: Option<PathBuf>,
    pub weather_max_retries: u32,
    pub weather_backoff: Duration,
    pub weather_timeout: Duration,
    pub track_root: PathBuf,
    pub batch_policy: BatchPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            max_file_size: 25 * 1024 * 1024,
            cache_ttl: Duration::from_secs(3600),
            weather_api_url: DEFAULT_WEATHER_API_URL.to_string(),
            weather_cache_dir: Some(PathBuf::from(".cache/weather_data")),
            weather_max_retries: 3,
            weather_backoff: Duration::from_millis(500),
            weather_timeout: Duration::from_secs(30),
            track_root: PathBuf::from("tracks"),
            batch_policy: BatchPolicy::Abort,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let max_file_size_mb: usize = env_or("MAX_FILE_SIZE_MB", 25);
        let cache_ttl_seconds: u64 = env_or("CACHE_TTL_SECONDS", defaults.cache_ttl.as_secs());
        let backoff_ms: u64 = env_or("WEATHER_BACKOFF_MS", 500);
        let timeout_seconds: u64 = env_or("WEATHER_TIMEOUT_SECONDS", 30);

        let weather_cache_dir = match std::env::var("WEATHER_CACHE_DIR") {
            Ok(dir) if dir.trim().is_empty() => None,
            Ok(dir) => Some(PathBuf::from(dir)),
            Err(_) => defaults.weather_cache_dir,
        };

        let skip_invalid = std::env::var("BATCH_SKIP_INVALID")
            .ok()
            .and_then(|value| parse_flag(&value))
            .unwrap_or(false);
        let batch_policy = if skip_invalid {
            BatchPolicy::Skip
        } else {
            BatchPolicy::Abort
        };

        Self {
            port: env_or("PORT", defaults.port),
            max_file_size: max_file_size_mb * 1024 * 1024,
            cache_ttl: Duration::from_secs(cache_ttl_seconds),
            weather_api_url: std::env::var("WEATHER_API_URL")
                .ok()
                .filter(|url| !url.trim().is_empty())
                .unwrap_or(defaults.weather_api_url),
            weather_cache_dir,
            weather_max_retries: env_or("WEATHER_MAX_RETRIES", defaults.weather_max_retries),
            weather_backoff: Duration::from_millis(backoff_ms),
            weather_timeout: Duration::from_secs(timeout_seconds),
            track_root: std::env::var("TRACK_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.track_root),
            batch_policy,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Accepts `1/true/yes/on` and `0/false/no/off`, case-insensitively.
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
