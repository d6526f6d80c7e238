use crate::config::Config;
use crate::types::record::EnrichedTable;
use crate::weather::WeatherClient;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    weather: Arc<WeatherClient>,
    tables: Arc<DashMap<String, CachedTable>>,
}

struct CachedTable {
    table: Arc<EnrichedTable>,
    inserted_at: Instant,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let weather = WeatherClient::new(&config);
        Self {
            config: Arc::new(config),
            weather: Arc::new(weather),
            tables: Arc::new(DashMap::new()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn weather(&self) -> &WeatherClient {
        &self.weather
    }

    pub fn insert(&self, table_id: String, table: Arc<EnrichedTable>) {
        self.tables.insert(
            table_id,
            CachedTable {
                table,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn get(&self, table_id: &str) -> Option<Arc<EnrichedTable>> {
        self.tables.get(table_id).map(|entry| entry.table.clone())
    }

    pub fn evict_expired(&self, ttl: Duration) {
        let now = Instant::now();
        self.tables.retain(|_, cached| {
            now.duration_since(cached.inserted_at) < ttl
        });
        tracing::info!("Table cache eviction complete. Current size: {}", self.tables.len());
        self.weather.evict_expired(ttl);
    }
}
