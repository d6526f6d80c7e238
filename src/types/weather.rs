use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Parameters of one archive lookup. Dates are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl WeatherRequest {
    /// Stable identity of the request, used for caching and deduplication.
    pub fn cache_key(&self) -> String {
        format!(
            "{:.5}_{:.5}_{}_{}",
            self.latitude, self.longitude, self.start_date, self.end_date
        )
    }
}

/// One hourly sample. The archive can report `null` for a single variable.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub temperature: Option<f64>,
    pub wind_direction: Option<f64>,
    pub wind_speed: Option<f64>,
}

/// Hour-floored UTC instant to observation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherSeries {
    hours: BTreeMap<DateTime<Utc>, WeatherObservation>,
}

impl WeatherSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, hour: DateTime<Utc>, observation: WeatherObservation) {
        self.hours.insert(hour, observation);
    }

    pub fn get(&self, hour: &DateTime<Utc>) -> Option<&WeatherObservation> {
        self.hours.get(hour)
    }

    pub fn len(&self) -> usize {
        self.hours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hours.is_empty()
    }
}

impl FromIterator<(DateTime<Utc>, WeatherObservation)> for WeatherSeries {
    fn from_iter<I: IntoIterator<Item = (DateTime<Utc>, WeatherObservation)>>(iter: I) -> Self {
        Self {
            hours: iter.into_iter().collect(),
        }
    }
}
