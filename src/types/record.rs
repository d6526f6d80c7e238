use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::weather::WeatherObservation;

/// Kinematics of one point relative to its predecessor in the segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSample {
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub speed: f64,
    pub altitude_diff: f64,
    pub incline: f64,
    pub elapsed_time: f64,
    pub course: f64,
    pub weather_hour_key: DateTime<Utc>,
}

/// A motion sample after the weather lookup. `weather` is `None` when the
/// series had no observation at the sample's hour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JoinedSample {
    pub motion: MotionSample,
    pub weather: Option<WeatherObservation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub filename: String,
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub speed: f64,
    pub altitude_diff: f64,
    pub incline: f64,
    pub elapsed_time: f64,
    pub course: f64,
    pub temperature: Option<f64>,
    pub wind_direction: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_course_diff: Option<f64>,
    pub wind_course_diff_cos: Option<f64>,
}

pub const COLUMNS: [&str; 15] = [
    "filename",
    "timestamp",
    "latitude",
    "longitude",
    "altitude",
    "speed",
    "altitude_diff",
    "incline",
    "elapsed_time",
    "course",
    "temperature",
    "wind_direction",
    "wind_speed",
    "wind_course_diff",
    "wind_course_diff_cos",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichedTable {
    pub records: Vec<EnrichedRecord>,
}

impl EnrichedTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn extend(&mut self, other: EnrichedTable) {
        self.records.extend(other.records);
    }

    /// Serializes the table as CSV with a header row. Absent weather
    /// values are written as empty cells.
    pub fn to_csv(&self) -> Result<Vec<u8>, csv::Error> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        if self.records.is_empty() {
            writer.write_record(COLUMNS)?;
        }
        for record in &self.records {
            writer.serialize(record)?;
        }
        writer.into_inner().map_err(|err| err.into_error().into())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableSummary {
    pub rows: usize,
    pub avg_speed_kmh: f64,
    pub max_speed_kmh: f64,
    pub avg_incline_pct: f64,
    pub distance_m: f64,
    pub duration_seconds: f64,
    pub rows_with_weather: usize,
}
