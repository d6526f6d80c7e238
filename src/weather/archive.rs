use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::error::FetchError;
use crate::types::weather::{WeatherObservation, WeatherSeries};

pub const HOURLY_VARIABLES: &str = "temperature_2m,wind_direction_10m,wind_speed_10m";

#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    hourly: Hourly,
}

#[derive(Debug, Deserialize)]
struct Hourly {
    time: Vec<String>,
    temperature_2m: Vec<Option<f64>>,
    wind_direction_10m: Vec<Option<f64>>,
    wind_speed_10m: Vec<Option<f64>>,
}

/// Decodes an archive body requested with `timezone=GMT` into a UTC series.
pub fn parse_series(body: &str) -> Result<WeatherSeries, FetchError> {
    let response: ArchiveResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::InvalidResponse(e.to_string()))?;
    let hourly = response.hourly;

    let len = hourly.time.len();
    if hourly.temperature_2m.len() != len
        || hourly.wind_direction_10m.len() != len
        || hourly.wind_speed_10m.len() != len
    {
        return Err(FetchError::InvalidResponse(
            "hourly arrays differ in length".to_string(),
        ));
    }

    let mut series = WeatherSeries::new();
    for (i, time) in hourly.time.iter().enumerate() {
        let hour = parse_hour(time)
            .ok_or_else(|| FetchError::InvalidResponse(format!("bad hourly time {:?}", time)))?;
        series.insert(
            hour.and_utc(),
            WeatherObservation {
                temperature: hourly.temperature_2m[i],
                wind_direction: hourly.wind_direction_10m[i],
                wind_speed: hourly.wind_speed_10m[i],
            },
        );
    }

    Ok(series)
}

fn parse_hour(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}
