use std::future::Future;

use crate::error::FetchError;
use crate::types::record::{JoinedSample, MotionSample};
use crate::types::track::Segment;
use crate::types::weather::{WeatherRequest, WeatherSeries};

/// Anything that can supply an hourly weather series for a location and
/// inclusive date range.
pub trait WeatherSource {
    fn fetch(
        &self,
        request: &WeatherRequest,
    ) -> impl Future<Output = Result<WeatherSeries, FetchError>> + Send;
}

/// The segment's starting location and the UTC calendar dates of its first
/// and last points.
pub fn request_for(segment: &Segment) -> WeatherRequest {
    let first = segment.first();
    WeatherRequest {
        latitude: first.latitude,
        longitude: first.longitude,
        start_date: first.timestamp.date_naive(),
        end_date: segment.last().timestamp.date_naive(),
    }
}

/// Left join on the hour key: every sample is kept, with `weather` set only
/// when the series holds an observation at exactly that hour.
pub fn join(samples: Vec<MotionSample>, series: &WeatherSeries) -> Vec<JoinedSample> {
    samples
        .into_iter()
        .map(|motion| JoinedSample {
            weather: series.get(&motion.weather_hour_key).copied(),
            motion,
        })
        .collect()
}

/// Fetches weather for `segment` and joins it onto its motion samples.
/// A failed fetch fails the whole segment.
pub async fn correlate<S: WeatherSource>(
    source: &S,
    segment: &Segment,
    samples: Vec<MotionSample>,
) -> Result<Vec<JoinedSample>, FetchError> {
    let request = request_for(segment);
    let series = source.fetch(&request).await?;

    let joined = join(samples, &series);
    let misses = joined.iter().filter(|s| s.weather.is_none()).count();
    if misses > 0 {
        tracing::debug!(
            "{} of {} samples have no weather observation for their hour",
            misses,
            joined.len()
        );
    }

    Ok(joined)
}
