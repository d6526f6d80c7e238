use crate::types::record::{EnrichedRecord, JoinedSample};

/// Travel bearing minus the direction the wind blows from, in degrees.
/// Not wrapped into any range; treat it as periodic.
pub fn wind_course_diff(course: f64, wind_direction: f64) -> f64 {
    course - wind_direction
}

/// Head/tailwind alignment: -1 when riding straight into the wind, +1 with
/// it directly behind. Insensitive to which side the wind comes from.
pub fn wind_course_diff_cos(diff: f64) -> f64 {
    diff.to_radians().cos()
}

pub fn augment(filename: &str, sample: JoinedSample) -> EnrichedRecord {
    let motion = sample.motion;
    let weather = sample.weather.unwrap_or_default();

    let diff = weather
        .wind_direction
        .map(|direction| wind_course_diff(motion.course, direction));

    EnrichedRecord {
        filename: filename.to_string(),
        timestamp: motion.timestamp,
        latitude: motion.latitude,
        longitude: motion.longitude,
        altitude: motion.altitude,
        speed: motion.speed,
        altitude_diff: motion.altitude_diff,
        incline: motion.incline,
        elapsed_time: motion.elapsed_time,
        course: motion.course,
        temperature: weather.temperature,
        wind_direction: weather.wind_direction,
        wind_speed: weather.wind_speed,
        wind_course_diff: diff,
        wind_course_diff_cos: diff.map(wind_course_diff_cos),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::record::MotionSample;
    use crate::types::weather::WeatherObservation;
    use chrono::{TimeZone, Utc};

    fn motion(course: f64) -> MotionSample {
        MotionSample {
            timestamp: Utc.with_ymd_and_hms(2025, 6, 9, 14, 27, 0).unwrap(),
            latitude: 0.0,
            longitude: 0.001,
            altitude: 0.0,
            speed: 40.0,
            altitude_diff: 0.0,
            incline: 0.0,
            elapsed_time: 10.0,
            course,
            weather_hour_key: Utc.with_ymd_and_hms(2025, 6, 9, 14, 0, 0).unwrap(),
        }
    }

    #[test]
    fn headwind_scenario() {
        let sample = JoinedSample {
            motion: motion(90.0),
            weather: Some(WeatherObservation {
                temperature: Some(18.0),
                wind_direction: Some(270.0),
                wind_speed: Some(9.0),
            }),
        };

        let record = augment("ride.gpx", sample);
        assert_eq!(record.filename, "ride.gpx");
        assert_eq!(record.wind_course_diff, Some(-180.0));
        assert!((record.wind_course_diff_cos.unwrap() + 1.0).abs() < 1e-12);
        assert_eq!(record.temperature, Some(18.0));
        assert_eq!(record.wind_speed, Some(9.0));
        assert_eq!(record.speed, 40.0);
    }

    #[test]
    fn diff_is_not_wrapped() {
        assert_eq!(wind_course_diff(350.0, 10.0), 340.0);
        assert_eq!(wind_course_diff(10.0, 350.0), -340.0);
    }

    #[test]
    fn cosine_is_periodic_and_even() {
        for diff in [-340.0, -180.0, -45.0, 0.0, 30.0, 123.4, 359.0] {
            let c = wind_course_diff_cos(diff);
            assert!((c - wind_course_diff_cos(diff + 360.0)).abs() < 1e-9);
            assert!((c - wind_course_diff_cos(-diff)).abs() < 1e-12);
        }
    }

    #[test]
    fn missing_weather_leaves_wind_features_empty() {
        let record = augment("ride.gpx", JoinedSample { motion: motion(90.0), weather: None });
        assert_eq!(record.temperature, None);
        assert_eq!(record.wind_direction, None);
        assert_eq!(record.wind_speed, None);
        assert_eq!(record.wind_course_diff, None);
        assert_eq!(record.wind_course_diff_cos, None);
        assert_eq!(record.course, 90.0);
    }

    #[test]
    fn null_wind_direction_only_drops_wind_features() {
        let sample = JoinedSample {
            motion: motion(90.0),
            weather: Some(WeatherObservation {
                temperature: Some(12.0),
                wind_direction: None,
                wind_speed: Some(3.0),
            }),
        };
        let record = augment("ride.gpx", sample);
        assert_eq!(record.temperature, Some(12.0));
        assert_eq!(record.wind_course_diff, None);
    }
}
