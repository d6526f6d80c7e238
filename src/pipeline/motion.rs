use chrono::{DateTime, DurationRound, TimeDelta, Utc};

use crate::types::record::MotionSample;
use crate::types::track::{Segment, TrackPoint};

/// Metres per degree of latitude used by the small-separation approximation.
const ONE_DEGREE_M: f64 = 1000.0 * 10000.8 / 90.0;
const EARTH_RADIUS_M: f64 = 6_378_137.0;
/// Beyond this separation (degrees, on either axis) the flat approximation
/// is replaced by haversine.
const FLAT_LIMIT_DEG: f64 = 0.2;

pub fn compute(segment: &Segment) -> Vec<MotionSample> {
    if let Some(idx) = segment.first_non_increasing() {
        tracing::warn!(
            "Segment timestamps stop increasing at point {} of {}; speed is zeroed there",
            idx,
            segment.len()
        );
    }

    let first = segment.first();
    let points = segment.points();

    points
        .iter()
        .enumerate()
        .map(|(i, cur)| {
            let prev = if i == 0 { None } else { points.get(i - 1) };
            derive(prev, cur, first)
        })
        .collect()
}

/// Kinematics of `cur` given its predecessor and the first point of its
/// segment. With no predecessor every derived value is zero.
pub fn derive(prev: Option<&TrackPoint>, cur: &TrackPoint, first: &TrackPoint) -> MotionSample {
    let mut sample = MotionSample {
        timestamp: cur.timestamp,
        latitude: cur.latitude,
        longitude: cur.longitude,
        altitude: cur.altitude,
        speed: 0.0,
        altitude_diff: 0.0,
        incline: 0.0,
        elapsed_time: 0.0,
        course: 0.0,
        weather_hour_key: weather_hour_key(cur.timestamp),
    };

    let Some(prev) = prev else {
        return sample;
    };

    let distance = distance_3d(prev, cur);
    let time_delta = seconds_between(prev.timestamp, cur.timestamp);

    sample.speed = if time_delta > 0.0 {
        3.6 * distance / time_delta
    } else {
        0.0
    };
    sample.altitude_diff = cur.altitude - prev.altitude;
    sample.incline = if distance > 0.0 {
        sample.altitude_diff / distance * 100.0
    } else {
        0.0
    };
    sample.elapsed_time = seconds_between(first.timestamp, cur.timestamp);
    sample.course = initial_bearing(prev.latitude, prev.longitude, cur.latitude, cur.longitude);

    sample
}

/// `t` with minutes, seconds and sub-seconds cleared.
pub fn weather_hour_key(t: DateTime<Utc>) -> DateTime<Utc> {
    t.duration_trunc(TimeDelta::hours(1)).unwrap_or(t)
}

fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 1000.0
}

/// Distance in metres combining horizontal displacement and altitude change.
pub fn distance_3d(a: &TrackPoint, b: &TrackPoint) -> f64 {
    let horizontal = horizontal_distance(a.latitude, a.longitude, b.latitude, b.longitude);
    let vertical = b.altitude - a.altitude;
    (horizontal * horizontal + vertical * vertical).sqrt()
}

fn horizontal_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    if (lat1 - lat2).abs() > FLAT_LIMIT_DEG || (lon1 - lon2).abs() > FLAT_LIMIT_DEG {
        return haversine_distance(lat1, lon1, lat2, lon2);
    }

    let x = lat1 - lat2;
    let y = (lon1 - lon2) * lat1.to_radians().cos();
    (x * x + y * y).sqrt() * ONE_DEGREE_M
}

fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Great-circle initial bearing in degrees, in [0, 360).
pub fn initial_bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let y = d_lon.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * d_lon.cos();

    let bearing = y.atan2(x).to_degrees().rem_euclid(360.0);
    if bearing >= 360.0 {
        0.0
    } else {
        bearing
    }
}
