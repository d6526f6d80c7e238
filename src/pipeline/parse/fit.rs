use crate::error::ParseError;
use crate::pipeline::parse::Parser;
use crate::types::track::{FileFormat, ParsedTrack, Segment, TrackPoint};
use chrono::{DateTime, Utc};
use fitparser::profile::MesgNum;

/// FIT activities carry no track/segment hierarchy; every positioned
/// `record` message lands in a single segment.
pub struct FitParser;

impl Parser for FitParser {
    fn parse(&self, bytes: &[u8]) -> Result<ParsedTrack, ParseError> {
        let data = fitparser::from_bytes(bytes)
            .map_err(|e| ParseError::InvalidFit(format!("Failed to parse FIT file: {}", e)))?;

        let mut points = Vec::new();

        for record in data {
            if record.kind() != MesgNum::Record {
                continue;
            }

            let mut lat = None;
            let mut lon = None;
            let mut altitude = None;
            let mut timestamp: Option<DateTime<Utc>> = None;

            for field in record.fields() {
                match field.name() {
                    "position_lat" => {
                        if let fitparser::Value::SInt32(val) = field.value() {
                            lat = Some(semicircles_to_degrees(*val));
                        }
                    }
                    "position_long" => {
                        if let fitparser::Value::SInt32(val) = field.value() {
                            lon = Some(semicircles_to_degrees(*val));
                        }
                    }
                    "enhanced_altitude" => {
                        if let fitparser::Value::Float64(val) = field.value() {
                            altitude = Some(*val);
                        }
                    }
                    "altitude" => {
                        if let fitparser::Value::Float64(val) = field.value() {
                            altitude = altitude.or(Some(*val));
                        }
                    }
                    "timestamp" => {
                        if let fitparser::Value::Timestamp(val) = field.value() {
                            timestamp = DateTime::from_timestamp(val.timestamp(), 0);
                        }
                    }
                    _ => {}
                }
            }

            let (Some(latitude), Some(longitude)) = (lat, lon) else {
                continue;
            };

            let point = points.len();
            let timestamp =
                timestamp.ok_or(ParseError::MissingTimestamp { segment: 0, point })?;
            let altitude = altitude.ok_or(ParseError::MissingElevation { segment: 0, point })?;

            points.push(TrackPoint {
                latitude,
                longitude,
                altitude,
                timestamp,
            });
        }

        let segment = Segment::new(points).ok_or(ParseError::NoTrack)?;

        Ok(ParsedTrack {
            segments: vec![segment],
            file_format: FileFormat::Fit,
        })
    }
}

fn semicircles_to_degrees(semicircles: i32) -> f64 {
    (semicircles as f64) * (180.0 / 2_147_483_648.0)
}
