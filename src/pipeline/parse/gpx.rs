use crate::error::ParseError;
use crate::pipeline::parse::Parser;
use crate::types::track::{FileFormat, ParsedTrack, Segment, TrackPoint};
use chrono::{DateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

pub struct GpxParser;

impl Parser for GpxParser {
    fn parse(&self, bytes: &[u8]) -> Result<ParsedTrack, ParseError> {
        let mut reader = Reader::from_reader(bytes);
        reader.trim_text(true);

        let mut state = GpxState::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => state.open(&e)?,
                Ok(Event::Empty(e)) => {
                    state.open(&e)?;
                    state.close(e.local_name().as_ref())?;
                }
                Ok(Event::Text(e)) => {
                    if state.pending.is_some() {
                        let text = e
                            .unescape()
                            .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;
                        state.text(&text);
                    }
                }
                Ok(Event::End(e)) => state.close(e.local_name().as_ref())?,
                Ok(Event::Eof) => break,
                Err(e) => return Err(ParseError::InvalidGpx(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        state.finish()
    }
}

/// A `trkpt` whose children have not all been read yet.
#[derive(Debug)]
struct PendingPoint {
    lat: f64,
    lon: f64,
    ele: Option<f64>,
    time: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct GpxState {
    tracks: usize,
    track_segments: usize,
    in_trk: bool,
    in_trkseg: bool,
    segments: Vec<Segment>,
    points: Vec<TrackPoint>,
    pending: Option<PendingPoint>,
    current_element: String,
}

impl GpxState {
    fn open(&mut self, e: &BytesStart) -> Result<(), ParseError> {
        let name = e.local_name();
        let name_str = std::str::from_utf8(name.as_ref())
            .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;

        match name_str {
            "trk" => {
                self.in_trk = true;
                self.tracks += 1;
                self.track_segments = 0;
            }
            "trkseg" if self.in_trk => {
                self.in_trkseg = true;
                self.points.clear();
            }
            "trkpt" if self.in_trkseg => {
                self.pending = Some(read_position(e)?);
            }
            _ if self.pending.is_some() => {
                self.current_element = name_str.to_string();
            }
            _ => {}
        }
        Ok(())
    }

    fn text(&mut self, text: &str) {
        let Some(point) = self.pending.as_mut() else {
            return;
        };
        match self.current_element.as_str() {
            "ele" => point.ele = text.trim().parse().ok(),
            "time" => point.time = text.trim().parse::<DateTime<Utc>>().ok(),
            _ => {}
        }
    }

    fn close(&mut self, name: &[u8]) -> Result<(), ParseError> {
        match name {
            b"trkpt" if self.in_trkseg => self.finish_point(),
            b"trkseg" if self.in_trk => {
                self.in_trkseg = false;
                let index = self.segments.len();
                let segment = Segment::new(std::mem::take(&mut self.points))
                    .ok_or(ParseError::EmptySegment { segment: index })?;
                self.segments.push(segment);
                self.track_segments += 1;
                Ok(())
            }
            b"trk" => {
                self.in_trk = false;
                if self.track_segments == 0 {
                    return Err(ParseError::EmptyTrack {
                        track: self.tracks - 1,
                    });
                }
                Ok(())
            }
            _ => {
                self.current_element.clear();
                Ok(())
            }
        }
    }

    fn finish_point(&mut self) -> Result<(), ParseError> {
        let Some(pending) = self.pending.take() else {
            return Ok(());
        };
        self.current_element.clear();

        let segment = self.segments.len();
        let point = self.points.len();
        let timestamp = pending
            .time
            .ok_or(ParseError::MissingTimestamp { segment, point })?;
        let altitude = pending
            .ele
            .ok_or(ParseError::MissingElevation { segment, point })?;

        self.points.push(TrackPoint {
            latitude: pending.lat,
            longitude: pending.lon,
            altitude,
            timestamp,
        });
        Ok(())
    }

    fn finish(self) -> Result<ParsedTrack, ParseError> {
        if self.in_trk {
            return Err(ParseError::InvalidGpx(
                "unexpected end of file inside <trk>".to_string(),
            ));
        }
        if self.tracks == 0 {
            return Err(ParseError::NoTrack);
        }

        Ok(ParsedTrack {
            segments: self.segments,
            file_format: FileFormat::Gpx,
        })
    }
}

fn read_position(e: &BytesStart) -> Result<PendingPoint, ParseError> {
    let mut lat = None;
    let mut lon = None;

    for attr in e.attributes() {
        let attr = attr.map_err(|e| ParseError::InvalidGpx(e.to_string()))?;
        let value = std::str::from_utf8(&attr.value)
            .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;

        match attr.key.local_name().as_ref() {
            b"lat" => lat = value.trim().parse::<f64>().ok(),
            b"lon" => lon = value.trim().parse::<f64>().ok(),
            _ => {}
        }
    }

    match (lat, lon) {
        (Some(lat), Some(lon)) => Ok(PendingPoint {
            lat,
            lon,
            ele: None,
            time: None,
        }),
        _ => Err(ParseError::InvalidGpx(
            "trkpt is missing a valid lat/lon".to_string(),
        )),
    }
}
