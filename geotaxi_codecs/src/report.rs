use crate::coordinate::{self, CoordinateError};
use crate::digest;
use crate::schema::{self, SchemaError};
use crate::{Latitude, Longitude};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid UTF-8 message: {0}")]
    Decode(#[from] std::str::Utf8Error),

    #[error("badly formatted JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid request: {0}")]
    Schema(#[from] SchemaError),

    #[error("invalid coordinates: {0}")]
    Coordinate(#[from] CoordinateError),
}

/// A validated position event, as emitted to telemetry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionReport {
    pub operator: String,
    pub taxi: String,
    pub device: String,
    pub lat: Latitude,
    pub lon: Longitude,
    pub timestamp: String,
    pub status: String,
    pub version: String,
    pub hash: String,

    // The digest is computed over the coordinates as sent, not as parsed.
    #[serde(skip)]
    wire_lat: String,
    #[serde(skip)]
    wire_lon: String,
}

impl PositionReport {
    /// Runs a datagram payload through decoding, parsing, the schema check and
    /// coordinate coercion, stopping at the first failure.
    pub fn from_slice(payload: &[u8]) -> Result<Self, TransportError> {
        let text = std::str::from_utf8(payload)?;
        let value: Value = serde_json::from_str(text)?;
        let object = schema::validate(&value)?;

        let lat = coordinate::coerce(&object["lat"])?;
        let lon = coordinate::coerce(&object["lon"])?;
        coordinate::check_range(lat, lon)?;

        Ok(Self {
            operator: wire_text(object, "operator"),
            taxi: wire_text(object, "taxi"),
            device: wire_text(object, "device"),
            lat,
            lon,
            timestamp: wire_text(object, "timestamp"),
            status: wire_text(object, "status"),
            version: wire_text(object, "version"),
            hash: wire_text(object, "hash"),
            wire_lat: wire_text(object, "lat"),
            wire_lon: wire_text(object, "lon"),
        })
    }

    pub fn digest_fields(&self) -> digest::Fields<'_> {
        digest::Fields {
            timestamp: &self.timestamp,
            operator: &self.operator,
            taxi: &self.taxi,
            lat: &self.wire_lat,
            lon: &self.wire_lon,
            device: &self.device,
            status: &self.status,
            version: &self.version,
        }
    }

    /// `<timestamp> <lat> <lon> <status> <device> <version>`
    pub fn summary(&self) -> String {
        format!(
            "{} {} {} {} {} {}",
            self.timestamp, self.lat, self.lon, self.status, self.device, self.version
        )
    }

    /// `<taxi>:<operator>`, the key of a taxi as seen by one operator.
    pub fn taxi_operator(&self) -> String {
        format!("{}:{}", self.taxi, self.operator)
    }
}

fn wire_text(object: &Map<String, Value>, field: &str) -> String {
    match &object[field] {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
