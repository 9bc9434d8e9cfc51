pub mod coordinate;
pub mod digest;
pub mod report;
pub mod resp;
pub mod schema;

pub use crate::report::{PositionReport, TransportError};

pub type Latitude = f64;
pub type Longitude = f64;

/// Tag under which accepted reports are emitted to telemetry.
pub const POSITION_TAG: &str = "position";
