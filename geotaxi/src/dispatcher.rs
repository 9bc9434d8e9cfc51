use crate::backend::Backend;
use crate::clock::unix_time;
use crate::error::SinkError;
use crate::store::Store;
use crate::telemetry::Telemetry;
use geotaxi_codecs::resp::Command;
use geotaxi_codecs::{PositionReport, POSITION_TAG};
use std::net::IpAddr;

pub const GEOINDEX: &str = "geoindex";
pub const GEOINDEX_OPERATOR: &str = "geoindex_2";
pub const TIMESTAMPS: &str = "timestamps";
pub const TIMESTAMPS_TAXI: &str = "timestamps_id";

/// Where accepted reports end up besides telemetry.
#[derive(Debug, Clone)]
pub enum Destination {
    Store,
    Backend(Backend),
}

#[derive(Debug)]
pub struct Dispatcher<T> {
    telemetry: Option<T>,
    destination: Destination,
}

impl<T> Dispatcher<T>
where
    T: Telemetry,
{
    pub fn new(telemetry: Option<T>, destination: Destination) -> Self {
        Self {
            telemetry,
            destination,
        }
    }

    /// Emits telemetry and updates the destination concurrently. A telemetry
    /// failure is only logged; a destination failure is returned.
    pub async fn dispatch<S>(
        &mut self,
        report: &PositionReport,
        source: IpAddr,
        store: &mut S,
    ) -> Result<(), SinkError>
    where
        S: Store + ?Sized,
    {
        let Self {
            telemetry,
            destination,
        } = self;

        let emit = async {
            if let Some(telemetry) = telemetry {
                if let Err(e) = telemetry.emit(POSITION_TAG, report).await {
                    tracing::error!("Failed to emit telemetry for taxi {}: {e:#}", report.taxi);
                }
            }
        };
        let update = async {
            match destination {
                Destination::Store => {
                    let actions = store_update(report, source, unix_time());
                    store
                        .pipeline(actions.clone())
                        .await
                        .map_err(|e| SinkError::store(&actions, e))
                }
                Destination::Backend(backend) => Ok(backend.forward(report, source).await?),
            }
        };

        let ((), result) = tokio::join!(emit, update);
        result
    }
}

/// The batch recording one accepted report.
pub fn store_update(report: &PositionReport, source: IpAddr, now: u64) -> Vec<Command> {
    vec![
        Command::HSet {
            key: format!("taxi:{}", report.taxi),
            field: report.operator.clone(),
            value: report.summary(),
        },
        Command::GeoAdd {
            key: GEOINDEX.to_string(),
            lon: report.lon,
            lat: report.lat,
            member: report.taxi.clone(),
        },
        Command::GeoAdd {
            key: GEOINDEX_OPERATOR.to_string(),
            lon: report.lon,
            lat: report.lat,
            member: report.taxi_operator(),
        },
        Command::ZAdd {
            key: TIMESTAMPS.to_string(),
            score: now,
            member: report.taxi_operator(),
        },
        Command::ZAdd {
            key: TIMESTAMPS_TAXI.to_string(),
            score: now,
            member: report.taxi.clone(),
        },
        Command::SAdd {
            key: format!("ips:{}", report.operator),
            member: source.to_string(),
        },
    ]
}
