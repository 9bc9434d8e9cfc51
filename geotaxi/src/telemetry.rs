use crate::clock::unix_time;
use anyhow::Context;
use async_trait::async_trait;
use geotaxi_codecs::PositionReport;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Fire-and-forget sink for accepted reports.
#[async_trait]
pub trait Telemetry: Send {
    async fn emit(&mut self, tag: &str, report: &PositionReport) -> anyhow::Result<()>;
}

/// Writes `[tag, time, record]` entries to a fluentd `in_forward` input,
/// which takes JSON as well as msgpack.
///
/// Connecting and writing are each bounded by `timeout`, so a fluentd that
/// stops reading costs a worker at most that long per entry.
#[derive(Debug)]
pub struct FluentTelemetry {
    addr: String,
    prefix: String,
    timeout: Duration,
    connection: Option<TcpStream>,
}

impl FluentTelemetry {
    pub fn new(addr: String, prefix: &str, timeout: Duration) -> Self {
        Self {
            addr,
            prefix: prefix.to_string(),
            timeout,
            connection: None,
        }
    }
}

#[async_trait]
impl Telemetry for FluentTelemetry {
    async fn emit(&mut self, tag: &str, report: &PositionReport) -> anyhow::Result<()> {
        let entry = serde_json::to_vec(&(format!("{}.{tag}", self.prefix), unix_time(), report))?;

        let mut connection = match self.connection.take() {
            Some(connection) => connection,
            None => timeout(self.timeout, TcpStream::connect(&self.addr))
                .await
                .with_context(|| format!("Timed out connecting to fluentd at {}", self.addr))?
                .with_context(|| format!("Unable to connect to fluentd at {}", self.addr))?,
        };
        timeout(self.timeout, connection.write_all(&entry))
            .await
            .context("Timed out sending entry to fluentd")?
            .context("Failed to send entry to fluentd")?;
        // Only a connection that took the whole entry is reused.
        self.connection = Some(connection);
        Ok(())
    }
}
