use anyhow::Context;
use arguments::Arguments;
use clap::Parser;
use geotaxi_codecs::digest::Fields;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::net::UdpSocket;

mod arguments;

const LAT: &str = "48.856613";
const LON: &str = "2.352222";

/// A signed position of `taxi`, serialized the way taxis send it.
fn position(operator: &str, taxi: &str, secret: &str, timestamp: u64) -> serde_json::Value {
    let timestamp = timestamp.to_string();
    let fields = Fields {
        timestamp: &timestamp,
        operator,
        taxi,
        lat: LAT,
        lon: LON,
        device: "mobile",
        status: "free",
        version: "1",
    };
    serde_json::json!({
        "timestamp": fields.timestamp,
        "operator": fields.operator,
        "taxi": fields.taxi,
        "lat": fields.lat,
        "lon": fields.lon,
        "device": fields.device,
        "status": fields.status,
        "version": fields.version,
        "hash": fields.sign(secret),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let args = Arguments::parse();
    let taxi = uuid::Uuid::new_v4().to_string();
    let secret = args
        .api_key
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    let gateway = format!("{}:{}", args.host, args.port);
    socket
        .connect(&gateway)
        .await
        .with_context(|| format!("Unable to resolve {gateway}"))?;
    tracing::info!("Sending {} positions of taxi {taxi} to {gateway}", args.num);

    for _ in 0..args.num {
        let timestamp = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
        let payload = position(&args.operator, &taxi, &secret, timestamp);
        socket.send(payload.to_string().as_bytes()).await?;
        if !args.sleep.is_zero() {
            tokio::time::sleep(*args.sleep).await;
        }
    }

    Ok(())
}
