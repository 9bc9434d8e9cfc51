use axum::Router;
use reqwest::Url;

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn serve(app: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}").parse().unwrap()
}

pub const VALID_HASH: &str = "63f3d6cf5f25e96bd085aca81d715a695c9c36e2";

/// The reference message signed by `user1` with secret `key1`, carrying `hash`.
pub fn payload(hash: &str) -> Vec<u8> {
    serde_json::json!({
        "timestamp": "1",
        "operator": "user1",
        "taxi": "taxi",
        "lat": "17",
        "lon": "18",
        "device": "mobile",
        "status": "free",
        "version": "1",
        "hash": hash,
    })
    .to_string()
    .into_bytes()
}

pub fn report(hash: &str) -> geotaxi_codecs::PositionReport {
    geotaxi_codecs::PositionReport::from_slice(&payload(hash)).unwrap()
}

pub fn credentials() -> crate::credentials::CredentialTable {
    [("user1".to_string(), "key1".to_string())]
        .into_iter()
        .collect()
}

/// The reference report with a `size` byte taxi id, for filling socket buffers.
pub fn bulky_report(size: usize) -> geotaxi_codecs::PositionReport {
    let mut payload: serde_json::Value = serde_json::from_slice(&payload(VALID_HASH)).unwrap();
    payload["taxi"] = "x".repeat(size).into();
    geotaxi_codecs::PositionReport::from_slice(payload.to_string().as_bytes()).unwrap()
}

/// A TCP peer that accepts connections and never reads from them.
pub async fn stalled_peer() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    addr
}

/// Log output collected by [`capture_logs`].
#[derive(Debug, Clone, Default)]
pub struct Logs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl Logs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for Logs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Collects this thread's log output until the guard is dropped.
pub fn capture_logs() -> (Logs, tracing::subscriber::DefaultGuard) {
    let logs = Logs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    (logs, tracing::subscriber::set_default(subscriber))
}
