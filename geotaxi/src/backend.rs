use geotaxi_codecs::PositionReport;
use reqwest::Url;
use serde::Serialize;
use std::net::IpAddr;

#[derive(Debug, Serialize)]
struct Position<'a> {
    #[serde(flatten)]
    report: &'a PositionReport,
    from_ip: String,
}

#[derive(Debug, Serialize)]
struct Positions<'a> {
    data: [Position<'a>; 1],
}

/// Forwards accepted reports to a backend HTTP API instead of writing them to
/// the store. One POST per report, never retried.
#[derive(Debug, Clone)]
pub struct Backend {
    client: reqwest::Client,
    url: Url,
    api_key: Option<String>,
}

impl Backend {
    pub fn new(url: Url, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            api_key,
        }
    }

    pub async fn forward(&self, report: &PositionReport, source: IpAddr) -> reqwest::Result<()> {
        let body = Positions {
            data: [Position {
                report,
                from_ip: source.to_string(),
            }],
        };
        let mut request = self
            .client
            .post(self.url.clone())
            .header("X-Version", "2")
            .json(&body);
        if let Some(api_key) = &self.api_key {
            request = request.header("X-Api-Key", api_key);
        }
        request.send().await?.error_for_status()?;
        Ok(())
    }
}
