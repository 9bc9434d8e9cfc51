use clap::Parser;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(author, version, about = "Sends signed positions of one fake taxi to a geotaxi gateway")]
pub struct Arguments {
    /// Gateway host
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Gateway port
    #[arg(long, default_value_t = 8080)]
    pub port: u16,

    /// Number of messages to send
    #[arg(default_value_t = 1)]
    pub num: usize,

    /// Time to sleep between two messages
    #[arg(short, long, default_value_t = Duration::from_millis(1).into())]
    pub sleep: humantime::Duration,

    /// API key, to set if the gateway has authentication enabled (random otherwise)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Operator name, must own `--api-key` if the gateway has authentication enabled
    #[arg(long, default_value = "fake_operator")]
    pub operator: String,
}
