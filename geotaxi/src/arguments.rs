use crate::queue::DEFAULT_CAPACITY;
use crate::store::StoreConfig;
use crate::telemetry;
use clap::Parser;
use reqwest::Url;
use std::num::NonZeroUsize;

fn default_workers() -> NonZeroUsize {
    std::thread::available_parallelism()
        .ok()
        .and_then(|n| NonZeroUsize::new(n.get() - 1))
        .unwrap_or(NonZeroUsize::MIN)
}

fn default_queue_size() -> NonZeroUsize {
    NonZeroUsize::new(DEFAULT_CAPACITY).unwrap_or(NonZeroUsize::MIN)
}

#[derive(Debug, Parser)]
#[command(author, version, about = "UDP ingestion gateway for taxi positions")]
pub struct Arguments {
    /// Display debug messages
    #[arg(short, long)]
    pub verbose: bool,

    /// Listen host
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Listen port
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    /// Number of workers processing messages
    #[arg(short, long, default_value_t = default_workers())]
    pub workers: NonZeroUsize,

    /// Messages waiting beyond this are dropped
    #[arg(long, default_value_t = default_queue_size())]
    pub queue_size: NonZeroUsize,

    /// Redis host
    #[arg(long, default_value = "127.0.0.1")]
    pub redis_host: String,

    /// Redis port
    #[arg(long, default_value_t = 6379)]
    pub redis_port: u16,

    /// Redis ACL user, used together with the password
    #[arg(long)]
    pub redis_username: Option<String>,

    /// Redis password
    #[arg(long, env = "REDIS_PASSWORD", hide_env_values = true)]
    pub redis_password: Option<String>,

    /// If set, do not send positions to fluentd
    #[arg(long)]
    pub disable_fluent: bool,

    /// Fluentd host
    #[arg(long, default_value = "127.0.0.1")]
    pub fluent_host: String,

    /// Fluentd forward port
    #[arg(long, default_value_t = 24224)]
    pub fluent_port: u16,

    /// Give up on a fluentd connect or write after this long
    #[arg(long, default_value_t = telemetry::DEFAULT_TIMEOUT.into())]
    pub fluent_timeout: humantime::Duration,

    /// Enable authentication
    #[arg(long)]
    pub auth_enabled: bool,

    /// APITaxi URL, used when authentication is enabled to retrieve users
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    pub api_url: Url,

    /// Key used to authenticate against the API
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Forward positions to this backend URL instead of writing them to redis
    #[arg(long)]
    pub backend_url: Option<Url>,
}

impl Arguments {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn fluent_addr(&self) -> String {
        format!("{}:{}", self.fluent_host, self.fluent_port)
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            host: self.redis_host.clone(),
            port: self.redis_port,
            username: self.redis_username.clone(),
            password: self.redis_password.clone(),
        }
    }
}
