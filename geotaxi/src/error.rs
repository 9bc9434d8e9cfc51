use crate::store::StoreError;
use geotaxi_codecs::resp::Command;
use geotaxi_codecs::TransportError;
use itertools::Itertools;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("user {0} not valid")]
    UnknownOperator(String),

    #[error("invalid hash for operator {operator}, taxi {taxi}")]
    BadDigest { operator: String, taxi: String },
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("error while running store actions [{actions}]: {source}")]
    Store {
        actions: String,
        #[source]
        source: StoreError,
    },

    #[error("error while forwarding to backend: {0}")]
    Backend(#[from] reqwest::Error),
}

impl SinkError {
    /// Names every action of the failed batch alongside the cause.
    pub fn store(actions: &[Command], source: StoreError) -> Self {
        Self::Store {
            actions: actions.iter().join(", "),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("unable to retrieve users from {url}: {source}")]
    Registry {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid registry URL {url}: {reason}")]
    RegistryUrl { url: String, reason: String },
}

/// Everything that can go wrong with one datagram. Never outlives it.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}
