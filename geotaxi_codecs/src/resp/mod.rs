//! Just enough of RESP to pipeline writes to a Redis-compatible store.

use crate::{Latitude, Longitude};
use bytes::{Bytes, BytesMut};
use decoder::ReplyDecoder;
use encoder::CommandEncoder;
use itertools::Itertools;
use std::fmt;
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder};

pub mod decoder;
pub mod encoder;

#[derive(Debug, Error)]
pub enum RespError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("protocol violation: {0}")]
    Protocol(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Auth {
        username: Option<String>,
        password: String,
    },
    HSet {
        key: String,
        field: String,
        value: String,
    },
    GeoAdd {
        key: String,
        lon: Longitude,
        lat: Latitude,
        member: String,
    },
    ZAdd {
        key: String,
        score: u64,
        member: String,
    },
    ZIncrBy {
        key: String,
        increment: i64,
        member: String,
    },
    SAdd {
        key: String,
        member: String,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Auth { .. } => "AUTH",
            Command::HSet { .. } => "HSET",
            Command::GeoAdd { .. } => "GEOADD",
            Command::ZAdd { .. } => "ZADD",
            Command::ZIncrBy { .. } => "ZINCRBY",
            Command::SAdd { .. } => "SADD",
        }
    }

    /// Arguments following the command name, as sent on the wire.
    pub fn args(&self) -> Vec<String> {
        match self {
            Command::Auth { username, password } => username
                .iter()
                .cloned()
                .chain(std::iter::once(password.clone()))
                .collect(),
            Command::HSet { key, field, value } => vec![key.clone(), field.clone(), value.clone()],
            Command::GeoAdd {
                key,
                lon,
                lat,
                member,
            } => vec![key.clone(), lon.to_string(), lat.to_string(), member.clone()],
            Command::ZAdd { key, score, member } => {
                vec![key.clone(), score.to_string(), member.clone()]
            }
            Command::ZIncrBy {
                key,
                increment,
                member,
            } => vec![key.clone(), increment.to_string(), member.clone()],
            Command::SAdd { key, member } => vec![key.clone(), member.clone()],
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // never log secrets
            Command::Auth { .. } => write!(f, "AUTH ****"),
            _ => write!(f, "{} {}", self.name(), self.args().iter().join(" ")),
        }
    }
}

/// Combined codec for a store connection: commands out, replies in.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Resp;

impl Encoder<Command> for Resp {
    type Error = RespError;

    fn encode(&mut self, item: Command, dst: &mut BytesMut) -> Result<(), Self::Error> {
        CommandEncoder.encode(item, dst)
    }
}

impl Decoder for Resp {
    type Item = Reply;

    type Error = RespError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        ReplyDecoder.decode(src)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    Simple(String),
    Error(String),
    Integer(i64),
    Bulk(Option<Bytes>),
    Array(Option<Vec<Reply>>),
}
