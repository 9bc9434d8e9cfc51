use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use geotaxi_codecs::resp::{Command, Reply, Resp, RespError};
use itertools::Itertools;
use std::fmt;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

#[cfg(test)]
pub mod memory;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unable to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Connection(#[from] RespError),

    #[error("connection closed by store")]
    Closed,

    #[error("authentication refused: {0}")]
    Auth(String),

    #[error("{} of {total} actions failed: {}", .failed.len(), .failed.iter().join("; "))]
    Actions {
        failed: Vec<FailedAction>,
        total: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FailedAction {
    pub command: Command,
    pub reason: String,
}

impl fmt::Display for FailedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.command, self.reason)
    }
}

/// A store that accepts commands in pipelined batches.
///
/// A batch is not a transaction: commands before a failing one stay applied.
#[async_trait]
pub trait Store: Send {
    async fn pipeline(&mut self, commands: Vec<Command>) -> Result<(), StoreError>;
}

/// Pipelines commands over any byte stream speaking RESP.
#[derive(Debug)]
pub struct RespStore<T> {
    framed: Framed<T, Resp>,
}

impl<T> RespStore<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(io: T) -> Self {
        Self {
            framed: Framed::new(io, Resp),
        }
    }

    pub async fn authenticate(
        &mut self,
        username: Option<String>,
        password: String,
    ) -> Result<(), StoreError> {
        self.framed
            .send(Command::Auth { username, password })
            .await?;
        match self.framed.next().await {
            Some(Ok(Reply::Error(reason))) => Err(StoreError::Auth(reason)),
            Some(Ok(_)) => Ok(()),
            Some(Err(e)) => Err(e.into()),
            None => Err(StoreError::Closed),
        }
    }
}

#[async_trait]
impl<T> Store for RespStore<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn pipeline(&mut self, commands: Vec<Command>) -> Result<(), StoreError> {
        let total = commands.len();
        for command in &commands {
            self.framed.feed(command.clone()).await?;
        }
        self.framed.flush().await?;

        let mut failed = Vec::new();
        for command in commands {
            match self.framed.next().await {
                Some(Ok(Reply::Error(reason))) => failed.push(FailedAction { command, reason }),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => return Err(StoreError::Closed),
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Actions { failed, total })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl StoreConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// A worker's private store connection, opened on first use and reopened
/// after any connection-level failure.
#[derive(Debug)]
pub struct RedisStore {
    config: StoreConfig,
    connection: Option<RespStore<TcpStream>>,
}

impl RedisStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            connection: None,
        }
    }

    async fn connect(&self) -> Result<RespStore<TcpStream>, StoreError> {
        let addr = self.config.addr();
        let stream = match TcpStream::connect(&addr).await {
            Ok(stream) => stream,
            Err(source) => return Err(StoreError::Connect { addr, source }),
        };
        stream.set_nodelay(true).ok();
        let mut connection = RespStore::new(stream);
        if let Some(password) = &self.config.password {
            connection
                .authenticate(self.config.username.clone(), password.clone())
                .await?;
        }
        tracing::debug!("Connected to store at {}", self.config.addr());
        Ok(connection)
    }
}

#[async_trait]
impl Store for RedisStore {
    async fn pipeline(&mut self, commands: Vec<Command>) -> Result<(), StoreError> {
        let connection = match self.connection.take() {
            Some(connection) => connection,
            None => self.connect().await?,
        };
        let connection = self.connection.insert(connection);
        let result = connection.pipeline(commands).await;
        if matches!(
            result,
            Err(StoreError::Connection(_) | StoreError::Closed)
        ) {
            self.connection = None;
        }
        result
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tokio_test::io::Builder;

    fn sadd() -> Command {
        Command::SAdd {
            key: "ips:user1".to_string(),
            member: "127.0.0.1".to_string(),
        }
    }

    fn zadd() -> Command {
        Command::ZAdd {
            key: "timestamps_id".to_string(),
            score: 42,
            member: "taxi".to_string(),
        }
    }

    #[tokio::test]
    async fn pipelines_then_reads_every_reply() {
        let mock = Builder::new()
            .write(b"*3\r\n$4\r\nSADD\r\n$9\r\nips:user1\r\n$9\r\n127.0.0.1\r\n")
            .write(b"*4\r\n$4\r\nZADD\r\n$13\r\ntimestamps_id\r\n$2\r\n42\r\n$4\r\ntaxi\r\n")
            .read(b":1\r\n:1\r\n")
            .build();
        let mut store = RespStore::new(mock);
        store.pipeline(vec![sadd(), zadd()]).await.unwrap();
    }

    #[tokio::test]
    async fn reports_failed_actions_only() {
        let mock = Builder::new()
            .write(b"*3\r\n$4\r\nSADD\r\n$9\r\nips:user1\r\n$9\r\n127.0.0.1\r\n")
            .write(b"*4\r\n$4\r\nZADD\r\n$13\r\ntimestamps_id\r\n$2\r\n42\r\n$4\r\ntaxi\r\n")
            .read(b"-WRONGTYPE bad key\r\n:1\r\n")
            .build();
        let mut store = RespStore::new(mock);
        let err = store.pipeline(vec![sadd(), zadd()]).await.unwrap_err();
        match &err {
            StoreError::Actions { failed, total } => {
                assert_eq!(*total, 2);
                assert_eq!(
                    failed,
                    &vec![FailedAction {
                        command: sadd(),
                        reason: "WRONGTYPE bad key".to_string(),
                    }]
                );
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(
            err.to_string(),
            "1 of 2 actions failed: SADD ips:user1 127.0.0.1 (WRONGTYPE bad key)"
        );
    }

    #[tokio::test]
    async fn closed_mid_batch() {
        let mock = Builder::new()
            .write(b"*3\r\n$4\r\nSADD\r\n$9\r\nips:user1\r\n$9\r\n127.0.0.1\r\n")
            .write(b"*4\r\n$4\r\nZADD\r\n$13\r\ntimestamps_id\r\n$2\r\n42\r\n$4\r\ntaxi\r\n")
            .read(b":1\r\n")
            .build();
        let mut store = RespStore::new(mock);
        let err = store.pipeline(vec![sadd(), zadd()]).await.unwrap_err();
        assert!(matches!(err, StoreError::Closed));
    }

    #[tokio::test]
    async fn authenticates() {
        let mock = Builder::new()
            .write(b"*3\r\n$4\r\nAUTH\r\n$7\r\ngeotaxi\r\n$6\r\ns3cr3t\r\n")
            .read(b"+OK\r\n")
            .write(b"*2\r\n$4\r\nAUTH\r\n$5\r\nwrong\r\n")
            .read(b"-WRONGPASS invalid username-password pair\r\n")
            .build();
        let mut store = RespStore::new(mock);
        store
            .authenticate(Some("geotaxi".to_string()), "s3cr3t".to_string())
            .await
            .unwrap();
        let err = store
            .authenticate(None, "wrong".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Auth(_)));
    }

    #[tokio::test]
    async fn unreachable_store() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let mut store = RedisStore::new(StoreConfig {
            host: "127.0.0.1".to_string(),
            port,
            username: None,
            password: None,
        });
        let err = store.pipeline(vec![sadd()]).await.unwrap_err();
        assert!(matches!(err, StoreError::Connect { .. }));
    }
}
