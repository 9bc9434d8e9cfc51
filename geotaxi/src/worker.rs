use crate::auth::Authenticator;
use crate::dispatcher::Dispatcher;
use crate::error::PipelineError;
use crate::queue::{Datagram, WorkQueue};
use crate::store::Store;
use crate::telemetry::Telemetry;
use futures::FutureExt;
use geotaxi_codecs::PositionReport;
use std::panic::AssertUnwindSafe;
use tokio::task::JoinSet;

/// One consumer of the work queue. Owns its store connection and telemetry
/// sink; shares only the queue and the credentials with its siblings.
#[derive(Debug)]
pub struct Worker<S, T> {
    id: usize,
    queue: WorkQueue,
    authenticator: Authenticator,
    dispatcher: Dispatcher<T>,
    store: S,
}

impl<S, T> Worker<S, T>
where
    S: Store,
    T: Telemetry,
{
    pub fn new(
        id: usize,
        queue: WorkQueue,
        authenticator: Authenticator,
        dispatcher: Dispatcher<T>,
        store: S,
    ) -> Self {
        Self {
            id,
            queue,
            authenticator,
            dispatcher,
            store,
        }
    }

    /// Consumes datagrams until the queue is closed. Nothing a single
    /// datagram does, panics included, ends the loop.
    pub async fn run(mut self) {
        tracing::info!("Worker {} started", self.id);
        while let Some(datagram) = self.queue.pop().await {
            let source = datagram.source;
            match AssertUnwindSafe(self.handle(datagram)).catch_unwind().await {
                Ok(Ok(())) => {}
                Ok(Err(PipelineError::Sink(e))) => {
                    tracing::error!("Failed to record message from {source}: {e}")
                }
                Ok(Err(e)) => tracing::warn!("Dropping message from {source}: {e}"),
                Err(_) => tracing::error!(
                    "Worker {} panicked on message from {source}, continuing",
                    self.id
                ),
            }
        }
        tracing::info!("Worker {} stopped", self.id);
    }

    /// Decode, validate, authenticate, dispatch.
    pub async fn handle(&mut self, datagram: Datagram) -> Result<(), PipelineError> {
        let report = PositionReport::from_slice(&datagram.payload)?;
        tracing::debug!("Received from {}: {report:?}", datagram.source);

        let ip = datagram.source.ip();
        self.authenticator
            .check(&report, ip, &mut self.store)
            .await?;
        self.dispatcher
            .dispatch(&report, ip, &mut self.store)
            .await?;
        Ok(())
    }
}

/// Starts `count` workers, building each one's private store and dispatcher
/// with `connect`.
pub fn spawn_pool<S, T, F>(
    count: usize,
    queue: &WorkQueue,
    authenticator: &Authenticator,
    mut connect: F,
) -> JoinSet<()>
where
    S: Store + 'static,
    T: Telemetry + 'static,
    F: FnMut(usize) -> (S, Dispatcher<T>),
{
    let mut workers = JoinSet::new();
    for id in 0..count {
        let (store, dispatcher) = connect(id);
        let worker = Worker::new(id, queue.clone(), authenticator.clone(), dispatcher, store);
        workers.spawn(worker.run());
    }
    workers
}
