use crate::queue::WorkQueue;
use tokio::signal::unix::{signal, Signal, SignalKind};
use tokio_util::sync::CancellationToken;

/// Signal handling for the process hosting the receiver.
///
/// SIGINT and SIGTERM cancel `shutdown`. SIGUSR1 prints the queue depth to
/// stdout and changes nothing. Workers never see any of these.
#[derive(Debug)]
pub struct Control {
    queue: WorkQueue,
    shutdown: CancellationToken,
    interrupt: Signal,
    terminate: Signal,
    diagnostic: Signal,
}

impl Control {
    /// Installs the handlers right away so no signal is missed between
    /// startup and the first poll.
    pub fn new(queue: WorkQueue, shutdown: CancellationToken) -> std::io::Result<Self> {
        Ok(Self {
            queue,
            shutdown,
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
            diagnostic: signal(SignalKind::user_defined1())?,
        })
    }

    pub async fn run(mut self) {
        loop {
            tokio::select! {
                _ = self.interrupt.recv() => {
                    tracing::info!("Interrupted, shutting down");
                    break;
                }
                _ = self.terminate.recv() => {
                    tracing::info!("Terminated, shutting down");
                    break;
                }
                _ = self.diagnostic.recv() => println!("{}", depth(&self.queue)),
                _ = self.shutdown.cancelled() => return,
            }
        }
        self.shutdown.cancel();
    }
}

pub fn depth(queue: &WorkQueue) -> String {
    format!(
        "Queue size: {}/{} ({} dropped)",
        queue.len(),
        queue.capacity(),
        queue.dropped()
    )
}
