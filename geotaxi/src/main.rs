use anyhow::Context;
use arguments::Arguments;
use auth::Authenticator;
use backend::Backend;
use clap::{error::ErrorKind, CommandFactory, Parser};
use control::Control;
use credentials::CredentialTable;
use dispatcher::{Destination, Dispatcher};
use queue::WorkQueue;
use receiver::Receiver;
use std::sync::Arc;
use store::RedisStore;
use telemetry::FluentTelemetry;
use tokio_util::sync::CancellationToken;

mod arguments;
mod auth;
mod backend;
mod clock;
mod control;
mod credentials;
mod dispatcher;
mod error;
mod queue;
mod receiver;
mod store;
mod telemetry;
#[cfg(test)]
mod testing;
mod worker;

const FLUENT_PREFIX: &str = "geotaxi";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Arguments::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    // Signal handlers must be installed before any slow startup step.
    let queue = WorkQueue::bounded(args.queue_size.get());
    let shutdown = CancellationToken::new();
    let control = Control::new(queue.clone(), shutdown.clone())?;

    let authenticator = if args.auth_enabled {
        let Some(api_key) = args.api_key.as_deref() else {
            Arguments::command()
                .error(
                    ErrorKind::MissingRequiredArgument,
                    "API_KEY is required when authentication is enabled",
                )
                .exit();
        };
        let credentials = CredentialTable::fetch(&args.api_url, api_key)
            .await
            .context("Unable to retrieve operators from the API")?;
        tracing::info!("Loaded credentials of {} operators", credentials.len());
        Authenticator::Enabled(Arc::new(credentials))
    } else {
        tracing::warn!("Authentication disabled, reports are accepted without checking their hash");
        Authenticator::Disabled
    };

    let receiver = Receiver::bind(&args.listen_addr())
        .await
        .with_context(|| format!("Unable to bind {}", args.listen_addr()))?;
    tracing::info!(
        "Listening on {}, {} workers, authentication {}",
        receiver.local_addr()?,
        args.workers,
        if args.auth_enabled { "enabled" } else { "disabled" }
    );

    let destination = match &args.backend_url {
        Some(url) => {
            tracing::info!("Forwarding positions to {url}");
            Destination::Backend(Backend::new(url.clone(), args.api_key.clone()))
        }
        None => Destination::Store,
    };
    let mut workers = worker::spawn_pool(args.workers.get(), &queue, &authenticator, |_| {
        let telemetry = (!args.disable_fluent).then(|| {
            FluentTelemetry::new(args.fluent_addr(), FLUENT_PREFIX, *args.fluent_timeout)
        });
        (
            RedisStore::new(args.store_config()),
            Dispatcher::new(telemetry, destination.clone()),
        )
    });

    tokio::spawn(control.run());

    receiver.run(queue.clone(), shutdown).await;

    queue.close();
    workers.abort_all();
    while workers.join_next().await.is_some() {}
    tracing::info!("Shutdown complete");

    Ok(())
}
