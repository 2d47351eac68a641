use std::path::Path;
use std::sync::Arc;

use tokio::signal::unix::signal;
use tokio::signal::unix::SignalKind;
use tokio::sync::watch;
use tracing::error;
use tracing::info;
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use windock::utils::file_io::open_file_for_append;
use windock::DesktopFixture;
use windock::DockConfig;
use windock::DockEngine;
use windock::Error;
use windock::Result;
use windock::StaticDesktop;
use windock::UpdateReason;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<()> {
    let config = DockConfig::new()?.validate()?;

    let _log_guard = init_logging(&config.log.dir, &config.log.file)?;
    info!(?config, "windock configuration loaded");

    // Desktop state replayed from a fixture file
    let desktop = match std::env::args().nth(1) {
        Some(path) => {
            info!(%path, "loading desktop fixture");
            Arc::new(StaticDesktop::from_fixture(DesktopFixture::load(&path)?))
        }
        None => {
            warn!("no desktop fixture given, starting with an empty desktop");
            Arc::new(StaticDesktop::new())
        }
    };

    let (stop_tx, stop_rx) = watch::channel(());
    let engine = DockEngine::start(
        &config,
        desktop.clone(),
        desktop.clone(),
        desktop,
        stop_rx,
    );

    let mut snapshots = engine.subscribe();
    tokio::spawn(async move {
        while let Some(snapshot) = snapshots.next().await {
            let ids: Vec<String> = snapshot.ids().iter().map(|id| id.to_string()).collect();
            info!(sequence = snapshot.sequence, ?ids, "dock updated");
        }
    });

    engine.request_update(UpdateReason::ManualRefresh);

    tokio::spawn(async {
        if let Err(e) = stop_on_signal(stop_tx).await {
            error!("windock could not broadcast stop: {:?}", e);
        }
    });

    info!("windock running, send SIGINT or SIGTERM to stop");
    engine.join().await;
    info!("windock stopped");
    Ok(())
}

/// Waits for the first termination signal and broadcasts it to the engine.
async fn stop_on_signal(stop_tx: watch::Sender<()>) -> Result<()> {
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    let received = tokio::select! {
        _ = interrupt.recv() => "SIGINT",
        _ = terminate.recv() => "SIGTERM",
        _ = tokio::signal::ctrl_c() => "ctrl-c",
    };
    info!(signal = received, "stopping windock");

    stop_tx
        .send(())
        .map_err(|e| Error::SignalSenderClosed(format!("dock engine already gone: {e}")))
}

/// File logging under `dir`; `RUST_LOG` overrides the default `windock=info`.
fn init_logging(dir: &Path, file: &str) -> Result<WorkerGuard> {
    let writer = open_file_for_append(&dir.join(file))?;
    let (non_blocking, guard) = tracing_appender::non_blocking(writer);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("windock=info"));
    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(non_blocking)
        .with_filter(filter);
    tracing_subscriber::registry().with(file_layer).init();

    Ok(guard)
}
