use std::net::SocketAddr;
use std::sync::Arc;

use simulator::config::SimulatorConfig;
use simulator::dispatch::{ConsoleSink, Dispatcher, HttpIngestSink};
use simulator::time::SystemTimeSource;
use simulator::{ScenarioRegistry, Scheduler, SchedulerSettings, api};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "simulator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration from environment variables
    let config = match SimulatorConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Loaded configuration: listen_port={}, tick_interval={:?}, sink_timeout={:?}, ingest_url={}",
        config.listen_port,
        config.tick_interval,
        config.sink_timeout,
        config.ingest_url.as_deref().unwrap_or("<none>")
    );

    // Records go to stdout; logs go to stderr.
    let mut dispatcher =
        Dispatcher::new(config.sink_timeout).with_sink(Arc::new(ConsoleSink::stdout()));
    if let Some(url) = &config.ingest_url {
        match HttpIngestSink::new(url, config.sink_timeout) {
            Ok(sink) => dispatcher = dispatcher.with_sink(Arc::new(sink)),
            Err(e) => {
                tracing::error!("Failed to create ingestion sink: {e}");
                std::process::exit(1);
            }
        }
    }

    let scheduler = Scheduler::new(
        Arc::new(ScenarioRegistry::builtin()),
        Arc::new(dispatcher),
        Arc::new(SystemTimeSource::new()),
        SchedulerSettings {
            tick_interval: config.tick_interval,
            seed: config.seed,
        },
    );

    if config.baseline_on_start {
        if let Err(e) = scheduler.start_baseline() {
            tracing::error!("Failed to start baseline emission: {e}");
            std::process::exit(1);
        }
    }

    let app = api::router(scheduler.clone());

    let addr = SocketAddr::from(([127, 0, 0, 1], config.listen_port));
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to bind: {e}");
            std::process::exit(1);
        });

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Server error: {e}");
            std::process::exit(1);
        });

    if let Err(e) = scheduler.shutdown() {
        tracing::warn!("Failed to stop scenarios cleanly: {e}");
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
