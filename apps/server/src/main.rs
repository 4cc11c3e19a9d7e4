#![warn(clippy::all, clippy::pedantic)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use actix_web::{App, HttpServer, web};
use clap::Parser;
use pinger::config::parse_duration;
use pinger::{MonitoringScheduler, ProcessEnv, PrometheusReporter, ShutdownController, VerificationPipeline, load_targets};
use prometheus::Registry;
use tracing::{info, warn};

mod error;
mod routes;

use error::AppError;
use logger::init_tracing;

/// Periodic availability checks exported as Prometheus metrics
#[derive(Debug, Parser)]
#[command(name = "pinger-server", version, about)]
struct Args {
    /// Address the metrics endpoint listens on
    #[arg(long, env = "PINGER_LISTEN", default_value = "0.0.0.0:8080")]
    listen: String,

    /// Dotenv file read before the target configuration, `.env` when omitted
    #[arg(long, env = "PINGER_ENV_FILE")]
    env_file: Option<PathBuf>,

    /// Upper bound for every single network operation of a check
    #[arg(long, env = "PINGER_IO_TIMEOUT", default_value = "10s", value_parser = positive_duration)]
    io_timeout: Duration,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();
    let dotenv = match &args.env_file {
        Some(path) => dotenvy::from_path(path).map(|()| path.clone()),
        None => dotenvy::dotenv(),
    };

    init_tracing();

    match dotenv {
        Ok(path) => info!("loaded configuration from {}", path.display()),
        Err(error) if error.not_found() => info!("no env file found, using the process environment"),
        Err(error) => warn!("failed to read env file, using the process environment: {error}"),
    }

    let addr: SocketAddr = args.listen.parse()?;
    let targets = load_targets(&ProcessEnv)?;
    if targets.is_empty() {
        warn!("no HOST_ entries configured, nothing to check");
    }

    let registry = Registry::new();
    let reporter = PrometheusReporter::register(&registry, targets.values())?;
    let pipeline = VerificationPipeline::new(args.io_timeout)?;

    let shutdown = ShutdownController::new();
    let scheduler = MonitoringScheduler::new(Arc::new(pipeline), Arc::new(reporter), shutdown.clone());
    let handles = scheduler.schedule_targets(targets.into_values());
    info!(targets = handles.len(), "scheduled checks");

    let result = run_server(addr, registry, shutdown.clone()).await;

    shutdown.request_shutdown();
    for handle in handles {
        if let Err(error) = handle.await {
            warn!("scheduler task failed: {error}");
        }
    }
    info!("stopped");

    result
}

async fn run_server(addr: SocketAddr, registry: Registry, shutdown: ShutdownController) -> Result<(), AppError> {
    let registry = web::Data::new(registry);
    let server = HttpServer::new(move || App::new().app_data(registry.clone()).configure(routes::routes))
        .disable_signals()
        .bind(addr)?
        .run();

    info!("serving metrics on http://{addr}/metrics");

    let handle = server.handle();
    let signals = tokio::spawn(async move {
        wait_for_signal().await;
        info!("shutdown requested");
        shutdown.request_shutdown();
        handle.stop(true).await;
    });

    let result = server.await;
    signals.abort();

    Ok(result?)
}

/// Duration argument that must be strictly positive
fn positive_duration(value: &str) -> Result<Duration, String> {
    match parse_duration(value)? {
        duration if duration.is_zero() => Err("must be greater than zero".to_string()),
        duration => Ok(duration),
    }
}

async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
                return;
            }
            Err(error) => warn!("failed to listen for SIGTERM: {error}"),
        }
    }

    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for Ctrl+C: {error}");
    }
}
