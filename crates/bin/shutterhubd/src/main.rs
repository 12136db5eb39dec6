//! # shutterhubd — shutterhub daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (TOML file, env var overrides)
//! - Load and validate the catalog documents (devices, groups, schedules)
//! - Construct the device directory, event bus, and gateway client
//! - Start the command dispatcher (terminal consumer of command events)
//! - Spawn the scheduler engine's tick loop
//! - Build the axum router and serve until SIGTERM/ctrl-c
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod catalog;
mod config;

use std::sync::Arc;

use shutterhub_adapter_http_axum::router;
use shutterhub_adapter_http_axum::state::AppState;
use shutterhub_adapter_overkiz::OverkizClient;
use shutterhub_app::dispatcher::CommandDispatcher;
use shutterhub_app::event_bus::EventBus;
use shutterhub_app::scheduler::SchedulerEngine;
use shutterhub_domain::directory::DeviceDirectory;

use crate::catalog::Catalogs;
use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    init_tracing(&config.logging.filter);

    let catalogs = Catalogs::load(&config.paths)?;
    tracing::info!(
        devices = catalogs.devices.len(),
        device_groups = catalogs.device_groups.len(),
        schedules = catalogs.schedules.len(),
        "catalogs loaded"
    );

    let directory = Arc::new(DeviceDirectory::new(
        catalogs.devices,
        catalogs.device_groups,
    ));
    let bus = EventBus::new();

    // Dispatcher — terminal consumer of command events.
    let gateway = OverkizClient::new(config.overkiz_config())?;
    let dispatcher = CommandDispatcher::new(gateway);
    let _subscriptions = dispatcher.start(&bus);

    // Scheduler — producer driven by the tick loop.
    let engine = SchedulerEngine::new(
        catalogs.schedules.clone(),
        Arc::clone(&directory),
        bus.clone(),
        &config.scheduler_config(),
    );
    tokio::spawn(engine.run());

    // REST gateway — producer driven by HTTP requests.
    let state = AppState::new(bus, directory, catalogs.schedules);
    let app = router::build(state, &config.router_config());

    let bind_addr = config.bind_addr();
    tracing::info!(%bind_addr, "shutterhubd listening");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutterhubd stopped");
    Ok(())
}

fn init_tracing(filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            // No signal handler available; fall through to shutdown.
            tracing::error!("failed to install ctrl-c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
