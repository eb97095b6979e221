use std::sync::Arc;

use models::{ConsoleApp, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod engine;
mod models;
mod orchestrator;
mod sandbox;
mod stats;

use config::{load_config, Config, EngineMode};
use engine::HttpEngine;
use orchestrator::Orchestrator;
use sandbox::SandboxRegistry;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let mut config = match load_config("config.yml").await {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to load config.yml: {}. Using defaults.", e);
            Config::default()
        }
    };
    config.apply_env_overrides();

    // Setup logging
    std::env::set_var(
        "RUST_LOG",
        format!(
            "lead_console={},hyper=warn,rocket=warn,reqwest=warn",
            config.logging.level
        ),
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("lead_console=info".parse().unwrap()),
        )
        .init();

    // Create output directory
    tokio::fs::create_dir_all(&config.output.directory).await?;

    // In sandbox mode the console boots its own engine and points the HTTP
    // client at the loopback port, so the rest of the app cannot tell the
    // difference from a remote deployment.
    let (base_url, sandbox_shutdown) = match config.engine.mode {
        EngineMode::Sandbox => {
            info!("Starting embedded sandbox engine...");
            let shutdown = sandbox::launch(&config.sandbox, SandboxRegistry::new()).await?;
            (config.sandbox.url(), Some(shutdown))
        }
        EngineMode::Remote => (config.engine.base_url.clone(), None),
    };
    info!("🎯 Pipeline engine: {}", base_url);

    let engine = HttpEngine::new(&base_url, config.engine.request_timeout())?;
    let orchestrator = Arc::new(Orchestrator::new(
        Box::new(engine),
        config.orchestrator.trigger_grace(),
    ));

    // Background poller keeps the view fresh while the menu is idle.
    let poller = orchestrator.spawn_poller(config.orchestrator.poll_interval());

    let app = ConsoleApp::new(config, Arc::clone(&orchestrator));

    // Add graceful shutdown
    tokio::select! {
        result = app.run() => {
            result?;
        }
        _ = signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    poller.stop().await;
    if let Some(shutdown) = sandbox_shutdown {
        shutdown.notify();
    }

    Ok(())
}
