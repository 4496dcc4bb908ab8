//! wayfinderd - advisory service for the Wayfinder navigation aid
//!
//! This daemon:
//! 1. Loads configuration and registers the detector backend
//! 2. Serves the detection/advisory HTTP API
//! 3. Shuts down cleanly on Ctrl-C

use anyhow::{anyhow, Result};
use std::sync::mpsc;

use wayfinder::api::{ApiConfig, ApiServer};
use wayfinder::config::WayfinderdConfig;
use wayfinder::{BackendRegistry, Frame, StubBackend};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = WayfinderdConfig::load()?;

    let mut registry = BackendRegistry::new();
    registry.register(StubBackend::new(Frame::new(640, 480)?, vec![]));
    registry.set_default(&config.detector.backend).map_err(|_| {
        anyhow!(
            "configured detector backend '{}' is not available",
            config.detector.backend
        )
    })?;
    if let Some(backend) = registry.default_backend() {
        backend
            .lock()
            .map_err(|_| anyhow!("backend lock poisoned"))?
            .warm_up()?;
    }
    log::info!("detector backend: {}", config.detector.backend);

    let api_config = ApiConfig {
        addr: config.api_addr.clone(),
        min_confidence: config.detector.min_confidence,
    };
    let api_handle = ApiServer::new(api_config, registry).spawn()?;
    log::info!("advisory api listening on {}", api_handle.addr);

    let (tx, rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })
    .expect("error setting Ctrl-C handler");

    log::info!("wayfinderd waiting for shutdown signal (Ctrl-C)...");
    let _ = rx.recv();
    log::info!("shutdown signal received, stopping API server...");
    api_handle.stop()?;

    Ok(())
}
