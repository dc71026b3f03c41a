//! Application state management.

use std::sync::{Arc, Mutex};

use tb_engine::Engine;

use crate::config::Config;

/// Shared application state: one embedded engine behind a mutex, standing
/// in for "a constrained host runtime" that owns a single engine instance.
pub struct AppState {
    /// The embedded accounting engine.
    pub engine: Mutex<Engine>,
    /// Application configuration.
    pub config: Config,
}

impl AppState {
    /// Build application state, loading a snapshot from `config.snapshot_path`
    /// if one exists.
    pub fn new(config: Config) -> Result<Arc<Self>, Box<dyn std::error::Error>> {
        let mut engine = Engine::with_system_clock(config.store);

        if config.snapshot_path.exists() {
            let bytes = std::fs::read(&config.snapshot_path)?;
            engine.load_state(&bytes)?;
            tracing::info!(path = %config.snapshot_path.display(), "loaded snapshot");
        }

        Ok(Arc::new(Self {
            engine: Mutex::new(engine),
            config,
        }))
    }

    /// Persist the current engine state to `config.snapshot_path`.
    pub fn persist(&self) -> std::io::Result<()> {
        let engine = self.engine.lock().unwrap();
        let mut buf = vec![0u8; engine.state_size()];
        engine
            .save_state(&mut buf)
            .expect("buffer sized from state_size must be large enough");
        std::fs::write(&self.config.snapshot_path, &buf)
    }
}
