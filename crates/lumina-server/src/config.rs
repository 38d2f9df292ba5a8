//! Configuration for the control-plane process.
//!
//! All configuration is loaded from environment variables; every option
//! has a default so a bare `lumina-server` starts on a development
//! machine with a local NATS broker.

use std::time::Duration;

/// Default NATS broker URL.
const DEFAULT_NATS_URL: &str = "nats://localhost:4222";

/// Default event/snapshot database file.
const DEFAULT_DB_PATH: &str = "data/control_plane.db";

/// Default HTTP/WebSocket listen port.
const DEFAULT_LISTEN_PORT: u16 = 8090;

/// Default private-mode unlock code.
const DEFAULT_PRIVATE_MODE_CODE: &str = "unlock";

/// Default seconds between periodic state snapshots.
const DEFAULT_SNAPSHOT_INTERVAL_SECS: u64 = 60;

/// A configuration value that could not be parsed.
#[derive(Debug, thiserror::Error)]
#[error("configuration error: {0}")]
pub struct ConfigError(pub String);

/// Complete server configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// NATS broker URL (`NATS_URL`).
    pub nats_url: String,
    /// Event/snapshot database file (`DB_PATH`).
    pub db_path: String,
    /// HTTP/WebSocket listen port (`LISTEN_PORT`).
    pub listen_port: u16,
    /// Code compared against `system.setMode` payloads
    /// (`PRIVATE_MODE_CODE`).
    pub private_mode_code: String,
    /// Period between state snapshots (`SNAPSHOT_INTERVAL_SECS`).
    pub snapshot_interval: Duration,
    /// NATS subject patches are published on (`STATE_SUBJECT`).
    pub state_subject: String,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Recognised variables (all optional):
    /// - `NATS_URL` -- broker location (default `nats://localhost:4222`)
    /// - `DB_PATH` -- database file (default `data/control_plane.db`)
    /// - `LISTEN_PORT` -- HTTP/WS port (default `8090`)
    /// - `PRIVATE_MODE_CODE` -- private-mode unlock code (default `unlock`)
    /// - `SNAPSHOT_INTERVAL_SECS` -- snapshot period (default `60`)
    /// - `STATE_SUBJECT` -- patch subject (default `lumina.state`)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a numeric variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let nats_url =
            std::env::var("NATS_URL").unwrap_or_else(|_| DEFAULT_NATS_URL.to_owned());
        let db_path = std::env::var("DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_owned());

        let listen_port: u16 = std::env::var("LISTEN_PORT")
            .unwrap_or_else(|_| DEFAULT_LISTEN_PORT.to_string())
            .parse()
            .map_err(|e| ConfigError(format!("invalid LISTEN_PORT: {e}")))?;

        let private_mode_code = std::env::var("PRIVATE_MODE_CODE")
            .unwrap_or_else(|_| DEFAULT_PRIVATE_MODE_CODE.to_owned());

        let snapshot_interval_secs: u64 = std::env::var("SNAPSHOT_INTERVAL_SECS")
            .unwrap_or_else(|_| DEFAULT_SNAPSHOT_INTERVAL_SECS.to_string())
            .parse()
            .map_err(|e| ConfigError(format!("invalid SNAPSHOT_INTERVAL_SECS: {e}")))?;

        let state_subject = std::env::var("STATE_SUBJECT")
            .unwrap_or_else(|_| lumina_bus::DEFAULT_SUBJECT.to_owned());

        Ok(Self {
            nats_url,
            db_path,
            listen_port,
            private_mode_code,
            snapshot_interval: Duration::from_secs(snapshot_interval_secs),
            state_subject,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            nats_url: DEFAULT_NATS_URL.to_owned(),
            db_path: DEFAULT_DB_PATH.to_owned(),
            listen_port: DEFAULT_LISTEN_PORT,
            private_mode_code: DEFAULT_PRIVATE_MODE_CODE.to_owned(),
            snapshot_interval: Duration::from_secs(DEFAULT_SNAPSHOT_INTERVAL_SECS),
            state_subject: lumina_bus::DEFAULT_SUBJECT.to_owned(),
        }
    }
}
