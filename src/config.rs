//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before the logger
//! and the server are initialized.
//!
//! ## Variables
//!
//! - `BACKEND_ENV_PORT` - Listen port (default: `5000`)
//! - `NODE_ENV` - Deployment environment; `production` disables console logging
//!   (default: `development`)
//! - `CERT_DIR` - Directory holding `server.key` and `server.cert` (default: `cert`)
//! - `LOG_DIR` - Directory for rotating log files (default: `logs`)
//! - `RUST_LOG` - Log filter directives (default: `info`)
//! - `BEHIND_PROXY` - Trust `X-Forwarded-For` / `X-Real-IP` for the client IP
//!   (default: `false`)

use anyhow::Result;
use std::env;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Port used when `BACKEND_ENV_PORT` is unset or not a number.
pub const DEFAULT_PORT: u16 = 5000;

/// File name of the PEM private key inside [`Config::cert_dir`].
pub const KEY_FILE: &str = "server.key";

/// File name of the PEM certificate chain inside [`Config::cert_dir`].
pub const CERT_FILE: &str = "server.cert";

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub node_env: String,
    pub cert_dir: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
    /// When true, the client IP is read from X-Forwarded-For / X-Real-IP headers.
    /// Enable only when the service is behind a trusted reverse proxy.
    pub behind_proxy: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// Missing or unparsable values fall back to their defaults; use
    /// [`Config::validate`] to reject inconsistent combinations.
    pub fn from_env() -> Result<Self> {
        let port = env::var("BACKEND_ENV_PORT")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let node_env = env::var("NODE_ENV").unwrap_or_else(|_| "development".to_string());
        let cert_dir = env::var("CERT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("cert"));
        let log_dir = env::var("LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("logs"));
        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let behind_proxy = env::var("BEHIND_PROXY")
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false);

        Ok(Self {
            port,
            node_env,
            cert_dir,
            log_dir,
            log_level,
            behind_proxy,
        })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `port` is 0
    /// - `cert_dir` or `log_dir` is empty
    /// - `log_level` is empty
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("BACKEND_ENV_PORT must be between 1 and 65535");
        }

        if self.cert_dir.as_os_str().is_empty() {
            anyhow::bail!("CERT_DIR must not be empty");
        }

        if self.log_dir.as_os_str().is_empty() {
            anyhow::bail!("LOG_DIR must not be empty");
        }

        if self.log_level.trim().is_empty() {
            anyhow::bail!("RUST_LOG must not be empty");
        }

        Ok(())
    }

    /// Returns whether the service runs with `NODE_ENV=production`.
    pub fn is_production(&self) -> bool {
        self.node_env == "production"
    }

    /// Address the HTTPS server binds to (all interfaces).
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }

    pub fn key_path(&self) -> PathBuf {
        self.cert_dir.join(KEY_FILE)
    }

    pub fn cert_path(&self) -> PathBuf {
        self.cert_dir.join(CERT_FILE)
    }

    /// Prints configuration summary.
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Listen address: {}", self.listen_addr());
        tracing::info!("  Environment: {}", self.node_env);
        tracing::info!("  Certificates: {}", self.cert_dir.display());
        tracing::info!("  Log directory: {}", self.log_dir.display());
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Behind proxy: {}", self.behind_proxy);
    }
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
