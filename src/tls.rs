//! TLS configuration and certificate loading.

use anyhow::{Context, Result};
use axum_server::tls_rustls::RustlsConfig;
use std::path::Path;

/// Loads the PEM certificate chain and private key.
///
/// The resulting config advertises `h2` and `http/1.1` over ALPN, so HTTP/2
/// clients negotiate it and everything else falls back to HTTP/1.1.
///
/// # Errors
///
/// Returns an error if either file is missing, unreadable, or not valid PEM.
pub async fn load_tls_config(cert_path: &Path, key_path: &Path) -> Result<RustlsConfig> {
    if !cert_path.is_file() {
        anyhow::bail!("Certificate file not found: {}", cert_path.display());
    }
    if !key_path.is_file() {
        anyhow::bail!("Private key file not found: {}", key_path.display());
    }

    RustlsConfig::from_pem_file(cert_path, key_path)
        .await
        .with_context(|| {
            format!(
                "Failed to load TLS pair ({}, {})",
                cert_path.display(),
                key_path.display()
            )
        })
}
