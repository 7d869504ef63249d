//! Command implementations

pub mod deploy;
pub mod export;

use crate::config::{CredentialArgs, load_credentials};
use crate::progress;
use anyhow::{Context as _, Result};
use std::path::Path;
use synq_client::HttpBackend;

/// Load credentials and authenticate against the service
pub fn connect(quiet: bool, args: &CredentialArgs, config_path: &Path) -> Result<HttpBackend> {
    let credentials = load_credentials(args, config_path)?;
    log::debug!("Using {:?}", credentials);

    let pb = if quiet {
        progress::hidden()
    } else {
        progress::spinner("Authenticating...")
    };
    match HttpBackend::connect(&credentials) {
        Ok(backend) => {
            progress::finish_success(&pb, &format!("Connected to {}", backend.api_base()));
            Ok(backend)
        }
        Err(e) => {
            progress::finish_error(&pb, "Authentication failed");
            crate::ui::dim(e.category().advice());
            Err(e).context("Failed to connect")
        }
    }
}
