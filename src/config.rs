use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use synq_client::Credentials;

// ============================================================================
// Config File
// ============================================================================

/// `config.toml` in the config directory
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub credentials: CredentialsSection,
}

/// `[credentials]` table
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CredentialsSection {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub api_url: Option<String>,
}

impl ConfigFile {
    /// Load a config file. A missing file is an empty config.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config file at {}", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }
}

// ============================================================================
// Credentials
// ============================================================================

/// Credentials given on the command line or through the environment.
///
/// clap fills these from `--client-id` or `SYNQ_CLIENT_ID` and so on, so
/// flags already take precedence over the environment here.
#[derive(Debug, Default, Clone)]
pub struct CredentialArgs {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub api_url: Option<String>,
}

fn pick(primary: Option<&String>, fallback: Option<&String>) -> Option<String> {
    primary
        .filter(|v| !v.trim().is_empty())
        .or_else(|| fallback.filter(|v| !v.trim().is_empty()))
        .map(|v| v.trim().to_string())
}

/// Merge command line/environment values over the config file.
///
/// Every missing value is reported in one error.
pub fn merge_credentials(args: &CredentialArgs, file: &CredentialsSection) -> Result<Credentials> {
    let client_id = pick(args.client_id.as_ref(), file.client_id.as_ref());
    let client_secret = pick(args.client_secret.as_ref(), file.client_secret.as_ref());
    let api_url = pick(args.api_url.as_ref(), file.api_url.as_ref());

    let mut missing = Vec::new();
    if client_id.is_none() {
        missing.push("SYNQ_CLIENT_ID");
    }
    if client_secret.is_none() {
        missing.push("SYNQ_CLIENT_SECRET");
    }
    if api_url.is_none() {
        missing.push("SYNQ_API_URL");
    }

    match (client_id, client_secret, api_url) {
        (Some(client_id), Some(client_secret), Some(api_url)) => Ok(Credentials {
            client_id,
            client_secret,
            api_url,
        }),
        _ => bail!("missing required credentials: {}", missing.join(", ")),
    }
}

/// Load credentials from flags, environment and the config file.
pub fn load_credentials(args: &CredentialArgs, config_path: &Path) -> Result<Credentials> {
    let file = ConfigFile::load(config_path)?;
    merge_credentials(args, &file.credentials).context("Failed to load credentials")
}
