//! Credentials, endpoint parsing and the OAuth client-credentials exchange

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fmt;

/// Client credentials for the service
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub api_url: String,
}

// Never print the secret.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// A parsed API URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub scheme: String,
    /// Host, including an explicit port when one was given
    pub host: String,
}

impl Endpoint {
    /// Parse `https://host[:port][/...]`. Only `http` and `https` are accepted.
    pub fn parse(url: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        };

        let (scheme, rest) = url
            .trim()
            .split_once("://")
            .ok_or_else(|| invalid("missing scheme, expected https://<host>"))?;
        let scheme = scheme.to_ascii_lowercase();
        if scheme != "https" && scheme != "http" {
            return Err(invalid(&format!("unsupported protocol '{scheme}'")));
        }

        let host = rest.split('/').next().unwrap_or_default();
        if host.is_empty() {
            return Err(invalid("missing host"));
        }

        Ok(Self {
            scheme,
            host: host.to_string(),
        })
    }

    /// Base URL for RPC calls
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }

    /// OAuth token endpoint; always served over TLS
    pub fn token_url(&self) -> String {
        format!("https://{}/oauth2/token", self.host)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
}

/// Exchange client credentials for a bearer token.
pub fn fetch_token(
    agent: &ureq::Agent,
    token_url: &str,
    credentials: &Credentials,
) -> Result<String> {
    log::debug!(
        "requesting token for client {} from {}",
        credentials.client_id,
        token_url
    );

    let mut response = agent
        .post(token_url)
        .header("Accept", "application/json")
        .send_form([
            ("grant_type", "client_credentials"),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
        ])
        .map_err(|e| Error::Auth(e.to_string()))?;

    let token: TokenResponse = response
        .body_mut()
        .read_json()
        .map_err(|e| Error::Auth(format!("invalid token response: {e}")))?;

    if let Some(kind) = &token.token_type {
        if !kind.eq_ignore_ascii_case("bearer") {
            return Err(Error::Auth(format!("unsupported token type '{kind}'")));
        }
    }
    Ok(token.access_token)
}
