//! Connection settings for the Conductor server.
//!
//! Every setting is a flag with an environment fallback, read once when the
//! client is built.

use std::time::Duration;

use clap::Args;
use conductor_client::ConductorClient;
use tracing::debug;

use crate::error::{Result, WrapperError};

/// Server used when neither `--server-url` nor `CONDUCTOR_SERVER_URL` is set.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080/api";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How to reach the Conductor server.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Conductor server API URL
    #[arg(long, env = "CONDUCTOR_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    pub server_url: String,

    /// Key id exchanged for an access token
    #[arg(long, env = "CONDUCTOR_AUTH_KEY", hide_env_values = true)]
    pub auth_key: Option<String>,

    /// Key secret exchanged for an access token
    #[arg(long, env = "CONDUCTOR_AUTH_SECRET", hide_env_values = true)]
    pub auth_secret: Option<String>,

    /// Request timeout in seconds
    #[arg(
        long,
        env = "CONDUCTOR_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,
}

impl Default for ConnectionArgs {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            auth_key: None,
            auth_secret: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ConnectionArgs {
    /// Server URL to use; a blank value falls back to the default.
    pub fn server_url(&self) -> &str {
        let url = self.server_url.trim();
        if url.is_empty() { DEFAULT_SERVER_URL } else { url }
    }

    /// Build the SDK client.
    pub fn client(&self) -> Result<ConductorClient> {
        let mut builder = ConductorClient::builder()
            .base_url(self.server_url())
            .timeout(Duration::from_secs(self.timeout_secs));

        match (non_blank(&self.auth_key), non_blank(&self.auth_secret)) {
            (Some(key), Some(secret)) => builder = builder.credentials(key, secret),
            (None, None) => {}
            _ => {
                return Err(WrapperError::Config(conductor_client::Error::Config(
                    "CONDUCTOR_AUTH_KEY and CONDUCTOR_AUTH_SECRET must be set together"
                        .to_string(),
                )));
            }
        }

        let client = builder.build().map_err(WrapperError::Config)?;
        debug!(
            server = %client.base_url(),
            authenticated = client.is_authenticated(),
            "conductor client ready"
        );
        Ok(client)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
