//! RPC endpoint configuration
//!
//! The library never reads the process environment on its own; the CLI calls
//! [`RpcConfig::from_env`] once and hands the result to the agent kit.
//!
//! # Examples
//!
//! ```bash
//! # Option 1: Oraichain-specific variable (highest priority)
//! export ORAICHAIN_RPC_URL="https://rpc.orai.io"
//!
//! # Option 2: Generic variable shared with the TypeScript tooling
//! export RPC_URL="https://testnet-rpc.orai.io"
//!
//! # Option 3: No env vars - uses the public endpoint (rate limited)
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable names
mod env_vars {
    pub const ORAICHAIN_RPC_URL: &str = "ORAICHAIN_RPC_URL";
    pub const RPC_URL: &str = "RPC_URL";
    pub const RPC_TIMEOUT_SECS: &str = "RPC_TIMEOUT_SECS";
}

/// Public Oraichain RPC (rate limited)
pub const PUBLIC_RPC: &str = "https://rpc.orai.io";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// CometBFT RPC endpoint settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcConfig {
    /// CometBFT JSON-RPC URL
    pub url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl RpcConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Create RPC config from environment variables
    ///
    /// Priority:
    /// 1. ORAICHAIN_RPC_URL
    /// 2. RPC_URL
    /// 3. Public RPC fallback
    pub fn from_env() -> Self {
        let url = if let Ok(url) = std::env::var(env_vars::ORAICHAIN_RPC_URL) {
            tracing::debug!("Using ORAICHAIN_RPC_URL");
            url
        } else if let Ok(url) = std::env::var(env_vars::RPC_URL) {
            tracing::debug!("Using RPC_URL");
            url
        } else {
            tracing::warn!("No RPC configured for Oraichain, using public RPC (rate limited)");
            PUBLIC_RPC.to_string()
        };

        let timeout_secs = std::env::var(env_vars::RPC_TIMEOUT_SECS)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self { url, timeout_secs }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Parse and check the endpoint URL
    pub fn parsed_url(&self) -> Result<url::Url> {
        let url: url::Url = self
            .url
            .parse()
            .map_err(|e| Error::Config(format!("Invalid RPC URL '{}': {}", self.url, e)))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(Error::Config(format!(
                "Unsupported RPC URL scheme '{}', expected http or https",
                other
            ))),
        }
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self::new(PUBLIC_RPC)
    }
}
