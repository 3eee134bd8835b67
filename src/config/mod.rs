//! Configuration for the Oraichain agent kit

pub mod rpc;

use crate::cosmos::{GasPrice, StdFee};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

// Re-export RPC config
pub use rpc::RpcConfig;

/// Chain identity settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Bech32 account prefix required on sender addresses
    pub bech32_prefix: String,
    /// Native fee denom; the configured gas price must be quoted in it
    pub denom: String,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            bech32_prefix: "orai".to_string(),
            denom: "orai".to_string(),
        }
    }
}

/// Default fee used when an action does not supply one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeConfig {
    /// Gas price such as `0.002orai`
    pub gas_price: String,
    /// Gas limit for kit-built transactions
    pub gas_limit: u64,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            gas_price: "0.002orai".to_string(),
            gas_limit: 1_000_000,
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// RPC endpoint
    #[serde(default)]
    pub rpc: RpcConfig,
    /// Chain identity
    #[serde(default)]
    pub chain: ChainConfig,
    /// Default fee settings
    #[serde(default)]
    pub fee: FeeConfig,
}

impl Config {
    /// Default fee, checked against the chain's fee denom
    pub fn default_fee(&self) -> Result<StdFee> {
        let price: GasPrice = self.fee.gas_price.parse()?;
        if price.denom != self.chain.denom {
            return Err(Error::Config(format!(
                "gas price '{}' is not quoted in the chain denom '{}'",
                self.fee.gas_price, self.chain.denom
            )));
        }
        StdFee::calculate(self.fee.gas_limit, &price)
    }

    /// Load a JSON config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_fee_matches_gas_price() {
        let fee = Config::default().default_fee().unwrap();
        assert_eq!(fee.gas, "1000000");
        assert_eq!(fee.amount.len(), 1);
        assert_eq!(fee.amount[0].denom, "orai");
        assert_eq!(fee.amount[0].amount, "2000");
    }

    #[test]
    fn config_deserialize_defaults() {
        let parsed: Config =
            serde_json::from_value(serde_json::json!({ "rpc": { "url": "http://node:26657" } }))
                .expect("parse config");
        assert_eq!(parsed.rpc.url, "http://node:26657");
        assert_eq!(parsed.chain, ChainConfig::default());
        assert_eq!(parsed.fee, FeeConfig::default());
    }

    #[test]
    fn config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"rpc": {{"url": "https://testnet-rpc.orai.io", "timeout_secs": 5}},
                "fee": {{"gas_price": "0.001orai", "gas_limit": 200000}}}}"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.rpc.timeout_secs, 5);
        assert_eq!(config.default_fee().unwrap().amount[0].amount, "200");
    }

    #[test]
    fn gas_price_must_use_chain_denom() {
        let mut config = Config::default();
        assert_eq!(config.default_fee().unwrap().amount[0].amount, "2000");

        config.fee.gas_price = "0.025uatom".to_string();
        assert!(matches!(config.default_fee(), Err(Error::Config(_))));

        config.chain.denom = "uatom".to_string();
        let fee = config.default_fee().unwrap();
        assert_eq!(fee.amount, vec![crate::cosmos::Coin::new("25000", "uatom")]);
    }

    #[test]
    fn config_from_missing_file() {
        let err = Config::from_file(Path::new("/nonexistent/orai.json")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
