//! Chain access seam
//!
//! The agent kit talks to the network only through [`ChainClient`]. The
//! production implementation is [`RpcClient`], which speaks CometBFT
//! JSON-RPC; tests substitute in-memory clients.

mod rpc;

pub use rpc::RpcClient;

use crate::cosmos::Coin;
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// On-chain signing state of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub account_number: u64,
    pub sequence: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegation {
    pub delegator_address: String,
    pub validator_address: String,
    /// Decimal share amount, e.g. `1.000000000000000000`
    pub shares: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationResponse {
    pub delegation: Delegation,
    pub balance: Coin,
}

/// Result of a committed transaction lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxInfo {
    pub hash: String,
    pub height: u64,
    pub code: u32,
    pub raw_log: String,
    pub gas_wanted: u64,
    pub gas_used: u64,
}

/// Outcome of `broadcast_tx_sync`
///
/// A non-zero `code` means the node's CheckTx rejected the transaction.
/// That is reported as data, not as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastResult {
    pub tx_hash: String,
    pub code: u32,
    pub raw_log: String,
    #[serde(default)]
    pub codespace: String,
}

impl BroadcastResult {
    pub fn is_rejected(&self) -> bool {
        self.code != 0
    }
}

/// Network operations the agent kit depends on
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Account number and sequence; `AccountNotFound` if the account has
    /// never received funds
    async fn get_sequence(&self, address: &str) -> Result<Account>;

    async fn get_chain_id(&self) -> Result<String>;

    /// Bank balance; zero when the account holds none of `denom`
    async fn get_balance(&self, address: &str, denom: &str) -> Result<Coin>;

    async fn get_delegation(
        &self,
        delegator_address: &str,
        validator_address: &str,
    ) -> Result<Option<DelegationResponse>>;

    /// Look up a committed transaction by its hex hash
    async fn get_tx(&self, hash: &str) -> Result<Option<TxInfo>>;

    /// Submit encoded `TxRaw` bytes and wait for CheckTx only
    async fn broadcast_tx_sync(&self, tx_bytes: Vec<u8>) -> Result<BroadcastResult>;
}
