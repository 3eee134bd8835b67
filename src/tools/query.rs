//! Read-only chain queries: balances, delegations, transactions.

use crate::agent::OraichainAgentKit;
use crate::client::{ChainClient, RpcClient};
use crate::tools::{Action, ActionExample, AnyJson};
use crate::{Error, Result};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TokenBalanceInput {
    /// The address of the wallet
    pub address: String,
    /// The denom of the token
    pub denom: String,
}

pub struct TokenBalanceAction<C = RpcClient> {
    kit: Arc<OraichainAgentKit<C>>,
}

impl<C> TokenBalanceAction<C> {
    pub fn new(kit: Arc<OraichainAgentKit<C>>) -> Self {
        Self { kit }
    }
}

#[async_trait]
impl<C: ChainClient + 'static> Action for TokenBalanceAction<C> {
    const NAME: &'static str = super::TOKEN_BALANCE_ACTION;
    type Input = TokenBalanceInput;
    type Output = AnyJson;

    fn description(&self) -> &'static str {
        "Get the Oraichain's wallet balance of a denom."
    }

    fn similes(&self) -> &'static [&'static str] {
        &[
            "check wallet balance of native token denom",
            "get wallet balance of native token denom",
            "view wallet balance of native token denom",
            "show wallet balance of native token denom",
            "what is the wallet balance given denom",
        ]
    }

    fn examples(&self) -> Vec<ActionExample> {
        vec![ActionExample {
            input: json!({
                "address": "orai14h0n2nlfrfz8tn9usfyjrxqd23fhj9a0ec0pm7",
                "denom": "orai"
            }),
            output: json!({
                "status": "success",
                "data": {
                    "address": "orai14h0n2nlfrfz8tn9usfyjrxqd23fhj9a0ec0pm7",
                    "balance": {"denom": "orai", "amount": "1"}
                }
            }),
            explanation: "Get wallet's balance of a native denom",
        }]
    }

    async fn execute(&self, input: Self::Input) -> Result<Self::Output> {
        let balance = self.kit.get_balance(&input.address, &input.denom).await?;
        Ok(AnyJson::new(json!({
            "address": input.address,
            "balance": balance,
        })))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueryDelegationInput {
    /// The wallet address
    pub address: String,
    /// The validator operator address
    pub validator_address: String,
}

pub struct QueryDelegationAction<C = RpcClient> {
    kit: Arc<OraichainAgentKit<C>>,
}

impl<C> QueryDelegationAction<C> {
    pub fn new(kit: Arc<OraichainAgentKit<C>>) -> Self {
        Self { kit }
    }
}

#[async_trait]
impl<C: ChainClient + 'static> Action for QueryDelegationAction<C> {
    const NAME: &'static str = super::QUERY_DELEGATION_ACTION;
    type Input = QueryDelegationInput;
    type Output = AnyJson;

    fn description(&self) -> &'static str {
        "Get the delegation of a wallet to a validator."
    }

    fn similes(&self) -> &'static [&'static str] {
        &[
            "check delegation of a wallet to a validator",
            "what's the delegated amount of a wallet to a validator",
            "view delegation of a wallet to a validator address",
            "with a validator address and a wallet address, get the delegation",
        ]
    }

    fn examples(&self) -> Vec<ActionExample> {
        vec![ActionExample {
            input: json!({
                "address": "orai14h0n2nlfrfz8tn9usfyjrxqd23fhj9a0ec0pm7",
                "validatorAddress": "oraivaloper1f5nyvnx5ks738d5ys7pwa0evc42v6ff0umvnxd"
            }),
            output: json!({
                "status": "success",
                "data": {
                    "delegation": {
                        "delegator_address": "orai14h0n2nlfrfz8tn9usfyjrxqd23fhj9a0ec0pm7",
                        "validator_address": "oraivaloper1f5nyvnx5ks738d5ys7pwa0evc42v6ff0umvnxd",
                        "shares": "1.000000000000000000"
                    },
                    "balance": {"denom": "orai", "amount": "1"}
                }
            }),
            explanation: "Get delegation of a wallet to a validator",
        }]
    }

    async fn execute(&self, input: Self::Input) -> Result<Self::Output> {
        let data = match self
            .kit
            .get_delegation(&input.address, &input.validator_address)
            .await?
        {
            Some(found) => serde_json::to_value(found)?,
            None => json!({ "delegation": Value::Null, "balance": Value::Null }),
        };
        Ok(AnyJson::new(data))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueryTxInput {
    /// Hex transaction hash as returned by a broadcast
    pub tx_hash: String,
}

pub struct QueryTxAction<C = RpcClient> {
    kit: Arc<OraichainAgentKit<C>>,
}

impl<C> QueryTxAction<C> {
    pub fn new(kit: Arc<OraichainAgentKit<C>>) -> Self {
        Self { kit }
    }
}

#[async_trait]
impl<C: ChainClient + 'static> Action for QueryTxAction<C> {
    const NAME: &'static str = super::QUERY_TX_ACTION;
    type Input = QueryTxInput;
    type Output = AnyJson;

    fn description(&self) -> &'static str {
        "Look up a committed transaction by hash and report its result code and gas usage."
    }

    fn similes(&self) -> &'static [&'static str] {
        &[
            "check the status of a transaction",
            "was my transaction included",
            "get transaction result by hash",
        ]
    }

    async fn execute(&self, input: Self::Input) -> Result<Self::Output> {
        if input.tx_hash.len() != 64 || !input.tx_hash.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::validation("txHash", "64 hex characters"));
        }
        match self.kit.get_tx(&input.tx_hash).await? {
            Some(tx) => Ok(AnyJson::new(serde_json::to_value(tx)?)),
            None => Err(Error::TxNotFound(input.tx_hash)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::*;
    use crate::tools::{
        default_registry, QUERY_DELEGATION_ACTION, QUERY_TX_ACTION, TOKEN_BALANCE_ACTION,
    };

    #[tokio::test]
    async fn balance_echoes_address() {
        let response = default_registry(kit())
            .call(TOKEN_BALANCE_ACTION, json!({"address": SENDER, "denom": "orai"}))
            .await;
        let data = response.data().unwrap();
        assert_eq!(data["address"], SENDER);
        assert_eq!(data["balance"], json!({"denom": "orai", "amount": "250"}));
    }

    #[tokio::test]
    async fn delegation_found_and_missing() {
        let registry = default_registry(kit());
        let found = registry
            .call(
                QUERY_DELEGATION_ACTION,
                json!({"address": SENDER, "validatorAddress": VALIDATOR}),
            )
            .await;
        assert_eq!(
            found.data().unwrap()["delegation"]["shares"],
            "1.000000000000000000"
        );

        let missing = registry
            .call(
                QUERY_DELEGATION_ACTION,
                json!({"address": SENDER, "validatorAddress": "oraivaloper1other"}),
            )
            .await;
        assert!(missing.data().unwrap()["delegation"].is_null());
    }

    #[tokio::test]
    async fn tx_lookup() {
        let registry = default_registry(kit());
        let found = registry
            .call(QUERY_TX_ACTION, json!({"txHash": "AB".repeat(32)}))
            .await;
        let data = found.data().unwrap();
        assert_eq!(data["height"], 100);
        assert_eq!(data["gasUsed"], 81_000);

        let missing = registry
            .call(QUERY_TX_ACTION, json!({"txHash": "CD".repeat(32)}))
            .await;
        assert_eq!(missing.error_code(), Some("TX_NOT_FOUND"));

        let bad = registry.call(QUERY_TX_ACTION, json!({"txHash": "xyz"})).await;
        assert_eq!(bad.error_code(), Some("VALIDATION_ERROR"));
    }
}
