//! Token transfer action
//!
//! Produces the bank send message for the caller to sign. When the caller
//! also supplies a public key, a ready-to-sign direct `SignDoc` is attached.

use crate::agent::{OraichainAgentKit, SignDocRequest};
use crate::client::{ChainClient, RpcClient};
use crate::cosmos::Coin;
use crate::tools::types::nest_error;
use crate::tools::{Action, ActionExample, AnyJson};
use crate::Result;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenTransferInput {
    /// The sender address
    pub sender_address: String,
    /// The recipient address
    pub recipient: String,
    /// Amount and denom of the token to transfer
    pub amount: Coin,
    /// Base64 compressed secp256k1 public key of the sender; when present a
    /// direct sign doc is returned as well
    pub public_key: Option<String>,
}

pub struct TokenTransferAction<C = RpcClient> {
    kit: Arc<OraichainAgentKit<C>>,
}

impl<C> TokenTransferAction<C> {
    pub fn new(kit: Arc<OraichainAgentKit<C>>) -> Self {
        Self { kit }
    }
}

#[async_trait]
impl<C: ChainClient + 'static> Action for TokenTransferAction<C> {
    const NAME: &'static str = super::TOKEN_TRANSFER_ACTION;
    type Input = TokenTransferInput;
    type Output = AnyJson;

    fn description(&self) -> &'static str {
        "Transfer a token with an amount to a recipient address."
    }

    fn similes(&self) -> &'static [&'static str] {
        &[
            "transfer token of x amount, y denom to a wallet",
            "send x amount of y denom to a address",
            "transfer x to this address",
            "transfer x to this recipient",
        ]
    }

    fn examples(&self) -> Vec<ActionExample> {
        vec![ActionExample {
            input: json!({
                "senderAddress": "orai1f5nyvnx5ks738d5ys7pwa0evc42v6ff043h6d2",
                "recipient": "orai14h0n2nlfrfz8tn9usfyjrxqd23fhj9a0ec0pm7",
                "amount": {"amount": "100", "denom": "orai"}
            }),
            output: json!({
                "status": "success",
                "data": {
                    "typeUrl": "/cosmos.bank.v1beta1.MsgSend",
                    "value": {
                        "fromAddress": "orai1f5nyvnx5ks738d5ys7pwa0evc42v6ff043h6d2",
                        "toAddress": "orai14h0n2nlfrfz8tn9usfyjrxqd23fhj9a0ec0pm7",
                        "amount": [{"denom": "orai", "amount": "100"}]
                    }
                }
            }),
            explanation: "Transfer 100 ORAI to the wallet",
        }]
    }

    async fn execute(&self, input: Self::Input) -> Result<Self::Output> {
        let message = self
            .kit
            .transfer_message(&input.sender_address, &input.recipient, input.amount)
            .map_err(|e| nest_error("amount", e))?;
        let mut data = serde_json::to_value(message.to_encode_object()?)?;

        if let Some(public_key) = input.public_key {
            let request = SignDocRequest::new(
                input.sender_address,
                public_key,
                vec![message],
                self.kit.default_fee()?,
            );
            let sign_doc = self.kit.build_sign_doc(&request).await?;
            data["signDoc"] = json!(sign_doc.to_base64());
        }

        Ok(AnyJson::new(data))
    }
}
