//! Broadcast actions
//!
//! Every variant ends in one `broadcast_tx_sync` call. A CheckTx rejection
//! comes back as a success envelope whose `code` is non-zero.

use crate::agent::OraichainAgentKit;
use crate::client::{BroadcastResult, ChainClient, RpcClient};
use crate::cosmos::{PubkeyType, StdSignDoc, StdSignature};
use crate::tools::{Action, ActionExample, AnyJson};
use crate::Result;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

fn broadcast_data(result: BroadcastResult) -> AnyJson {
    AnyJson::new(json!({
        "txHash": result.tx_hash,
        "code": result.code,
        "rawLog": result.raw_log,
    }))
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastSignedTxInput {
    /// The signed transaction (`TxRaw` bytes) in base64 format
    pub signed_tx: String,
}

pub struct BroadcastSignedTxAction<C = RpcClient> {
    kit: Arc<OraichainAgentKit<C>>,
}

impl<C> BroadcastSignedTxAction<C> {
    pub fn new(kit: Arc<OraichainAgentKit<C>>) -> Self {
        Self { kit }
    }
}

#[async_trait]
impl<C: ChainClient + 'static> Action for BroadcastSignedTxAction<C> {
    const NAME: &'static str = super::BROADCAST_SIGNED_TX_ACTION;
    type Input = BroadcastSignedTxInput;
    type Output = AnyJson;

    fn description(&self) -> &'static str {
        "Broadcast a signed transaction to the network."
    }

    fn similes(&self) -> &'static [&'static str] {
        &[
            "Broadcast a signed transaction to the network",
            "Submit a signed transaction to the network",
        ]
    }

    fn examples(&self) -> Vec<ActionExample> {
        vec![ActionExample {
            input: json!({ "signedTx": "CpABCo0BChwvY29zbW9zLmJhbmsudjFiZXRhMS5Nc2dTZW5k..." }),
            output: json!({
                "status": "success",
                "data": {
                    "txHash": "36ED1255C95FB1ABA59DB52DA0867EDECADBCE5B2A15D28BF54FB9F223A60AF9",
                    "code": 0,
                    "rawLog": "[]"
                }
            }),
            explanation: "Submit a wallet-signed transaction",
        }]
    }

    async fn execute(&self, input: Self::Input) -> Result<Self::Output> {
        let result = self.kit.broadcast_tx_sync(&input.signed_tx).await?;
        Ok(broadcast_data(result))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastSignedTxFromSignedBytesInput {
    /// The signed transaction body in base64 format
    pub signed_body_bytes: String,
    /// The signed transaction auth info in base64 format
    pub signed_auth_bytes: String,
    /// The signatures for the transaction in base64 format
    pub signatures: Vec<String>,
}

pub struct BroadcastSignedTxFromSignedBytesAction<C = RpcClient> {
    kit: Arc<OraichainAgentKit<C>>,
}

impl<C> BroadcastSignedTxFromSignedBytesAction<C> {
    pub fn new(kit: Arc<OraichainAgentKit<C>>) -> Self {
        Self { kit }
    }
}

#[async_trait]
impl<C: ChainClient + 'static> Action for BroadcastSignedTxFromSignedBytesAction<C> {
    const NAME: &'static str = super::BROADCAST_SIGNED_TX_FROM_SIGNED_BYTES_AND_SIGNATURE_ACTION;
    type Input = BroadcastSignedTxFromSignedBytesInput;
    type Output = AnyJson;

    fn description(&self) -> &'static str {
        "Broadcast a signed transaction to the network using signed body bytes, auth bytes and signature."
    }

    fn similes(&self) -> &'static [&'static str] {
        &[
            "Broadcast a signed transaction to the network from signed body bytes, auth bytes and signature",
            "Submit a signed transaction to the network from signed data",
        ]
    }

    async fn execute(&self, input: Self::Input) -> Result<Self::Output> {
        let result = self
            .kit
            .broadcast_signed_tx_from_direct_components(
                &input.signed_body_bytes,
                &input.signed_auth_bytes,
                &input.signatures,
            )
            .await?;
        Ok(broadcast_data(result))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastSignedTxFromStdSignDocInput {
    /// The Amino sign doc exactly as it was signed
    pub signed_doc: StdSignDoc,
    /// The Amino signature returned by the wallet
    pub signature: StdSignature,
    /// Public key type URL, secp256k1 by default
    pub pubkey_type: Option<PubkeyType>,
}

pub struct BroadcastSignedTxFromStdSignDocAction<C = RpcClient> {
    kit: Arc<OraichainAgentKit<C>>,
}

impl<C> BroadcastSignedTxFromStdSignDocAction<C> {
    pub fn new(kit: Arc<OraichainAgentKit<C>>) -> Self {
        Self { kit }
    }
}

#[async_trait]
impl<C: ChainClient + 'static> Action for BroadcastSignedTxFromStdSignDocAction<C> {
    const NAME: &'static str = super::BROADCAST_SIGNED_TX_FROM_STD_SIGNDOC_AND_SIGNATURE_ACTION;
    type Input = BroadcastSignedTxFromStdSignDocInput;
    type Output = AnyJson;

    fn description(&self) -> &'static str {
        "Broadcast a signed transaction to the network using signed std sign doc and signature."
    }

    fn similes(&self) -> &'static [&'static str] {
        &[
            "Broadcast a signed transaction to the network from signed std sign doc and signature",
            "Submit a signed transaction to the network from signed std data and signature",
        ]
    }

    async fn execute(&self, input: Self::Input) -> Result<Self::Output> {
        let result = self
            .kit
            .broadcast_signed_tx_from_std_sign_doc(
                &input.signed_doc,
                &input.signature,
                input.pubkey_type.unwrap_or_default(),
            )
            .await?;
        Ok(broadcast_data(result))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastSignDocBase64Input {
    /// Protobuf-encoded direct SignDoc in base64 format
    pub sign_doc_base64: String,
    /// The signature over the sign doc in base64 format
    pub signature: String,
}

pub struct BroadcastSignDocBase64Action<C = RpcClient> {
    kit: Arc<OraichainAgentKit<C>>,
}

impl<C> BroadcastSignDocBase64Action<C> {
    pub fn new(kit: Arc<OraichainAgentKit<C>>) -> Self {
        Self { kit }
    }
}

#[async_trait]
impl<C: ChainClient + 'static> Action for BroadcastSignDocBase64Action<C> {
    const NAME: &'static str = super::BROADCAST_SIGN_DOC_BASE64_ACTION;
    type Input = BroadcastSignDocBase64Input;
    type Output = AnyJson;

    fn description(&self) -> &'static str {
        "Broadcast a sign doc base64 to the network."
    }

    fn similes(&self) -> &'static [&'static str] {
        &["Broadcast a sign doc base64 to the network"]
    }

    async fn execute(&self, input: Self::Input) -> Result<Self::Output> {
        let result = self
            .kit
            .broadcast_sign_doc_base64(&input.sign_doc_base64, &input.signature)
            .await?;
        Ok(broadcast_data(result))
    }
}
