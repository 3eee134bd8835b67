//! Sign-doc building action

use crate::agent::{OraichainAgentKit, SignDocRequest};
use crate::client::{ChainClient, RpcClient};
use crate::cosmos::{encode_pubkey, EncodeObject, Message, PubkeyType, SignMode, StdFee};
use crate::tools::types::nest_error;
use crate::tools::{Action, ActionExample, AnyJson};
use crate::{Error, Result};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuildSignDocInput {
    /// Address of the signing account
    pub sender_address: String,
    /// Base64 compressed secp256k1 public key of the signer
    pub public_key: String,
    /// Messages as `{typeUrl, value}` objects
    pub messages: Vec<EncodeObject>,
    /// Fee in `{amount, gas, granter?, payer?}` form; the configured default
    /// fee when omitted
    pub fee: Option<StdFee>,
    pub memo: Option<String>,
    pub timeout_height: Option<u64>,
    /// Public key type URL, secp256k1 by default
    pub pubkey_type: Option<PubkeyType>,
    /// `direct` (default) returns a protobuf SignDoc, `amino` a StdSignDoc
    pub sign_mode: Option<SignMode>,
}

pub struct BuildSignDocAction<C = RpcClient> {
    kit: Arc<OraichainAgentKit<C>>,
}

impl<C> BuildSignDocAction<C> {
    pub fn new(kit: Arc<OraichainAgentKit<C>>) -> Self {
        Self { kit }
    }
}

fn parse_messages(objects: &[EncodeObject]) -> Result<Vec<Message>> {
    if objects.is_empty() {
        return Err(Error::validation("messages", "at least one message"));
    }
    objects
        .iter()
        .enumerate()
        .map(|(i, object)| {
            Message::from_encode_object(object).map_err(|e| nest_error(&format!("messages[{}]", i), e))
        })
        .collect()
}

#[async_trait]
impl<C: ChainClient + 'static> Action for BuildSignDocAction<C> {
    const NAME: &'static str = super::BUILD_SIGN_DOC_ACTION;
    type Input = BuildSignDocInput;
    type Output = AnyJson;

    fn description(&self) -> &'static str {
        "Build a sign doc for the given messages from the sender's live account state, \
         ready for an external wallet to sign."
    }

    fn similes(&self) -> &'static [&'static str] {
        &[
            "build a sign doc for these messages",
            "prepare a transaction for signing",
            "create an unsigned transaction for my wallet",
        ]
    }

    fn examples(&self) -> Vec<ActionExample> {
        vec![ActionExample {
            input: json!({
                "senderAddress": "orai1f5nyvnx5ks738d5ys7pwa0evc42v6ff043h6d2",
                "publicKey": "A+3H5ODk3tPmtkjJG3Gxq8XZ9tHktBE0iP4R1ZrfQh3z",
                "messages": [{
                    "typeUrl": "/cosmos.bank.v1beta1.MsgSend",
                    "value": {
                        "fromAddress": "orai1f5nyvnx5ks738d5ys7pwa0evc42v6ff043h6d2",
                        "toAddress": "orai14h0n2nlfrfz8tn9usfyjrxqd23fhj9a0ec0pm7",
                        "amount": [{"denom": "orai", "amount": "1"}]
                    }
                }]
            }),
            output: json!({
                "status": "success",
                "data": {
                    "bodyBytes": "<base64>",
                    "authInfoBytes": "<base64>",
                    "chainId": "Oraichain",
                    "accountNumber": "42",
                    "signDoc": "<base64>"
                }
            }),
            explanation: "Build a direct sign doc for a bank send",
        }]
    }

    async fn execute(&self, input: Self::Input) -> Result<Self::Output> {
        let messages = parse_messages(&input.messages)?;
        let fee = match input.fee {
            Some(fee) => fee,
            None => self.kit.default_fee()?,
        };
        fee.validate().map_err(|e| nest_error("fee", e))?;
        let memo = input.memo.unwrap_or_default();
        let pubkey_type = input.pubkey_type.unwrap_or_default();

        match input.sign_mode.unwrap_or_default() {
            SignMode::Amino => {
                encode_pubkey(&input.public_key, pubkey_type)?;
                let doc = self
                    .kit
                    .build_amino_sign_doc(
                        &input.sender_address,
                        &messages,
                        &fee,
                        &memo,
                        input.timeout_height,
                    )
                    .await?;
                Ok(AnyJson::new(serde_json::to_value(doc)?))
            }
            SignMode::Direct => {
                let request = SignDocRequest {
                    sender_address: input.sender_address,
                    public_key: input.public_key,
                    messages,
                    fee,
                    memo,
                    timeout_height: input.timeout_height,
                    pubkey_type,
                    sign_mode: SignMode::Direct,
                };
                let doc = self.kit.build_sign_doc(&request).await?;
                Ok(AnyJson::new(doc.to_json()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::*;
    use crate::tools::{default_registry, BUILD_SIGN_DOC_ACTION};
    use serde_json::Value;

    fn send_object(amount: Value) -> Value {
        json!({
            "typeUrl": "/cosmos.bank.v1beta1.MsgSend",
            "value": {
                "fromAddress": SENDER,
                "toAddress": RECIPIENT,
                "amount": [{"denom": "orai", "amount": amount}]
            }
        })
    }

    #[tokio::test]
    async fn direct_mode_returns_base64_parts() {
        let response = default_registry(kit())
            .call(
                BUILD_SIGN_DOC_ACTION,
                json!({
                    "senderAddress": SENDER,
                    "publicKey": public_key(),
                    "messages": [send_object(json!("1"))],
                    "memo": "hello"
                }),
            )
            .await;
        let data = response.data().unwrap();
        assert_eq!(data["chainId"], "Oraichain");
        assert_eq!(data["accountNumber"], "7");
        assert!(data["bodyBytes"].as_str().is_some());
        assert!(data["signDoc"].as_str().is_some());
    }

    #[tokio::test]
    async fn amino_mode_returns_std_sign_doc() {
        let response = default_registry(kit())
            .call(
                BUILD_SIGN_DOC_ACTION,
                json!({
                    "senderAddress": SENDER,
                    "publicKey": public_key(),
                    "messages": [send_object(json!("1"))],
                    "fee": {"amount": [{"denom": "orai", "amount": "0"}], "gas": "200000"},
                    "signMode": "amino"
                }),
            )
            .await;
        let data = response.data().unwrap();
        assert_eq!(data["chain_id"], "Oraichain");
        assert_eq!(data["sequence"], "3");
        assert_eq!(data["fee"]["gas"], "200000");
        assert_eq!(data["msgs"][0]["type"], "cosmos-sdk/MsgSend");
        assert_eq!(data["msgs"][0]["value"]["to_address"], RECIPIENT);
    }

    #[tokio::test]
    async fn unknown_type_url_is_reported() {
        let response = default_registry(kit())
            .call(
                BUILD_SIGN_DOC_ACTION,
                json!({
                    "senderAddress": SENDER,
                    "publicKey": public_key(),
                    "messages": [{"typeUrl": "/foo.v1.MsgBar", "value": {}}]
                }),
            )
            .await;
        assert_eq!(response.error_code(), Some("UNSUPPORTED_MESSAGE_TYPE"));
    }

    #[tokio::test]
    async fn float_amount_fails_schema_with_path() {
        let response = default_registry(kit())
            .call(
                BUILD_SIGN_DOC_ACTION,
                json!({
                    "senderAddress": SENDER,
                    "publicKey": public_key(),
                    "messages": [send_object(json!("1"))],
                    "fee": {"amount": [{"denom": "orai", "amount": 0.5}], "gas": "200000"}
                }),
            )
            .await;
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["code"], "VALIDATION_ERROR");
        assert_eq!(value["details"]["path"], "fee.amount[0].amount");
    }

    #[tokio::test]
    async fn decimal_string_fee_rejected_before_fetch() {
        for (denom, amount, path) in [
            ("orai", "1.5", "fee.amount[0].amount"),
            ("orai", "1.5e3", "fee.amount[0].amount"),
            ("", "500", "fee.amount[0].denom"),
        ] {
            let response = default_registry(offline_kit())
                .call(
                    BUILD_SIGN_DOC_ACTION,
                    json!({
                        "senderAddress": SENDER,
                        "publicKey": public_key(),
                        "messages": [send_object(json!("1"))],
                        "fee": {"amount": [{"denom": denom, "amount": amount}], "gas": "200000"}
                    }),
                )
                .await;
            let value = serde_json::to_value(&response).unwrap();
            assert_eq!(value["code"], "VALIDATION_ERROR", "{amount}");
            assert_eq!(value["details"]["path"], path);
        }
    }

    #[tokio::test]
    async fn unsafe_gas_is_invalid_fee() {
        let response = default_registry(kit())
            .call(
                BUILD_SIGN_DOC_ACTION,
                json!({
                    "senderAddress": SENDER,
                    "publicKey": public_key(),
                    "messages": [send_object(json!("1"))],
                    "fee": {"amount": [], "gas": "9007199254740993"}
                }),
            )
            .await;
        assert_eq!(response.error_code(), Some("INVALID_FEE"));
    }

    #[tokio::test]
    async fn connectivity_failure_is_error_envelope() {
        let response = default_registry(offline_kit())
            .call(
                BUILD_SIGN_DOC_ACTION,
                json!({
                    "senderAddress": SENDER,
                    "publicKey": public_key(),
                    "messages": [send_object(json!("1"))]
                }),
            )
            .await;
        assert_eq!(response.error_code(), Some("CONNECTIVITY_ERROR"));
    }
}
