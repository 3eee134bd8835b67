//! Sign documents in both signing modes.
//!
//! Direct mode signs the protobuf `SignDoc` (body bytes, auth-info bytes,
//! chain id, account number). Amino mode signs a canonical JSON
//! [`StdSignDoc`]. The sign-mode tag written into `AuthInfo` must match the
//! mode the signer actually used or the chain rejects the signature.

use crate::cosmos::{parse_safe_integer, AminoMsg, Coin, Message, StdFee};
use crate::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use cosmrs::proto::cosmos::base::v1beta1::Coin as ProtoCoin;
use cosmrs::proto::cosmos::tx::signing::v1beta1::SignMode as ProtoSignMode;
use cosmrs::proto::cosmos::tx::v1beta1::{
    mode_info, AuthInfo, Fee, ModeInfo, SignDoc as ProtoSignDoc, SignerInfo, TxBody,
};
use cosmrs::proto::prost::Message as _;
use cosmrs::proto::Any;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SignMode {
    /// `SIGN_MODE_DIRECT`: protobuf sign bytes
    #[default]
    Direct,
    /// `SIGN_MODE_LEGACY_AMINO_JSON`: canonical JSON sign bytes
    Amino,
}

impl SignMode {
    fn to_proto(self) -> ProtoSignMode {
        match self {
            SignMode::Direct => ProtoSignMode::Direct,
            SignMode::Amino => ProtoSignMode::LegacyAminoJson,
        }
    }
}

/// Encode `TxBody` bytes through the message registry
pub fn encode_body(messages: &[Message], memo: &str, timeout_height: Option<u64>) -> Result<Vec<u8>> {
    let messages = messages
        .iter()
        .map(Message::to_any)
        .collect::<Result<Vec<Any>>>()?;
    let body = TxBody {
        messages,
        memo: memo.to_string(),
        timeout_height: timeout_height.unwrap_or_default(),
        ..Default::default()
    };
    Ok(body.encode_to_vec())
}

/// Messages and metadata recovered from `TxBody` bytes
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedBody {
    pub messages: Vec<Message>,
    pub memo: String,
    pub timeout_height: u64,
}

pub fn decode_tx_body(bytes: &[u8]) -> Result<DecodedBody> {
    let body =
        TxBody::decode(bytes).map_err(|e| Error::Encoding(format!("invalid TxBody: {}", e)))?;
    let messages = body
        .messages
        .iter()
        .map(Message::from_any)
        .collect::<Result<Vec<_>>>()?;
    Ok(DecodedBody {
        messages,
        memo: body.memo,
        timeout_height: body.timeout_height,
    })
}

/// One signer's entry in `AuthInfo`
#[derive(Debug, Clone, PartialEq)]
pub struct SignerEntry {
    pub pubkey: Any,
    pub sequence: u64,
}

/// Encode `AuthInfo` bytes; every signer gets the same single sign mode
pub fn make_auth_info_bytes(
    signers: &[SignerEntry],
    fee_amount: &[Coin],
    gas_limit: u64,
    granter: &str,
    payer: &str,
    sign_mode: SignMode,
) -> Vec<u8> {
    let signer_infos = signers
        .iter()
        .map(|signer| SignerInfo {
            public_key: Some(signer.pubkey.clone()),
            mode_info: Some(ModeInfo {
                sum: Some(mode_info::Sum::Single(mode_info::Single {
                    mode: sign_mode.to_proto() as i32,
                })),
            }),
            sequence: signer.sequence,
        })
        .collect();

    let auth_info = AuthInfo {
        signer_infos,
        fee: Some(Fee {
            amount: fee_amount.iter().map(ProtoCoin::from).collect(),
            gas_limit,
            payer: payer.to_string(),
            granter: granter.to_string(),
        }),
        ..Default::default()
    };
    auth_info.encode_to_vec()
}

/// Unsigned direct-mode sign document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignDoc {
    pub body_bytes: Vec<u8>,
    pub auth_info_bytes: Vec<u8>,
    pub chain_id: String,
    pub account_number: u64,
}

impl SignDoc {
    /// Canonical bytes a direct signer signs over
    pub fn to_bytes(&self) -> Vec<u8> {
        ProtoSignDoc {
            body_bytes: self.body_bytes.clone(),
            auth_info_bytes: self.auth_info_bytes.clone(),
            chain_id: self.chain_id.clone(),
            account_number: self.account_number,
        }
        .encode_to_vec()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let doc = ProtoSignDoc::decode(bytes)
            .map_err(|e| Error::Encoding(format!("invalid SignDoc: {}", e)))?;
        Ok(Self {
            body_bytes: doc.body_bytes,
            auth_info_bytes: doc.auth_info_bytes,
            chain_id: doc.chain_id,
            account_number: doc.account_number,
        })
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// JSON view with base64 byte fields, as returned to agents
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "bodyBytes": STANDARD.encode(&self.body_bytes),
            "authInfoBytes": STANDARD.encode(&self.auth_info_bytes),
            "chainId": self.chain_id,
            "accountNumber": self.account_number.to_string(),
            "signDoc": self.to_base64(),
        })
    }
}

/// Legacy Amino sign document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StdSignDoc {
    pub chain_id: String,
    pub account_number: String,
    pub sequence: String,
    pub fee: StdFee,
    pub msgs: Vec<AminoMsg>,
    #[serde(default)]
    pub memo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_height: Option<String>,
}

impl StdSignDoc {
    pub fn new(
        messages: &[Message],
        fee: &StdFee,
        chain_id: &str,
        memo: &str,
        account_number: u64,
        sequence: u64,
        timeout_height: Option<u64>,
    ) -> Result<Self> {
        let msgs = messages
            .iter()
            .map(Message::to_amino)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            chain_id: chain_id.to_string(),
            account_number: account_number.to_string(),
            sequence: sequence.to_string(),
            fee: fee.clone(),
            msgs,
            memo: memo.to_string(),
            timeout_height: timeout_height.filter(|h| *h > 0).map(|h| h.to_string()),
        })
    }

    pub fn sequence(&self) -> Result<u64> {
        parse_safe_integer(&self.sequence).ok_or_else(|| {
            Error::InvalidSequence(format!(
                "sequence '{}' is not an integer in the safe range",
                self.sequence
            ))
        })
    }

    pub fn timeout_height(&self) -> Result<Option<u64>> {
        self.timeout_height
            .as_deref()
            .map(|h| {
                h.parse::<u64>()
                    .map_err(|_| Error::Encoding(format!("invalid timeout_height '{}'", h)))
            })
            .transpose()
    }

    /// Sorted-key compact JSON with `&`, `<` and `>` escaped
    pub fn sign_bytes(&self) -> Result<Vec<u8>> {
        let sorted = sort_json(&serde_json::to_value(self)?);
        let json = serde_json::to_string(&sorted)?
            .replace('&', "\\u0026")
            .replace('<', "\\u003c")
            .replace('>', "\\u003e");
        Ok(json.into_bytes())
    }
}

fn sort_json(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), sort_json(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_json).collect()),
        other => other.clone(),
    }
}

/// Public key as embedded in an Amino signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StdPubKey {
    #[serde(rename = "type")]
    pub key_type: String,
    /// Base64 key bytes
    pub value: String,
}

/// Amino signature as returned by `signAmino`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StdSignature {
    pub pub_key: StdPubKey,
    /// Base64 signature bytes
    pub signature: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cosmos::PubkeyType;

    const ADDR: &str = "orai1f5nyvnx5ks738d5ys7pwa0evc42v6ff043h6d2";

    fn send() -> Message {
        Message::send(ADDR, ADDR, vec![Coin::new("1", "orai")])
    }

    #[test]
    fn body_round_trips_through_registry() {
        let bytes = encode_body(&[send()], "hello", Some(42)).unwrap();
        let decoded = decode_tx_body(&bytes).unwrap();
        assert_eq!(decoded.messages, vec![send()]);
        assert_eq!(decoded.memo, "hello");
        assert_eq!(decoded.timeout_height, 42);
    }

    #[test]
    fn auth_info_carries_sign_mode() {
        let signer = SignerEntry {
            pubkey: PubkeyType::Secp256k1.encode(vec![2; 33]),
            sequence: 7,
        };
        let fee = [Coin::new("2000", "orai")];

        for (mode, expected) in [
            (SignMode::Direct, ProtoSignMode::Direct),
            (SignMode::Amino, ProtoSignMode::LegacyAminoJson),
        ] {
            let bytes = make_auth_info_bytes(
                std::slice::from_ref(&signer),
                &fee,
                200_000,
                "",
                "",
                mode,
            );
            let auth = AuthInfo::decode(bytes.as_slice()).unwrap();
            let info = &auth.signer_infos[0];
            assert_eq!(info.sequence, 7);
            match info.mode_info.as_ref().and_then(|m| m.sum.as_ref()) {
                Some(mode_info::Sum::Single(single)) => assert_eq!(single.mode, expected as i32),
                other => panic!("unexpected mode info {:?}", other),
            }
            let fee = auth.fee.unwrap();
            assert_eq!(fee.gas_limit, 200_000);
            assert_eq!(fee.amount[0].amount, "2000");
        }
    }

    #[test]
    fn sign_doc_bytes_round_trip() {
        let doc = SignDoc {
            body_bytes: vec![1, 2, 3],
            auth_info_bytes: vec![4, 5],
            chain_id: "Oraichain".to_string(),
            account_number: 12,
        };
        assert_eq!(SignDoc::from_bytes(&doc.to_bytes()).unwrap(), doc);
        assert!(SignDoc::from_bytes(&[0xff, 0xff]).is_err());
    }

    #[test]
    fn std_sign_doc_sign_bytes_are_sorted_and_escaped() {
        let fee = StdFee::new(vec![Coin::new("0", "orai")], 20_000_000);
        let doc = StdSignDoc::new(&[send()], &fee, "Oraichain", "<a&b>", 5, 9, None).unwrap();
        let bytes = String::from_utf8(doc.sign_bytes().unwrap()).unwrap();

        assert!(bytes.starts_with(r#"{"account_number":"5","chain_id":"Oraichain","fee":{"amount":[{"amount":"0","denom":"orai"}],"gas":"20000000"}"#));
        assert!(bytes.contains(r#""memo":"\u003ca\u0026b\u003e""#));
        assert!(!bytes.contains('<'));
        assert!(bytes.contains(r#"{"type":"cosmos-sdk/MsgSend","value":{"amount":[{"amount":"1","denom":"orai"}],"from_address""#));
        assert!(bytes.ends_with(r#""sequence":"9"}"#));
        assert!(!bytes.contains("timeout_height"));
    }

    #[test]
    fn std_sign_doc_numeric_fields() {
        let fee = StdFee::new(vec![], 1);
        let mut doc = StdSignDoc::new(&[], &fee, "Oraichain", "", 1, 3, Some(100)).unwrap();
        assert_eq!(doc.sequence().unwrap(), 3);
        assert_eq!(doc.timeout_height().unwrap(), Some(100));

        doc.sequence = "9007199254740993".to_string();
        assert!(matches!(doc.sequence(), Err(Error::InvalidSequence(_))));
    }

    #[test]
    fn std_signature_parses_wallet_output() {
        let sig: StdSignature = serde_json::from_value(serde_json::json!({
            "pub_key": { "type": "tendermint/PubKeySecp256k1", "value": "AjTkN0ok2fJo" },
            "signature": "c2ln"
        }))
        .unwrap();
        assert_eq!(sig.pub_key.key_type, "tendermint/PubKeySecp256k1");
        assert_eq!(sig.signature, "c2ln");
    }
}
