//! Typed message registry.
//!
//! Every supported message kind is a strongly-typed struct that knows its
//! protobuf type URL, its Amino type tag and how to move between the direct
//! (protobuf `Any`) and legacy (Amino JSON) forms. [`Message`] dispatches on
//! the type identifier; unknown identifiers are rejected, never passed through.

use crate::cosmos::Coin;
use crate::{Error, Result};
use cosmrs::proto::cosmos::bank::v1beta1::MsgSend as ProtoMsgSend;
use cosmrs::proto::cosmos::base::v1beta1::Coin as ProtoCoin;
use cosmrs::proto::cosmos::staking::v1beta1::{
    MsgDelegate as ProtoMsgDelegate, MsgUndelegate as ProtoMsgUndelegate,
};
use cosmrs::proto::cosmwasm::wasm::v1::MsgExecuteContract as ProtoMsgExecuteContract;
use cosmrs::proto::prost::Message as _;
use cosmrs::proto::Any;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MSG_SEND_TYPE_URL: &str = "/cosmos.bank.v1beta1.MsgSend";
pub const MSG_DELEGATE_TYPE_URL: &str = "/cosmos.staking.v1beta1.MsgDelegate";
pub const MSG_UNDELEGATE_TYPE_URL: &str = "/cosmos.staking.v1beta1.MsgUndelegate";
pub const MSG_EXECUTE_CONTRACT_TYPE_URL: &str = "/cosmwasm.wasm.v1.MsgExecuteContract";

/// A message as exchanged with CosmJS-style callers: `{typeUrl, value}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EncodeObject {
    /// Protobuf type URL, e.g. `/cosmos.bank.v1beta1.MsgSend`
    pub type_url: String,
    /// Message fields in camelCase
    pub value: Value,
}

/// A message in legacy Amino JSON form: `{type, value}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AminoMsg {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub value: Value,
}

/// Conversions every registered message kind provides
trait TypedMsg: Sized + Serialize + DeserializeOwned {
    const TYPE_URL: &'static str;
    const AMINO_TYPE: &'static str;

    fn encode_proto(&self) -> Result<Vec<u8>>;
    fn decode_proto(bytes: &[u8]) -> Result<Self>;
    fn to_amino_value(&self) -> Result<Value>;
    fn from_amino_value(value: Value) -> Result<Self>;

    fn to_any(&self) -> Result<Any> {
        Ok(Any {
            type_url: Self::TYPE_URL.to_string(),
            value: self.encode_proto()?,
        })
    }
}

fn proto_decode_error(type_url: &str, e: impl std::fmt::Display) -> Error {
    Error::Encoding(format!("cannot decode {}: {}", type_url, e))
}

fn amino_error(amino_type: &str, e: serde_json::Error) -> Error {
    Error::Encoding(format!("malformed {} value: {}", amino_type, e))
}

fn coins_to_proto(coins: &[Coin]) -> Vec<ProtoCoin> {
    coins.iter().map(ProtoCoin::from).collect()
}

fn coins_from_proto(coins: Vec<ProtoCoin>) -> Vec<Coin> {
    coins.into_iter().map(Coin::from).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MsgSend {
    pub from_address: String,
    pub to_address: String,
    pub amount: Vec<Coin>,
}

#[derive(Serialize, Deserialize)]
struct AminoMsgSend {
    from_address: String,
    to_address: String,
    amount: Vec<Coin>,
}

impl TypedMsg for MsgSend {
    const TYPE_URL: &'static str = MSG_SEND_TYPE_URL;
    const AMINO_TYPE: &'static str = "cosmos-sdk/MsgSend";

    fn encode_proto(&self) -> Result<Vec<u8>> {
        Ok(ProtoMsgSend {
            from_address: self.from_address.clone(),
            to_address: self.to_address.clone(),
            amount: coins_to_proto(&self.amount),
        }
        .encode_to_vec())
    }

    fn decode_proto(bytes: &[u8]) -> Result<Self> {
        let msg = ProtoMsgSend::decode(bytes).map_err(|e| proto_decode_error(Self::TYPE_URL, e))?;
        Ok(Self {
            from_address: msg.from_address,
            to_address: msg.to_address,
            amount: coins_from_proto(msg.amount),
        })
    }

    fn to_amino_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(AminoMsgSend {
            from_address: self.from_address.clone(),
            to_address: self.to_address.clone(),
            amount: self.amount.clone(),
        })?)
    }

    fn from_amino_value(value: Value) -> Result<Self> {
        let msg: AminoMsgSend =
            serde_json::from_value(value).map_err(|e| amino_error(Self::AMINO_TYPE, e))?;
        Ok(Self {
            from_address: msg.from_address,
            to_address: msg.to_address,
            amount: msg.amount,
        })
    }
}

/// Shared shape of `MsgDelegate` and `MsgUndelegate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StakingMsg {
    pub delegator_address: String,
    pub validator_address: String,
    pub amount: Coin,
}

#[derive(Serialize, Deserialize)]
struct AminoStakingMsg {
    delegator_address: String,
    validator_address: String,
    amount: Coin,
}

impl StakingMsg {
    fn to_amino_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(AminoStakingMsg {
            delegator_address: self.delegator_address.clone(),
            validator_address: self.validator_address.clone(),
            amount: self.amount.clone(),
        })?)
    }

    fn from_amino_value(value: Value, amino_type: &str) -> Result<Self> {
        let msg: AminoStakingMsg =
            serde_json::from_value(value).map_err(|e| amino_error(amino_type, e))?;
        Ok(Self {
            delegator_address: msg.delegator_address,
            validator_address: msg.validator_address,
            amount: msg.amount,
        })
    }
}

fn required_amount(amount: Option<ProtoCoin>, type_url: &str) -> Result<Coin> {
    amount
        .map(Coin::from)
        .ok_or_else(|| Error::Encoding(format!("{} is missing its amount", type_url)))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct MsgDelegate(pub StakingMsg);

impl TypedMsg for MsgDelegate {
    const TYPE_URL: &'static str = MSG_DELEGATE_TYPE_URL;
    const AMINO_TYPE: &'static str = "cosmos-sdk/MsgDelegate";

    fn encode_proto(&self) -> Result<Vec<u8>> {
        Ok(ProtoMsgDelegate {
            delegator_address: self.0.delegator_address.clone(),
            validator_address: self.0.validator_address.clone(),
            amount: Some((&self.0.amount).into()),
        }
        .encode_to_vec())
    }

    fn decode_proto(bytes: &[u8]) -> Result<Self> {
        let msg =
            ProtoMsgDelegate::decode(bytes).map_err(|e| proto_decode_error(Self::TYPE_URL, e))?;
        Ok(Self(StakingMsg {
            delegator_address: msg.delegator_address,
            validator_address: msg.validator_address,
            amount: required_amount(msg.amount, Self::TYPE_URL)?,
        }))
    }

    fn to_amino_value(&self) -> Result<Value> {
        self.0.to_amino_value()
    }

    fn from_amino_value(value: Value) -> Result<Self> {
        StakingMsg::from_amino_value(value, Self::AMINO_TYPE).map(Self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct MsgUndelegate(pub StakingMsg);

impl TypedMsg for MsgUndelegate {
    const TYPE_URL: &'static str = MSG_UNDELEGATE_TYPE_URL;
    const AMINO_TYPE: &'static str = "cosmos-sdk/MsgUndelegate";

    fn encode_proto(&self) -> Result<Vec<u8>> {
        Ok(ProtoMsgUndelegate {
            delegator_address: self.0.delegator_address.clone(),
            validator_address: self.0.validator_address.clone(),
            amount: Some((&self.0.amount).into()),
        }
        .encode_to_vec())
    }

    fn decode_proto(bytes: &[u8]) -> Result<Self> {
        let msg =
            ProtoMsgUndelegate::decode(bytes).map_err(|e| proto_decode_error(Self::TYPE_URL, e))?;
        Ok(Self(StakingMsg {
            delegator_address: msg.delegator_address,
            validator_address: msg.validator_address,
            amount: required_amount(msg.amount, Self::TYPE_URL)?,
        }))
    }

    fn to_amino_value(&self) -> Result<Value> {
        self.0.to_amino_value()
    }

    fn from_amino_value(value: Value) -> Result<Self> {
        StakingMsg::from_amino_value(value, Self::AMINO_TYPE).map(Self)
    }
}

/// CosmWasm contract execution. `msg` is carried as JSON in both forms and
/// serialized to compact UTF-8 JSON bytes in the protobuf form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MsgExecuteContract {
    pub sender: String,
    pub contract: String,
    pub msg: Value,
    #[serde(default)]
    pub funds: Vec<Coin>,
}

#[derive(Serialize, Deserialize)]
struct AminoMsgExecuteContract {
    sender: String,
    contract: String,
    msg: Value,
    #[serde(default)]
    funds: Vec<Coin>,
}

impl TypedMsg for MsgExecuteContract {
    const TYPE_URL: &'static str = MSG_EXECUTE_CONTRACT_TYPE_URL;
    const AMINO_TYPE: &'static str = "wasm/MsgExecuteContract";

    fn encode_proto(&self) -> Result<Vec<u8>> {
        Ok(ProtoMsgExecuteContract {
            sender: self.sender.clone(),
            contract: self.contract.clone(),
            msg: serde_json::to_vec(&self.msg)?,
            funds: coins_to_proto(&self.funds),
        }
        .encode_to_vec())
    }

    fn decode_proto(bytes: &[u8]) -> Result<Self> {
        let msg = ProtoMsgExecuteContract::decode(bytes)
            .map_err(|e| proto_decode_error(Self::TYPE_URL, e))?;
        let inner = serde_json::from_slice(&msg.msg)
            .map_err(|e| Error::Encoding(format!("contract msg is not JSON: {}", e)))?;
        Ok(Self {
            sender: msg.sender,
            contract: msg.contract,
            msg: inner,
            funds: coins_from_proto(msg.funds),
        })
    }

    fn to_amino_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(AminoMsgExecuteContract {
            sender: self.sender.clone(),
            contract: self.contract.clone(),
            msg: self.msg.clone(),
            funds: self.funds.clone(),
        })?)
    }

    fn from_amino_value(value: Value) -> Result<Self> {
        let msg: AminoMsgExecuteContract =
            serde_json::from_value(value).map_err(|e| amino_error(Self::AMINO_TYPE, e))?;
        Ok(Self {
            sender: msg.sender,
            contract: msg.contract,
            msg: msg.msg,
            funds: msg.funds,
        })
    }
}

/// Every transaction message kind the kit can encode
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Send(MsgSend),
    Delegate(MsgDelegate),
    Undelegate(MsgUndelegate),
    ExecuteContract(MsgExecuteContract),
}

/// Type URLs accepted by [`Message::from_encode_object`] and [`Message::from_any`]
pub const SUPPORTED_TYPE_URLS: &[&str] = &[
    MSG_SEND_TYPE_URL,
    MSG_DELEGATE_TYPE_URL,
    MSG_UNDELEGATE_TYPE_URL,
    MSG_EXECUTE_CONTRACT_TYPE_URL,
];

fn typed_value<T: DeserializeOwned>(value: &Value) -> Result<T> {
    serde_json::from_value(value.clone()).map_err(|e| Error::validation("value", e.to_string()))
}

impl Message {
    pub fn send(from_address: &str, to_address: &str, amount: Vec<Coin>) -> Self {
        Message::Send(MsgSend {
            from_address: from_address.to_string(),
            to_address: to_address.to_string(),
            amount,
        })
    }

    pub fn type_url(&self) -> &'static str {
        match self {
            Message::Send(_) => MsgSend::TYPE_URL,
            Message::Delegate(_) => MsgDelegate::TYPE_URL,
            Message::Undelegate(_) => MsgUndelegate::TYPE_URL,
            Message::ExecuteContract(_) => MsgExecuteContract::TYPE_URL,
        }
    }

    pub fn amino_type(&self) -> &'static str {
        match self {
            Message::Send(_) => MsgSend::AMINO_TYPE,
            Message::Delegate(_) => MsgDelegate::AMINO_TYPE,
            Message::Undelegate(_) => MsgUndelegate::AMINO_TYPE,
            Message::ExecuteContract(_) => MsgExecuteContract::AMINO_TYPE,
        }
    }

    /// Parse a `{typeUrl, value}` object and check its coin amounts
    pub fn from_encode_object(object: &EncodeObject) -> Result<Self> {
        let message = match object.type_url.as_str() {
            MSG_SEND_TYPE_URL => Message::Send(typed_value(&object.value)?),
            MSG_DELEGATE_TYPE_URL => Message::Delegate(typed_value(&object.value)?),
            MSG_UNDELEGATE_TYPE_URL => Message::Undelegate(typed_value(&object.value)?),
            MSG_EXECUTE_CONTRACT_TYPE_URL => Message::ExecuteContract(typed_value(&object.value)?),
            other => return Err(Error::UnsupportedMessageType(other.to_string())),
        };
        message.validate()?;
        Ok(message)
    }

    pub fn to_encode_object(&self) -> Result<EncodeObject> {
        let value = match self {
            Message::Send(msg) => serde_json::to_value(msg)?,
            Message::Delegate(msg) => serde_json::to_value(msg)?,
            Message::Undelegate(msg) => serde_json::to_value(msg)?,
            Message::ExecuteContract(msg) => serde_json::to_value(msg)?,
        };
        Ok(EncodeObject {
            type_url: self.type_url().to_string(),
            value,
        })
    }

    pub fn validate(&self) -> Result<()> {
        let coins: Vec<&Coin> = match self {
            Message::Send(msg) => msg.amount.iter().collect(),
            Message::Delegate(msg) => vec![&msg.0.amount],
            Message::Undelegate(msg) => vec![&msg.0.amount],
            Message::ExecuteContract(msg) => msg.funds.iter().collect(),
        };
        coins.into_iter().try_for_each(Coin::validate)
    }

    pub fn to_any(&self) -> Result<Any> {
        match self {
            Message::Send(msg) => msg.to_any(),
            Message::Delegate(msg) => msg.to_any(),
            Message::Undelegate(msg) => msg.to_any(),
            Message::ExecuteContract(msg) => msg.to_any(),
        }
    }

    pub fn from_any(any: &Any) -> Result<Self> {
        let bytes = any.value.as_slice();
        Ok(match any.type_url.as_str() {
            MSG_SEND_TYPE_URL => Message::Send(MsgSend::decode_proto(bytes)?),
            MSG_DELEGATE_TYPE_URL => Message::Delegate(MsgDelegate::decode_proto(bytes)?),
            MSG_UNDELEGATE_TYPE_URL => Message::Undelegate(MsgUndelegate::decode_proto(bytes)?),
            MSG_EXECUTE_CONTRACT_TYPE_URL => {
                Message::ExecuteContract(MsgExecuteContract::decode_proto(bytes)?)
            }
            other => return Err(Error::UnsupportedMessageType(other.to_string())),
        })
    }

    pub fn to_amino(&self) -> Result<AminoMsg> {
        let value = match self {
            Message::Send(msg) => msg.to_amino_value()?,
            Message::Delegate(msg) => msg.to_amino_value()?,
            Message::Undelegate(msg) => msg.to_amino_value()?,
            Message::ExecuteContract(msg) => msg.to_amino_value()?,
        };
        Ok(AminoMsg {
            msg_type: self.amino_type().to_string(),
            value,
        })
    }

    pub fn from_amino(msg: &AminoMsg) -> Result<Self> {
        let value = msg.value.clone();
        Ok(match msg.msg_type.as_str() {
            <MsgSend as TypedMsg>::AMINO_TYPE => Message::Send(MsgSend::from_amino_value(value)?),
            <MsgDelegate as TypedMsg>::AMINO_TYPE => Message::Delegate(MsgDelegate::from_amino_value(value)?),
            <MsgUndelegate as TypedMsg>::AMINO_TYPE => {
                Message::Undelegate(MsgUndelegate::from_amino_value(value)?)
            }
            <MsgExecuteContract as TypedMsg>::AMINO_TYPE => {
                Message::ExecuteContract(MsgExecuteContract::from_amino_value(value)?)
            }
            other => return Err(Error::UnsupportedMessageType(other.to_string())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ADDR: &str = "orai1f5nyvnx5ks738d5ys7pwa0evc42v6ff043h6d2";
    const VALOPER: &str = "oraivaloper1f5nyvnx5ks738d5ys7pwa0evc42v6ff0umvnxd";

    #[test]
    fn parses_send_encode_object() {
        let object: EncodeObject = serde_json::from_value(json!({
            "typeUrl": "/cosmos.bank.v1beta1.MsgSend",
            "value": {
                "fromAddress": ADDR,
                "toAddress": ADDR,
                "amount": [{ "denom": "orai", "amount": "100" }]
            }
        }))
        .unwrap();

        let message = Message::from_encode_object(&object).unwrap();
        assert_eq!(
            message,
            Message::send(ADDR, ADDR, vec![Coin::new("100", "orai")])
        );
        assert_eq!(message.to_encode_object().unwrap(), object);
    }

    #[test]
    fn unknown_type_url_is_rejected() {
        let object = EncodeObject {
            type_url: "/cosmos.gov.v1beta1.MsgVote".to_string(),
            value: json!({}),
        };
        let err = Message::from_encode_object(&object).unwrap_err();
        assert!(matches!(err, Error::UnsupportedMessageType(url) if url == "/cosmos.gov.v1beta1.MsgVote"));

        let any = Any {
            type_url: "/foo.Bar".to_string(),
            value: vec![],
        };
        assert!(matches!(
            Message::from_any(&any),
            Err(Error::UnsupportedMessageType(_))
        ));
    }

    #[test]
    fn float_amounts_are_rejected() {
        let object = EncodeObject {
            type_url: MSG_SEND_TYPE_URL.to_string(),
            value: json!({
                "fromAddress": ADDR,
                "toAddress": ADDR,
                "amount": [{ "denom": "orai", "amount": "0.5" }]
            }),
        };
        assert!(matches!(
            Message::from_encode_object(&object),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn send_amino_shape() {
        let message = Message::send(ADDR, VALOPER, vec![Coin::new("1", "orai")]);
        let amino = message.to_amino().unwrap();
        assert_eq!(
            serde_json::to_value(&amino).unwrap(),
            json!({
                "type": "cosmos-sdk/MsgSend",
                "value": {
                    "from_address": ADDR,
                    "to_address": VALOPER,
                    "amount": [{ "denom": "orai", "amount": "1" }]
                }
            })
        );
        assert_eq!(Message::from_amino(&amino).unwrap(), message);
    }

    #[test]
    fn every_kind_survives_proto_and_amino() {
        let messages = vec![
            Message::send(ADDR, ADDR, vec![Coin::new("1", "orai")]),
            Message::Delegate(MsgDelegate(StakingMsg {
                delegator_address: ADDR.to_string(),
                validator_address: VALOPER.to_string(),
                amount: Coin::new("1000", "orai"),
            })),
            Message::Undelegate(MsgUndelegate(StakingMsg {
                delegator_address: ADDR.to_string(),
                validator_address: VALOPER.to_string(),
                amount: Coin::new("5", "orai"),
            })),
            Message::ExecuteContract(MsgExecuteContract {
                sender: ADDR.to_string(),
                contract: "orai12hzjxfh77wl572gdzct2fxv2arxcm8j4vzdn9a".to_string(),
                msg: json!({ "transfer": { "recipient": ADDR, "amount": "10" } }),
                funds: vec![],
            }),
        ];

        for message in messages {
            let any = message.to_any().unwrap();
            assert_eq!(any.type_url, message.type_url());
            assert_eq!(Message::from_any(&any).unwrap(), message);

            let amino = message.to_amino().unwrap();
            assert_eq!(amino.msg_type, message.amino_type());
            let back = Message::from_amino(&amino).unwrap();
            assert_eq!(back.to_any().unwrap(), any);
        }
    }

    #[test]
    fn delegate_proto_requires_amount() {
        let bytes = ProtoMsgDelegate {
            delegator_address: ADDR.to_string(),
            validator_address: VALOPER.to_string(),
            amount: None,
        }
        .encode_to_vec();
        let any = Any {
            type_url: MSG_DELEGATE_TYPE_URL.to_string(),
            value: bytes,
        };
        assert!(matches!(Message::from_any(&any), Err(Error::Encoding(_))));
    }

    #[test]
    fn unknown_amino_type_is_rejected() {
        let amino = AminoMsg {
            msg_type: "cosmos-sdk/MsgVote".to_string(),
            value: json!({}),
        };
        assert!(matches!(
            Message::from_amino(&amino),
            Err(Error::UnsupportedMessageType(_))
        ));
    }
}
