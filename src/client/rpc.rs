//! CometBFT JSON-RPC client
//!
//! Chain queries go through `abci_query` with protobuf-encoded gRPC query
//! paths; transactions go through `broadcast_tx_sync` and `tx`.

use super::{Account, BroadcastResult, ChainClient, Delegation, DelegationResponse, TxInfo};
use crate::config::RpcConfig;
use crate::cosmos::Coin;
use crate::{Error, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use cosmrs::proto::cosmos::auth::v1beta1::{BaseAccount, QueryAccountRequest, QueryAccountResponse};
use cosmrs::proto::cosmos::bank::v1beta1::{QueryBalanceRequest, QueryBalanceResponse};
use cosmrs::proto::cosmos::staking::v1beta1::{QueryDelegationRequest, QueryDelegationResponse};
use cosmrs::proto::cosmos::vesting::v1beta1::{ContinuousVestingAccount, DelayedVestingAccount};
use cosmrs::proto::prost::Message as _;
use cosmrs::proto::Any;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};

const ACCOUNT_QUERY_PATH: &str = "/cosmos.auth.v1beta1.Query/Account";
const BALANCE_QUERY_PATH: &str = "/cosmos.bank.v1beta1.Query/Balance";
const DELEGATION_QUERY_PATH: &str = "/cosmos.staking.v1beta1.Query/Delegation";

const BASE_ACCOUNT_TYPE_URL: &str = "/cosmos.auth.v1beta1.BaseAccount";
const CONTINUOUS_VESTING_TYPE_URL: &str = "/cosmos.vesting.v1beta1.ContinuousVestingAccount";
const DELAYED_VESTING_TYPE_URL: &str = "/cosmos.vesting.v1beta1.DelayedVestingAccount";

/// Precision of `sdk.Dec` values carried as integer strings in protobuf
const LEGACY_DEC_PRECISION: usize = 18;

#[derive(Debug, Deserialize)]
struct RpcEnvelope<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

impl From<RpcErrorBody> for Error {
    fn from(body: RpcErrorBody) -> Self {
        let message = match body.data {
            Some(Value::String(data)) if !data.is_empty() => format!("{}: {}", body.message, data),
            Some(Value::Null) | None => body.message,
            Some(data) => format!("{}: {}", body.message, data),
        };
        Error::Rpc {
            code: body.code,
            message,
        }
    }
}

/// CometBFT renders 64-bit integers as strings; older nodes use numbers.
fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(0),
        Some(Raw::Number(n)) => Ok(n),
        Some(Raw::Text(s)) if s.is_empty() => Ok(0),
        Some(Raw::Text(s)) => s.parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Deserialize)]
struct StatusResult {
    node_info: NodeInfo,
}

#[derive(Debug, Deserialize)]
struct NodeInfo {
    network: String,
}

#[derive(Debug, Deserialize)]
struct AbciQueryResult {
    response: AbciResponse,
}

#[derive(Debug, Default, Deserialize)]
struct AbciResponse {
    #[serde(default)]
    code: u32,
    #[serde(default)]
    log: String,
    #[serde(default)]
    value: Option<String>,
}

impl AbciResponse {
    fn is_not_found(&self) -> bool {
        self.code != 0 && self.log.contains("not found")
    }

    fn into_value(self, path: &str) -> Result<Vec<u8>> {
        if self.code != 0 {
            return Err(Error::Query {
                path: path.to_string(),
                code: self.code,
                log: self.log,
            });
        }
        match self.value {
            Some(value) => STANDARD
                .decode(value)
                .map_err(|e| Error::Encoding(format!("{} returned invalid base64: {}", path, e))),
            None => Ok(Vec::new()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct BroadcastTxResult {
    #[serde(default)]
    code: u32,
    #[serde(default)]
    log: String,
    #[serde(default)]
    codespace: String,
    hash: String,
}

#[derive(Debug, Deserialize)]
struct TxResult {
    hash: String,
    #[serde(deserialize_with = "lenient_u64")]
    height: u64,
    tx_result: ExecTxResult,
}

#[derive(Debug, Deserialize)]
struct ExecTxResult {
    #[serde(default)]
    code: u32,
    #[serde(default)]
    log: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    gas_wanted: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    gas_used: u64,
}

/// Render an integer-encoded `sdk.Dec` with its decimal point
fn format_legacy_dec(raw: &str) -> String {
    if raw.contains('.') || raw.is_empty() {
        return raw.to_string();
    }
    let padded = format!("{:0>width$}", raw, width = LEGACY_DEC_PRECISION + 1);
    let (whole, frac) = padded.split_at(padded.len() - LEGACY_DEC_PRECISION);
    format!("{}.{}", whole, frac)
}

fn account_from_any(any: &Any) -> Result<Account> {
    let base = match any.type_url.as_str() {
        BASE_ACCOUNT_TYPE_URL => Some(decode_proto::<BaseAccount>(&any.value, &any.type_url)?),
        CONTINUOUS_VESTING_TYPE_URL => {
            decode_proto::<ContinuousVestingAccount>(&any.value, &any.type_url)?
                .base_vesting_account
                .and_then(|v| v.base_account)
        }
        DELAYED_VESTING_TYPE_URL => {
            decode_proto::<DelayedVestingAccount>(&any.value, &any.type_url)?
                .base_vesting_account
                .and_then(|v| v.base_account)
        }
        other => {
            return Err(Error::Encoding(format!("unsupported account type {}", other)));
        }
    };
    let base = base.ok_or_else(|| {
        Error::Encoding(format!("{} carries no base account", any.type_url))
    })?;
    Ok(Account {
        account_number: base.account_number,
        sequence: base.sequence,
    })
}

fn decode_proto<M: cosmrs::proto::prost::Message + Default>(bytes: &[u8], what: &str) -> Result<M> {
    M::decode(bytes).map_err(|e| Error::Encoding(format!("invalid {}: {}", what, e)))
}

/// JSON-RPC client for a single CometBFT endpoint
pub struct RpcClient {
    http: Client,
    url: url::Url,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(config: &RpcConfig) -> Result<Self> {
        let url = config.parsed_url()?;
        let http = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            http,
            url,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &url::Url {
        &self.url
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(method, id, "JSON-RPC request");

        let response = self
            .http
            .post(self.url.clone())
            .json(&json!({
                "jsonrpc": "2.0",
                "id": id,
                "method": method,
                "params": params,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Connectivity(format!(
                "{} returned HTTP {}",
                method, status
            )));
        }

        let envelope: RpcEnvelope<T> = response.json().await?;
        if let Some(error) = envelope.error {
            return Err(error.into());
        }
        envelope
            .result
            .ok_or_else(|| Error::Connectivity(format!("{} response has no result", method)))
    }

    async fn abci_query(&self, path: &str, request: Vec<u8>) -> Result<AbciResponse> {
        let result: AbciQueryResult = self
            .call(
                "abci_query",
                json!({
                    "path": path,
                    "data": hex::encode(request),
                    "prove": false,
                }),
            )
            .await?;
        Ok(result.response)
    }
}

#[async_trait]
impl ChainClient for RpcClient {
    async fn get_sequence(&self, address: &str) -> Result<Account> {
        let request = QueryAccountRequest {
            address: address.to_string(),
        };
        let response = self
            .abci_query(ACCOUNT_QUERY_PATH, request.encode_to_vec())
            .await?;
        if response.is_not_found() {
            return Err(Error::AccountNotFound(address.to_string()));
        }
        let bytes = response.into_value(ACCOUNT_QUERY_PATH)?;
        let account = decode_proto::<QueryAccountResponse>(&bytes, "QueryAccountResponse")?
            .account
            .ok_or_else(|| Error::AccountNotFound(address.to_string()))?;
        account_from_any(&account)
    }

    async fn get_chain_id(&self) -> Result<String> {
        let status: StatusResult = self.call("status", json!({})).await?;
        Ok(status.node_info.network)
    }

    async fn get_balance(&self, address: &str, denom: &str) -> Result<Coin> {
        let request = QueryBalanceRequest {
            address: address.to_string(),
            denom: denom.to_string(),
        };
        let bytes = self
            .abci_query(BALANCE_QUERY_PATH, request.encode_to_vec())
            .await?
            .into_value(BALANCE_QUERY_PATH)?;
        let balance = decode_proto::<QueryBalanceResponse>(&bytes, "QueryBalanceResponse")?
            .balance
            .map(Coin::from)
            .unwrap_or_else(|| Coin::new("0", denom));
        Ok(balance)
    }

    async fn get_delegation(
        &self,
        delegator_address: &str,
        validator_address: &str,
    ) -> Result<Option<DelegationResponse>> {
        let request = QueryDelegationRequest {
            delegator_addr: delegator_address.to_string(),
            validator_addr: validator_address.to_string(),
        };
        let response = self
            .abci_query(DELEGATION_QUERY_PATH, request.encode_to_vec())
            .await?;
        if response.is_not_found() {
            return Ok(None);
        }
        let bytes = response.into_value(DELEGATION_QUERY_PATH)?;
        let Some(found) =
            decode_proto::<QueryDelegationResponse>(&bytes, "QueryDelegationResponse")?
                .delegation_response
        else {
            return Ok(None);
        };

        let delegation = found.delegation.unwrap_or_default();
        Ok(Some(DelegationResponse {
            delegation: Delegation {
                delegator_address: delegation.delegator_address,
                validator_address: delegation.validator_address,
                shares: format_legacy_dec(&delegation.shares),
            },
            balance: found
                .balance
                .map(Coin::from)
                .ok_or_else(|| Error::Encoding("delegation response has no balance".to_string()))?,
        }))
    }

    async fn get_tx(&self, hash: &str) -> Result<Option<TxInfo>> {
        let hash_bytes = hex::decode(hash.trim())
            .map_err(|e| Error::Encoding(format!("tx hash is not valid hex: {}", e)))?;

        let result: TxResult = match self
            .call(
                "tx",
                json!({
                    "hash": STANDARD.encode(hash_bytes),
                    "prove": false,
                }),
            )
            .await
        {
            Ok(result) => result,
            Err(Error::Rpc { message, .. }) if message.contains("not found") => {
                tracing::debug!(hash, "transaction not found");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        Ok(Some(TxInfo {
            hash: result.hash,
            height: result.height,
            code: result.tx_result.code,
            raw_log: result.tx_result.log,
            gas_wanted: result.tx_result.gas_wanted,
            gas_used: result.tx_result.gas_used,
        }))
    }

    async fn broadcast_tx_sync(&self, tx_bytes: Vec<u8>) -> Result<BroadcastResult> {
        let result: BroadcastTxResult = self
            .call("broadcast_tx_sync", json!({ "tx": STANDARD.encode(tx_bytes) }))
            .await?;
        Ok(BroadcastResult {
            tx_hash: result.hash,
            code: result.code,
            raw_log: result.log,
            codespace: result.codespace,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmrs::proto::cosmos::vesting::v1beta1::BaseVestingAccount;
    use crate::ErrorKind;

    #[test]
    fn legacy_dec_gets_decimal_point() {
        assert_eq!(format_legacy_dec("1000000000000000000"), "1.000000000000000000");
        assert_eq!(format_legacy_dec("5"), "0.000000000000000005");
        assert_eq!(format_legacy_dec("2.5"), "2.5");
    }

    #[test]
    fn base_account_decodes() {
        let base = BaseAccount {
            address: "orai1xyz".to_string(),
            pub_key: None,
            account_number: 42,
            sequence: 7,
        };
        let any = Any {
            type_url: BASE_ACCOUNT_TYPE_URL.to_string(),
            value: base.encode_to_vec(),
        };
        assert_eq!(
            account_from_any(&any).unwrap(),
            Account {
                account_number: 42,
                sequence: 7
            }
        );
    }

    #[test]
    fn vesting_account_unwraps_base() {
        let vesting = DelayedVestingAccount {
            base_vesting_account: Some(BaseVestingAccount {
                base_account: Some(BaseAccount {
                    account_number: 3,
                    sequence: 1,
                    ..Default::default()
                }),
                ..Default::default()
            }),
        };
        let any = Any {
            type_url: DELAYED_VESTING_TYPE_URL.to_string(),
            value: vesting.encode_to_vec(),
        };
        assert_eq!(account_from_any(&any).unwrap().account_number, 3);
    }

    #[test]
    fn module_account_is_unsupported() {
        let any = Any {
            type_url: "/cosmos.auth.v1beta1.ModuleAccount".to_string(),
            value: vec![],
        };
        assert!(matches!(account_from_any(&any), Err(Error::Encoding(_))));
    }

    #[test]
    fn rpc_error_includes_data() {
        let body: RpcErrorBody = serde_json::from_value(json!({
            "code": -32603,
            "message": "Internal error",
            "data": "tx (ABCD) not found"
        }))
        .unwrap();
        match Error::from(body) {
            Error::Rpc { code, message } => {
                assert_eq!(code, -32603);
                assert_eq!(message, "Internal error: tx (ABCD) not found");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn tx_result_accepts_string_integers() {
        let result: TxResult = serde_json::from_value(json!({
            "hash": "ABCD",
            "height": "1200",
            "tx_result": {
                "code": 0,
                "log": "[]",
                "gas_wanted": "200000",
                "gas_used": 81234
            }
        }))
        .unwrap();
        assert_eq!(result.height, 1200);
        assert_eq!(result.tx_result.gas_wanted, 200_000);
        assert_eq!(result.tx_result.gas_used, 81_234);
    }

    #[test]
    fn abci_not_found_needs_error_code() {
        let response = AbciResponse {
            code: 22,
            log: "account orai1abc not found: key not found".to_string(),
            value: None,
        };
        assert!(response.is_not_found());

        let ok = AbciResponse::default();
        assert!(!ok.is_not_found());
        assert!(ok.into_value("/x").unwrap().is_empty());
    }

    #[test]
    fn abci_failure_is_chain_side() {
        let response = AbciResponse {
            code: 3,
            log: "decoding bech32 failed: invalid checksum".to_string(),
            value: None,
        };
        let err = response.into_value("/cosmos.bank.v1beta1.Query/Balance").unwrap_err();
        assert!(matches!(err, Error::Query { code: 3, .. }));
        assert_eq!(err.kind(), ErrorKind::Chain);
    }

    #[test]
    fn client_rejects_non_http_urls() {
        assert!(matches!(
            RpcClient::new(&RpcConfig::new("ftp://node")),
            Err(Error::Config(_))
        ));
    }
}
