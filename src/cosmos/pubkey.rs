//! Public key descriptors carried in `SignerInfo`.

use crate::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use cosmrs::proto::cosmos::crypto::secp256k1::PubKey;
use cosmrs::proto::prost::Message as _;
use cosmrs::proto::Any;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Amino type tag for secp256k1 keys inside a `StdSignature`
pub const AMINO_SECP256K1_PUBKEY_TYPE: &str = "tendermint/PubKeySecp256k1";

const COMPRESSED_SECP256K1_LEN: usize = 33;

/// Protobuf type URL of the signer's key. Both variants share the
/// `{ key: bytes }` message layout; only the tag differs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum PubkeyType {
    #[default]
    #[serde(rename = "/cosmos.crypto.secp256k1.PubKey")]
    Secp256k1,
    /// EVM-compatible key used by ethermint transactions
    #[serde(rename = "/ethermint.crypto.v1.ethsecp256k1.PubKey")]
    EthSecp256k1,
}

impl PubkeyType {
    pub fn type_url(&self) -> &'static str {
        match self {
            PubkeyType::Secp256k1 => "/cosmos.crypto.secp256k1.PubKey",
            PubkeyType::EthSecp256k1 => "/ethermint.crypto.v1.ethsecp256k1.PubKey",
        }
    }

    /// Wrap raw key bytes as an `Any`
    pub fn encode(&self, key: Vec<u8>) -> Any {
        Any {
            type_url: self.type_url().to_string(),
            value: PubKey { key }.encode_to_vec(),
        }
    }
}

/// Decode a base64 compressed secp256k1 key and wrap it as `pubkey_type`
pub fn encode_pubkey(public_key: &str, pubkey_type: PubkeyType) -> Result<Any> {
    let key = STANDARD
        .decode(public_key.trim())
        .map_err(|e| Error::InvalidPublicKey(format!("not valid base64: {}", e)))?;
    if key.len() != COMPRESSED_SECP256K1_LEN || !matches!(key[0], 0x02 | 0x03) {
        return Err(Error::InvalidPublicKey(format!(
            "public key must be a {}-byte compressed secp256k1 key, got {} bytes",
            COMPRESSED_SECP256K1_LEN,
            key.len()
        )));
    }
    Ok(pubkey_type.encode(key))
}
