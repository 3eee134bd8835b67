//! Broadcastable `TxRaw` envelopes and their reconstruction from externally
//! signed artifacts.

use crate::cosmos::{
    encode_body, make_auth_info_bytes, Message, PubkeyType, SignDoc, SignMode, SignerEntry,
    StdSignDoc, StdSignature,
};
use crate::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use cosmrs::proto::cosmos::tx::v1beta1::TxRaw as ProtoTxRaw;
use cosmrs::proto::prost::Message as _;
use sha2::{Digest, Sha256};

/// Wire-ready transaction: body, auth info and index-aligned signatures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRaw {
    pub body_bytes: Vec<u8>,
    pub auth_info_bytes: Vec<u8>,
    pub signatures: Vec<Vec<u8>>,
}

impl TxRaw {
    pub fn to_bytes(&self) -> Vec<u8> {
        ProtoTxRaw {
            body_bytes: self.body_bytes.clone(),
            auth_info_bytes: self.auth_info_bytes.clone(),
            signatures: self.signatures.clone(),
        }
        .encode_to_vec()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let raw = ProtoTxRaw::decode(bytes)
            .map_err(|e| Error::Encoding(format!("invalid TxRaw: {}", e)))?;
        Ok(Self {
            body_bytes: raw.body_bytes,
            auth_info_bytes: raw.auth_info_bytes,
            signatures: raw.signatures,
        })
    }

    /// Hash the chain will report for this transaction
    pub fn hash(&self) -> String {
        tx_hash(&self.to_bytes())
    }
}

/// Uppercase hex SHA-256 of encoded transaction bytes
pub fn tx_hash(tx_bytes: &[u8]) -> String {
    hex::encode_upper(Sha256::digest(tx_bytes))
}

pub(crate) fn decode_base64(field: &str, value: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(value.trim())
        .map_err(|e| Error::Encoding(format!("{} is not valid base64: {}", field, e)))
}

/// Reassemble a `TxRaw` from base64 body bytes, auth-info bytes and
/// signatures. Signatures are not verified; zero signatures is legal.
pub fn tx_raw_from_direct_components(
    signed_body_bytes: &str,
    signed_auth_bytes: &str,
    signatures: &[String],
) -> Result<TxRaw> {
    let body_bytes = decode_base64("signedBodyBytes", signed_body_bytes)?;
    if body_bytes.is_empty() {
        return Err(Error::Encoding("signedBodyBytes is empty".to_string()));
    }
    let auth_info_bytes = decode_base64("signedAuthBytes", signed_auth_bytes)?;
    let signatures = signatures
        .iter()
        .enumerate()
        .map(|(i, sig)| decode_base64(&format!("signatures[{}]", i), sig))
        .collect::<Result<Vec<_>>>()?;

    Ok(TxRaw {
        body_bytes,
        auth_info_bytes,
        signatures,
    })
}

/// Rebuild a `TxRaw` from an Amino-signed document.
///
/// The body is re-derived by converting each Amino message back through the
/// registry, so it matches what direct signing of the same content produces.
/// The auth info carries `SIGN_MODE_LEGACY_AMINO_JSON`.
pub fn tx_raw_from_amino_signed_doc(
    signed_doc: &StdSignDoc,
    signature: &StdSignature,
    pubkey_type: PubkeyType,
) -> Result<TxRaw> {
    let messages = signed_doc
        .msgs
        .iter()
        .map(Message::from_amino)
        .collect::<Result<Vec<_>>>()?;
    let body_bytes = encode_body(&messages, &signed_doc.memo, signed_doc.timeout_height()?)?;

    let gas_limit = signed_doc.fee.gas_limit()?;
    let sequence = signed_doc.sequence()?;

    let key = STANDARD
        .decode(signature.pub_key.value.trim())
        .map_err(|e| Error::InvalidPublicKey(format!("pub_key.value is not valid base64: {}", e)))?;
    if key.is_empty() {
        return Err(Error::InvalidPublicKey("pub_key.value is empty".to_string()));
    }

    let auth_info_bytes = make_auth_info_bytes(
        &[SignerEntry {
            pubkey: pubkey_type.encode(key),
            sequence,
        }],
        &signed_doc.fee.amount,
        gas_limit,
        signed_doc.fee.granter_str(),
        signed_doc.fee.payer_str(),
        SignMode::Amino,
    );

    Ok(TxRaw {
        body_bytes,
        auth_info_bytes,
        signatures: vec![decode_base64("signature", &signature.signature)?],
    })
}

/// Attach one signature to a direct sign doc
pub fn tx_raw_from_sign_doc(sign_doc: SignDoc, signature: Vec<u8>) -> TxRaw {
    TxRaw {
        body_bytes: sign_doc.body_bytes,
        auth_info_bytes: sign_doc.auth_info_bytes,
        signatures: vec![signature],
    }
}

/// Decode a base64 protobuf `SignDoc` and attach a base64 signature
pub fn tx_raw_from_sign_doc_base64(sign_doc_base64: &str, signature: &str) -> Result<TxRaw> {
    let sign_doc = SignDoc::from_bytes(&decode_base64("signDocBase64", sign_doc_base64)?)?;
    Ok(tx_raw_from_sign_doc(
        sign_doc,
        decode_base64("signature", signature)?,
    ))
}
