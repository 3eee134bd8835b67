//! Cosmos SDK transaction primitives: coins and fees, the typed message
//! registry, public key descriptors, sign documents and `TxRaw` assembly.

mod coin;
mod msgs;
mod pubkey;
mod sign_doc;
mod tx;

pub use coin::{parse_safe_integer, Coin, GasPrice, StdFee, MAX_SAFE_INTEGER};
pub use msgs::{
    AminoMsg, EncodeObject, Message, MsgDelegate, MsgExecuteContract, MsgSend, MsgUndelegate,
    StakingMsg, MSG_DELEGATE_TYPE_URL, MSG_EXECUTE_CONTRACT_TYPE_URL, MSG_SEND_TYPE_URL,
    MSG_UNDELEGATE_TYPE_URL, SUPPORTED_TYPE_URLS,
};
pub use pubkey::{encode_pubkey, PubkeyType, AMINO_SECP256K1_PUBKEY_TYPE};
pub use sign_doc::{
    decode_tx_body, encode_body, make_auth_info_bytes, DecodedBody, SignDoc, SignMode,
    SignerEntry, StdPubKey, StdSignDoc, StdSignature,
};
pub use tx::{
    tx_hash, tx_raw_from_amino_signed_doc, tx_raw_from_direct_components, tx_raw_from_sign_doc,
    tx_raw_from_sign_doc_base64, TxRaw,
};

pub(crate) use tx::decode_base64;
