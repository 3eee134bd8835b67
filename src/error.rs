//! Error types for the Oraichain agent kit

use thiserror::Error;

/// Coarse classification used by action adapters when shaping error envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed caller input
    Validation,
    /// RPC endpoint unreachable or misbehaving
    Connectivity,
    /// Malformed bytes, unsupported message types, out-of-range numbers
    Encoding,
    /// Requested chain object does not exist
    NotFound,
    /// The node answered but the chain refused the query; retrying won't help
    Chain,
    /// Local configuration problem
    Config,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input at `{path}`: expected {expected}")]
    Validation { path: String, expected: String },

    #[error("Connectivity error: {0}")]
    Connectivity(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Query {path} failed with code {code}: {log}")]
    Query { path: String, code: u32, log: String },

    #[error("Account {0} does not exist on chain. Send some tokens there before trying to query sequence.")]
    AccountNotFound(String),

    #[error("Transaction {0} not found")]
    TxNotFound(String),

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Invalid fee: {0}")]
    InvalidFee(String),

    #[error("Invalid sequence: {0}")]
    InvalidSequence(String),

    #[error("Unsupported message type: {0}")]
    UnsupportedMessageType(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn validation(path: impl Into<String>, expected: impl Into<String>) -> Self {
        Error::Validation {
            path: path.into(),
            expected: expected.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation { .. } => ErrorKind::Validation,
            Error::Connectivity(_) | Error::Network(_) | Error::Rpc { .. } => {
                ErrorKind::Connectivity
            }
            Error::Query { .. } => ErrorKind::Chain,
            Error::AccountNotFound(_) | Error::TxNotFound(_) => ErrorKind::NotFound,
            Error::InvalidPublicKey(_)
            | Error::InvalidFee(_)
            | Error::InvalidSequence(_)
            | Error::UnsupportedMessageType(_)
            | Error::Encoding(_)
            | Error::Json(_) => ErrorKind::Encoding,
            Error::Config(_) => ErrorKind::Config,
        }
    }

    /// Stable code reported in `{status: "error"}` envelopes
    pub fn code(&self) -> &'static str {
        match self {
            Error::Validation { .. } => "VALIDATION_ERROR",
            Error::Connectivity(_) | Error::Network(_) => "CONNECTIVITY_ERROR",
            Error::Rpc { .. } => "RPC_ERROR",
            Error::Query { .. } => "QUERY_FAILED",
            Error::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Error::TxNotFound(_) => "TX_NOT_FOUND",
            Error::InvalidPublicKey(_) => "INVALID_PUBLIC_KEY",
            Error::InvalidFee(_) => "INVALID_FEE",
            Error::InvalidSequence(_) => "INVALID_SEQUENCE",
            Error::UnsupportedMessageType(_) => "UNSUPPORTED_MESSAGE_TYPE",
            Error::Encoding(_) | Error::Json(_) => "ENCODING_ERROR",
            Error::Config(_) => "CONFIG_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(
            Error::validation("amount.denom", "string").kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            Error::Connectivity("reset".into()).kind(),
            ErrorKind::Connectivity
        );
        assert_eq!(
            Error::InvalidSequence("9007199254740993".into()).kind(),
            ErrorKind::Encoding
        );
        assert_eq!(
            Error::UnsupportedMessageType("/foo.Bar".into()).code(),
            "UNSUPPORTED_MESSAGE_TYPE"
        );
    }

    #[test]
    fn refused_query_is_not_retryable() {
        let err = Error::Query {
            path: "/cosmos.bank.v1beta1.Query/Balance".into(),
            code: 3,
            log: "decoding bech32 failed".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Chain);
        assert_eq!(err.code(), "QUERY_FAILED");
    }

    #[test]
    fn validation_message_names_path() {
        let err = Error::validation("signatures[1]", "type string");
        assert_eq!(
            err.to_string(),
            "Invalid input at `signatures[1]`: expected type string"
        );
    }
}
