//! Oraichain Agent Kit
//!
//! A signer-less toolkit that lets an AI agent drive Oraichain transactions:
//! - Build direct and Amino sign docs from live account state
//! - Reconstruct broadcastable `TxRaw` envelopes from externally signed artifacts
//! - Broadcast them and query balances, delegations and transactions
//!
//! # Security Model
//!
//! - The kit never holds or requests private keys
//! - Signing happens in the caller's wallet; only public keys and
//!   signatures cross the boundary
//! - Every agent-facing action validates its input against a JSON schema

pub mod agent;
pub mod client;
pub mod config;
pub mod cosmos;
pub mod tools;

mod error;

// Re-export commonly used types
pub use agent::{OraichainAgentKit, SignDocRequest};
pub use client::{ChainClient, RpcClient};
pub use config::{Config, RpcConfig};
pub use error::{Error, ErrorKind, Result};
pub use tools::{default_registry, ActionRegistry, ActionResponse};
