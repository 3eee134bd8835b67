//! Agent-facing actions
//!
//! Each action declares a name, description, similes, examples and a typed
//! input deriving `JsonSchema`. The [`ActionRegistry`] validates untyped JSON
//! input against that schema, runs the action and wraps the outcome in an
//! [`ActionResponse`] envelope.

mod broadcast;
mod query;
mod sign_doc;
mod transfer;
mod types;

use crate::agent::OraichainAgentKit;
use crate::client::ChainClient;
use crate::{Error, Result};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

pub use broadcast::{
    BroadcastSignDocBase64Action, BroadcastSignDocBase64Input, BroadcastSignedTxAction,
    BroadcastSignedTxFromSignedBytesAction, BroadcastSignedTxFromStdSignDocAction,
    BroadcastSignedTxInput, BroadcastSignedTxFromSignedBytesInput,
    BroadcastSignedTxFromStdSignDocInput,
};
pub use query::{
    QueryDelegationAction, QueryDelegationInput, QueryTxAction, QueryTxInput, TokenBalanceAction,
    TokenBalanceInput,
};
pub use sign_doc::{BuildSignDocAction, BuildSignDocInput};
pub use transfer::{TokenTransferAction, TokenTransferInput};
pub use types::{input_schema, parse_input, AnyJson};

pub const TOKEN_TRANSFER_ACTION: &str = "TOKEN_TRANSFER_ACTION";
pub const TOKEN_BALANCE_ACTION: &str = "TOKEN_BALANCE_ACTION";
pub const QUERY_DELEGATION_ACTION: &str = "QUERY_DELEGATION_ACTION";
pub const QUERY_TX_ACTION: &str = "QUERY_TX_ACTION";
pub const BUILD_SIGN_DOC_ACTION: &str = "BUILD_SIGN_DOC_ACTION";
pub const BROADCAST_SIGNED_TX_ACTION: &str = "BROADCAST_SIGNED_TX_ACTION";
pub const BROADCAST_SIGNED_TX_FROM_SIGNED_BYTES_AND_SIGNATURE_ACTION: &str =
    "BROADCAST_SIGNED_TX_FROM_SIGNED_BYTES_AND_SIGNATURE_ACTION";
pub const BROADCAST_SIGNED_TX_FROM_STD_SIGNDOC_AND_SIGNATURE_ACTION: &str =
    "BROADCAST_SIGNED_TX_FROM_STD_SIGNDOC_AND_SIGNATURE_ACTION";
pub const BROADCAST_SIGN_DOC_BASE64_ACTION: &str = "BROADCAST_SIGN_DOC_BASE64_ACTION";

/// One worked example shown to the agent
#[derive(Debug, Clone, Serialize)]
pub struct ActionExample {
    pub input: Value,
    pub output: Value,
    pub explanation: &'static str,
}

/// An operation exposed to an AI agent
#[async_trait]
pub trait Action: Send + Sync + 'static {
    const NAME: &'static str;
    type Input: DeserializeOwned + JsonSchema + Send;
    type Output: Serialize + Send;

    fn description(&self) -> &'static str;

    /// Alternative phrasings an agent may use to refer to this action
    fn similes(&self) -> &'static [&'static str] {
        &[]
    }

    fn examples(&self) -> Vec<ActionExample> {
        Vec::new()
    }

    async fn execute(&self, input: Self::Input) -> Result<Self::Output>;
}

/// Listing entry for a registered action
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub similes: Vec<&'static str>,
    pub examples: Vec<ActionExample>,
    pub input_schema: Value,
}

/// Uniform action result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ActionResponse {
    Success {
        data: Value,
    },
    Error {
        message: String,
        code: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<Value>,
    },
}

impl ActionResponse {
    pub fn success(data: Value) -> Self {
        ActionResponse::Success { data }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ActionResponse::Success { .. })
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            ActionResponse::Success { data } => Some(data),
            ActionResponse::Error { .. } => None,
        }
    }

    pub fn error_code(&self) -> Option<&str> {
        match self {
            ActionResponse::Success { .. } => None,
            ActionResponse::Error { code, .. } => Some(code),
        }
    }
}

impl From<Error> for ActionResponse {
    fn from(err: Error) -> Self {
        let details = match &err {
            Error::Validation { path, expected } => Some(json!({
                "path": path,
                "expected": expected,
            })),
            _ => None,
        };
        ActionResponse::Error {
            message: err.to_string(),
            code: err.code().to_string(),
            details,
        }
    }
}

impl From<Result<Value>> for ActionResponse {
    fn from(result: Result<Value>) -> Self {
        match result {
            Ok(data) => ActionResponse::success(data),
            Err(err) => err.into(),
        }
    }
}

/// Object-safe view of an [`Action`] for the registry
#[async_trait]
trait DynAction: Send + Sync {
    fn name(&self) -> &'static str;
    fn descriptor(&self) -> ActionDescriptor;
    async fn call(&self, args: Value) -> Result<Value>;
}

#[async_trait]
impl<A: Action> DynAction for A {
    fn name(&self) -> &'static str {
        A::NAME
    }

    fn descriptor(&self) -> ActionDescriptor {
        ActionDescriptor {
            name: A::NAME,
            description: self.description(),
            similes: self.similes().to_vec(),
            examples: self.examples(),
            input_schema: input_schema::<A::Input>(),
        }
    }

    async fn call(&self, args: Value) -> Result<Value> {
        let input: A::Input = parse_input(&input_schema::<A::Input>(), args)?;
        let output = self.execute(input).await?;
        Ok(serde_json::to_value(output)?)
    }
}

/// Named set of actions, dispatched by name
#[derive(Default)]
pub struct ActionRegistry {
    actions: Vec<Box<dyn DynAction>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an action, replacing any previous one with the same name
    pub fn register<A: Action>(&mut self, action: A) -> &mut Self {
        if let Some(pos) = self.actions.iter().position(|a| a.name() == A::NAME) {
            tracing::warn!(action = A::NAME, "Replacing registered action");
            self.actions[pos] = Box::new(action);
        } else {
            self.actions.push(Box::new(action));
        }
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.actions.iter().map(|a| a.name()).collect()
    }

    pub fn descriptors(&self) -> Vec<ActionDescriptor> {
        self.actions.iter().map(|a| a.descriptor()).collect()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Run the named action on untyped input
    pub async fn call(&self, name: &str, args: Value) -> ActionResponse {
        let Some(action) = self.actions.iter().find(|a| a.name() == name) else {
            tracing::warn!(action = name, "Unknown action");
            return ActionResponse::Error {
                message: format!("Unknown action: {}", name),
                code: "UNKNOWN_ACTION".to_string(),
                details: None,
            };
        };

        tracing::info!(action = name, "Executing action");
        let result = action.call(args).await;
        if let Err(e) = &result {
            tracing::warn!(action = name, code = e.code(), error = %e, "Action failed");
        }
        result.into()
    }
}

/// Registry with every Oraichain action bound to `kit`
pub fn default_registry<C: ChainClient + 'static>(kit: Arc<OraichainAgentKit<C>>) -> ActionRegistry {
    let mut registry = ActionRegistry::new();
    registry
        .register(TokenTransferAction::new(kit.clone()))
        .register(TokenBalanceAction::new(kit.clone()))
        .register(QueryDelegationAction::new(kit.clone()))
        .register(BuildSignDocAction::new(kit.clone()))
        .register(BroadcastSignedTxAction::new(kit.clone()))
        .register(BroadcastSignedTxFromSignedBytesAction::new(kit.clone()))
        .register(BroadcastSignedTxFromStdSignDocAction::new(kit.clone()))
        .register(BroadcastSignDocBase64Action::new(kit.clone()))
        .register(QueryTxAction::new(kit));
    registry
}
