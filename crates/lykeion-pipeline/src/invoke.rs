//! Nested invocation of external compute units.

use async_trait::async_trait;
use lykeion_core::{Identity, LykeionResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Payload handed to an external compute unit.
///
/// Carries the operation selector (some units dispatch on `operation`,
/// others on `field`), the caller arguments, and the caller identity so
/// the unit can apply its own checks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvokePayload {
    /// Operation selector used by multi-operation units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    /// Field selector used by schema-dispatched units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Arguments for the unit.
    pub arguments: Value,
    /// The caller identity, when the unit needs it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
}

impl InvokePayload {
    /// Creates a payload dispatched on `operation`.
    #[must_use]
    pub fn operation(operation: impl Into<String>, arguments: Value) -> Self {
        Self {
            operation: Some(operation.into()),
            field: None,
            arguments,
            identity: None,
        }
    }

    /// Creates a payload dispatched on `field`.
    #[must_use]
    pub fn field(field: impl Into<String>, arguments: Value) -> Self {
        Self {
            operation: None,
            field: Some(field.into()),
            arguments,
            identity: None,
        }
    }

    /// Creates a payload carrying only arguments.
    #[must_use]
    pub fn arguments(arguments: Value) -> Self {
        Self {
            operation: None,
            field: None,
            arguments,
            identity: None,
        }
    }

    /// Attaches the caller identity.
    #[must_use]
    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }
}

/// An external compute unit a stage can delegate to.
///
/// The pipeline treats the unit as an opaque function returning a JSON
/// result or an error; retries and timeouts are the unit's own concern.
#[async_trait]
pub trait Invoker: Send + Sync + 'static {
    /// Invokes the unit with the given payload.
    async fn invoke(&self, payload: InvokePayload) -> LykeionResult<Value>;
}
