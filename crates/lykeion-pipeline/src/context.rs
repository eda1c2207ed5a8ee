//! Pipeline context types.
//!
//! The [`PipelineContext`] carries state through one pipeline invocation:
//! the immutable caller identity, the request arguments, the mutable
//! [`Stash`] side-channel, the previous stage's output, and the current
//! store result or error. It is created per invocation and discarded at the
//! end of the call; no state is shared across invocations.

use lykeion_core::{Identity, LykeionError};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Invocation-scoped key/value side-channel for passing data between stages
/// outside the primary result chain.
///
/// Stash keys are part of a stage's public contract: an earlier stage's
/// `response` writes them, a later stage's `request` reads them. By
/// convention each key is written once and read many times; overwrites are
/// legal but logged, since they usually indicate two stages fighting over
/// a key.
#[derive(Debug, Clone, Default)]
pub struct Stash {
    entries: HashMap<String, Value>,
}

impl Stash {
    /// Creates an empty stash.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a value under `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if self.entries.contains_key(&key) {
            debug!(key, "stash key overwritten");
        }
        self.entries.insert(key, value);
    }

    /// Reads the value under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Reads the value under `key` as a string.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Returns true if `key` is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

/// A contained-failure record: observable only through the side channel,
/// never through the primary result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Name of the stage that contained the failure.
    pub stage: String,
    /// Human-readable failure message.
    pub message: String,
    /// Wire error type of the contained failure.
    pub error_type: String,
}

/// Context shared by all stages of one pipeline invocation.
#[derive(Debug)]
pub struct PipelineContext {
    /// The authenticated caller, normalized at the boundary.
    identity: Identity,
    /// Request arguments as supplied by the caller.
    arguments: Value,
    /// Cross-stage side-channel.
    stash: Stash,
    /// The previous stage's response output (`Null` for the first stage).
    prev: Value,
    /// The current stage's store/invoker result (`Null` before execution
    /// and for pass-through operations).
    result: Value,
    /// Error from the current stage's store/invoker execution, if any.
    error: Option<LykeionError>,
    /// Contained-failure records accumulated across stages.
    diagnostics: Vec<Diagnostic>,
}

impl PipelineContext {
    /// Creates a context for one invocation.
    #[must_use]
    pub fn new(identity: Identity, arguments: Value) -> Self {
        Self {
            identity,
            arguments,
            stash: Stash::new(),
            prev: Value::Null,
            result: Value::Null,
            error: None,
            diagnostics: Vec::new(),
        }
    }

    /// The caller identity.
    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// The raw request arguments.
    #[must_use]
    pub fn arguments(&self) -> &Value {
        &self.arguments
    }

    /// A named top-level argument.
    #[must_use]
    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments.get(name)
    }

    /// A named top-level argument as a string.
    #[must_use]
    pub fn argument_str(&self, name: &str) -> Option<&str> {
        self.argument(name).and_then(Value::as_str)
    }

    /// The `input` argument object when present, else the arguments
    /// themselves.
    ///
    /// Mutation arguments arrive either wrapped (`{ input: {...} }`) or
    /// flat, depending on the calling surface; stages that accept both use
    /// this accessor.
    #[must_use]
    pub fn input_or_arguments(&self) -> &Value {
        match self.arguments.get("input") {
            Some(input) if input.is_object() => input,
            _ => &self.arguments,
        }
    }

    /// The stash.
    #[must_use]
    pub fn stash(&self) -> &Stash {
        &self.stash
    }

    /// The stash, mutably.
    pub fn stash_mut(&mut self) -> &mut Stash {
        &mut self.stash
    }

    /// The previous stage's output.
    #[must_use]
    pub fn prev(&self) -> &Value {
        &self.prev
    }

    /// The current stage's store/invoker result.
    #[must_use]
    pub fn result(&self) -> &Value {
        &self.result
    }

    /// The current stage's execution error, if any.
    ///
    /// A `response` implementation must always examine this before trusting
    /// [`Self::result`]; containment is expressed by [`Self::take_error`].
    #[must_use]
    pub fn error(&self) -> Option<&LykeionError> {
        self.error.as_ref()
    }

    /// Takes ownership of the current error, marking it handled.
    ///
    /// A `response` that intends to contain or transform the failure must
    /// take it; an error left in place after a successful `response` is
    /// treated by the executor as unexamined and propagated.
    pub fn take_error(&mut self) -> Option<LykeionError> {
        self.error.take()
    }

    /// Appends a contained-failure diagnostic.
    pub fn append_error(&mut self, stage: impl Into<String>, error: &LykeionError) {
        self.diagnostics.push(Diagnostic {
            stage: stage.into(),
            message: error.to_string(),
            error_type: error.error_type().to_string(),
        });
    }

    /// The diagnostics accumulated so far.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Records the current stage's execution result.
    ///
    /// Called by the executor between the phases; stage tests use it to
    /// simulate an execution outcome.
    pub fn set_result(&mut self, result: Value) {
        self.result = result;
    }

    /// Records the current stage's execution failure.
    ///
    /// Called by the executor between the phases; stage tests use it to
    /// simulate a failed execution.
    pub fn set_error(&mut self, error: LykeionError) {
        self.error = Some(error);
    }

    pub(crate) fn advance(&mut self, output: Value) {
        self.prev = output;
        self.result = Value::Null;
        self.error = None;
    }

    pub(crate) fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
