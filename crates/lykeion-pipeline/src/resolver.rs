//! The staged resolver contract.
//!
//! A resolver is one pipeline stage: a `request` function computing what to
//! execute next and a `response` function inspecting the outcome. Both run
//! against the shared [`PipelineContext`]; neither performs I/O itself.
//! The executor does, against the stage's bound data source.

use lykeion_core::record::Item;
use lykeion_core::LykeionResult;
use lykeion_store::{Filter, Key, Patch};
use serde_json::Value;

use crate::context::PipelineContext;
use crate::invoke::InvokePayload;

/// What a stage's `request` phase asks the executor to do.
#[derive(Debug, Clone)]
pub enum StoreOperation {
    /// Fetch the item at the key.
    Get {
        /// Item key.
        key: Key,
    },
    /// Store the item at the key, replacing any existing item.
    Put {
        /// Item key.
        key: Key,
        /// The full item to store.
        item: Item,
    },
    /// Merge the patch's non-null fields into the item at the key.
    Update {
        /// Item key.
        key: Key,
        /// Fields to merge.
        patch: Patch,
    },
    /// Remove the item at the key.
    Remove {
        /// Item key.
        key: Key,
    },
    /// Scan the whole collection, optionally with a store-side equality
    /// filter. O(collection size).
    Scan {
        /// Optional store-side filter.
        filter: Option<Filter>,
    },
    /// Query a declared secondary index.
    Query {
        /// Index name.
        index: String,
        /// Value the indexed attribute must equal.
        value: Value,
        /// Optional further equality filter.
        filter: Option<Filter>,
    },
    /// Delegate to the stage's bound external compute unit.
    Invoke(InvokePayload),
    /// Declared no-op: touch neither store nor invoker. The stage's
    /// `response` recognizes the `Null` result this produces.
    Pass,
}

/// One pipeline stage: a request/response pair.
///
/// # Contract
///
/// - `request` must have no externally observable side effects other than
///   logging; it may read arguments and stash, and either produce an
///   operation, produce [`StoreOperation::Pass`] when absence of an input
///   is a valid business state, or raise when it is not.
/// - `response` must always examine [`PipelineContext::error`] first. It
///   may raise (terminating the pipeline), contain the error by taking it
///   and appending a diagnostic, or transform it into a more specific one.
///   An error left unexamined is propagated by the executor rather than
///   allowed to masquerade as success.
/// - State a later stage needs that is not part of the result chain must
///   be written to the stash; the keys used are part of this stage's
///   public contract.
pub trait Resolver: Send + Sync + 'static {
    /// Unique stage name, used for logging and diagnostics.
    fn name(&self) -> &'static str;

    /// Computes the operation to execute for this stage.
    fn request(&self, ctx: &mut PipelineContext) -> LykeionResult<StoreOperation>;

    /// Inspects the execution outcome and produces this stage's output.
    fn response(&self, ctx: &mut PipelineContext) -> LykeionResult<Value>;
}
