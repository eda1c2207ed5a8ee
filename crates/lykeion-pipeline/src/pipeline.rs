//! Fixed-order pipeline composition and execution.
//!
//! A [`Pipeline`] chains resolvers in the order they were added. Execution
//! is strictly sequential: stage N's `response` completes before stage
//! N+1's `request` runs. A `request` or `response` error terminates the
//! pipeline and is surfaced to the caller; a data-source failure is placed
//! into the context for the stage's `response` to examine.
//!
//! The final output is a [`PipelineOutcome`]: the last stage's response
//! value plus any contained-failure diagnostics. Diagnostics never affect
//! the primary result; a contained secondary failure is observable only
//! through the side channel.

use std::sync::Arc;

use lykeion_core::{Identity, LykeionError, LykeionResult};
use lykeion_store::StoreAdapter;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use crate::context::{Diagnostic, PipelineContext};
use crate::invoke::Invoker;
use crate::resolver::{Resolver, StoreOperation};

/// What a stage executes its operations against.
#[derive(Clone)]
pub enum DataSource {
    /// One collection of the key-value store.
    Store(Arc<dyn StoreAdapter>),
    /// An external compute unit.
    Function(Arc<dyn Invoker>),
    /// No data source: the stage may only produce [`StoreOperation::Pass`].
    None,
}

impl DataSource {
    /// Binds a store collection.
    #[must_use]
    pub fn store(adapter: Arc<dyn StoreAdapter>) -> Self {
        Self::Store(adapter)
    }

    /// Binds an external compute unit.
    #[must_use]
    pub fn function(invoker: Arc<dyn Invoker>) -> Self {
        Self::Function(invoker)
    }
}

impl std::fmt::Debug for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(_) => f.write_str("DataSource::Store"),
            Self::Function(_) => f.write_str("DataSource::Function"),
            Self::None => f.write_str("DataSource::None"),
        }
    }
}

/// The primary result of a pipeline invocation plus the contained-failure
/// side channel.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// The last stage's response value.
    pub result: Value,
    /// Contained-failure records, in containment order.
    pub diagnostics: Vec<Diagnostic>,
}

struct Step {
    resolver: Arc<dyn Resolver>,
    source: DataSource,
}

/// An ordered chain of resolver stages.
pub struct Pipeline {
    name: &'static str,
    steps: Vec<Step>,
}

impl Pipeline {
    /// Creates a pipeline builder.
    #[must_use]
    pub fn builder(name: &'static str) -> PipelineBuilder {
        PipelineBuilder {
            name,
            steps: Vec::new(),
        }
    }

    /// Creates a single-stage pipeline.
    #[must_use]
    pub fn unit(name: &'static str, resolver: impl Resolver, source: DataSource) -> Self {
        Self::builder(name).stage(resolver, source).build()
    }

    /// The pipeline name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Names of the stages, in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.resolver.name()).collect()
    }

    /// Executes the pipeline for one invocation.
    ///
    /// The context (and its stash) lives exactly as long as this call;
    /// concurrent invocations share nothing but the store itself.
    #[instrument(skip(self, identity, arguments), fields(pipeline = self.name, caller = %identity.log_id()))]
    pub async fn execute(
        &self,
        identity: Identity,
        arguments: Value,
    ) -> LykeionResult<PipelineOutcome> {
        let mut ctx = PipelineContext::new(identity, arguments);
        let mut output = Value::Null;

        for step in &self.steps {
            let stage = step.resolver.name();
            debug!(stage, "request phase");
            let operation = step.resolver.request(&mut ctx)?;

            match execute_operation(&step.source, operation).await {
                Ok(result) => ctx.set_result(result),
                Err(error) => {
                    debug!(stage, %error, "data source failed");
                    ctx.set_error(error);
                }
            }

            debug!(stage, "response phase");
            output = step.resolver.response(&mut ctx)?;

            // Contract rule: a response must examine the error (taking it
            // to contain it, or raising its own). One left behind is
            // unexamined and must not masquerade as success.
            if let Some(error) = ctx.take_error() {
                warn!(stage, %error, "stage response left its error unexamined");
                return Err(error);
            }

            ctx.advance(output.clone());
        }

        Ok(PipelineOutcome {
            result: output,
            diagnostics: ctx.into_diagnostics(),
        })
    }
}

/// Runs one stage's operation against its data source.
async fn execute_operation(
    source: &DataSource,
    operation: StoreOperation,
) -> LykeionResult<Value> {
    match operation {
        StoreOperation::Pass => Ok(Value::Null),
        StoreOperation::Invoke(payload) => match source {
            DataSource::Function(invoker) => invoker.invoke(payload).await,
            _ => Err(LykeionError::internal(
                "stage produced an Invoke operation but is not bound to a compute unit",
            )),
        },
        store_op => {
            let DataSource::Store(adapter) = source else {
                return Err(LykeionError::internal(
                    "stage produced a store operation but is not bound to a store",
                ));
            };
            match store_op {
                StoreOperation::Get { key } => {
                    let item = adapter.get(&key).await?;
                    Ok(item.map_or(Value::Null, Value::Object))
                }
                StoreOperation::Put { key, item } => {
                    let stored = adapter.put(&key, item).await?;
                    Ok(Value::Object(stored))
                }
                StoreOperation::Update { key, patch } => {
                    let updated = adapter.update(&key, patch).await?;
                    Ok(Value::Object(updated))
                }
                StoreOperation::Remove { key } => {
                    let removed = adapter.remove(&key).await?;
                    Ok(removed.map_or(Value::Null, Value::Object))
                }
                StoreOperation::Scan { filter } => {
                    let output = adapter.scan(filter.as_ref()).await?;
                    Ok(json!({ "items": output.items }))
                }
                StoreOperation::Query {
                    index,
                    value,
                    filter,
                } => {
                    let output = adapter.query(&index, &value, filter.as_ref()).await?;
                    Ok(json!({ "items": output.items }))
                }
                StoreOperation::Pass | StoreOperation::Invoke(_) => unreachable!(),
            }
        }
    }
}

/// Builder for a [`Pipeline`].
pub struct PipelineBuilder {
    name: &'static str,
    steps: Vec<Step>,
}

impl PipelineBuilder {
    /// Appends a stage bound to the given data source.
    #[must_use]
    pub fn stage(mut self, resolver: impl Resolver, source: DataSource) -> Self {
        self.steps.push(Step {
            resolver: Arc::new(resolver),
            source,
        });
        self
    }

    /// Builds the pipeline. The stage order is fixed from here on.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            name: self.name,
            steps: self.steps,
        }
    }
}
