//! # Lykeion Pipeline
//!
//! The staged resolver execution model: each stage is a request/response
//! pair sharing a mutable [`PipelineContext`], and a [`Pipeline`] chains
//! stages in a fixed order, passing results forward and short-circuiting on
//! unrecovered errors.
//!
//! A stage's `request` computes what to execute next (a store operation, a
//! nested invocation, or a pass-through); the executor runs it against the
//! stage's bound [`DataSource`] and places the outcome into the context;
//! the stage's `response` inspects the result or error, may write to the
//! [`Stash`] for later stages, and produces the value fed to the next
//! stage, or to the caller, wrapped in a [`PipelineOutcome`] alongside any
//! contained-failure diagnostics.

#![doc(html_root_url = "https://docs.rs/lykeion-pipeline/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod invoke;
mod pipeline;
mod resolver;

pub use context::{Diagnostic, PipelineContext, Stash};
pub use invoke::{InvokePayload, Invoker};
pub use pipeline::{DataSource, Pipeline, PipelineBuilder, PipelineOutcome};
pub use resolver::{Resolver, StoreOperation};
