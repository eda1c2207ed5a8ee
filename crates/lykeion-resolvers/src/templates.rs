//! Assessment-template resolvers.
//!
//! Templates are user-scoped like assessments, but listing is open to any
//! authenticated caller and deletion may name another owner explicitly.

use lykeion_authz::PolicyEvaluator;
use lykeion_core::record::{self, Item, CREATED_BY};
use lykeion_core::{new_sortable_id, LykeionError, LykeionResult};
use lykeion_pipeline::{PipelineContext, Resolver, StoreOperation};
use lykeion_store::Key;
use serde_json::Value;
use tracing::warn;

use crate::assessments::OWNER_FIELD;

/// Template creation under a fresh sortable id.
#[derive(Debug, Default)]
pub struct CreateTemplate;

impl Resolver for CreateTemplate {
    fn name(&self) -> &'static str {
        "create_assess_template"
    }

    fn request(&self, ctx: &mut PipelineContext) -> LykeionResult<StoreOperation> {
        let mut item = ctx
            .input_or_arguments()
            .as_object()
            .cloned()
            .unwrap_or_else(Item::new);
        let id = new_sortable_id();
        let subject = ctx.identity().subject_id.clone();

        item.insert("id".to_string(), Value::String(id.clone()));
        item.insert(OWNER_FIELD.to_string(), Value::String(subject.clone()));
        if let Some(owner) = ctx.identity().owner_key().map(String::from) {
            item.insert(CREATED_BY.to_string(), Value::String(owner));
        }
        record::stamp_created_at(&mut item);

        Ok(StoreOperation::Put {
            key: Key::composite(subject, id),
            item,
        })
    }

    fn response(&self, ctx: &mut PipelineContext) -> LykeionResult<Value> {
        if let Some(error) = ctx.take_error() {
            return Err(error);
        }
        Ok(ctx.result().clone())
    }
}

/// Template listing: visible to every authenticated caller.
#[derive(Debug, Default)]
pub struct ListTemplates;

impl Resolver for ListTemplates {
    fn name(&self) -> &'static str {
        "list_assess_templates"
    }

    fn request(&self, _ctx: &mut PipelineContext) -> LykeionResult<StoreOperation> {
        Ok(StoreOperation::Scan { filter: None })
    }

    fn response(&self, ctx: &mut PipelineContext) -> LykeionResult<Value> {
        if let Some(error) = ctx.take_error() {
            return Err(error);
        }
        let items = ctx.result()["items"].as_array().cloned().unwrap_or_default();
        Ok(Value::Array(items))
    }
}

/// Template deletion: the owner or an admin, idempotent boolean result.
#[derive(Debug, Default)]
pub struct DeleteTemplate {
    policy: PolicyEvaluator,
}

impl DeleteTemplate {
    /// Creates the stage with the given evaluator.
    #[must_use]
    pub fn new(policy: PolicyEvaluator) -> Self {
        Self { policy }
    }
}

impl Resolver for DeleteTemplate {
    fn name(&self) -> &'static str {
        "delete_assess_template"
    }

    fn request(&self, ctx: &mut PipelineContext) -> LykeionResult<StoreOperation> {
        let Some(id) = ctx.argument_str("id") else {
            return Err(LykeionError::bad_request("Template id is required"));
        };
        let owner = ctx
            .argument_str(OWNER_FIELD)
            .unwrap_or(&ctx.identity().subject_id)
            .to_string();

        if !self.policy.is_privileged(ctx.identity()) && owner != ctx.identity().subject_id {
            return Err(LykeionError::unauthorized_for(
                "Permission denied",
                "deleteAssessTemplate",
            ));
        }

        Ok(StoreOperation::Remove {
            key: Key::composite(owner, id),
        })
    }

    fn response(&self, ctx: &mut PipelineContext) -> LykeionResult<Value> {
        if let Some(error) = ctx.take_error() {
            warn!(%error, "template delete failed");
            return Ok(Value::Bool(false));
        }
        Ok(Value::Bool(true))
    }
}
