//! Knowledge-base resolvers.
//!
//! Knowledge bases hang off courses but live in their own user-scoped
//! collection (composite key: owning subject + course id) and are
//! provisioned and torn down by an external compute unit. Two deletion
//! paths exist with different error semantics: the caller-initiated
//! [`DeleteKnowledgeBase`] surfaces failures, while the cascade stage
//! [`CleanupKnowledgeBase`] contains them.

use lykeion_authz::PolicyEvaluator;
use lykeion_core::{LykeionError, LykeionResult};
use lykeion_pipeline::{InvokePayload, PipelineContext, Resolver, StoreOperation};
use lykeion_store::Key;
use serde_json::{json, Value};
use tracing::warn;

use crate::courses::STASH_COURSE_ID;

/// Permission gate preceding knowledge-base management.
///
/// Fetches the owning course and allows admins, the course owner, and any
/// teacher when the course is public. The fetched course is this stage's
/// output, so the next stage sees it as `prev`.
#[derive(Debug, Default)]
pub struct CheckKnowledgeBasePermission {
    policy: PolicyEvaluator,
}

impl CheckKnowledgeBasePermission {
    /// Creates the stage with the given evaluator.
    #[must_use]
    pub fn new(policy: PolicyEvaluator) -> Self {
        Self { policy }
    }
}

impl Resolver for CheckKnowledgeBasePermission {
    fn name(&self) -> &'static str {
        "check_knowledge_base_permission"
    }

    fn request(&self, ctx: &mut PipelineContext) -> LykeionResult<StoreOperation> {
        let Some(course_id) = ctx
            .input_or_arguments()
            .get("courseId")
            .and_then(Value::as_str)
        else {
            return Err(LykeionError::bad_request("Course ID is required"));
        };
        Ok(StoreOperation::Get {
            key: Key::simple(course_id),
        })
    }

    fn response(&self, ctx: &mut PipelineContext) -> LykeionResult<Value> {
        if let Some(error) = ctx.take_error() {
            return Err(error);
        }
        let Some(course) = ctx.result().as_object() else {
            return Err(LykeionError::not_found("Course not found"));
        };
        self.policy
            .can_manage_knowledge_base(ctx.identity(), course)
            .into_result("manageKnowledgeBase")?;
        Ok(ctx.result().clone())
    }
}

/// Knowledge-base creation: teacher-tier gate, then delegation to the
/// provisioning unit with the full caller arguments and identity.
#[derive(Debug, Default)]
pub struct CreateKnowledgeBase {
    policy: PolicyEvaluator,
}

impl CreateKnowledgeBase {
    /// Creates the stage with the given evaluator.
    #[must_use]
    pub fn new(policy: PolicyEvaluator) -> Self {
        Self { policy }
    }
}

impl Resolver for CreateKnowledgeBase {
    fn name(&self) -> &'static str {
        "create_knowledge_base"
    }

    fn request(&self, ctx: &mut PipelineContext) -> LykeionResult<StoreOperation> {
        self.policy
            .can_create_knowledge_base(ctx.identity())
            .into_result("createKnowledgeBase")?;
        Ok(StoreOperation::Invoke(
            InvokePayload::arguments(ctx.arguments().clone())
                .with_identity(ctx.identity().clone()),
        ))
    }

    fn response(&self, ctx: &mut PipelineContext) -> LykeionResult<Value> {
        if let Some(error) = ctx.take_error() {
            return Err(error);
        }
        Ok(ctx.result().clone())
    }
}

/// Caller-initiated knowledge-base deletion: invoker failures surface
/// unchanged, unlike the cascade cleanup.
#[derive(Debug, Default)]
pub struct DeleteKnowledgeBase;

impl Resolver for DeleteKnowledgeBase {
    fn name(&self) -> &'static str {
        "delete_knowledge_base"
    }

    fn request(&self, ctx: &mut PipelineContext) -> LykeionResult<StoreOperation> {
        let Some(course_id) = ctx.argument_str("courseId") else {
            return Err(LykeionError::bad_request("CourseId is required"));
        };
        Ok(StoreOperation::Invoke(InvokePayload::arguments(json!({
            "courseId": course_id,
        }))))
    }

    fn response(&self, ctx: &mut PipelineContext) -> LykeionResult<Value> {
        if let Some(error) = ctx.take_error() {
            return Err(error);
        }
        Ok(ctx.result().clone())
    }
}

/// Best-effort knowledge-base cleanup, run after a course deletion.
///
/// Reads the course id from the stash; when the delete stage did not
/// publish one the cleanup declares a no-op. An invoker failure is logged
/// and appended to diagnostics while the upstream result passes through
/// unchanged, so a secondary failure never downgrades the primary success.
#[derive(Debug, Default)]
pub struct CleanupKnowledgeBase;

impl Resolver for CleanupKnowledgeBase {
    fn name(&self) -> &'static str {
        "cleanup_knowledge_base"
    }

    fn request(&self, ctx: &mut PipelineContext) -> LykeionResult<StoreOperation> {
        let Some(course_id) = ctx.stash().get_str(STASH_COURSE_ID) else {
            return Ok(StoreOperation::Pass);
        };
        Ok(StoreOperation::Invoke(InvokePayload::arguments(json!({
            "courseId": course_id,
        }))))
    }

    fn response(&self, ctx: &mut PipelineContext) -> LykeionResult<Value> {
        if let Some(error) = ctx.take_error() {
            warn!(%error, "knowledge base cleanup failed");
            ctx.append_error(self.name(), &error);
        }
        Ok(ctx.prev().clone())
    }
}

/// Knowledge-base read: composite-key get scoped to the calling subject.
#[derive(Debug, Default)]
pub struct GetKnowledgeBase;

impl Resolver for GetKnowledgeBase {
    fn name(&self) -> &'static str {
        "get_knowledge_base"
    }

    fn request(&self, ctx: &mut PipelineContext) -> LykeionResult<StoreOperation> {
        if ctx.identity().subject_id.is_empty() {
            return Err(LykeionError::unauthorized("User not authenticated"));
        }
        let Some(course_id) = ctx.argument_str("courseId") else {
            return Err(LykeionError::bad_request("CourseId is required"));
        };
        Ok(StoreOperation::Get {
            key: Key::composite(ctx.identity().subject_id.clone(), course_id),
        })
    }

    fn response(&self, ctx: &mut PipelineContext) -> LykeionResult<Value> {
        if let Some(error) = ctx.take_error() {
            return Err(error);
        }
        let Some(mut record) = ctx.result().as_object().cloned() else {
            return Ok(Value::Null);
        };
        record
            .entry("status".to_string())
            .or_insert_with(|| Value::String("ACTIVE".to_string()));
        Ok(Value::Object(record))
    }
}
