//! Student assessment result resolvers.
//!
//! A student's answer record is keyed by the student's subject id plus
//! the id of the parent assessment it answers, so there is at most one
//! record per student per assessment. Cross-student listing goes through
//! a secondary index over the parent id; the privilege tier decides
//! whether the caller sees every student's record or only their own.

use lykeion_authz::PolicyEvaluator;
use lykeion_core::{LykeionError, LykeionResult};
use lykeion_pipeline::{PipelineContext, Resolver, StoreOperation};
use lykeion_store::{Filter, Key};
use serde_json::Value;

use crate::assessments::OWNER_FIELD;

/// Secondary index over the parent assessment id, declared on the student
/// result collection.
pub const PARENT_INDEX: &str = "byParentAssessment";

/// Record field carrying the parent assessment id the index is built on.
pub const PARENT_FIELD: &str = "parentAssessId";

/// The caller's own answer record for one assessment.
///
/// Returns the raw stored record (or `null`); shaping is left to the
/// consuming layer.
#[derive(Debug, Default)]
pub struct GetStudentAssessment;

impl Resolver for GetStudentAssessment {
    fn name(&self) -> &'static str {
        "get_student_assessment"
    }

    fn request(&self, ctx: &mut PipelineContext) -> LykeionResult<StoreOperation> {
        let Some(parent_id) = ctx.argument_str(PARENT_FIELD) else {
            return Err(LykeionError::bad_request("ParentAssessId is required"));
        };
        Ok(StoreOperation::Get {
            key: Key::composite(ctx.identity().subject_id.clone(), parent_id),
        })
    }

    fn response(&self, ctx: &mut PipelineContext) -> LykeionResult<Value> {
        if let Some(error) = ctx.take_error() {
            return Err(error);
        }
        Ok(ctx.result().clone())
    }
}

/// Every student's answer records for one assessment, via the parent
/// index.
///
/// Teacher-or-above callers query the index bare; everyone else gets the
/// same query narrowed to their own subject id, so a student can only
/// ever see their own record through this path.
#[derive(Debug, Default)]
pub struct ListStudentAssessmentsByParent {
    policy: PolicyEvaluator,
}

impl ListStudentAssessmentsByParent {
    /// Creates the stage with the given evaluator.
    #[must_use]
    pub fn new(policy: PolicyEvaluator) -> Self {
        Self { policy }
    }
}

impl Resolver for ListStudentAssessmentsByParent {
    fn name(&self) -> &'static str {
        "list_student_assessments_by_parent"
    }

    fn request(&self, ctx: &mut PipelineContext) -> LykeionResult<StoreOperation> {
        let Some(parent_id) = ctx.argument_str(PARENT_FIELD).map(String::from) else {
            return Err(LykeionError::bad_request("ParentAssessId is required"));
        };

        let filter = if self.policy.has_teacher_or_above(ctx.identity()) {
            None
        } else {
            Some(Filter::eq(
                OWNER_FIELD,
                Value::String(ctx.identity().subject_id.clone()),
            ))
        };

        Ok(StoreOperation::Query {
            index: PARENT_INDEX.to_string(),
            value: Value::String(parent_id),
            filter,
        })
    }

    fn response(&self, ctx: &mut PipelineContext) -> LykeionResult<Value> {
        if let Some(error) = ctx.take_error() {
            return Err(error);
        }
        let items = ctx.result()["items"].as_array().cloned().unwrap_or_default();
        Ok(Value::Array(items))
    }
}
