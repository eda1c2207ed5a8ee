//! Student-directory pass-throughs.
//!
//! Listing students and their groups is handled entirely by the directory
//! unit; these stages forward the caller arguments and identity and
//! surface unit failures unchanged.

use lykeion_core::LykeionResult;
use lykeion_pipeline::{InvokePayload, PipelineContext, Resolver, StoreOperation};
use serde_json::Value;

fn pass_through(
    operation: &str,
    ctx: &PipelineContext,
) -> LykeionResult<StoreOperation> {
    Ok(StoreOperation::Invoke(
        InvokePayload::operation(operation, ctx.arguments().clone())
            .with_identity(ctx.identity().clone()),
    ))
}

fn surface(ctx: &mut PipelineContext) -> LykeionResult<Value> {
    if let Some(error) = ctx.take_error() {
        return Err(error);
    }
    Ok(ctx.result().clone())
}

/// Student listing via the directory unit.
#[derive(Debug, Default)]
pub struct ListStudents;

impl Resolver for ListStudents {
    fn name(&self) -> &'static str {
        "list_students"
    }

    fn request(&self, ctx: &mut PipelineContext) -> LykeionResult<StoreOperation> {
        pass_through("listStudents", ctx)
    }

    fn response(&self, ctx: &mut PipelineContext) -> LykeionResult<Value> {
        surface(ctx)
    }
}

/// Student-group listing via the directory unit.
#[derive(Debug, Default)]
pub struct ListStudentGroups;

impl Resolver for ListStudentGroups {
    fn name(&self) -> &'static str {
        "list_student_groups"
    }

    fn request(&self, ctx: &mut PipelineContext) -> LykeionResult<StoreOperation> {
        pass_through("listStudentGroups", ctx)
    }

    fn response(&self, ctx: &mut PipelineContext) -> LykeionResult<Value> {
        surface(ctx)
    }
}
