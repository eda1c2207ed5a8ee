//! Assessment resolvers.
//!
//! Assessments are user-scoped: every record is keyed by the owning
//! subject id plus a sortable id, so plain reads and writes are
//! automatically confined to the caller's own records. Admin-facing
//! listings and the cascading delete are the only paths that cross that
//! boundary, and both go through the policy evaluator.

use lykeion_authz::PolicyEvaluator;
use lykeion_core::record::{self, Item, CREATED_AT, CREATED_BY};
use lykeion_core::{new_sortable_id, LykeionError, LykeionResult};
use lykeion_pipeline::{InvokePayload, PipelineContext, Resolver, StoreOperation};
use lykeion_store::{Filter, Key, Patch};
use serde_json::{json, Value};

/// Secondary index over the owning subject id, declared on the assessment
/// collection.
pub const OWNER_INDEX: &str = "byOwner";

/// Record field carrying the owning subject id the index is built on.
pub const OWNER_FIELD: &str = "userId";

fn object_item(value: &Value) -> Item {
    value.as_object().cloned().unwrap_or_default()
}

/// Assessment upsert under the caller's composite key: update in place
/// when the input carries an id, create under a fresh sortable id
/// otherwise.
///
/// On create, `published` is coerced to a real bool, `createdBy` carries
/// the owner key and `createdAt` is stamped. On update only the provided
/// fields are merged; `createdAt` and `createdBy` never move again.
/// `updatedAt` is refreshed on every write.
#[derive(Debug, Default)]
pub struct UpsertAssessment;

impl Resolver for UpsertAssessment {
    fn name(&self) -> &'static str {
        "upsert_assessment"
    }

    fn request(&self, ctx: &mut PipelineContext) -> LykeionResult<StoreOperation> {
        let mut input = object_item(ctx.input_or_arguments());
        let id = input.remove("id").and_then(|v| v.as_str().map(String::from));
        let subject = ctx.identity().subject_id.clone();

        match id {
            Some(id) => {
                input.remove(CREATED_BY);
                input.remove(CREATED_AT);
                if let Some(published) = input.remove("published") {
                    if !published.is_null() {
                        input.insert(
                            "published".to_string(),
                            Value::Bool(published.as_bool().unwrap_or(false)),
                        );
                    }
                }
                record::stamp_updated_at(&mut input);
                Ok(StoreOperation::Update {
                    key: Key::composite(subject, id),
                    patch: Patch::new(input),
                })
            }
            None => {
                let id = new_sortable_id();
                let published =
                    input.get("published").and_then(Value::as_bool).unwrap_or(false);
                input.insert("id".to_string(), Value::String(id.clone()));
                input.insert(OWNER_FIELD.to_string(), Value::String(subject.clone()));
                input.insert("published".to_string(), Value::Bool(published));
                if let Some(owner) = ctx.identity().owner_key().map(String::from) {
                    input.insert(CREATED_BY.to_string(), Value::String(owner));
                }
                record::stamp_created_at(&mut input);
                record::stamp_updated_at(&mut input);
                Ok(StoreOperation::Put {
                    key: Key::composite(subject, id),
                    item: input,
                })
            }
        }
    }

    fn response(&self, ctx: &mut PipelineContext) -> LykeionResult<Value> {
        if let Some(error) = ctx.take_error() {
            return Err(error);
        }
        Ok(ctx.result().clone())
    }
}

/// Partial assessment update: merge only the provided non-null fields,
/// always refresh `updatedAt`. A missing record surfaces as `NotFound`.
#[derive(Debug, Default)]
pub struct UpdateAssessment;

impl Resolver for UpdateAssessment {
    fn name(&self) -> &'static str {
        "update_assessment"
    }

    fn request(&self, ctx: &mut PipelineContext) -> LykeionResult<StoreOperation> {
        let mut values = object_item(ctx.input_or_arguments());
        let Some(id) = values
            .remove("id")
            .and_then(|v| v.as_str().map(String::from))
        else {
            return Err(LykeionError::bad_request("Assessment id is required"));
        };
        record::stamp_updated_at(&mut values);

        Ok(StoreOperation::Update {
            key: Key::composite(ctx.identity().subject_id.clone(), id),
            patch: Patch::new(values),
        })
    }

    fn response(&self, ctx: &mut PipelineContext) -> LykeionResult<Value> {
        if let Some(error) = ctx.take_error() {
            return Err(error);
        }
        Ok(ctx.result().clone())
    }
}

/// Assessment read.
///
/// The owning subject defaults to the caller, so plain reads stay
/// confined to the caller's own records by the key; naming another
/// subject in the `userId` argument requires the admin tier.
#[derive(Debug, Default)]
pub struct GetAssessment {
    policy: PolicyEvaluator,
}

impl GetAssessment {
    /// Creates the stage with the given evaluator.
    #[must_use]
    pub fn new(policy: PolicyEvaluator) -> Self {
        Self { policy }
    }
}

impl Resolver for GetAssessment {
    fn name(&self) -> &'static str {
        "get_assessment"
    }

    fn request(&self, ctx: &mut PipelineContext) -> LykeionResult<StoreOperation> {
        let Some(id) = ctx.argument_str("id").map(String::from) else {
            return Err(LykeionError::bad_request("Assessment id is required"));
        };
        let owner = ctx
            .argument_str(OWNER_FIELD)
            .unwrap_or(&ctx.identity().subject_id)
            .to_string();

        self.policy
            .can_view_assessment(ctx.identity(), Some(&owner))
            .into_result("getAssessment")?;

        Ok(StoreOperation::Get {
            key: Key::composite(owner, id),
        })
    }

    fn response(&self, ctx: &mut PipelineContext) -> LykeionResult<Value> {
        if let Some(error) = ctx.take_error() {
            return Err(error);
        }
        Ok(ctx.result().clone())
    }
}

/// The caller's own assessments, via the owner index.
#[derive(Debug, Default)]
pub struct ListAssessments;

impl Resolver for ListAssessments {
    fn name(&self) -> &'static str {
        "list_assessments"
    }

    fn request(&self, ctx: &mut PipelineContext) -> LykeionResult<StoreOperation> {
        Ok(StoreOperation::Query {
            index: OWNER_INDEX.to_string(),
            value: Value::String(ctx.identity().subject_id.clone()),
            filter: None,
        })
    }

    fn response(&self, ctx: &mut PipelineContext) -> LykeionResult<Value> {
        if let Some(error) = ctx.take_error() {
            return Err(error);
        }
        Ok(ctx.result()["items"].clone())
    }
}

/// Unfiltered assessment listing for the admin surface.
///
/// The schema layer restricts who can reach this field; the stage itself
/// only degrades a missing result collection to an empty one.
#[derive(Debug, Default)]
pub struct ListAllAssessments;

impl Resolver for ListAllAssessments {
    fn name(&self) -> &'static str {
        "list_all_assessments"
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

/// Published assessments, filtered store-side.
#[derive(Debug, Default)]
pub struct ListPublishedAssessments;

impl Resolver for ListPublishedAssessments {
    fn name(&self) -> &'static str {
        "list_published_assessments"
    }

    fn request(&self, _ctx: &mut PipelineContext) -> LykeionResult<StoreOperation> {
        Ok(StoreOperation::Scan {
            filter: Some(Filter::eq("published", Value::Bool(true))),
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

/// Cascading assessment deletion through the external delete unit.
///
/// The target owner defaults to the caller; naming another subject in the
/// `userId` argument requires the assessment-admin tier, since the record
/// being deleted belongs to that subject.
#[derive(Debug, Default)]
pub struct DeleteAssessment {
    policy: PolicyEvaluator,
}

impl DeleteAssessment {
    /// Creates the stage with the given evaluator.
    #[must_use]
    pub fn new(policy: PolicyEvaluator) -> Self {
        Self { policy }
    }
}

impl Resolver for DeleteAssessment {
    fn name(&self) -> &'static str {
        "delete_assessment"
    }

    fn request(&self, ctx: &mut PipelineContext) -> LykeionResult<StoreOperation> {
        let Some(id) = ctx.argument_str("id") else {
            return Err(LykeionError::bad_request("Assessment id is required"));
        };
        let owner = ctx
            .argument_str(OWNER_FIELD)
            .unwrap_or(&ctx.identity().subject_id)
            .to_string();

        self.policy
            .can_delete_assessment(ctx.identity(), Some(&owner))
            .into_result("deleteAssessment")?;

        let is_admin = self.policy.is_assessment_admin(ctx.identity());
        Ok(StoreOperation::Invoke(
            InvokePayload::field(
                "deleteAssessment",
                json!({ "id": id, "userId": owner, "isAdmin": is_admin }),
            )
            .with_identity(ctx.identity().clone()),
        ))
    }

    fn response(&self, ctx: &mut PipelineContext) -> LykeionResult<Value> {
        if let Some(error) = ctx.take_error() {
            return Err(error);
        }
        let success = ctx.result()["success"].as_bool().unwrap_or(false);
        Ok(Value::Bool(success))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lykeion_core::fixtures;
    use lykeion_core::record::UPDATED_AT;

    #[test]
    fn upsert_generates_sortable_id_and_coerces_published() {
        let mut ctx = PipelineContext::new(
            fixtures::teacher("t1"),
            json!({ "input": { "name": "Quiz 1", "published": null } }),
        );
        let StoreOperation::Put { key, item } = UpsertAssessment.request(&mut ctx).unwrap()
        else {
            panic!("expected a put");
        };

        assert_eq!(key.partition, "sub-t1");
        assert_eq!(key.sort.as_deref(), item["id"].as_str());
        assert_eq!(item["published"], json!(false));
        assert_eq!(item[OWNER_FIELD], json!("sub-t1"));
        assert_eq!(item[CREATED_BY], json!("t1"));
        assert!(item.contains_key(CREATED_AT));
        assert!(item.contains_key(UPDATED_AT));
    }

    #[test]
    fn upsert_with_id_updates_and_never_restamps_creation() {
        let mut ctx = PipelineContext::new(
            fixtures::teacher("t1"),
            json!({ "input": { "id": "a-1", "name": "Quiz 1", "createdBy": "mallory" } }),
        );
        let StoreOperation::Update { key, patch } = UpsertAssessment.request(&mut ctx).unwrap()
        else {
            panic!("expected an update");
        };
        assert_eq!(key, Key::composite("sub-t1", "a-1"));
        assert!(!patch.fields.contains_key(CREATED_AT));
        assert!(!patch.fields.contains_key(CREATED_BY));
        assert!(patch.fields.contains_key(UPDATED_AT));
    }

    #[test]
    fn upsert_with_id_coerces_published_only_when_provided() {
        let mut ctx = PipelineContext::new(
            fixtures::teacher("t1"),
            json!({ "input": { "id": "a-1", "published": true } }),
        );
        let StoreOperation::Update { patch, .. } = UpsertAssessment.request(&mut ctx).unwrap()
        else {
            panic!("expected an update");
        };
        assert_eq!(patch.fields["published"], json!(true));

        let mut ctx = PipelineContext::new(
            fixtures::teacher("t1"),
            json!({ "input": { "id": "a-1", "name": "Quiz 1" } }),
        );
        let StoreOperation::Update { patch, .. } = UpsertAssessment.request(&mut ctx).unwrap()
        else {
            panic!("expected an update");
        };
        assert!(!patch.fields.contains_key("published"));
    }

    #[test]
    fn update_requires_id() {
        let mut ctx = PipelineContext::new(
            fixtures::teacher("t1"),
            json!({ "input": { "name": "renamed" } }),
        );
        let error = UpdateAssessment.request(&mut ctx).unwrap_err();
        assert_eq!(error.kind(), lykeion_core::ErrorKind::BadRequest);
    }

    #[test]
    fn update_patch_refreshes_updated_at_only() {
        let mut ctx = PipelineContext::new(
            fixtures::teacher("t1"),
            json!({ "input": { "id": "a-1", "name": "renamed" } }),
        );
        let StoreOperation::Update { key, patch } = UpdateAssessment.request(&mut ctx).unwrap()
        else {
            panic!("expected an update");
        };

        assert_eq!(key, Key::composite("sub-t1", "a-1"));
        assert!(!patch.fields.contains_key("id"));
        assert!(patch.fields.contains_key(UPDATED_AT));
        assert!(!patch.fields.contains_key(CREATED_AT));
    }

    #[test]
    fn get_defaults_key_to_caller() {
        let mut ctx =
            PipelineContext::new(fixtures::teacher("t1"), json!({ "id": "a-1" }));
        let StoreOperation::Get { key } = GetAssessment::default().request(&mut ctx).unwrap()
        else {
            panic!("expected a get");
        };
        assert_eq!(key, Key::composite("sub-t1", "a-1"));
    }

    #[test]
    fn get_of_another_subjects_record_requires_admin() {
        let stage = GetAssessment::default();
        let mut ctx = PipelineContext::new(
            fixtures::teacher("t1"),
            json!({ "id": "a-1", "userId": "sub-t2" }),
        );
        let error = stage.request(&mut ctx).unwrap_err();
        assert_eq!(error.kind(), lykeion_core::ErrorKind::Unauthorized);

        let mut ctx = PipelineContext::new(
            fixtures::admin(),
            json!({ "id": "a-1", "userId": "sub-t2" }),
        );
        let StoreOperation::Get { key } = stage.request(&mut ctx).unwrap() else {
            panic!("expected a get");
        };
        assert_eq!(key, Key::composite("sub-t2", "a-1"));
    }

    #[test]
    fn delete_defaults_target_to_caller() {
        let stage = DeleteAssessment::default();
        let mut ctx = PipelineContext::new(fixtures::teacher("t1"), json!({ "id": "a-1" }));

        let StoreOperation::Invoke(payload) = stage.request(&mut ctx).unwrap() else {
            panic!("expected an invoke");
        };
        assert_eq!(payload.arguments[OWNER_FIELD], json!("sub-t1"));
        assert_eq!(payload.arguments["isAdmin"], json!(false));
    }

    #[test]
    fn delete_of_another_subjects_record_requires_admin_tier() {
        let stage = DeleteAssessment::default();
        let mut ctx = PipelineContext::new(
            fixtures::teacher("t1"),
            json!({ "id": "a-1", "userId": "sub-t2" }),
        );

        let error = stage.request(&mut ctx).unwrap_err();
        assert_eq!(error.kind(), lykeion_core::ErrorKind::Unauthorized);
    }

    #[test]
    fn delete_allows_assessment_admin_across_subjects() {
        let stage = DeleteAssessment::default();
        let mut ctx = PipelineContext::new(
            fixtures::super_admin(),
            json!({ "id": "a-1", "userId": "sub-t2" }),
        );

        let StoreOperation::Invoke(payload) = stage.request(&mut ctx).unwrap() else {
            panic!("expected an invoke");
        };
        assert_eq!(payload.arguments["isAdmin"], json!(true));
    }

    #[test]
    fn admin_listing_degrades_missing_results_to_empty() {
        let mut ctx = PipelineContext::new(fixtures::super_admin(), json!({}));
        ctx.set_result(Value::Null);

        assert_eq!(ListAllAssessments.response(&mut ctx).unwrap(), json!([]));
    }

    #[test]
    fn delete_response_is_false_without_success_flag() {
        let stage = DeleteAssessment::default();
        let mut ctx = PipelineContext::new(fixtures::teacher("t1"), json!({ "id": "a-1" }));
        ctx.set_result(json!({}));

        assert_eq!(stage.response(&mut ctx).unwrap(), json!(false));
    }
}
