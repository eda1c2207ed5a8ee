//! Course resolvers.
//!
//! Courses are simple-keyed records owned through `createdBy`. Upsert is
//! split across two stages (permission check, then write) so the check can
//! read the stored record before the write happens; deletion participates
//! in the cascading pipeline in [`crate::pipelines`].

use lykeion_authz::PolicyEvaluator;
use lykeion_core::record::{
    self, string_field, Item, CREATED_AT, CREATED_BY, UPDATED_AT,
};
use lykeion_core::{new_random_id, LykeionError, LykeionResult};
use lykeion_pipeline::{PipelineContext, Resolver, StoreOperation};
use lykeion_store::{Key, Patch};
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Stash key under which [`DeleteCourse`] publishes the deleted course id.
pub const STASH_COURSE_ID: &str = "courseId";

/// Statuses a course record may legitimately carry.
const COURSE_STATUSES: [&str; 4] = ["ACTIVE", "INACTIVE", "DRAFT", "ARCHIVED"];

fn object_item(value: &Value) -> Item {
    value.as_object().cloned().unwrap_or_default()
}

/// Permission gate preceding a course write.
///
/// With an id in the input this fetches the stored course and requires
/// modify permission on it; without one the input is a creation, gated on
/// the teacher tier instead, and no fetch happens.
#[derive(Debug, Default)]
pub struct CheckCourseUpdatePermission {
    policy: PolicyEvaluator,
}

impl CheckCourseUpdatePermission {
    /// Creates the stage with the given evaluator.
    #[must_use]
    pub fn new(policy: PolicyEvaluator) -> Self {
        Self { policy }
    }
}

impl Resolver for CheckCourseUpdatePermission {
    fn name(&self) -> &'static str {
        "check_course_update_permission"
    }

    fn request(&self, ctx: &mut PipelineContext) -> LykeionResult<StoreOperation> {
        match ctx.input_or_arguments().get("id").and_then(Value::as_str) {
            Some(id) => Ok(StoreOperation::Get {
                key: Key::simple(id),
            }),
            None => Ok(StoreOperation::Pass),
        }
    }

    fn response(&self, ctx: &mut PipelineContext) -> LykeionResult<Value> {
        if let Some(error) = ctx.take_error() {
            return Err(error);
        }

        let has_id = ctx
            .input_or_arguments()
            .get("id")
            .and_then(Value::as_str)
            .is_some();
        if !has_id {
            self.policy
                .can_create_course(ctx.identity())
                .into_result("createCourse")?;
            return Ok(json!({}));
        }

        let Some(course) = ctx.result().as_object() else {
            return Err(LykeionError::not_found("Course not found"));
        };
        self.policy
            .can_modify_course(ctx.identity(), course)
            .into_result("updateCourse")?;

        // Hand the stored record to the write stage.
        Ok(ctx.result().clone())
    }
}

/// Course upsert: update in place when the input carries an id, create
/// under a fresh random id otherwise.
///
/// `createdBy` and `createdAt` are stamped only on the create path;
/// `updatedAt` is refreshed on every write. Runs after
/// [`CheckCourseUpdatePermission`] in the composed pipeline.
#[derive(Debug, Default)]
pub struct UpsertCourse;

impl Resolver for UpsertCourse {
    fn name(&self) -> &'static str {
        "upsert_course"
    }

    fn request(&self, ctx: &mut PipelineContext) -> LykeionResult<StoreOperation> {
        let mut input = object_item(ctx.input_or_arguments());
        let id = input.remove("id").and_then(|v| v.as_str().map(String::from));

        match id {
            Some(id) => {
                input.remove(CREATED_BY);
                input.remove(CREATED_AT);
                record::stamp_updated_at(&mut input);
                Ok(StoreOperation::Update {
                    key: Key::simple(id),
                    patch: Patch::new(input),
                })
            }
            None => {
                let id = new_random_id();
                let owner = ctx.identity().owner_key().map(String::from);
                input.insert("id".to_string(), Value::String(id.clone()));
                if let Some(owner) = owner {
                    input.insert(CREATED_BY.to_string(), Value::String(owner));
                }
                record::stamp_created_at(&mut input);
                record::stamp_updated_at(&mut input);
                Ok(StoreOperation::Put {
                    key: Key::simple(id),
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

/// Course deletion stage.
///
/// Returns `true` on success and publishes the course id to the stash so
/// the cleanup stage can find it; a store failure yields `false` without
/// raising, leaving the stash untouched.
#[derive(Debug, Default)]
pub struct DeleteCourse;

impl Resolver for DeleteCourse {
    fn name(&self) -> &'static str {
        "delete_course"
    }

    fn request(&self, ctx: &mut PipelineContext) -> LykeionResult<StoreOperation> {
        let Some(id) = ctx.argument_str("id") else {
            return Err(LykeionError::bad_request("Course id is required"));
        };
        Ok(StoreOperation::Remove {
            key: Key::simple(id),
        })
    }

    fn response(&self, ctx: &mut PipelineContext) -> LykeionResult<Value> {
        if let Some(error) = ctx.take_error() {
            warn!(%error, "course delete failed");
            return Ok(Value::Bool(false));
        }
        if let Some(id) = ctx.argument_str("id").map(String::from) {
            ctx.stash_mut().insert(STASH_COURSE_ID, Value::String(id));
        }
        Ok(Value::Bool(true))
    }
}

/// Course read with repair of legacy records.
///
/// Records written by earlier deployments can miss the name, status, or
/// timestamp fields; the read path fills them in rather than leaking the
/// gaps to callers. The repaired value is not written back.
#[derive(Debug, Default)]
pub struct GetCourse;

impl GetCourse {
    fn repair(course: &mut Item) -> bool {
        let mut repaired = false;

        if string_field(course, "name").is_none() {
            if let Some(id) = string_field(course, "id").map(String::from) {
                course.insert("name".to_string(), Value::String(format!("Course {id}")));
                repaired = true;
            }
        }

        let status_ok = string_field(course, "status")
            .is_some_and(|s| COURSE_STATUSES.contains(&s));
        if !status_ok {
            course.insert("status".to_string(), Value::String("ACTIVE".to_string()));
            repaired = true;
        }

        if !course.contains_key(CREATED_AT) {
            record::stamp_created_at(course);
            repaired = true;
        }
        if !course.contains_key(UPDATED_AT) {
            record::stamp_updated_at(course);
            repaired = true;
        }

        repaired
    }
}

impl Resolver for GetCourse {
    fn name(&self) -> &'static str {
        "get_course"
    }

    fn request(&self, ctx: &mut PipelineContext) -> LykeionResult<StoreOperation> {
        let Some(course_id) = ctx.argument_str("courseId") else {
            return Err(LykeionError::bad_request("CourseId is required"));
        };
        Ok(StoreOperation::Get {
            key: Key::simple(course_id),
        })
    }

    fn response(&self, ctx: &mut PipelineContext) -> LykeionResult<Value> {
        if let Some(error) = ctx.take_error() {
            return Err(error);
        }
        let Some(mut course) = ctx.result().as_object().cloned() else {
            // Absence is not an error when reached through a parent object.
            return Ok(Value::Null);
        };
        if Self::repair(&mut course) {
            debug!(
                course = string_field(&course, "id").unwrap_or_default(),
                "course record repaired on read"
            );
        }
        Ok(Value::Object(course))
    }
}

/// Course listing.
///
/// The store cannot express "owner OR public" natively, so everyone scans
/// and non-privileged callers get an in-memory post-filter. O(collection).
#[derive(Debug, Default)]
pub struct ListCourses {
    policy: PolicyEvaluator,
}

impl ListCourses {
    /// Creates the stage with the given evaluator.
    #[must_use]
    pub fn new(policy: PolicyEvaluator) -> Self {
        Self { policy }
    }
}

impl Resolver for ListCourses {
    fn name(&self) -> &'static str {
        "list_courses"
    }

    fn request(&self, _ctx: &mut PipelineContext) -> LykeionResult<StoreOperation> {
        Ok(StoreOperation::Scan { filter: None })
    }

    fn response(&self, ctx: &mut PipelineContext) -> LykeionResult<Value> {
        if let Some(error) = ctx.take_error() {
            return Err(error);
        }
        let items = ctx.result()["items"].as_array().cloned().unwrap_or_default();

        if self.policy.is_privileged(ctx.identity()) {
            return Ok(Value::Array(items));
        }

        let visible = items
            .into_iter()
            .filter(|item| {
                item.as_object()
                    .is_some_and(|record| self.policy.visible_in_listing(ctx.identity(), record))
            })
            .collect();
        Ok(Value::Array(visible))
    }
}
