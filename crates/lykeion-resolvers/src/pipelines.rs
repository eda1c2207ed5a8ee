//! Composed pipelines.
//!
//! Each constructor wires domain stages to their data sources in the
//! order the operation requires. Stage order is load-bearing: permission
//! checks run before writes, and cleanup runs after the primary delete so
//! it can read the stash key the delete stage published.

use std::sync::Arc;

use lykeion_authz::PolicyEvaluator;
use lykeion_pipeline::{DataSource, Invoker, Pipeline};
use lykeion_store::StoreAdapter;

use crate::courses::{CheckCourseUpdatePermission, DeleteCourse, UpsertCourse};
use crate::knowledge_base::{CheckKnowledgeBasePermission, CleanupKnowledgeBase, CreateKnowledgeBase};

/// Course upsert: permission check against the stored record, then the
/// write.
#[must_use]
pub fn upsert_course(courses: Arc<dyn StoreAdapter>, policy: PolicyEvaluator) -> Pipeline {
    Pipeline::builder("upsertCourse")
        .stage(
            CheckCourseUpdatePermission::new(policy),
            DataSource::store(courses.clone()),
        )
        .stage(UpsertCourse, DataSource::store(courses))
        .build()
}

/// Cascading course deletion: permission check, primary delete, then
/// best-effort knowledge-base cleanup through the external unit.
#[must_use]
pub fn delete_course(
    courses: Arc<dyn StoreAdapter>,
    kb_cleanup: Arc<dyn Invoker>,
    policy: PolicyEvaluator,
) -> Pipeline {
    Pipeline::builder("deleteCourse")
        .stage(
            CheckCourseUpdatePermission::new(policy),
            DataSource::store(courses.clone()),
        )
        .stage(DeleteCourse, DataSource::store(courses))
        .stage(CleanupKnowledgeBase, DataSource::function(kb_cleanup))
        .build()
}

/// Knowledge-base creation: course-level permission check, then
/// delegation to the provisioning unit.
#[must_use]
pub fn create_knowledge_base(
    courses: Arc<dyn StoreAdapter>,
    provisioner: Arc<dyn Invoker>,
    policy: PolicyEvaluator,
) -> Pipeline {
    Pipeline::builder("createKnowledgeBase")
        .stage(
            CheckKnowledgeBasePermission::new(policy.clone()),
            DataSource::store(courses),
        )
        .stage(
            CreateKnowledgeBase::new(policy),
            DataSource::function(provisioner),
        )
        .build()
}
