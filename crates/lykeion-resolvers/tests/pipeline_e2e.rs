//! End-to-end pipeline behavior over the in-memory store.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lykeion_authz::PolicyEvaluator;
use lykeion_core::record::{CREATED_AT, CREATED_BY, UPDATED_AT};
use lykeion_core::{fixtures, ErrorKind, LykeionError, LykeionResult};
use lykeion_pipeline::{DataSource, InvokePayload, Invoker, Pipeline};
use lykeion_resolvers::assessments::{
    ListAssessments, ListPublishedAssessments, UpdateAssessment, UpsertAssessment, OWNER_FIELD,
    OWNER_INDEX,
};
use lykeion_resolvers::assets::{GetGlobalLogo, UpdateGlobalLogo};
use lykeion_resolvers::courses::ListCourses;
use lykeion_resolvers::pipelines;
use lykeion_resolvers::student_assessments::{
    ListStudentAssessmentsByParent, PARENT_FIELD, PARENT_INDEX,
};
use lykeion_store::{Key, MemoryStore, StoreAdapter};
use serde_json::{json, Value};

/// Records every payload it receives and returns a canned value.
struct RecordingInvoker {
    calls: Mutex<Vec<InvokePayload>>,
    reply: Value,
}

impl RecordingInvoker {
    fn replying(reply: Value) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            reply,
        })
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Invoker for RecordingInvoker {
    async fn invoke(&self, payload: InvokePayload) -> LykeionResult<Value> {
        self.calls.lock().unwrap().push(payload);
        Ok(self.reply.clone())
    }
}

struct FailingInvoker;

#[async_trait]
impl Invoker for FailingInvoker {
    async fn invoke(&self, _payload: InvokePayload) -> LykeionResult<Value> {
        Err(LykeionError::external(
            "vector store unreachable",
            Some("Lambda"),
        ))
    }
}

async fn seed_course(store: &MemoryStore, id: &str, owner: &str, public: bool) {
    store
        .put(&Key::simple(id), fixtures::course(id, owner, public))
        .await
        .unwrap();
}

#[tokio::test]
async fn course_upsert_creates_then_updates_without_clearing() {
    let store = MemoryStore::shared();
    let pipeline = pipelines::upsert_course(store.clone(), PolicyEvaluator::default());

    let created = pipeline
        .execute(
            fixtures::teacher("t1"),
            json!({ "input": { "name": "Physics", "description": "Waves" } }),
        )
        .await
        .unwrap();

    let id = created.result["id"].as_str().unwrap().to_string();
    let created_at = created.result[CREATED_AT].clone();
    assert_eq!(created.result[CREATED_BY], json!("t1"));

    // Millisecond-resolution timestamps need a beat between writes.
    std::thread::sleep(std::time::Duration::from_millis(3));

    // Update renames but omits the description; omitted fields survive.
    let updated = pipeline
        .execute(
            fixtures::teacher("t1"),
            json!({ "input": { "id": id, "name": "Physics II", "description": null } }),
        )
        .await
        .unwrap();

    assert_eq!(updated.result["id"], created.result["id"]);
    assert_eq!(updated.result["name"], json!("Physics II"));
    assert_eq!(updated.result["description"], json!("Waves"));
    assert_eq!(updated.result[CREATED_AT], created_at);
    assert_ne!(updated.result[UPDATED_AT], created.result[UPDATED_AT]);
}

#[tokio::test]
async fn course_update_denied_to_non_owner_teacher() {
    let store = MemoryStore::shared();
    seed_course(&store, "c-1", "t1", true).await;
    let pipeline = pipelines::upsert_course(store, PolicyEvaluator::default());

    let error = pipeline
        .execute(
            fixtures::teacher("t2"),
            json!({ "input": { "id": "c-1", "name": "Hijacked" } }),
        )
        .await
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Unauthorized);
}

#[tokio::test]
async fn course_update_allowed_to_admin_regardless_of_ownership() {
    let store = MemoryStore::shared();
    seed_course(&store, "c-1", "t1", false).await;
    let pipeline = pipelines::upsert_course(store, PolicyEvaluator::default());

    let outcome = pipeline
        .execute(
            fixtures::admin(),
            json!({ "input": { "id": "c-1", "name": "Renamed" } }),
        )
        .await
        .unwrap();
    assert_eq!(outcome.result["name"], json!("Renamed"));
    assert_eq!(outcome.result[CREATED_BY], json!("t1"));
}

#[tokio::test]
async fn cascading_delete_contains_cleanup_failure() {
    let store = MemoryStore::shared();
    seed_course(&store, "c-1", "t1", false).await;
    let pipeline = pipelines::delete_course(
        store.clone(),
        Arc::new(FailingInvoker),
        PolicyEvaluator::default(),
    );

    let outcome = pipeline
        .execute(fixtures::teacher("t1"), json!({ "id": "c-1" }))
        .await
        .unwrap();

    // Primary success survives the secondary failure.
    assert_eq!(outcome.result, json!(true));
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(outcome.diagnostics[0].stage, "cleanup_knowledge_base");
    assert_eq!(outcome.diagnostics[0].error_type, "Lambda");
    assert!(store.get(&Key::simple("c-1")).await.unwrap().is_none());
}

#[tokio::test]
async fn cascading_delete_invokes_cleanup_with_course_id() {
    let store = MemoryStore::shared();
    seed_course(&store, "c-1", "t1", false).await;
    let cleanup = RecordingInvoker::replying(json!({ "deleted": true }));
    let pipeline =
        pipelines::delete_course(store, cleanup.clone(), PolicyEvaluator::default());

    let outcome = pipeline
        .execute(fixtures::teacher("t1"), json!({ "id": "c-1" }))
        .await
        .unwrap();

    assert_eq!(outcome.result, json!(true));
    assert!(outcome.diagnostics.is_empty());
    let calls = cleanup.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].arguments["courseId"], json!("c-1"));
}

#[tokio::test]
async fn deleting_missing_course_is_not_found() {
    let pipeline = pipelines::delete_course(
        MemoryStore::shared(),
        RecordingInvoker::replying(Value::Null),
        PolicyEvaluator::default(),
    );

    let error = pipeline
        .execute(fixtures::admin(), json!({ "id": "ghost" }))
        .await
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn knowledge_base_creation_gated_on_course_visibility() {
    let store = MemoryStore::shared();
    seed_course(&store, "c-private", "t1", false).await;
    seed_course(&store, "c-public", "t1", true).await;
    let provisioner = RecordingInvoker::replying(json!({ "knowledgeBaseId": "kb-1" }));
    let pipeline = pipelines::create_knowledge_base(
        store,
        provisioner.clone(),
        PolicyEvaluator::default(),
    );

    let error = pipeline
        .execute(fixtures::teacher("t2"), json!({ "courseId": "c-private" }))
        .await
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Unauthorized);
    assert_eq!(provisioner.call_count(), 0);

    let outcome = pipeline
        .execute(fixtures::teacher("t2"), json!({ "courseId": "c-public" }))
        .await
        .unwrap();
    assert_eq!(outcome.result["knowledgeBaseId"], json!("kb-1"));
    assert_eq!(provisioner.call_count(), 1);
}

#[tokio::test]
async fn listing_filters_private_courses_for_plain_callers() {
    let store = MemoryStore::shared();
    seed_course(&store, "c-mine", "t1", false).await;
    seed_course(&store, "c-theirs", "t2", false).await;
    seed_course(&store, "c-open", "t2", true).await;

    let pipeline = Pipeline::unit(
        "listCourses",
        ListCourses::new(PolicyEvaluator::default()),
        DataSource::store(store.clone()),
    );

    let outcome = pipeline
        .execute(fixtures::teacher("t1"), json!({}))
        .await
        .unwrap();
    let mut ids: Vec<&str> = outcome
        .result
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["c-mine", "c-open"]);

    let all = pipeline.execute(fixtures::admin(), json!({})).await.unwrap();
    assert_eq!(all.result.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn listing_empty_collection_degrades_to_empty_for_both_tiers() {
    let pipeline = Pipeline::unit(
        "listCourses",
        ListCourses::new(PolicyEvaluator::default()),
        DataSource::store(MemoryStore::shared()),
    );

    for identity in [fixtures::admin(), fixtures::student("s1")] {
        let outcome = pipeline.execute(identity, json!({})).await.unwrap();
        assert_eq!(outcome.result, json!([]));
    }
}

#[tokio::test]
async fn assessment_upsert_then_partial_update() {
    let store: Arc<MemoryStore> =
        Arc::new(MemoryStore::new().with_index(OWNER_INDEX, OWNER_FIELD));
    let upsert = Pipeline::unit(
        "upsertAssessment",
        UpsertAssessment,
        DataSource::store(store.clone()),
    );
    let update = Pipeline::unit(
        "updateAssessment",
        UpdateAssessment,
        DataSource::store(store.clone()),
    );

    let created = upsert
        .execute(
            fixtures::teacher("t1"),
            json!({ "input": { "name": "Quiz", "course": "c-1", "published": true } }),
        )
        .await
        .unwrap();
    let id = created.result["id"].as_str().unwrap().to_string();

    let patched = update
        .execute(
            fixtures::teacher("t1"),
            json!({ "input": { "id": id, "name": "Quiz v2" } }),
        )
        .await
        .unwrap();

    assert_eq!(patched.result["name"], json!("Quiz v2"));
    assert_eq!(patched.result["course"], json!("c-1"));
    assert_eq!(patched.result["published"], json!(true));
    assert_eq!(patched.result[CREATED_AT], created.result[CREATED_AT]);
}

#[tokio::test]
async fn assessment_upsert_creates_then_reupserts_without_clearing() {
    let store: Arc<MemoryStore> =
        Arc::new(MemoryStore::new().with_index(OWNER_INDEX, OWNER_FIELD));
    let pipeline = Pipeline::unit(
        "upsertAssessment",
        UpsertAssessment,
        DataSource::store(store.clone()),
    );

    let created = pipeline
        .execute(
            fixtures::teacher("t1"),
            json!({ "input": { "name": "Quiz", "course": "c-1", "published": true } }),
        )
        .await
        .unwrap();
    let id = created.result["id"].as_str().unwrap().to_string();

    // Millisecond-resolution timestamps need a beat between writes.
    std::thread::sleep(std::time::Duration::from_millis(3));

    // Re-upsert by id, renaming but omitting course and published.
    let updated = pipeline
        .execute(
            fixtures::teacher("t1"),
            json!({ "input": { "id": id, "name": "Quiz v2" } }),
        )
        .await
        .unwrap();

    assert_eq!(updated.result["id"], created.result["id"]);
    assert_eq!(updated.result["name"], json!("Quiz v2"));
    assert_eq!(updated.result["course"], json!("c-1"));
    assert_eq!(updated.result["published"], json!(true));
    assert_eq!(updated.result[CREATED_AT], created.result[CREATED_AT]);
    assert_ne!(updated.result[UPDATED_AT], created.result[UPDATED_AT]);
}

#[tokio::test]
async fn assessment_update_of_missing_record_is_not_found() {
    let update = Pipeline::unit(
        "updateAssessment",
        UpdateAssessment,
        DataSource::store(MemoryStore::shared()),
    );

    let error = update
        .execute(
            fixtures::teacher("t1"),
            json!({ "input": { "id": "ghost", "name": "x" } }),
        )
        .await
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn own_assessment_listing_uses_owner_scope() {
    let store: Arc<MemoryStore> =
        Arc::new(MemoryStore::new().with_index(OWNER_INDEX, OWNER_FIELD));
    let upsert = Pipeline::unit(
        "upsertAssessment",
        UpsertAssessment,
        DataSource::store(store.clone()),
    );

    for (identity, name) in [
        (fixtures::teacher("t1"), "Mine 1"),
        (fixtures::teacher("t1"), "Mine 2"),
        (fixtures::teacher("t2"), "Theirs"),
    ] {
        upsert
            .execute(identity, json!({ "input": { "name": name } }))
            .await
            .unwrap();
    }

    let list = Pipeline::unit(
        "listAssessments",
        ListAssessments,
        DataSource::store(store),
    );
    let outcome = list
        .execute(fixtures::teacher("t1"), json!({}))
        .await
        .unwrap();

    let names: Vec<&str> = outcome
        .result
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"Mine 1") && names.contains(&"Mine 2"));
}

#[tokio::test]
async fn published_listing_applies_store_filter() {
    let store: Arc<MemoryStore> =
        Arc::new(MemoryStore::new().with_index(OWNER_INDEX, OWNER_FIELD));
    let upsert = Pipeline::unit(
        "upsertAssessment",
        UpsertAssessment,
        DataSource::store(store.clone()),
    );

    upsert
        .execute(
            fixtures::teacher("t1"),
            json!({ "input": { "name": "Live", "published": true } }),
        )
        .await
        .unwrap();
    upsert
        .execute(
            fixtures::teacher("t1"),
            json!({ "input": { "name": "Draft" } }),
        )
        .await
        .unwrap();

    let list = Pipeline::unit(
        "listPublishedAssessments",
        ListPublishedAssessments,
        DataSource::store(store),
    );
    let outcome = list
        .execute(fixtures::student("s1"), json!({}))
        .await
        .unwrap();

    let items = outcome.result.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], json!("Live"));
}

async fn seed_student_result(store: &MemoryStore, subject: &str, parent_id: &str, score: u32) {
    let item = json!({
        "userId": subject,
        "parentAssessId": parent_id,
        "score": score,
    });
    store
        .put(
            &Key::composite(subject, parent_id),
            item.as_object().cloned().unwrap(),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn student_result_listing_branches_on_privilege() {
    let store: Arc<MemoryStore> =
        Arc::new(MemoryStore::new().with_index(PARENT_INDEX, PARENT_FIELD));
    seed_student_result(&store, "sub-s1", "a-1", 80).await;
    seed_student_result(&store, "sub-s2", "a-1", 95).await;
    seed_student_result(&store, "sub-s1", "a-other", 60).await;

    let pipeline = Pipeline::unit(
        "listStudentAssessments",
        ListStudentAssessmentsByParent::new(PolicyEvaluator::default()),
        DataSource::store(store),
    );

    let all = pipeline
        .execute(fixtures::teacher("t1"), json!({ "parentAssessId": "a-1" }))
        .await
        .unwrap();
    assert_eq!(all.result.as_array().unwrap().len(), 2);

    let own = pipeline
        .execute(fixtures::student("s1"), json!({ "parentAssessId": "a-1" }))
        .await
        .unwrap();
    let items = own.result.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["score"], json!(80));
}

#[tokio::test]
async fn logo_replacement_is_visible_on_read() {
    let store = MemoryStore::shared();
    let update = Pipeline::unit(
        "updateGlobalLogo",
        UpdateGlobalLogo,
        DataSource::store(store.clone()),
    );
    let get = Pipeline::unit("getGlobalLogo", GetGlobalLogo, DataSource::store(store));

    let missing = get.execute(fixtures::student("s1"), json!({})).await.unwrap();
    assert_eq!(missing.result, Value::Null);

    update
        .execute(
            fixtures::admin(),
            json!({ "input": {
                "logoUrl": "https://cdn/logo-v2.png",
                "uploadedBy": "admin@school.edu"
            } }),
        )
        .await
        .unwrap();

    let current = get.execute(fixtures::student("s1"), json!({})).await.unwrap();
    assert_eq!(current.result["logoUrl"], json!("https://cdn/logo-v2.png"));
    assert!(current.result["uploadedAt"].is_string());
}
