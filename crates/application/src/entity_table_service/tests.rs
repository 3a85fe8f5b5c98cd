use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use cmms_core::{AppError, AppResult};
use cmms_domain::{EntityCatalog, EntityRecord, Role};
use serde_json::json;
use tokio::sync::Notify;

use crate::role_session::RoleSession;
use crate::test_support::{FakeCollectionApi, FixedPrompt, MemoryRoleStore, record};
use crate::{EntityCollectionApi, MutationReceipt};

use super::{EntityTableController, TableAffordances, TableOutcome};

fn seed_persons() -> Vec<EntityRecord> {
    vec![
        record(json!({ "personal_id": "P001", "name": "Ada Lovelace", "age": 36, "gender": "Female" })),
        record(json!({ "personal_id": "P002", "name": "Alan Turing", "age": 41, "gender": "Male" })),
    ]
}

fn seed_locations() -> Vec<EntityRecord> {
    vec![
        record(json!({ "location_id": 7, "building": "A", "room": "101", "floor": "1" })),
        record(json!({ "location_id": 8, "building": "A", "room": "102", "floor": "1" })),
        record(json!({ "location_id": 9, "building": "B", "room": "201", "floor": "2" })),
    ]
}

async fn controller(
    collection: &str,
    api: Arc<dyn EntityCollectionApi>,
    prompt: Arc<FixedPrompt>,
    role: Option<Role>,
) -> EntityTableController {
    let binding = EntityCatalog::campus()
        .and_then(|catalog| catalog.require(collection).cloned())
        .unwrap_or_else(|_| unreachable!());
    let session = RoleSession::new(Arc::new(MemoryRoleStore::default()));
    if let Some(role) = role {
        assert!(session.login(role).await.is_ok());
    }

    EntityTableController::new(Arc::new(binding), api, prompt, session)
}

fn persons_api() -> Arc<FakeCollectionApi> {
    Arc::new(FakeCollectionApi::default().with_collection("persons", seed_persons()))
}

#[tokio::test]
async fn persons_table_shows_seed_records() {
    let table = controller(
        "persons",
        persons_api(),
        Arc::new(FixedPrompt::new(true)),
        Some(Role::Staff),
    )
    .await;

    assert_eq!(table.mount().await, TableOutcome::Applied);

    let view = table.view().await;
    assert_eq!(view.title, "Person Management");
    assert_eq!(view.subtitle, "Manage person management records");
    assert_eq!(view.headers, vec!["ID", "Name", "Age", "Gender", "Supervisor"]);
    let names: Vec<&str> = view.rows.iter().map(|row| row.cells[1].as_str()).collect();
    assert_eq!(names, vec!["Ada Lovelace", "Alan Turing"]);
    assert_eq!(view.rows[0].id.as_deref(), Some("P001"));
    assert_eq!(view.error, None);
}

#[tokio::test]
async fn create_with_missing_required_field_dispatches_nothing() {
    let api = persons_api();
    let table = controller(
        "persons",
        api.clone(),
        Arc::new(FixedPrompt::new(true)),
        Some(Role::Admin),
    )
    .await;
    table.mount().await;
    assert_eq!(table.begin_create().await, TableOutcome::Applied);
    assert!(table.set_draft_value("name", "Grace Hopper").await.is_ok());

    let outcome = table.create().await;

    assert_eq!(
        outcome,
        TableOutcome::Incomplete {
            missing: vec!["Personal ID".to_owned()]
        }
    );
    assert_eq!(api.count("POST persons").await, 0);
    assert_eq!(table.draft().await.value_text("name"), "Grace Hopper");
}

#[tokio::test]
async fn declined_delete_sends_nothing() {
    let api = persons_api();
    let prompt = Arc::new(FixedPrompt::new(false));
    let table = controller("persons", api.clone(), prompt.clone(), Some(Role::Admin)).await;
    table.mount().await;

    let outcome = table.remove("P001").await;

    assert_eq!(outcome, TableOutcome::Declined);
    assert!(prompt.was_asked());
    assert_eq!(api.count("DELETE persons/P001").await, 0);
}

#[tokio::test]
async fn confirmed_delete_refetches() {
    let api = persons_api();
    let table = controller(
        "persons",
        api.clone(),
        Arc::new(FixedPrompt::new(true)),
        Some(Role::Admin),
    )
    .await;
    table.mount().await;
    let fetches = api.count("GET persons").await;

    assert_eq!(table.remove("P002").await, TableOutcome::Applied);

    assert_eq!(api.count("DELETE persons/P002").await, 1);
    assert_eq!(api.count("GET persons").await, fetches + 1);
    assert_eq!(table.notice().await.as_deref(), Some("deleted"));
}

#[tokio::test]
async fn failed_fetch_keeps_previous_rows() {
    let api = persons_api();
    let table = controller(
        "persons",
        api.clone(),
        Arc::new(FixedPrompt::new(true)),
        Some(Role::Executive),
    )
    .await;
    assert_eq!(table.mount().await, TableOutcome::Applied);
    api.fail("GET persons", AppError::Transport("Connection failed".to_owned()))
        .await;

    let outcome = table.list().await;

    assert_eq!(
        outcome,
        TableOutcome::Failed("Failed to fetch data: Connection failed".to_owned())
    );
    let view = table.view().await;
    assert_eq!(view.rows.len(), 2);
    assert_eq!(
        view.error.as_deref(),
        Some("Failed to fetch data: Connection failed")
    );

    api.recover("GET persons").await;
    assert_eq!(table.list().await, TableOutcome::Applied);
    assert_eq!(table.error().await, None);
}

#[tokio::test]
async fn staff_sees_no_mutation_affordances() {
    let api = persons_api();
    let table = controller(
        "persons",
        api.clone(),
        Arc::new(FixedPrompt::new(true)),
        Some(Role::Staff),
    )
    .await;
    table.mount().await;

    let view = table.view().await;
    assert!(!view.affordances.create);
    assert!(!view.affordances.import);
    assert!(!view.affordances.actions);
    assert!(view.affordances.export);
    assert_eq!(table.begin_create().await, TableOutcome::Denied);
    assert_eq!(table.create().await, TableOutcome::Denied);
    assert_eq!(table.remove("P001").await, TableOutcome::Denied);
    assert!(table.start_edit("P001").await.is_err());
    assert_eq!(api.count("POST persons").await, 0);
    assert_eq!(api.count("DELETE persons/P001").await, 0);
}

#[tokio::test]
async fn admin_sees_every_affordance() {
    let table = controller(
        "persons",
        persons_api(),
        Arc::new(FixedPrompt::new(true)),
        Some(Role::Admin),
    )
    .await;
    table.mount().await;

    let affordances = table.affordances().await;

    assert!(affordances.create);
    assert!(affordances.import);
    assert!(affordances.edit);
    assert!(affordances.delete);
    assert!(affordances.actions);
}

#[tokio::test]
async fn logged_out_table_fetches_nothing() {
    let api = persons_api();
    let table = controller("persons", api.clone(), Arc::new(FixedPrompt::new(true)), None).await;

    assert_eq!(table.list().await, TableOutcome::Denied);
    assert_eq!(api.count("GET persons").await, 0);
    assert_eq!(table.affordances().await, TableAffordances::default());
}

#[tokio::test]
async fn successful_create_refetches_and_closes_form() {
    let api = persons_api();
    let table = controller(
        "persons",
        api.clone(),
        Arc::new(FixedPrompt::new(true)),
        Some(Role::Admin),
    )
    .await;
    table.mount().await;
    let fetches = api.count("GET persons").await;
    table.begin_create().await;
    assert!(table.view().await.create_form.is_some());
    assert!(table.set_draft_value("personal_id", "P003").await.is_ok());
    assert!(table.set_draft_value("name", "Grace Hopper").await.is_ok());
    assert!(table.set_draft_value("gender", "Female").await.is_ok());

    assert_eq!(table.create().await, TableOutcome::Applied);

    assert_eq!(api.count("POST persons").await, 1);
    assert_eq!(api.count("GET persons").await, fetches + 1);
    let view = table.view().await;
    assert_eq!(view.rows.len(), 3);
    assert!(view.create_form.is_none());
    assert!(table.draft().await.is_empty());
}

#[tokio::test]
async fn failed_create_keeps_draft_and_reports_server_text() {
    let api = persons_api();
    api.fail(
        "POST persons",
        AppError::Conflict("Person with this ID already exists".to_owned()),
    )
    .await;
    let table = controller(
        "persons",
        api.clone(),
        Arc::new(FixedPrompt::new(true)),
        Some(Role::Admin),
    )
    .await;
    table.mount().await;
    table.begin_create().await;
    assert!(table.set_draft_value("personal_id", "P001").await.is_ok());
    assert!(table.set_draft_value("name", "Ada").await.is_ok());

    let outcome = table.create().await;

    assert_eq!(
        outcome,
        TableOutcome::Failed(
            "Failed to create item: Person with this ID already exists".to_owned()
        )
    );
    assert_eq!(table.draft().await.value_text("personal_id"), "P001");
    assert!(table.view().await.create_form.is_some());
}

#[tokio::test]
async fn failed_update_stays_in_edit_mode() {
    let api = persons_api();
    api.fail(
        "PUT persons/P001",
        AppError::Validation("No fields to update".to_owned()),
    )
    .await;
    let table = controller(
        "persons",
        api.clone(),
        Arc::new(FixedPrompt::new(true)),
        Some(Role::Admin),
    )
    .await;
    table.mount().await;
    assert!(table.start_edit("P001").await.is_ok());
    assert!(table.set_edit_value("name", "Ada King").await.is_ok());

    let outcome = table.save_edit().await;

    assert_eq!(
        outcome,
        TableOutcome::Failed("Failed to update item: No fields to update".to_owned())
    );
    assert_eq!(table.editing_id().await.as_deref(), Some("P001"));
    let view = table.view().await;
    assert!(view.rows[0].editing);
    assert_eq!(view.rows[0].cells[1], "Ada King");

    api.recover("PUT persons/P001").await;
    assert_eq!(table.save_edit().await, TableOutcome::Applied);
    assert_eq!(table.editing_id().await, None);
    let sent = api.payloads.lock().await.last().cloned();
    assert_eq!(
        sent.and_then(|patch| patch.text("name")).as_deref(),
        Some("Ada King")
    );
}

#[tokio::test]
async fn save_without_edit_session_is_idle() {
    let table = controller(
        "persons",
        persons_api(),
        Arc::new(FixedPrompt::new(true)),
        Some(Role::Admin),
    )
    .await;

    assert_eq!(table.save_edit().await, TableOutcome::Idle);
    assert!(table.set_edit_value("name", "x").await.is_err());
}

#[tokio::test]
async fn import_csv_submits_batch_and_reports_count() {
    let api = persons_api();
    let table = controller(
        "persons",
        api.clone(),
        Arc::new(FixedPrompt::new(true)),
        Some(Role::Admin),
    )
    .await;
    table.mount().await;

    let outcome = table
        .import_csv("personal_id,name\nP010,Edsger Dijkstra\n\nP011,Barbara Liskov\n")
        .await;

    assert_eq!(outcome, TableOutcome::Applied);
    assert_eq!(api.count("IMPORT persons").await, 1);
    assert_eq!(api.payloads.lock().await.len(), 2);
    assert_eq!(
        table.notice().await.as_deref(),
        Some("Successfully imported 2 items.")
    );
}

#[tokio::test]
async fn failed_import_reports_server_text() {
    let api = persons_api();
    api.fail(
        "IMPORT persons",
        AppError::Validation("Unsupported entity: persons".to_owned()),
    )
    .await;
    let table = controller(
        "persons",
        api.clone(),
        Arc::new(FixedPrompt::new(true)),
        Some(Role::Admin),
    )
    .await;

    let outcome = table.import_batch(seed_persons()).await;

    assert_eq!(
        outcome,
        TableOutcome::Failed("Failed to import: Unsupported entity: persons".to_owned())
    );
}

#[tokio::test]
async fn export_uses_columns_and_rejects_empty_tables() {
    let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap_or_default();
    let empty = controller(
        "persons",
        Arc::new(FakeCollectionApi::default()),
        Arc::new(FixedPrompt::new(true)),
        Some(Role::Staff),
    )
    .await;
    empty.mount().await;

    assert_eq!(empty.export_all(date).await, None);
    assert_eq!(empty.error().await.as_deref(), Some("No data to export"));

    let table = controller(
        "persons",
        persons_api(),
        Arc::new(FixedPrompt::new(true)),
        Some(Role::Staff),
    )
    .await;
    table.mount().await;

    let export = table.export_all(date).await.unwrap_or_else(|| unreachable!());
    assert_eq!(export.file_name, "persons_export_2024-05-01.csv");
    assert_eq!(
        export.content,
        "ID,Name,Age,Gender,Supervisor\nP001,Ada Lovelace,36,Female,\nP002,Alan Turing,41,Male,"
    );
}

#[tokio::test]
async fn unmounted_table_discards_late_responses() {
    let api = persons_api();
    let table = controller(
        "persons",
        api.clone(),
        Arc::new(FixedPrompt::new(true)),
        Some(Role::Admin),
    )
    .await;
    table.mount().await;
    table.unmount();
    api.fail("GET persons", AppError::Transport("Connection failed".to_owned()))
        .await;

    assert_eq!(table.list().await, TableOutcome::Detached);
    assert_eq!(table.error().await, None);
    assert_eq!(table.records().await.len(), 2);
}

#[tokio::test]
async fn maintenance_form_cascades_building_to_room() {
    let api = Arc::new(
        FakeCollectionApi::default()
            .with_collection("locations", seed_locations())
            .with_collection(
                "maintenance",
                vec![record(json!({
                    "maintenance_id": 1,
                    "type": "Cleaning",
                    "active_chemical": 1,
                }))],
            ),
    );
    let table = controller(
        "maintenance",
        api.clone(),
        Arc::new(FixedPrompt::new(true)),
        Some(Role::Admin),
    )
    .await;
    table.mount().await;
    table.begin_create().await;

    assert!(table.set_draft_value("building", "A").await.is_ok());
    assert!(table.set_draft_value("room", "101").await.is_ok());
    assert_eq!(table.draft().await.values().get("location_id"), Some(&json!(7)));

    assert!(table.set_draft_value("building", "B").await.is_ok());
    let draft = table.draft().await;
    assert_eq!(draft.value_text("room"), "");
    assert!(draft.values().get("location_id").is_none());

    let view = table.view().await;
    assert_eq!(view.rows[0].cells[4], "Yes");
}

#[tokio::test]
async fn relationship_tables_are_create_only() {
    let api = Arc::new(FakeCollectionApi::default().with_collection(
        "affiliations",
        vec![record(json!({
            "personal_id": "P001",
            "person_name": "Ada Lovelace",
            "school_name": "Engineering",
        }))],
    ));
    let table = controller(
        "affiliations",
        api.clone(),
        Arc::new(FixedPrompt::new(true)),
        Some(Role::Admin),
    )
    .await;
    table.mount().await;

    let affordances = table.affordances().await;
    assert!(affordances.create);
    assert!(!affordances.edit);
    assert!(!affordances.delete);
    assert!(!affordances.actions);
    assert!(table.start_edit("P001").await.is_err());
    assert_eq!(table.remove("P001").await, TableOutcome::Denied);
    assert_eq!(
        table.update("P001", &EntityRecord::new()).await,
        TableOutcome::Denied
    );
}

#[tokio::test]
async fn failed_link_reports_link_prefix() {
    let api = Arc::new(FakeCollectionApi::default());
    api.fail(
        "POST participations",
        AppError::Conflict("Participation already exists".to_owned()),
    )
    .await;
    let table = controller(
        "participations",
        api.clone(),
        Arc::new(FixedPrompt::new(true)),
        Some(Role::Admin),
    )
    .await;
    table.mount().await;
    table.begin_create().await;
    assert!(table.set_draft_value("personal_id", "P001").await.is_ok());
    assert!(table.set_draft_value("activity_id", "3").await.is_ok());

    assert_eq!(
        table.create().await,
        TableOutcome::Failed("Failed to create link: Participation already exists".to_owned())
    );
}

#[tokio::test]
async fn edit_row_only_accepts_listed_reference_values() {
    let api = persons_api();
    let table = controller(
        "persons",
        api.clone(),
        Arc::new(FixedPrompt::new(true)),
        Some(Role::Admin),
    )
    .await;
    table.mount().await;
    assert!(table.start_edit("P001").await.is_ok());

    let result = table.set_edit_value("supervisor_id", "P999").await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    assert!(table.set_edit_value("supervisor_id", "Alan Turing (P002)").await.is_ok());
    assert!(table.set_edit_value("name", "Ada King").await.is_ok());
    assert_eq!(table.save_edit().await, TableOutcome::Applied);

    let patch = api.payloads.lock().await.last().cloned().unwrap_or_default();
    assert_eq!(patch.get("supervisor_id"), Some(&json!("P002")));
    assert_eq!(patch.get("name"), Some(&json!("Ada King")));
}

#[tokio::test]
async fn edit_row_filters_rooms_by_buffered_building() {
    let api = Arc::new(
        FakeCollectionApi::default()
            .with_collection("locations", seed_locations())
            .with_collection(
                "maintenance",
                vec![record(json!({
                    "maintenance_id": 1,
                    "type": "Cleaning",
                    "building": "A",
                    "room": "101",
                }))],
            ),
    );
    let table = controller(
        "maintenance",
        api.clone(),
        Arc::new(FixedPrompt::new(true)),
        Some(Role::Admin),
    )
    .await;
    table.mount().await;
    assert!(table.start_edit("1").await.is_ok());

    let result = table.set_edit_value("room", "201").await;
    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(table.set_edit_value("room", "102").await.is_ok());
    assert!(table.set_edit_value("building", "Z").await.is_err());
}

/// Collection API whose next persons fetch answers with the rows it saw
/// before blocking until released.
struct StallingApi {
    inner: FakeCollectionApi,
    stall_next: AtomicBool,
    release: Notify,
}

#[async_trait]
impl EntityCollectionApi for StallingApi {
    async fn list(&self, collection: &str) -> AppResult<Vec<EntityRecord>> {
        let records = self.inner.list(collection).await?;
        if collection == "persons" && self.stall_next.swap(false, Ordering::SeqCst) {
            self.release.notified().await;
        }
        Ok(records)
    }

    async fn create(&self, collection: &str, record: &EntityRecord) -> AppResult<MutationReceipt> {
        self.inner.create(collection, record).await
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: &EntityRecord,
    ) -> AppResult<MutationReceipt> {
        self.inner.update(collection, id, patch).await
    }

    async fn delete(&self, collection: &str, id: &str) -> AppResult<MutationReceipt> {
        self.inner.delete(collection, id).await
    }

    async fn import(
        &self,
        collection: &str,
        items: &[EntityRecord],
    ) -> AppResult<MutationReceipt> {
        self.inner.import(collection, items).await
    }
}

#[tokio::test]
async fn response_from_previous_mount_is_discarded_after_remount() {
    let api = Arc::new(StallingApi {
        inner: FakeCollectionApi::default().with_collection("persons", seed_persons()),
        stall_next: AtomicBool::new(false),
        release: Notify::new(),
    });
    let table = controller(
        "persons",
        api.clone(),
        Arc::new(FixedPrompt::new(true)),
        Some(Role::Admin),
    )
    .await;
    table.mount().await;
    api.stall_next.store(true, Ordering::SeqCst);

    let (stale, remounted) = tokio::join!(table.list(), async {
        table.unmount();
        api.inner.collections.lock().await.insert(
            "persons".to_owned(),
            vec![record(json!({ "personal_id": "P003", "name": "Grace Hopper" }))],
        );
        let outcome = table.mount().await;
        api.release.notify_one();
        outcome
    });

    assert_eq!(stale, TableOutcome::Detached);
    assert_eq!(remounted, TableOutcome::Applied);
    let records = table.records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].text("personal_id").as_deref(), Some("P003"));
}
