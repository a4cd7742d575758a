use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use crate::{
    collection::{ItemAddress, SourceCollection},
    form::FieldIssue,
    session::{
        CancelOutcome, CreationMethod, CreationMode, OpenOutcome, SaveOutcome, SessionOptions,
        SessionState,
    },
    tests::support::{FlakyCollection, GatedValidator, RequireName, controller, people},
};

fn inserted() -> SessionOptions {
    SessionOptions::default().with_creation_mode(CreationMode::Inserted)
}

fn draft_only() -> SessionOptions {
    SessionOptions::default().with_creation_mode(CreationMode::DraftOnly)
}

#[tokio::test]
async fn cancel_new_inserted_removes_placeholder() {
    let entries = people()[..2].to_vec();
    let ctrl = controller(entries.clone(), RequireName, inserted());

    let outcome = ctrl.open_new().await;
    assert_eq!(
        outcome,
        OpenOutcome::Opened {
            state: SessionState::OpenNewInserted,
            address: ItemAddress::Slot(2),
        }
    );
    assert_eq!(ctrl.collection().len(), 3);
    assert_eq!(ctrl.collection().get(2), Some(Value::Null));

    assert_eq!(
        ctrl.cancel().await,
        CancelOutcome::Cancelled { removed: Some(2) }
    );
    assert_eq!(ctrl.collection().values(), entries);
    assert_eq!(ctrl.state(), SessionState::Closed);
}

#[tokio::test]
async fn inserted_prepend_places_placeholder_first() {
    let options = inserted()
        .with_creation_method(CreationMethod::Prepend)
        .with_initial_value(json!({"name": ""}));
    let ctrl = controller(people(), RequireName, options);

    ctrl.open_new().await;
    assert!(ctrl.active_items().is_new_item(ItemAddress::Slot(0)));
    assert_eq!(ctrl.collection().get(0), Some(json!({"name": ""})));

    ctrl.edit_pointer("/name", json!("Barbara")).await;
    assert_eq!(ctrl.save().await, SaveOutcome::Saved { index: Some(0) });
    assert_eq!(ctrl.collection().len(), 4);
    assert_eq!(ctrl.collection().get(0), Some(json!({"name": "Barbara"})));
    assert_eq!(ctrl.collection().get(1), Some(json!({"name": "Ada"})));
}

#[tokio::test]
async fn draft_only_leaves_collection_alone_until_save() {
    let ctrl = controller(people(), RequireName, draft_only());

    ctrl.open_new().await;
    assert_eq!(ctrl.state(), SessionState::OpenNewDraftOnly);
    assert_eq!(ctrl.active_items().active_index(), Some(ItemAddress::Pending));
    ctrl.edit_pointer("/name", json!("Edsger")).await;
    assert_eq!(ctrl.collection().len(), 3);

    assert_eq!(ctrl.cancel().await, CancelOutcome::Cancelled { removed: None });
    assert_eq!(ctrl.collection().values(), people());

    ctrl.open_new().await;
    ctrl.edit_pointer("/name", json!("Edsger")).await;
    assert_eq!(ctrl.save().await, SaveOutcome::Saved { index: Some(3) });
    assert_eq!(ctrl.collection().len(), 4);
    assert_eq!(ctrl.collection().get(3), Some(json!({"name": "Edsger"})));
}

#[tokio::test]
async fn draft_only_seeds_from_schema_default() {
    let schema = crate::domain::ItemSchema::from_items(json!({
        "type": "object",
        "default": {"name": "", "active": true}
    }));
    let ctrl = controller(Vec::new(), RequireName, draft_only()).with_schema(schema);

    ctrl.open_new().await;
    assert_eq!(ctrl.draft_value(), Some(json!({"name": "", "active": true})));
    assert!(!ctrl.is_dirty());
}

#[tokio::test]
async fn draft_only_prepend_inserts_at_front_on_save() {
    let options = draft_only().with_creation_method(CreationMethod::Prepend);
    let ctrl = controller(people(), RequireName, options);

    ctrl.open_new().await;
    ctrl.replace_draft(json!({"name": "Barbara"})).await;
    assert_eq!(ctrl.save().await, SaveOutcome::Saved { index: Some(0) });
    assert_eq!(ctrl.collection().get(0), Some(json!({"name": "Barbara"})));
    assert_eq!(ctrl.collection().len(), 4);
}

#[tokio::test]
async fn save_existing_only_touches_its_slot() {
    let ctrl = controller(people(), RequireName, SessionOptions::default());

    ctrl.open_existing(1);
    ctrl.edit_pointer("/name", json!("Hopper")).await;
    assert_eq!(ctrl.collection().get(1), Some(json!({"name": "Grace"})));
    assert_eq!(ctrl.save().await, SaveOutcome::Saved { index: Some(1) });

    assert_eq!(
        ctrl.collection().values(),
        vec![
            json!({"name": "Ada"}),
            json!({"name": "Hopper"}),
            json!({"name": "Linus"}),
        ]
    );
    assert_eq!(ctrl.state(), SessionState::Closed);
}

#[tokio::test]
async fn validation_gate_blocks_then_commits_once() {
    let ctrl = controller(people(), RequireName, SessionOptions::default());

    ctrl.open_existing(0);
    ctrl.edit_pointer("/name", json!("")).await;
    let outcome = ctrl.save().await;
    assert_eq!(
        outcome,
        SaveOutcome::Invalid {
            issues: vec![FieldIssue::new("/name", "name is required")]
        }
    );
    assert_eq!(ctrl.active_items().active_index(), Some(ItemAddress::Slot(0)));
    assert_eq!(ctrl.collection().values(), people());
    let draft = ctrl.draft_snapshot().expect("draft stays open");
    assert_eq!(draft.field_errors("/name"), ["name is required".to_string()]);

    ctrl.edit_pointer("/name", json!("Augusta")).await;
    assert_eq!(ctrl.draft_snapshot().expect("draft").error_count(), 0);
    assert_eq!(ctrl.save().await, SaveOutcome::Saved { index: Some(0) });
    assert_eq!(ctrl.active_items().active_index(), None);
    assert_eq!(ctrl.collection().get(0), Some(json!({"name": "Augusta"})));
    assert_eq!(ctrl.save().await, SaveOutcome::NoSession);
    assert_eq!(ctrl.collection().len(), 3);
}

#[tokio::test]
async fn validation_resolving_after_cancel_is_ignored() {
    let gate = GatedValidator::new();
    let ctrl = controller(Vec::new(), gate.clone(), draft_only());

    ctrl.open_new().await;
    ctrl.replace_draft(json!({"name": "late"})).await;

    let (saved, cancelled) = tokio::join!(ctrl.save(), async {
        tokio::task::yield_now().await;
        let cancelled = ctrl.cancel().await;
        gate.release();
        cancelled
    });

    assert_eq!(cancelled, CancelOutcome::Cancelled { removed: None });
    assert_eq!(saved, SaveOutcome::Superseded);
    assert!(ctrl.collection().is_empty());
    assert_eq!(ctrl.state(), SessionState::Closed);
}

#[tokio::test]
async fn stale_rejection_does_not_touch_the_next_session() {
    let gate = GatedValidator::new();
    gate.reject(vec![FieldIssue::new("/name", "stale")]);
    let ctrl = controller(people(), gate.clone(), SessionOptions::default());

    ctrl.open_existing(0);
    let (saved, ()) = tokio::join!(ctrl.save(), async {
        tokio::task::yield_now().await;
        ctrl.cancel().await;
        ctrl.open_existing(2);
        gate.release();
    });

    assert_eq!(saved, SaveOutcome::Superseded);
    assert_eq!(ctrl.active_items().active_index(), Some(ItemAddress::Slot(2)));
    assert_eq!(ctrl.draft_snapshot().expect("draft").error_count(), 0);
}

#[tokio::test]
async fn overlapping_saves_commit_exactly_once() {
    let gate = GatedValidator::new();
    let ctrl = controller(Vec::new(), gate.clone(), draft_only());

    ctrl.open_new().await;
    ctrl.replace_draft(json!({"name": "once"})).await;

    let (first, second, ()) = tokio::join!(ctrl.save(), ctrl.save(), async {
        tokio::task::yield_now().await;
        gate.release();
    });

    assert_eq!(gate.calls(), 2);
    let mut outcomes = [first, second];
    outcomes.sort_by_key(|outcome| matches!(outcome, SaveOutcome::Superseded));
    assert_eq!(
        outcomes,
        [SaveOutcome::Saved { index: Some(0) }, SaveOutcome::Superseded]
    );
    assert_eq!(ctrl.collection().values(), vec![json!({"name": "once"})]);
}

#[tokio::test]
async fn misuse_is_a_no_op() {
    let ctrl = controller(people(), RequireName, SessionOptions::default());
    assert_eq!(ctrl.open_existing(7), OpenOutcome::Ignored);
    assert_eq!(ctrl.save().await, SaveOutcome::NoSession);
    assert_eq!(ctrl.cancel().await, CancelOutcome::NoSession);
    assert!(ctrl.view().is_none());
    assert_eq!(ctrl.collection().values(), people());
}

#[tokio::test]
async fn cancel_existing_discards_edits() {
    let ctrl = controller(people(), RequireName, SessionOptions::default());
    ctrl.open_existing(2);
    ctrl.edit_pointer("/name", json!("Torvalds")).await;
    assert_eq!(ctrl.cancel().await, CancelOutcome::Cancelled { removed: None });
    assert_eq!(ctrl.collection().values(), people());
    assert!(ctrl.draft_value().is_none());
}

#[tokio::test]
async fn replaced_collection_regenerates_the_draft() {
    let ctrl = controller(people(), RequireName, SessionOptions::default());
    ctrl.open_existing(0);
    ctrl.edit_pointer("/name", json!("unsaved")).await;

    ctrl.collection()
        .replace_all(vec![json!({"name": "Fresh"}), json!({"name": "Other"})]);
    assert_eq!(ctrl.draft_value(), Some(json!({"name": "Fresh"})));
    assert!(!ctrl.is_dirty());
}

#[tokio::test]
async fn removal_failure_on_cancel_is_swallowed() {
    let collection = FlakyCollection::new(people());
    collection.fail_remove.set(true);
    let ctrl = crate::session::EditSessionController::new(
        collection,
        RequireName,
        std::rc::Rc::new(crate::session::ActiveItemManager::new()),
    )
    .with_options(inserted());

    ctrl.open_new().await;
    assert_eq!(ctrl.collection().len(), 4);
    assert_eq!(
        ctrl.cancel().await,
        CancelOutcome::Cancelled { removed: Some(3) }
    );
    assert_eq!(ctrl.state(), SessionState::Closed);
    assert_eq!(ctrl.collection().len(), 4, "failed removal leaves the placeholder");
}

#[tokio::test]
async fn rejected_placeholder_insert_does_not_open() {
    let collection = FlakyCollection::new(people());
    collection.fail_insert.set(true);
    let ctrl = crate::session::EditSessionController::new(
        collection,
        RequireName,
        std::rc::Rc::new(crate::session::ActiveItemManager::new()),
    )
    .with_options(inserted());

    assert_eq!(ctrl.open_new().await, OpenOutcome::Failed);
    assert_eq!(ctrl.state(), SessionState::Closed);
}

#[tokio::test]
async fn commit_failure_still_closes() {
    let collection = FlakyCollection::new(people());
    collection.fail_set.set(true);
    let ctrl = crate::session::EditSessionController::new(
        collection,
        RequireName,
        std::rc::Rc::new(crate::session::ActiveItemManager::new()),
    );

    ctrl.open_existing(0);
    ctrl.edit_pointer("/name", json!("Lovelace")).await;
    assert_eq!(ctrl.save().await, SaveOutcome::Saved { index: Some(0) });
    assert_eq!(ctrl.state(), SessionState::Closed);
    assert_eq!(ctrl.collection().get(0), Some(json!({"name": "Ada"})));
}

#[tokio::test]
async fn view_reports_labels_and_errors() {
    let ctrl = controller(people(), RequireName, SessionOptions::default());
    ctrl.open_existing(1);
    ctrl.edit_pointer("/name", json!("")).await;
    ctrl.save().await;

    let view = ctrl.view().expect("open session");
    assert_eq!(view.title, "Edit Item #2");
    assert_eq!(
        view.description,
        "Update the details below, then save to apply your changes."
    );
    assert!(view.is_dirty);
    assert!(!view.should_shake);
    assert_eq!(view.errors.get("/name").map(Vec::len), Some(1));
    assert_eq!(view.draft, Some(json!({"name": ""})));
}
