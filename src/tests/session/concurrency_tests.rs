//! Sessions driven while a collection mutation or validation is suspended.

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::task::yield_now;

use crate::{
    collection::SourceCollection,
    session::{
        CancelOutcome, CreationMode, EditOutcome, OpenOutcome, SaveOutcome, SessionOptions,
        SessionState,
    },
    tests::support::{
        GatedCollection, GatedValidator, RequireName, controller, controller_over, people,
    },
};

fn auto_draft_only() -> SessionOptions {
    SessionOptions::default()
        .with_auto_save(true)
        .with_creation_mode(CreationMode::DraftOnly)
}

#[tokio::test]
async fn edit_during_validation_promotes_once_and_save_closes() {
    let gate = GatedValidator::new();
    let ctrl = controller(people(), gate.clone(), auto_draft_only());
    ctrl.open_new().await;

    let (saved, edited) = tokio::join!(ctrl.save(), async {
        yield_now().await;
        let edited = ctrl.edit_pointer("/name", json!("Edsger")).await;
        gate.release();
        edited
    });

    assert_eq!(edited, EditOutcome::Applied { revision: 1 });
    assert_eq!(saved, SaveOutcome::Saved { index: Some(3) });
    assert_eq!(ctrl.collection().len(), 4);
    assert_eq!(ctrl.collection().get(3), Some(json!({"name": "Edsger"})));
    assert_eq!(ctrl.state(), SessionState::Closed);
}

#[tokio::test]
async fn overlapping_edits_insert_a_draft_only_item_once() {
    let ctrl = controller_over(GatedCollection::new(people()), RequireName, auto_draft_only());
    ctrl.open_new().await;

    let (first, second) = tokio::join!(ctrl.edit_pointer("/name", json!("E")), async {
        yield_now().await;
        let second = ctrl.edit_pointer("/name", json!("Ed")).await;
        ctrl.collection().release();
        second
    });

    assert_eq!(first, EditOutcome::Applied { revision: 1 });
    assert_eq!(second, EditOutcome::Applied { revision: 2 });
    assert_eq!(ctrl.collection().len(), 4);
    assert_eq!(ctrl.collection().get(3), Some(json!({"name": "Ed"})));
    assert_eq!(ctrl.state(), SessionState::OpenNewInserted);

    ctrl.edit_pointer("/name", json!("Edsger")).await;
    assert_eq!(ctrl.collection().len(), 4);
    assert_eq!(ctrl.collection().get(3), Some(json!({"name": "Edsger"})));
}

#[tokio::test]
async fn save_waits_for_a_landing_insertion() {
    let ctrl = controller_over(GatedCollection::new(people()), RequireName, auto_draft_only());
    ctrl.open_new().await;

    let (_, saved, ()) = tokio::join!(
        ctrl.edit_pointer("/name", json!("Barbara")),
        async {
            yield_now().await;
            ctrl.save().await
        },
        async {
            yield_now().await;
            yield_now().await;
            ctrl.collection().release();
        }
    );

    assert_eq!(saved, SaveOutcome::Saved { index: Some(3) });
    assert_eq!(ctrl.collection().inner.values().len(), 4);
    assert_eq!(ctrl.collection().get(3), Some(json!({"name": "Barbara"})));
    assert_eq!(ctrl.state(), SessionState::Closed);
}

#[tokio::test]
async fn insertion_landing_after_cancel_is_removed() {
    let ctrl = controller_over(GatedCollection::new(people()), RequireName, auto_draft_only());
    ctrl.open_new().await;

    let (_, cancelled) = tokio::join!(ctrl.edit_pointer("/name", json!("Temp")), async {
        yield_now().await;
        let cancelled = ctrl.cancel().await;
        ctrl.collection().release();
        cancelled
    });

    assert_eq!(cancelled, CancelOutcome::Cancelled { removed: None });
    assert_eq!(ctrl.collection().inner.values(), people());
    assert_eq!(ctrl.state(), SessionState::Closed);
}

#[tokio::test]
async fn placeholder_landing_after_reopen_is_removed() {
    let ctrl = controller_over(
        GatedCollection::new(people()),
        RequireName,
        SessionOptions::default(),
    );

    let (opened, ()) = tokio::join!(ctrl.open_new(), async {
        yield_now().await;
        ctrl.open_existing(0);
        ctrl.collection().release();
    });

    assert_eq!(opened, OpenOutcome::Superseded);
    assert_eq!(ctrl.collection().inner.values(), people());
    assert_eq!(ctrl.state(), SessionState::OpenExisting);
    assert_eq!(ctrl.draft_value(), Some(json!({"name": "Ada"})));
}

#[tokio::test]
async fn cancel_abandons_an_open_waiting_on_its_placeholder() {
    let ctrl = controller_over(
        GatedCollection::new(people()),
        RequireName,
        SessionOptions::default(),
    );

    let (opened, cancelled) = tokio::join!(ctrl.open_new(), async {
        yield_now().await;
        let cancelled = ctrl.cancel().await;
        ctrl.collection().release();
        cancelled
    });

    assert_eq!(cancelled, CancelOutcome::Cancelled { removed: None });
    assert_eq!(opened, OpenOutcome::Superseded);
    assert_eq!(ctrl.collection().inner.values(), people());
    assert_eq!(ctrl.state(), SessionState::Closed);
    assert_eq!(ctrl.cancel().await, CancelOutcome::NoSession);
}
