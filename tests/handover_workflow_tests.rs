//! Integration tests for the workflow engine on top of the file store
//!
//! These run the full lifecycle against a temporary store directory, reopen
//! the directory to check durability and race two engines on one record.

use chrono::NaiveDate;
use handover_desk::handover::{EmployeeRef, HandoverDraft, ImportantDate, TaskStatus};
use handover_desk::store::{CommitOutcome, FileHandoverStore, HandoverStore};
use handover_desk::workflows::{ActivityLog, ErrorKind, HandoverWorkflowEngine};
use handover_desk::{Actor, HandoverAction, HandoverStatus};
use std::sync::Arc;
use tempfile::TempDir;

fn harriet() -> Actor {
    Actor::employee("e-100", "Harriet Olsen")
}

fn tomas() -> Actor {
    Actor::employee("e-200", "Tomas Berg")
}

fn lena() -> Actor {
    Actor::employee("e-300", "Lena Holm")
}

fn draft() -> HandoverDraft {
    let mut draft = HandoverDraft::new(
        EmployeeRef::new("e-100", "Harriet Olsen"),
        EmployeeRef::new("e-200", "Tomas Berg"),
        EmployeeRef::new("e-300", "Lena Holm"),
    )
    .with_dates(
        NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 7, 31).unwrap(),
    )
    .with_task("Quarterly VAT filing")
    .with_task("Supplier onboarding backlog");
    draft.knowledge.contacts = "Accounting: ext. 4411".to_string();
    draft.knowledge.important_dates.push(ImportantDate {
        date: NaiveDate::from_ymd_opt(2024, 7, 15).unwrap(),
        description: "VAT deadline".to_string(),
    });
    draft
}

async fn file_engine(dir: &TempDir) -> HandoverWorkflowEngine {
    let store = FileHandoverStore::open(dir.path().join("records")).await.unwrap();
    HandoverWorkflowEngine::new(Arc::new(store))
}

#[tokio::test]
async fn test_lifecycle_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let engine = file_engine(&dir).await;
    let handover = engine.create_handover(draft(), &harriet()).await.unwrap();

    for (actor, action, comment) in [
        (harriet(), HandoverAction::SignHo, None),
        (tomas(), HandoverAction::SignTo, None),
        (lena(), HandoverAction::Clarify, Some("who owns the supplier portal?")),
        (harriet(), HandoverAction::Resubmit, Some("Tomas gets admin rights")),
        (lena(), HandoverAction::Approve, None),
    ] {
        engine
            .apply_transition(handover.id, &actor, action, comment)
            .await
            .unwrap();
    }
    engine
        .update_task_status(handover.tasks[0].id, &tomas(), "IN_PROGRESS", None)
        .await
        .unwrap();
    drop(engine);

    let reopened = file_engine(&dir).await;
    let stored = reopened.get_handover(handover.id).await.unwrap();
    assert_eq!(stored.status(), HandoverStatus::ApprovedByLineManager);
    assert_eq!(stored.activity_log.len(), 5);
    assert_eq!(stored.knowledge.important_dates.len(), 1);
    assert_eq!(stored.tasks[0].current_status, TaskStatus::InProgress);
    assert_eq!(
        stored.workflow.lm_clarification_comment.as_deref(),
        Some("who owns the supplier portal?")
    );

    let rendered: Vec<String> = ActivityLog::entries(&stored)
        .iter()
        .map(ToString::to_string)
        .collect();
    assert!(rendered[0].contains("Harriet Olsen"));
    assert!(rendered[2].contains("NEED_CLARIFICATION"));
}

#[tokio::test]
async fn test_stale_commit_is_refused_by_file_store() {
    let dir = TempDir::new().unwrap();
    let engine = file_engine(&dir).await;
    let handover = engine.create_handover(draft(), &harriet()).await.unwrap();

    let other = file_engine(&dir).await;
    other
        .apply_transition(handover.id, &harriet(), HandoverAction::SignHo, None)
        .await
        .unwrap();

    let store = FileHandoverStore::open(dir.path().join("records")).await.unwrap();
    let entry = ActivityLog::transition_entry(
        &harriet(),
        handover_desk::handover::Role::HandingOver,
        HandoverAction::SignHo,
        HandoverStatus::SignedByHandingOver,
        None,
        chrono::Utc::now(),
    );
    let outcome = store
        .commit_transition(handover.id, 0, handover.workflow.clone(), entry)
        .await
        .unwrap();
    assert_eq!(outcome, CommitOutcome::VersionMismatch { current_version: 1 });

    let stored = engine.get_handover(handover.id).await.unwrap();
    assert_eq!(stored.activity_log.len(), 1);
    assert!(stored.workflow.ho_signed);
}

#[tokio::test]
async fn test_second_engine_sees_signature() {
    let dir = TempDir::new().unwrap();
    let first = file_engine(&dir).await;
    let second = file_engine(&dir).await;
    let handover = first.create_handover(draft(), &harriet()).await.unwrap();

    first
        .apply_transition(handover.id, &harriet(), HandoverAction::SignHo, None)
        .await
        .unwrap();
    let err = second
        .apply_transition(handover.id, &harriet(), HandoverAction::SignHo, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);
}

#[tokio::test]
async fn test_invalid_drafts_are_not_stored() {
    let dir = TempDir::new().unwrap();
    let engine = file_engine(&dir).await;

    let mut same_person = draft();
    same_person.taking_over_employee = EmployeeRef::new("e-100", "Harriet Olsen");
    let err = engine
        .create_handover(same_person, &harriet())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let inverted = draft().with_dates(
        NaiveDate::from_ymd_opt(2024, 8, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
    );
    assert!(engine.create_handover(inverted, &harriet()).await.is_err());

    assert!(engine.list_handovers().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_is_oldest_first() {
    let dir = TempDir::new().unwrap();
    let engine = file_engine(&dir).await;
    let first = engine.create_handover(draft(), &harriet()).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = engine.create_handover(draft(), &tomas()).await.unwrap();

    let ids: Vec<_> = engine
        .list_handovers()
        .await
        .unwrap()
        .into_iter()
        .map(|handover| handover.id)
        .collect();
    assert_eq!(ids, vec![first.id, second.id]);
}
