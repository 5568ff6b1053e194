//! Pipeline board tests: lane capping, summary totals and drag-and-drop
//! status changes through the session.

mod common;

use common::*;
use leaddesk::dashboard::{LANE_CAPACITY, MutationKind};
use leaddesk::errors::LeadError;
use leaddesk::models::lead::LeadStatus;
use leaddesk::store::memory::{StoreCall, StoreOp};

#[tokio::test]
async fn test_lanes_cap_but_summary_counts_everything() {
    let store = seeded_store();
    add_leads(&store, 0..7, BRANCH_A, SALES_A, LeadStatus::Qualified);
    add_leads(&store, 7..9, BRANCH_A, SALES_A, LeadStatus::Pending);
    let session = mounted(&store, SALES_A, 10).await;

    let board = session.pipeline();
    let qualified = board.lane(LeadStatus::Qualified).expect("lane");
    assert_eq!(qualified.leads.len(), LANE_CAPACITY);
    assert_eq!(qualified.total, 7);
    assert_eq!(qualified.overflow, 4);
    assert_eq!(qualified.leads[0].id, lead_id(6), "newest first");

    let pending = board.lane(LeadStatus::Pending).expect("lane");
    assert_eq!((pending.total, pending.overflow), (2, 0));

    assert!(board.summary.contains(&(LeadStatus::Qualified, 7)));
    assert!(board.summary.contains(&(LeadStatus::Unqualified, 0)));
    assert_eq!(board.total, 9);
}

#[tokio::test]
async fn test_admin_board_only_shows_scoped_leads() {
    let store = seeded_store();
    add_leads(&store, 0..3, BRANCH_A, SALES_A, LeadStatus::NewLead);
    add_leads(&store, 3..8, BRANCH_B, SALES_B, LeadStatus::NewLead);
    let session = mounted(&store, ADMIN_A, 10).await;

    let board = session.pipeline();
    assert_eq!(board.total, 3);
    assert_eq!(board.lane(LeadStatus::NewLead).expect("lane").total, 3);
}

#[tokio::test]
async fn test_drop_on_other_lane_changes_status() {
    let store = seeded_store();
    add_leads(&store, 0..3, BRANCH_A, SALES_A, LeadStatus::NewLead);
    let session = mounted(&store, SALES_A, 10).await;

    let drag = session.begin_drag(&lead_id(1)).expect("drag");
    assert_eq!(drag.from, LeadStatus::NewLead);

    let outcome = session
        .drop_on("qualified")
        .await
        .expect("drop")
        .expect("status changed");
    assert_eq!(outcome.kind, MutationKind::StatusChanged);
    assert_eq!(store.journal()[0], StoreCall::UpdateLeadStatus(lead_id(1), LeadStatus::Qualified));

    let board = session.pipeline();
    assert_eq!(board.lane(LeadStatus::Qualified).expect("lane").total, 1);
    assert_eq!(board.lane(LeadStatus::NewLead).expect("lane").total, 2);
}

#[tokio::test]
async fn test_drop_on_same_lane_is_noop() {
    let store = seeded_store();
    add_leads(&store, 0..2, BRANCH_A, SALES_A, LeadStatus::Pending);
    let session = mounted(&store, SALES_A, 10).await;

    session.begin_drag(&lead_id(0)).expect("drag");
    let outcome = session.drop_on("pending").await.expect("drop");

    assert!(outcome.is_none());
    assert!(store.journal().is_empty());
}

#[tokio::test]
async fn test_drop_without_drag_does_nothing() {
    let store = seeded_store();
    add_leads(&store, 0..2, BRANCH_A, SALES_A, LeadStatus::Pending);
    let session = mounted(&store, SALES_A, 10).await;

    session.begin_drag(&lead_id(0)).expect("drag");
    session.cancel_drag();

    assert!(session.drop_on("qualified").await.expect("drop").is_none());
    assert_eq!(store.calls_to(StoreOp::UpdateLeadStatus), 0);
}

#[tokio::test]
async fn test_drag_of_unknown_lead_fails() {
    let store = seeded_store();
    let session = mounted(&store, SALES_A, 10).await;

    let err = session.begin_drag(&lead_id(99)).expect_err("not held");
    assert_eq!(err, LeadError::NotFound(lead_id(99)));
}

#[tokio::test]
async fn test_admin_cannot_drag_before_employees_resolve() {
    let store = seeded_store();
    add_leads(&store, 0..2, BRANCH_A, SALES_A, LeadStatus::NewLead);
    store.fail_next(StoreOp::ListUsers, None);
    let session = session_for(&store, ADMIN_A, 10);
    session.mount().await.expect_err("employee lookup fails");

    let err = session.begin_drag(&lead_id(0)).expect_err("employees pending");
    assert_eq!(err, LeadError::EmptyDependency);
    assert!(session.drop_on("qualified").await.expect("drop").is_none());

    session.refresh().await.expect("refresh retries the lookup");
    assert_eq!(session.begin_drag(&lead_id(0)).expect("drag").from, LeadStatus::NewLead);
}

#[tokio::test]
async fn test_drop_on_unknown_lane_is_rejected() {
    let store = seeded_store();
    add_leads(&store, 0..1, BRANCH_A, SALES_A, LeadStatus::NewLead);
    let session = mounted(&store, SALES_A, 10).await;

    session.begin_drag(&lead_id(0)).expect("drag");
    let err = session.drop_on("archived").await.expect_err("bad lane");
    assert_eq!(err, LeadError::InvalidStatus("archived".into()));
    assert!(store.journal().is_empty());
}

#[tokio::test]
async fn test_failed_drop_leaves_lead_in_place() {
    let store = seeded_store();
    add_leads(&store, 0..2, BRANCH_A, SALES_A, LeadStatus::NewLead);
    let session = mounted(&store, SALES_A, 10).await;

    session.begin_drag(&lead_id(1)).expect("drag");
    store.fail_next(StoreOp::UpdateLeadStatus, Some("Lead is locked"));
    let err = session.drop_on("unqualified").await.expect_err("drop fails");

    assert_eq!(err.to_string(), "Lead is locked");
    let board = session.pipeline();
    assert_eq!(board.lane(LeadStatus::NewLead).expect("lane").total, 2);
    assert_eq!(board.lane(LeadStatus::Unqualified).expect("lane").total, 0);
    assert_eq!(store.calls_to(StoreOp::ListLeads), 0);
}
