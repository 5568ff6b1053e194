//! Shared fixtures for the integration tests.
//!
//! - `seeded_store()` - two branches, one admin, sales users on both branches, no leads
//! - `lead()` / `add_leads()` - deterministic leads with 24-hex ids
//! - `session_for()` - a `LeadSession` bound to one of the seeded users
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration as ChronoDuration, TimeZone, Utc};

use leaddesk::dashboard::{LeadSession, SessionSettings, SessionUser};
use leaddesk::models::lead::{Lead, LeadStatus, Priority, Reference};
use leaddesk::models::user::{Role, User};
use leaddesk::store::MemoryLeadStore;

// ============================================================================
// TEST CONSTANTS
// ============================================================================

pub const BRANCH_A: &str = "00000000000000000000b001";
pub const BRANCH_B: &str = "00000000000000000000b002";

/// Admin of branch A.
pub const ADMIN_A: &str = "00000000000000000000a001";
pub const SALES_A: &str = "00000000000000000000a002";
pub const SALES_A2: &str = "00000000000000000000a003";
pub const SALES_B: &str = "00000000000000000000a004";
/// Admin with no branch assigned; sees everything.
pub const ADMIN_UNASSIGNED: &str = "00000000000000000000a005";

// ============================================================================
// STORE SETUP
// ============================================================================

fn user(id: &str, name: &str, branch: Option<&str>, role: Role) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        branch: branch.map(Reference::from),
        role,
    }
}

/// Store holding the test users and no leads.
pub fn seeded_store() -> Arc<MemoryLeadStore> {
    let store = MemoryLeadStore::new();
    store.insert_user(user(ADMIN_A, "Asha Admin", Some(BRANCH_A), Role::Admin));
    store.insert_user(user(SALES_A, "Sam Sales", Some(BRANCH_A), Role::SalesExecutive));
    store.insert_user(user(SALES_A2, "Sita Sales", Some(BRANCH_A), Role::SalesExecutive));
    store.insert_user(user(SALES_B, "Bala Sales", Some(BRANCH_B), Role::SalesExecutive));
    store.insert_user(user(ADMIN_UNASSIGNED, "Hq Admin", None, Role::Admin));
    Arc::new(store)
}

/// 24-hex lead id for sequence number `n`.
pub fn lead_id(n: usize) -> String {
    format!("{n:024x}")
}

/// Lead `n`, created `n` minutes after a fixed origin, so higher `n` is newer.
pub fn lead(n: usize, branch: &str, creator: &str, status: LeadStatus) -> Lead {
    let origin = Utc.with_ymd_and_hms(2024, 9, 1, 8, 0, 0).unwrap();
    Lead {
        id: lead_id(n),
        name: format!("Lead {n:03}"),
        phone: format!("9{n:09}"),
        email: format!("lead{n}@example.com"),
        lead_status: status,
        priority: Priority::Medium,
        dispatched_from: Some(Reference::from(branch)),
        created_by: Some(Reference::from(creator)),
        created_at: origin + ChronoDuration::minutes(n as i64),
        details: Default::default(),
    }
}

/// Insert leads `range`, all from `branch` by `creator` with `status`.
pub fn add_leads(
    store: &MemoryLeadStore,
    range: std::ops::Range<usize>,
    branch: &str,
    creator: &str,
    status: LeadStatus,
) {
    for n in range {
        store.insert_lead(lead(n, branch, creator, status));
    }
}

// ============================================================================
// SESSIONS
// ============================================================================

pub fn settings(page_size: usize) -> SessionSettings {
    SessionSettings {
        page_size,
        ..SessionSettings::default()
    }
}

/// Session for a seeded user. Not mounted.
pub fn session_for(store: &Arc<MemoryLeadStore>, user_id: &str, page_size: usize) -> LeadSession<MemoryLeadStore> {
    let users = store.users();
    let user = users
        .iter()
        .find(|u| u.id == user_id)
        .expect("user is seeded");
    LeadSession::new(store.clone(), SessionUser::from(user), settings(page_size))
}

/// Mounted session with the store journal cleared afterwards.
pub async fn mounted(store: &Arc<MemoryLeadStore>, user_id: &str, page_size: usize) -> LeadSession<MemoryLeadStore> {
    let session = session_for(store, user_id, page_size);
    session.mount().await.expect("mount");
    store.clear_journal();
    session
}
