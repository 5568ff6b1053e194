//! Contract of the remote lead store the dashboard talks to.
//!
//! The dashboard never reaches the transport directly; every read and write
//! goes through [`LeadStore`]. `MemoryLeadStore` is the in-process
//! implementation used by the binary and by tests.

pub mod memory;

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::models::lead::{ImportFile, ImportReport, Lead, LeadDraft, LeadStats, LeadStatus};
use crate::models::user::User;

pub use memory::MemoryLeadStore;

/// Parameters of a paged lead listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: usize,
    pub limit: usize,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub lead_status: Option<LeadStatus>,
    #[serde(default)]
    pub dispatched_from: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    /// Uniqueness token that defeats intermediate caches. Not part of the cache key.
    #[serde(default)]
    pub cache_bust: Option<String>,
}

impl ListQuery {
    /// The query with the cache-bust token stripped, used to key cached pages.
    pub fn key(&self) -> ListQuery {
        ListQuery {
            cache_bust: None,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerPageMeta {
    pub total_pages: usize,
    pub total_leads: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadPage {
    pub leads: Vec<Lead>,
    pub pagination: ServerPageMeta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserQuery {
    pub branch: Option<String>,
    pub limit: usize,
}

/// Rejection from the store, with the server's message when it sent one.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreError {
    pub message: Option<String>,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        StoreError { message: Some(message.into()) }
    }

    pub fn silent() -> Self {
        StoreError { message: None }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(m) => write!(f, "Store error: {m}"),
            None => write!(f, "Store error"),
        }
    }
}

impl std::error::Error for StoreError {}

pub type StoreResult<T> = Result<T, StoreError>;

/// Paged queries and per-lead mutations offered by the backend.
pub trait LeadStore: Send + Sync + 'static {
    fn list_leads(&self, query: &ListQuery) -> impl Future<Output = StoreResult<LeadPage>> + Send;

    fn lead_stats(&self) -> impl Future<Output = StoreResult<LeadStats>> + Send;

    fn create_lead(&self, draft: &LeadDraft) -> impl Future<Output = StoreResult<Lead>> + Send;

    fn update_lead(&self, id: &str, draft: &LeadDraft) -> impl Future<Output = StoreResult<Lead>> + Send;

    fn delete_lead(&self, id: &str) -> impl Future<Output = StoreResult<()>> + Send;

    fn update_lead_status(
        &self,
        id: &str,
        status: LeadStatus,
    ) -> impl Future<Output = StoreResult<Lead>> + Send;

    fn import_leads(&self, file: &ImportFile) -> impl Future<Output = StoreResult<ImportReport>> + Send;

    fn list_users(&self, query: &UserQuery) -> impl Future<Output = StoreResult<Vec<User>>> + Send;
}
