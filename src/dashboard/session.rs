//! Per-dashboard lead session.
//!
//! A `LeadSession` owns everything one mounted dashboard needs: the view
//! controls, the local cache, the admin's branch-employee set, dialog state
//! and the current notice. It is created on login and dropped on logout;
//! nothing is shared between sessions.
//!
//! List fetches are tagged with a generation number taken when the request is
//! issued. Only the response for the newest generation is applied, so a slow
//! response to an older view state can never overwrite a newer one.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::cache::{CachedPage, LeadCache};
use super::notice::{Notice, NoticeBoard};
use super::pagination::{PageWindow, PaginationMode};
use super::pipeline::{DragState, PipelineBoard};
use super::scope::{self, BranchEmployees};
use super::stats::StatusCounts;
use crate::config::AppConfig;
use crate::errors::LeadError;
use crate::models::lead::{Lead, LeadIdFormat, LeadStatus};
use crate::models::user::{Role, User};
use crate::models::view_state::ViewState;
use crate::store::{LeadStore, ListQuery, ServerPageMeta, UserQuery};

/// The signed-in user a session is scoped to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub branch_id: Option<String>,
}

impl From<&User> for SessionUser {
    fn from(u: &User) -> Self {
        SessionUser {
            id: u.id.clone(),
            name: u.name.clone(),
            role: u.role,
            branch_id: u.branch_id().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub page_size: usize,
    pub scoped_fetch_limit: usize,
    pub employee_fetch_limit: usize,
    pub notice_ttl: Duration,
    pub id_format: LeadIdFormat,
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for SessionSettings {
    fn from(c: &AppConfig) -> Self {
        SessionSettings {
            page_size: c.page_size,
            scoped_fetch_limit: c.scoped_fetch_limit,
            employee_fetch_limit: c.employee_fetch_limit,
            notice_ttl: c.notice_ttl,
            id_format: c.id_format,
        }
    }
}

/// Which modal is open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "lead_id", rename_all = "snake_case")]
pub enum Dialog {
    #[default]
    Closed,
    Create,
    Edit(String),
    Delete(String),
    StatusChange(String),
    Import,
}

impl Dialog {
    pub fn lead_id(&self) -> Option<&str> {
        match self {
            Dialog::Edit(id) | Dialog::Delete(id) | Dialog::StatusChange(id) => Some(id),
            _ => None,
        }
    }
}

/// How a list refresh was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Fetched,
    CacheHit,
    /// A newer request was issued while this one was in flight; the response was dropped.
    Superseded,
}

/// Navigation into the dashboard. `refresh_requested` forces a fresh first page.
#[derive(Debug, Clone, Copy, Default)]
pub struct Navigation {
    pub refresh_requested: bool,
}

/// Everything the dashboard renders, computed from the session state.
#[derive(Debug, Clone, Serialize)]
pub struct LeadView {
    pub rows: Vec<Lead>,
    pub window: PageWindow,
    pub mode: PaginationMode,
    pub counts: StatusCounts,
    pub loading: bool,
    pub view: ViewState,
    pub dialog: Dialog,
    pub selected: Option<String>,
    pub notice: Option<Notice>,
}

pub(crate) struct Projection {
    pub(crate) mode: PaginationMode,
    pub(crate) window: PageWindow,
    pub(crate) rows: Vec<Lead>,
    pub(crate) counts: StatusCounts,
}

pub(crate) struct SessionState {
    pub(crate) view: ViewState,
    pub(crate) cache: LeadCache,
    /// Last page applied to the view. Survives cache invalidation.
    pub(crate) shown: Option<CachedPage>,
    pub(crate) employees: BranchEmployees,
    pub(crate) generation: u64,
    pub(crate) stats_generation: u64,
    pub(crate) loading: bool,
    pub(crate) dialog: Dialog,
    pub(crate) selected: Option<String>,
    pub(crate) notices: NoticeBoard,
    pub(crate) drag: Option<DragState>,
    pub(crate) disposed: bool,
}

pub struct LeadSession<S> {
    pub(crate) store: Arc<S>,
    pub(crate) user: SessionUser,
    pub(crate) settings: SessionSettings,
    state: Mutex<SessionState>,
}

impl<S: LeadStore> LeadSession<S> {
    pub fn new(store: Arc<S>, user: SessionUser, settings: SessionSettings) -> Self {
        let state = SessionState {
            view: ViewState::new(settings.page_size),
            cache: LeadCache::new(),
            shown: None,
            employees: BranchEmployees::Pending,
            generation: 0,
            stats_generation: 0,
            loading: false,
            dialog: Dialog::Closed,
            selected: None,
            notices: NoticeBoard::new(settings.notice_ttl),
            drag: None,
            disposed: false,
        };
        LeadSession { store, user, settings, state: Mutex::new(state) }
    }

    pub fn user(&self) -> &SessionUser {
        &self.user
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn scoping_applies(&self) -> bool {
        scope::applies(self.user.role, self.user.branch_id.as_deref())
    }

    /// Load what the first render needs: the employee set for a scoped admin, then list and stats.
    pub async fn mount(&self) -> Result<(), LeadError> {
        log::info!("Mounting lead dashboard for user {} ({:?})", self.user.id, self.user.role);
        if self.scoping_applies() {
            self.load_employees().await?;
        }
        self.reload().await
    }

    /// Fetch the users of the admin's branch. Until this lands the scoped view is loading.
    pub async fn load_employees(&self) -> Result<(), LeadError> {
        let query = UserQuery {
            branch: self.user.branch_id.clone(),
            limit: self.settings.employee_fetch_limit,
        };
        match self.store.list_users(&query).await {
            Ok(users) => {
                let ids: HashSet<String> = users.into_iter().map(|u| u.id).collect();
                log::debug!("Resolved {} employees for branch {:?}", ids.len(), query.branch);
                self.lock().employees = BranchEmployees::Resolved(ids);
                Ok(())
            }
            Err(e) => {
                let err = LeadError::from(e);
                log::warn!("Branch employee lookup failed: {err}");
                self.lock().notices.failure(err.to_string());
                Err(err)
            }
        }
    }

    pub fn pagination_mode(&self) -> PaginationMode {
        self.pagination_mode_of(&self.lock())
    }

    /// Bring the list in line with the current view state, from cache when possible.
    /// A scoped admin whose employee lookup has not landed retries it first.
    pub async fn refresh(&self) -> Result<FetchOutcome, LeadError> {
        let awaiting_employees = self.scoping_applies() && self.lock().employees.is_pending();
        if awaiting_employees {
            self.load_employees().await?;
        }

        let (generation, query) = {
            let mut st = self.lock();
            if st.disposed {
                return Ok(FetchOutcome::Superseded);
            }
            let mode = self.pagination_mode_of(&st);
            let plan = mode.fetch_plan(&st.view, self.settings.scoped_fetch_limit);
            let key = ListQuery {
                page: plan.page,
                limit: plan.limit,
                search: st.view.search.clone(),
                lead_status: st.view.status,
                dispatched_from: st.view.branch.clone(),
                created_by: st.view.created_by.clone(),
                cache_bust: None,
            };

            // A hit still supersedes anything in flight for an older view.
            st.generation += 1;
            if let Some(hit) = st.cache.get(&key).cloned() {
                log::debug!("Lead cache hit: page={} limit={}", key.page, key.limit);
                st.shown = Some(hit);
                st.loading = false;
                return Ok(FetchOutcome::CacheHit);
            }

            let generation = st.generation;
            let cache_bust = st.cache.bust_token(generation);
            log::debug!(
                "Fetching leads: mode={mode:?} page={} limit={} bust={cache_bust:?}",
                key.page,
                key.limit
            );
            st.loading = true;
            (generation, ListQuery { cache_bust, ..key })
        };

        let result = self.store.list_leads(&query).await;

        let mut st = self.lock();
        if st.disposed || st.generation != generation {
            log::warn!(
                "Discarding stale lead response (generation {generation}, current {})",
                st.generation
            );
            return Ok(FetchOutcome::Superseded);
        }
        st.loading = false;
        match result {
            Ok(page) => {
                let entry = st.cache.put(query.key(), page);
                st.shown = Some(entry);
                Ok(FetchOutcome::Fetched)
            }
            Err(e) => {
                let err = LeadError::from(e);
                log::warn!("Lead list fetch failed: {err}");
                let server_paged = self.pagination_mode_of(&st) == PaginationMode::Server;
                Self::restore_shown_view(&mut st, server_paged);
                st.notices.failure(err.to_string());
                Err(err)
            }
        }
    }

    fn pagination_mode_of(&self, st: &SessionState) -> PaginationMode {
        PaginationMode::select(self.user.role, self.user.branch_id.as_deref(), &st.employees)
    }

    /// Put the controls back to the ones that produced the rows still shown.
    /// A client-filtered key always asks for page 1, so its page is not the view's.
    fn restore_shown_view(st: &mut SessionState, server_paged: bool) {
        let Some(key) = st.shown.as_ref().map(|p| p.key.clone()) else {
            return;
        };
        st.view.search = key.search;
        st.view.status = key.lead_status;
        st.view.branch = key.dispatched_from;
        st.view.created_by = key.created_by;
        if server_paged {
            st.view.page = key.page;
        }
    }

    /// Re-fetch the aggregate stats.
    pub async fn refresh_stats(&self) -> Result<(), LeadError> {
        let generation = {
            let mut st = self.lock();
            st.stats_generation += 1;
            st.stats_generation
        };

        let result = self.store.lead_stats().await;

        let mut st = self.lock();
        if st.disposed || st.stats_generation != generation {
            return Ok(());
        }
        match result {
            Ok(stats) => {
                st.cache.put_stats(stats);
                Ok(())
            }
            Err(e) => {
                let err = LeadError::from(e);
                log::warn!("Lead stats fetch failed: {err}");
                Err(err)
            }
        }
    }

    /// List and stats together. The list result is returned; a stats failure is only logged.
    pub async fn reload(&self) -> Result<(), LeadError> {
        let (list, stats) = tokio::join!(self.refresh(), self.refresh_stats());
        if let Err(e) = stats {
            log::warn!("Stats unavailable after reload: {e}");
        }
        list.map(|_| ())
    }

    pub async fn set_search(&self, search: &str) -> Result<FetchOutcome, LeadError> {
        self.lock().view.set_search(search);
        self.refresh().await
    }

    pub async fn set_status_filter(&self, status: Option<LeadStatus>) -> Result<FetchOutcome, LeadError> {
        self.lock().view.set_status(status);
        self.refresh().await
    }

    pub async fn set_branch_filter(&self, branch: Option<String>) -> Result<FetchOutcome, LeadError> {
        self.lock().view.set_branch(branch);
        self.refresh().await
    }

    pub async fn go_to_page(&self, page: usize) -> Result<FetchOutcome, LeadError> {
        self.lock().view.go_to(page);
        self.refresh().await
    }

    /// Apply several control changes at once, then refresh once.
    pub async fn apply_view(&self, change: impl FnOnce(&mut ViewState)) -> Result<FetchOutcome, LeadError> {
        change(&mut self.lock().view);
        self.refresh().await
    }

    /// Entering the dashboard. A refresh request resets page and search and
    /// reloads from the store once that state is in place.
    pub async fn navigate(&self, nav: Navigation) -> Result<(), LeadError> {
        if nav.refresh_requested {
            {
                let mut st = self.lock();
                st.view.reset_page_and_search();
                st.cache.invalidate();
            }
            self.reload().await
        } else {
            self.refresh().await.map(|_| ())
        }
    }

    /// Scope the held page, pick the pagination strategy and project the window, rows and counts.
    pub(crate) fn project(&self, st: &SessionState) -> Projection {
        let mode = self.pagination_mode_of(st);
        let (held, meta) = match &st.shown {
            Some(p) => (p.leads.as_slice(), p.meta),
            None => (&[][..], ServerPageMeta::default()),
        };
        let scoped = scope::scope(held, self.user.role, self.user.branch_id.as_deref(), st.employees.ids());
        let strategy = mode.strategy(meta, scoped.len());
        Projection {
            mode,
            window: strategy.window(st.view.page, st.view.per_page),
            rows: strategy
                .rows(&scoped, st.view.page, st.view.per_page)
                .into_iter()
                .cloned()
                .collect(),
            counts: StatusCounts::resolve(&scoped, mode == PaginationMode::ClientFiltered, st.cache.stats()),
        }
    }

    /// Leads held by the session after branch scoping.
    pub(crate) fn held_leads(&self, st: &SessionState) -> Vec<Lead> {
        let held = st.shown.as_ref().map(|p| p.leads.as_slice()).unwrap_or(&[]);
        scope::scope(held, self.user.role, self.user.branch_id.as_deref(), st.employees.ids())
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn view(&self) -> LeadView {
        let mut st = self.lock();
        let notice = st.notices.visible(Instant::now()).cloned();
        let Projection { mode, window, rows, counts } = self.project(&st);
        let awaiting_employees = self.scoping_applies() && st.employees.is_pending();

        LeadView {
            rows,
            window,
            mode,
            counts,
            loading: st.loading || st.shown.is_none() || awaiting_employees,
            view: st.view.clone(),
            dialog: st.dialog.clone(),
            selected: st.selected.clone(),
            notice,
        }
    }

    pub fn pipeline(&self) -> PipelineBoard {
        let st = self.lock();
        let held = self.held_leads(&st);
        let refs: Vec<&Lead> = held.iter().collect();
        PipelineBoard::build(&refs)
    }

    /// Current status of a lead the session holds.
    pub fn status_of(&self, lead_id: &str) -> Option<LeadStatus> {
        let st = self.lock();
        st.shown
            .as_ref()
            .and_then(|p| p.leads.iter().find(|l| l.id == lead_id))
            .map(|l| l.lead_status)
    }

    pub fn open_dialog(&self, dialog: Dialog) {
        let mut st = self.lock();
        st.selected = dialog.lead_id().map(str::to_string);
        st.dialog = dialog;
    }

    pub fn close_dialog(&self) {
        let mut st = self.lock();
        st.dialog = Dialog::Closed;
        st.selected = None;
    }

    pub fn dialog(&self) -> Dialog {
        self.lock().dialog.clone()
    }

    pub fn selected(&self) -> Option<String> {
        self.lock().selected.clone()
    }

    pub fn notice(&self) -> Option<Notice> {
        self.lock().notices.visible(Instant::now()).cloned()
    }

    pub fn dismiss_notice(&self) {
        self.lock().notices.dismiss();
    }

    pub fn is_cache_bust_pending(&self) -> bool {
        self.lock().cache.is_bust_pending()
    }

    /// Tear down on logout. Responses still in flight are dropped on arrival.
    pub fn dispose(&self) {
        let mut st = self.lock();
        st.disposed = true;
        st.generation += 1;
        st.stats_generation += 1;
        st.cache.invalidate();
        st.shown = None;
        st.drag = None;
        log::info!("Disposed lead dashboard for user {}", self.user.id);
    }
}
