//! Lead mutations and their follow-up.
//!
//! Every mutation runs the same cycle on success: invalidate the local cache,
//! re-fetch the list (cache-busted) and the stats, close the dialog, raise a
//! success notice. On failure the cache and dialog are left alone and a
//! failure notice carries the store's message.

use serde::Serialize;

use super::pipeline::DragState;
use super::session::{Dialog, LeadSession};
use crate::errors::LeadError;
use crate::models::lead::{ImportFile, ImportReport, Lead, LeadDraft, LeadStatus};
use crate::store::LeadStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    Created,
    Updated,
    Deleted,
    StatusChanged,
    /// Target status equals the current one; nothing was sent.
    StatusUnchanged,
    Imported,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MutationOutcome {
    pub kind: MutationKind,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead: Option<Lead>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import: Option<ImportReport>,
}

impl MutationOutcome {
    fn new(kind: MutationKind, summary: String) -> Self {
        MutationOutcome { kind, summary, lead: None, import: None }
    }

    fn with_lead(mut self, lead: Lead) -> Self {
        self.lead = Some(lead);
        self
    }
}

impl<S: LeadStore> LeadSession<S> {
    /// Raise a failure notice and hand the error back.
    fn reject(&self, err: LeadError) -> LeadError {
        log::warn!("Lead mutation rejected: {err}");
        self.lock().notices.failure(err.to_string());
        err
    }

    fn check_id(&self, id: &str) -> Result<(), LeadError> {
        if self.settings.id_format.is_valid(id) {
            Ok(())
        } else {
            Err(self.reject(LeadError::InvalidIdentifier(id.to_string())))
        }
    }

    /// Post-success cycle. `fresh_first_page` sends the view back to page 1 with no search.
    async fn settle(&self, fresh_first_page: bool, summary: &str) {
        {
            let mut st = self.lock();
            st.cache.invalidate();
            if fresh_first_page {
                st.view.reset_page_and_search();
            }
        }

        let (list, stats) = tokio::join!(self.refresh(), self.refresh_stats());
        if let Err(e) = list {
            log::warn!("List refresh after mutation failed: {e}");
        }
        if let Err(e) = stats {
            log::warn!("Stats refresh after mutation failed: {e}");
        }

        if !fresh_first_page {
            self.clamp_page().await;
        }

        let mut st = self.lock();
        st.dialog = Dialog::Closed;
        st.selected = None;
        st.notices.success(summary);
    }

    /// If the current page ran past the end of the list, step back to the last page.
    async fn clamp_page(&self) {
        let clamped = {
            let mut st = self.lock();
            let total_pages = self.project(&st).window.total_pages;
            let before = st.view.page;
            st.view.clamp_to(total_pages).then_some((before, st.view.page))
        };
        if let Some((from, to)) = clamped {
            log::debug!("Page {from} is past the end, clamping to {to}");
            if let Err(e) = self.refresh().await {
                log::warn!("Refresh after page clamp failed: {e}");
            }
        }
    }

    pub async fn create(&self, mut draft: LeadDraft) -> Result<MutationOutcome, LeadError> {
        if draft.created_by.is_none() {
            draft.created_by = Some(self.user.id.clone());
        }
        if draft.dispatched_from.is_none() {
            draft.dispatched_from = self.user.branch_id.clone();
        }

        match self.store.create_lead(&draft).await {
            Ok(lead) => {
                let summary = format!("Lead '{}' created", lead.name);
                self.settle(true, &summary).await;
                log::info!("{summary} ({})", lead.id);
                Ok(MutationOutcome::new(MutationKind::Created, summary).with_lead(lead))
            }
            Err(e) => Err(self.reject(e.into())),
        }
    }

    pub async fn update(&self, id: &str, draft: LeadDraft) -> Result<MutationOutcome, LeadError> {
        self.check_id(id)?;

        match self.store.update_lead(id, &draft).await {
            Ok(lead) => {
                let summary = format!("Lead '{}' updated", lead.name);
                self.settle(false, &summary).await;
                log::info!("{summary} ({id})");
                Ok(MutationOutcome::new(MutationKind::Updated, summary).with_lead(lead))
            }
            Err(e) => Err(self.reject(e.into())),
        }
    }

    pub async fn delete(&self, id: &str) -> Result<MutationOutcome, LeadError> {
        self.check_id(id)?;

        match self.store.delete_lead(id).await {
            Ok(()) => {
                let summary = "Lead deleted".to_string();
                self.settle(false, &summary).await;
                log::info!("{summary} ({id})");
                Ok(MutationOutcome::new(MutationKind::Deleted, summary))
            }
            Err(e) => Err(self.reject(e.into())),
        }
    }

    /// Move a lead to `status`. Any status may follow any other; the target
    /// only has to be a known one. Moving to the current status sends nothing.
    pub async fn change_status(&self, id: &str, status: &str) -> Result<MutationOutcome, LeadError> {
        self.check_id(id)?;
        let target = LeadStatus::parse(status)
            .ok_or_else(|| self.reject(LeadError::InvalidStatus(status.to_string())))?;

        if self.status_of(id) == Some(target) {
            return Ok(MutationOutcome::new(
                MutationKind::StatusUnchanged,
                format!("Lead is already {}", target.label()),
            ));
        }

        match self.store.update_lead_status(id, target).await {
            Ok(lead) => {
                let summary = format!("Lead '{}' moved to {}", lead.name, target.label());
                self.settle(false, &summary).await;
                log::info!("{summary} ({id})");
                Ok(MutationOutcome::new(MutationKind::StatusChanged, summary).with_lead(lead))
            }
            Err(e) => Err(self.reject(e.into())),
        }
    }

    /// Bulk import. Rejected rows and duplicates do not fail the import; they
    /// are reported in the summary.
    pub async fn import_batch(&self, mut file: ImportFile) -> Result<MutationOutcome, LeadError> {
        if file.uploaded_by.is_none() {
            file.uploaded_by = Some(self.user.id.clone());
        }

        match self.store.import_leads(&file).await {
            Ok(report) => {
                let summary = report.summary();
                if report.is_partial() {
                    log::warn!(
                        "Import of {} was partial: {} errors, {} duplicates",
                        file.file_name,
                        report.errors.len(),
                        report.duplicates.len()
                    );
                }
                self.settle(false, &summary).await;
                log::info!("{summary} from {}", file.file_name);
                let mut outcome = MutationOutcome::new(MutationKind::Imported, summary);
                outcome.import = Some(report);
                Ok(outcome)
            }
            Err(e) => Err(self.reject(e.into())),
        }
    }

    // ── Pipeline drag and drop ──────────────────────────────────────

    /// Pick up a lead from its lane.
    /// Pick up a held lead. A scoped admin cannot drag before the branch employees are known.
    pub fn begin_drag(&self, lead_id: &str) -> Result<DragState, LeadError> {
        let mut st = self.lock();
        if self.scoping_applies() && st.employees.is_pending() {
            return Err(LeadError::EmptyDependency);
        }
        let from = self
            .held_leads(&st)
            .iter()
            .find(|l| l.id == lead_id)
            .map(|l| l.lead_status)
            .ok_or_else(|| LeadError::NotFound(lead_id.to_string()))?;
        let drag = DragState { lead_id: lead_id.to_string(), from };
        st.drag = Some(drag.clone());
        Ok(drag)
    }

    pub fn cancel_drag(&self) {
        self.lock().drag = None;
    }

    /// Drop the dragged lead on `lane`. Returns `None` when nothing was being
    /// dragged or the lane is the one the lead already sits in.
    pub async fn drop_on(&self, lane: &str) -> Result<Option<MutationOutcome>, LeadError> {
        let target = LeadStatus::parse(lane)
            .ok_or_else(|| self.reject(LeadError::InvalidStatus(lane.to_string())))?;
        let drag = self.lock().drag.take();
        let Some(drag) = drag else {
            return Ok(None);
        };

        match drag.drop_on(target) {
            None => Ok(None),
            Some(status) => self.change_status(&drag.lead_id, status.as_str()).await.map(Some),
        }
    }
}
