use serde::Serialize;

use super::lead::LeadStatus;

/// Per-session list controls. `page` is 1-based and never below 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    pub page: usize,
    pub per_page: usize,
    pub search: String,
    pub status: Option<LeadStatus>,
    pub branch: Option<String>,
    pub created_by: Option<String>,
}

impl ViewState {
    pub fn new(per_page: usize) -> Self {
        ViewState {
            page: 1,
            per_page: per_page.clamp(1, 100),
            search: String::new(),
            status: None,
            branch: None,
            created_by: None,
        }
    }

    pub fn go_to(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn set_search(&mut self, search: &str) {
        self.search = search.trim().to_string();
        self.page = 1;
    }

    pub fn set_status(&mut self, status: Option<LeadStatus>) {
        self.status = status;
        self.page = 1;
    }

    pub fn set_branch(&mut self, branch: Option<String>) {
        self.branch = branch.filter(|b| !b.trim().is_empty());
        self.page = 1;
    }

    pub fn set_created_by(&mut self, created_by: Option<String>) {
        self.created_by = created_by.filter(|c| !c.trim().is_empty());
        self.page = 1;
    }

    /// Back to the first page with no search term. Status and branch filters stay.
    pub fn reset_page_and_search(&mut self) {
        self.search.clear();
        self.page = 1;
    }

    /// Pull the page back to `total_pages` if it ran past the end.
    /// Returns true when the page changed.
    pub fn clamp_to(&mut self, total_pages: usize) -> bool {
        let last = total_pages.max(1);
        if self.page > last {
            self.page = last;
            true
        } else {
            false
        }
    }
}
