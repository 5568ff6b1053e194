//! Page window projection over two sources of truth.
//!
//! `ServerPagination` trusts the store's paging metadata; the fetched rows
//! already are the page. `ClientFilteredPagination` is used while branch
//! scoping is active: the whole dataset was fetched, scoped locally, and is
//! paged here.

use serde::Serialize;

use super::scope::{self, BranchEmployees};
use crate::models::lead::Lead;
use crate::models::user::Role;
use crate::models::view_state::ViewState;
use crate::store::ServerPageMeta;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationMode {
    Server,
    ClientFiltered,
}

/// What to ask the store for: which page, how many rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPlan {
    pub page: usize,
    pub limit: usize,
}

impl PaginationMode {
    /// Client-filtered iff branch scoping applies and the branch employees
    /// are known. An empty employee set still scopes, to nothing.
    pub fn select(role: Role, admin_branch_id: Option<&str>, employees: &BranchEmployees) -> PaginationMode {
        if scope::applies(role, admin_branch_id) && !employees.is_pending() {
            PaginationMode::ClientFiltered
        } else {
            PaginationMode::Server
        }
    }

    /// Client-filtered fetches pull everything in one large page so the
    /// local filter sees the full set.
    pub fn fetch_plan(self, view: &ViewState, scoped_fetch_limit: usize) -> FetchPlan {
        match self {
            PaginationMode::Server => FetchPlan { page: view.page, limit: view.per_page },
            PaginationMode::ClientFiltered => FetchPlan { page: 1, limit: scoped_fetch_limit },
        }
    }

    pub fn strategy(self, meta: ServerPageMeta, filtered_len: usize) -> Box<dyn PaginationStrategy> {
        match self {
            PaginationMode::Server => Box::new(ServerPagination {
                total_pages: meta.total_pages,
                total_items: meta.total_leads,
            }),
            PaginationMode::ClientFiltered => Box::new(ClientFilteredPagination { total_items: filtered_len }),
        }
    }
}

/// 1-based, inclusive display range of the current page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub total_pages: usize,
    pub total_items: usize,
    pub start_index: usize,
    pub end_index: usize,
}

impl PageWindow {
    /// `total_pages` is at least 1. An empty set, or a page past the end,
    /// reports a 0..0 range.
    pub fn compute(total_items: usize, total_pages: usize, page: usize, page_size: usize) -> PageWindow {
        let page = page.max(1);
        let page_size = page_size.max(1);
        let start = (page - 1) * page_size + 1;
        let (start_index, end_index) = if total_items == 0 || start > total_items {
            (0, 0)
        } else {
            (start, (page * page_size).min(total_items))
        };
        PageWindow {
            total_pages: total_pages.max(1),
            total_items,
            start_index,
            end_index,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.end_index == 0
    }
}

pub trait PaginationStrategy {
    fn mode(&self) -> PaginationMode;

    fn window(&self, page: usize, page_size: usize) -> PageWindow;

    /// Rows to display for `page`, taken from the scoped set.
    fn rows<'a>(&self, scoped: &[&'a Lead], page: usize, page_size: usize) -> Vec<&'a Lead>;
}

pub struct ServerPagination {
    pub total_pages: usize,
    pub total_items: usize,
}

impl PaginationStrategy for ServerPagination {
    fn mode(&self) -> PaginationMode {
        PaginationMode::Server
    }

    fn window(&self, page: usize, page_size: usize) -> PageWindow {
        PageWindow::compute(self.total_items, self.total_pages, page, page_size)
    }

    fn rows<'a>(&self, scoped: &[&'a Lead], _page: usize, _page_size: usize) -> Vec<&'a Lead> {
        scoped.to_vec()
    }
}

pub struct ClientFilteredPagination {
    pub total_items: usize,
}

impl PaginationStrategy for ClientFilteredPagination {
    fn mode(&self) -> PaginationMode {
        PaginationMode::ClientFiltered
    }

    fn window(&self, page: usize, page_size: usize) -> PageWindow {
        let total_pages = self.total_items.div_ceil(page_size.max(1));
        PageWindow::compute(self.total_items, total_pages, page, page_size)
    }

    fn rows<'a>(&self, scoped: &[&'a Lead], page: usize, page_size: usize) -> Vec<&'a Lead> {
        let page_size = page_size.max(1);
        scoped
            .iter()
            .skip((page.max(1) - 1) * page_size)
            .take(page_size)
            .copied()
            .collect()
    }
}
