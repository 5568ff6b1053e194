use std::collections::{HashMap, VecDeque};

use chrono::Utc;

use crate::models::lead::{Lead, LeadStats};
use crate::store::{LeadPage, ListQuery, ServerPageMeta};

/// Pages kept per session before the oldest is evicted.
const MAX_PAGES: usize = 16;

/// A fetched page as it came back from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedPage {
    pub key: ListQuery,
    pub leads: Vec<Lead>,
    pub meta: ServerPageMeta,
}

/// Session-local copy of recently fetched pages and the last stats.
///
/// After `invalidate` every lookup misses and the next fetches carry a
/// cache-bust token until one lands.
#[derive(Debug, Default)]
pub struct LeadCache {
    pages: HashMap<ListQuery, CachedPage>,
    order: VecDeque<ListQuery>,
    stats: Option<LeadStats>,
    bust_pending: bool,
}

impl LeadCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &ListQuery) -> Option<&CachedPage> {
        if self.bust_pending {
            return None;
        }
        self.pages.get(key)
    }

    pub fn put(&mut self, key: ListQuery, page: LeadPage) -> CachedPage {
        let entry = CachedPage {
            key: key.clone(),
            leads: page.leads,
            meta: page.pagination,
        };
        if self.pages.insert(key.clone(), entry.clone()).is_none() {
            self.order.push_back(key);
            while self.order.len() > MAX_PAGES {
                if let Some(oldest) = self.order.pop_front() {
                    self.pages.remove(&oldest);
                }
            }
        }
        self.bust_pending = false;
        entry
    }

    pub fn stats(&self) -> Option<&LeadStats> {
        self.stats.as_ref()
    }

    pub fn put_stats(&mut self, stats: LeadStats) {
        self.stats = Some(stats);
    }

    /// Drop every cached page and the stats.
    pub fn invalidate(&mut self) {
        self.pages.clear();
        self.order.clear();
        self.stats = None;
        self.bust_pending = true;
    }

    pub fn is_bust_pending(&self) -> bool {
        self.bust_pending
    }

    /// Token for the next fetch, when the cache was invalidated since the last one landed.
    pub fn bust_token(&self, generation: u64) -> Option<String> {
        self.bust_pending
            .then(|| format!("{}-{generation}", Utc::now().timestamp_millis()))
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(page: usize) -> ListQuery {
        ListQuery {
            page,
            limit: 10,
            search: String::new(),
            lead_status: None,
            dispatched_from: None,
            created_by: None,
            cache_bust: None,
        }
    }

    #[test]
    fn put_then_get_hits() {
        let mut cache = LeadCache::new();
        cache.put(key(1), LeadPage::default());
        assert!(cache.get(&key(1)).is_some());
        assert!(cache.get(&key(2)).is_none());
    }

    #[test]
    fn invalidate_misses_and_requests_bust() {
        let mut cache = LeadCache::new();
        cache.put(key(1), LeadPage::default());
        cache.put_stats(LeadStats::default());

        cache.invalidate();
        assert!(cache.get(&key(1)).is_none());
        assert!(cache.stats().is_none());
        assert!(cache.bust_token(7).is_some_and(|t| t.ends_with("-7")));

        cache.put(key(1), LeadPage::default());
        assert!(!cache.is_bust_pending());
        assert!(cache.bust_token(8).is_none());
    }

    #[test]
    fn oldest_pages_are_evicted() {
        let mut cache = LeadCache::new();
        for p in 1..=MAX_PAGES + 2 {
            cache.put(key(p), LeadPage::default());
        }
        assert_eq!(cache.len(), MAX_PAGES);
        assert!(cache.get(&key(1)).is_none());
        assert!(cache.get(&key(MAX_PAGES + 2)).is_some());
    }
}
