use serde::Serialize;

use crate::models::lead::{Lead, LeadStats, LeadStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CountSource {
    /// Counted over the leads this session holds.
    Local,
    /// Reported by the store's stats endpoint.
    Remote,
    /// Nothing held and no stats fetched yet.
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusTally {
    pub status: LeadStatus,
    pub label: &'static str,
    pub count: u64,
}

/// Lead counts per status, in lane order, zeros included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub source: CountSource,
    pub total: u64,
    pub by_status: Vec<StatusTally>,
}

impl StatusCounts {
    fn build(source: CountSource, count_of: impl Fn(LeadStatus) -> u64) -> StatusCounts {
        let by_status: Vec<StatusTally> = LeadStatus::ALL
            .into_iter()
            .map(|status| StatusTally { status, label: status.label(), count: count_of(status) })
            .collect();
        StatusCounts {
            source,
            total: by_status.iter().map(|t| t.count).sum(),
            by_status,
        }
    }

    pub fn from_leads(leads: &[&Lead]) -> StatusCounts {
        Self::build(CountSource::Local, |status| {
            leads.iter().filter(|l| l.lead_status == status).count() as u64
        })
    }

    pub fn from_stats(stats: &LeadStats) -> StatusCounts {
        Self::build(CountSource::Remote, |status| {
            stats
                .leads_by_status
                .iter()
                .filter(|c| c.status == status)
                .map(|c| c.count)
                .sum()
        })
    }

    pub fn unavailable() -> StatusCounts {
        Self::build(CountSource::Unavailable, |_| 0)
    }

    /// Count locally when the held set is the complete dataset and not empty;
    /// otherwise fall back to the store's stats.
    pub fn resolve(held: &[&Lead], held_is_complete: bool, remote: Option<&LeadStats>) -> StatusCounts {
        if held_is_complete && !held.is_empty() {
            return Self::from_leads(held);
        }
        match remote {
            Some(stats) => Self::from_stats(stats),
            None => Self::unavailable(),
        }
    }

    pub fn count(&self, status: LeadStatus) -> u64 {
        self.by_status
            .iter()
            .find(|t| t.status == status)
            .map(|t| t.count)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lead::{Priority, StatusCount};
    use chrono::Utc;

    fn lead(status: LeadStatus) -> Lead {
        Lead {
            id: "x".into(),
            name: "X".into(),
            phone: String::new(),
            email: String::new(),
            lead_status: status,
            priority: Priority::High,
            dispatched_from: None,
            created_by: None,
            created_at: Utc::now(),
            details: Default::default(),
        }
    }

    fn remote() -> LeadStats {
        LeadStats {
            leads_by_status: vec![
                StatusCount { status: LeadStatus::Pending, count: 40 },
                StatusCount { status: LeadStatus::NewLead, count: 2 },
            ],
            total_leads: 42,
        }
    }

    #[test]
    fn complete_held_set_is_counted_locally() {
        let held = [lead(LeadStatus::Qualified), lead(LeadStatus::Qualified), lead(LeadStatus::Unqualified)];
        let refs: Vec<&Lead> = held.iter().collect();
        let counts = StatusCounts::resolve(&refs, true, Some(&remote()));
        assert_eq!(counts.source, CountSource::Local);
        assert_eq!(counts.total, 3);
        assert_eq!(counts.count(LeadStatus::Qualified), 2);
        assert_eq!(counts.count(LeadStatus::Pending), 0);
        assert_eq!(counts.by_status.len(), LeadStatus::ALL.len());
    }

    #[test]
    fn partial_or_empty_set_falls_back_to_remote() {
        let held = [lead(LeadStatus::Qualified)];
        let refs: Vec<&Lead> = held.iter().collect();

        let paged = StatusCounts::resolve(&refs, false, Some(&remote()));
        assert_eq!(paged.source, CountSource::Remote);
        assert_eq!(paged.count(LeadStatus::Pending), 40);
        assert_eq!(paged.total, 42);

        let empty = StatusCounts::resolve(&[], true, Some(&remote()));
        assert_eq!(empty.source, CountSource::Remote);
    }

    #[test]
    fn nothing_known_is_unavailable() {
        let counts = StatusCounts::resolve(&[], false, None);
        assert_eq!(counts.source, CountSource::Unavailable);
        assert_eq!(counts.total, 0);
    }
}
