//! Status lanes for the drag-and-drop pipeline board.

use serde::Serialize;

use crate::models::lead::{Lead, LeadStatus};

/// Leads shown per lane; the rest are summarised as overflow.
pub const LANE_CAPACITY: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lane {
    pub status: LeadStatus,
    pub label: &'static str,
    /// Newest first, at most `LANE_CAPACITY`.
    pub leads: Vec<Lead>,
    pub total: usize,
    pub overflow: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineBoard {
    pub lanes: Vec<Lane>,
    /// Per-status totals over every lead on the board, not just the shown ones.
    pub summary: Vec<(LeadStatus, usize)>,
    pub total: usize,
}

impl PipelineBoard {
    pub fn build(leads: &[&Lead]) -> PipelineBoard {
        let lanes: Vec<Lane> = LeadStatus::ALL
            .into_iter()
            .map(|status| {
                let mut in_lane: Vec<&Lead> = leads.iter().copied().filter(|l| l.lead_status == status).collect();
                in_lane.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                let total = in_lane.len();
                Lane {
                    status,
                    label: status.label(),
                    leads: in_lane.into_iter().take(LANE_CAPACITY).cloned().collect(),
                    total,
                    overflow: total.saturating_sub(LANE_CAPACITY),
                }
            })
            .collect();

        PipelineBoard {
            summary: lanes.iter().map(|l| (l.status, l.total)).collect(),
            total: leads.len(),
            lanes,
        }
    }

    pub fn lane(&self, status: LeadStatus) -> Option<&Lane> {
        self.lanes.iter().find(|l| l.status == status)
    }
}

/// The lead picked up at drag start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DragState {
    pub lead_id: String,
    pub from: LeadStatus,
}

impl DragState {
    /// Status change implied by dropping on `lane`; `None` when it is the lane the lead is in.
    pub fn drop_on(&self, lane: LeadStatus) -> Option<LeadStatus> {
        (lane != self.from).then_some(lane)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lead::Priority;
    use chrono::{TimeZone, Utc};

    fn lead(id: &str, status: LeadStatus, day: u32) -> Lead {
        Lead {
            id: id.into(),
            name: id.into(),
            phone: String::new(),
            email: String::new(),
            lead_status: status,
            priority: Priority::Medium,
            dispatched_from: None,
            created_by: None,
            created_at: Utc.with_ymd_and_hms(2026, 5, day, 12, 0, 0).unwrap(),
            details: Default::default(),
        }
    }

    #[test]
    fn lanes_cap_at_three_newest_first() {
        let data: Vec<Lead> = (1..=5).map(|d| lead(&format!("q{d}"), LeadStatus::Qualified, d)).collect();
        let refs: Vec<&Lead> = data.iter().collect();
        let board = PipelineBoard::build(&refs);

        let lane = board.lane(LeadStatus::Qualified).unwrap();
        assert_eq!(lane.leads.iter().map(|l| l.id.as_str()).collect::<Vec<_>>(), vec!["q5", "q4", "q3"]);
        assert_eq!((lane.total, lane.overflow), (5, 2));
    }

    #[test]
    fn summary_counts_the_full_set() {
        let mut data: Vec<Lead> = (1..=6).map(|d| lead(&format!("p{d}"), LeadStatus::Pending, d)).collect();
        data.push(lead("n1", LeadStatus::NewLead, 1));
        let refs: Vec<&Lead> = data.iter().collect();
        let board = PipelineBoard::build(&refs);

        assert!(board.summary.contains(&(LeadStatus::Pending, 6)));
        assert!(board.summary.contains(&(LeadStatus::NewLead, 1)));
        assert!(board.summary.contains(&(LeadStatus::OrderCompleted, 0)));
        assert_eq!(board.total, 7);
        assert_eq!(board.lanes.len(), LeadStatus::ALL.len());
    }

    #[test]
    fn drop_on_same_lane_is_noop() {
        let drag = DragState { lead_id: "a".into(), from: LeadStatus::Pending };
        assert_eq!(drag.drop_on(LeadStatus::Pending), None);
        assert_eq!(drag.drop_on(LeadStatus::Qualified), Some(LeadStatus::Qualified));
    }
}
