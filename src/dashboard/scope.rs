//! Admin branch scoping.
//!
//! An admin only sees leads dispatched from their own branch and created by
//! someone who works there. Every other role sees the list as fetched.

use std::collections::HashSet;

use crate::models::lead::{Lead, reference_id};
use crate::models::user::Role;

/// Ids of the users who belong to the admin's branch.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum BranchEmployees {
    /// The lookup has not come back yet.
    #[default]
    Pending,
    Resolved(HashSet<String>),
}

impl BranchEmployees {
    pub fn is_pending(&self) -> bool {
        matches!(self, BranchEmployees::Pending)
    }

    /// Known employee ids. Empty while the lookup is pending.
    pub fn ids(&self) -> &HashSet<String> {
        static NONE: std::sync::OnceLock<HashSet<String>> = std::sync::OnceLock::new();
        match self {
            BranchEmployees::Resolved(ids) => ids,
            BranchEmployees::Pending => NONE.get_or_init(HashSet::new),
        }
    }
}

/// Whether branch scoping restricts this session at all.
pub fn applies(role: Role, admin_branch_id: Option<&str>) -> bool {
    role.is_admin() && admin_branch_id.is_some()
}

/// Restrict `leads` to the admin's branch and its employees.
///
/// Non-admin roles, or an admin without a branch, get `leads` back unchanged.
/// Leads whose branch or creator reference cannot be resolved are dropped.
pub fn scope<'a>(
    leads: &'a [Lead],
    role: Role,
    admin_branch_id: Option<&str>,
    employee_ids: &HashSet<String>,
) -> Vec<&'a Lead> {
    let branch = match admin_branch_id {
        Some(b) if role.is_admin() => b,
        _ => return leads.iter().collect(),
    };

    leads
        .iter()
        .filter(|lead| {
            reference_id(&lead.dispatched_from) == Some(branch)
                && reference_id(&lead.created_by).is_some_and(|creator| employee_ids.contains(creator))
        })
        .collect()
}
