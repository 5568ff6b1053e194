use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use serde::Deserialize;

use super::{LeadPage, LeadStore, ListQuery, ServerPageMeta, StoreError, StoreResult, UserQuery};
use crate::models::lead::{
    ImportDuplicate, ImportFile, ImportReport, ImportRowError, Lead, LeadDraft, LeadStats,
    LeadStatus, Priority, Reference, StatusCount, reference_id,
};
use crate::models::user::{Branch, User};

/// Store operations, used to target failure and latency injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    ListLeads,
    LeadStats,
    CreateLead,
    UpdateLead,
    DeleteLead,
    UpdateLeadStatus,
    ImportLeads,
    ListUsers,
}

/// One entry of the request journal, in issue order.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    ListLeads(ListQuery),
    LeadStats,
    CreateLead(String),
    UpdateLead(String),
    DeleteLead(String),
    UpdateLeadStatus(String, LeadStatus),
    ImportLeads(String),
    ListUsers(UserQuery),
}

impl StoreCall {
    pub fn op(&self) -> StoreOp {
        match self {
            StoreCall::ListLeads(_) => StoreOp::ListLeads,
            StoreCall::LeadStats => StoreOp::LeadStats,
            StoreCall::CreateLead(_) => StoreOp::CreateLead,
            StoreCall::UpdateLead(_) => StoreOp::UpdateLead,
            StoreCall::DeleteLead(_) => StoreOp::DeleteLead,
            StoreCall::UpdateLeadStatus(..) => StoreOp::UpdateLeadStatus,
            StoreCall::ImportLeads(_) => StoreOp::ImportLeads,
            StoreCall::ListUsers(_) => StoreOp::ListUsers,
        }
    }
}

/// Initial contents, as read from a JSON seed file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub branches: Vec<Branch>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub leads: Vec<Lead>,
}

#[derive(Default)]
struct Data {
    branches: Vec<Branch>,
    users: Vec<User>,
    leads: Vec<Lead>,
}

/// In-process lead store with a request journal plus failure and latency injection.
#[derive(Default)]
pub struct MemoryLeadStore {
    data: Mutex<Data>,
    journal: Mutex<Vec<StoreCall>>,
    failures: Mutex<HashMap<StoreOp, VecDeque<StoreError>>>,
    delays: Mutex<HashMap<StoreOp, VecDeque<Duration>>>,
}

fn guard<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// Random 24-hex-char id, the shape the dashboard validates by default.
pub fn new_object_id() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 12] = rng.random();
    hex::encode(bytes)
}

impl MemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: SeedData) -> Self {
        let store = Self::new();
        {
            let mut data = guard(&store.data);
            data.branches = seed.branches;
            data.users = seed.users;
            data.leads = seed.leads;
        }
        store
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let seed: SeedData = serde_json::from_str(json)?;
        Ok(Self::from_seed(seed))
    }

    pub fn insert_lead(&self, lead: Lead) {
        guard(&self.data).leads.push(lead);
    }

    pub fn insert_user(&self, user: User) {
        guard(&self.data).users.push(user);
    }

    pub fn branches(&self) -> Vec<Branch> {
        guard(&self.data).branches.clone()
    }

    pub fn users(&self) -> Vec<User> {
        guard(&self.data).users.clone()
    }

    pub fn lead(&self, id: &str) -> Option<Lead> {
        guard(&self.data).leads.iter().find(|l| l.id == id).cloned()
    }

    pub fn lead_count(&self) -> usize {
        guard(&self.data).leads.len()
    }

    /// Every call received so far, oldest first.
    pub fn journal(&self) -> Vec<StoreCall> {
        guard(&self.journal).clone()
    }

    pub fn calls_to(&self, op: StoreOp) -> usize {
        guard(&self.journal).iter().filter(|c| c.op() == op).count()
    }

    /// The `ListLeads` queries received so far, oldest first.
    pub fn list_queries(&self) -> Vec<ListQuery> {
        guard(&self.journal)
            .iter()
            .filter_map(|c| match c {
                StoreCall::ListLeads(q) => Some(q.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear_journal(&self) {
        guard(&self.journal).clear();
    }

    /// Make the next call of `op` fail. `None` sends no message.
    pub fn fail_next(&self, op: StoreOp, message: Option<&str>) {
        let err = match message {
            Some(m) => StoreError::new(m),
            None => StoreError::silent(),
        };
        guard(&self.failures).entry(op).or_default().push_back(err);
    }

    /// Hold the next call of `op` for `delay` before answering.
    pub fn delay_next(&self, op: StoreOp, delay: Duration) {
        guard(&self.delays).entry(op).or_default().push_back(delay);
    }

    /// Journal the call, apply any queued latency, then pop any queued failure.
    async fn enter(&self, call: StoreCall) -> StoreResult<()> {
        let op = call.op();
        guard(&self.journal).push(call);
        let delay = guard(&self.delays).get_mut(&op).and_then(VecDeque::pop_front);
        if let Some(d) = delay {
            tokio::time::sleep(d).await;
        }
        let failure = guard(&self.failures).get_mut(&op).and_then(VecDeque::pop_front);
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn matches_search(lead: &Lead, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let needle = needle.to_lowercase();
    lead.name.to_lowercase().contains(&needle)
        || lead.phone.contains(&needle)
        || lead.email.to_lowercase().contains(&needle)
}

fn matches_query(lead: &Lead, q: &ListQuery) -> bool {
    matches_search(lead, q.search.trim())
        && q.lead_status.is_none_or(|s| lead.lead_status == s)
        && q
            .dispatched_from
            .as_deref()
            .is_none_or(|b| reference_id(&lead.dispatched_from) == Some(b))
        && q
            .created_by
            .as_deref()
            .is_none_or(|u| reference_id(&lead.created_by) == Some(u))
}

fn apply_draft(lead: &mut Lead, draft: &LeadDraft) {
    lead.name = draft.name.trim().to_string();
    lead.phone = draft.phone.trim().to_string();
    lead.email = draft.email.trim().to_string();
    if let Some(status) = draft.lead_status {
        lead.lead_status = status;
    }
    if let Some(priority) = draft.priority {
        lead.priority = priority;
    }
    if let Some(branch) = &draft.dispatched_from {
        lead.dispatched_from = Some(Reference::Id(branch.clone()));
    }
    for (k, v) in &draft.details {
        lead.details.insert(k.clone(), v.clone());
    }
}

fn validate_draft(draft: &LeadDraft) -> StoreResult<()> {
    if draft.name.trim().is_empty() {
        return Err(StoreError::new("Customer name is required"));
    }
    if draft.phone.trim().is_empty() {
        return Err(StoreError::new("Phone number is required"));
    }
    Ok(())
}

/// Column positions taken from the header row.
struct Columns {
    name: usize,
    phone: usize,
    email: Option<usize>,
    priority: Option<usize>,
    status: Option<usize>,
    branch: Option<usize>,
}

impl Columns {
    fn from_header(header: &str) -> StoreResult<Columns> {
        let cols: Vec<String> = header.split(',').map(|c| c.trim().to_lowercase()).collect();
        let find = |name: &str| cols.iter().position(|c| c == name);
        let name = find("name").ok_or_else(|| StoreError::new("Missing 'name' column"))?;
        let phone = find("phone").ok_or_else(|| StoreError::new("Missing 'phone' column"))?;
        Ok(Columns {
            name,
            phone,
            email: find("email"),
            priority: find("priority"),
            status: find("status"),
            branch: find("branch"),
        })
    }
}

fn cell<'a>(cells: &[&'a str], idx: Option<usize>) -> &'a str {
    idx.and_then(|i| cells.get(i)).map(|c| c.trim()).unwrap_or("")
}

impl LeadStore for MemoryLeadStore {
    async fn list_leads(&self, query: &ListQuery) -> StoreResult<LeadPage> {
        self.enter(StoreCall::ListLeads(query.clone())).await?;

        let limit = query.limit.max(1);
        let page = query.page.max(1);
        let data = guard(&self.data);
        let mut matching: Vec<&Lead> = data.leads.iter().filter(|l| matches_query(l, query)).collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len();
        let leads = matching
            .into_iter()
            .skip((page - 1) * limit)
            .take(limit)
            .cloned()
            .collect();

        Ok(LeadPage {
            leads,
            pagination: ServerPageMeta {
                total_pages: total.div_ceil(limit),
                total_leads: total,
            },
        })
    }

    async fn lead_stats(&self) -> StoreResult<LeadStats> {
        self.enter(StoreCall::LeadStats).await?;

        let data = guard(&self.data);
        let leads_by_status = LeadStatus::ALL
            .into_iter()
            .filter_map(|status| {
                let count = data.leads.iter().filter(|l| l.lead_status == status).count() as u64;
                (count > 0).then_some(StatusCount { status, count })
            })
            .collect();
        Ok(LeadStats {
            leads_by_status,
            total_leads: data.leads.len() as u64,
        })
    }

    async fn create_lead(&self, draft: &LeadDraft) -> StoreResult<Lead> {
        self.enter(StoreCall::CreateLead(draft.name.clone())).await?;
        validate_draft(draft)?;

        let mut lead = Lead {
            id: new_object_id(),
            name: String::new(),
            phone: String::new(),
            email: String::new(),
            lead_status: LeadStatus::default(),
            priority: Priority::default(),
            dispatched_from: None,
            created_by: draft.created_by.as_deref().map(Reference::from),
            created_at: Utc::now(),
            details: Default::default(),
        };
        apply_draft(&mut lead, draft);
        guard(&self.data).leads.push(lead.clone());
        Ok(lead)
    }

    async fn update_lead(&self, id: &str, draft: &LeadDraft) -> StoreResult<Lead> {
        self.enter(StoreCall::UpdateLead(id.to_string())).await?;
        validate_draft(draft)?;

        let mut data = guard(&self.data);
        let lead = data
            .leads
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| StoreError::new("Lead not found"))?;
        apply_draft(lead, draft);
        Ok(lead.clone())
    }

    async fn delete_lead(&self, id: &str) -> StoreResult<()> {
        self.enter(StoreCall::DeleteLead(id.to_string())).await?;

        let mut data = guard(&self.data);
        let before = data.leads.len();
        data.leads.retain(|l| l.id != id);
        if data.leads.len() == before {
            return Err(StoreError::new("Lead not found"));
        }
        Ok(())
    }

    async fn update_lead_status(&self, id: &str, status: LeadStatus) -> StoreResult<Lead> {
        self.enter(StoreCall::UpdateLeadStatus(id.to_string(), status)).await?;

        let mut data = guard(&self.data);
        let lead = data
            .leads
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| StoreError::new("Lead not found"))?;
        lead.lead_status = status;
        Ok(lead.clone())
    }

    async fn import_leads(&self, file: &ImportFile) -> StoreResult<ImportReport> {
        self.enter(StoreCall::ImportLeads(file.file_name.clone())).await?;

        let text = std::str::from_utf8(&file.content)
            .map_err(|_| StoreError::new("File is not valid UTF-8 text"))?;
        let mut lines = text.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());
        let (_, header) = lines.next().ok_or_else(|| StoreError::new("File is empty"))?;
        let cols = Columns::from_header(header)?;

        let mut data = guard(&self.data);
        let mut seen: HashSet<String> = data.leads.iter().map(|l| l.phone.clone()).collect();
        let mut report = ImportReport::default();

        for (idx, line) in lines {
            // Spreadsheet numbering: the header is row 1.
            let row = idx + 1;
            let cells: Vec<&str> = line.split(',').collect();
            let name = cell(&cells, Some(cols.name));
            let phone = cell(&cells, Some(cols.phone));
            if name.is_empty() || phone.is_empty() {
                report.errors.push(ImportRowError { row, reason: "name and phone are required".into() });
                continue;
            }

            let priority = match cell(&cells, cols.priority) {
                "" => Priority::Medium,
                p => match Priority::parse(p) {
                    Some(p) => p,
                    None => {
                        report.errors.push(ImportRowError { row, reason: format!("unknown priority '{p}'") });
                        continue;
                    }
                },
            };
            let status = match cell(&cells, cols.status) {
                "" => LeadStatus::NewLead,
                s => match LeadStatus::parse(s) {
                    Some(s) => s,
                    None => {
                        report.errors.push(ImportRowError { row, reason: format!("unknown status '{s}'") });
                        continue;
                    }
                },
            };

            if !seen.insert(phone.to_string()) {
                report.duplicates.push(ImportDuplicate { row, phone: phone.to_string() });
                continue;
            }

            let branch = cell(&cells, cols.branch);
            data.leads.push(Lead {
                id: new_object_id(),
                name: name.to_string(),
                phone: phone.to_string(),
                email: cell(&cells, cols.email).to_string(),
                lead_status: status,
                priority,
                dispatched_from: (!branch.is_empty()).then(|| Reference::from(branch)),
                created_by: file.uploaded_by.as_deref().map(Reference::from),
                created_at: Utc::now(),
                details: Default::default(),
            });
            report.inserted += 1;
        }

        Ok(report)
    }

    async fn list_users(&self, query: &UserQuery) -> StoreResult<Vec<User>> {
        self.enter(StoreCall::ListUsers(query.clone())).await?;

        let data = guard(&self.data);
        Ok(data
            .users
            .iter()
            .filter(|u| query.branch.as_deref().is_none_or(|b| u.branch_id() == Some(b)))
            .take(query.limit.max(1))
            .cloned()
            .collect())
    }
}
