use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Pipeline position of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    #[default]
    NewLead,
    NotAnswered,
    Qualified,
    Pending,
    OrderCompleted,
    Unqualified,
}

impl LeadStatus {
    /// Lane order used by the pipeline board and the status counts.
    pub const ALL: [LeadStatus; 6] = [
        LeadStatus::NewLead,
        LeadStatus::NotAnswered,
        LeadStatus::Qualified,
        LeadStatus::Pending,
        LeadStatus::OrderCompleted,
        LeadStatus::Unqualified,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::NewLead => "new_lead",
            LeadStatus::NotAnswered => "not_answered",
            LeadStatus::Qualified => "qualified",
            LeadStatus::Pending => "pending",
            LeadStatus::OrderCompleted => "order_completed",
            LeadStatus::Unqualified => "unqualified",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LeadStatus::NewLead => "New Lead",
            LeadStatus::NotAnswered => "Not Answered",
            LeadStatus::Qualified => "Qualified",
            LeadStatus::Pending => "Pending",
            LeadStatus::OrderCompleted => "Order Completed",
            LeadStatus::Unqualified => "Unqualified",
        }
    }

    pub fn parse(s: &str) -> Option<LeadStatus> {
        let s = s.trim();
        LeadStatus::ALL.into_iter().find(|st| st.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn parse(s: &str) -> Option<Priority> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

/// A branch or user reference as the store returns it: a bare id, or an
/// expanded document carrying the id and a display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reference {
    Id(String),
    Expanded {
        #[serde(rename = "_id")]
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    /// Anything else the store sent. Never resolves to an id.
    Malformed(Value),
}

impl Reference {
    pub fn id(&self) -> Option<&str> {
        match self {
            Reference::Id(id) | Reference::Expanded { id, .. } => {
                let id = id.trim();
                if id.is_empty() { None } else { Some(id) }
            }
            Reference::Malformed(_) => None,
        }
    }
}

impl From<&str> for Reference {
    fn from(id: &str) -> Self {
        Reference::Id(id.to_string())
    }
}

/// Resolve an optional reference to its id. Missing or malformed gives `None`.
pub fn reference_id(r: &Option<Reference>) -> Option<&str> {
    r.as_ref().and_then(Reference::id)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub lead_status: LeadStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub dispatched_from: Option<Reference>,
    #[serde(default)]
    pub created_by: Option<Reference>,
    pub created_at: DateTime<Utc>,
    /// Address, health issues, products, payment, reminders: carried through untouched.
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Field set submitted by the create and edit forms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadDraft {
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub lead_status: Option<LeadStatus>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub dispatched_from: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCount {
    #[serde(rename = "_id")]
    pub status: LeadStatus,
    pub count: u64,
}

/// Aggregate counts reported by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadStats {
    pub leads_by_status: Vec<StatusCount>,
    #[serde(default)]
    pub total_leads: u64,
}

/// An uploaded spreadsheet handed to the store as-is.
#[derive(Debug, Clone)]
pub struct ImportFile {
    pub file_name: String,
    pub content: Vec<u8>,
    pub uploaded_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRowError {
    pub row: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportDuplicate {
    pub row: usize,
    pub phone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub inserted: usize,
    #[serde(default)]
    pub errors: Vec<ImportRowError>,
    #[serde(default)]
    pub duplicates: Vec<ImportDuplicate>,
}

impl ImportReport {
    /// Some rows were rejected or skipped, but the import itself went through.
    pub fn is_partial(&self) -> bool {
        !self.errors.is_empty() || !self.duplicates.is_empty()
    }

    pub fn summary(&self) -> String {
        let noun = if self.inserted == 1 { "lead" } else { "leads" };
        if self.is_partial() {
            format!(
                "Imported {} {noun} ({} errors, {} duplicates skipped)",
                self.inserted,
                self.errors.len(),
                self.duplicates.len()
            )
        } else {
            format!("Imported {} {noun}", self.inserted)
        }
    }
}
