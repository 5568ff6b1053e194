use serde::{Deserialize, Serialize};

use super::lead::Reference;

/// Session role labels. Only `admin` changes what the lead list shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    SalesExecutive,
    AccountsManager,
    ProductionManager,
    #[serde(other)]
    Other,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub branch: Option<Reference>,
    pub role: Role,
}

impl User {
    pub fn branch_id(&self) -> Option<&str> {
        self.branch.as_ref().and_then(Reference::id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}
