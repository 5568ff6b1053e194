/// Shape check applied to lead ids before any store call.
#[derive(Debug, Clone, Copy)]
pub enum LeadIdFormat {
    /// 24 hexadecimal characters (document-database object ids).
    ObjectId,
    /// Any non-blank id.
    Any,
    Custom(fn(&str) -> bool),
}

impl Default for LeadIdFormat {
    fn default() -> Self {
        LeadIdFormat::ObjectId
    }
}

impl LeadIdFormat {
    pub fn is_valid(&self, id: &str) -> bool {
        match self {
            LeadIdFormat::ObjectId => id.len() == 24 && id.bytes().all(|b| b.is_ascii_hexdigit()),
            LeadIdFormat::Any => !id.trim().is_empty(),
            LeadIdFormat::Custom(check) => check(id),
        }
    }

    /// Parse the `LEADS_ID_FORMAT` setting.
    pub fn from_setting(s: &str) -> Option<LeadIdFormat> {
        match s.trim() {
            "object_id" => Some(LeadIdFormat::ObjectId),
            "any" => Some(LeadIdFormat::Any),
            _ => None,
        }
    }
}
