use std::time::Duration;

use crate::models::lead::LeadIdFormat;

/// Runtime settings, read from the environment (and `.env` when present).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub page_size: usize,
    pub scoped_fetch_limit: usize,
    pub employee_fetch_limit: usize,
    pub notice_ttl: Duration,
    pub id_format: LeadIdFormat,
    pub seed_path: Option<String>,
    pub session_key: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            bind_addr: "127.0.0.1:8080".to_string(),
            page_size: 10,
            scoped_fetch_limit: 10_000,
            employee_fetch_limit: 1_000,
            notice_ttl: Duration::from_secs(5),
            id_format: LeadIdFormat::ObjectId,
            seed_path: None,
            session_key: None,
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(v) => match v.trim().parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                log::warn!("{key}={v:?} is not valid, using default");
                default
            }
        },
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let d = AppConfig::default();

        let id_format = match get("LEADS_ID_FORMAT") {
            None => d.id_format,
            Some(v) => LeadIdFormat::from_setting(&v).unwrap_or_else(|| {
                log::warn!("LEADS_ID_FORMAT={v:?} is not valid, using object_id");
                d.id_format
            }),
        };

        AppConfig {
            bind_addr: get("BIND_ADDR").filter(|v| !v.trim().is_empty()).unwrap_or(d.bind_addr),
            page_size: parse_or("LEADS_PAGE_SIZE", get("LEADS_PAGE_SIZE"), d.page_size).clamp(1, 100),
            scoped_fetch_limit: parse_or(
                "LEADS_SCOPED_FETCH_LIMIT",
                get("LEADS_SCOPED_FETCH_LIMIT"),
                d.scoped_fetch_limit,
            )
            .max(1),
            employee_fetch_limit: parse_or(
                "LEADS_EMPLOYEE_FETCH_LIMIT",
                get("LEADS_EMPLOYEE_FETCH_LIMIT"),
                d.employee_fetch_limit,
            )
            .max(1),
            notice_ttl: Duration::from_secs(parse_or(
                "LEADS_NOTICE_TTL_SECS",
                get("LEADS_NOTICE_TTL_SECS"),
                d.notice_ttl.as_secs(),
            )),
            id_format,
            seed_path: get("LEADS_SEED_PATH").filter(|v| !v.trim().is_empty()),
            session_key: get("SESSION_KEY"),
        }
    }
}
