use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use std::fmt;

use crate::store::StoreError;

/// Shown when the store rejects a call without saying why.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Failures raised by the lead dashboard core.
#[derive(Debug, Clone, PartialEq)]
pub enum LeadError {
    /// The lead id failed the configured format check; nothing was sent.
    InvalidIdentifier(String),
    /// The requested status is not one of the known lead statuses.
    InvalidStatus(String),
    /// The store rejected the call. Carries the server message or the fallback.
    RemoteFailure(String),
    /// The admin's branch-employee lookup has not resolved yet.
    EmptyDependency,
    NotFound(String),
}

impl fmt::Display for LeadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeadError::InvalidIdentifier(id) => write!(f, "Invalid lead id '{id}'"),
            LeadError::InvalidStatus(s) => write!(f, "Unknown lead status '{s}'"),
            LeadError::RemoteFailure(msg) => write!(f, "{msg}"),
            LeadError::EmptyDependency => write!(f, "Branch employees are still loading"),
            LeadError::NotFound(id) => write!(f, "Lead '{id}' not found"),
        }
    }
}

impl std::error::Error for LeadError {}

impl From<StoreError> for LeadError {
    fn from(e: StoreError) -> Self {
        let msg = e
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE.to_string());
        LeadError::RemoteFailure(msg)
    }
}

/// Errors surfaced by the HTTP layer.
#[derive(Debug)]
pub enum AppError {
    Lead(LeadError),
    Session(String),
    BadRequest(String),
    NotFound,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Lead(e) => write!(f, "{e}"),
            AppError::Session(e) => write!(f, "Session error: {e}"),
            AppError::BadRequest(e) => write!(f, "Bad request: {e}"),
            AppError::NotFound => write!(f, "Not found"),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    details: String,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Lead(LeadError::InvalidIdentifier(_))
            | AppError::Lead(LeadError::InvalidStatus(_))
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Lead(LeadError::NotFound(_)) | AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Lead(LeadError::RemoteFailure(_)) => StatusCode::BAD_GATEWAY,
            AppError::Lead(LeadError::EmptyDependency) => StatusCode::CONFLICT,
            AppError::Session(_) => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status == StatusCode::BAD_GATEWAY {
            log::error!("{self}");
        }
        let error = match self {
            AppError::Lead(LeadError::InvalidIdentifier(_)) => "invalid_identifier",
            AppError::Lead(LeadError::InvalidStatus(_)) => "invalid_status",
            AppError::Lead(LeadError::RemoteFailure(_)) => "remote_failure",
            AppError::Lead(LeadError::EmptyDependency) => "loading",
            AppError::Lead(LeadError::NotFound(_)) | AppError::NotFound => "not_found",
            AppError::Session(_) => "session",
            AppError::BadRequest(_) => "bad_request",
        };
        HttpResponse::build(status).json(ErrorBody {
            error,
            details: self.to_string(),
        })
    }
}

impl From<LeadError> for AppError {
    fn from(e: LeadError) -> Self {
        AppError::Lead(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_keeps_server_message() {
        let e: LeadError = StoreError::new("Phone already registered").into();
        assert_eq!(e, LeadError::RemoteFailure("Phone already registered".into()));
    }

    #[test]
    fn store_error_without_message_uses_fallback() {
        let e: LeadError = StoreError::silent().into();
        assert_eq!(e.to_string(), GENERIC_FAILURE);

        let blank: LeadError = StoreError::new("   ").into();
        assert_eq!(blank.to_string(), GENERIC_FAILURE);
    }

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(
            AppError::Lead(LeadError::InvalidIdentifier("x".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Lead(LeadError::RemoteFailure("down".into())).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(AppError::Lead(LeadError::EmptyDependency).status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::Session("no".into()).status_code(), StatusCode::UNAUTHORIZED);
    }
}
