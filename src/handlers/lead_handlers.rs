use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::{Deserialize, Serialize};

use super::{AppRegistry, current_session};
use crate::dashboard::{Dialog, LeadView, MutationOutcome, Navigation};
use crate::errors::{AppError, LeadError};
use crate::models::lead::{ImportFile, LeadDraft, LeadStatus};

/// Query string of `GET /leads`. Absent fields leave the control as it is.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<usize>,
    pub search: Option<String>,
    /// A status value, or `all` / empty to clear the filter.
    pub status: Option<String>,
    /// A branch id, or empty to clear the filter.
    pub branch: Option<String>,
    /// A creator's user id, or empty to clear the filter.
    pub created_by: Option<String>,
    #[serde(default)]
    pub refresh: bool,
}

fn status_filter(raw: &str) -> Result<Option<LeadStatus>, AppError> {
    match raw.trim() {
        "" | "all" => Ok(None),
        s => LeadStatus::parse(s)
            .map(Some)
            .ok_or_else(|| AppError::Lead(LeadError::InvalidStatus(s.to_string()))),
    }
}

#[derive(Serialize)]
struct MutationResponse {
    outcome: MutationOutcome,
    view: LeadView,
}

/// GET /leads
pub async fn list(
    registry: web::Data<AppRegistry>,
    session: Session,
    query: web::Query<ListParams>,
) -> Result<HttpResponse, AppError> {
    let dashboard = current_session(&registry, &session)?;
    let params = query.into_inner();

    if params.refresh {
        dashboard.navigate(Navigation { refresh_requested: true }).await?;
        return Ok(HttpResponse::Ok().json(dashboard.view()));
    }

    let status = params.status.as_deref().map(status_filter).transpose()?;
    dashboard
        .apply_view(|v| {
            if let Some(search) = &params.search {
                if *search != v.search {
                    v.set_search(search);
                }
            }
            if let Some(status) = status {
                if status != v.status {
                    v.set_status(status);
                }
            }
            if let Some(branch) = &params.branch {
                let branch = Some(branch.clone()).filter(|b| !b.trim().is_empty());
                if branch != v.branch {
                    v.set_branch(branch);
                }
            }
            if let Some(created_by) = &params.created_by {
                let created_by = Some(created_by.clone()).filter(|c| !c.trim().is_empty());
                if created_by != v.created_by {
                    v.set_created_by(created_by);
                }
            }
            if let Some(page) = params.page {
                v.go_to(page);
            }
        })
        .await?;

    Ok(HttpResponse::Ok().json(dashboard.view()))
}

/// POST /leads
pub async fn create(
    registry: web::Data<AppRegistry>,
    session: Session,
    body: web::Json<LeadDraft>,
) -> Result<HttpResponse, AppError> {
    let dashboard = current_session(&registry, &session)?;
    let outcome = dashboard.create(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(MutationResponse { outcome, view: dashboard.view() }))
}

/// PUT /leads/{id}
pub async fn update(
    registry: web::Data<AppRegistry>,
    session: Session,
    path: web::Path<String>,
    body: web::Json<LeadDraft>,
) -> Result<HttpResponse, AppError> {
    let dashboard = current_session(&registry, &session)?;
    let outcome = dashboard.update(&path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MutationResponse { outcome, view: dashboard.view() }))
}

/// DELETE /leads/{id}
pub async fn delete(
    registry: web::Data<AppRegistry>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let dashboard = current_session(&registry, &session)?;
    let outcome = dashboard.delete(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MutationResponse { outcome, view: dashboard.view() }))
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

/// PUT /leads/{id}/status
pub async fn change_status(
    registry: web::Data<AppRegistry>,
    session: Session,
    path: web::Path<String>,
    body: web::Json<StatusRequest>,
) -> Result<HttpResponse, AppError> {
    let dashboard = current_session(&registry, &session)?;
    let outcome = dashboard.change_status(&path.into_inner(), &body.status).await?;
    Ok(HttpResponse::Ok().json(MutationResponse { outcome, view: dashboard.view() }))
}

#[derive(Debug, Deserialize)]
pub struct ImportParams {
    pub file_name: Option<String>,
}

/// POST /leads/import - body is the CSV file itself.
pub async fn import(
    registry: web::Data<AppRegistry>,
    session: Session,
    req: HttpRequest,
    query: web::Query<ImportParams>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let content_type = req
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if !content_type.starts_with("text/csv") {
        return Err(AppError::BadRequest("Content-Type must be text/csv for imports".to_string()));
    }
    if body.is_empty() {
        return Err(AppError::BadRequest("Import file is empty".to_string()));
    }

    let dashboard = current_session(&registry, &session)?;
    let file = ImportFile {
        file_name: query.into_inner().file_name.unwrap_or_else(|| "upload.csv".to_string()),
        content: body.to_vec(),
        uploaded_by: None,
    };
    let outcome = dashboard.import_batch(file).await?;
    Ok(HttpResponse::Ok().json(MutationResponse { outcome, view: dashboard.view() }))
}

/// POST /leads/dialog - open or close a modal. Closing is `{"kind": "closed"}`.
pub async fn dialog(
    registry: web::Data<AppRegistry>,
    session: Session,
    body: web::Json<Dialog>,
) -> Result<HttpResponse, AppError> {
    let dashboard = current_session(&registry, &session)?;
    match body.into_inner() {
        Dialog::Closed => dashboard.close_dialog(),
        dialog => dashboard.open_dialog(dialog),
    }
    Ok(HttpResponse::Ok().json(dashboard.view()))
}

/// DELETE /leads/notice
pub async fn dismiss_notice(registry: web::Data<AppRegistry>, session: Session) -> Result<HttpResponse, AppError> {
    let dashboard = current_session(&registry, &session)?;
    dashboard.dismiss_notice();
    Ok(HttpResponse::Ok().json(dashboard.view()))
}
