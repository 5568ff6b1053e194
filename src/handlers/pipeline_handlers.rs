use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde::Deserialize;

use super::{AppRegistry, current_session};
use crate::errors::AppError;

/// GET /leads/pipeline
pub async fn board(registry: web::Data<AppRegistry>, session: Session) -> Result<HttpResponse, AppError> {
    let dashboard = current_session(&registry, &session)?;
    Ok(HttpResponse::Ok().json(dashboard.pipeline()))
}

#[derive(Debug, Deserialize)]
pub struct DragRequest {
    pub lead_id: String,
}

/// POST /leads/pipeline/drag
pub async fn drag(
    registry: web::Data<AppRegistry>,
    session: Session,
    body: web::Json<DragRequest>,
) -> Result<HttpResponse, AppError> {
    let dashboard = current_session(&registry, &session)?;
    let drag = dashboard.begin_drag(&body.lead_id)?;
    Ok(HttpResponse::Ok().json(drag))
}

#[derive(Debug, Deserialize)]
pub struct DropRequest {
    pub lane: String,
}

/// POST /leads/pipeline/drop - `moved` is false for a same-lane drop.
pub async fn drop_on(
    registry: web::Data<AppRegistry>,
    session: Session,
    body: web::Json<DropRequest>,
) -> Result<HttpResponse, AppError> {
    let dashboard = current_session(&registry, &session)?;
    let outcome = dashboard.drop_on(&body.lane).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "moved": outcome.is_some(),
        "outcome": outcome,
        "board": dashboard.pipeline(),
    })))
}
