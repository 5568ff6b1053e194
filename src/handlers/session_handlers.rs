use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde::Deserialize;

use super::AppRegistry;
use crate::auth::middleware::SESSION_TOKEN_KEY;
use crate::dashboard::SessionUser;
use crate::errors::AppError;
use crate::store::{LeadStore, UserQuery};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub user_id: String,
}

/// POST /session - open a dashboard session for a known user and mount it.
pub async fn login(
    registry: web::Data<AppRegistry>,
    session: Session,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let users = registry
        .store()
        .list_users(&UserQuery { branch: None, limit: usize::MAX })
        .await
        .map_err(|e| AppError::Lead(e.into()))?;
    let user = users
        .iter()
        .find(|u| u.id == body.user_id)
        .ok_or_else(|| AppError::Session(format!("Unknown user '{}'", body.user_id)))?;

    // Replace any session this cookie already had.
    if let Ok(Some(old)) = session.get::<String>(SESSION_TOKEN_KEY) {
        registry.close(&old);
    }

    let (key, dashboard) = registry.open(SessionUser::from(user));
    session
        .insert(SESSION_TOKEN_KEY, &key)
        .map_err(|e| AppError::Session(e.to_string()))?;

    // A failed first load still leaves a usable session; the view carries the notice.
    if let Err(e) = dashboard.mount().await {
        log::warn!("Initial dashboard load failed for {}: {e}", user.id);
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "user": dashboard.user(),
        "view": dashboard.view(),
    })))
}

/// POST /session/logout
pub async fn logout(registry: web::Data<AppRegistry>, session: Session) -> Result<HttpResponse, AppError> {
    if let Ok(Some(key)) = session.get::<String>(SESSION_TOKEN_KEY) {
        registry.close(&key);
    }
    session.purge();
    Ok(HttpResponse::NoContent().finish())
}
