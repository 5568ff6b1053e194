pub mod lead_handlers;
pub mod pipeline_handlers;
pub mod session_handlers;

use std::sync::Arc;

use actix_session::Session;
use actix_web::{
    Error, HttpResponse,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::{Next, from_fn},
    web,
};

use crate::auth::middleware::{SESSION_TOKEN_KEY, require_auth};
use crate::dashboard::{LeadSession, SessionRegistry};
use crate::errors::AppError;
use crate::store::MemoryLeadStore;

pub type AppRegistry = SessionRegistry<MemoryLeadStore>;
pub type AppSession = LeadSession<MemoryLeadStore>;

/// Resolve the dashboard session behind the cookie.
pub fn current_session(registry: &AppRegistry, session: &Session) -> Result<Arc<AppSession>, AppError> {
    let key = session
        .get::<String>(SESSION_TOKEN_KEY)
        .map_err(|e| AppError::Session(e.to_string()))?
        .ok_or_else(|| AppError::Session("No dashboard session".to_string()))?;
    registry
        .get(&key)
        .ok_or_else(|| AppError::Session("Dashboard session expired".to_string()))
}

/// Rejects POST/PUT/DELETE requests that are not `application/json`.
/// A cross-origin form post cannot send JSON with cookies attached.
async fn require_json_content_type(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let method = req.method().clone();

    if method == actix_web::http::Method::POST
        || method == actix_web::http::Method::PUT
        || method == actix_web::http::Method::DELETE
    {
        let content_type = req
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if !content_type.starts_with("application/json") {
            let body = serde_json::json!({
                "error": "bad_request",
                "details": "Content-Type must be application/json for mutation requests",
            });
            let response = HttpResponse::BadRequest().json(body);
            return Ok(req.into_response(response).map_into_right_body());
        }
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}

/// Register the dashboard routes. `/leads/import` is registered ahead of the
/// JSON-only scope since it takes a CSV body.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/session")
            .wrap(from_fn(require_json_content_type))
            .route("", web::post().to(session_handlers::login))
            .route("/logout", web::post().to(session_handlers::logout)),
    );
    cfg.service(
        web::resource("/leads/import")
            .wrap(from_fn(require_auth))
            .route(web::post().to(lead_handlers::import)),
    );
    cfg.service(
        web::scope("/leads")
            .wrap(from_fn(require_json_content_type))
            .wrap(from_fn(require_auth))
            .route("", web::get().to(lead_handlers::list))
            .route("", web::post().to(lead_handlers::create))
            .route("/dialog", web::post().to(lead_handlers::dialog))
            .route("/notice", web::delete().to(lead_handlers::dismiss_notice))
            .route("/pipeline", web::get().to(pipeline_handlers::board))
            .route("/pipeline/drag", web::post().to(pipeline_handlers::drag))
            .route("/pipeline/drop", web::post().to(pipeline_handlers::drop_on))
            .route("/{id}", web::put().to(lead_handlers::update))
            .route("/{id}", web::delete().to(lead_handlers::delete))
            .route("/{id}/status", web::put().to(lead_handlers::change_status)),
    );
}
