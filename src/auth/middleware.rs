use actix_session::SessionExt;
use actix_web::{
    Error, HttpResponse,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
};

/// Cookie-session entry holding the dashboard session token.
pub const SESSION_TOKEN_KEY: &str = "dashboard_key";

/// Rejects requests that carry no dashboard session token with 401.
pub async fn require_auth(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let session = req.get_session();
    let has_token = session.get::<String>(SESSION_TOKEN_KEY).unwrap_or(None).is_some();

    if !has_token {
        let body = serde_json::json!({
            "error": "session",
            "details": "Sign in first",
        });
        let response = HttpResponse::Unauthorized().json(body);
        return Ok(req.into_response(response).map_into_right_body());
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}
