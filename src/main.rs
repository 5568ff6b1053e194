use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{App, HttpServer, cookie::Key, middleware, web};

use leaddesk::config::AppConfig;
use leaddesk::dashboard::{SessionRegistry, SessionSettings};
use leaddesk::handlers;
use leaddesk::store::MemoryLeadStore;

const DEFAULT_SEED: &str = include_str!("../data/seed/leads.json");

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let config = AppConfig::from_env();

    let seed = match &config.seed_path {
        Some(path) => {
            log::info!("Seeding lead store from {path}");
            std::fs::read_to_string(path)?
        }
        None => DEFAULT_SEED.to_string(),
    };
    let store = MemoryLeadStore::from_json(&seed)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    log::info!(
        "Lead store ready with {} leads, {} users and {} branches",
        store.lead_count(),
        store.users().len(),
        store.branches().len()
    );

    let registry = web::Data::new(SessionRegistry::new(Arc::new(store), SessionSettings::from(&config)));

    // Session encryption key. Load from SESSION_KEY for sessions that survive restarts
    let secret_key = match &config.session_key {
        Some(val) if val.len() >= 64 => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(val.as_bytes())
        }
        Some(val) => {
            log::warn!("SESSION_KEY too short ({} bytes, need 64+), generating random key", val.len());
            Key::generate()
        }
        None => {
            log::warn!("No SESSION_KEY set, generating random key (sessions lost on restart)");
            Key::generate()
        }
    };

    log::info!("Starting server at http://{}", config.bind_addr);

    HttpServer::new(move || {
        let session_mw = SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
            .cookie_secure(false)
            .cookie_http_only(true)
            .build();

        App::new()
            .wrap(session_mw)
            .wrap(middleware::Logger::default())
            .app_data(registry.clone())
            .configure(handlers::configure)
            .default_service(web::to(|| async {
                actix_web::HttpResponse::NotFound().json(serde_json::json!({
                    "error": "not_found",
                    "details": "Not found",
                }))
            }))
    })
    .bind(config.bind_addr.as_str())?
    .run()
    .await
}
