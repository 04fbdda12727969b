use actix_web::{web, HttpResponse, Responder};

use crate::telemetry;
use crate::AppState;

/// Version from Cargo.toml, available at compile time
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/health").route(web::get().to(health_check)));
    cfg.service(web::resource("/api/version").route(web::get().to(get_version)));
    cfg.service(web::resource("/api/health/config").route(web::get().to(get_config_status)));
    cfg.service(web::resource("/api/health/events").route(web::get().to(get_health_events)));
}

async fn health_check(state: web::Data<AppState>) -> impl Responder {
    telemetry::record_health_event(&state.db, log::Level::Debug, "health", "health check");

    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "version": VERSION
    }))
}

async fn get_version() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "version": VERSION
    }))
}

async fn get_config_status(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "rpc_url": state.config.rpc_url,
        "nft_contract": state.config.nft_contract,
        "admin_token_count": state.verifier.admin_token_ids().len(),
        "settings_encryption": state.settings.has_cipher(),
        "content_webhook_configured": state.config.content_webhook_url.is_some(),
    }))
}

async fn get_health_events(state: web::Data<AppState>) -> impl Responder {
    match state.db.recent_health_events(100) {
        Ok(events) => HttpResponse::Ok().json(events),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to list health events: {}", e)
        })),
    }
}
