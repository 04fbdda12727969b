//! Agent settings controller — key/value config per agent, secrets sealed at
//! rest through the settings manager.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/settings/{agent}")
            .route("", web::get().to(list_settings))
            .route("", web::post().to(upsert_setting))
            .route("", web::delete().to(delete_setting)),
    );
}

fn validate_key(key: &str) -> Result<String, HttpResponse> {
    let key = key.trim().to_string();
    if key.is_empty() || key.len() > 128 {
        return Err(HttpResponse::BadRequest().json(json!({
            "error": "Key must be 1-128 characters"
        })));
    }
    if !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.') {
        return Err(HttpResponse::BadRequest().json(json!({
            "error": "Key must contain only letters, digits, underscores, and dots"
        })));
    }
    Ok(key)
}

/// GET /api/settings/{agent} — list with values decrypted
async fn list_settings(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let agent = path.into_inner();
    match state.settings.list(&agent) {
        Ok(settings) => HttpResponse::Ok().json(settings),
        Err(e) => HttpResponse::InternalServerError().json(json!({
            "error": e
        })),
    }
}

#[derive(Deserialize)]
struct UpsertRequest {
    key: String,
    value: String,
    #[serde(default)]
    secret: bool,
}

/// POST /api/settings/{agent} — upsert one key/value pair
async fn upsert_setting(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpsertRequest>,
) -> HttpResponse {
    let agent = path.into_inner();
    let key = match validate_key(&body.key) {
        Ok(k) => k,
        Err(resp) => return resp,
    };

    match state.settings.set(&agent, &key, &body.value, body.secret) {
        Ok(setting) => HttpResponse::Ok().json(json!({
            "agent_name": setting.agent_name,
            "key": setting.key,
            "encrypted": setting.encrypted,
        })),
        Err(e) => HttpResponse::InternalServerError().json(json!({
            "error": e
        })),
    }
}

#[derive(Deserialize)]
struct DeleteRequest {
    key: String,
}

/// DELETE /api/settings/{agent}
async fn delete_setting(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<DeleteRequest>,
) -> HttpResponse {
    let agent = path.into_inner();
    match state.settings.delete(&agent, body.key.trim()) {
        Ok(deleted) => HttpResponse::Ok().json(json!({
            "key": body.key.trim(),
            "deleted": deleted,
        })),
        Err(e) => HttpResponse::InternalServerError().json(json!({
            "error": e
        })),
    }
}
