//! User record endpoints.

use actix_web::{web, HttpResponse};
use ethers::types::Address;
use serde::Deserialize;
use serde_json::json;

use crate::models::SUBSCRIPTION_TIERS;
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/users")
            .route("", web::post().to(create_user))
            .route("", web::get().to(list_users))
            .route("/{wallet}", web::get().to(get_user))
            .route("/{wallet}/tier", web::put().to(update_tier))
            .route("/{wallet}/credits", web::post().to(adjust_credits)),
    );
}

fn validate_wallet(wallet: &str) -> Result<(), HttpResponse> {
    if wallet.parse::<Address>().is_err() {
        return Err(HttpResponse::BadRequest().json(json!({
            "error": format!("Invalid wallet address: {}", wallet)
        })));
    }
    Ok(())
}

#[derive(Deserialize)]
struct CreateUserRequest {
    wallet_address: String,
    discord_id: Option<String>,
    telegram_id: Option<String>,
}

/// POST /api/users — create-on-first-contact (idempotent)
async fn create_user(state: web::Data<AppState>, body: web::Json<CreateUserRequest>) -> HttpResponse {
    if let Err(resp) = validate_wallet(&body.wallet_address) {
        return resp;
    }

    match state.db.ensure_user(
        &body.wallet_address,
        body.discord_id.as_deref(),
        body.telegram_id.as_deref(),
    ) {
        Ok(user) => HttpResponse::Ok().json(user),
        Err(e) => HttpResponse::InternalServerError().json(json!({
            "error": format!("Failed to create user: {}", e)
        })),
    }
}

async fn list_users(state: web::Data<AppState>) -> HttpResponse {
    match state.db.list_users() {
        Ok(users) => HttpResponse::Ok().json(users),
        Err(e) => HttpResponse::InternalServerError().json(json!({
            "error": format!("Failed to list users: {}", e)
        })),
    }
}

async fn get_user(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let wallet = path.into_inner();
    match state.db.get_user(&wallet) {
        Ok(Some(user)) => HttpResponse::Ok().json(user),
        Ok(None) => HttpResponse::NotFound().json(json!({
            "error": format!("No user for wallet {}", wallet)
        })),
        Err(e) => HttpResponse::InternalServerError().json(json!({
            "error": format!("Failed to read user: {}", e)
        })),
    }
}

#[derive(Deserialize)]
struct UpdateTierRequest {
    tier: String,
}

/// PUT /api/users/{wallet}/tier
async fn update_tier(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdateTierRequest>,
) -> HttpResponse {
    let wallet = path.into_inner();
    let tier = body.tier.to_lowercase();

    if !SUBSCRIPTION_TIERS.contains(&tier.as_str()) {
        return HttpResponse::BadRequest().json(json!({
            "error": format!("Unknown tier '{}'. Must be one of: {}", tier, SUBSCRIPTION_TIERS.join(", "))
        }));
    }

    match state.db.update_user_tier(&wallet, &tier) {
        Ok(Some(user)) => HttpResponse::Ok().json(user),
        Ok(None) => HttpResponse::NotFound().json(json!({
            "error": format!("No user for wallet {}", wallet)
        })),
        Err(e) => HttpResponse::InternalServerError().json(json!({
            "error": format!("Failed to update tier: {}", e)
        })),
    }
}

#[derive(Deserialize)]
struct AdjustCreditsRequest {
    delta: i64,
}

/// POST /api/users/{wallet}/credits — adjust balance by a signed delta
async fn adjust_credits(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<AdjustCreditsRequest>,
) -> HttpResponse {
    let wallet = path.into_inner();

    match state.db.adjust_user_credits(&wallet, body.delta) {
        Ok(Some(user)) => HttpResponse::Ok().json(user),
        Ok(None) => HttpResponse::NotFound().json(json!({
            "error": format!("No user for wallet {}", wallet)
        })),
        Err(e) => HttpResponse::InternalServerError().json(json!({
            "error": format!("Failed to adjust credits: {}", e)
        })),
    }
}
