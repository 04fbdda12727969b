//! Wallet verification endpoint.

use actix_web::{web, HttpResponse};
use ethers::types::Address;

use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/verify/{wallet}").route(web::get().to(verify_wallet)));
}

/// GET /api/verify/{wallet} — run the on-chain ownership check.
///
/// Always answers 200 with a best-effort result object; individual RPC
/// failures are logged server-side and never surface as 5xx. Only a
/// malformed wallet address is a client error.
async fn verify_wallet(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let wallet_str = path.into_inner();

    let wallet: Address = match wallet_str.parse() {
        Ok(a) => a,
        Err(_) => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": format!("Invalid wallet address: {}", wallet_str)
            }));
        }
    };

    let check = state.verifier.verify_admin_status(wallet).await;

    HttpResponse::Ok().json(serde_json::json!({
        "wallet": wallet_str.to_lowercase(),
        "contract": format!("{:?}", state.verifier.contract()),
        "is_admin": check.is_admin,
        "is_holder": check.is_holder,
        "admin_token_id": check.admin_token_id,
        "owned_tokens": check.owned_tokens,
    }))
}
