//! Agent endpoints: persona listing and the pass-through message endpoint.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::tools::ToolContext;
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/agents").route(web::get().to(list_agents)));
    cfg.service(web::resource("/api/agent").route(web::post().to(agent_message)));
    cfg.service(web::resource("/api/tools").route(web::get().to(list_tools)));
}

async fn list_agents(state: web::Data<AppState>) -> HttpResponse {
    let personas: Vec<_> = state
        .personas
        .list()
        .iter()
        .map(|p| {
            json!({
                "name": p.name,
                "description": p.description,
                "instructions": p.instructions,
                "tools": p.tools,
                "keywords": p.keywords,
            })
        })
        .collect();
    HttpResponse::Ok().json(personas)
}

async fn list_tools(state: web::Data<AppState>) -> HttpResponse {
    let tools: Vec<_> = state
        .tool_registry
        .get_tool_definitions()
        .into_iter()
        .map(|d| {
            json!({
                "name": d.name,
                "description": d.description,
                "group": d.group.as_str(),
                "input_schema": d.input_schema,
            })
        })
        .collect();
    HttpResponse::Ok().json(tools)
}

#[derive(Deserialize)]
struct AgentMessageRequest {
    message: String,
    wallet_address: Option<String>,
    discord_id: Option<String>,
    telegram_id: Option<String>,
}

/// POST /api/agent — the pass-through agent endpoint.
///
/// Ensures the user record exists (first contact), routes the message to a
/// persona by keyword, and runs the persona's verification tool when the
/// payload carries a wallet.
async fn agent_message(
    state: web::Data<AppState>,
    body: web::Json<AgentMessageRequest>,
) -> HttpResponse {
    if body.message.trim().is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "error": "'message' must not be empty"
        }));
    }

    // First contact creates the user row; later contacts are idempotent
    if let Some(wallet) = &body.wallet_address {
        if wallet.parse::<ethers::types::Address>().is_err() {
            return HttpResponse::BadRequest().json(json!({
                "error": format!("Invalid wallet address: {}", wallet)
            }));
        }
        if let Err(e) = state.db.ensure_user(
            wallet,
            body.discord_id.as_deref(),
            body.telegram_id.as_deref(),
        ) {
            log::error!("Failed to ensure user {}: {}", wallet, e);
            return HttpResponse::InternalServerError().json(json!({
                "error": "Failed to record user"
            }));
        }
    }

    let persona = state.personas.route(&body.message);
    log::info!("[agent] routed message to persona '{}'", persona.name);

    // Personas carrying the verification tool run it when a wallet is present
    let verification = if persona.tools.iter().any(|t| t == "verify_ownership") {
        match &body.wallet_address {
            Some(wallet) => {
                let context = ToolContext::new()
                    .with_wallet(wallet.clone())
                    .with_agent(persona.name.clone());
                let result = state
                    .tool_registry
                    .execute("verify_ownership", json!({"wallet": wallet}), &context)
                    .await;
                result.metadata
            }
            None => None,
        }
    } else {
        None
    };

    let mut response = json!({
        "agent": persona.name,
        "reply": persona.greeting,
    });
    if let Some(verification) = verification {
        response["verification"] = verification;
    }

    HttpResponse::Ok().json(response)
}
