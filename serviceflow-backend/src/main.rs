use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use ethers::types::Address;
use std::sync::Arc;

mod chain;
mod config;
mod controllers;
mod db;
mod models;
mod personas;
mod settings;
mod telemetry;
mod tools;

use chain::{HttpRpcClient, OwnershipVerifier};
use config::Config;
use db::Database;
use personas::PersonaRegistry;
use settings::{SettingsCipher, SettingsManager};
use tools::ToolRegistry;

pub struct AppState {
    pub db: Arc<Database>,
    pub config: Config,
    pub verifier: Arc<OwnershipVerifier>,
    pub tool_registry: Arc<ToolRegistry>,
    pub personas: Arc<PersonaRegistry>,
    pub settings: Arc<SettingsManager>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let port = config.port;

    log::info!("Initializing database at {}", config.database_url);
    let db = Database::new(&config.database_url).expect("Failed to initialize database");
    let db = Arc::new(db);

    // Persona configs from the config directory (built-in defaults otherwise)
    let config_dir = config::config_dir();
    log::info!("Loading personas (config dir: {:?})", config_dir);
    let personas = Arc::new(PersonaRegistry::load(config_dir.as_deref()));

    // On-chain ownership verifier
    let contract: Address = config
        .nft_contract
        .parse()
        .expect("SRVCFLO_NFT_CONTRACT must be a valid address");
    log::info!(
        "Ownership checks against {} via {} (admin tokens: {:?})",
        config.nft_contract,
        config.rpc_url,
        config.admin_token_ids
    );
    let rpc = Arc::new(HttpRpcClient::new(&config.rpc_url));
    let verifier = Arc::new(OwnershipVerifier::new(
        contract,
        config.admin_token_ids.clone(),
        rpc,
    ));

    // Settings manager with optional symmetric encryption
    let cipher = config
        .settings_key
        .as_deref()
        .and_then(SettingsCipher::from_encoded_key);
    if cipher.is_none() {
        log::warn!("No settings encryption key configured - secrets will be stored plaintext");
    }
    let settings_manager = Arc::new(SettingsManager::new(db.clone(), cipher));

    // Tool registry with built-in tools
    log::info!("Initializing tool registry");
    let tool_registry = Arc::new(tools::create_default_registry(verifier.clone(), &config));
    log::info!("Registered {} tools", tool_registry.len());

    telemetry::record_health_event(
        &db,
        log::Level::Info,
        "server",
        &format!("starting on port {}", port),
    );
    log::info!("Starting ServiceFlow server on port {}", port);

    let state_db = db.clone();
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(AppState {
                db: Arc::clone(&state_db),
                config: config.clone(),
                verifier: Arc::clone(&verifier),
                tool_registry: Arc::clone(&tool_registry),
                personas: Arc::clone(&personas),
                settings: Arc::clone(&settings_manager),
            }))
            .wrap(Logger::default())
            .wrap(cors)
            .configure(controllers::health::config)
            .configure(controllers::verify::config)
            .configure(controllers::agents::config)
            .configure(controllers::users::config)
            .configure(controllers::settings::config)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
