use std::env;
use std::path::Path;

/// Environment variable names - single source of truth
pub mod env_vars {
    pub const PORT: &str = "PORT";
    pub const DATABASE_URL: &str = "DATABASE_URL";
    pub const RPC_URL: &str = "SRVCFLO_RPC_URL";
    pub const NFT_CONTRACT: &str = "SRVCFLO_NFT_CONTRACT";
    pub const ADMIN_TOKEN_IDS: &str = "SRVCFLO_ADMIN_TOKEN_IDS";
    pub const SETTINGS_KEY: &str = "SRVCFLO_SETTINGS_KEY";
    pub const CONTENT_WEBHOOK_URL: &str = "SRVCFLO_CONTENT_WEBHOOK_URL";
    pub const CONTENT_DIR: &str = "SRVCFLO_CONTENT_DIR";
    pub const CONFIG_DIR: &str = "SRVCFLO_CONFIG_DIR";
}

/// Default values
pub mod defaults {
    pub const PORT: u16 = 8080;
    pub const DATABASE_URL: &str = "./.db/serviceflow.db";
    pub const RPC_URL: &str = "https://rpc.soniclabs.com";
    pub const NFT_CONTRACT: &str = "0x88ce0d545cf2ee28d622535724b4a06e59a766f0";
    pub const ADMIN_TOKEN_IDS: &str = "1,2,3,4,5";
}

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub rpc_url: String,
    pub nft_contract: String,
    pub admin_token_ids: Vec<u64>,
    pub settings_key: Option<String>,
    pub content_webhook_url: Option<String>,
    pub content_dir: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env::var(env_vars::PORT)
                .unwrap_or_else(|_| defaults::PORT.to_string())
                .parse()
                .expect("PORT must be a valid number"),
            database_url: env::var(env_vars::DATABASE_URL)
                .unwrap_or_else(|_| defaults::DATABASE_URL.to_string()),
            rpc_url: env::var(env_vars::RPC_URL)
                .unwrap_or_else(|_| defaults::RPC_URL.to_string()),
            nft_contract: env::var(env_vars::NFT_CONTRACT)
                .unwrap_or_else(|_| defaults::NFT_CONTRACT.to_string()),
            admin_token_ids: parse_admin_token_ids(
                &env::var(env_vars::ADMIN_TOKEN_IDS)
                    .unwrap_or_else(|_| defaults::ADMIN_TOKEN_IDS.to_string()),
            ),
            settings_key: env::var(env_vars::SETTINGS_KEY).ok().filter(|v| !v.is_empty()),
            content_webhook_url: env::var(env_vars::CONTENT_WEBHOOK_URL)
                .ok()
                .filter(|v| !v.is_empty()),
            content_dir: env::var(env_vars::CONTENT_DIR).ok().filter(|v| !v.is_empty()),
        }
    }
}

/// Parse a comma-separated admin token ID list. Bad entries are logged and
/// skipped rather than failing startup.
fn parse_admin_token_ids(raw: &str) -> Vec<u64> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse::<u64>() {
            Ok(id) => Some(id),
            Err(_) => {
                log::warn!("Ignoring invalid admin token ID '{}' in {}", s, env_vars::ADMIN_TOKEN_IDS);
                None
            }
        })
        .collect()
}

/// Get the config directory, checking ./config then ../config (for running
/// from the workspace root or the backend directory).
pub fn config_dir() -> Option<std::path::PathBuf> {
    if let Ok(dir) = env::var(env_vars::CONFIG_DIR) {
        return Some(std::path::PathBuf::from(dir));
    }
    if Path::new("./config").exists() {
        Some(std::path::PathBuf::from("./config"))
    } else if Path::new("../config").exists() {
        Some(std::path::PathBuf::from("../config"))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_admin_token_ids() {
        assert_eq!(parse_admin_token_ids("1,2,3"), vec![1, 2, 3]);
        assert_eq!(parse_admin_token_ids(" 143 , 7 "), vec![143, 7]);
        // Token ID 0 is a valid ID
        assert_eq!(parse_admin_token_ids("0"), vec![0]);
    }

    #[test]
    fn skips_invalid_admin_token_ids() {
        assert_eq!(parse_admin_token_ids("1,abc,3,"), vec![1, 3]);
        assert!(parse_admin_token_ids("").is_empty());
    }
}
