use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Known subscription tiers, lowest first. Stored as plain strings.
pub const SUBSCRIPTION_TIERS: &[&str] = &["free", "starter", "pro", "enterprise"];

/// A platform user. Created on first contact, updated on tier change,
/// never garbage-collected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    /// Wallet address, stored lowercased
    pub wallet_address: String,
    pub discord_id: Option<String>,
    pub telegram_id: Option<String>,
    pub subscription_tier: String,
    pub credit_balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
