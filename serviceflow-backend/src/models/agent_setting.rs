use serde::{Deserialize, Serialize};

/// One key/value setting for an agent. `encrypted` marks values stored as a
/// cipher envelope rather than plaintext.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSetting {
    pub id: i64,
    pub agent_name: String,
    pub key: String,
    pub value: String,
    pub encrypted: bool,
    pub created_at: String,
    pub updated_at: String,
}
