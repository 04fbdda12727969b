use serde::Serialize;

/// A health-log row mirroring a standard log line.
#[derive(Debug, Clone, Serialize)]
pub struct HealthEvent {
    pub id: i64,
    pub level: String,
    pub component: String,
    pub message: String,
    pub created_at: String,
}
