//! Database table modules - extends Database with domain-specific methods
//!
//! Each module adds `impl Database` blocks with methods for a specific table.

mod agent_settings; // agent_settings (per-agent key/value config)
mod health_events;  // health_events (health-log side-table)
mod users;          // users (wallet, platform IDs, tier, credits)
