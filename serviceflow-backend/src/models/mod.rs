pub mod agent_setting;
pub mod health_event;
pub mod user;

pub use agent_setting::AgentSetting;
pub use health_event::HealthEvent;
pub use user::{SUBSCRIPTION_TIERS, User};
