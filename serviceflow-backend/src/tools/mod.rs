pub mod builtin;
pub mod registry;
pub mod types;

pub use registry::{Tool, ToolRegistry};
pub use types::{ToolContext, ToolResult};

use crate::chain::OwnershipVerifier;
use crate::config::Config;
use std::sync::Arc;

/// Build the registry with all built-in tools.
pub fn create_default_registry(
    verifier: Arc<OwnershipVerifier>,
    config: &Config,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(builtin::VerifyOwnershipTool::new(verifier)));
    registry.register(Arc::new(builtin::PostContentTool::new(
        config.content_webhook_url.clone(),
        config.content_dir.clone(),
    )));
    registry
}
