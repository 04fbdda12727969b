//! NFT ownership verification tool.
//!
//! Thin wrapper over the ownership verifier: takes a wallet address, returns
//! the admin/holder result. The check itself is best-effort and never fails;
//! the only tool error is a malformed address.

use crate::chain::OwnershipVerifier;
use crate::tools::registry::Tool;
use crate::tools::types::{
    PropertySchema, ToolContext, ToolDefinition, ToolGroup, ToolInputSchema, ToolResult,
};
use async_trait::async_trait;
use ethers::types::Address;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

pub struct VerifyOwnershipTool {
    verifier: Arc<OwnershipVerifier>,
    definition: ToolDefinition,
}

impl VerifyOwnershipTool {
    pub fn new(verifier: Arc<OwnershipVerifier>) -> Self {
        let mut properties = HashMap::new();
        properties.insert(
            "wallet".to_string(),
            PropertySchema {
                schema_type: "string".to_string(),
                description: "Wallet address to check (0x-prefixed hex, any case)".to_string(),
                default: None,
                items: None,
            },
        );

        VerifyOwnershipTool {
            verifier,
            definition: ToolDefinition {
                name: "verify_ownership".to_string(),
                description: "Check whether a wallet holds a ServiceFlow admin token and \
                              enumerate all access tokens it owns. Returns is_admin, \
                              is_holder, the matching admin token ID, and the owned token \
                              ID list."
                    .to_string(),
                input_schema: ToolInputSchema {
                    schema_type: "object".to_string(),
                    properties,
                    required: vec!["wallet".to_string()],
                },
                group: ToolGroup::Chain,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct Params {
    wallet: Option<String>,
}

#[async_trait]
impl Tool for VerifyOwnershipTool {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    async fn execute(&self, params: Value, context: &ToolContext) -> ToolResult {
        let params: Params = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => return ToolResult::error(format!("Invalid parameters: {}", e)),
        };

        // Fall back to the requesting user's wallet from context
        let wallet_str = match params.wallet.or_else(|| context.wallet_address.clone()) {
            Some(w) => w,
            None => return ToolResult::error("'wallet' required (none in request or context)"),
        };

        let wallet: Address = match wallet_str.parse() {
            Ok(a) => a,
            Err(_) => return ToolResult::error(format!("Invalid wallet address: {}", wallet_str)),
        };

        let check = self.verifier.verify_admin_status(wallet).await;

        let content = if check.is_admin {
            format!(
                "Wallet {} is a ServiceFlow admin (token #{}).",
                wallet_str,
                check.admin_token_id.unwrap_or_default()
            )
        } else if check.is_holder {
            format!(
                "Wallet {} holds {} access token(s): {:?}. Not an admin.",
                wallet_str,
                check.owned_tokens.len(),
                check.owned_tokens
            )
        } else {
            format!("Wallet {} holds no ServiceFlow access tokens.", wallet_str)
        };

        ToolResult::success(content).with_metadata(json!({
            "wallet": wallet_str.to_lowercase(),
            "contract": format!("{:?}", self.verifier.contract()),
            "is_admin": check.is_admin,
            "is_holder": check.is_holder,
            "admin_token_id": check.admin_token_id,
            "owned_tokens": check.owned_tokens,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::JsonRpcClient;

    struct NoChainRpc;

    #[async_trait]
    impl JsonRpcClient for NoChainRpc {
        async fn eth_call(&self, _to: Address, _data: &[u8]) -> Result<Vec<u8>, String> {
            Err("offline".to_string())
        }
    }

    fn tool() -> VerifyOwnershipTool {
        let verifier = OwnershipVerifier::new(
            "0x88ce0d545cf2ee28d622535724b4a06e59a766f0".parse().unwrap(),
            vec![1],
            Arc::new(NoChainRpc),
        );
        VerifyOwnershipTool::new(Arc::new(verifier))
    }

    #[tokio::test]
    async fn rejects_bad_address() {
        let result = tool()
            .execute(json!({"wallet": "not-an-address"}), &ToolContext::new())
            .await;
        assert!(!result.success);
    }

    #[tokio::test]
    async fn offline_rpc_still_returns_a_result() {
        // Transport failures are swallowed by the verifier: the tool reports
        // "no tokens" rather than erroring.
        let result = tool()
            .execute(
                json!({"wallet": "0xab5801a7d398351b8be11c439e05c5b3259aec9b"}),
                &ToolContext::new(),
            )
            .await;
        assert!(result.success);
        let meta = result.metadata.unwrap();
        assert_eq!(meta["is_admin"], false);
        assert_eq!(meta["is_holder"], false);
    }

    #[tokio::test]
    async fn falls_back_to_context_wallet() {
        let context =
            ToolContext::new().with_wallet("0xab5801a7d398351b8be11c439e05c5b3259aec9b".to_string());
        let result = tool().execute(json!({}), &context).await;
        assert!(result.success);
    }
}
