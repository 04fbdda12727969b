//! NFT ownership verification against an ERC-721 contract.
//!
//! Answers two questions for a wallet: does it hold one of the configured
//! admin token IDs, and which token IDs does it own at all. Every RPC failure
//! is logged and treated as "no answer" for that call - the check always
//! completes with a best-effort result and never propagates an error to the
//! caller. A timeout on `ownerOf` is therefore indistinguishable from "token
//! has no owner"; that matches the product's read-only, low-stakes use.

use ethers::types::{Address, U256};
use serde::Serialize;
use std::sync::Arc;

use super::erc721;
use super::JsonRpcClient;

/// Best-effort result of an ownership check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnershipCheck {
    pub is_admin: bool,
    pub is_holder: bool,
    pub admin_token_id: Option<u64>,
    pub owned_tokens: Vec<u64>,
}

/// Verifies admin/holder status for wallets against a single ERC-721
/// contract. The admin token allow-list is fixed at construction.
pub struct OwnershipVerifier {
    contract: Address,
    admin_token_ids: Vec<u64>,
    rpc: Arc<dyn JsonRpcClient>,
}

impl OwnershipVerifier {
    pub fn new(contract: Address, admin_token_ids: Vec<u64>, rpc: Arc<dyn JsonRpcClient>) -> Self {
        OwnershipVerifier {
            contract,
            admin_token_ids,
            rpc,
        }
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    pub fn admin_token_ids(&self) -> &[u64] {
        &self.admin_token_ids
    }

    /// Check whether `wallet` holds an admin token, and enumerate its owned
    /// token IDs. Always returns a result object; individual call failures
    /// are logged and skipped.
    pub async fn verify_admin_status(&self, wallet: Address) -> OwnershipCheck {
        // Admin allow-list first: stop at the first token owned by the wallet.
        for &token_id in &self.admin_token_ids {
            let calldata = erc721::owner_of_calldata(token_id);
            match self.rpc.eth_call(self.contract, &calldata).await {
                Ok(ret) => match erc721::decode_address(&ret) {
                    Some(owner) if owner == wallet => {
                        log::info!(
                            "[ownership] {:?} owns admin token {} - admin confirmed",
                            wallet,
                            token_id
                        );
                        return OwnershipCheck {
                            is_admin: true,
                            is_holder: true,
                            admin_token_id: Some(token_id),
                            owned_tokens: vec![token_id],
                        };
                    }
                    Some(_) => {}
                    None => {
                        log::debug!("[ownership] ownerOf({}) returned no data", token_id);
                    }
                },
                Err(e) => {
                    log::warn!(
                        "[ownership] ownerOf({}) failed: {} - treating as no owner",
                        token_id,
                        e
                    );
                }
            }
        }

        // No admin token matched: count holdings.
        let balance = match self
            .rpc
            .eth_call(self.contract, &erc721::balance_of_calldata(wallet))
            .await
        {
            Ok(ret) => erc721::decode_uint(&ret).unwrap_or_else(U256::zero),
            Err(e) => {
                log::warn!("[ownership] balanceOf failed: {} - treating as 0", e);
                U256::zero()
            }
        };

        let count = erc721::uint_to_token_id(balance).unwrap_or(0);
        let mut owned_tokens = Vec::new();

        for index in 0..count {
            let calldata = erc721::token_of_owner_by_index_calldata(wallet, index);
            match self.rpc.eth_call(self.contract, &calldata).await {
                Ok(ret) => match erc721::decode_uint(&ret).and_then(erc721::uint_to_token_id) {
                    Some(id) => owned_tokens.push(id),
                    None => {
                        log::warn!(
                            "[ownership] tokenOfOwnerByIndex({}) returned no data - skipping index",
                            index
                        );
                    }
                },
                Err(e) => {
                    log::warn!(
                        "[ownership] tokenOfOwnerByIndex({}) failed: {} - skipping index",
                        index,
                        e
                    );
                }
            }
        }

        OwnershipCheck {
            is_admin: false,
            is_holder: count > 0,
            admin_token_id: None,
            owned_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ethers::abi::{self, Token};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Stub transport: scripted responses keyed by exact calldata, with every
    /// call recorded so tests can assert which lookups were made.
    struct StubRpc {
        responses: HashMap<Vec<u8>, Result<Vec<u8>, String>>,
        calls: Mutex<Vec<Vec<u8>>>,
    }

    impl StubRpc {
        fn new() -> Self {
            StubRpc {
                responses: HashMap::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn on(mut self, calldata: Vec<u8>, response: Result<Vec<u8>, String>) -> Self {
            self.responses.insert(calldata, response);
            self
        }

        fn calls(&self) -> Vec<Vec<u8>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl JsonRpcClient for StubRpc {
        async fn eth_call(&self, _to: Address, data: &[u8]) -> Result<Vec<u8>, String> {
            self.calls.lock().unwrap().push(data.to_vec());
            self.responses
                .get(data)
                .cloned()
                .unwrap_or_else(|| Err("unexpected call".to_string()))
        }
    }

    fn contract() -> Address {
        "0x88ce0d545cf2ee28d622535724b4a06e59a766f0".parse().unwrap()
    }

    fn wallet() -> Address {
        "0xab5801a7d398351b8be11c439e05c5b3259aec9b".parse().unwrap()
    }

    fn other_wallet() -> Address {
        "0x1111111111111111111111111111111111111111".parse().unwrap()
    }

    fn address_word(addr: Address) -> Vec<u8> {
        abi::encode(&[Token::Address(addr)])
    }

    fn uint_word(n: u64) -> Vec<u8> {
        abi::encode(&[Token::Uint(U256::from(n))])
    }

    #[tokio::test]
    async fn admin_match_short_circuits() {
        let rpc = StubRpc::new()
            .on(erc721::owner_of_calldata(100), Ok(address_word(other_wallet())))
            .on(erc721::owner_of_calldata(143), Ok(address_word(wallet())));
        let rpc = Arc::new(rpc);
        let verifier = OwnershipVerifier::new(contract(), vec![100, 143, 200], rpc.clone());

        let check = verifier.verify_admin_status(wallet()).await;

        assert!(check.is_admin);
        assert!(check.is_holder);
        assert_eq!(check.admin_token_id, Some(143));

        // Token 200 must not be queried after the match on 143.
        let calls = rpc.calls();
        assert_eq!(calls.len(), 2);
        assert!(!calls.contains(&erc721::owner_of_calldata(200)));
    }

    #[tokio::test]
    async fn zero_balance_skips_enumeration() {
        let rpc = StubRpc::new()
            .on(erc721::owner_of_calldata(1), Ok(address_word(other_wallet())))
            .on(erc721::balance_of_calldata(wallet()), Ok(uint_word(0)));
        let rpc = Arc::new(rpc);
        let verifier = OwnershipVerifier::new(contract(), vec![1], rpc.clone());

        let check = verifier.verify_admin_status(wallet()).await;

        assert!(!check.is_admin);
        assert!(!check.is_holder);
        assert!(check.owned_tokens.is_empty());

        // One ownerOf plus one balanceOf, no tokenOfOwnerByIndex.
        assert_eq!(rpc.calls().len(), 2);
    }

    #[tokio::test]
    async fn enumerates_owned_tokens_in_index_order() {
        let rpc = StubRpc::new()
            .on(erc721::balance_of_calldata(wallet()), Ok(uint_word(3)))
            .on(
                erc721::token_of_owner_by_index_calldata(wallet(), 0),
                Ok(uint_word(11)),
            )
            .on(
                erc721::token_of_owner_by_index_calldata(wallet(), 1),
                Ok(uint_word(22)),
            )
            .on(
                erc721::token_of_owner_by_index_calldata(wallet(), 2),
                Ok(uint_word(33)),
            );
        let rpc = Arc::new(rpc);
        let verifier = OwnershipVerifier::new(contract(), vec![], rpc.clone());

        let check = verifier.verify_admin_status(wallet()).await;

        assert!(!check.is_admin);
        assert!(check.is_holder);
        assert_eq!(check.owned_tokens, vec![11, 22, 33]);

        // Exactly three index lookups, indices 0..3 in order.
        let index_calls: Vec<Vec<u8>> = rpc.calls()[1..].to_vec();
        assert_eq!(
            index_calls,
            vec![
                erc721::token_of_owner_by_index_calldata(wallet(), 0),
                erc721::token_of_owner_by_index_calldata(wallet(), 1),
                erc721::token_of_owner_by_index_calldata(wallet(), 2),
            ]
        );
    }

    #[tokio::test]
    async fn address_comparison_is_case_insensitive() {
        // Checksummed and all-lowercase forms of the same account.
        let checksummed: Address = "0xAb5801a7D398351b8bE11C439e05C5B3259aeC9B"
            .parse()
            .unwrap();
        let lowercase: Address = "0xab5801a7d398351b8be11c439e05c5b3259aec9b"
            .parse()
            .unwrap();

        let rpc = Arc::new(
            StubRpc::new().on(erc721::owner_of_calldata(7), Ok(address_word(checksummed))),
        );
        let verifier = OwnershipVerifier::new(contract(), vec![7], rpc);

        let check = verifier.verify_admin_status(lowercase).await;
        assert!(check.is_admin);
        assert_eq!(check.admin_token_id, Some(7));
    }

    #[tokio::test]
    async fn failed_index_lookup_is_skipped_not_fatal() {
        let rpc = StubRpc::new()
            .on(erc721::balance_of_calldata(wallet()), Ok(uint_word(3)))
            .on(
                erc721::token_of_owner_by_index_calldata(wallet(), 0),
                Ok(uint_word(11)),
            )
            .on(
                erc721::token_of_owner_by_index_calldata(wallet(), 1),
                Err("HTTP 500".to_string()),
            )
            .on(
                erc721::token_of_owner_by_index_calldata(wallet(), 2),
                Ok(uint_word(33)),
            );
        let rpc = Arc::new(rpc);
        let verifier = OwnershipVerifier::new(contract(), vec![], rpc.clone());

        let check = verifier.verify_admin_status(wallet()).await;

        // The failed index is absent; enumeration continued past it.
        assert_eq!(check.owned_tokens, vec![11, 33]);
        assert!(check.is_holder);
        assert_eq!(rpc.calls().len(), 4);
    }

    #[tokio::test]
    async fn transport_error_on_owner_of_falls_through() {
        let rpc = StubRpc::new()
            .on(erc721::owner_of_calldata(5), Err("timeout".to_string()))
            .on(erc721::balance_of_calldata(wallet()), Ok(uint_word(0)));
        let rpc = Arc::new(rpc);
        let verifier = OwnershipVerifier::new(contract(), vec![5], rpc);

        let check = verifier.verify_admin_status(wallet()).await;
        assert!(!check.is_admin);
        assert!(!check.is_holder);
    }

    #[tokio::test]
    async fn empty_owner_of_return_means_no_owner() {
        // `0x` from ownerOf on a nonexistent token is "no owner found",
        // not an address and not a fatal error.
        let rpc = StubRpc::new()
            .on(erc721::owner_of_calldata(5), Ok(Vec::new()))
            .on(erc721::balance_of_calldata(wallet()), Ok(uint_word(0)));
        let rpc = Arc::new(rpc);
        let verifier = OwnershipVerifier::new(contract(), vec![5], rpc);

        let check = verifier.verify_admin_status(wallet()).await;
        assert!(!check.is_admin);
    }

    #[tokio::test]
    async fn admin_token_id_zero_is_matched() {
        let rpc = Arc::new(
            StubRpc::new().on(erc721::owner_of_calldata(0), Ok(address_word(wallet()))),
        );
        let verifier = OwnershipVerifier::new(contract(), vec![0], rpc);

        let check = verifier.verify_admin_status(wallet()).await;
        assert!(check.is_admin);
        assert_eq!(check.admin_token_id, Some(0));
    }
}
