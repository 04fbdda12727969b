//! ERC-721 calldata construction and return-word decoding.
//!
//! Selectors are fixed wire constants; argument words go through the typed
//! `ethers::abi` encoder rather than hand-rolled hex padding.

use ethers::abi::{self, ParamType, Token};
use ethers::types::{Address, U256};

/// Four-byte selector for `ownerOf(uint256)`
pub const SELECTOR_OWNER_OF: [u8; 4] = [0x63, 0x52, 0x21, 0x1e];
/// Four-byte selector for `balanceOf(address)`
pub const SELECTOR_BALANCE_OF: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];
/// Four-byte selector for `tokenOfOwnerByIndex(address,uint256)`
pub const SELECTOR_TOKEN_OF_OWNER_BY_INDEX: [u8; 4] = [0x2f, 0x74, 0x5c, 0x59];

fn with_selector(selector: [u8; 4], tokens: &[Token]) -> Vec<u8> {
    let mut calldata = selector.to_vec();
    calldata.extend(abi::encode(tokens));
    calldata
}

/// Calldata for `ownerOf(token_id)`.
pub fn owner_of_calldata(token_id: u64) -> Vec<u8> {
    with_selector(SELECTOR_OWNER_OF, &[Token::Uint(U256::from(token_id))])
}

/// Calldata for `balanceOf(owner)`.
pub fn balance_of_calldata(owner: Address) -> Vec<u8> {
    with_selector(SELECTOR_BALANCE_OF, &[Token::Address(owner)])
}

/// Calldata for `tokenOfOwnerByIndex(owner, index)`.
pub fn token_of_owner_by_index_calldata(owner: Address, index: u64) -> Vec<u8> {
    with_selector(
        SELECTOR_TOKEN_OF_OWNER_BY_INDEX,
        &[Token::Address(owner), Token::Uint(U256::from(index))],
    )
}

/// Decode an address return word. The address is the low 20 bytes of the
/// 32-byte word. An empty return (`0x`) means the contract produced no data
/// ("no owner found") and decodes to `None`, never an error.
pub fn decode_address(data: &[u8]) -> Option<Address> {
    if data.is_empty() {
        return None;
    }
    let tokens = abi::decode(&[ParamType::Address], data).ok()?;
    match tokens.into_iter().next() {
        Some(Token::Address(addr)) => Some(addr),
        _ => None,
    }
}

/// Decode a uint256 return word. Empty return decodes to `None`.
pub fn decode_uint(data: &[u8]) -> Option<U256> {
    if data.is_empty() {
        return None;
    }
    let tokens = abi::decode(&[ParamType::Uint(256)], data).ok()?;
    match tokens.into_iter().next() {
        Some(Token::Uint(n)) => Some(n),
        _ => None,
    }
}

/// Narrow a decoded uint256 to a token ID. IDs beyond u64 range are not
/// representable in the result object and map to `None`.
pub fn uint_to_token_id(value: U256) -> Option<u64> {
    if value > U256::from(u64::MAX) {
        return None;
    }
    Some(value.as_u64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_of_calldata_is_wire_exact() {
        // selector ++ 143 left-padded to 64 hex chars (…8f)
        let calldata = owner_of_calldata(143);
        let expected = format!("6352211e{:0>64}", "8f");
        assert_eq!(hex::encode(&calldata), expected);
        assert_eq!(calldata.len(), 4 + 32);
    }

    #[test]
    fn balance_of_calldata_is_wire_exact() {
        let addr: Address = "0xAb5801a7D398351b8bE11C439e05C5B3259aeC9B"
            .parse()
            .unwrap();
        let calldata = balance_of_calldata(addr);
        // selector ++ address lowercased, 0x stripped, left-padded to 64 hex chars
        let expected = format!(
            "70a08231{:0>64}",
            "ab5801a7d398351b8be11c439e05c5b3259aec9b"
        );
        assert_eq!(hex::encode(&calldata), expected);
    }

    #[test]
    fn token_of_owner_by_index_calldata_has_two_words() {
        let addr: Address = "0xab5801a7d398351b8be11c439e05c5b3259aec9b"
            .parse()
            .unwrap();
        let calldata = token_of_owner_by_index_calldata(addr, 2);
        assert_eq!(&calldata[..4], &SELECTOR_TOKEN_OF_OWNER_BY_INDEX);
        assert_eq!(calldata.len(), 4 + 64);
        // index word is the second argument
        assert_eq!(calldata[4 + 63], 2);
    }

    #[test]
    fn decode_address_takes_low_20_bytes() {
        let mut word = vec![0u8; 32];
        word[12..].copy_from_slice(&hex::decode("ab5801a7d398351b8be11c439e05c5b3259aec9b").unwrap());
        let decoded = decode_address(&word).unwrap();
        assert_eq!(
            format!("{:?}", decoded),
            "0xab5801a7d398351b8be11c439e05c5b3259aec9b"
        );
    }

    #[test]
    fn decode_address_empty_return_is_none() {
        // An RPC returning `0x` for ownerOf on a nonexistent token is
        // "no owner found", not an address.
        assert_eq!(decode_address(&[]), None);
    }

    #[test]
    fn decode_uint_roundtrips() {
        let word = abi::encode(&[Token::Uint(U256::from(3u64))]);
        assert_eq!(decode_uint(&word), Some(U256::from(3u64)));
        assert_eq!(decode_uint(&[]), None);
    }

    #[test]
    fn token_id_zero_is_valid() {
        let word = abi::encode(&[Token::Uint(U256::zero())]);
        let id = decode_uint(&word).and_then(uint_to_token_id);
        assert_eq!(id, Some(0));
    }
}
