// src/blockchain/services/token.rs

use ethers::utils::to_checksum;
use ethers_core::abi::{decode, encode, ParamType, Token};
use ethers_core::types::{Address, Bytes, U256};
use ethers_core::utils::keccak256;
use std::str::FromStr;

use crate::error::IntentError;

pub const ERC20_TRANSFER: &str = "transfer(address,uint256)";
pub const SWAP_EXACT_TOKENS_FOR_TOKENS: &str =
    "swapExactTokensForTokens(uint256,uint256,address[],address,uint256)";
pub const GET_AMOUNTS_OUT: &str = "getAmountsOut(uint256,address[])";

pub fn selector(sig: &str) -> [u8; 4] {
    let mut sel = [0u8; 4];
    sel.copy_from_slice(&keccak256(sig.as_bytes())[0..4]);
    sel
}

fn encode_call(sig: &str, tokens: Vec<Token>) -> Bytes {
    let mut out = selector(sig).to_vec();
    let mut tail = encode(&tokens);
    out.append(&mut tail);
    Bytes::from(out)
}

/// Parse a 0x-prefixed EVM address; `what` names the field for the error.
pub fn parse_address(raw: &str, what: &str) -> Result<Address, IntentError> {
    Address::from_str(raw.trim())
        .map_err(|_| IntentError::InvalidRequest(format!("{} '{}' is not a valid EVM address", what, raw)))
}

pub fn checksum(address: &Address) -> String {
    to_checksum(address, None)
}

/// Calldata for ERC-20 `transfer(to, amount)`.
pub fn erc20_transfer_data(to: Address, amount: U256) -> Bytes {
    encode_call(ERC20_TRANSFER, vec![Token::Address(to), Token::Uint(amount)])
}

/// Calldata for a V2 router exact-in swap.
pub fn swap_exact_tokens_for_tokens_data(
    amount_in: U256,
    min_out: U256,
    path: &[Address],
    recipient: Address,
    deadline: u64,
) -> Bytes {
    encode_call(
        SWAP_EXACT_TOKENS_FOR_TOKENS,
        vec![
            Token::Uint(amount_in),
            Token::Uint(min_out),
            Token::Array(path.iter().copied().map(Token::Address).collect()),
            Token::Address(recipient),
            Token::Uint(U256::from(deadline)),
        ],
    )
}

pub fn get_amounts_out_data(amount_in: U256, path: &[Address]) -> Bytes {
    encode_call(
        GET_AMOUNTS_OUT,
        vec![
            Token::Uint(amount_in),
            Token::Array(path.iter().copied().map(Token::Address).collect()),
        ],
    )
}

/// Decode the `uint256[]` returned by `getAmountsOut`.
pub fn decode_amounts(raw: &[u8]) -> Result<Vec<U256>, IntentError> {
    let tokens = decode(&[ParamType::Array(Box::new(ParamType::Uint(256)))], raw)
        .map_err(|e| IntentError::MalformedUpstream(format!("cannot decode getAmountsOut result: {}", e)))?;
    match tokens.into_iter().next() {
        Some(Token::Array(items)) => items
            .into_iter()
            .map(|t| match t {
                Token::Uint(n) => Ok(n),
                other => Err(IntentError::MalformedUpstream(format!(
                    "unexpected token in amounts: {:?}",
                    other
                ))),
            })
            .collect(),
        other => Err(IntentError::MalformedUpstream(format!(
            "unexpected getAmountsOut result: {:?}",
            other
        ))),
    }
}
