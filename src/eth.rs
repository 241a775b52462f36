use crate::err_from_msg;
use crate::error::EngineError;
use crate::error::*;
use secp256k1::{PublicKey, SecretKey};
use sha3::Digest;
use sha3::Keccak256;
use std::str::FromStr;
use web3::types::Address;

pub fn get_eth_addr_from_secret(secret_key: &SecretKey) -> Address {
    Address::from_slice(
        &Keccak256::digest(
            &PublicKey::from_secret_key(&secp256k1::Secp256k1::new(), secret_key)
                .serialize_uncompressed()[1..65],
        )
        .as_slice()[12..],
    )
}

/// Parse a 64-character hex private key, with or without the 0x prefix.
pub fn load_secret_key(secret: &str) -> Result<SecretKey, EngineError> {
    let stripped = secret.strip_prefix("0x").unwrap_or(secret);
    SecretKey::from_str(stripped).map_err(err_from_msg!("Failed to parse private key"))
}
