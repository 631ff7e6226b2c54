//! Confidential Position Encoder
//!
//! Turns the side bit of a bet into the ciphertext bytes carried by
//! `place_bet`. The oracle answers with hex; the program wants raw bytes.

use log::debug;

use crate::error::SettlementError;
use crate::oracle::ConfidentialOracle;
use crate::state::Side;

pub struct PositionEncoder<'a> {
    oracle: &'a dyn ConfidentialOracle,
}

impl<'a> PositionEncoder<'a> {
    pub fn new(oracle: &'a dyn ConfidentialOracle) -> Self {
        Self { oracle }
    }

    /// Encrypt `side` (0 = NO, 1 = YES) into ciphertext bytes
    pub async fn encode(&self, side: Side) -> Result<Vec<u8>, SettlementError> {
        let ciphertext = self
            .oracle
            .encrypt(u128::from(side.bit()))
            .await
            .map_err(|e| SettlementError::EncodingFailed(e.to_string()))?;
        let bytes = decode_ciphertext(&ciphertext)?;
        debug!("encoded side into {} ciphertext bytes", bytes.len());
        Ok(bytes)
    }
}

/// Hex ciphertext, with or without a `0x` prefix, to raw bytes
pub fn decode_ciphertext(ciphertext: &str) -> Result<Vec<u8>, SettlementError> {
    let trimmed = ciphertext.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.is_empty() {
        return Err(SettlementError::EncodingFailed("empty ciphertext".to_string()));
    }

    hex::decode(digits).map_err(|e| SettlementError::EncodingFailed(format!("ciphertext is not hex: {e}")))
}
