//! Attested Decryption Client
//!
//! The oracle lags the ledger: right after `check_winner` commits, it may not
//! have indexed the new allowance yet. Each attempt therefore *waits first*,
//! then asks.
//!
//! ```text
//!   attempt:   1      2      3      4
//!   wait:     3s     5s     8s    12s    then DecryptionUnavailable
//! ```
//!
//! Only a complete answer (matching handle, parseable plaintext, at least one
//! signature verification instruction) counts as a success.

use std::time::Duration;

use log::{debug, info, warn};
use solana_sdk::instruction::Instruction;

use crate::error::SettlementError;
use crate::handle::{Handle, Plaintext};
use crate::oracle::{AttestedDecryption, ConfidentialOracle, OracleError};
use crate::wallet::Wallet;

/// One oracle response, kept whole so the claim submits exactly the bytes
/// that were attested
#[derive(Clone, Debug, PartialEq)]
pub struct DecryptionResult {
    pub handle: Handle,
    pub plaintext: Plaintext,
    /// Plaintext as the oracle returned it
    pub raw_plaintext: String,
    pub signature_instructions: Vec<Instruction>,
    /// Attempt that produced this result, 1-based
    pub attempts: usize,
}

impl DecryptionResult {
    pub fn is_winner(&self) -> bool {
        self.plaintext.as_bool()
    }
}

pub struct DecryptionClient<'a> {
    oracle: &'a dyn ConfidentialOracle,
    backoff: Vec<Duration>,
    attempt_timeout: Duration,
}

impl<'a> DecryptionClient<'a> {
    pub fn new(oracle: &'a dyn ConfidentialOracle, backoff: Vec<Duration>, attempt_timeout: Duration) -> Self {
        Self {
            oracle,
            backoff,
            attempt_timeout,
        }
    }

    /// Decrypt `handle` on behalf of `signer`
    pub async fn decrypt_handle(&self, handle: Handle, signer: &dyn Wallet) -> Result<DecryptionResult, SettlementError> {
        let request = [handle.to_decimal_string()];
        let mut last_error = String::from("no attempt made");

        for (index, wait) in self.backoff.iter().enumerate() {
            let attempt = index + 1;
            tokio::time::sleep(*wait).await;
            debug!("decrypt {} attempt {}/{}", handle, attempt, self.backoff.len());

            let response = match tokio::time::timeout(self.attempt_timeout, self.oracle.decrypt(&request, signer)).await {
                Ok(response) => response,
                Err(_) => Err(OracleError::Transport(format!(
                    "decrypt timed out after {:?}",
                    self.attempt_timeout
                ))),
            };

            match response.and_then(|attested| accept(handle, attested)) {
                Ok((plaintext, raw_plaintext, signature_instructions)) => {
                    info!("decrypted {} on attempt {}", handle, attempt);
                    return Ok(DecryptionResult {
                        handle,
                        plaintext,
                        raw_plaintext,
                        signature_instructions,
                        attempts: attempt,
                    });
                }
                Err(e) => {
                    warn!("decrypt {} attempt {} failed: {}", handle, attempt, e);
                    last_error = e.to_string();
                }
            }
        }

        Err(SettlementError::DecryptionUnavailable {
            attempts: self.backoff.len(),
            last_error,
        })
    }
}

fn accept(requested: Handle, attested: AttestedDecryption) -> Result<(Plaintext, String, Vec<Instruction>), OracleError> {
    let AttestedDecryption {
        plaintexts,
        handles,
        signature_instructions,
    } = attested;

    let echoed = handles
        .first()
        .ok_or_else(|| OracleError::Malformed("no handle echoed".to_string()))?;
    let echoed: Handle = echoed.parse().map_err(|e| OracleError::Malformed(format!("{e}")))?;
    if echoed != requested {
        return Err(OracleError::Malformed(format!("asked for {requested}, attested {echoed}")));
    }

    let raw = plaintexts
        .into_iter()
        .next()
        .ok_or_else(|| OracleError::Malformed("no plaintext returned".to_string()))?;
    let plaintext = Plaintext::parse(&raw).map_err(|e| OracleError::Malformed(format!("{e}")))?;

    if signature_instructions.is_empty() {
        return Err(OracleError::Malformed("no signature verification instructions".to_string()));
    }

    Ok((plaintext, raw, signature_instructions))
}

// ===== TESTS =====
