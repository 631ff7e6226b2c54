//! Ledger access
//!
//! ```text
//! ┌──────────────┐  get_account_data / get_program_accounts
//! │  Settlement  │ ─────────────────────────────────────────▶ ┌────────┐
//! │    Client    │  simulate(tx, observe) -> post-state       │ Ledger │
//! │              │  send_and_confirm(tx)  -> signature        │  RPC   │
//! └──────────────┘ ◀───────────────────────────────────────── └────────┘
//! ```
//!
//! [`RpcLedger`] talks JSON-RPC to a cluster. Anything else implementing
//! [`Ledger`] (a local validator bridge, an in-memory ledger in tests) can be
//! swapped in.

use std::time::Duration;

use anchor_lang::AccountDeserialize;
use async_trait::async_trait;
use log::debug;
use solana_account_decoder::UiAccountEncoding;
use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::{
    RpcAccountInfoConfig, RpcProgramAccountsConfig, RpcSimulateTransactionAccountsConfig, RpcSimulateTransactionConfig,
};
use solana_client::rpc_filter::{Memcmp, RpcFilterType};
use solana_client::rpc_request::{RpcError, RpcResponseErrorData};
use solana_sdk::account::Account;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::{Transaction, TransactionError};
use thiserror::Error;

use crate::error::SettlementError;
use crate::wallet::Wallet;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// The cluster executed (or preflighted) the transaction and rejected it
    #[error("transaction rejected: {error}")]
    Rejected { error: TransactionError, logs: Vec<String> },
    #[error("ledger transport error: {0}")]
    Transport(String),
}

/// Exact-bytes filter on account data
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemcmpFilter {
    pub offset: usize,
    pub bytes: Vec<u8>,
}

impl MemcmpFilter {
    pub fn new(offset: usize, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            offset,
            bytes: bytes.into(),
        }
    }

    pub fn matches(&self, data: &[u8]) -> bool {
        data.get(self.offset..self.offset + self.bytes.len())
            .is_some_and(|window| window == self.bytes.as_slice())
    }
}

/// Result of a simulated transaction
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Simulation {
    pub err: Option<TransactionError>,
    pub logs: Vec<String>,
    /// Post-simulation data of each observed account, in request order
    pub accounts: Vec<Option<Vec<u8>>>,
}

#[async_trait]
pub trait Ledger: Send + Sync {
    /// Raw account data, or `None` if the account does not exist
    async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, LedgerError>;

    /// Accounts owned by `program_id` whose data matches every filter
    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: Vec<MemcmpFilter>,
    ) -> Result<Vec<(Pubkey, Vec<u8>)>, LedgerError>;

    async fn latest_blockhash(&self) -> Result<Hash, LedgerError>;

    /// Execute without committing, returning the post-state of `observe`
    async fn simulate(&self, transaction: &Transaction, observe: &[Pubkey]) -> Result<Simulation, LedgerError>;

    /// Submit a signed transaction and wait for confirmation
    async fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature, LedgerError>;
}

pub struct RpcLedger {
    client: RpcClient,
    commitment: CommitmentConfig,
}

impl RpcLedger {
    pub fn new(rpc_url: impl Into<String>, commitment: CommitmentConfig) -> Self {
        Self {
            client: RpcClient::new_with_commitment(rpc_url.into(), commitment),
            commitment,
        }
    }
}

impl From<ClientError> for LedgerError {
    fn from(error: ClientError) -> Self {
        match error.get_transaction_error() {
            Some(transaction_error) => {
                let logs = match error.kind() {
                    ClientErrorKind::RpcError(RpcError::RpcResponseError {
                        data: RpcResponseErrorData::SendTransactionPreflightFailure(result),
                        ..
                    }) => result.logs.clone().unwrap_or_default(),
                    _ => Vec::new(),
                };
                LedgerError::Rejected {
                    error: transaction_error,
                    logs,
                }
            }
            None => LedgerError::Transport(error.to_string()),
        }
    }
}

#[async_trait]
impl Ledger for RpcLedger {
    async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, LedgerError> {
        let response = self.client.get_account_with_commitment(address, self.commitment).await?;
        Ok(response.value.map(|account| account.data))
    }

    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: Vec<MemcmpFilter>,
    ) -> Result<Vec<(Pubkey, Vec<u8>)>, LedgerError> {
        let filters = filters
            .into_iter()
            .map(|f| RpcFilterType::Memcmp(Memcmp::new_raw_bytes(f.offset, f.bytes)))
            .collect();
        let config = RpcProgramAccountsConfig {
            filters: Some(filters),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                commitment: Some(self.commitment),
                ..Default::default()
            },
            ..Default::default()
        };
        let accounts = self.client.get_program_accounts_with_config(program_id, config).await?;
        debug!("get_program_accounts {} -> {} accounts", program_id, accounts.len());
        Ok(accounts.into_iter().map(|(key, account)| (key, account.data)).collect())
    }

    async fn latest_blockhash(&self) -> Result<Hash, LedgerError> {
        Ok(self.client.get_latest_blockhash().await?)
    }

    async fn simulate(&self, transaction: &Transaction, observe: &[Pubkey]) -> Result<Simulation, LedgerError> {
        let config = RpcSimulateTransactionConfig {
            sig_verify: false,
            replace_recent_blockhash: true,
            commitment: Some(self.commitment),
            accounts: Some(RpcSimulateTransactionAccountsConfig {
                encoding: Some(UiAccountEncoding::Base64),
                addresses: observe.iter().map(Pubkey::to_string).collect(),
            }),
            ..Default::default()
        };
        let result = self.client.simulate_transaction_with_config(transaction, config).await?.value;
        debug!(
            "simulate: err={:?} units={:?}",
            result.err, result.units_consumed
        );

        let accounts = result
            .accounts
            .unwrap_or_default()
            .into_iter()
            .map(|account| {
                account
                    .and_then(|ui| ui.decode::<Account>())
                    .map(|account| account.data)
            })
            .collect();

        Ok(Simulation {
            err: result.err,
            logs: result.logs.unwrap_or_default(),
            accounts,
        })
    }

    async fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature, LedgerError> {
        let signature = self.client.send_and_confirm_transaction(transaction).await?;
        debug!("confirmed {}", signature);
        Ok(signature)
    }
}

/// Fetch and decode a program account
pub async fn fetch_account<T: AccountDeserialize>(ledger: &dyn Ledger, address: &Pubkey) -> Result<T, SettlementError> {
    let data = ledger
        .get_account_data(address)
        .await?
        .ok_or(SettlementError::AccountNotFound(*address))?;
    T::try_deserialize(&mut data.as_slice()).map_err(|e| SettlementError::InvalidAccountData {
        address: *address,
        reason: e.to_string(),
    })
}

/// Sign `instructions` with `payer` and submit them as one transaction
///
/// Confirmation is bounded by `limit`. `attestation_instructions` is the
/// number of leading signature verification instructions, used to classify
/// a rejection.
pub async fn submit(
    ledger: &dyn Ledger,
    payer: &dyn Wallet,
    instructions: &[Instruction],
    attestation_instructions: usize,
    limit: Duration,
) -> Result<Signature, SettlementError> {
    let blockhash = ledger.latest_blockhash().await?;
    let payer_key = payer.pubkey();
    let mut transaction = Transaction::new_with_payer(instructions, Some(&payer_key));
    payer.sign_transaction(&mut transaction, blockhash)?;

    match tokio::time::timeout(limit, ledger.send_and_confirm(&transaction)).await {
        Ok(Ok(signature)) => Ok(signature),
        Ok(Err(e)) => Err(SettlementError::from_ledger(e, attestation_instructions)),
        Err(_) => Err(SettlementError::Timeout {
            operation: "confirm transaction",
            limit,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memcmp_filter_matches_window() {
        let owner = Pubkey::new_unique();
        let mut data = vec![0u8; 72];
        data[40..72].copy_from_slice(owner.as_ref());

        assert!(MemcmpFilter::new(40, owner.to_bytes()).matches(&data));
        assert!(!MemcmpFilter::new(8, owner.to_bytes()).matches(&data));
        assert!(!MemcmpFilter::new(41, owner.to_bytes()).matches(&data));
    }

    #[test]
    fn test_rpc_ledger_keeps_commitment() {
        let ledger = RpcLedger::new("http://localhost:8899", CommitmentConfig::finalized());
        assert_eq!(ledger.commitment, CommitmentConfig::finalized());
        assert_eq!(ledger.client.url(), "http://localhost:8899");
    }
}
