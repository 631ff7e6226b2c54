//! Handle Discovery
//!
//! The oracle only decrypts a handle for a wallet holding an allowance, and
//! the allowance address is derived from the handle, which exists only after
//! `check_winner` ran. Discovery therefore runs in two phases:
//!
//! ```text
//!   1. simulate check_winner (no remaining accounts)
//!        └─▶ read is_winner_handle @ offset 104 of the simulated position
//!   2. derive allowance(handle, owner)
//!        └─▶ commit check_winner + [allowance, owner]
//! ```
//!
//! A position that already carries a handle skips both phases.

use std::time::Duration;

use log::{debug, info, warn};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;

use crate::error::SettlementError;
use crate::handle::Handle;
use crate::instructions::{
    check_winner, grant_decrypt_access, AllowanceGrant, CheckWinnerAccounts, GrantDecryptAccessAccounts,
};
use crate::ledger::{fetch_account, submit, Ledger};
use crate::state::{position_address, Market, Position};
use crate::wallet::Wallet;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandleSource {
    /// A previous winner check already stored the handle
    Existing,
    /// This discovery committed the winner check
    Committed { signature: Signature },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiscoveredHandle {
    pub position: Pubkey,
    pub handle: Handle,
    pub source: HandleSource,
}

pub struct HandleDiscovery<'a> {
    ledger: &'a dyn Ledger,
    program_id: Pubkey,
    oracle_program_id: Pubkey,
    confirm_timeout: Duration,
}

impl<'a> HandleDiscovery<'a> {
    pub fn new(ledger: &'a dyn Ledger, program_id: Pubkey, oracle_program_id: Pubkey, confirm_timeout: Duration) -> Self {
        Self {
            ledger,
            program_id,
            oracle_program_id,
            confirm_timeout,
        }
    }

    /// Learn the is-winner handle of `owner`'s position in `market`, granting
    /// `owner` decrypt access to it
    pub async fn discover_handle(&self, market: &Pubkey, owner: &dyn Wallet) -> Result<DiscoveredHandle, SettlementError> {
        let owner_key = owner.pubkey();
        let (position, _) = position_address(&self.program_id, market, &owner_key);

        let market_state: Market = fetch_account(self.ledger, market).await?;
        if !market_state.is_resolved() {
            return Err(SettlementError::MarketNotResolved(*market));
        }

        let current: Position = fetch_account(self.ledger, &position).await?;
        if current.is_checked() {
            debug!("position {} already checked, handle {}", position, current.is_winner_handle());
            return Ok(DiscoveredHandle {
                position,
                handle: current.is_winner_handle(),
                source: HandleSource::Existing,
            });
        }

        let simulated = self.simulate_check(market, &position, &owner_key).await?;
        info!("simulated check_winner for {}: handle {}", position, simulated);

        let grant = AllowanceGrant::for_handle(&self.oracle_program_id, simulated, owner_key);
        let accounts = CheckWinnerAccounts::new(self.oracle_program_id, owner_key, *market, position).with_grant(grant);
        let ix = check_winner(self.program_id, &accounts);
        let signature = submit(self.ledger, owner, &[ix], 0, self.confirm_timeout).await?;
        info!("committed check_winner for {}: {}", position, signature);

        let committed: Position = fetch_account(self.ledger, &position).await?;
        let handle = committed.is_winner_handle();
        if handle.is_unset() {
            return Err(SettlementError::NotYetAvailable(position));
        }
        if handle != simulated {
            warn!(
                "committed handle {} differs from simulated {} for {}, re-granting access",
                handle, simulated, position
            );
            self.grant_access(handle, &position, owner).await?;
        }

        Ok(DiscoveredHandle {
            position,
            handle,
            source: HandleSource::Committed { signature },
        })
    }

    async fn simulate_check(&self, market: &Pubkey, position: &Pubkey, owner: &Pubkey) -> Result<Handle, SettlementError> {
        let accounts = CheckWinnerAccounts::new(self.oracle_program_id, *owner, *market, *position);
        let ix = check_winner(self.program_id, &accounts);
        let transaction = Transaction::new_with_payer(&[ix], Some(owner));

        let simulation = self.ledger.simulate(&transaction, &[*position]).await?;
        if let Some(err) = simulation.err {
            return Err(SettlementError::SimulationFailed {
                error: err.to_string(),
                logs: simulation.logs,
            });
        }

        simulation
            .accounts
            .first()
            .and_then(|data| data.as_deref())
            .and_then(Position::read_is_winner_handle)
            .filter(|handle| !handle.is_unset())
            .ok_or(SettlementError::NotYetAvailable(*position))
    }

    async fn grant_access(&self, handle: Handle, position: &Pubkey, owner: &dyn Wallet) -> Result<Signature, SettlementError> {
        let grant = AllowanceGrant::for_handle(&self.oracle_program_id, handle, owner.pubkey());
        let accounts = GrantDecryptAccessAccounts::new(self.oracle_program_id, owner.pubkey(), *position, grant);
        let ix = grant_decrypt_access(self.program_id, &accounts);
        submit(self.ledger, owner, &[ix], 0, self.confirm_timeout).await
    }
}
