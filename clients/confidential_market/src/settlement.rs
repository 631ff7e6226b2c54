//! # Settlement Client
//!
//! Orchestrates every user action against one market program.
//!
//! ```text
//!   place_bet ─▶ quote ─▶ encode side ─▶ submit place_bet
//!
//!   check_winner ─▶ discover handle ─▶ decrypt ─▶ cache result
//!                                                     │
//!   claim ─────────────────────────── reuse cached ◀──┘
//!            └─▶ [sig-verify ixs..., claim_winnings] ─▶ submit
//! ```
//!
//! The last successful decryption of each position is cached here and is the
//! only shared state. A failed or retried decryption never touches the cache,
//! and the entry is dropped once the claim lands or the attestation is
//! rejected as stale.
//!
//! Only one settlement per position runs at a time; a second concurrent call
//! for the same position fails with [`SettlementError::SettlementInFlight`].

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anchor_lang::solana_program::native_token::LAMPORTS_PER_SOL;
use anchor_lang::Discriminator;
use log::{debug, info, warn};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;

use crate::amm::{locked_payout, OddsSnapshot, PayoutQuote};
use crate::claim::ClaimBuilder;
use crate::config::SettlementConfig;
use crate::decryption::{DecryptionClient, DecryptionResult};
use crate::discovery::HandleDiscovery;
use crate::encoder::PositionEncoder;
use crate::error::SettlementError;
use crate::handle::Handle;
use crate::instructions::{place_bet, PlaceBetAccounts, PlaceBetArgs};
use crate::ledger::{fetch_account, submit, Ledger, MemcmpFilter, RpcLedger};
use crate::oracle::ConfidentialOracle;
use crate::state::{market_address, position_address, Market, Position, Side};
use crate::wallet::Wallet;

/// Where a position stands in the settlement lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettlementStatus {
    /// Market not resolved yet
    AwaitingResolution,
    /// Resolved; the winner check has not run
    ReadyToCheck,
    /// Winner check ran; result not decrypted in this session
    Checked,
    /// Decrypted as a winner, claimable for `payout` lamports
    Won { payout: u64 },
    /// Decrypted as a loser
    Lost,
    /// Winnings paid out
    Claimed,
}

impl SettlementStatus {
    pub fn derive(market: &Market, position: &Position, decrypted: Option<&DecryptionResult>) -> Self {
        if position.claimed {
            return SettlementStatus::Claimed;
        }
        if !market.is_resolved() {
            return SettlementStatus::AwaitingResolution;
        }
        if !position.is_checked() {
            return SettlementStatus::ReadyToCheck;
        }
        match decrypted.filter(|d| d.handle == position.is_winner_handle()) {
            Some(d) if d.is_winner() => SettlementStatus::Won {
                payout: position.locked_payout,
            },
            Some(_) => SettlementStatus::Lost,
            None => SettlementStatus::Checked,
        }
    }
}

/// Side the bettor held, recovered from the outcome and the decrypted result
/// without decrypting the side itself
pub fn held_side(resolved: Side, is_winner: bool) -> Side {
    if is_winner {
        resolved
    } else {
        resolved.opposite()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlacedBet {
    pub signature: Signature,
    pub position: Pubkey,
    /// Preview computed from the pools observed before submitting
    pub quote: Option<PayoutQuote>,
    /// Lamports the program is expected to lock, for the same pools
    pub expected_locked_payout: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SettlementOutcome {
    pub position: Pubkey,
    pub handle: Handle,
    pub is_winner: bool,
    pub resolved_side: Side,
    pub held_side: Side,
    pub locked_payout: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClaimReceipt {
    pub signature: Signature,
    pub position: Pubkey,
    /// Payout locked on the position when the bet was placed. The program
    /// transfers its own pro-rata share, capped at the vault balance, which
    /// can differ.
    pub locked_payout: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PortfolioEntry {
    pub address: Pubkey,
    pub position: Position,
    pub market: Market,
    pub status: SettlementStatus,
}

pub struct SettlementClient {
    ledger: Arc<dyn Ledger>,
    oracle: Arc<dyn ConfidentialOracle>,
    wallet: Option<Arc<dyn Wallet>>,
    config: SettlementConfig,
    decryptions: Mutex<HashMap<Pubkey, DecryptionResult>>,
    in_flight: Mutex<HashSet<Pubkey>>,
}

/// Holds a position's settlement slot until dropped
struct InFlight<'a> {
    slots: &'a Mutex<HashSet<Pubkey>>,
    position: Pubkey,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        lock(self.slots).remove(&self.position);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SettlementClient {
    pub fn new(ledger: Arc<dyn Ledger>, oracle: Arc<dyn ConfidentialOracle>, config: SettlementConfig) -> Self {
        Self {
            ledger,
            oracle,
            wallet: None,
            config,
            decryptions: Mutex::new(HashMap::new()),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Client backed by the JSON-RPC endpoint in `config`
    pub fn connect(config: SettlementConfig, oracle: Arc<dyn ConfidentialOracle>) -> Self {
        let ledger = Arc::new(RpcLedger::new(config.rpc_url.clone(), config.commitment_config()));
        Self::new(ledger, oracle, config)
    }

    pub fn with_wallet(mut self, wallet: Arc<dyn Wallet>) -> Self {
        self.wallet = Some(wallet);
        self
    }

    pub fn config(&self) -> &SettlementConfig {
        &self.config
    }

    fn wallet(&self) -> Result<&dyn Wallet, SettlementError> {
        self.wallet.as_deref().ok_or(SettlementError::MissingWallet)
    }

    pub fn position_for(&self, market: &Pubkey) -> Result<Pubkey, SettlementError> {
        let owner = self.wallet()?.pubkey();
        Ok(position_address(&self.config.program_id, market, &owner).0)
    }

    fn begin(&self, position: Pubkey) -> Result<InFlight<'_>, SettlementError> {
        if !lock(&self.in_flight).insert(position) {
            return Err(SettlementError::SettlementInFlight(position));
        }
        Ok(InFlight {
            slots: &self.in_flight,
            position,
        })
    }

    pub async fn market(&self, market: &Pubkey) -> Result<Market, SettlementError> {
        fetch_account(self.ledger.as_ref(), market).await
    }

    pub async fn market_by_id(&self, market_id: u64) -> Result<(Pubkey, Market), SettlementError> {
        let address = market_address(&self.config.program_id, market_id).0;
        Ok((address, self.market(&address).await?))
    }

    /// Every market of the program, newest `market_id` first
    pub async fn markets(&self) -> Result<Vec<(Pubkey, Market)>, SettlementError> {
        let filters = vec![MemcmpFilter::new(0, Market::DISCRIMINATOR.to_vec())];
        let accounts = self
            .ledger
            .get_program_accounts(&self.config.program_id, filters)
            .await?;
        debug!("{} markets found", accounts.len());

        let mut markets: Vec<(Pubkey, Market)> = accounts
            .into_iter()
            .filter_map(|(address, data)| match Market::from_account_data(&data) {
                Ok(market) => Some((address, market)),
                Err(e) => {
                    warn!("skipping undecodable market {}: {}", address, e);
                    None
                }
            })
            .collect();
        markets.sort_by(|(_, a), (_, b)| b.market_id.cmp(&a.market_id));
        Ok(markets)
    }

    pub async fn odds(&self, market: &Pubkey) -> Result<OddsSnapshot, SettlementError> {
        Ok(self.market(market).await?.pool().odds())
    }

    /// Preview of staking `lamports` on `side`; `None` for a zero stake
    pub async fn quote(&self, market: &Pubkey, side: Side, lamports: u64) -> Result<Option<PayoutQuote>, SettlementError> {
        let state = self.market(market).await?;
        Ok(state.pool().quote(side, lamports as f64 / LAMPORTS_PER_SOL as f64))
    }

    /// Stake `lamports` on an encrypted `side`
    pub async fn place_bet(&self, market: &Pubkey, side: Side, lamports: u64) -> Result<PlacedBet, SettlementError> {
        let wallet = self.wallet()?;
        if lamports == 0 {
            return Err(SettlementError::InvalidStake);
        }

        let state = self.market(market).await?;
        if !state.is_open() {
            return Err(SettlementError::MarketNotOpen(*market));
        }
        let quote = state.pool().quote(side, lamports as f64 / LAMPORTS_PER_SOL as f64);
        let expected_locked_payout = locked_payout(state.total_yes_amount, state.total_no_amount, side, lamports);

        let encrypted_side = PositionEncoder::new(self.oracle.as_ref()).encode(side).await?;

        let accounts = PlaceBetAccounts::new(
            &self.config.program_id,
            self.config.oracle_program_id,
            wallet.pubkey(),
            *market,
        );
        let position = accounts.position;
        let ix = place_bet(
            self.config.program_id,
            &accounts,
            &PlaceBetArgs::new(encrypted_side, lamports, side),
        );
        let signature = submit(self.ledger.as_ref(), wallet, &[ix], 0, self.config.confirm_timeout()).await?;
        info!("placed {} lamports on {} ({})", lamports, market, signature);

        Ok(PlacedBet {
            signature,
            position,
            quote,
            expected_locked_payout,
        })
    }

    async fn discover_and_decrypt(&self, market: &Pubkey, wallet: &dyn Wallet) -> Result<DecryptionResult, SettlementError> {
        let discovery = HandleDiscovery::new(
            self.ledger.as_ref(),
            self.config.program_id,
            self.config.oracle_program_id,
            self.config.confirm_timeout(),
        );
        let discovered = discovery.discover_handle(market, wallet).await?;

        let decryption = DecryptionClient::new(
            self.oracle.as_ref(),
            self.config.decrypt_backoff(),
            self.config.decrypt_timeout(),
        );
        let result = decryption.decrypt_handle(discovered.handle, wallet).await?;

        lock(&self.decryptions).insert(discovered.position, result.clone());
        Ok(result)
    }

    /// Learn whether the connected wallet's position won
    ///
    /// Runs discovery and decryption, and caches the attested result for the
    /// claim. A position that was already paid out fails with
    /// [`SettlementError::AlreadyClaimed`] before the oracle is asked.
    pub async fn check_winner(&self, market: &Pubkey) -> Result<SettlementOutcome, SettlementError> {
        let wallet = self.wallet()?;
        let position = position_address(&self.config.program_id, market, &wallet.pubkey()).0;
        let _slot = self.begin(position)?;

        let existing: Position = fetch_account(self.ledger.as_ref(), &position).await?;
        if existing.claimed {
            self.forget_decryption(&position);
            return Err(SettlementError::AlreadyClaimed);
        }

        let result = self.discover_and_decrypt(market, wallet).await?;

        let state = self.market(market).await?;
        let resolved_side = state.winning_side().ok_or(SettlementError::MarketNotResolved(*market))?;
        let current: Position = fetch_account(self.ledger.as_ref(), &position).await?;
        let is_winner = result.is_winner();
        info!(
            "position {} checked: {} after {} attempts",
            position,
            if is_winner { "won" } else { "lost" },
            result.attempts
        );

        Ok(SettlementOutcome {
            position,
            handle: result.handle,
            is_winner,
            resolved_side,
            held_side: held_side(resolved_side, is_winner),
            locked_payout: current.locked_payout,
        })
    }

    /// Last successful decryption for `position`, if any
    pub fn cached_decryption(&self, position: &Pubkey) -> Option<DecryptionResult> {
        lock(&self.decryptions).get(position).cloned()
    }

    pub fn forget_decryption(&self, position: &Pubkey) -> Option<DecryptionResult> {
        lock(&self.decryptions).remove(position)
    }

    /// Unsigned claim transaction for the cached decryption
    pub fn build_claim_transaction(&self, market: &Pubkey) -> Result<Transaction, SettlementError> {
        let owner = self.wallet()?.pubkey();
        let position = position_address(&self.config.program_id, market, &owner).0;
        let cached = self
            .cached_decryption(&position)
            .ok_or(SettlementError::NoCachedDecryption(position))?;
        Ok(self.claim_builder().build_claim(&cached, *market, owner))
    }

    fn claim_builder(&self) -> ClaimBuilder {
        ClaimBuilder::new(self.config.program_id, self.config.oracle_program_id)
    }

    /// Claim the locked payout of the connected wallet's position
    ///
    /// Reuses the cached decryption; runs the winner check first if nothing
    /// is cached. A decrypted loss fails with [`SettlementError::NotWinner`]
    /// without submitting anything.
    pub async fn claim(&self, market: &Pubkey) -> Result<ClaimReceipt, SettlementError> {
        let wallet = self.wallet()?;
        let owner = wallet.pubkey();
        let position = position_address(&self.config.program_id, market, &owner).0;
        let _slot = self.begin(position)?;

        let current: Position = fetch_account(self.ledger.as_ref(), &position).await?;
        if current.claimed {
            self.forget_decryption(&position);
            return Err(SettlementError::AlreadyClaimed);
        }

        let result = match self.cached_decryption(&position) {
            Some(cached) if cached.handle == current.is_winner_handle() => {
                debug!("claiming {} with cached decryption", position);
                cached
            }
            stale => {
                if stale.is_some() {
                    warn!("cached handle for {} no longer matches the position", position);
                    self.forget_decryption(&position);
                }
                self.discover_and_decrypt(market, wallet).await?
            }
        };

        if !result.is_winner() {
            return Err(SettlementError::NotWinner);
        }

        let instructions = self.claim_builder().claim_instructions(&result, *market, owner);
        let attestations = result.signature_instructions.len();
        match submit(
            self.ledger.as_ref(),
            wallet,
            &instructions,
            attestations,
            self.config.confirm_timeout(),
        )
        .await
        {
            Ok(signature) => {
                self.forget_decryption(&position);
                info!("claimed position {} locked at {} lamports ({})", position, position, signature);
                Ok(ClaimReceipt {
                    signature,
                    position,
                    locked_payout: current.locked_payout,
                })
            }
            Err(e) => {
                if matches!(e, SettlementError::StaleAttestation | SettlementError::AlreadyClaimed) {
                    self.forget_decryption(&position);
                }
                warn!("claim for {} failed: {}", position, e);
                Err(e)
            }
        }
    }

    /// Settlement status of the connected wallet's position
    pub async fn status(&self, market: &Pubkey) -> Result<SettlementStatus, SettlementError> {
        let position = self.position_for(market)?;
        let state = self.market(market).await?;
        let current: Position = fetch_account(self.ledger.as_ref(), &position).await?;
        Ok(SettlementStatus::derive(&state, &current, self.cached_decryption(&position).as_ref()))
    }

    /// Every position held by the connected wallet, with its market
    pub async fn positions_for_owner(&self) -> Result<Vec<PortfolioEntry>, SettlementError> {
        let owner = self.wallet()?.pubkey();
        let filters = vec![
            MemcmpFilter::new(0, Position::DISCRIMINATOR.to_vec()),
            MemcmpFilter::new(Position::OWNER_OFFSET, owner.to_bytes().to_vec()),
        ];
        let accounts = self
            .ledger
            .get_program_accounts(&self.config.program_id, filters)
            .await?;
        debug!("{} positions found for {}", accounts.len(), owner);

        let mut entries = Vec::with_capacity(accounts.len());
        for (address, data) in accounts {
            let position = match Position::from_account_data(&data) {
                Ok(position) => position,
                Err(e) => {
                    warn!("skipping undecodable position {}: {}", address, e);
                    continue;
                }
            };
            let market = self.market(&position.market).await?;
            let status = SettlementStatus::derive(&market, &position, self.cached_decryption(&address).as_ref());
            entries.push(PortfolioEntry {
                address,
                position,
                market,
                status,
            });
        }
        Ok(entries)
    }
}

// ===== TESTS =====

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::Plaintext;
    use crate::state::MarketStatus;

    fn market(status: MarketStatus) -> Market {
        Market {
            authority: Pubkey::new_unique(),
            market_id: 1,
            question: "Will it rain?".to_string(),
            resolution_time: 0,
            status,
            total_yes_amount: 3,
            total_no_amount: 1,
            participant_count: 2,
            bump: 255,
        }
    }

    fn position(is_winner_handle: u128, claimed: bool) -> Position {
        Position {
            market: Pubkey::new_unique(),
            owner: Pubkey::new_unique(),
            amount: 1,
            locked_payout: 4,
            encrypted_side_handle: 11,
            is_winner_handle,
            claimed,
            bump: 254,
        }
    }

    fn decrypted(handle: u128, plaintext: u128) -> DecryptionResult {
        DecryptionResult {
            handle: Handle(handle),
            plaintext: Plaintext(plaintext),
            raw_plaintext: plaintext.to_string(),
            signature_instructions: vec![],
            attempts: 1,
        }
    }

    #[test]
    fn test_status_lifecycle() {
        let open = market(MarketStatus::Open);
        let resolved = market(MarketStatus::ResolvedYes);

        assert_eq!(
            SettlementStatus::derive(&open, &position(0, false), None),
            SettlementStatus::AwaitingResolution
        );
        assert_eq!(
            SettlementStatus::derive(&resolved, &position(0, false), None),
            SettlementStatus::ReadyToCheck
        );
        assert_eq!(
            SettlementStatus::derive(&resolved, &position(7, false), None),
            SettlementStatus::Checked
        );
        assert_eq!(
            SettlementStatus::derive(&resolved, &position(7, false), Some(&decrypted(7, 1))),
            SettlementStatus::Won { payout: 4 }
        );
        assert_eq!(
            SettlementStatus::derive(&resolved, &position(7, false), Some(&decrypted(7, 0))),
            SettlementStatus::Lost
        );
        assert_eq!(
            SettlementStatus::derive(&resolved, &position(7, true), Some(&decrypted(7, 1))),
            SettlementStatus::Claimed
        );
    }

    #[test]
    fn test_status_ignores_decryption_of_other_handle() {
        let resolved = market(MarketStatus::ResolvedNo);
        assert_eq!(
            SettlementStatus::derive(&resolved, &position(7, false), Some(&decrypted(8, 1))),
            SettlementStatus::Checked
        );
    }

    #[test]
    fn test_held_side() {
        assert_eq!(held_side(Side::Yes, true), Side::Yes);
        assert_eq!(held_side(Side::Yes, false), Side::No);
        assert_eq!(held_side(Side::No, true), Side::No);
        assert_eq!(held_side(Side::No, false), Side::Yes);
    }
}
