//! # Parimutuel Pool
//!
//! ## Odds
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                                                              │
//! │   odds(YES) = (YES + NO) / YES      prob(YES) = YES / total  │
//! │   odds(NO)  = (YES + NO) / NO       prob(NO)  = NO  / total  │
//! │                                                              │
//! │   Empty market: both odds are 2.0, both probabilities 50%    │
//! │                                                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Locked Payout
//!
//! When a user stakes `S` on a side:
//!
//! ```text
//! 1. new_side  = side_pool + S
//! 2. new_total = new_yes + new_no
//! 3. payout    = S / new_side * new_total
//! ```
//!
//! The ledger performs the same computation in lamports when the bet executes
//! and stores the result on the position. [`locked_payout`] mirrors that
//! integer arithmetic exactly; [`ParimutuelPool::quote`] is the floating-point
//! preview shown before signing. The preview is never treated as authoritative.

use anchor_lang::solana_program::native_token::LAMPORTS_PER_SOL;

use crate::state::Side;

/// Odds shown for each side of an empty market
pub const EVEN_ODDS: f64 = 2.0;

/// Display probability (percent) for each side of an empty market
pub const EVEN_PROBABILITY: f64 = 50.0;

/// Instantaneous odds for both sides, recomputed on every read
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OddsSnapshot {
    pub yes_odds: f64,
    pub no_odds: f64,
    /// Percent, 0..=100
    pub yes_probability: f64,
    /// Percent, 0..=100
    pub no_probability: f64,
}

impl OddsSnapshot {
    pub fn odds(&self, side: Side) -> f64 {
        match side {
            Side::Yes => self.yes_odds,
            Side::No => self.no_odds,
        }
    }

    pub fn probability(&self, side: Side) -> f64 {
        match side {
            Side::Yes => self.yes_probability,
            Side::No => self.no_probability,
        }
    }
}

/// Preview of the payout a bettor would lock in
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PayoutQuote {
    pub side: Side,
    pub stake: f64,
    pub new_yes_pool: f64,
    pub new_no_pool: f64,
    pub new_total_pool: f64,
    /// Paid out if `side` wins
    pub payout: f64,
    pub profit: f64,
    pub multiplier: f64,
    /// Share of the post-bet pot held by `side`, in percent
    pub implied_probability: f64,
}

/// Snapshot of the two pools of a market
///
/// Pools are expressed in display units (SOL). Both must be non-negative.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ParimutuelPool {
    pub yes_pool: f64,
    pub no_pool: f64,
}

impl ParimutuelPool {
    pub fn new(yes_pool: f64, no_pool: f64) -> Self {
        Self { yes_pool, no_pool }
    }

    /// Build a pool from on-chain lamport totals
    pub fn from_lamports(total_yes: u64, total_no: u64) -> Self {
        Self {
            yes_pool: total_yes as f64 / LAMPORTS_PER_SOL as f64,
            no_pool: total_no as f64 / LAMPORTS_PER_SOL as f64,
        }
    }

    pub fn total(&self) -> f64 {
        self.yes_pool + self.no_pool
    }

    pub fn side_pool(&self, side: Side) -> f64 {
        match side {
            Side::Yes => self.yes_pool,
            Side::No => self.no_pool,
        }
    }

    /// Current odds and implied probabilities
    ///
    /// A side with an empty pool in a non-empty market has infinite odds and
    /// zero probability.
    pub fn odds(&self) -> OddsSnapshot {
        let total = self.total();
        if total == 0.0 {
            return OddsSnapshot {
                yes_odds: EVEN_ODDS,
                no_odds: EVEN_ODDS,
                yes_probability: EVEN_PROBABILITY,
                no_probability: EVEN_PROBABILITY,
            };
        }

        OddsSnapshot {
            yes_odds: total / self.yes_pool,
            no_odds: total / self.no_pool,
            yes_probability: self.yes_pool / total * 100.0,
            no_probability: self.no_pool / total * 100.0,
        }
    }

    /// Payout the bettor would lock in by staking `stake` on `side`
    ///
    /// Returns `None` when `stake` is not a positive finite amount. An empty
    /// market has no pot to split yet, so the first bet is quoted at
    /// [`EVEN_ODDS`].
    ///
    /// # Example
    /// ```ignore
    /// // YES = 3, NO = 1, user stakes 1 on NO
    /// let quote = ParimutuelPool::new(3.0, 1.0).quote(Side::No, 1.0).unwrap();
    /// // new NO = 2, new total = 6, payout = 1 / 2 * 6 = 3
    /// ```
    pub fn quote(&self, side: Side, stake: f64) -> Option<PayoutQuote> {
        if !stake.is_finite() || stake <= 0.0 {
            return None;
        }

        // Step 1: only the chosen side grows
        let (new_yes_pool, new_no_pool) = match side {
            Side::Yes => (self.yes_pool + stake, self.no_pool),
            Side::No => (self.yes_pool, self.no_pool + stake),
        };

        // Step 2: post-bet pot
        let new_total_pool = new_yes_pool + new_no_pool;
        let new_side_pool = match side {
            Side::Yes => new_yes_pool,
            Side::No => new_no_pool,
        };

        // Step 3: proportional share of the pot
        let (payout, implied_probability) = if self.total() == 0.0 {
            (stake * EVEN_ODDS, EVEN_PROBABILITY)
        } else {
            (
                stake / new_side_pool * new_total_pool,
                new_side_pool / new_total_pool * 100.0,
            )
        };

        Some(PayoutQuote {
            side,
            stake,
            new_yes_pool,
            new_no_pool,
            new_total_pool,
            payout,
            profit: payout - stake,
            multiplier: payout / stake,
            implied_probability,
        })
    }
}

/// Lamport payout the program locks into a position when the bet executes
///
/// Formula: `amount * total_after / side_after`, computed in u128. Falls back
/// to `amount` if the result does not fit or the side pool is empty, exactly
/// as the program does.
///
/// # Arguments
/// * `total_yes` - YES pool before the bet
/// * `total_no` - NO pool before the bet
/// * `side` - side being bet on
/// * `amount` - stake in lamports
pub fn locked_payout(total_yes: u64, total_no: u64, side: Side, amount: u64) -> u64 {
    let (yes_after, no_after) = match side {
        Side::Yes => (total_yes.saturating_add(amount), total_no),
        Side::No => (total_yes, total_no.saturating_add(amount)),
    };
    let side_after = match side {
        Side::Yes => yes_after,
        Side::No => no_after,
    };
    let total_after = yes_after.saturating_add(no_after);

    if side_after == 0 {
        return amount;
    }

    (amount as u128)
        .checked_mul(total_after as u128)
        .and_then(|v| v.checked_div(side_after as u128))
        .and_then(|v| u64::try_from(v).ok())
        .unwrap_or(amount)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn test_empty_market_is_even() {
        let odds = ParimutuelPool::new(0.0, 0.0).odds();
        assert_eq!(odds.yes_odds, 2.0);
        assert_eq!(odds.no_odds, 2.0);
        assert_eq!(odds.yes_probability, 50.0);
        assert_eq!(odds.no_probability, 50.0);
    }

    #[test]
    fn test_odds_times_side_pool_is_total() {
        let pools = [(1.0, 1.0), (3.0, 1.0), (0.25, 7.5), (1234.5, 0.001), (42.0, 58.0)];
        for (yes, no) in pools {
            let pool = ParimutuelPool::new(yes, no);
            let odds = pool.odds();
            assert!(approx(odds.yes_odds * yes, yes + no));
            assert!(approx(odds.no_odds * no, yes + no));
            assert!(approx(odds.yes_probability + odds.no_probability, 100.0));
        }
    }

    #[test]
    fn test_one_sided_market() {
        let odds = ParimutuelPool::new(3.0, 0.0).odds();
        assert_eq!(odds.yes_odds, 1.0);
        assert!(odds.no_odds.is_infinite());
        assert_eq!(odds.yes_probability, 100.0);
        assert_eq!(odds.no_probability, 0.0);
    }

    #[test]
    fn test_first_bet_doubles() {
        let pool = ParimutuelPool::new(0.0, 0.0);
        let odds = pool.odds();
        assert_eq!(odds.odds(Side::Yes), 2.0);
        assert_eq!(odds.odds(Side::No), 2.0);

        let quote = pool.quote(Side::Yes, 1.0).unwrap();
        assert_eq!(quote.new_yes_pool, 1.0);
        assert_eq!(quote.new_no_pool, 0.0);
        assert_eq!(quote.payout, 2.0);
        assert_eq!(quote.profit, 1.0);
        assert_eq!(quote.multiplier, 2.0);
        assert_eq!(quote.implied_probability, 50.0);
    }

    #[test]
    fn test_bet_against_single_opponent() {
        // One unit on each side already, user adds one to YES
        let quote = ParimutuelPool::new(0.0, 1.0).quote(Side::Yes, 1.0).unwrap();
        assert_eq!(quote.payout, 2.0);
        assert_eq!(quote.profit, 1.0);
        assert_eq!(quote.multiplier, 2.0);
    }

    #[test]
    fn test_bet_on_underdog() {
        let quote = ParimutuelPool::new(3.0, 1.0).quote(Side::No, 1.0).unwrap();
        assert_eq!(quote.new_no_pool, 2.0);
        assert_eq!(quote.new_yes_pool, 3.0);
        assert_eq!(quote.new_total_pool, 6.0);
        assert_eq!(quote.payout, 3.0);
        assert_eq!(quote.profit, 2.0);
        assert_eq!(quote.multiplier, 3.0);
        assert!(approx(quote.implied_probability, 100.0 / 3.0));
    }

    #[test]
    fn test_non_positive_stake_has_no_quote() {
        let pool = ParimutuelPool::new(3.0, 1.0);
        assert!(pool.quote(Side::Yes, 0.0).is_none());
        assert!(pool.quote(Side::No, -1.0).is_none());
        assert!(pool.quote(Side::No, f64::NAN).is_none());
    }

    #[test]
    fn test_quote_is_pure() {
        let mut pool = ParimutuelPool::new(3.0, 1.0);
        let captured = pool;
        let first = captured.quote(Side::No, 1.0).unwrap();

        // Later growth of the live pool does not touch a captured quote
        pool.yes_pool += 100.0;
        let second = captured.quote(Side::No, 1.0).unwrap();
        assert_eq!(first, second);
        assert_ne!(pool.quote(Side::No, 1.0).unwrap().payout, first.payout);
    }

    #[test]
    fn test_from_lamports() {
        let pool = ParimutuelPool::from_lamports(3 * LAMPORTS_PER_SOL, LAMPORTS_PER_SOL / 2);
        assert_eq!(pool.yes_pool, 3.0);
        assert_eq!(pool.no_pool, 0.5);
    }

    #[test]
    fn test_locked_payout_lamports() {
        let sol = LAMPORTS_PER_SOL;
        assert_eq!(locked_payout(3 * sol, sol, Side::No, sol), 3 * sol);
        assert_eq!(locked_payout(0, sol, Side::Yes, sol), 2 * sol);
        // The program locks a lone bettor's stake, not the even-odds preview
        assert_eq!(locked_payout(0, 0, Side::Yes, sol), sol);
    }

    #[test]
    fn test_locked_payout_rounds_down() {
        // 10 * 17 / 13 = 13.07..
        assert_eq!(locked_payout(3, 4, Side::Yes, 10), 13);
    }

    #[test]
    fn test_locked_payout_saturates_pools() {
        let payout = locked_payout(0, u64::MAX, Side::Yes, u64::MAX / 2);
        assert_eq!(payout, u64::MAX);
    }
}
