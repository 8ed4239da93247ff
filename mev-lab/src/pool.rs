//! In-memory pool state.
//!
//! Mirrors the on-chain `AmmPool` reserves and prices every operation
//! through `amm::math`, the exact functions the program runs. Scenario
//! halves clone this freely; a clone is a fully independent pool.

use amm::math::{self, MathError, SwapQuote};
use serde::{Deserialize, Serialize};

/// Reserves, fee and LP supply of one pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolReserves {
    /// Reserve of token A (wSOL) in lamports
    #[serde(with = "crate::ser::u64_string")]
    pub reserve_a: u64,
    /// Reserve of token B (vSOL) in lamports
    #[serde(with = "crate::ser::u64_string")]
    pub reserve_b: u64,
    /// Fee in basis points
    pub fee_bps: u16,
    /// Outstanding LP shares
    #[serde(with = "crate::ser::u64_string")]
    pub lp_supply: u64,
}

impl PoolReserves {
    /// Pool with the given reserves and no LP shares issued yet.
    pub fn new(reserve_a: u64, reserve_b: u64, fee_bps: u16) -> Self {
        Self {
            reserve_a,
            reserve_b,
            fee_bps,
            lp_supply: 0,
        }
    }

    /// The invariant `reserve_a * reserve_b`.
    pub fn k(&self) -> u128 {
        (self.reserve_a as u128) * (self.reserve_b as u128)
    }

    /// Spot price of A in B. Display only; never used for pricing.
    pub fn price_a_in_b(&self) -> f64 {
        if self.reserve_a == 0 {
            return 0.0;
        }
        self.reserve_b as f64 / self.reserve_a as f64
    }

    /// Quote a swap without touching the reserves.
    pub fn quote(&self, amount_in: u64, a_to_b: bool) -> Result<SwapQuote, MathError> {
        let (reserve_in, reserve_out) = self.oriented(a_to_b);
        math::swap_output(amount_in, reserve_in, reserve_out, self.fee_bps)
    }

    /// Execute a swap against the reserves. Quotes first and mutates only
    /// on success, so a failed swap leaves the pool exactly as it was.
    pub fn apply_swap(&mut self, amount_in: u64, a_to_b: bool) -> Result<SwapQuote, MathError> {
        let quote = self.quote(amount_in, a_to_b)?;
        if a_to_b {
            self.reserve_a = self
                .reserve_a
                .checked_add(amount_in)
                .ok_or(MathError::Overflow)?;
            self.reserve_b -= quote.amount_out; // amount_out < reserve_b guaranteed
        } else {
            self.reserve_b = self
                .reserve_b
                .checked_add(amount_in)
                .ok_or(MathError::Overflow)?;
            self.reserve_a -= quote.amount_out;
        }
        Ok(quote)
    }

    /// Deposit liquidity; returns the LP shares minted. The first deposit
    /// also books the permanently locked minimum.
    pub fn deposit_liquidity(&mut self, amount_a: u64, amount_b: u64) -> Result<u64, MathError> {
        let first_deposit = self.lp_supply == 0;
        let minted = math::lp_for_deposit(
            amount_a,
            amount_b,
            self.reserve_a,
            self.reserve_b,
            self.lp_supply,
        )?;

        if first_deposit {
            self.lp_supply = math::MINIMUM_LIQUIDITY;
        }
        self.reserve_a = self
            .reserve_a
            .checked_add(amount_a)
            .ok_or(MathError::Overflow)?;
        self.reserve_b = self
            .reserve_b
            .checked_add(amount_b)
            .ok_or(MathError::Overflow)?;
        self.lp_supply = self
            .lp_supply
            .checked_add(minted)
            .ok_or(MathError::Overflow)?;

        Ok(minted)
    }

    /// Burn LP shares; returns the token amounts redeemed.
    pub fn withdraw_liquidity(&mut self, lp_amount: u64) -> Result<(u64, u64), MathError> {
        let (amount_a, amount_b) =
            math::amounts_for_withdraw(lp_amount, self.reserve_a, self.reserve_b, self.lp_supply)?;
        if amount_a >= self.reserve_a || amount_b >= self.reserve_b {
            return Err(MathError::ZeroLiquidity);
        }

        self.reserve_a -= amount_a;
        self.reserve_b -= amount_b;
        self.lp_supply = self
            .lp_supply
            .checked_sub(lp_amount)
            .ok_or(MathError::Overflow)?;

        Ok((amount_a, amount_b))
    }

    /// Minimum acceptable output for a trade at the current reserves under
    /// a slippage tolerance.
    pub fn min_output(&self, amount_in: u64, a_to_b: bool, slippage_bps: u16) -> Result<u64, MathError> {
        let quote = self.quote(amount_in, a_to_b)?;
        Ok(math::min_output_for_slippage(quote.amount_out, slippage_bps))
    }

    fn oriented(&self, a_to_b: bool) -> (u64, u64) {
        if a_to_b {
            (self.reserve_a, self.reserve_b)
        } else {
            (self.reserve_b, self.reserve_a)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOL: u64 = 1_000_000_000;

    fn pool() -> PoolReserves {
        PoolReserves::new(1000 * SOL, 1000 * SOL, 30)
    }

    #[test]
    fn apply_swap_moves_both_reserves() {
        let mut p = pool();
        let quote = p.apply_swap(SOL, true).unwrap();
        assert_eq!(p.reserve_a, 1000 * SOL + SOL);
        assert_eq!(p.reserve_b, 1000 * SOL - quote.amount_out);
        assert!(p.reserve_b > 0);
    }

    #[test]
    fn failed_swap_leaves_reserves_untouched() {
        let mut p = PoolReserves::new(0, 1000 * SOL, 30);
        let before = p.clone();
        assert!(p.apply_swap(SOL, true).is_err());
        assert_eq!(p, before);
    }

    #[test]
    fn clones_evolve_independently() {
        let mut a = pool();
        let b = a.clone();
        a.apply_swap(5 * SOL, true).unwrap();
        assert_ne!(a, b);
        assert_eq!(b, pool());
    }

    #[test]
    fn k_grows_with_fees() {
        let mut p = pool();
        let k_before = p.k();
        p.apply_swap(5 * SOL, true).unwrap();
        assert!(p.k() >= k_before);
    }

    #[test]
    fn liquidity_round_trip() {
        let mut p = PoolReserves::new(0, 0, 30);
        let minted = p.deposit_liquidity(1000 * SOL, 1000 * SOL).unwrap();
        assert!(minted > 0);
        assert_eq!(p.lp_supply, minted + amm::math::MINIMUM_LIQUIDITY);

        let (out_a, out_b) = p.withdraw_liquidity(minted / 2).unwrap();
        assert!(out_a > 0 && out_b > 0);
        assert!(p.reserve_a > 0 && p.reserve_b > 0);
    }

    #[test]
    fn min_output_respects_tolerance() {
        let p = pool();
        let quote = p.quote(SOL, true).unwrap();
        let floor = p.min_output(SOL, true, 100).unwrap();
        assert!(floor <= quote.amount_out);
        assert!(floor >= quote.amount_out - quote.amount_out / 50);
    }
}
