use anchor_lang::prelude::*;

use crate::math::{self, SwapQuote};

/// Seed for the pool config PDA
pub const POOL_SEED: &[u8] = b"pool";

/// Seed for the pool authority PDA (vault and LP mint authority)
pub const POOL_AUTHORITY_SEED: &[u8] = b"pool_auth";

/// Seed for the token A vault (wSOL)
pub const VAULT_A_SEED: &[u8] = b"vault_a";

/// Seed for the token B vault (vSOL)
pub const VAULT_B_SEED: &[u8] = b"vault_b";

/// Default swap fee (0.3% = 30 bps)
pub const DEFAULT_FEE_BPS: u16 = 30;

/// Ceiling for the swap fee (10% = 1000 bps)
pub const MAX_FEE_BPS: u16 = 1_000;

/// Constant-product pool for one token pair.
///
/// Reserves are tracked here rather than read from the vaults so that
/// donated tokens cannot skew pricing.
#[account]
#[derive(InitSpace)]
pub struct AmmPool {
    /// Pool admin (may pause and retune the fee)
    pub authority: Pubkey,

    /// Token A mint (wSOL)
    pub mint_a: Pubkey,

    /// Token B mint (vSOL)
    pub mint_b: Pubkey,

    /// PDA-owned vault holding token A
    pub vault_a: Pubkey,

    /// PDA-owned vault holding token B
    pub vault_b: Pubkey,

    /// LP share mint
    pub lp_mint: Pubkey,

    /// Current reserve of token A
    pub reserve_a: u64,

    /// Current reserve of token B
    pub reserve_b: u64,

    /// Outstanding LP shares
    pub lp_supply: u64,

    /// Swap fee in basis points
    pub fee_bps: u16,

    /// Pauses swaps and liquidity operations
    pub paused: bool,

    /// Lifetime fees accrued in token A
    pub fees_accrued_a: u64,

    /// Lifetime fees accrued in token B
    pub fees_accrued_b: u64,

    /// Bump for this PDA
    pub bump: u8,

    /// Bump for the authority PDA
    pub authority_bump: u8,
}

impl AmmPool {
    /// The invariant `reserve_a * reserve_b`.
    pub fn k(&self) -> u128 {
        (self.reserve_a as u128) * (self.reserve_b as u128)
    }

    /// Quote a swap against the current reserves without mutating them.
    pub fn quote_swap(&self, amount_in: u64, a_to_b: bool) -> Result<SwapQuote> {
        let (reserve_in, reserve_out) = self.oriented_reserves(a_to_b);
        math::swap_output(amount_in, reserve_in, reserve_out, self.fee_bps)
            .map_err(|e| crate::errors::AmmError::from(e).into())
    }

    /// LP shares minted for a deposit at the current reserves.
    pub fn quote_deposit(&self, amount_a: u64, amount_b: u64) -> Result<u64> {
        math::lp_for_deposit(amount_a, amount_b, self.reserve_a, self.reserve_b, self.lp_supply)
            .map_err(|e| crate::errors::AmmError::from(e).into())
    }

    /// Token amounts redeemed for burning LP shares at the current reserves.
    pub fn quote_withdraw(&self, lp_amount: u64) -> Result<(u64, u64)> {
        math::amounts_for_withdraw(lp_amount, self.reserve_a, self.reserve_b, self.lp_supply)
            .map_err(|e| crate::errors::AmmError::from(e).into())
    }

    /// Reserves ordered as (input, output) for the given direction.
    pub fn oriented_reserves(&self, a_to_b: bool) -> (u64, u64) {
        if a_to_b {
            (self.reserve_a, self.reserve_b)
        } else {
            (self.reserve_b, self.reserve_a)
        }
    }

    /// Price of token A in token B, scaled by 1e9.
    pub fn price_a_in_b(&self) -> u64 {
        if self.reserve_a == 0 {
            return 0;
        }
        ((self.reserve_b as u128)
            .saturating_mul(1_000_000_000)
            / self.reserve_a as u128) as u64
    }
}
