use anchor_lang::prelude::*;

use crate::math::MathError;

/// Error codes for the AMM program
#[error_code]
pub enum AmmError {
    /// Fee above the 10% ceiling
    #[msg("Invalid fee. Maximum allowed is 1000 bps (10%).")]
    InvalidFee,

    /// Pool operations are paused by the authority
    #[msg("Pool is paused.")]
    PoolPaused,

    /// Zero-valued input where a positive amount is required
    #[msg("Input amount must be greater than zero.")]
    InsufficientInput,

    /// Computed output below the caller's minimum
    #[msg("Slippage tolerance exceeded.")]
    SlippageExceeded,

    /// Swap or withdrawal would exceed the pool's reserves
    #[msg("Insufficient liquidity in the pool.")]
    InsufficientLiquidity,

    /// Pool has no liquidity on one side
    #[msg("Pool reserves are empty.")]
    ZeroLiquidity,

    /// First deposit too small to cover the permanent liquidity lock
    #[msg("Initial deposit below the minimum locked liquidity.")]
    MinimumLiquidityNotMet,

    /// Arithmetic overflow in pricing or state update
    #[msg("Math overflow occurred.")]
    MathOverflow,

    /// Account does not match the pool's recorded mint or vault
    #[msg("Invalid token account for this pool.")]
    InvalidMint,

    /// Signer is not the pool authority
    #[msg("Signer is not the pool authority.")]
    InvalidAuthority,
}

impl From<MathError> for AmmError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::Overflow => Self::MathOverflow,
            MathError::ZeroLiquidity => Self::ZeroLiquidity,
            MathError::ZeroDeposit => Self::InsufficientInput,
            MathError::BelowMinimumLiquidity => Self::MinimumLiquidityNotMet,
        }
    }
}
