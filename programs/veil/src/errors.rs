use anchor_lang::prelude::*;

/// Error codes for the veil program
#[error_code]
pub enum VeilError {
    /// A live commitment already exists for this user
    #[msg("Commitment already exists. Reveal or cancel it first.")]
    CommitmentAlreadyExists,

    /// No commitment found for this user, or it belongs to someone else
    #[msg("Commitment not found.")]
    CommitmentNotFound,

    /// The ledger clock has not advanced past created_at + MIN_DELAY_SECONDS
    #[msg("Minimum delay not met. The reveal window has not opened yet.")]
    DelayNotMet,

    /// Revealed intent does not hash to the stored commitment
    #[msg("Hash mismatch. The revealed details do not match the commitment.")]
    HashMismatch,

    /// Slippage tolerance above the ceiling, or quoted output below min_out
    #[msg("Slippage too high.")]
    SlippageTooHigh,

    /// Commit amount below the minimum worth shielding
    #[msg("Amount too small. Minimum is 1,000,000 lamports.")]
    AmountTooSmall,

    /// Arithmetic overflow while quoting the execution
    #[msg("Math overflow occurred.")]
    MathOverflow,

    /// Target pool cannot fund the execution
    #[msg("Insufficient liquidity for this execution.")]
    InsufficientLiquidity,
}
