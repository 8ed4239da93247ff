use anchor_lang::prelude::*;

use crate::state::IntentKind;

/// A blinded intent was recorded on-chain.
#[event]
pub struct CommitmentCreated {
    pub user: Pubkey,
    pub hash: [u8; 32],
    pub approx_amount: u64,
    pub intent: IntentKind,
    pub created_at: i64,
}

/// A commitment was revealed and executed against the pool.
#[event]
pub struct IntentExecuted {
    pub user: Pubkey,
    pub amount_in: u64,
    pub min_out: u64,
    pub intent: IntentKind,
    pub executed_at: i64,
}

/// A commitment was withdrawn by its owner before execution.
#[event]
pub struct CommitmentCancelled {
    pub user: Pubkey,
    pub cancelled_at: i64,
}
