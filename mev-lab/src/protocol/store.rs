//! Commitment bookkeeping.

use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use veil::state::IntentKind;

use super::engine::ProtocolError;

/// A user's live blinded intent, mirroring the on-chain commitment PDA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commitment {
    /// Owner; the only party able to reveal or cancel
    pub owner: Pubkey,
    /// SHA-256 over the Borsh encoding of the committed intent
    pub hash: [u8; 32],
    /// Ledger timestamp at creation
    pub created_at: i64,
    /// Rounded amount for display only
    pub approx_amount: u64,
    /// Trade direction
    pub intent: IntentKind,
}

/// Authoritative record of live commitments, at most one per owner.
///
/// On-chain the one-per-owner rule falls out of the PDA seeds; here it is
/// enforced explicitly on insert.
#[derive(Debug, Default)]
pub struct CommitmentStore {
    live: HashMap<Pubkey, Commitment>,
}

impl CommitmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a commitment. Fails if the owner already has one live.
    pub fn insert(&mut self, commitment: Commitment) -> Result<(), ProtocolError> {
        if self.live.contains_key(&commitment.owner) {
            return Err(ProtocolError::CommitmentAlreadyExists);
        }
        self.live.insert(commitment.owner, commitment);
        Ok(())
    }

    /// Look up an owner's live commitment.
    pub fn get(&self, owner: &Pubkey) -> Option<&Commitment> {
        self.live.get(owner)
    }

    /// Close an owner's commitment, returning it if one was live.
    pub fn remove(&mut self, owner: &Pubkey) -> Option<Commitment> {
        self.live.remove(owner)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}
