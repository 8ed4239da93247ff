use anchor_lang::prelude::*;
use sha2::{Digest, Sha256};

/// Seed prefix for commitment PDAs: ["veil", user]
pub const COMMITMENT_SEED: &[u8] = b"veil";

/// Protocol timing and limits
pub mod config {
    /// Seconds that must elapse on the ledger clock between commit and
    /// reveal. Enforced on-chain; a client cannot shorten it by submitting
    /// early, the reveal simply fails until the clock satisfies it.
    pub const MIN_DELAY_SECONDS: i64 = 2;

    /// Ceiling on the slippage tolerance a reveal may carry (10%)
    pub const MAX_SLIPPAGE_BPS: u16 = 1_000;

    /// Smallest amount worth shielding (0.001 SOL)
    pub const MIN_COMMIT_LAMPORTS: u64 = 1_000_000;
}

/// Which way the shielded trade moves through the pool.
#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, PartialEq, Eq, Debug)]
pub enum IntentKind {
    /// wSOL -> vSOL
    Stake,
    /// vSOL -> wSOL
    Unstake,
}

impl IntentKind {
    /// Direction flag in the AMM's orientation.
    pub fn a_to_b(self) -> bool {
        matches!(self, Self::Stake)
    }
}

/// A user's live blinded intent.
///
/// Observers see this account's fields, which is exactly why it carries no
/// pricing information: the hash is opaque without the nonce, and
/// `approx_amount` exists for wallet display only.
#[account]
#[derive(InitSpace)]
pub struct Commitment {
    /// The user who created this commitment; the only party able to
    /// reveal or cancel it
    pub user: Pubkey,

    /// SHA-256 over the Borsh encoding of the committed [`SwapIntent`]
    pub hash: [u8; 32],

    /// Ledger timestamp at creation, stamped by `commit` from `Clock`
    pub created_at: i64,

    /// PDA bump
    pub bump: u8,

    /// Rounded amount for display; deliberately not the committed amount
    pub approx_amount: u64,

    /// Trade direction (visible; direction alone is not enough to size
    /// a profitable sandwich)
    pub intent: IntentKind,
}

/// The plaintext a commitment blinds. Generated client-side at commit time,
/// transmitted only inside the reveal.
///
/// Borsh layout, 50 bytes: amount_in (u64 LE) + min_out (u64 LE) +
/// slippage_bps (u16 LE) + nonce (32 raw bytes).
#[derive(AnchorSerialize, AnchorDeserialize, Clone, PartialEq, Eq, Debug)]
pub struct SwapIntent {
    /// Input amount in base units
    pub amount_in: u64,

    /// Minimum acceptable output; the reveal aborts below this
    pub min_out: u64,

    /// Slippage tolerance used to derive `min_out`
    pub slippage_bps: u16,

    /// Random salt; without it the hash could be brute-forced from the
    /// small space of plausible amounts
    pub nonce: [u8; 32],
}

impl SwapIntent {
    /// Encoded length of the Borsh serialization.
    pub const ENCODED_LEN: usize = 8 + 8 + 2 + 32;
}

/// SHA-256 of the Borsh encoding of an intent. This is the only function
/// that defines the commitment hash; the simulator and tests call it too,
/// so "matches on-chain" is a tautology rather than a hope.
pub fn intent_hash(intent: &SwapIntent) -> std::io::Result<[u8; 32]> {
    let mut bytes = Vec::with_capacity(SwapIntent::ENCODED_LEN);
    intent.serialize(&mut bytes)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent(amount_in: u64, nonce_byte: u8) -> SwapIntent {
        SwapIntent {
            amount_in,
            min_out: amount_in / 2,
            slippage_bps: 100,
            nonce: [nonce_byte; 32],
        }
    }

    #[test]
    fn encoding_is_fifty_bytes() {
        let bytes = intent(1_000_000_000, 7).try_to_vec().unwrap();
        assert_eq!(bytes.len(), SwapIntent::ENCODED_LEN);
    }

    #[test]
    fn hash_is_stable_for_equal_intents() {
        let a = intent_hash(&intent(1_000_000_000, 42)).unwrap();
        let b = intent_hash(&intent(1_000_000_000, 42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn hash_separates_amounts_and_nonces() {
        let base = intent_hash(&intent(1_000_000_000, 42)).unwrap();
        assert_ne!(base, intent_hash(&intent(1_000_000_001, 42)).unwrap());
        assert_ne!(base, intent_hash(&intent(1_000_000_000, 43)).unwrap());
    }

    #[test]
    fn intent_round_trips_through_borsh() {
        let original = intent(123_456_789, 9);
        let bytes = original.try_to_vec().unwrap();
        let decoded = SwapIntent::try_from_slice(&bytes).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn stake_maps_to_a_to_b() {
        assert!(IntentKind::Stake.a_to_b());
        assert!(!IntentKind::Unstake.a_to_b());
    }
}
