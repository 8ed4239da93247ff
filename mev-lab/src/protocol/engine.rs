//! The commit-reveal state machine.

use amm::math::MathError;
use rand::Rng;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;
use tracing::debug;
use veil::state::{config, intent_hash, IntentKind, SwapIntent};

use super::clock::LedgerClock;
use super::store::{Commitment, CommitmentStore};
use crate::pool::PoolReserves;

/// Protocol violations and faults, matching the on-chain error surface.
/// All are caller errors; none is retried automatically (retrying a hash
/// mismatch cannot succeed).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("commitment already exists for this owner")]
    CommitmentAlreadyExists,
    #[error("no live commitment for this owner")]
    CommitmentNotFound,
    #[error("minimum delay not met; the reveal window has not opened")]
    DelayNotMet,
    #[error("revealed details do not hash to the commitment")]
    HashMismatch,
    #[error("slippage too high")]
    SlippageTooHigh,
    #[error("amount below the shielding minimum")]
    AmountTooSmall,
    #[error("arithmetic fault: {0}")]
    Math(#[from] MathError),
}

/// What a successful reveal produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealReceipt {
    pub amount_in: u64,
    pub amount_out: u64,
    pub fee: u64,
    pub intent: IntentKind,
    pub executed_at: i64,
}

/// Commit-reveal protocol over a simulated ledger.
///
/// States per owner: no commitment -> committed -> (revealed | cancelled)
/// -> no commitment. `reveal_and_execute` is the only path that moves
/// value, and it either completes every step or changes nothing.
#[derive(Debug)]
pub struct VeilProtocol {
    clock: LedgerClock,
    store: CommitmentStore,
}

impl VeilProtocol {
    pub fn new(start_time: i64) -> Self {
        Self {
            clock: LedgerClock::starting_at(start_time),
            store: CommitmentStore::new(),
        }
    }

    pub fn clock(&self) -> &LedgerClock {
        &self.clock
    }

    /// Advance the simulated ledger clock (block time passing).
    pub fn advance_clock(&mut self, seconds: i64) {
        self.clock.advance(seconds);
    }

    /// Record a blinded intent for `owner`, stamped with the ledger clock.
    pub fn commit(
        &mut self,
        owner: Pubkey,
        approx_amount: u64,
        intent: IntentKind,
        hash: [u8; 32],
    ) -> Result<(), ProtocolError> {
        if approx_amount < config::MIN_COMMIT_LAMPORTS {
            return Err(ProtocolError::AmountTooSmall);
        }

        self.store.insert(Commitment {
            owner,
            hash,
            created_at: self.clock.unix_timestamp(),
            approx_amount,
            intent,
        })?;

        debug!(owner = %owner, hash = %hex::encode(&hash[..8]), "commitment recorded");
        Ok(())
    }

    /// The owner's live commitment, if any.
    pub fn commitment(&self, owner: &Pubkey) -> Option<&Commitment> {
        self.store.get(owner)
    }

    /// Verify the revealed details and execute the trade against `pool`.
    ///
    /// Check order matches the chain: existence, delay, hash, slippage
    /// ceiling, output floor. The pool is mutated and the commitment closed
    /// only after every check has passed, so a failed reveal leaves both
    /// exactly as they were.
    pub fn reveal_and_execute(
        &mut self,
        owner: &Pubkey,
        details: &SwapIntent,
        pool: &mut PoolReserves,
    ) -> Result<RevealReceipt, ProtocolError> {
        let commitment = self
            .store
            .get(owner)
            .ok_or(ProtocolError::CommitmentNotFound)?;

        let now = self.clock.unix_timestamp();
        if now < commitment.created_at + config::MIN_DELAY_SECONDS {
            return Err(ProtocolError::DelayNotMet);
        }

        let computed = intent_hash(details).map_err(|_| ProtocolError::HashMismatch)?;
        if computed != commitment.hash {
            return Err(ProtocolError::HashMismatch);
        }

        if details.slippage_bps > config::MAX_SLIPPAGE_BPS {
            return Err(ProtocolError::SlippageTooHigh);
        }

        let a_to_b = commitment.intent.a_to_b();
        let quote = pool.quote(details.amount_in, a_to_b)?;
        if quote.amount_out < details.min_out {
            return Err(ProtocolError::SlippageTooHigh);
        }

        // Every check passed; the mutation below cannot fail differently
        // from the quote above because the math is deterministic.
        let intent = commitment.intent;
        let executed = pool.apply_swap(details.amount_in, a_to_b)?;
        self.store
            .remove(owner)
            .expect("commitment present; checked above");

        debug!(owner = %owner, amount_out = executed.amount_out, "reveal executed");

        Ok(RevealReceipt {
            amount_in: details.amount_in,
            amount_out: executed.amount_out,
            fee: executed.fee,
            intent,
            executed_at: now,
        })
    }

    /// Close the owner's commitment without executing. No delay applies.
    pub fn cancel(&mut self, owner: &Pubkey) -> Result<Commitment, ProtocolError> {
        self.store
            .remove(owner)
            .ok_or(ProtocolError::CommitmentNotFound)
    }

    pub fn live_commitments(&self) -> usize {
        self.store.len()
    }
}

/// Build an intent with a fresh random nonce and return it with its
/// commitment hash. This is the client-side half of `commit`.
pub fn blind_intent(
    rng: &mut impl Rng,
    amount_in: u64,
    min_out: u64,
    slippage_bps: u16,
) -> (SwapIntent, [u8; 32]) {
    let mut nonce = [0u8; 32];
    rng.fill(&mut nonce);
    let intent = SwapIntent {
        amount_in,
        min_out,
        slippage_bps,
        nonce,
    };
    let hash = intent_hash(&intent).expect("fixed-size struct serializes infallibly");
    (intent, hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const SOL: u64 = 1_000_000_000;
    const START: i64 = 1_700_000_000;

    fn pool() -> PoolReserves {
        PoolReserves::new(1000 * SOL, 1000 * SOL, 30)
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(11)
    }

    fn committed(
        protocol: &mut VeilProtocol,
        rng: &mut StdRng,
        pool: &PoolReserves,
        amount: u64,
    ) -> (Pubkey, SwapIntent) {
        let owner = Pubkey::new_unique();
        let min_out = pool.min_output(amount, true, 100).unwrap();
        let (intent, hash) = blind_intent(rng, amount, min_out, 100);
        protocol
            .commit(owner, amount, IntentKind::Stake, hash)
            .unwrap();
        (owner, intent)
    }

    #[test]
    fn reveal_before_delay_fails_and_mutates_nothing() {
        let mut protocol = VeilProtocol::new(START);
        let mut rng = rng();
        let mut pool = pool();
        let before = pool.clone();

        let (owner, intent) = committed(&mut protocol, &mut rng, &pool, SOL);

        // Ledger clock has not moved: the window is closed.
        let err = protocol.reveal_and_execute(&owner, &intent, &mut pool);
        assert_eq!(err.unwrap_err(), ProtocolError::DelayNotMet);
        assert_eq!(pool, before);
        assert!(protocol.commitment(&owner).is_some());

        // One second short is still closed.
        protocol.advance_clock(config::MIN_DELAY_SECONDS - 1);
        let err = protocol.reveal_and_execute(&owner, &intent, &mut pool);
        assert_eq!(err.unwrap_err(), ProtocolError::DelayNotMet);
    }

    #[test]
    fn reveal_succeeds_once_the_window_opens() {
        let mut protocol = VeilProtocol::new(START);
        let mut rng = rng();
        let mut pool = pool();

        let (owner, intent) = committed(&mut protocol, &mut rng, &pool, SOL);
        protocol.advance_clock(config::MIN_DELAY_SECONDS);

        let receipt = protocol
            .reveal_and_execute(&owner, &intent, &mut pool)
            .unwrap();
        assert!(receipt.amount_out >= intent.min_out);
        assert!(protocol.commitment(&owner).is_none());
    }

    #[test]
    fn near_miss_details_always_mismatch() {
        let mut protocol = VeilProtocol::new(START);
        let mut rng = rng();
        let mut pool = pool();

        let (owner, intent) = committed(&mut protocol, &mut rng, &pool, SOL);
        protocol.advance_clock(config::MIN_DELAY_SECONDS);

        // Off by one lamport.
        let mut tampered = intent.clone();
        tampered.amount_in += 1;
        assert_eq!(
            protocol
                .reveal_and_execute(&owner, &tampered, &mut pool)
                .unwrap_err(),
            ProtocolError::HashMismatch
        );

        // Same amounts, different nonce.
        let mut renonced = intent.clone();
        renonced.nonce[0] ^= 0xff;
        assert_eq!(
            protocol
                .reveal_and_execute(&owner, &renonced, &mut pool)
                .unwrap_err(),
            ProtocolError::HashMismatch
        );

        // The genuine details still work afterwards: failures changed nothing.
        protocol
            .reveal_and_execute(&owner, &intent, &mut pool)
            .unwrap();
    }

    #[test]
    fn slippage_floor_is_enforced() {
        let mut protocol = VeilProtocol::new(START);
        let mut rng = rng();
        let mut pool = pool();

        let owner = Pubkey::new_unique();
        // min_out demands more than the pool can ever pay for this size.
        let quote = pool.quote(SOL, true).unwrap();
        let (intent, hash) = blind_intent(&mut rng, SOL, quote.amount_out + 1, 100);
        protocol.commit(owner, SOL, IntentKind::Stake, hash).unwrap();
        protocol.advance_clock(config::MIN_DELAY_SECONDS);

        assert_eq!(
            protocol
                .reveal_and_execute(&owner, &intent, &mut pool)
                .unwrap_err(),
            ProtocolError::SlippageTooHigh
        );
        // Not consumed; the owner can cancel and recommit.
        assert!(protocol.cancel(&owner).is_ok());
    }

    #[test]
    fn cancel_needs_no_delay_and_frees_the_slot() {
        let mut protocol = VeilProtocol::new(START);
        let mut rng = rng();
        let pool = pool();

        let (owner, _) = committed(&mut protocol, &mut rng, &pool, SOL);
        assert!(protocol.cancel(&owner).is_ok());
        assert_eq!(
            protocol.cancel(&owner).unwrap_err(),
            ProtocolError::CommitmentNotFound
        );

        // Slot is free again immediately.
        let (_, hash) = blind_intent(&mut rng, SOL, 0, 100);
        protocol.commit(owner, SOL, IntentKind::Stake, hash).unwrap();
    }

    #[test]
    fn dust_commitments_are_rejected() {
        let mut protocol = VeilProtocol::new(START);
        let mut rng = rng();
        let (_, hash) = blind_intent(&mut rng, 10, 0, 100);
        assert_eq!(
            protocol
                .commit(Pubkey::new_unique(), 10, IntentKind::Stake, hash)
                .unwrap_err(),
            ProtocolError::AmountTooSmall
        );
    }

    #[test]
    fn reveal_without_commitment_fails() {
        let mut protocol = VeilProtocol::new(START);
        let mut rng = rng();
        let mut pool = pool();
        let (intent, _) = blind_intent(&mut rng, SOL, 0, 100);
        assert_eq!(
            protocol
                .reveal_and_execute(&Pubkey::new_unique(), &intent, &mut pool)
                .unwrap_err(),
            ProtocolError::CommitmentNotFound
        );
    }
}
