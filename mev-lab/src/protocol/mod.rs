//! Off-chain model of the veil commit-reveal protocol.
//!
//! The state machine here mirrors the on-chain program check for check:
//! same hash function (imported from the `veil` crate), same delay
//! constant, same check order. The one deliberate difference is the time
//! source: the simulated ledger clock advances only when the harness says
//! so, which makes "reveal too early" a reproducible test case rather than
//! a race.

pub mod clock;
pub mod engine;
pub mod store;

pub use clock::LedgerClock;
pub use engine::{ProtocolError, RevealReceipt, VeilProtocol};
pub use store::{Commitment, CommitmentStore};
