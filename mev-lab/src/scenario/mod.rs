//! Paired-scenario simulation.
//!
//! The orchestrator runs every trade twice, once exposed and once
//! shielded, against independent clones of the same pool snapshot, so the
//! two halves differ in exactly one variable: whether the attacker can see
//! the parameters.

pub mod orchestrator;
pub mod records;

pub use orchestrator::Orchestrator;
pub use records::{RunResults, RunSummary, ScenarioRecord};

use solana_sdk::pubkey::Pubkey;

/// A trading wallet with balances in both tokens.
#[derive(Debug, Clone)]
pub struct Trader {
    pub key: Pubkey,
    pub balance_a: u64,
    pub balance_b: u64,
}

impl Trader {
    pub fn new(balance_a: u64, balance_b: u64) -> Self {
        Self {
            key: Pubkey::new_unique(),
            balance_a,
            balance_b,
        }
    }

    /// Whether this wallet can fund a swap of `amount` on the given side.
    pub fn can_afford(&self, amount: u64, a_to_b: bool) -> bool {
        if a_to_b {
            self.balance_a >= amount
        } else {
            self.balance_b >= amount
        }
    }

    /// Book a completed swap: input debited, output credited.
    pub fn settle_swap(&mut self, amount_in: u64, amount_out: u64, a_to_b: bool) {
        if a_to_b {
            self.balance_a -= amount_in;
            self.balance_b += amount_out;
        } else {
            self.balance_b -= amount_in;
            self.balance_a += amount_out;
        }
    }

    /// Restore the wallet to its starting balances.
    pub fn refill(&mut self, balance_a: u64, balance_b: u64) {
        self.balance_a = balance_a;
        self.balance_b = balance_b;
    }
}
