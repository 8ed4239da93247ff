//! Mempool visibility model.
//!
//! Classifies what an external observer learns from a pending transaction.
//! A direct swap publishes its full parameter set, which is the entire
//! attack surface a sandwich bot needs. A commit publishes a 32-byte hash,
//! a rounded amount and a direction; the nonce inside the hashed intent
//! makes the preimage unguessable, so there is nothing to size an attack
//! against. The simulator and the `explain` command both use this model;
//! neither gets a private side channel.

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use veil::state::IntentKind;

/// A transaction as it sits in the mempool, before execution.
#[derive(Debug, Clone)]
pub enum ObservedTransaction {
    /// Direct AMM swap with all parameters in the clear.
    DirectSwap {
        trader: Pubkey,
        amount_in: u64,
        a_to_b: bool,
        min_out: u64,
    },
    /// Commit-phase transaction of the veil protocol.
    Commit {
        user: Pubkey,
        hash: [u8; 32],
        approx_amount: u64,
        intent: IntentKind,
    },
    /// Reveal-phase transaction. The parameters become public here, but
    /// the swap executes in the same transaction, so visibility arrives
    /// only when it is too late to order against.
    Reveal { user: Pubkey, amount_in: u64 },
    /// Cancellation of a live commitment.
    Cancel { user: Pubkey },
}

/// Everything an observer can extract from one pending transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisibleFields {
    /// Transaction kind as the observer classifies it
    pub kind: String,
    /// Submitting wallet (always visible; signatures are public)
    pub trader: String,
    /// Exact input amount, when the transaction carries it in the clear
    pub exact_amount_in: Option<u64>,
    /// Trade direction, when visible
    pub direction: Option<String>,
    /// Victim's minimum acceptable output, when visible
    pub min_out: Option<u64>,
    /// Opaque commitment hash (hex), for commit transactions
    pub commitment_hash: Option<String>,
    /// Rounded amount a commit exposes for wallet display
    pub approx_amount: Option<u64>,
    /// Whether the visible information suffices to mount a sandwich
    pub can_sandwich: bool,
}

/// The subset of visible fields a sandwich bot actually feeds into its
/// profitability search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VictimSwap {
    pub amount_in: u64,
    pub a_to_b: bool,
    pub min_out: u64,
}

/// Classify one pending transaction.
pub fn observe(tx: &ObservedTransaction) -> VisibleFields {
    match tx {
        ObservedTransaction::DirectSwap {
            trader,
            amount_in,
            a_to_b,
            min_out,
        } => VisibleFields {
            kind: "direct_swap".to_string(),
            trader: trader.to_string(),
            exact_amount_in: Some(*amount_in),
            direction: Some(direction_label(*a_to_b).to_string()),
            min_out: Some(*min_out),
            commitment_hash: None,
            approx_amount: None,
            can_sandwich: true,
        },
        ObservedTransaction::Commit {
            user,
            hash,
            approx_amount,
            intent,
        } => VisibleFields {
            kind: "commit".to_string(),
            trader: user.to_string(),
            exact_amount_in: None,
            direction: Some(direction_label(intent.a_to_b()).to_string()),
            min_out: None,
            commitment_hash: Some(hex::encode(hash)),
            approx_amount: Some(*approx_amount),
            // The struct that reverses the hash, nonce included, is never
            // transmitted before execution.
            can_sandwich: false,
        },
        ObservedTransaction::Reveal { user, amount_in } => VisibleFields {
            kind: "reveal".to_string(),
            trader: user.to_string(),
            exact_amount_in: Some(*amount_in),
            direction: None,
            min_out: None,
            commitment_hash: None,
            approx_amount: None,
            // Everything is public now, and nothing is pending: the trade
            // settles atomically with this transaction.
            can_sandwich: false,
        },
        ObservedTransaction::Cancel { user } => VisibleFields {
            kind: "cancel".to_string(),
            trader: user.to_string(),
            exact_amount_in: None,
            direction: None,
            min_out: None,
            commitment_hash: None,
            approx_amount: None,
            can_sandwich: false,
        },
    }
}

/// What the attacker gets to work with, if anything.
///
/// Returns `None` unless the observation exposes the full parameter set;
/// a commit never does, so protected trades produce no victim here.
pub fn sandwich_target(fields: &VisibleFields) -> Option<VictimSwap> {
    if !fields.can_sandwich {
        return None;
    }
    Some(VictimSwap {
        amount_in: fields.exact_amount_in?,
        a_to_b: fields.direction.as_deref()? == "a_to_b",
        min_out: fields.min_out?,
    })
}

fn direction_label(a_to_b: bool) -> &'static str {
    if a_to_b {
        "a_to_b"
    } else {
        "b_to_a"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_swaps_expose_the_full_attack_surface() {
        let tx = ObservedTransaction::DirectSwap {
            trader: Pubkey::new_unique(),
            amount_in: 5_000_000_000,
            a_to_b: true,
            min_out: 4_900_000_000,
        };
        let fields = observe(&tx);
        assert!(fields.can_sandwich);

        let victim = sandwich_target(&fields).unwrap();
        assert_eq!(victim.amount_in, 5_000_000_000);
        assert!(victim.a_to_b);
        assert_eq!(victim.min_out, 4_900_000_000);
    }

    #[test]
    fn commits_never_yield_a_sandwich_target() {
        let tx = ObservedTransaction::Commit {
            user: Pubkey::new_unique(),
            hash: [0xab; 32],
            approx_amount: 5_000_000_000,
            intent: IntentKind::Stake,
        };
        let fields = observe(&tx);
        assert!(!fields.can_sandwich);
        assert!(fields.exact_amount_in.is_none());
        assert!(fields.min_out.is_none());
        assert_eq!(fields.commitment_hash.as_deref(), Some(&hex::encode([0xab; 32])[..]));
        assert!(sandwich_target(&fields).is_none());
    }

    #[test]
    fn reveals_come_too_late_to_attack() {
        let fields = observe(&ObservedTransaction::Reveal {
            user: Pubkey::new_unique(),
            amount_in: 5_000_000_000,
        });
        // The amount is finally public, but there is no pending swap left
        // to order around.
        assert_eq!(fields.exact_amount_in, Some(5_000_000_000));
        assert!(!fields.can_sandwich);
        assert!(sandwich_target(&fields).is_none());
    }

    #[test]
    fn cancels_reveal_only_the_wallet() {
        let fields = observe(&ObservedTransaction::Cancel {
            user: Pubkey::new_unique(),
        });
        assert!(!fields.can_sandwich);
        assert!(fields.direction.is_none());
        assert!(sandwich_target(&fields).is_none());
    }
}
