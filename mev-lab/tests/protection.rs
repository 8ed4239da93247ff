//! End-to-end protection properties: the attacker wins against direct
//! trades and gets nothing against committed ones.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use solana_sdk::pubkey::Pubkey;

use amm::math;
use mev_lab::attack::find_optimal_attack;
use mev_lab::config::SimulationConfig;
use mev_lab::mempool::{self, ObservedTransaction, VictimSwap};
use mev_lab::pool::PoolReserves;
use mev_lab::protocol::engine::blind_intent;
use mev_lab::protocol::VeilProtocol;
use mev_lab::scenario::Orchestrator;
use veil::state::{config as veil_config, intent_hash, IntentKind};

const SOL: u64 = 1_000_000_000;

/// The reference scenario: 1000/1000 SOL pool at 30 bps, a 5 SOL victim,
/// a 500 SOL attacker. Exposed, the victim bleeds; shielded, they lose
/// nothing.
#[test]
fn reference_trade_exposed_vs_shielded() {
    let pool = PoolReserves::new(1000 * SOL, 1000 * SOL, 30);

    // Exposed: the attack clears the threshold comfortably.
    let victim = VictimSwap {
        amount_in: 5 * SOL,
        a_to_b: true,
        min_out: 0,
    };
    let plan = find_optimal_attack(&victim, &pool, 500 * SOL, 10_000)
        .unwrap()
        .expect("the reference attack is profitable");
    assert!(plan.expected_profit > 0);
    assert!(plan.victim_expected_loss > 0);

    // Shielded: same trade through the protocol on an identical pool.
    let mut shielded_pool = pool.clone();
    let mut protocol = VeilProtocol::new(1_700_000_000);
    let mut rng = StdRng::seed_from_u64(1);
    let owner = Pubkey::new_unique();

    let expected = shielded_pool.quote(5 * SOL, true).unwrap().amount_out;
    let min_out = shielded_pool.min_output(5 * SOL, true, 100).unwrap();
    let (intent, hash) = blind_intent(&mut rng, 5 * SOL, min_out, 100);

    protocol
        .commit(owner, 5 * SOL, IntentKind::Stake, hash)
        .unwrap();

    // The attacker's only input is the mempool view of the commit, which
    // yields no victim to attack.
    let visible = mempool::observe(&ObservedTransaction::Commit {
        user: owner,
        hash,
        approx_amount: 5 * SOL,
        intent: IntentKind::Stake,
    });
    assert!(!visible.can_sandwich);
    assert!(mempool::sandwich_target(&visible).is_none());

    protocol.advance_clock(veil_config::MIN_DELAY_SECONDS);
    let receipt = protocol
        .reveal_and_execute(&owner, &intent, &mut shielded_pool)
        .unwrap();

    // Nothing intervened, so the shielded trader loses exactly nothing.
    assert_eq!(receipt.amount_out, expected);
}

#[test]
fn full_run_shielded_losses_are_zero() {
    let mut orchestrator = Orchestrator::new(SimulationConfig {
        total_transactions: 100,
        rng_seed: Some(99),
        ..SimulationConfig::default()
    })
    .unwrap();
    let results = orchestrator.run().unwrap();

    assert_eq!(results.summary.failed_scenarios, 0);
    assert!(results.summary.successful_attacks > 0);
    assert!(results.summary.total_victim_losses > 0);

    for record in &results.scenarios {
        let shielded = record.shielded.as_ref().unwrap();
        assert_eq!(shielded.loss, 0, "scenario {} leaked value", record.id);
    }

    // Aggregation is a straight fold over the scenarios.
    let profit_sum: i64 = results
        .scenarios
        .iter()
        .map(|r| r.attack.profit_lamports)
        .sum();
    assert_eq!(profit_sum, results.summary.total_mev_extracted);
}

proptest! {
    /// Same inputs, same quote, every time.
    #[test]
    fn swap_output_is_deterministic(
        amount_in in 1u64..=1_000_000 * SOL,
        reserve_in in 1u64..=1_000_000 * SOL,
        reserve_out in 1u64..=1_000_000 * SOL,
        fee_bps in 0u16..=1_000,
    ) {
        let a = math::swap_output(amount_in, reserve_in, reserve_out, fee_bps);
        let b = math::swap_output(amount_in, reserve_in, reserve_out, fee_bps);
        prop_assert_eq!(a, b);
    }

    /// A swap can never pay out the whole reserve.
    #[test]
    fn swap_output_never_drains(
        amount_in in 1u64..=1_000_000 * SOL,
        reserve_in in 1u64..=1_000_000 * SOL,
        reserve_out in 1u64..=1_000_000 * SOL,
        fee_bps in 0u16..=1_000,
    ) {
        let quote = math::swap_output(amount_in, reserve_in, reserve_out, fee_bps).unwrap();
        prop_assert!(quote.amount_out < reserve_out);
    }

    /// More in never means less out.
    #[test]
    fn swap_output_is_monotone(
        x in 1u64..=500_000 * SOL,
        delta in 0u64..=500_000 * SOL,
        reserve_in in 1u64..=1_000_000 * SOL,
        reserve_out in 1u64..=1_000_000 * SOL,
        fee_bps in 0u16..=1_000,
    ) {
        let small = math::swap_output(x, reserve_in, reserve_out, fee_bps).unwrap();
        let large = math::swap_output(x + delta, reserve_in, reserve_out, fee_bps).unwrap();
        prop_assert!(small.amount_out <= large.amount_out);
    }

    /// Intents survive serialization for any nonce, and the hash is a
    /// function of the contents alone.
    #[test]
    fn intent_round_trip(
        amount_in in 1u64..,
        min_out in 0u64..,
        slippage_bps in 0u16..=10_000,
        nonce in any::<[u8; 32]>(),
    ) {
        use anchor_lang::{AnchorDeserialize, AnchorSerialize};

        let intent = veil::state::SwapIntent { amount_in, min_out, slippage_bps, nonce };
        let bytes = intent.try_to_vec().unwrap();
        prop_assert_eq!(bytes.len(), veil::state::SwapIntent::ENCODED_LEN);

        let decoded = veil::state::SwapIntent::try_from_slice(&bytes).unwrap();
        prop_assert_eq!(&decoded, &intent);
        prop_assert_eq!(intent_hash(&decoded).unwrap(), intent_hash(&intent).unwrap());
    }
}
