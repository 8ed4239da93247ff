//! The simulation orchestrator.

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};
use veil::state::{config as veil_config, IntentKind};

use super::records::{
    AttackRecord, ConfigSummary, RunResults, RunSummary, ScenarioRecord, TradeRecord,
};
use super::Trader;
use crate::attack::{find_optimal_attack, SandwichExecutor};
use crate::config::SimulationConfig;
use crate::mempool::{self, ObservedTransaction};
use crate::pool::PoolReserves;
use crate::protocol::engine::blind_intent;
use crate::protocol::VeilProtocol;

/// Ledger genesis for the simulated clock. Any fixed point works; runs are
/// reproducible because nothing reads the wall clock.
const GENESIS_TIMESTAMP: i64 = 1_700_000_000;

/// Drives `N` paired scenarios and aggregates the results.
pub struct Orchestrator {
    config: SimulationConfig,
    rng: StdRng,
    /// The shared pool; scenario halves run on clones of it
    pool: PoolReserves,
    protocol: VeilProtocol,
    attacker: SandwichExecutor,
    /// Wallets making direct, attackable swaps
    direct_fleet: Vec<Trader>,
    /// Wallets trading through the commit-reveal protocol
    shielded_fleet: Vec<Trader>,
}

impl Orchestrator {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        // Seed the pool through the liquidity path the chain would use.
        let mut pool = PoolReserves::new(0, 0, config.fee_bps);
        pool.deposit_liquidity(config.initial_reserve_a, config.initial_reserve_b)
            .context("seeding pool liquidity")?;

        let attacker = SandwichExecutor::new(config.attacker_capital, config.attacker_capital);

        let direct_fleet = (0..config.num_traders)
            .map(|_| Trader::new(config.trader_balance_a, config.trader_balance_b))
            .collect();
        let shielded_fleet = (0..config.num_traders)
            .map(|_| Trader::new(config.trader_balance_a, config.trader_balance_b))
            .collect();

        Ok(Self {
            config,
            rng,
            pool,
            protocol: VeilProtocol::new(GENESIS_TIMESTAMP),
            attacker,
            direct_fleet,
            shielded_fleet,
        })
    }

    /// Run every scenario and aggregate. A scenario that fails is recorded
    /// as failed and excluded from the statistics; it never aborts the run.
    pub fn run(&mut self) -> Result<RunResults> {
        let total = self.config.total_transactions;
        info!(
            scenarios = total,
            attack_probability = self.config.attack_probability,
            "starting simulation"
        );

        let mut scenarios = Vec::with_capacity(total as usize);
        for id in 0..total {
            let record = match self.run_scenario(id) {
                Ok(record) => record,
                Err(err) => {
                    warn!(scenario = id, error = %err, "scenario failed; continuing");
                    ScenarioRecord::failed(id, err.to_string())
                }
            };
            scenarios.push(record);

            if (id + 1) % 100 == 0 {
                info!("progress: {}/{} scenarios", id + 1, total);
            }
        }

        let summary = summarize(&scenarios);
        info!(
            mev_extracted = summary.total_mev_extracted,
            victim_losses = summary.total_victim_losses,
            savings = summary.total_protected_savings,
            "simulation complete"
        );

        Ok(RunResults {
            config: ConfigSummary::from(&self.config),
            summary,
            scenarios,
            finished_at: chrono::Utc::now().timestamp(),
        })
    }

    fn run_scenario(&mut self, id: u32) -> Result<ScenarioRecord> {
        let amount = self
            .rng
            .gen_range(self.config.min_swap_lamports..=self.config.max_swap_lamports);
        let a_to_b = self.rng.gen_bool(0.5);
        let attempt_attack = self.rng.gen_bool(self.config.attack_probability);
        let trader_idx = self.pick_trader(amount, a_to_b);

        // Both halves start from the identical snapshot; neither can be
        // advantaged by the other's outcome.
        let base = self.pool.clone();

        let mut pool_direct = base.clone();
        let (direct, attack) =
            self.run_direct_half(trader_idx, amount, a_to_b, attempt_attack, &mut pool_direct)?;

        let mut pool_shielded = base;
        let shielded = self.run_shielded_half(trader_idx, amount, a_to_b, &mut pool_shielded)?;

        // The shared pool advances by the trade itself; attack distortion
        // stays local to the scenario that suffered it.
        self.pool = pool_shielded.clone();

        Ok(ScenarioRecord {
            id,
            failure: None,
            attack,
            direct: Some(direct),
            shielded: Some(shielded),
            pool_after_direct: Some(pool_direct),
            pool_after_shielded: Some(pool_shielded),
        })
    }

    /// The exposed half: the trade goes to the mempool in the clear, and
    /// the attacker reads it like anyone else can.
    fn run_direct_half(
        &mut self,
        trader_idx: usize,
        amount: u64,
        a_to_b: bool,
        attempt_attack: bool,
        pool: &mut PoolReserves,
    ) -> Result<(TradeRecord, AttackRecord)> {
        let trader_key = self.direct_fleet[trader_idx].key;
        let expected = pool.quote(amount, a_to_b)?;

        let visible = mempool::observe(&ObservedTransaction::DirectSwap {
            trader: trader_key,
            amount_in: amount,
            a_to_b,
            // Direct traders in the wild rarely set a meaningful floor.
            min_out: 0,
        });

        if attempt_attack {
            if let Some(victim) = mempool::sandwich_target(&visible) {
                let capital = self.attacker.capital_for(a_to_b);
                if let Some(plan) = find_optimal_attack(
                    &victim,
                    pool,
                    capital,
                    self.config.min_attack_profit,
                )? {
                    let outcome = self.attacker.execute(&plan, &victim, pool)?;
                    self.direct_fleet[trader_idx].settle_swap(amount, outcome.victim_out, a_to_b);

                    let trade = TradeRecord {
                        trader: trader_key.to_string(),
                        amount_in: amount,
                        a_to_b,
                        expected_out: expected.amount_out,
                        actual_out: outcome.victim_out,
                        loss: outcome.victim_loss,
                        was_attacked: true,
                        fee_paid: expected.fee,
                        price_impact_bps: expected.price_impact_bps,
                    };
                    let attack = AttackRecord {
                        attempted: true,
                        executed: true,
                        front_run_amount: plan.front_run_amount,
                        profit_lamports: outcome.realized_profit,
                        victim_loss_lamports: outcome.victim_loss,
                    };
                    return Ok((trade, attack));
                }

                debug!("no candidate cleared the profit threshold");
                self.attacker.record_skip();
                let trade = self.plain_swap(trader_idx, amount, a_to_b, pool)?;
                return Ok((trade, AttackRecord::unprofitable()));
            }
        }

        let trade = self.plain_swap(trader_idx, amount, a_to_b, pool)?;
        Ok((trade, AttackRecord::not_attempted()))
    }

    /// The protected half: commit, wait out the on-chain delay, reveal.
    /// The attacker observes the commit and learns nothing actionable.
    fn run_shielded_half(
        &mut self,
        trader_idx: usize,
        amount: u64,
        a_to_b: bool,
        pool: &mut PoolReserves,
    ) -> Result<TradeRecord> {
        let trader_key = self.shielded_fleet[trader_idx].key;
        let expected = pool.quote(amount, a_to_b)?;
        let min_out = pool.min_output(amount, a_to_b, self.config.shielded_slippage_bps)?;

        let (intent, hash) =
            blind_intent(&mut self.rng, amount, min_out, self.config.shielded_slippage_bps);
        let kind = if a_to_b {
            IntentKind::Stake
        } else {
            IntentKind::Unstake
        };

        // Wallets display a rounded figure; the exact amount stays inside
        // the hash.
        let approx_amount = amount - amount % 10_000_000;
        self.protocol.commit(trader_key, approx_amount, kind, hash)?;

        // This is all the mempool ever shows for this trade.
        let visible = mempool::observe(&ObservedTransaction::Commit {
            user: trader_key,
            hash,
            approx_amount,
            intent: kind,
        });
        debug_assert!(mempool::sandwich_target(&visible).is_none());

        // Block time passes; the reveal window opens.
        self.protocol
            .advance_clock(veil_config::MIN_DELAY_SECONDS);

        let receipt = self.protocol.reveal_and_execute(&trader_key, &intent, pool)?;
        self.shielded_fleet[trader_idx].settle_swap(amount, receipt.amount_out, a_to_b);

        Ok(TradeRecord {
            trader: trader_key.to_string(),
            amount_in: amount,
            a_to_b,
            expected_out: expected.amount_out,
            actual_out: receipt.amount_out,
            loss: expected.amount_out.saturating_sub(receipt.amount_out),
            was_attacked: false,
            fee_paid: receipt.fee,
            price_impact_bps: expected.price_impact_bps,
        })
    }

    /// A direct swap with nobody interfering.
    fn plain_swap(
        &mut self,
        trader_idx: usize,
        amount: u64,
        a_to_b: bool,
        pool: &mut PoolReserves,
    ) -> Result<TradeRecord> {
        let expected = pool.quote(amount, a_to_b)?;
        let executed = pool.apply_swap(amount, a_to_b)?;
        self.direct_fleet[trader_idx].settle_swap(amount, executed.amount_out, a_to_b);

        Ok(TradeRecord {
            trader: self.direct_fleet[trader_idx].key.to_string(),
            amount_in: amount,
            a_to_b,
            expected_out: expected.amount_out,
            actual_out: executed.amount_out,
            loss: 0,
            was_attacked: false,
            fee_paid: executed.fee,
            price_impact_bps: executed.price_impact_bps,
        })
    }

    /// Pick a wallet that can fund this trade in both fleets; refill the
    /// fleets when a long run has drained everyone on one side.
    fn pick_trader(&mut self, amount: u64, a_to_b: bool) -> usize {
        let eligible: Vec<usize> = (0..self.direct_fleet.len())
            .filter(|&i| {
                self.direct_fleet[i].can_afford(amount, a_to_b)
                    && self.shielded_fleet[i].can_afford(amount, a_to_b)
            })
            .collect();

        if !eligible.is_empty() {
            return eligible[self.rng.gen_range(0..eligible.len())];
        }

        debug!("all wallets drained on one side; refilling fleets");
        for trader in self.direct_fleet.iter_mut().chain(self.shielded_fleet.iter_mut()) {
            trader.refill(self.config.trader_balance_a, self.config.trader_balance_b);
        }
        self.rng.gen_range(0..self.direct_fleet.len())
    }

    /// The evolving shared pool (for inspection between runs).
    pub fn pool(&self) -> &PoolReserves {
        &self.pool
    }
}

/// Fold per-scenario records into the run summary.
fn summarize(scenarios: &[ScenarioRecord]) -> RunSummary {
    let mut summary = RunSummary {
        total_scenarios: scenarios.len() as u32,
        ..Default::default()
    };

    for record in scenarios {
        if record.failure.is_some() {
            summary.failed_scenarios += 1;
            continue;
        }
        if record.attack.attempted {
            summary.attack_attempts += 1;
        }
        if record.attack.executed {
            summary.successful_attacks += 1;
        }
        summary.total_mev_extracted += record.attack.profit_lamports;
        summary.total_victim_losses += record.attack.victim_loss_lamports;
        if let Some(direct) = &record.direct {
            summary.total_volume += direct.amount_in;
        }
    }

    let effective = summary.total_scenarios - summary.failed_scenarios;
    if summary.attack_attempts > 0 {
        summary.attack_success_rate =
            summary.successful_attacks as f64 / summary.attack_attempts as f64 * 100.0;
    }
    if summary.successful_attacks > 0 {
        summary.avg_loss_per_attack =
            summary.total_victim_losses as f64 / summary.successful_attacks as f64;
    }
    if effective > 0 {
        summary.avg_trade_amount = summary.total_volume as f64 / effective as f64;
    }

    // Every shielded trade was definitionally unattackable, so the savings
    // are exactly what the direct halves lost.
    summary.total_protected_savings = summary.total_victim_losses;

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(n: u32, seed: u64) -> SimulationConfig {
        SimulationConfig {
            total_transactions: n,
            rng_seed: Some(seed),
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn paired_halves_start_from_the_same_snapshot() {
        let mut orchestrator = Orchestrator::new(config(25, 3)).unwrap();
        let results = orchestrator.run().unwrap();

        for record in &results.scenarios {
            let direct = record.direct.as_ref().unwrap();
            let shielded = record.shielded.as_ref().unwrap();
            assert_eq!(direct.amount_in, shielded.amount_in);
            assert_eq!(direct.a_to_b, shielded.a_to_b);
        }
    }

    #[test]
    fn shielded_trades_never_lose_value() {
        let mut orchestrator = Orchestrator::new(config(50, 4)).unwrap();
        let results = orchestrator.run().unwrap();

        for record in &results.scenarios {
            let shielded = record.shielded.as_ref().unwrap();
            assert!(!shielded.was_attacked);
            assert_eq!(shielded.loss, 0);
        }
    }

    #[test]
    fn scenario_profits_sum_to_the_reported_total() {
        let mut orchestrator = Orchestrator::new(config(50, 5)).unwrap();
        let results = orchestrator.run().unwrap();

        let folded: i64 = results
            .scenarios
            .iter()
            .map(|record| record.attack.profit_lamports)
            .sum();
        assert_eq!(folded, results.summary.total_mev_extracted);

        let losses: u64 = results
            .scenarios
            .iter()
            .map(|record| record.attack.victim_loss_lamports)
            .sum();
        assert_eq!(losses, results.summary.total_victim_losses);
        assert_eq!(results.summary.total_protected_savings, losses);
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let run = |seed| {
            let mut orchestrator = Orchestrator::new(config(30, seed)).unwrap();
            orchestrator.run().unwrap().summary
        };
        let a = run(9);
        let b = run(9);
        assert_eq!(a.total_mev_extracted, b.total_mev_extracted);
        assert_eq!(a.total_victim_losses, b.total_victim_losses);
        assert_eq!(a.successful_attacks, b.successful_attacks);
    }

    #[test]
    fn executed_attacks_always_have_a_paying_victim() {
        let mut orchestrator = Orchestrator::new(config(60, 6)).unwrap();
        let results = orchestrator.run().unwrap();

        let mut executed = 0;
        for record in &results.scenarios {
            if record.attack.executed {
                executed += 1;
                assert!(record.attack.victim_loss_lamports > 0);
                assert!(record.attack.profit_lamports > 0);
                assert!(record.direct.as_ref().unwrap().was_attacked);
            }
        }
        // With p = 0.8 and 1-5 SOL trades against this pool, attacks land.
        assert!(executed > 0);
    }
}
