//! Append-only run records.
//!
//! One `ScenarioRecord` per paired scenario, written once and never
//! mutated. All lamport fields serialize as decimal strings.

use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::pool::PoolReserves;

/// One executed trade, direct or shielded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Trading wallet
    pub trader: String,
    #[serde(with = "crate::ser::u64_string")]
    pub amount_in: u64,
    pub a_to_b: bool,
    /// Output quoted before anything else touched the pool
    #[serde(with = "crate::ser::u64_string")]
    pub expected_out: u64,
    /// Output actually received
    #[serde(with = "crate::ser::u64_string")]
    pub actual_out: u64,
    /// expected_out - actual_out
    #[serde(with = "crate::ser::u64_string")]
    pub loss: u64,
    pub was_attacked: bool,
    #[serde(with = "crate::ser::u64_string")]
    pub fee_paid: u64,
    pub price_impact_bps: u64,
}

/// The attacker's view of one scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackRecord {
    /// The attacker looked at this trade
    pub attempted: bool,
    /// A profitable plan existed and was executed
    pub executed: bool,
    #[serde(with = "crate::ser::u64_string")]
    pub front_run_amount: u64,
    /// Attacker profit; negative if an executed attack closed at a loss
    #[serde(with = "crate::ser::i64_string")]
    pub profit_lamports: i64,
    #[serde(with = "crate::ser::u64_string")]
    pub victim_loss_lamports: u64,
}

impl AttackRecord {
    /// The attacker never looked.
    pub fn not_attempted() -> Self {
        Self {
            attempted: false,
            executed: false,
            front_run_amount: 0,
            profit_lamports: 0,
            victim_loss_lamports: 0,
        }
    }

    /// The attacker looked and walked away.
    pub fn unprofitable() -> Self {
        Self {
            attempted: true,
            ..Self::not_attempted()
        }
    }
}

/// One paired scenario: the same trade as a direct swap and as a
/// commit-reveal trade, against independent pool clones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioRecord {
    pub id: u32,
    /// Set when the scenario aborted; the rest of the record is then empty
    pub failure: Option<String>,
    pub attack: AttackRecord,
    pub direct: Option<TradeRecord>,
    pub shielded: Option<TradeRecord>,
    pub pool_after_direct: Option<PoolReserves>,
    pub pool_after_shielded: Option<PoolReserves>,
}

impl ScenarioRecord {
    pub fn failed(id: u32, reason: String) -> Self {
        Self {
            id,
            failure: Some(reason),
            attack: AttackRecord::not_attempted(),
            direct: None,
            shielded: None,
            pool_after_direct: None,
            pool_after_shielded: None,
        }
    }
}

/// Configuration echo embedded in the results file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub total_transactions: u32,
    pub attack_probability: f64,
    #[serde(with = "crate::ser::u64_string")]
    pub min_swap_lamports: u64,
    #[serde(with = "crate::ser::u64_string")]
    pub max_swap_lamports: u64,
    #[serde(with = "crate::ser::u64_string")]
    pub initial_reserve_a: u64,
    #[serde(with = "crate::ser::u64_string")]
    pub initial_reserve_b: u64,
    pub fee_bps: u16,
    #[serde(with = "crate::ser::u64_string")]
    pub attacker_capital: u64,
    #[serde(with = "crate::ser::u64_string")]
    pub min_attack_profit: u64,
    pub rng_seed: Option<u64>,
}

impl From<&SimulationConfig> for ConfigSummary {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            total_transactions: config.total_transactions,
            attack_probability: config.attack_probability,
            min_swap_lamports: config.min_swap_lamports,
            max_swap_lamports: config.max_swap_lamports,
            initial_reserve_a: config.initial_reserve_a,
            initial_reserve_b: config.initial_reserve_b,
            fee_bps: config.fee_bps,
            attacker_capital: config.attacker_capital,
            min_attack_profit: config.min_attack_profit,
            rng_seed: config.rng_seed,
        }
    }
}

/// Aggregate statistics over a complete run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_scenarios: u32,
    pub failed_scenarios: u32,
    pub attack_attempts: u32,
    pub successful_attacks: u32,
    /// successful / attempted, in percent
    pub attack_success_rate: f64,
    #[serde(with = "crate::ser::i64_string")]
    pub total_mev_extracted: i64,
    #[serde(with = "crate::ser::u64_string")]
    pub total_victim_losses: u64,
    pub avg_loss_per_attack: f64,
    /// Losses the shielded trades would have eaten had they been direct:
    /// by construction, the direct-half loss figure
    #[serde(with = "crate::ser::u64_string")]
    pub total_protected_savings: u64,
    #[serde(with = "crate::ser::u64_string")]
    pub total_volume: u64,
    pub avg_trade_amount: f64,
}

/// Everything one run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResults {
    pub config: ConfigSummary,
    pub summary: RunSummary,
    pub scenarios: Vec<ScenarioRecord>,
    /// Unix timestamp when the run finished (wall clock; reporting only)
    pub finished_at: i64,
}
