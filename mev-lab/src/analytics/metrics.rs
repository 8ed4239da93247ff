//! Derived metrics over a finished run.

use serde::{Deserialize, Serialize};

use crate::scenario::records::RunResults;

const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;

/// A cumulative series point, in SOL for readability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CumulativePoint {
    pub scenario: u32,
    pub value_sol: f64,
}

/// Histogram bucket over per-attack losses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramBucket {
    pub range_start_sol: f64,
    pub range_end_sol: f64,
    pub count: u32,
}

/// Direct vs shielded outcome comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
    #[serde(with = "crate::ser::u64_string")]
    pub direct_total_loss: u64,
    #[serde(with = "crate::ser::u64_string")]
    pub shielded_total_loss: u64,
    #[serde(with = "crate::ser::u64_string")]
    pub savings: u64,
    pub attacked_trades: u32,
    pub shielded_trades: u32,
}

/// Running total of extracted MEV across the scenarios.
pub fn cumulative_mev(results: &RunResults) -> Vec<CumulativePoint> {
    let mut total = 0i64;
    results
        .scenarios
        .iter()
        .map(|record| {
            total += record.attack.profit_lamports;
            CumulativePoint {
                scenario: record.id,
                value_sol: total as f64 / LAMPORTS_PER_SOL,
            }
        })
        .collect()
}

/// Running total of victim losses across the scenarios.
pub fn cumulative_losses(results: &RunResults) -> Vec<CumulativePoint> {
    let mut total = 0u64;
    results
        .scenarios
        .iter()
        .map(|record| {
            total += record.attack.victim_loss_lamports;
            CumulativePoint {
                scenario: record.id,
                value_sol: total as f64 / LAMPORTS_PER_SOL,
            }
        })
        .collect()
}

/// Ten-bucket histogram over nonzero per-attack victim losses.
pub fn loss_histogram(results: &RunResults) -> Vec<HistogramBucket> {
    let losses: Vec<f64> = results
        .scenarios
        .iter()
        .filter(|record| record.attack.victim_loss_lamports > 0)
        .map(|record| record.attack.victim_loss_lamports as f64 / LAMPORTS_PER_SOL)
        .collect();
    if losses.is_empty() {
        return Vec::new();
    }

    let min = losses.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = losses.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let width = (max - min) / 10.0;
    if width == 0.0 {
        return vec![HistogramBucket {
            range_start_sol: min,
            range_end_sol: max,
            count: losses.len() as u32,
        }];
    }

    let mut buckets: Vec<HistogramBucket> = (0..10)
        .map(|i| HistogramBucket {
            range_start_sol: min + i as f64 * width,
            range_end_sol: min + (i + 1) as f64 * width,
            count: 0,
        })
        .collect();
    for loss in losses {
        let idx = (((loss - min) / width).floor() as usize).min(9);
        buckets[idx].count += 1;
    }
    buckets
}

/// Head-to-head totals for the two halves of the run.
pub fn comparison(results: &RunResults) -> Comparison {
    let mut direct_total_loss = 0u64;
    let mut shielded_total_loss = 0u64;
    let mut attacked_trades = 0u32;
    let mut shielded_trades = 0u32;

    for record in &results.scenarios {
        if let Some(direct) = &record.direct {
            direct_total_loss += direct.loss;
            if direct.was_attacked {
                attacked_trades += 1;
            }
        }
        if let Some(shielded) = &record.shielded {
            shielded_total_loss += shielded.loss;
            shielded_trades += 1;
        }
    }

    Comparison {
        direct_total_loss,
        shielded_total_loss,
        savings: direct_total_loss.saturating_sub(shielded_total_loss),
        attacked_trades,
        shielded_trades,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::scenario::Orchestrator;

    fn results() -> RunResults {
        let mut orchestrator = Orchestrator::new(SimulationConfig {
            total_transactions: 40,
            rng_seed: Some(12),
            ..SimulationConfig::default()
        })
        .unwrap();
        orchestrator.run().unwrap()
    }

    #[test]
    fn cumulative_mev_ends_at_the_summary_total() {
        let results = results();
        let series = cumulative_mev(&results);
        let last = series.last().unwrap();
        assert!(
            (last.value_sol - results.summary.total_mev_extracted as f64 / LAMPORTS_PER_SOL).abs()
                < 1e-9
        );
    }

    #[test]
    fn histogram_counts_every_attacked_scenario() {
        let results = results();
        let attacked = results
            .scenarios
            .iter()
            .filter(|r| r.attack.victim_loss_lamports > 0)
            .count() as u32;
        let counted: u32 = loss_histogram(&results).iter().map(|b| b.count).sum();
        assert_eq!(counted, attacked);
    }

    #[test]
    fn comparison_savings_equal_direct_losses() {
        let results = results();
        let cmp = comparison(&results);
        assert_eq!(cmp.shielded_total_loss, 0);
        assert_eq!(cmp.savings, cmp.direct_total_loss);
    }
}
