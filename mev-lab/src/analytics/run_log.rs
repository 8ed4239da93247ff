//! Results persistence: a JSON results file and a plain-text summary.
//!
//! Both artifacts are derived, never authoritative; reloading the JSON and
//! re-rendering must give the same summary.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::metrics;
use crate::scenario::records::RunResults;

const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;

/// Writes run artifacts under an output directory.
pub struct RunLog {
    output_dir: PathBuf,
}

impl RunLog {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    fn logs_dir(&self) -> PathBuf {
        self.output_dir.join("logs")
    }

    /// Persist the full results as pretty-printed JSON. Lamport fields are
    /// decimal strings; see `crate::ser`.
    pub fn save_results(&self, results: &RunResults) -> Result<PathBuf> {
        fs::create_dir_all(self.logs_dir()).context("creating output directory")?;

        let stamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        let path = self.logs_dir().join(format!("simulation_{stamp}.json"));

        let json = serde_json::to_string_pretty(results).context("serializing results")?;
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;

        info!(path = %path.display(), "results saved");
        Ok(path)
    }

    /// Persist the text summary next to the JSON.
    pub fn save_summary(&self, results: &RunResults) -> Result<PathBuf> {
        fs::create_dir_all(self.logs_dir()).context("creating output directory")?;

        let stamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        let path = self.logs_dir().join(format!("summary_{stamp}.txt"));

        fs::write(&path, format_summary(results))
            .with_context(|| format!("writing {}", path.display()))?;

        info!(path = %path.display(), "summary saved");
        Ok(path)
    }

    /// Load a previously saved results file.
    pub fn load_results(path: &Path) -> Result<RunResults> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
    }
}

/// Render the run summary as plain text.
pub fn format_summary(results: &RunResults) -> String {
    let s = &results.summary;
    let c = &results.config;
    let cmp = metrics::comparison(results);
    let sol = |lamports: u64| lamports as f64 / LAMPORTS_PER_SOL;
    let sol_i = |lamports: i64| lamports as f64 / LAMPORTS_PER_SOL;

    let mut out = String::new();
    out.push_str("==================================================================\n");
    out.push_str("                  VEILSWAP MEV SIMULATION RESULTS\n");
    out.push_str("==================================================================\n\n");

    out.push_str("CONFIGURATION\n");
    out.push_str(&format!("  Scenarios:            {:>12}\n", c.total_transactions));
    out.push_str(&format!(
        "  Attack probability:   {:>11.0}%\n",
        c.attack_probability * 100.0
    ));
    out.push_str(&format!(
        "  Swap range:           {:>8.4} - {:.4} SOL\n",
        sol(c.min_swap_lamports),
        sol(c.max_swap_lamports)
    ));
    out.push_str(&format!(
        "  Pool:                 {:>8.2} / {:.2} SOL, {:.2}% fee\n",
        sol(c.initial_reserve_a),
        sol(c.initial_reserve_b),
        c.fee_bps as f64 / 100.0
    ));
    if let Some(seed) = c.rng_seed {
        out.push_str(&format!("  RNG seed:             {seed:>12}\n"));
    }

    out.push_str("\nDIRECT TRADING (exposed to MEV)\n");
    out.push_str(&format!("  Attack attempts:      {:>12}\n", s.attack_attempts));
    out.push_str(&format!("  Successful attacks:   {:>12}\n", s.successful_attacks));
    out.push_str(&format!(
        "  Success rate:         {:>11.1}%\n",
        s.attack_success_rate
    ));
    out.push_str(&format!(
        "  MEV extracted:        {:>12.6} SOL\n",
        sol_i(s.total_mev_extracted)
    ));
    out.push_str(&format!(
        "  Victim losses:        {:>12.6} SOL\n",
        sol(s.total_victim_losses)
    ));
    out.push_str(&format!(
        "  Avg loss per attack:  {:>12.6} SOL\n",
        s.avg_loss_per_attack / LAMPORTS_PER_SOL
    ));

    out.push_str("\nSHIELDED TRADING (commit-reveal)\n");
    out.push_str(&format!("  Trades executed:      {:>12}\n", cmp.shielded_trades));
    out.push_str(&format!(
        "  MEV extracted:        {:>12.6} SOL\n",
        sol(cmp.shielded_total_loss)
    ));
    out.push_str(&format!(
        "  Protected savings:    {:>12.6} SOL\n",
        sol(s.total_protected_savings)
    ));

    out.push_str("\nVOLUME\n");
    out.push_str(&format!(
        "  Total volume:         {:>12.4} SOL\n",
        sol(s.total_volume)
    ));
    out.push_str(&format!(
        "  Average trade:        {:>12.6} SOL\n",
        s.avg_trade_amount / LAMPORTS_PER_SOL
    ));
    if s.failed_scenarios > 0 {
        out.push_str(&format!(
            "  Failed scenarios:     {:>12}\n",
            s.failed_scenarios
        ));
    }

    out.push_str("\n==================================================================\n");
    out
}

/// Print the summary to the terminal.
pub fn print_summary(results: &RunResults) {
    println!("{}", format_summary(results));
}
