//! mev-lab CLI
//!
//! `run` drives the paired simulation, `report` re-renders a saved results
//! file, `explain` walks the mempool visibility model.

use anyhow::Result;
use clap::{Parser, Subcommand};
use solana_sdk::pubkey::Pubkey;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mev_lab::analytics::{explain, print_summary, RunLog};
use mev_lab::chain::WalletFleet;
use mev_lab::config::SimulationConfig;
use mev_lab::scenario::Orchestrator;

#[derive(Parser)]
#[command(name = "mev-lab")]
#[command(version, about = "Adversarial MEV simulation for VeilSwap", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the paired direct-vs-shielded simulation
    Run {
        /// Number of paired scenarios
        #[arg(short, long, default_value = "1000")]
        transactions: u32,

        /// Probability of an attack attempt per trade (0.0 - 1.0)
        #[arg(short, long, default_value = "0.8")]
        attack_prob: f64,

        /// Minimum victim swap in SOL
        #[arg(long, default_value = "0.1")]
        min_swap: f64,

        /// Maximum victim swap in SOL
        #[arg(long, default_value = "5.0")]
        max_swap: f64,

        /// Initial pool liquidity in SOL per side
        #[arg(long, default_value = "1000.0")]
        liquidity: f64,

        /// Pool fee in basis points
        #[arg(long, default_value = "30")]
        fee_bps: u16,

        /// Attacker capital in SOL per token
        #[arg(long, default_value = "500.0")]
        attacker_capital: f64,

        /// Attacks below this expected profit (lamports) are skipped
        #[arg(long, default_value = "10000")]
        min_profit: u64,

        /// RNG seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,

        /// Verify deployed programs and fund wallets against this RPC
        /// endpoint before simulating
        #[arg(long)]
        rpc_url: Option<String>,

        /// Output directory for results and summaries
        #[arg(short, long, default_value = "output")]
        output: String,
    },

    /// Re-render the summary from a saved results file
    Report {
        /// JSON results file produced by `run`
        results_file: PathBuf,
    },

    /// Show what a mempool observer sees for direct vs committed trades
    Explain,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .compact()
        .init();

    match cli.command {
        Commands::Run {
            transactions,
            attack_prob,
            min_swap,
            max_swap,
            liquidity,
            fee_bps,
            attacker_capital,
            min_profit,
            seed,
            rpc_url,
            output,
        } => {
            let sol = |x: f64| (x * 1_000_000_000.0) as u64;
            let config = SimulationConfig {
                total_transactions: transactions,
                attack_probability: attack_prob,
                min_swap_lamports: sol(min_swap),
                max_swap_lamports: sol(max_swap),
                initial_reserve_a: sol(liquidity),
                initial_reserve_b: sol(liquidity),
                fee_bps,
                attacker_capital: sol(attacker_capital),
                min_attack_profit: min_profit,
                rng_seed: seed,
                rpc_url,
                output_dir: output,
                ..Default::default()
            };
            run_simulation(config).await?;
        }

        Commands::Report { results_file } => {
            let results = RunLog::load_results(&results_file)?;
            print_summary(&results);
        }

        Commands::Explain => {
            explain::print_explainer();
        }
    }

    Ok(())
}

async fn run_simulation(config: SimulationConfig) -> Result<()> {
    info!(
        transactions = config.total_transactions,
        attack_probability = config.attack_probability,
        "configuration loaded"
    );

    // Optional cluster preparation. A missing program is an unhandled
    // setup failure: propagate and exit non-zero.
    if let Some(rpc_url) = &config.rpc_url {
        let fleet = WalletFleet::new(rpc_url);
        let programs = [
            Pubkey::new_from_array(amm::ID.to_bytes()),
            Pubkey::new_from_array(veil::ID.to_bytes()),
        ];
        fleet.ensure_programs(&programs).await?;
        fleet
            .provision(config.num_traders, config.trader_balance_a)
            .await?;
    }

    let mut orchestrator = Orchestrator::new(config.clone())?;
    let results = orchestrator.run()?;

    print_summary(&results);

    let log = RunLog::new(&config.output_dir);
    let json_path = log.save_results(&results)?;
    log.save_summary(&results)?;

    println!("Results saved to: {}", json_path.display());

    Ok(())
}
