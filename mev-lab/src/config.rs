//! Simulation configuration
//!
//! Everything the run needs is threaded through these structs explicitly;
//! there is no ambient global state anywhere in the simulator.

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

/// Addresses of the deployed programs and the token pair they operate on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPairConfig {
    /// AMM program id
    pub amm_program: Pubkey,
    /// Veil (commit-reveal) program id
    pub veil_program: Pubkey,
    /// Token A mint (wSOL)
    pub mint_a: Pubkey,
    /// Token B mint (vSOL)
    pub mint_b: Pubkey,
}

impl Default for TokenPairConfig {
    fn default() -> Self {
        Self {
            amm_program: Pubkey::new_from_array(amm::ID.to_bytes()),
            veil_program: Pubkey::new_from_array(veil::ID.to_bytes()),
            // Wrapped SOL
            mint_a: Pubkey::from_str("So11111111111111111111111111111111111111112").unwrap(),
            // vSOL (devnet)
            mint_b: Pubkey::from_str("DnAkx4nRPusPoQdamH6U8pqhYpHfvfbDqkM1DWGRSXrj").unwrap(),
        }
    }
}

/// Main simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of paired scenarios to run
    pub total_transactions: u32,

    /// Probability that the attacker goes after any given trade (0.0 - 1.0)
    pub attack_probability: f64,

    /// Minimum victim swap in lamports
    pub min_swap_lamports: u64,

    /// Maximum victim swap in lamports
    pub max_swap_lamports: u64,

    /// Initial pool reserve for token A (wSOL) in lamports
    pub initial_reserve_a: u64,

    /// Initial pool reserve for token B (vSOL) in lamports
    pub initial_reserve_b: u64,

    /// Pool fee in basis points
    pub fee_bps: u16,

    /// Attacker's working capital per token, in lamports
    pub attacker_capital: u64,

    /// Attacks expected to clear less than this are not worth the attacker's
    /// blockspace; the calculator returns no plan below it
    pub min_attack_profit: u64,

    /// Number of trader wallets per fleet
    pub num_traders: u32,

    /// Initial wSOL per trader wallet in lamports
    pub trader_balance_a: u64,

    /// Initial vSOL per trader wallet in lamports
    pub trader_balance_b: u64,

    /// Slippage tolerance shielded traders hash into their intents, in bps
    pub shielded_slippage_bps: u16,

    /// Seed for the run's RNG; `None` draws one from the OS
    pub rng_seed: Option<u64>,

    /// RPC endpoint for optional localnet preparation; `None` stays
    /// entirely in-memory
    pub rpc_url: Option<String>,

    /// Program and mint addresses
    pub pair: TokenPairConfig,

    /// Output directory for results and summaries
    pub output_dir: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            total_transactions: 1000,
            attack_probability: 0.8,
            min_swap_lamports: 100_000_000,    // 0.1 SOL
            max_swap_lamports: 5_000_000_000,  // 5 SOL
            initial_reserve_a: 1_000_000_000_000, // 1000 SOL
            initial_reserve_b: 1_000_000_000_000, // 1000 vSOL
            fee_bps: amm::state::DEFAULT_FEE_BPS,
            attacker_capital: 500_000_000_000, // 500 SOL
            min_attack_profit: 10_000,
            num_traders: 10,
            trader_balance_a: 50_000_000_000, // 50 SOL
            trader_balance_b: 50_000_000_000, // 50 vSOL
            shielded_slippage_bps: 100, // 1%
            rng_seed: None,
            rpc_url: None,
            pair: TokenPairConfig::default(),
            output_dir: "output".to_string(),
        }
    }
}

impl SimulationConfig {
    /// Small deterministic run for tests.
    pub fn quick_test() -> Self {
        Self {
            total_transactions: 100,
            rng_seed: Some(7),
            ..Default::default()
        }
    }
}
