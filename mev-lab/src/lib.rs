//! # mev-lab
//!
//! Adversarial economic simulation for VeilSwap. Runs paired trade
//! scenarios: the same trade once as a direct AMM swap, exposed to a
//! sandwich attacker, and once through the commit-reveal protocol, then
//! measures how much value the protocol kept out of the attacker's hands.
//!
//! Pricing comes from the `amm` program crate and commitment hashing from
//! the `veil` program crate, so simulated outcomes are computed by the same
//! code that runs on-chain.

pub mod analytics;
pub mod attack;
pub mod chain;
pub mod config;
pub mod mempool;
pub mod pool;
pub mod protocol;
pub mod scenario;
pub mod ser;

pub use config::SimulationConfig;
pub use pool::PoolReserves;
pub use scenario::Orchestrator;
