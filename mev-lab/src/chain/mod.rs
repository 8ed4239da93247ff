//! Optional localnet preparation.
//!
//! The simulation itself is pure and in-memory; this module only exists to
//! stand the scenario up against a real cluster: verify the programs are
//! deployed and provision funded wallets. All network work happens here,
//! nowhere else.

pub mod wallet;

pub use wallet::WalletFleet;
