//! Wallet provisioning over RPC.

use anyhow::{bail, Context, Result};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::native_token::LAMPORTS_PER_SOL;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::signer::Signer;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Wallets are funded this many at a time. Each batch member creates its
/// own keypair and its own airdrop request; nothing is shared across batch
/// members except the RPC client handle.
pub const FUNDING_BATCH: usize = 5;

/// How many times to poll for airdrop confirmation before giving up.
const CONFIRM_ATTEMPTS: u32 = 40;
const CONFIRM_POLL: Duration = Duration::from_millis(500);

/// Creates and funds simulation wallets against a cluster.
pub struct WalletFleet {
    rpc: Arc<RpcClient>,
}

impl WalletFleet {
    pub fn new(rpc_url: &str) -> Self {
        let rpc = Arc::new(RpcClient::new_with_commitment(
            rpc_url.to_string(),
            CommitmentConfig::confirmed(),
        ));
        Self { rpc }
    }

    /// Verify every program account exists on the cluster. A missing
    /// program means the deployment step was skipped; nothing downstream
    /// can work, so this is fatal.
    pub async fn ensure_programs(&self, programs: &[Pubkey]) -> Result<()> {
        for program in programs {
            match self.rpc.get_account(program).await {
                Ok(account) if account.executable => {
                    info!(program = %program, "program deployed");
                }
                Ok(_) => bail!("account {program} exists but is not executable"),
                Err(_) => bail!("program {program} is not deployed on this cluster"),
            }
        }
        Ok(())
    }

    /// Create `count` wallets and fund each with `lamports_each`, in
    /// bounded parallel batches of [`FUNDING_BATCH`]. A wallet whose
    /// airdrop fails is kept unfunded with a warning; the caller decides
    /// whether that matters.
    pub async fn provision(&self, count: u32, lamports_each: u64) -> Result<Vec<Keypair>> {
        info!(
            count,
            sol_each = lamports_each as f64 / LAMPORTS_PER_SOL as f64,
            "provisioning wallets"
        );

        let mut wallets = Vec::with_capacity(count as usize);
        let mut remaining = count as usize;

        while remaining > 0 {
            let batch = remaining.min(FUNDING_BATCH);
            let mut tasks: JoinSet<Result<Keypair>> = JoinSet::new();

            for _ in 0..batch {
                let rpc = Arc::clone(&self.rpc);
                tasks.spawn(async move {
                    let keypair = Keypair::new();
                    fund_one(&rpc, &keypair.pubkey(), lamports_each).await?;
                    Ok(keypair)
                });
            }

            while let Some(joined) = tasks.join_next().await {
                match joined.context("funding task panicked")? {
                    Ok(keypair) => wallets.push(keypair),
                    Err(err) => {
                        warn!(error = %err, "airdrop failed; wallet left unfunded");
                        wallets.push(Keypair::new());
                    }
                }
            }

            remaining -= batch;
        }

        info!(funded = wallets.len(), "wallet provisioning complete");
        Ok(wallets)
    }
}

async fn fund_one(rpc: &RpcClient, recipient: &Pubkey, lamports: u64) -> Result<()> {
    let signature = rpc
        .request_airdrop(recipient, lamports)
        .await
        .with_context(|| format!("airdrop request for {recipient}"))?;
    await_confirmation(rpc, &signature).await
}

async fn await_confirmation(rpc: &RpcClient, signature: &Signature) -> Result<()> {
    for _ in 0..CONFIRM_ATTEMPTS {
        if rpc
            .confirm_transaction(signature)
            .await
            .unwrap_or(false)
        {
            return Ok(());
        }
        tokio::time::sleep(CONFIRM_POLL).await;
    }
    bail!("airdrop {signature} not confirmed in time")
}
