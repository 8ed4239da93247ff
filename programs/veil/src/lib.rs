//! # Veil — commit-reveal shield
//!
//! Hides swap/stake intent from mempool observers until execution. A user
//! first records an opaque SHA-256 commitment, waits out a short on-chain
//! delay, then reveals the original parameters; the program verifies the
//! hash and executes atomically via CPI into the AMM. Between commit and
//! reveal there is nothing in public state worth front-running: no amount,
//! no minimum output, no slippage tolerance.

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

pub mod errors;
pub mod events;
pub mod state;

use errors::VeilError;
use events::*;
use state::{config, intent_hash, Commitment, IntentKind, SwapIntent, COMMITMENT_SEED};

declare_id!("6kRyKiiDYdDADcGhFXUVntbcsWqzUBFuKo3TdsmPqjsE");

#[program]
pub mod veil {
    use super::*;

    /// Record a blinded intent.
    ///
    /// Creates the commitment PDA and stamps `created_at` from the ledger
    /// clock. One live commitment per user: a second `commit` fails because
    /// the PDA already exists.
    pub fn commit(
        ctx: Context<Commit>,
        hash: [u8; 32],
        approx_amount: u64,
        intent: IntentKind,
    ) -> Result<()> {
        require!(
            approx_amount >= config::MIN_COMMIT_LAMPORTS,
            VeilError::AmountTooSmall
        );

        let now = Clock::get()?.unix_timestamp;
        let commitment = &mut ctx.accounts.commitment;
        commitment.user = ctx.accounts.user.key();
        commitment.hash = hash;
        commitment.created_at = now;
        commitment.bump = ctx.bumps.commitment;
        commitment.approx_amount = approx_amount;
        commitment.intent = intent;

        msg!("Commitment created for {}", commitment.user);

        emit!(CommitmentCreated {
            user: commitment.user,
            hash,
            approx_amount,
            intent,
            created_at: now,
        });

        Ok(())
    }

    /// Reveal the committed parameters and execute the trade.
    ///
    /// Check order is part of the contract: delay, then hash, then
    /// slippage. Any failure leaves every account untouched; on success the
    /// swap CPI and the commitment close happen in the same transaction, so
    /// the whole reveal is atomic. The commitment rent returns to the user.
    pub fn reveal_and_execute(ctx: Context<RevealAndExecute>, details: SwapIntent) -> Result<()> {
        let commitment = &ctx.accounts.commitment;
        let now = Clock::get()?.unix_timestamp;

        require!(
            now >= commitment.created_at + config::MIN_DELAY_SECONDS,
            VeilError::DelayNotMet
        );

        let computed = intent_hash(&details).map_err(|_| VeilError::HashMismatch)?;
        require!(computed == commitment.hash, VeilError::HashMismatch);

        require!(
            details.slippage_bps <= config::MAX_SLIPPAGE_BPS,
            VeilError::SlippageTooHigh
        );

        // Quote before touching anything so a doomed reveal fails here
        // rather than mid-CPI.
        let a_to_b = commitment.intent.a_to_b();
        let quote = ctx.accounts.pool.quote_swap(details.amount_in, a_to_b)?;
        require!(quote.amount_out >= details.min_out, VeilError::SlippageTooHigh);

        let cpi_accounts = amm::cpi::accounts::Swap {
            user: ctx.accounts.user.to_account_info(),
            pool: ctx.accounts.pool.to_account_info(),
            pool_authority: ctx.accounts.pool_authority.to_account_info(),
            vault_a: ctx.accounts.vault_a.to_account_info(),
            vault_b: ctx.accounts.vault_b.to_account_info(),
            user_token_in: ctx.accounts.user_token_in.to_account_info(),
            user_token_out: ctx.accounts.user_token_out.to_account_info(),
            token_program: ctx.accounts.token_program.to_account_info(),
        };
        amm::cpi::swap(
            CpiContext::new(ctx.accounts.amm_program.to_account_info(), cpi_accounts),
            details.amount_in,
            details.min_out,
            a_to_b,
        )?;

        msg!(
            "Revealed and executed: {} in, floor {}",
            details.amount_in,
            details.min_out
        );

        emit!(IntentExecuted {
            user: ctx.accounts.user.key(),
            amount_in: details.amount_in,
            min_out: details.min_out,
            intent: ctx.accounts.commitment.intent,
            executed_at: now,
        });

        Ok(())
    }

    /// Withdraw a commitment before execution. No delay requirement; only
    /// the owner may cancel, and the rent returns to them.
    pub fn cancel_commitment(ctx: Context<CancelCommitment>) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;

        msg!("Commitment cancelled for {}", ctx.accounts.user.key());

        emit!(CommitmentCancelled {
            user: ctx.accounts.user.key(),
            cancelled_at: now,
        });

        Ok(())
    }
}

// ============================================================================
// Account Contexts
// ============================================================================

#[derive(Accounts)]
pub struct Commit<'info> {
    /// The commitment PDA; `init` fails if one is already live
    #[account(
        init,
        payer = user,
        space = 8 + Commitment::INIT_SPACE,
        seeds = [COMMITMENT_SEED, user.key().as_ref()],
        bump
    )]
    pub commitment: Account<'info, Commitment>,

    /// Pays the PDA rent, refunded on reveal or cancel
    #[account(mut)]
    pub user: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct RevealAndExecute<'info> {
    /// Verified and closed in the same transaction as the swap
    #[account(
        mut,
        seeds = [COMMITMENT_SEED, user.key().as_ref()],
        bump = commitment.bump,
        constraint = commitment.user == user.key() @ VeilError::CommitmentNotFound,
        close = user
    )]
    pub commitment: Account<'info, Commitment>,

    #[account(mut)]
    pub user: Signer<'info>,

    /// Target pool; quoted here, mutated by the CPI
    #[account(mut)]
    pub pool: Account<'info, amm::state::AmmPool>,

    /// CHECK: AMM pool authority PDA, verified by the AMM program
    pub pool_authority: UncheckedAccount<'info>,

    #[account(mut)]
    pub vault_a: Account<'info, TokenAccount>,

    #[account(mut)]
    pub vault_b: Account<'info, TokenAccount>,

    /// User's source account in the direction implied by the intent kind
    #[account(mut)]
    pub user_token_in: Account<'info, TokenAccount>,

    /// User's destination account
    #[account(mut)]
    pub user_token_out: Account<'info, TokenAccount>,

    pub amm_program: Program<'info, amm::program::Amm>,

    pub token_program: Program<'info, Token>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct CancelCommitment<'info> {
    #[account(
        mut,
        seeds = [COMMITMENT_SEED, user.key().as_ref()],
        bump = commitment.bump,
        constraint = commitment.user == user.key() @ VeilError::CommitmentNotFound,
        close = user
    )]
    pub commitment: Account<'info, Commitment>,

    #[account(mut)]
    pub user: Signer<'info>,
}
