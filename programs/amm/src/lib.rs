//! # VeilSwap AMM
//!
//! Constant-product market maker for the wSOL/vSOL pair. Pricing lives in
//! [`math`] as pure functions so the off-chain attack simulator and the
//! on-chain swap path can never disagree on a quote.

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Burn, Mint, MintTo, Token, TokenAccount, Transfer};

pub mod errors;
pub mod events;
pub mod math;
pub mod state;

use errors::AmmError;
use events::*;
use state::*;

declare_id!("6Z5uTPkwjA3R6MaJ3cBu95U4zAn9C4Tu3Hp1ifXuB8KY");

#[program]
pub mod amm {
    use super::*;

    /// Create a pool for a token pair. Vaults and the LP mint are PDAs so
    /// the pool authority is the only possible signer for outflows.
    pub fn initialize_pool(ctx: Context<InitializePool>, fee_bps: u16) -> Result<()> {
        require!(fee_bps <= MAX_FEE_BPS, AmmError::InvalidFee);

        let pool = &mut ctx.accounts.pool;
        pool.authority = ctx.accounts.authority.key();
        pool.mint_a = ctx.accounts.mint_a.key();
        pool.mint_b = ctx.accounts.mint_b.key();
        pool.vault_a = ctx.accounts.vault_a.key();
        pool.vault_b = ctx.accounts.vault_b.key();
        pool.lp_mint = ctx.accounts.lp_mint.key();
        pool.reserve_a = 0;
        pool.reserve_b = 0;
        pool.lp_supply = 0;
        pool.fee_bps = fee_bps;
        pool.paused = false;
        pool.fees_accrued_a = 0;
        pool.fees_accrued_b = 0;
        pool.bump = ctx.bumps.pool;
        pool.authority_bump = ctx.bumps.pool_authority;

        msg!("Pool initialized: fee {} bps", fee_bps);

        emit!(PoolInitialized {
            pool: pool.key(),
            mint_a: pool.mint_a,
            mint_b: pool.mint_b,
            fee_bps,
        });

        Ok(())
    }

    /// Deposit both tokens and mint LP shares. The first deposit fixes the
    /// exchange rate; later deposits mint against the worse-priced side.
    pub fn add_liquidity(
        ctx: Context<AddLiquidity>,
        amount_a: u64,
        amount_b: u64,
        min_lp_out: u64,
    ) -> Result<()> {
        require!(!ctx.accounts.pool.paused, AmmError::PoolPaused);

        let first_deposit = ctx.accounts.pool.lp_supply == 0;
        let lp_to_mint = ctx.accounts.pool.quote_deposit(amount_a, amount_b)?;
        require!(lp_to_mint >= min_lp_out, AmmError::SlippageExceeded);

        token::transfer(
            CpiContext::new(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.user_token_a.to_account_info(),
                    to: ctx.accounts.vault_a.to_account_info(),
                    authority: ctx.accounts.user.to_account_info(),
                },
            ),
            amount_a,
        )?;
        token::transfer(
            CpiContext::new(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.user_token_b.to_account_info(),
                    to: ctx.accounts.vault_b.to_account_info(),
                    authority: ctx.accounts.user.to_account_info(),
                },
            ),
            amount_b,
        )?;

        let pool = &mut ctx.accounts.pool;
        let pool_key = pool.key();
        let seeds = &[POOL_AUTHORITY_SEED, pool_key.as_ref(), &[pool.authority_bump]];
        token::mint_to(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                MintTo {
                    mint: ctx.accounts.lp_mint.to_account_info(),
                    to: ctx.accounts.user_lp_account.to_account_info(),
                    authority: ctx.accounts.pool_authority.to_account_info(),
                },
                &[&seeds[..]],
            ),
            lp_to_mint,
        )?;

        // The locked share of the first deposit exists only in lp_supply,
        // never as a mintable token.
        if first_deposit {
            pool.lp_supply = math::MINIMUM_LIQUIDITY;
        }
        pool.reserve_a = pool
            .reserve_a
            .checked_add(amount_a)
            .ok_or(AmmError::MathOverflow)?;
        pool.reserve_b = pool
            .reserve_b
            .checked_add(amount_b)
            .ok_or(AmmError::MathOverflow)?;
        pool.lp_supply = pool
            .lp_supply
            .checked_add(lp_to_mint)
            .ok_or(AmmError::MathOverflow)?;

        emit!(LiquidityAdded {
            user: ctx.accounts.user.key(),
            amount_a,
            amount_b,
            lp_minted: lp_to_mint,
            reserve_a: pool.reserve_a,
            reserve_b: pool.reserve_b,
        });

        Ok(())
    }

    /// Burn LP shares and withdraw the proportional share of both reserves.
    pub fn remove_liquidity(
        ctx: Context<RemoveLiquidity>,
        lp_amount: u64,
        min_a_out: u64,
        min_b_out: u64,
    ) -> Result<()> {
        require!(!ctx.accounts.pool.paused, AmmError::PoolPaused);
        require!(lp_amount > 0, AmmError::InsufficientInput);

        let (amount_a, amount_b) = ctx.accounts.pool.quote_withdraw(lp_amount)?;
        require!(amount_a >= min_a_out, AmmError::SlippageExceeded);
        require!(amount_b >= min_b_out, AmmError::SlippageExceeded);
        require!(
            amount_a < ctx.accounts.pool.reserve_a && amount_b < ctx.accounts.pool.reserve_b,
            AmmError::InsufficientLiquidity
        );

        token::burn(
            CpiContext::new(
                ctx.accounts.token_program.to_account_info(),
                Burn {
                    mint: ctx.accounts.lp_mint.to_account_info(),
                    from: ctx.accounts.user_lp_account.to_account_info(),
                    authority: ctx.accounts.user.to_account_info(),
                },
            ),
            lp_amount,
        )?;

        let pool = &mut ctx.accounts.pool;
        let pool_key = pool.key();
        let seeds = &[POOL_AUTHORITY_SEED, pool_key.as_ref(), &[pool.authority_bump]];
        token::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.vault_a.to_account_info(),
                    to: ctx.accounts.user_token_a.to_account_info(),
                    authority: ctx.accounts.pool_authority.to_account_info(),
                },
                &[&seeds[..]],
            ),
            amount_a,
        )?;
        token::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.vault_b.to_account_info(),
                    to: ctx.accounts.user_token_b.to_account_info(),
                    authority: ctx.accounts.pool_authority.to_account_info(),
                },
                &[&seeds[..]],
            ),
            amount_b,
        )?;

        pool.reserve_a = pool
            .reserve_a
            .checked_sub(amount_a)
            .ok_or(AmmError::MathOverflow)?;
        pool.reserve_b = pool
            .reserve_b
            .checked_sub(amount_b)
            .ok_or(AmmError::MathOverflow)?;
        pool.lp_supply = pool
            .lp_supply
            .checked_sub(lp_amount)
            .ok_or(AmmError::MathOverflow)?;

        emit!(LiquidityRemoved {
            user: ctx.accounts.user.key(),
            lp_burned: lp_amount,
            amount_a,
            amount_b,
            reserve_a: pool.reserve_a,
            reserve_b: pool.reserve_b,
        });

        Ok(())
    }

    /// Swap along the constant-product curve. `a_to_b` selects direction;
    /// the caller's token accounts must match that orientation.
    pub fn swap(
        ctx: Context<Swap>,
        amount_in: u64,
        min_amount_out: u64,
        a_to_b: bool,
    ) -> Result<()> {
        require!(!ctx.accounts.pool.paused, AmmError::PoolPaused);
        require!(amount_in > 0, AmmError::InsufficientInput);

        let quote = ctx.accounts.pool.quote_swap(amount_in, a_to_b)?;
        require!(quote.amount_out >= min_amount_out, AmmError::SlippageExceeded);
        require!(quote.amount_out > 0, AmmError::InsufficientLiquidity);

        let (vault_in, vault_out) = if a_to_b {
            (&ctx.accounts.vault_a, &ctx.accounts.vault_b)
        } else {
            (&ctx.accounts.vault_b, &ctx.accounts.vault_a)
        };

        token::transfer(
            CpiContext::new(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.user_token_in.to_account_info(),
                    to: vault_in.to_account_info(),
                    authority: ctx.accounts.user.to_account_info(),
                },
            ),
            amount_in,
        )?;

        let pool_key = ctx.accounts.pool.key();
        let seeds = &[
            POOL_AUTHORITY_SEED,
            pool_key.as_ref(),
            &[ctx.accounts.pool.authority_bump],
        ];
        token::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: vault_out.to_account_info(),
                    to: ctx.accounts.user_token_out.to_account_info(),
                    authority: ctx.accounts.pool_authority.to_account_info(),
                },
                &[&seeds[..]],
            ),
            quote.amount_out,
        )?;

        let pool = &mut ctx.accounts.pool;
        if a_to_b {
            pool.reserve_a = pool
                .reserve_a
                .checked_add(amount_in)
                .ok_or(AmmError::MathOverflow)?;
            pool.reserve_b = pool
                .reserve_b
                .checked_sub(quote.amount_out)
                .ok_or(AmmError::MathOverflow)?;
            pool.fees_accrued_a = pool
                .fees_accrued_a
                .checked_add(quote.fee)
                .ok_or(AmmError::MathOverflow)?;
        } else {
            pool.reserve_b = pool
                .reserve_b
                .checked_add(amount_in)
                .ok_or(AmmError::MathOverflow)?;
            pool.reserve_a = pool
                .reserve_a
                .checked_sub(quote.amount_out)
                .ok_or(AmmError::MathOverflow)?;
            pool.fees_accrued_b = pool
                .fees_accrued_b
                .checked_add(quote.fee)
                .ok_or(AmmError::MathOverflow)?;
        }

        msg!(
            "Swapped {} in for {} out ({} bps impact)",
            amount_in,
            quote.amount_out,
            quote.price_impact_bps
        );

        emit!(Swapped {
            user: ctx.accounts.user.key(),
            amount_in,
            amount_out: quote.amount_out,
            fee: quote.fee,
            a_to_b,
            reserve_a: pool.reserve_a,
            reserve_b: pool.reserve_b,
        });

        Ok(())
    }

    /// Authority: halt or resume swaps and liquidity operations.
    pub fn set_paused(ctx: Context<AdminAction>, paused: bool) -> Result<()> {
        let pool = &mut ctx.accounts.pool;
        pool.paused = paused;

        emit!(PauseToggled {
            pool: pool.key(),
            paused,
        });

        Ok(())
    }

    /// Authority: retune the swap fee.
    pub fn update_fee(ctx: Context<AdminAction>, new_fee_bps: u16) -> Result<()> {
        require!(new_fee_bps <= MAX_FEE_BPS, AmmError::InvalidFee);

        let pool = &mut ctx.accounts.pool;
        let old_fee_bps = pool.fee_bps;
        pool.fee_bps = new_fee_bps;

        emit!(FeeUpdated {
            pool: pool.key(),
            old_fee_bps,
            new_fee_bps,
        });

        Ok(())
    }
}

// ============================================================================
// Account Contexts
// ============================================================================

#[derive(Accounts)]
pub struct InitializePool<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    /// Token A mint (wSOL)
    pub mint_a: Account<'info, Mint>,

    /// Token B mint (vSOL)
    pub mint_b: Account<'info, Mint>,

    #[account(
        init,
        payer = authority,
        space = 8 + AmmPool::INIT_SPACE,
        seeds = [POOL_SEED, mint_a.key().as_ref(), mint_b.key().as_ref()],
        bump
    )]
    pub pool: Account<'info, AmmPool>,

    /// CHECK: PDA that signs for vault outflows and LP minting
    #[account(
        seeds = [POOL_AUTHORITY_SEED, pool.key().as_ref()],
        bump
    )]
    pub pool_authority: UncheckedAccount<'info>,

    #[account(
        init,
        payer = authority,
        token::mint = mint_a,
        token::authority = pool_authority,
        seeds = [VAULT_A_SEED, pool.key().as_ref()],
        bump
    )]
    pub vault_a: Account<'info, TokenAccount>,

    #[account(
        init,
        payer = authority,
        token::mint = mint_b,
        token::authority = pool_authority,
        seeds = [VAULT_B_SEED, pool.key().as_ref()],
        bump
    )]
    pub vault_b: Account<'info, TokenAccount>,

    #[account(
        init,
        payer = authority,
        mint::decimals = 9,
        mint::authority = pool_authority,
        mint::freeze_authority = pool_authority,
    )]
    pub lp_mint: Account<'info, Mint>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

#[derive(Accounts)]
pub struct AddLiquidity<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

    #[account(
        mut,
        seeds = [POOL_SEED, pool.mint_a.as_ref(), pool.mint_b.as_ref()],
        bump = pool.bump
    )]
    pub pool: Account<'info, AmmPool>,

    /// CHECK: PDA authority
    #[account(
        seeds = [POOL_AUTHORITY_SEED, pool.key().as_ref()],
        bump = pool.authority_bump
    )]
    pub pool_authority: UncheckedAccount<'info>,

    #[account(mut, constraint = vault_a.key() == pool.vault_a @ AmmError::InvalidMint)]
    pub vault_a: Account<'info, TokenAccount>,

    #[account(mut, constraint = vault_b.key() == pool.vault_b @ AmmError::InvalidMint)]
    pub vault_b: Account<'info, TokenAccount>,

    #[account(mut, constraint = lp_mint.key() == pool.lp_mint @ AmmError::InvalidMint)]
    pub lp_mint: Account<'info, Mint>,

    #[account(
        mut,
        constraint = user_token_a.mint == pool.mint_a,
        constraint = user_token_a.owner == user.key()
    )]
    pub user_token_a: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = user_token_b.mint == pool.mint_b,
        constraint = user_token_b.owner == user.key()
    )]
    pub user_token_b: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = user_lp_account.mint == lp_mint.key(),
        constraint = user_lp_account.owner == user.key()
    )]
    pub user_lp_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

#[derive(Accounts)]
pub struct RemoveLiquidity<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

    #[account(
        mut,
        seeds = [POOL_SEED, pool.mint_a.as_ref(), pool.mint_b.as_ref()],
        bump = pool.bump
    )]
    pub pool: Account<'info, AmmPool>,

    /// CHECK: PDA authority
    #[account(
        seeds = [POOL_AUTHORITY_SEED, pool.key().as_ref()],
        bump = pool.authority_bump
    )]
    pub pool_authority: UncheckedAccount<'info>,

    #[account(mut, constraint = vault_a.key() == pool.vault_a @ AmmError::InvalidMint)]
    pub vault_a: Account<'info, TokenAccount>,

    #[account(mut, constraint = vault_b.key() == pool.vault_b @ AmmError::InvalidMint)]
    pub vault_b: Account<'info, TokenAccount>,

    #[account(mut, constraint = lp_mint.key() == pool.lp_mint @ AmmError::InvalidMint)]
    pub lp_mint: Account<'info, Mint>,

    #[account(
        mut,
        constraint = user_token_a.mint == pool.mint_a,
        constraint = user_token_a.owner == user.key()
    )]
    pub user_token_a: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = user_token_b.mint == pool.mint_b,
        constraint = user_token_b.owner == user.key()
    )]
    pub user_token_b: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = user_lp_account.mint == lp_mint.key(),
        constraint = user_lp_account.owner == user.key()
    )]
    pub user_lp_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

#[derive(Accounts)]
pub struct Swap<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

    #[account(
        mut,
        seeds = [POOL_SEED, pool.mint_a.as_ref(), pool.mint_b.as_ref()],
        bump = pool.bump
    )]
    pub pool: Account<'info, AmmPool>,

    /// CHECK: PDA authority
    #[account(
        seeds = [POOL_AUTHORITY_SEED, pool.key().as_ref()],
        bump = pool.authority_bump
    )]
    pub pool_authority: UncheckedAccount<'info>,

    #[account(mut, constraint = vault_a.key() == pool.vault_a @ AmmError::InvalidMint)]
    pub vault_a: Account<'info, TokenAccount>,

    #[account(mut, constraint = vault_b.key() == pool.vault_b @ AmmError::InvalidMint)]
    pub vault_b: Account<'info, TokenAccount>,

    /// User's source account (A when a_to_b, B otherwise)
    #[account(mut, constraint = user_token_in.owner == user.key())]
    pub user_token_in: Account<'info, TokenAccount>,

    /// User's destination account (B when a_to_b, A otherwise)
    #[account(mut, constraint = user_token_out.owner == user.key())]
    pub user_token_out: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

#[derive(Accounts)]
pub struct AdminAction<'info> {
    #[account(constraint = authority.key() == pool.authority @ AmmError::InvalidAuthority)]
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [POOL_SEED, pool.mint_a.as_ref(), pool.mint_b.as_ref()],
        bump = pool.bump
    )]
    pub pool: Account<'info, AmmPool>,
}
