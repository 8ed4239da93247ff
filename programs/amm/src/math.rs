//! Constant-product pricing math.
//!
//! Every pricing decision in VeilSwap flows through these functions: the
//! on-chain swap path calls them from instruction handlers, and the MEV
//! simulator calls them off-chain when it replays attacks. Keeping a single
//! implementation is what lets the simulator's numbers match the chain
//! bit-for-bit.
//!
//! All functions are pure. Intermediates are widened to `u128` before any
//! multiplication and narrowed back with explicit checks.

/// Basis-point denominator (10_000 bps = 100%).
pub const BPS_DENOMINATOR: u64 = 10_000;

/// LP tokens locked forever on the first deposit to prevent share-price
/// manipulation against later depositors.
pub const MINIMUM_LIQUIDITY: u64 = 1_000;

/// Arithmetic faults. These abort the surrounding operation before any
/// state is touched; the program maps them onto `AmmError` codes at the
/// instruction boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    /// An intermediate value left the integer domain.
    Overflow,
    /// A reserve or the LP supply was zero where a positive value is required.
    ZeroLiquidity,
    /// A deposit with a zero-valued side.
    ZeroDeposit,
    /// First deposit too small to cover the permanently locked liquidity.
    BelowMinimumLiquidity,
}

impl core::fmt::Display for MathError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Overflow => write!(f, "math overflow"),
            Self::ZeroLiquidity => write!(f, "pool has zero liquidity"),
            Self::ZeroDeposit => write!(f, "deposit amount is zero"),
            Self::BelowMinimumLiquidity => write!(f, "initial deposit below minimum liquidity"),
        }
    }
}

impl std::error::Error for MathError {}

/// Priced outcome of a single swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapQuote {
    /// Tokens the swapper receives.
    pub amount_out: u64,
    /// Fee retained by the pool, denominated in the input token.
    pub fee: u64,
    /// Deviation from the zero-impact price, in basis points.
    pub price_impact_bps: u64,
}

/// Quote a swap of `amount_in` against `(reserve_in, reserve_out)` with the
/// pool fee applied to the input side.
///
/// The fee is deducted first (`amount_in * (10000 - fee_bps) / 10000`,
/// floor division), then the constant-product formula prices the remainder:
/// `amount_out = reserve_out * in_after_fee / (reserve_in + in_after_fee)`.
///
/// For positive reserves the output is always strictly less than
/// `reserve_out`, so a swap can never drain a pool, and the output is
/// non-decreasing in `amount_in`.
pub fn swap_output(
    amount_in: u64,
    reserve_in: u64,
    reserve_out: u64,
    fee_bps: u16,
) -> Result<SwapQuote, MathError> {
    if reserve_in == 0 || reserve_out == 0 {
        return Err(MathError::ZeroLiquidity);
    }

    let keep_bps = BPS_DENOMINATOR
        .checked_sub(fee_bps as u64)
        .ok_or(MathError::Overflow)?;

    let in_after_fee = (amount_in as u128)
        .checked_mul(keep_bps as u128)
        .ok_or(MathError::Overflow)?
        / BPS_DENOMINATOR as u128;
    let in_after_fee = u64::try_from(in_after_fee).map_err(|_| MathError::Overflow)?;
    let fee = amount_in - in_after_fee;

    let numerator = (reserve_out as u128)
        .checked_mul(in_after_fee as u128)
        .ok_or(MathError::Overflow)?;
    let denominator = (reserve_in as u128)
        .checked_add(in_after_fee as u128)
        .ok_or(MathError::Overflow)?;
    let amount_out = u64::try_from(numerator / denominator).map_err(|_| MathError::Overflow)?;

    // Zero-impact price would pay out in_after_fee * reserve_out / reserve_in.
    let ideal = (in_after_fee as u128)
        .checked_mul(reserve_out as u128)
        .ok_or(MathError::Overflow)?
        / reserve_in as u128;
    let price_impact_bps = if ideal > 0 {
        let shortfall = ideal.saturating_sub(amount_out as u128);
        u64::try_from(shortfall * BPS_DENOMINATOR as u128 / ideal).map_err(|_| MathError::Overflow)?
    } else {
        0
    };

    Ok(SwapQuote {
        amount_out,
        fee,
        price_impact_bps,
    })
}

/// LP tokens minted for depositing `(amount_a, amount_b)` into a pool with
/// the given reserves and outstanding LP supply.
///
/// The first deposit sets the exchange rate and mints
/// `sqrt(amount_a * amount_b) - MINIMUM_LIQUIDITY`; later deposits mint the
/// smaller of the two proportional amounts, so unbalanced deposits donate
/// the excess to the pool.
pub fn lp_for_deposit(
    amount_a: u64,
    amount_b: u64,
    reserve_a: u64,
    reserve_b: u64,
    lp_supply: u64,
) -> Result<u64, MathError> {
    if amount_a == 0 || amount_b == 0 {
        return Err(MathError::ZeroDeposit);
    }

    if lp_supply == 0 {
        let product = (amount_a as u128)
            .checked_mul(amount_b as u128)
            .ok_or(MathError::Overflow)?;
        let shares = integer_sqrt(product);
        if shares <= MINIMUM_LIQUIDITY as u128 {
            return Err(MathError::BelowMinimumLiquidity);
        }
        return u64::try_from(shares - MINIMUM_LIQUIDITY as u128).map_err(|_| MathError::Overflow);
    }

    if reserve_a == 0 || reserve_b == 0 {
        return Err(MathError::ZeroLiquidity);
    }

    let from_a = (amount_a as u128)
        .checked_mul(lp_supply as u128)
        .ok_or(MathError::Overflow)?
        / reserve_a as u128;
    let from_b = (amount_b as u128)
        .checked_mul(lp_supply as u128)
        .ok_or(MathError::Overflow)?
        / reserve_b as u128;

    u64::try_from(from_a.min(from_b)).map_err(|_| MathError::Overflow)
}

/// Token amounts returned for burning `lp_amount` shares.
pub fn amounts_for_withdraw(
    lp_amount: u64,
    reserve_a: u64,
    reserve_b: u64,
    lp_supply: u64,
) -> Result<(u64, u64), MathError> {
    if lp_supply == 0 {
        return Err(MathError::ZeroLiquidity);
    }

    let amount_a = (lp_amount as u128)
        .checked_mul(reserve_a as u128)
        .ok_or(MathError::Overflow)?
        / lp_supply as u128;
    let amount_b = (lp_amount as u128)
        .checked_mul(reserve_b as u128)
        .ok_or(MathError::Overflow)?
        / lp_supply as u128;

    Ok((
        u64::try_from(amount_a).map_err(|_| MathError::Overflow)?,
        u64::try_from(amount_b).map_err(|_| MathError::Overflow)?,
    ))
}

/// Minimum acceptable output for a quoted `amount_out` under a slippage
/// tolerance in basis points. Clients hash this into their swap intent.
pub fn min_output_for_slippage(amount_out: u64, slippage_bps: u16) -> u64 {
    let allowance = (amount_out as u128) * (slippage_bps as u128) / BPS_DENOMINATOR as u128;
    amount_out.saturating_sub(allowance as u64)
}

/// Integer square root by Newton's method.
fn integer_sqrt(n: u128) -> u128 {
    if n == 0 {
        return 0;
    }
    let mut x = n;
    let mut y = (x + 1) / 2;
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOL: u64 = 1_000_000_000;

    #[test]
    fn swap_is_deterministic() {
        let a = swap_output(5 * SOL, 1000 * SOL, 1000 * SOL, 30).unwrap();
        let b = swap_output(5 * SOL, 1000 * SOL, 1000 * SOL, 30).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn swap_charges_the_fee_first() {
        let quote = swap_output(10_000, 1000 * SOL, 1000 * SOL, 30).unwrap();
        // 30 bps of 10_000 is exactly 30.
        assert_eq!(quote.fee, 30);
        assert!(quote.amount_out < 10_000);
    }

    #[test]
    fn swap_never_drains_the_output_reserve() {
        // Even an absurdly large input cannot pay out the full reserve.
        let quote = swap_output(u64::MAX / 2, 1_000, 1_000, 0).unwrap();
        assert!(quote.amount_out < 1_000);
    }

    #[test]
    fn swap_output_is_monotone_in_input() {
        let mut prev = 0;
        for amount_in in (SOL..=50 * SOL).step_by(SOL as usize) {
            let quote = swap_output(amount_in, 1000 * SOL, 1000 * SOL, 30).unwrap();
            assert!(quote.amount_out >= prev);
            prev = quote.amount_out;
        }
    }

    #[test]
    fn swap_rejects_empty_pools() {
        assert_eq!(
            swap_output(SOL, 0, 1000 * SOL, 30),
            Err(MathError::ZeroLiquidity)
        );
        assert_eq!(
            swap_output(SOL, 1000 * SOL, 0, 30),
            Err(MathError::ZeroLiquidity)
        );
    }

    #[test]
    fn first_deposit_locks_minimum_liquidity() {
        let shares = lp_for_deposit(1000 * SOL, 1000 * SOL, 0, 0, 0).unwrap();
        assert_eq!(shares, 1000 * SOL - MINIMUM_LIQUIDITY);
    }

    #[test]
    fn first_deposit_rejects_zero_sides() {
        assert_eq!(
            lp_for_deposit(0, 1000 * SOL, 0, 0, 0),
            Err(MathError::ZeroDeposit)
        );
        assert_eq!(
            lp_for_deposit(1000 * SOL, 0, 0, 0, 0),
            Err(MathError::ZeroDeposit)
        );
    }

    #[test]
    fn dust_first_deposit_is_rejected() {
        assert_eq!(
            lp_for_deposit(10, 10, 0, 0, 0),
            Err(MathError::BelowMinimumLiquidity)
        );
    }

    #[test]
    fn later_deposits_mint_proportionally() {
        // Pool at 1000/1000 with 1000 LP outstanding: a 10/10 deposit is 1%.
        let shares = lp_for_deposit(10 * SOL, 10 * SOL, 1000 * SOL, 1000 * SOL, 1000 * SOL).unwrap();
        assert_eq!(shares, 10 * SOL);
        // Unbalanced deposits mint against the worse side.
        let shares = lp_for_deposit(10 * SOL, 5 * SOL, 1000 * SOL, 1000 * SOL, 1000 * SOL).unwrap();
        assert_eq!(shares, 5 * SOL);
    }

    #[test]
    fn withdraw_is_proportional() {
        let (a, b) = amounts_for_withdraw(100 * SOL, 2000 * SOL, 1000 * SOL, 1000 * SOL).unwrap();
        assert_eq!(a, 200 * SOL);
        assert_eq!(b, 100 * SOL);
    }

    #[test]
    fn withdraw_from_empty_supply_fails() {
        assert_eq!(
            amounts_for_withdraw(1, 1000, 1000, 0),
            Err(MathError::ZeroLiquidity)
        );
    }

    #[test]
    fn slippage_floor_rounds_against_the_trader() {
        assert_eq!(min_output_for_slippage(10_000, 100), 9_900);
        assert_eq!(min_output_for_slippage(0, 100), 0);
        assert_eq!(min_output_for_slippage(10_000, 0), 10_000);
    }

    #[test]
    fn integer_sqrt_exact_and_floor() {
        assert_eq!(integer_sqrt(0), 0);
        assert_eq!(integer_sqrt(1), 1);
        assert_eq!(integer_sqrt(144), 12);
        assert_eq!(integer_sqrt(145), 12);
        assert_eq!(integer_sqrt(u128::from(u64::MAX) * u128::from(u64::MAX)), u128::from(u64::MAX));
    }
}
