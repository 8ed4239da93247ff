//! Sandwich profitability search.

use amm::math::MathError;
use tracing::trace;

use crate::mempool::VictimSwap;
use crate::pool::PoolReserves;

/// Front-run sizes tried, as percentages of the attack budget.
const GRID_PERCENTS: std::ops::RangeInclusive<u64> = 1..=49;
const GRID_STEP: usize = 2;

/// The most profitable attack found for one victim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackPlan {
    /// Size of the front-run, in the victim's input token
    pub front_run_amount: u64,
    /// Profit the simulation predicts, net of both legs' fees
    pub expected_profit: u64,
    /// Output the victim loses to the attack
    pub victim_expected_loss: u64,
    /// Tokens the front-run purchases (and the back-run sells)
    pub front_run_out: u64,
    /// Proceeds of the back-run
    pub back_run_out: u64,
}

/// Search for the front-run size that extracts the most value from
/// `victim`, given the attacker's capital in the victim's input token.
///
/// Candidates are a grid over `min(reserve_in / 2, capital)`; each is
/// evaluated by simulating the full sandwich on a clone of `pool`:
/// front-run in the victim's direction, the victim's swap at the worsened
/// price, then a back-run selling exactly what the front-run bought.
/// Profit is back-run proceeds minus front-run cost, both in the input
/// token.
///
/// Returns `None` when no candidate clears `min_profit` — rational bots do
/// not burn blockspace on negative or negligible expected value — or when
/// `capital` cannot fund even the smallest grid step.
pub fn find_optimal_attack(
    victim: &VictimSwap,
    pool: &PoolReserves,
    capital: u64,
    min_profit: u64,
) -> Result<Option<AttackPlan>, MathError> {
    let (reserve_in, _) = if victim.a_to_b {
        (pool.reserve_a, pool.reserve_b)
    } else {
        (pool.reserve_b, pool.reserve_a)
    };

    let budget = (reserve_in / 2).min(capital);
    if budget * *GRID_PERCENTS.start() / 100 == 0 {
        return Ok(None);
    }

    // What the victim would receive if nobody interfered; the baseline for
    // their loss.
    let undisturbed_out = pool.quote(victim.amount_in, victim.a_to_b)?.amount_out;

    let mut best: Option<AttackPlan> = None;

    for percent in GRID_PERCENTS.step_by(GRID_STEP) {
        let front_run = ((budget as u128) * (percent as u128) / 100) as u64;
        if front_run == 0 {
            continue;
        }

        // Never against the live pool: each candidate gets its own clone.
        let mut shadow = pool.clone();

        let front = shadow.apply_swap(front_run, victim.a_to_b)?;
        let victim_actual = shadow.apply_swap(victim.amount_in, victim.a_to_b)?.amount_out;

        // A victim with a real output floor reverts under this much
        // pressure, and a reverted victim swap means no back-run exit.
        if victim_actual < victim.min_out {
            trace!(percent, "victim floor would revert; candidate discarded");
            continue;
        }

        let back = shadow.apply_swap(front.amount_out, !victim.a_to_b)?;

        let profit = back.amount_out as i128 - front_run as i128;
        if profit <= 0 {
            continue;
        }
        let profit = profit as u64;

        if best.map_or(true, |b| profit > b.expected_profit) {
            best = Some(AttackPlan {
                front_run_amount: front_run,
                expected_profit: profit,
                victim_expected_loss: undisturbed_out.saturating_sub(victim_actual),
                front_run_out: front.amount_out,
                back_run_out: back.amount_out,
            });
        }
    }

    Ok(best.filter(|plan| plan.expected_profit >= min_profit))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOL: u64 = 1_000_000_000;

    fn victim(amount_in: u64) -> VictimSwap {
        VictimSwap {
            amount_in,
            a_to_b: true,
            min_out: 0,
        }
    }

    fn pool() -> PoolReserves {
        PoolReserves::new(1000 * SOL, 1000 * SOL, 30)
    }

    #[test]
    fn five_sol_victim_in_a_thousand_sol_pool_is_profitable() {
        let plan = find_optimal_attack(&victim(5 * SOL), &pool(), 500 * SOL, 10_000)
            .unwrap()
            .expect("attack should clear the threshold");

        assert!(plan.expected_profit > 0);
        assert!(plan.victim_expected_loss > 0);
        assert!(plan.front_run_amount > 0);
        // The budget cap: half the input-side reserve or the capital.
        assert!(plan.front_run_amount <= 500 * SOL);
    }

    #[test]
    fn search_is_deterministic() {
        let a = find_optimal_attack(&victim(5 * SOL), &pool(), 500 * SOL, 10_000).unwrap();
        let b = find_optimal_attack(&victim(5 * SOL), &pool(), 500 * SOL, 10_000).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn search_never_touches_the_live_pool() {
        let p = pool();
        let before = p.clone();
        find_optimal_attack(&victim(5 * SOL), &p, 500 * SOL, 10_000).unwrap();
        assert_eq!(p, before);
    }

    #[test]
    fn dust_victims_are_not_worth_attacking() {
        // A 1000-lamport trade cannot move the price enough to cover fees.
        let plan = find_optimal_attack(&victim(1_000), &pool(), 500 * SOL, 10_000).unwrap();
        assert!(plan.is_none());
    }

    #[test]
    fn broke_attackers_sit_out() {
        let plan = find_optimal_attack(&victim(5 * SOL), &pool(), 50, 10_000).unwrap();
        assert!(plan.is_none());
    }

    #[test]
    fn tight_victim_floor_shrinks_or_kills_the_attack() {
        let p = pool();
        let quoted = p.quote(5 * SOL, true).unwrap().amount_out;

        // Victim tolerates essentially nothing: every candidate that moves
        // the price enough to profit would revert their swap.
        let strict = VictimSwap {
            amount_in: 5 * SOL,
            a_to_b: true,
            min_out: quoted,
        };
        assert!(find_optimal_attack(&strict, &p, 500 * SOL, 10_000)
            .unwrap()
            .is_none());

        // A loose floor still leaves room.
        let loose = VictimSwap {
            amount_in: 5 * SOL,
            a_to_b: true,
            min_out: quoted / 2,
        };
        assert!(find_optimal_attack(&loose, &p, 500 * SOL, 10_000)
            .unwrap()
            .is_some());
    }

    #[test]
    fn profit_grows_with_victim_size() {
        let p = pool();
        let small = find_optimal_attack(&victim(SOL), &p, 500 * SOL, 0)
            .unwrap()
            .map(|pl| pl.expected_profit)
            .unwrap_or(0);
        let large = find_optimal_attack(&victim(10 * SOL), &p, 500 * SOL, 0)
            .unwrap()
            .map(|pl| pl.expected_profit)
            .unwrap_or(0);
        assert!(large > small);
    }

    #[test]
    fn works_in_both_directions() {
        let reversed = VictimSwap {
            amount_in: 5 * SOL,
            a_to_b: false,
            min_out: 0,
        };
        let plan = find_optimal_attack(&reversed, &pool(), 500 * SOL, 10_000)
            .unwrap()
            .expect("symmetric pool, symmetric attack");
        assert!(plan.expected_profit > 0);
    }
}
