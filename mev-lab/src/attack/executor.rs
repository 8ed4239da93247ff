//! Sandwich execution against the live pool.

use amm::math::MathError;
use tracing::{debug, info};

use super::calculator::AttackPlan;
use crate::mempool::VictimSwap;
use crate::pool::PoolReserves;

/// What actually happened when a plan was executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SandwichOutcome {
    /// The plan that was executed
    pub plan: AttackPlan,
    /// Profit measured from the attacker's balance deltas. The simulated
    /// `plan.expected_profit` is the reported figure; this one exists to
    /// prove the two never drift apart.
    pub realized_profit: i64,
    /// Output the victim actually lost
    pub victim_loss: u64,
    /// Output the victim actually received
    pub victim_out: u64,
    /// Whether the attack closed profitably
    pub success: bool,
}

/// The attacker: capital in both tokens plus running totals.
#[derive(Debug)]
pub struct SandwichExecutor {
    balance_a: u64,
    balance_b: u64,
    total_profit: i64,
    executed: u32,
    skipped: u32,
}

impl SandwichExecutor {
    pub fn new(capital_a: u64, capital_b: u64) -> Self {
        Self {
            balance_a: capital_a,
            balance_b: capital_b,
            total_profit: 0,
            executed: 0,
            skipped: 0,
        }
    }

    /// Capital available for a front-run in the given direction.
    pub fn capital_for(&self, a_to_b: bool) -> u64 {
        if a_to_b {
            self.balance_a
        } else {
            self.balance_b
        }
    }

    pub fn balances(&self) -> (u64, u64) {
        (self.balance_a, self.balance_b)
    }

    /// (total profit, attacks executed, attacks skipped)
    pub fn stats(&self) -> (i64, u32, u32) {
        (self.total_profit, self.executed, self.skipped)
    }

    /// Note a victim that was observed but not attacked.
    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    /// Run the sandwich: front-run, victim, back-run, strictly in that
    /// order against the same live pool. Each leg settles before the next
    /// is issued; winning block-ordering priority is the attacker's entire
    /// business, so the harness never reorders these.
    pub fn execute(
        &mut self,
        plan: &AttackPlan,
        victim: &VictimSwap,
        pool: &mut PoolReserves,
    ) -> Result<SandwichOutcome, MathError> {
        let a_to_b = victim.a_to_b;
        debug_assert!(self.capital_for(a_to_b) >= plan.front_run_amount);

        let undisturbed_out = pool.quote(victim.amount_in, a_to_b)?.amount_out;

        // Leg 1: front-run in the victim's direction.
        self.debit(a_to_b, plan.front_run_amount);
        let front = pool.apply_swap(plan.front_run_amount, a_to_b)?;
        self.credit(!a_to_b, front.amount_out);
        debug!(amount = plan.front_run_amount, "front-run settled");

        // Leg 2: the victim lands at the worsened price.
        let victim_out = pool.apply_swap(victim.amount_in, a_to_b)?.amount_out;
        let victim_loss = undisturbed_out.saturating_sub(victim_out);

        // Leg 3: back-run, selling exactly what the front-run bought.
        self.debit(!a_to_b, front.amount_out);
        let back = pool.apply_swap(front.amount_out, !a_to_b)?;
        self.credit(a_to_b, back.amount_out);
        debug!(amount = front.amount_out, "back-run settled");

        let realized_profit = back.amount_out as i64 - plan.front_run_amount as i64;
        self.total_profit += realized_profit;

        let success = realized_profit > 0;
        if success {
            self.executed += 1;
            info!(profit = realized_profit, victim_loss, "sandwich landed");
        } else {
            self.skipped += 1;
            info!(loss = -realized_profit, "sandwich closed at a loss");
        }

        Ok(SandwichOutcome {
            plan: *plan,
            realized_profit,
            victim_loss,
            victim_out,
            success,
        })
    }

    fn debit(&mut self, a_side: bool, amount: u64) {
        if a_side {
            self.balance_a -= amount;
        } else {
            self.balance_b -= amount;
        }
    }

    fn credit(&mut self, a_side: bool, amount: u64) {
        if a_side {
            self.balance_a += amount;
        } else {
            self.balance_b += amount;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attack::calculator::find_optimal_attack;

    const SOL: u64 = 1_000_000_000;

    #[test]
    fn realized_profit_reconciles_with_the_simulated_figure() {
        let mut pool = PoolReserves::new(1000 * SOL, 1000 * SOL, 30);
        let victim = VictimSwap {
            amount_in: 5 * SOL,
            a_to_b: true,
            min_out: 0,
        };
        let mut attacker = SandwichExecutor::new(500 * SOL, 500 * SOL);

        let plan = find_optimal_attack(&victim, &pool, attacker.capital_for(true), 10_000)
            .unwrap()
            .unwrap();
        let outcome = attacker.execute(&plan, &victim, &mut pool).unwrap();

        // Same math, same pool state: the balance-delta figure must equal
        // the simulation exactly.
        assert_eq!(outcome.realized_profit, plan.expected_profit as i64);
        assert_eq!(outcome.victim_loss, plan.victim_expected_loss);
        assert!(outcome.success);
    }

    #[test]
    fn attacker_balances_move_by_exactly_the_profit() {
        let mut pool = PoolReserves::new(1000 * SOL, 1000 * SOL, 30);
        let victim = VictimSwap {
            amount_in: 5 * SOL,
            a_to_b: true,
            min_out: 0,
        };
        let mut attacker = SandwichExecutor::new(500 * SOL, 500 * SOL);
        let (a_before, b_before) = attacker.balances();

        let plan = find_optimal_attack(&victim, &pool, attacker.capital_for(true), 10_000)
            .unwrap()
            .unwrap();
        let outcome = attacker.execute(&plan, &victim, &mut pool).unwrap();

        let (a_after, b_after) = attacker.balances();
        // The B leg nets to zero: everything bought is sold back.
        assert_eq!(b_after, b_before);
        assert_eq!(a_after as i64 - a_before as i64, outcome.realized_profit);
    }

    #[test]
    fn victim_receives_strictly_less_under_attack() {
        let clean = PoolReserves::new(1000 * SOL, 1000 * SOL, 30);
        let undisturbed = clean.quote(5 * SOL, true).unwrap().amount_out;

        let mut pool = clean.clone();
        let victim = VictimSwap {
            amount_in: 5 * SOL,
            a_to_b: true,
            min_out: 0,
        };
        let mut attacker = SandwichExecutor::new(500 * SOL, 500 * SOL);
        let plan = find_optimal_attack(&victim, &pool, attacker.capital_for(true), 10_000)
            .unwrap()
            .unwrap();
        let outcome = attacker.execute(&plan, &victim, &mut pool).unwrap();

        assert!(outcome.victim_out < undisturbed);
        assert_eq!(outcome.victim_loss, undisturbed - outcome.victim_out);
    }
}
