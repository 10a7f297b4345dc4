use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::model::Model;
use crate::types::*;

const MAX_IRR_ITERATIONS: u32 = 1000;
const IRR_TOLERANCE: Decimal = dec!(0.000001);
const DERIVATIVE_FLOOR: Decimal = dec!(0.0000000001);
/// Reported when the negative-return search fails to converge, in percent.
pub const IRR_NON_CONVERGENT: Decimal = dec!(-100);

/// Returns attributable to one equity class. MOIC and IRR match the blended
/// deal figures because both classes share the same cash-flow timing; only
/// the principal amounts differ.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EquityClassReturns {
    pub initial_equity: Money,
    pub exit_equity: Money,
    pub moic: Multiple,
    /// Percent units
    pub irr: Pct,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Returns {
    pub exit_year: usize,
    pub exit_multiple: Multiple,
    pub initial_equity: Money,
    pub exit_equity: Money,
    pub moic: Multiple,
    /// Percent units; -100 is the non-convergence sentinel
    pub irr: Pct,
    /// Index 0 = -initial equity; index exit_year = exit proceeds plus that
    /// year's distribution
    pub cash_flows: Vec<Money>,
    /// Running sum of the distributions, starting at 0
    pub cumulative_cash_flows: Vec<Money>,
    /// Share of the total return delivered by interim cash flows, percent
    pub cash_flow_attribution: Pct,
    /// Share of the total return delivered by the exit value, percent
    pub exit_value_attribution: Pct,
    pub management: EquityClassReturns,
    pub sponsor: EquityClassReturns,
}

/// Build the equity cash-flow vector, solve for IRR, and split the outcome
/// between management and sponsor.
pub fn calculate(model: &mut Model) {
    let Model {
        assumptions,
        income_statement,
        debt_schedule,
        cash_flow,
        sources_uses,
        returns,
        ..
    } = model;

    let exit_year = assumptions.exit.exit_year;
    let exit_multiple = assumptions.exit.exit_multiple;
    let initial_equity = sources_uses.equity_contribution;

    let mut cash_flows: Vec<Money> = Vec::with_capacity(exit_year + 1);
    cash_flows.push(-initial_equity);
    for year in 1..exit_year {
        cash_flows.push(cash_flow.years[year - 1].fcf_to_equity);
    }

    let exit_ebitda = income_statement.projections[exit_year - 1].ebitda;
    let exit_enterprise_value = exit_ebitda * exit_multiple;
    let exit_debt = debt_schedule.totals_by_year[exit_year].ending_balance;
    let exit_equity = exit_enterprise_value - exit_debt;

    let exit_year_distribution = cash_flow.years[exit_year - 1].fcf_to_equity;
    cash_flows.push(exit_equity + exit_year_distribution);

    let total_distributions: Money = cash_flows.iter().skip(1).sum();
    let moic = if initial_equity.is_zero() {
        Decimal::ZERO
    } else {
        total_distributions / initial_equity
    };

    let irr = internal_rate_of_return(&cash_flows);

    let mut cumulative_cash_flows = Vec::with_capacity(cash_flows.len());
    let mut cumulative = Decimal::ZERO;
    for (index, flow) in cash_flows.iter().enumerate() {
        if index == 0 {
            cumulative_cash_flows.push(Decimal::ZERO);
        } else {
            cumulative += flow;
            cumulative_cash_flows.push(cumulative);
        }
    }

    let total_return = moic * initial_equity;
    let (cash_flow_attribution, exit_value_attribution) = if total_return.is_zero() {
        (Decimal::ZERO, Decimal::ZERO)
    } else {
        (
            (total_return - exit_equity) / total_return * Decimal::ONE_HUNDRED,
            exit_equity / total_return * Decimal::ONE_HUNDRED,
        )
    };

    let management_share = pct(assumptions.transaction.management_equity_pct);
    let sponsor_share = Decimal::ONE - management_share;
    let management = EquityClassReturns {
        initial_equity: initial_equity * management_share,
        exit_equity: exit_equity * management_share,
        moic,
        irr,
    };
    let sponsor = EquityClassReturns {
        initial_equity: initial_equity * sponsor_share,
        exit_equity: exit_equity * sponsor_share,
        moic,
        irr,
    };

    *returns = Returns {
        exit_year,
        exit_multiple,
        initial_equity,
        exit_equity,
        moic,
        irr,
        cash_flows,
        cumulative_cash_flows,
        cash_flow_attribution,
        exit_value_attribution,
        management,
        sponsor,
    };
}

/// Net present value of annual cash flows at a fractional discount rate.
pub fn npv(rate: Decimal, cash_flows: &[Money]) -> Money {
    let one_plus = Decimal::ONE + rate;
    let mut result = Decimal::ZERO;
    for (t, flow) in cash_flows.iter().enumerate() {
        if flow.is_zero() {
            continue;
        }
        match one_plus.checked_powi(t as i64) {
            Some(factor) if !factor.is_zero() => result += flow / factor,
            _ => {}
        }
    }
    result
}

/// NPV and its derivative with respect to the rate, skipping zero flows.
/// `None` signals the factors overflowed at an extreme rate.
fn npv_and_derivative(rate: Decimal, cash_flows: &[Money]) -> Option<(Decimal, Decimal)> {
    let one_plus = Decimal::ONE + rate;
    let mut npv = Decimal::ZERO;
    let mut derivative = Decimal::ZERO;

    for (t, flow) in cash_flows.iter().enumerate() {
        if flow.is_zero() {
            continue;
        }
        let factor = one_plus.checked_powi(t as i64)?;
        if factor.is_zero() {
            continue;
        }
        npv += flow / factor;

        let next_factor = one_plus.checked_powi(t as i64 + 1)?;
        if next_factor.is_zero() {
            continue;
        }
        derivative -= Decimal::from(t as i64) * flow / next_factor;
    }

    Some((npv, derivative))
}

/// Newton-Raphson IRR in percent units.
///
/// The single-exit net-loss case (two flows, terminal below the initial
/// outflow) takes a dedicated search seeded at -50% with the guess clamped
/// into (-0.99, 1.0]; everything else runs the standard search from +10%.
/// Non-convergence is the -100 sentinel, never an error. Multi-year vectors
/// with a net loss deliberately stay on the standard path even though it
/// converges less reliably for negative rates; the asymmetry is part of the
/// solver's contract.
pub fn internal_rate_of_return(cash_flows: &[Money]) -> Pct {
    if cash_flows.len() <= 1 || (cash_flows.len() == 2 && cash_flows[0].is_zero()) {
        return Decimal::ZERO;
    }

    if cash_flows.len() == 2 && cash_flows[1] < cash_flows[0].abs() {
        let mut guess = dec!(-0.5);

        for _ in 0..MAX_IRR_ITERATIONS {
            let Some((npv, derivative)) = npv_and_derivative(guess, cash_flows) else {
                break;
            };
            if npv.abs() < IRR_TOLERANCE {
                return guess * Decimal::ONE_HUNDRED;
            }
            if derivative.abs() < DERIVATIVE_FLOOR {
                return guess * Decimal::ONE_HUNDRED;
            }

            let next = guess - npv / derivative;
            guess = if next < dec!(-0.99) {
                dec!(-0.99)
            } else if next > Decimal::ONE_HUNDRED {
                Decimal::ONE
            } else {
                next
            };
        }

        return IRR_NON_CONVERGENT;
    }

    let mut guess = dec!(0.1);

    for _ in 0..MAX_IRR_ITERATIONS {
        let Some((npv, derivative)) = npv_and_derivative(guess, cash_flows) else {
            break;
        };
        if npv.abs() < IRR_TOLERANCE {
            return guess * Decimal::ONE_HUNDRED;
        }
        if derivative.abs() < DERIVATIVE_FLOOR {
            break;
        }

        guess -= npv / derivative;

        if guess <= Decimal::NEGATIVE_ONE {
            return IRR_NON_CONVERGENT;
        }
    }

    guess * Decimal::ONE_HUNDRED
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_irr_degenerate_vectors_return_zero() {
        assert_eq!(internal_rate_of_return(&[]), Decimal::ZERO);
        assert_eq!(internal_rate_of_return(&[dec!(-100)]), Decimal::ZERO);
        assert_eq!(
            internal_rate_of_return(&[Decimal::ZERO, dec!(100)]),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_irr_single_exit_doubles_in_five_years() {
        // 1.5x over 5 years: (1.5)^(1/5) - 1 = 8.447%
        let flows = [dec!(-100), dec!(0), dec!(0), dec!(0), dec!(0), dec!(150)];
        let irr = internal_rate_of_return(&flows);
        assert!(
            (irr - dec!(8.447)).abs() < dec!(0.01),
            "expected ~8.447, got {irr}"
        );
    }

    #[test]
    fn test_irr_round_trips_through_npv() {
        let flows = [dec!(-100), dec!(0), dec!(0), dec!(0), dec!(0), dec!(300)];
        let irr = internal_rate_of_return(&flows);
        let residual = npv(irr / Decimal::ONE_HUNDRED, &flows);
        assert!(
            residual.abs() < dec!(0.0001),
            "NPV at the solved rate should vanish, got {residual}"
        );
    }

    #[test]
    fn test_irr_negative_return_branch() {
        // Lose half the money in one year: exact root at -50%
        let irr = internal_rate_of_return(&[dec!(-100), dec!(50)]);
        assert!(
            (irr - dec!(-50)).abs() < dec!(0.01),
            "expected ~-50, got {irr}"
        );
    }

    #[test]
    fn test_irr_two_flow_gain_takes_standard_branch() {
        // Double in one year: exact root at +100%
        let irr = internal_rate_of_return(&[dec!(-100), dec!(200)]);
        assert!(
            (irr - dec!(100)).abs() < dec!(0.01),
            "expected ~100, got {irr}"
        );
    }

    #[test]
    fn test_irr_skips_zero_flows() {
        // Interleaved zeros must not perturb the root
        let with_zeros = [dec!(-100), dec!(0), dec!(60), dec!(0), dec!(60)];
        let irr = internal_rate_of_return(&with_zeros);
        let residual = npv(irr / Decimal::ONE_HUNDRED, &with_zeros);
        assert!(residual.abs() < dec!(0.0001));
    }

    #[test]
    fn test_npv_at_zero_rate_is_simple_sum() {
        let flows = [dec!(-100), dec!(30), dec!(30), dec!(60)];
        assert_eq!(npv(Decimal::ZERO, &flows), dec!(20));
    }
}
