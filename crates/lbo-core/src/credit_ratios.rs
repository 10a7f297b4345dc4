use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::Model;
use crate::types::*;

/// Leverage and coverage ratios for one projection year.
///
/// A zero denominator (no interest expense, zero EBITDA) makes the ratio
/// undefined rather than an error; `None` is the reportable edge value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditRatio {
    pub year: usize,
    /// Beginning total debt balance / EBITDA
    pub debt_to_ebitda: Option<Multiple>,
    /// EBIT / interest expense
    pub interest_coverage: Option<Multiple>,
    /// EBITDA / (interest + total amortization)
    pub debt_service_coverage: Option<Multiple>,
}

fn ratio(numerator: Decimal, denominator: Decimal) -> Option<Multiple> {
    if denominator.is_zero() {
        None
    } else {
        Some(numerator / denominator)
    }
}

/// Derive per-year credit ratios from the finalized income statement and
/// debt schedule.
pub fn calculate(model: &mut Model) {
    let Model {
        income_statement,
        debt_schedule,
        credit_ratios,
        ..
    } = model;

    credit_ratios.clear();
    for projection in &income_statement.projections {
        let debt_totals = &debt_schedule.totals_by_year[projection.year];
        let debt_service = debt_totals.interest_expense + debt_totals.total_amortization;

        credit_ratios.push(CreditRatio {
            year: projection.year,
            debt_to_ebitda: ratio(debt_totals.beginning_balance, projection.ebitda),
            interest_coverage: ratio(projection.ebit, debt_totals.interest_expense),
            debt_service_coverage: ratio(projection.ebitda, debt_service),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::ModelAssumptions;
    use crate::{debt_schedule, income_statement, sources_uses};
    use rust_decimal_macros::dec;

    fn ratio_model() -> Model {
        let mut model = Model::new(ModelAssumptions::default());
        model.assumptions.normalize();
        sources_uses::calculate(&mut model);
        model.assumptions.populate_debt_assumptions();
        income_statement::calculate(&mut model);
        debt_schedule::calculate_scheduled(&mut model);
        calculate(&mut model);
        model
    }

    #[test]
    fn test_first_year_ratios() {
        let model = ratio_model();
        let r = &model.credit_ratios[0];

        // 300 beginning debt on 105 EBITDA
        assert_eq!(r.debt_to_ebitda, Some(dec!(300) / dec!(105)));
        // EBIT 89.25 over 18 of interest
        assert_eq!(r.interest_coverage, Some(dec!(89.25) / dec!(18)));
        // 105 EBITDA over 33 of debt service (18 interest + 15 amortization)
        assert_eq!(r.debt_service_coverage, Some(dec!(105) / dec!(33)));
    }

    #[test]
    fn test_zero_interest_is_undefined_not_error() {
        let mut model = Model::new(ModelAssumptions::default());
        model.assumptions.normalize();
        sources_uses::calculate(&mut model);
        model.assumptions.populate_debt_assumptions();
        for assumption in &mut model.assumptions.debt_assumptions {
            assumption.interest_rate = dec!(0);
            assumption.amortization_pct = dec!(0);
        }
        income_statement::calculate(&mut model);
        debt_schedule::calculate_scheduled(&mut model);
        calculate(&mut model);

        let r = &model.credit_ratios[0];
        assert_eq!(r.interest_coverage, None);
        assert_eq!(r.debt_service_coverage, None);
        assert!(r.debt_to_ebitda.is_some());
    }

    #[test]
    fn test_one_ratio_per_year() {
        let model = ratio_model();
        assert_eq!(model.credit_ratios.len(), 5);
        assert_eq!(model.credit_ratios[4].year, 5);
    }
}
