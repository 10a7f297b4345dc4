use serde::{Deserialize, Serialize};

use crate::model::Model;
use crate::types::*;

/// Free-cash-flow build for a single projection year.
///
/// `available_for_sweep` is derived from the scheduled-pass debt figures;
/// `additional_amortization` and `fcf_to_equity` start from a zero sweep and
/// are refreshed once the waterfall has run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CashFlowYear {
    pub year: usize,
    pub net_income: Money,
    pub da: Money,
    pub nwc_change: Money,
    pub capex: Money,
    pub fcf_before_debt: Money,
    pub interest_expense: Money,
    pub scheduled_amortization: Money,
    pub available_for_sweep: Money,
    pub additional_amortization: Money,
    pub fcf_to_equity: Money,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CashFlowStatement {
    pub years: Vec<CashFlowYear>,
}

/// Rebuild the cash-flow statement from the income statement and the
/// current debt-schedule totals.
pub fn calculate(model: &mut Model) {
    let Model {
        assumptions,
        income_statement,
        debt_schedule,
        cash_flow,
        ..
    } = model;

    let mut years = Vec::with_capacity(assumptions.projections.len());

    for (index, projection) in income_statement.projections.iter().enumerate() {
        let year = index + 1;
        let debt_totals = &debt_schedule.totals_by_year[year];

        let prev_revenue = if index == 0 {
            income_statement.historical.revenue
        } else {
            income_statement.projections[index - 1].revenue
        };
        let revenue_change = projection.revenue - prev_revenue;

        let nwc_change = revenue_change * pct(assumptions.cash_flow.nwc_pcts[index]);
        let capex = projection.revenue * pct(assumptions.cash_flow.capex_pcts[index]);

        let fcf_before_debt = projection.net_income + projection.da - nwc_change - capex;
        let available_for_sweep =
            fcf_before_debt - debt_totals.interest_expense - debt_totals.scheduled_amortization;
        let fcf_to_equity = available_for_sweep - debt_totals.additional_amortization;

        years.push(CashFlowYear {
            year,
            net_income: projection.net_income,
            da: projection.da,
            nwc_change,
            capex,
            fcf_before_debt,
            interest_expense: debt_totals.interest_expense,
            scheduled_amortization: debt_totals.scheduled_amortization,
            available_for_sweep,
            additional_amortization: debt_totals.additional_amortization,
            fcf_to_equity,
        });
    }

    cash_flow.years = years;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::ModelAssumptions;
    use crate::{debt_schedule, income_statement, sources_uses};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn model_through_cash_flow() -> Model {
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
    fn test_first_year_build() {
        let model = model_through_cash_flow();
        let flow = &model.cash_flow.years[0];

        // Revenue 525, growth from 500; NWC 0%, capex 3%
        assert_eq!(flow.nwc_change, Decimal::ZERO);
        assert_eq!(flow.capex, dec!(15.75));
        // Net income at zero interest: EBT 89.25, taxes 22.3125
        assert_eq!(flow.net_income, dec!(66.9375));
        assert_eq!(flow.da, dec!(15.75));
        assert_eq!(flow.fcf_before_debt, dec!(66.9375));
        // Less 18 interest and 15 scheduled amortization
        assert_eq!(flow.available_for_sweep, dec!(33.9375));
        // No sweep yet
        assert_eq!(flow.additional_amortization, Decimal::ZERO);
        assert_eq!(flow.fcf_to_equity, flow.available_for_sweep);
    }

    #[test]
    fn test_nwc_tracks_revenue_change() {
        let mut model = Model::new(ModelAssumptions::default());
        model.assumptions.normalize();
        for nwc in &mut model.assumptions.cash_flow.nwc_pcts {
            *nwc = dec!(10);
        }
        sources_uses::calculate(&mut model);
        model.assumptions.populate_debt_assumptions();
        income_statement::calculate(&mut model);
        debt_schedule::calculate_scheduled(&mut model);
        calculate(&mut model);

        // Year 1: revenue change 25 => NWC change 2.5
        assert_eq!(model.cash_flow.years[0].nwc_change, dec!(2.5));
    }

    #[test]
    fn test_one_flow_per_projection_year() {
        let model = model_through_cash_flow();
        assert_eq!(model.cash_flow.years.len(), 5);
        assert_eq!(model.cash_flow.years[4].year, 5);
    }
}
