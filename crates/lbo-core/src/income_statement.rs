use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::Model;
use crate::types::*;

/// Derived historical (pre-transaction) income statement
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoricalStatement {
    pub revenue: Money,
    pub cogs: Money,
    pub sga: Money,
    pub ebitda: Money,
    pub da: Money,
    pub ebit: Money,
    pub interest_expense: Money,
    pub ebt: Money,
    pub taxes: Money,
    pub net_income: Money,
}

/// Derived income statement for a single projection year.
///
/// `interest_expense` is a cross-statement input: the full pass seeds it at
/// zero, the debt schedule's scheduled pass accumulates into it, and the
/// sweep overwrites it with the final totals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectionYear {
    pub year: usize,
    pub revenue: Money,
    pub cogs: Money,
    pub sga: Money,
    pub ebitda: Money,
    pub da: Money,
    pub ebit: Money,
    pub interest_expense: Money,
    pub ebt: Money,
    pub taxes: Money,
    pub net_income: Money,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncomeStatement {
    pub historical: HistoricalStatement,
    pub projections: Vec<ProjectionYear>,
}

/// Full projection pass. Rebuilds the statement from the operating drivers
/// with interest expense seeded at zero, ready for the debt schedule.
pub fn calculate(model: &mut Model) {
    let assumptions = &model.assumptions;
    let drivers = &assumptions.historical;

    let mut historical = HistoricalStatement {
        revenue: drivers.revenue,
        ..Default::default()
    };
    historical.cogs = historical.revenue * pct(drivers.cogs_pct);
    historical.sga = historical.revenue * pct(drivers.sga_pct);
    historical.ebitda = historical.revenue - historical.cogs - historical.sga;
    historical.da = historical.revenue * pct(drivers.da_pct);
    historical.ebit = historical.ebitda - historical.da;
    historical.ebt = historical.ebit - historical.interest_expense;
    historical.taxes = (historical.ebt * pct(drivers.tax_rate)).max(Decimal::ZERO);
    historical.net_income = historical.ebt - historical.taxes;

    let mut projections = Vec::with_capacity(assumptions.projections.len());
    let mut prev_revenue = historical.revenue;

    for (index, drivers) in assumptions.projections.iter().enumerate() {
        let revenue = prev_revenue * (Decimal::ONE + pct(drivers.revenue_growth_pct));
        prev_revenue = revenue;

        let cogs = revenue * pct(drivers.cogs_pct);
        let sga = revenue * pct(drivers.sga_pct);
        let ebitda = revenue - cogs - sga;
        let da = revenue * pct(drivers.da_pct);
        let ebit = ebitda - da;

        // Interest arrives from the debt schedule; seed the tail at zero
        let interest_expense = Decimal::ZERO;
        let ebt = ebit - interest_expense;
        let taxes = (ebt * pct(drivers.tax_rate)).max(Decimal::ZERO);
        let net_income = ebt - taxes;

        projections.push(ProjectionYear {
            year: index + 1,
            revenue,
            cogs,
            sga,
            ebitda,
            da,
            ebit,
            interest_expense,
            ebt,
            taxes,
            net_income,
        });
    }

    model.income_statement = IncomeStatement {
        historical,
        projections,
    };
}

/// Tail re-derivation: recompute EBT, taxes, and net income from the
/// finalized interest expense without touching revenue or EBITDA.
pub fn finalize(model: &mut Model) {
    let Model {
        assumptions,
        income_statement,
        ..
    } = model;

    for (year, drivers) in income_statement
        .projections
        .iter_mut()
        .zip(assumptions.projections.iter())
    {
        year.ebt = year.ebit - year.interest_expense;
        year.taxes = (year.ebt * pct(drivers.tax_rate)).max(Decimal::ZERO);
        year.net_income = year.ebt - year.taxes;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::ModelAssumptions;
    use rust_decimal_macros::dec;

    fn default_model() -> Model {
        Model::new(ModelAssumptions::default())
    }

    #[test]
    fn test_historical_derivation() {
        let mut model = default_model();
        calculate(&mut model);
        let h = &model.income_statement.historical;

        // Revenue 500, COGS 60%, SG&A 20%, D&A 3%, tax 25%
        assert_eq!(h.cogs, dec!(300));
        assert_eq!(h.sga, dec!(100));
        assert_eq!(h.ebitda, dec!(100));
        assert_eq!(h.da, dec!(15));
        assert_eq!(h.ebit, dec!(85));
        assert_eq!(h.taxes, dec!(21.25));
        assert_eq!(h.net_income, dec!(63.75));
    }

    #[test]
    fn test_revenue_compounds_from_historical() {
        let mut model = default_model();
        calculate(&mut model);
        let p = &model.income_statement.projections;

        assert_eq!(p.len(), 5);
        // 5% growth on a 500 base
        assert_eq!(p[0].revenue, dec!(525));
        assert_eq!(p[1].revenue, dec!(551.25));
        assert_eq!(p[0].ebitda, dec!(105));
    }

    #[test]
    fn test_interest_seeded_at_zero() {
        let mut model = default_model();
        calculate(&mut model);
        for year in &model.income_statement.projections {
            assert_eq!(year.interest_expense, Decimal::ZERO);
            assert_eq!(year.ebt, year.ebit);
        }
    }

    #[test]
    fn test_tax_floor_on_negative_ebt() {
        let mut model = default_model();
        // Costs above 100% of revenue force a pre-tax loss
        for drivers in &mut model.assumptions.projections {
            drivers.cogs_pct = dec!(90);
            drivers.sga_pct = dec!(30);
        }
        calculate(&mut model);

        let year1 = &model.income_statement.projections[0];
        assert!(year1.ebt < Decimal::ZERO);
        assert_eq!(year1.taxes, Decimal::ZERO);
        assert_eq!(year1.net_income, year1.ebt);
    }

    #[test]
    fn test_finalize_rederives_tail_only() {
        let mut model = default_model();
        calculate(&mut model);

        let ebit_before = model.income_statement.projections[0].ebit;
        let revenue_before = model.income_statement.projections[0].revenue;

        model.income_statement.projections[0].interest_expense = dec!(18);
        finalize(&mut model);

        let year1 = &model.income_statement.projections[0];
        assert_eq!(year1.revenue, revenue_before);
        assert_eq!(year1.ebit, ebit_before);
        assert_eq!(year1.ebt, ebit_before - dec!(18));
        assert_eq!(year1.taxes, year1.ebt * dec!(0.25));
        assert_eq!(year1.net_income, year1.ebt - year1.taxes);
    }
}
