use std::time::Instant;

use serde::Serialize;

use crate::assumptions::ModelAssumptions;
use crate::cash_flow::CashFlowStatement;
use crate::credit_ratios::CreditRatio;
use crate::debt_schedule::DebtSchedule;
use crate::income_statement::IncomeStatement;
use crate::returns::{Returns, IRR_NON_CONVERGENT};
use crate::sensitivity::SensitivityAnalysis;
use crate::sources_uses::SourcesUses;
use crate::types::*;
use crate::{
    cash_flow, credit_ratios, debt_schedule, income_statement, returns, sensitivity, sources_uses,
    LboResult,
};

/// The full model state: boundary assumptions plus every derived statement.
///
/// Stages communicate exclusively through this struct; each stage reads the
/// statements upstream of it and overwrites its own. The calculation order
/// in [`Model::calculate`] is the only ordering under which the circular
/// interest dependency resolves.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Model {
    pub assumptions: ModelAssumptions,
    pub sources_uses: SourcesUses,
    pub income_statement: IncomeStatement,
    pub debt_schedule: DebtSchedule,
    pub cash_flow: CashFlowStatement,
    pub credit_ratios: Vec<CreditRatio>,
    pub returns: Returns,
    pub sensitivity: SensitivityAnalysis,
    #[serde(skip)]
    pub warnings: Vec<String>,
}

impl Model {
    pub fn new(assumptions: ModelAssumptions) -> Self {
        Self {
            assumptions,
            ..Default::default()
        }
    }

    /// Run the full pipeline.
    ///
    /// Interest expense is circular: it depends on debt balances, which the
    /// sweep moves with cash that depends on net income, which depends on
    /// interest. The pipeline breaks the loop with a fixed two-pass order:
    /// the income statement seeds interest at zero, the scheduled debt pass
    /// accumulates contractual interest, the sweep reprices balances and
    /// overwrites interest with the final totals, and a tail re-derivation
    /// settles EBT, taxes, and net income.
    pub fn calculate(&mut self) -> LboResult<()> {
        self.warnings.clear();
        self.assumptions.normalize();

        sources_uses::calculate(self);
        self.assumptions.populate_debt_assumptions();
        self.assumptions.apply_debt_overrides()?;

        income_statement::calculate(self);
        debt_schedule::calculate_scheduled(self);
        cash_flow::calculate(self);
        debt_schedule::apply_cash_sweep(self);
        income_statement::finalize(self);
        credit_ratios::calculate(self);
        returns::calculate(self);
        sensitivity::calculate(self);

        self.collect_warnings();
        Ok(())
    }

    fn collect_warnings(&mut self) {
        let uses_less_debt = self.sources_uses.total_uses - self.sources_uses.total_debt;
        if uses_less_debt < Money::ZERO {
            self.warnings.push(
                "Debt raised exceeds total uses; equity contribution floored at zero".to_string(),
            );
        }

        if self.returns.irr == IRR_NON_CONVERGENT {
            self.warnings
                .push("IRR solver did not converge; -100% reported".to_string());
        }

        if self
            .credit_ratios
            .iter()
            .any(|r| r.interest_coverage.is_none() || r.debt_service_coverage.is_none())
        {
            self.warnings.push(
                "Some credit ratios are undefined due to zero denominators".to_string(),
            );
        }
    }
}

/// Calculate a complete leveraged buyout model from boundary assumptions.
pub fn calculate_model(assumptions: ModelAssumptions) -> LboResult<ComputationOutput<Model>> {
    let start = Instant::now();

    let mut model = Model::new(assumptions);
    model.calculate()?;

    let elapsed_us = start.elapsed().as_micros() as u64;
    let warnings = model.warnings.clone();
    let assumptions_summary = serde_json::json!({
        "ltm_ebitda": model.assumptions.transaction.ltm_ebitda,
        "ev_multiple": model.assumptions.transaction.ev_multiple,
        "total_debt": model.sources_uses.total_debt,
        "equity_contribution": model.sources_uses.equity_contribution,
        "projection_years": model.assumptions.projection_years(),
        "exit_year": model.assumptions.exit.exit_year,
        "exit_multiple": model.assumptions.exit.exit_multiple,
    });

    Ok(with_metadata(
        "Leveraged Buyout Model (Sources & Uses, debt schedule with cash sweep, returns)",
        &assumptions_summary,
        warnings,
        elapsed_us,
        model,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_model_runs_clean() {
        let mut model = Model::new(ModelAssumptions::default());
        model.calculate().unwrap();

        assert_eq!(model.income_statement.projections.len(), 5);
        assert_eq!(model.cash_flow.years.len(), 5);
        assert_eq!(model.credit_ratios.len(), 5);
        assert!(model.returns.moic > Decimal::ONE);
        assert!(model.warnings.is_empty());
    }

    #[test]
    fn test_unknown_override_fails_the_run() {
        let mut assumptions = ModelAssumptions::default();
        assumptions.debt_overrides = vec![crate::assumptions::DebtAssumptionOverride {
            name: "Mezzanine".into(),
            amortization_pct: Some(dec!(1)),
            interest_rate: None,
            cash_flow_sweep_pct: None,
        }];
        let mut model = Model::new(assumptions);
        assert!(model.calculate().is_err());
    }

    #[test]
    fn test_equity_floor_produces_warning() {
        let mut assumptions = ModelAssumptions::default();
        assumptions.transaction.ev_multiple = dec!(2);
        assumptions.tranches[0].multiple = dec!(8);
        assumptions.tranches[1].multiple = Decimal::ZERO;
        let mut model = Model::new(assumptions);
        model.calculate().unwrap();

        assert!(model
            .warnings
            .iter()
            .any(|w| w.contains("equity contribution floored")));
    }

    #[test]
    fn test_envelope_carries_metadata() {
        let output = calculate_model(ModelAssumptions::default()).unwrap();

        assert!(output.methodology.contains("Leveraged Buyout"));
        assert_eq!(output.metadata.precision, "rust_decimal_128bit");
        assert_eq!(output.result.assumptions.transaction.ltm_ebitda, dec!(100));
        assert_eq!(output.assumptions["ev_multiple"], "10");
    }
}
