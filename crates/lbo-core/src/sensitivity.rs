use serde::{Deserialize, Serialize};

use crate::model::Model;
use crate::types::*;
use crate::{debt_schedule, income_statement, returns, sources_uses};

/// Returns under perturbed entry/exit multiples and revenue growth.
///
/// `moic_matrix` and `irr_matrix` are indexed `[entry][exit]`, row order
/// matching `entry_multiples` and column order matching `exit_multiples`.
/// The growth vectors run parallel to `growth_rates`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SensitivityAnalysis {
    pub entry_multiples: Vec<Multiple>,
    pub exit_multiples: Vec<Multiple>,
    pub growth_rates: Vec<Pct>,
    pub moic_matrix: Vec<Vec<Multiple>>,
    pub irr_matrix: Vec<Vec<Pct>>,
    pub growth_moic: Vec<Multiple>,
    pub growth_irr: Vec<Pct>,
}

/// Sweep the model over the configured ranges.
///
/// Every field the sweep perturbs is snapshotted up front and restored
/// afterwards, and the whole pipeline is re-run on the restored assumptions,
/// so a model that has been through sensitivity analysis is numerically
/// indistinguishable from one that has not.
pub fn calculate(model: &mut Model) {
    let ranges = model.assumptions.sensitivity.clone();

    let saved_ev_multiple = model.assumptions.transaction.ev_multiple;
    let saved_exit_multiple = model.assumptions.exit.exit_multiple;
    let saved_growth: Vec<Pct> = model
        .assumptions
        .projections
        .iter()
        .map(|d| d.revenue_growth_pct)
        .collect();
    let saved_debt_assumptions = model.assumptions.debt_assumptions.clone();

    let mut moic_matrix = Vec::with_capacity(ranges.entry_multiples.len());
    let mut irr_matrix = Vec::with_capacity(ranges.entry_multiples.len());

    for &entry_multiple in &ranges.entry_multiples {
        let mut moic_row = Vec::with_capacity(ranges.exit_multiples.len());
        let mut irr_row = Vec::with_capacity(ranges.exit_multiples.len());

        for &exit_multiple in &ranges.exit_multiples {
            model.assumptions.transaction.ev_multiple = entry_multiple;
            model.assumptions.exit.exit_multiple = exit_multiple;

            sources_uses::calculate(model);
            model.assumptions.populate_debt_assumptions();
            income_statement::calculate(model);
            debt_schedule::calculate_scheduled(model);
            debt_schedule::apply_cash_sweep(model);
            returns::calculate(model);

            moic_row.push(model.returns.moic);
            irr_row.push(model.returns.irr);
        }

        moic_matrix.push(moic_row);
        irr_matrix.push(irr_row);
    }

    model.assumptions.transaction.ev_multiple = saved_ev_multiple;
    model.assumptions.exit.exit_multiple = saved_exit_multiple;

    let mut growth_moic = Vec::with_capacity(ranges.growth_rates.len());
    let mut growth_irr = Vec::with_capacity(ranges.growth_rates.len());

    for &growth_rate in &ranges.growth_rates {
        for drivers in &mut model.assumptions.projections {
            drivers.revenue_growth_pct = growth_rate;
        }

        sources_uses::calculate(model);
        model.assumptions.populate_debt_assumptions();
        income_statement::calculate(model);
        debt_schedule::calculate_scheduled(model);
        debt_schedule::apply_cash_sweep(model);
        income_statement::finalize(model);
        returns::calculate(model);

        growth_moic.push(model.returns.moic);
        growth_irr.push(model.returns.irr);
    }

    for (drivers, &growth) in model
        .assumptions
        .projections
        .iter_mut()
        .zip(saved_growth.iter())
    {
        drivers.revenue_growth_pct = growth;
    }
    model.assumptions.debt_assumptions = saved_debt_assumptions;

    // Re-run the pipeline on the restored assumptions so every derived
    // statement reflects the boundary inputs again
    sources_uses::calculate(model);
    income_statement::calculate(model);
    debt_schedule::calculate_scheduled(model);
    debt_schedule::apply_cash_sweep(model);
    income_statement::finalize(model);
    crate::credit_ratios::calculate(model);
    returns::calculate(model);

    model.sensitivity = SensitivityAnalysis {
        entry_multiples: ranges.entry_multiples,
        exit_multiples: ranges.exit_multiples,
        growth_rates: ranges.growth_rates,
        moic_matrix,
        irr_matrix,
        growth_moic,
        growth_irr,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::ModelAssumptions;
    use rust_decimal_macros::dec;

    fn base_model() -> Model {
        let mut model = Model::new(ModelAssumptions::default());
        model.assumptions.normalize();
        sources_uses::calculate(&mut model);
        model.assumptions.populate_debt_assumptions();
        income_statement::calculate(&mut model);
        debt_schedule::calculate_scheduled(&mut model);
        debt_schedule::apply_cash_sweep(&mut model);
        income_statement::finalize(&mut model);
        crate::credit_ratios::calculate(&mut model);
        returns::calculate(&mut model);
        model
    }

    #[test]
    fn test_grid_shape_matches_ranges() {
        let mut model = base_model();
        calculate(&mut model);

        let s = &model.sensitivity;
        assert_eq!(s.moic_matrix.len(), 5);
        assert_eq!(s.irr_matrix.len(), 5);
        for row in &s.moic_matrix {
            assert_eq!(row.len(), 5);
        }
        assert_eq!(s.growth_moic.len(), 5);
        assert_eq!(s.growth_irr.len(), 5);
    }

    #[test]
    fn test_center_cell_matches_base_case() {
        let mut model = base_model();
        let base_moic = model.returns.moic;
        calculate(&mut model);

        // Entry 10x / exit 8x sits at [2][2] of the default ranges
        let diff = (model.sensitivity.moic_matrix[2][2] - base_moic).abs();
        assert!(diff < dec!(0.000000001), "center cell drifted by {diff}");
    }

    #[test]
    fn test_higher_exit_multiple_never_hurts() {
        let mut model = base_model();
        calculate(&mut model);

        for row in &model.sensitivity.moic_matrix {
            for pair in row.windows(2) {
                assert!(pair[1] >= pair[0]);
            }
        }
    }

    #[test]
    fn test_sweep_leaves_model_unchanged() {
        let mut model = base_model();
        let moic_before = model.returns.moic;
        let irr_before = model.returns.irr;
        let equity_before = model.sources_uses.equity_contribution;
        let debt_before = model.debt_schedule.totals_by_year.clone();

        calculate(&mut model);

        assert_eq!(model.assumptions.transaction.ev_multiple, dec!(10));
        assert_eq!(model.assumptions.exit.exit_multiple, dec!(8.0));
        assert_eq!(model.sources_uses.equity_contribution, equity_before);
        assert!((model.returns.moic - moic_before).abs() < dec!(0.000000001));
        assert!((model.returns.irr - irr_before).abs() < dec!(0.000000001));
        for (after, before) in model
            .debt_schedule
            .totals_by_year
            .iter()
            .zip(debt_before.iter())
        {
            assert!((after.ending_balance - before.ending_balance).abs() < dec!(0.000000001));
        }
    }

    #[test]
    fn test_sweep_is_idempotent() {
        let mut model = base_model();
        calculate(&mut model);
        let first = model.sensitivity.clone();
        calculate(&mut model);

        assert_eq!(model.sensitivity.moic_matrix, first.moic_matrix);
        assert_eq!(model.sensitivity.irr_matrix, first.irr_matrix);
        assert_eq!(model.sensitivity.growth_moic, first.growth_moic);
    }

    #[test]
    fn test_faster_growth_never_hurts_moic() {
        let mut model = base_model();
        calculate(&mut model);

        for pair in model.sensitivity.growth_moic.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
    }

    #[test]
    fn test_restore_preserves_debt_overrides() {
        let mut model = Model::new(ModelAssumptions::default());
        model.assumptions.debt_overrides = vec![crate::assumptions::DebtAssumptionOverride {
            name: "Senior Debt".into(),
            amortization_pct: Some(dec!(10)),
            interest_rate: None,
            cash_flow_sweep_pct: None,
        }];
        model.assumptions.normalize();
        sources_uses::calculate(&mut model);
        model.assumptions.populate_debt_assumptions();
        model.assumptions.apply_debt_overrides().unwrap();
        income_statement::calculate(&mut model);
        debt_schedule::calculate_scheduled(&mut model);
        debt_schedule::apply_cash_sweep(&mut model);
        income_statement::finalize(&mut model);
        returns::calculate(&mut model);

        calculate(&mut model);

        // The grid re-populates rates internally; the override must survive
        assert_eq!(model.assumptions.debt_assumptions[0].amortization_pct, dec!(10));
    }

    #[test]
    fn test_matrix_axes_are_recorded() {
        let mut model = base_model();
        calculate(&mut model);

        assert_eq!(
            model.sensitivity.entry_multiples,
            vec![dec!(8), dec!(9), dec!(10), dec!(11), dec!(12)]
        );
        assert_eq!(
            model.sensitivity.exit_multiples,
            vec![dec!(6), dec!(7), dec!(8), dec!(9), dec!(10)]
        );
    }
}
