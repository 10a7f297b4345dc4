use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cash_flow;
use crate::model::Model;
use crate::types::*;

/// One tranche-year of the debt schedule. Year 0 is the initial draw and
/// carries no amortization or interest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DebtScheduleEntry {
    pub year: usize,
    pub beginning_balance: Money,
    pub scheduled_amortization: Money,
    pub additional_amortization: Money,
    pub total_amortization: Money,
    pub ending_balance: Money,
    pub interest_expense: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrancheSchedule {
    pub name: String,
    /// One entry per year 0..=horizon
    pub schedule: Vec<DebtScheduleEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DebtSchedule {
    pub tranches: Vec<TrancheSchedule>,
    /// Aggregated across tranches, year 0 = total debt raised
    pub totals_by_year: Vec<DebtScheduleEntry>,
}

/// Scheduled pass: roll every tranche forward on contractual amortization
/// alone, with the ending balance floored at zero.
///
/// Side effect: each tranche-year's interest is accumulated into the income
/// statement's projection years, which the full projection pass seeds at
/// zero. The statement must therefore be rebuilt before every scheduled
/// pass, or interest double-counts.
pub fn calculate_scheduled(model: &mut Model) {
    let Model {
        assumptions,
        income_statement,
        sources_uses,
        debt_schedule,
        ..
    } = model;

    let years = assumptions.projections.len();
    let mut tranches: Vec<TrancheSchedule> = Vec::with_capacity(assumptions.debt_assumptions.len());
    let mut totals_by_year: Vec<DebtScheduleEntry> = (0..=years)
        .map(|year| DebtScheduleEntry {
            year,
            ..Default::default()
        })
        .collect();

    for tranche in &assumptions.debt_assumptions {
        let mut schedule = Vec::with_capacity(years + 1);
        schedule.push(DebtScheduleEntry {
            year: 0,
            beginning_balance: tranche.amount,
            ending_balance: tranche.amount,
            ..Default::default()
        });

        for year in 1..=years {
            let beginning_balance = schedule[year - 1].ending_balance;
            let mut scheduled_amortization = beginning_balance * pct(tranche.amortization_pct);
            let interest_expense = beginning_balance * pct(tranche.interest_rate);

            let mut total_amortization = scheduled_amortization;
            let mut ending_balance = beginning_balance - total_amortization;
            if ending_balance < Decimal::ZERO {
                ending_balance = Decimal::ZERO;
                total_amortization = beginning_balance;
                scheduled_amortization = total_amortization;
            }

            income_statement.projections[year - 1].interest_expense += interest_expense;

            let totals = &mut totals_by_year[year];
            totals.beginning_balance += beginning_balance;
            totals.scheduled_amortization += scheduled_amortization;
            totals.total_amortization += total_amortization;
            totals.ending_balance += ending_balance;
            totals.interest_expense += interest_expense;

            schedule.push(DebtScheduleEntry {
                year,
                beginning_balance,
                scheduled_amortization,
                additional_amortization: Decimal::ZERO,
                total_amortization,
                ending_balance,
                interest_expense,
            });
        }

        tranches.push(TrancheSchedule {
            name: tranche.name.clone(),
            schedule,
        });
    }

    totals_by_year[0].beginning_balance = sources_uses.total_debt;
    totals_by_year[0].ending_balance = sources_uses.total_debt;

    debt_schedule.tranches = tranches;
    debt_schedule.totals_by_year = totals_by_year;
}

/// Cash-flow-sweep waterfall: allocate each year's surplus cash to
/// additional principal paydown, tranche by tranche in seniority order.
///
/// The cash-flow statement is rebuilt from the scheduled-pass figures first,
/// so the sweep always sees fresh `available_for_sweep` values. A tranche
/// never receives more than its remaining unscheduled principal; whatever a
/// senior tranche leaves on the table falls through to the next tranche in
/// the same year. Paying down a balance invalidates the following year's
/// scheduled figures, which are re-derived as the sweep walks forward.
pub fn apply_cash_sweep(model: &mut Model) {
    cash_flow::calculate(model);

    let Model {
        assumptions,
        income_statement,
        cash_flow,
        debt_schedule,
        ..
    } = model;

    let years = assumptions.projections.len();

    for year_index in 0..years {
        let mut remaining = cash_flow.years[year_index].available_for_sweep;
        if remaining <= Decimal::ZERO {
            continue;
        }

        for (tranche_index, tranche) in assumptions.debt_assumptions.iter().enumerate() {
            let schedule = &mut debt_schedule.tranches[tranche_index].schedule;
            let entry = &schedule[year_index + 1];
            let beginning_balance = entry.beginning_balance;
            let scheduled_amortization = entry.scheduled_amortization;

            // Cannot sweep past the principal left after scheduled payments
            let cap = beginning_balance - scheduled_amortization;
            let allocation = (remaining * pct(tranche.cash_flow_sweep_pct)).min(cap);

            let entry = &mut schedule[year_index + 1];
            entry.additional_amortization = allocation;
            entry.total_amortization = scheduled_amortization + allocation;
            entry.ending_balance = beginning_balance - entry.total_amortization;
            let ending_balance = entry.ending_balance;

            // The next year's scheduled figures were derived from the
            // pre-sweep balance and are now stale
            if year_index + 2 <= years {
                let next = &mut schedule[year_index + 2];
                next.beginning_balance = ending_balance;
                next.scheduled_amortization = ending_balance * pct(tranche.amortization_pct);
                next.interest_expense = ending_balance * pct(tranche.interest_rate);
            }

            remaining -= allocation;
            if remaining <= Decimal::ZERO {
                break;
            }
        }
    }

    // Totals are recomputed from the final per-tranche schedules rather
    // than patched incrementally
    let mut totals_by_year: Vec<DebtScheduleEntry> = (0..=years)
        .map(|year| DebtScheduleEntry {
            year,
            ..Default::default()
        })
        .collect();
    for tranche in &debt_schedule.tranches {
        for (year, entry) in tranche.schedule.iter().enumerate() {
            let totals = &mut totals_by_year[year];
            totals.beginning_balance += entry.beginning_balance;
            totals.scheduled_amortization += entry.scheduled_amortization;
            totals.additional_amortization += entry.additional_amortization;
            totals.total_amortization += entry.total_amortization;
            totals.ending_balance += entry.ending_balance;
            totals.interest_expense += entry.interest_expense;
        }
    }

    for year in 1..=years {
        income_statement.projections[year - 1].interest_expense =
            totals_by_year[year].interest_expense;
    }

    for year_index in 0..years {
        let additional = totals_by_year[year_index + 1].additional_amortization;
        let flow = &mut cash_flow.years[year_index];
        flow.additional_amortization = additional;
        flow.fcf_to_equity = flow.available_for_sweep - additional;
    }

    debt_schedule.totals_by_year = totals_by_year;
}
