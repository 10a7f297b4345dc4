use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LboError;
use crate::types::*;
use crate::LboResult;

/// Projection horizon bounds. Out-of-range requests clamp to this window.
pub const MIN_PROJECTION_YEARS: usize = 5;
pub const MAX_PROJECTION_YEARS: usize = 10;

/// Transaction-level entry assumptions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionAssumptions {
    /// LTM EBITDA of the target, in the model's currency unit
    pub ltm_ebitda: Money,
    /// EV/EBITDA entry multiple
    pub ev_multiple: Multiple,
    /// Transaction advisory fees as % of enterprise value
    pub transaction_fees_pct: Pct,
    /// Debt issuance fees as % of total debt raised
    pub debt_fees_pct: Pct,
    /// Management share of the equity contribution
    pub management_equity_pct: Pct,
}

impl Default for TransactionAssumptions {
    fn default() -> Self {
        Self {
            ltm_ebitda: dec!(100),
            ev_multiple: dec!(10),
            transaction_fees_pct: dec!(2),
            debt_fees_pct: dec!(3),
            management_equity_pct: dec!(10),
        }
    }
}

/// A debt tranche sized as a multiple of LTM EBITDA. List order defines
/// sweep seniority: earlier tranches are senior and swept first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtTranche {
    pub name: String,
    pub multiple: Multiple,
}

/// Per-tranche servicing assumptions, derived from the tranche list.
/// Re-populating overwrites custom rates with defaults unless boundary
/// overrides are applied again afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtAssumption {
    pub name: String,
    /// Dollar amount drawn at close (LTM EBITDA x tranche multiple)
    pub amount: Money,
    /// Scheduled amortization, % of beginning balance per year
    pub amortization_pct: Pct,
    /// Cash interest, % of beginning balance per year
    pub interest_rate: Pct,
    /// Share of surplus cash offered to this tranche in the sweep waterfall
    pub cash_flow_sweep_pct: Pct,
}

/// Boundary override of a tranche's servicing rates, matched by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtAssumptionOverride {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amortization_pct: Option<Pct>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest_rate: Option<Pct>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cash_flow_sweep_pct: Option<Pct>,
}

/// Historical (pre-transaction) operating drivers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoricalDrivers {
    pub revenue: Money,
    pub cogs_pct: Pct,
    pub sga_pct: Pct,
    pub da_pct: Pct,
    pub tax_rate: Pct,
}

impl Default for HistoricalDrivers {
    fn default() -> Self {
        Self {
            revenue: dec!(500),
            cogs_pct: dec!(60),
            sga_pct: dec!(20),
            da_pct: dec!(3),
            tax_rate: dec!(25),
        }
    }
}

/// Operating drivers for a single projection year
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionDrivers {
    pub revenue_growth_pct: Pct,
    pub cogs_pct: Pct,
    pub sga_pct: Pct,
    pub da_pct: Pct,
    pub tax_rate: Pct,
}

impl Default for ProjectionDrivers {
    fn default() -> Self {
        Self {
            revenue_growth_pct: dec!(5),
            cogs_pct: dec!(60),
            sga_pct: dec!(20),
            da_pct: dec!(3),
            tax_rate: dec!(25),
        }
    }
}

/// Per-year cash-flow drivers. Vectors run parallel to the projection years.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CashFlowDrivers {
    /// NWC change as % of the year's revenue change
    pub nwc_pcts: Vec<Pct>,
    /// Capital expenditure as % of the year's revenue
    pub capex_pcts: Vec<Pct>,
}

/// Exit assumptions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExitAssumptions {
    /// Exit year, clamped to the projection horizon
    pub exit_year: usize,
    /// Exit EV/EBITDA multiple
    pub exit_multiple: Multiple,
}

impl Default for ExitAssumptions {
    fn default() -> Self {
        Self {
            exit_year: 5,
            exit_multiple: dec!(8.0),
        }
    }
}

/// Sweep ranges for the sensitivity analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensitivityRanges {
    pub entry_multiples: Vec<Multiple>,
    pub exit_multiples: Vec<Multiple>,
    pub growth_rates: Vec<Pct>,
}

impl Default for SensitivityRanges {
    fn default() -> Self {
        Self {
            entry_multiples: vec![dec!(8), dec!(9), dec!(10), dec!(11), dec!(12)],
            exit_multiples: vec![dec!(6), dec!(7), dec!(8), dec!(9), dec!(10)],
            growth_rates: vec![dec!(3), dec!(4), dec!(5), dec!(6), dec!(7)],
        }
    }
}

fn default_tranches() -> Vec<DebtTranche> {
    vec![
        DebtTranche {
            name: "Senior Debt".into(),
            multiple: dec!(2.0),
        },
        DebtTranche {
            name: "Subordinated Debt".into(),
            multiple: dec!(1.0),
        },
    ]
}

/// The assumptions store: the single mutable source of truth for a model run.
///
/// Every field has a documented default so partial input documents
/// deserialize into a complete structure; [`ModelAssumptions::normalize`]
/// then clamps the horizon and exit year and resizes the per-year vectors,
/// so the engine never observes a missing value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelAssumptions {
    pub transaction: TransactionAssumptions,
    #[serde(default = "default_tranches")]
    pub tranches: Vec<DebtTranche>,
    /// Derived from `tranches` by [`ModelAssumptions::populate_debt_assumptions`]
    pub debt_assumptions: Vec<DebtAssumption>,
    /// Boundary overrides re-applied after every population
    pub debt_overrides: Vec<DebtAssumptionOverride>,
    pub historical: HistoricalDrivers,
    pub projections: Vec<ProjectionDrivers>,
    pub cash_flow: CashFlowDrivers,
    pub exit: ExitAssumptions,
    pub sensitivity: SensitivityRanges,
}

impl Default for ModelAssumptions {
    fn default() -> Self {
        let mut assumptions = Self {
            transaction: TransactionAssumptions::default(),
            tranches: default_tranches(),
            debt_assumptions: Vec::new(),
            debt_overrides: Vec::new(),
            historical: HistoricalDrivers::default(),
            projections: Vec::new(),
            cash_flow: CashFlowDrivers::default(),
            exit: ExitAssumptions::default(),
            sensitivity: SensitivityRanges::default(),
        };
        assumptions.set_projection_years(MIN_PROJECTION_YEARS);
        assumptions
    }
}

impl ModelAssumptions {
    /// Current projection horizon in years.
    pub fn projection_years(&self) -> usize {
        self.projections.len()
    }

    /// Resize the projection horizon, clamping to [5, 10]. New years get
    /// default drivers; truncation drops the tail. Returns the horizon
    /// actually set.
    pub fn set_projection_years(&mut self, years: usize) -> usize {
        let years = years.clamp(MIN_PROJECTION_YEARS, MAX_PROJECTION_YEARS);

        self.projections.truncate(years);
        while self.projections.len() < years {
            self.projections.push(ProjectionDrivers::default());
        }

        self.cash_flow.nwc_pcts.truncate(years);
        while self.cash_flow.nwc_pcts.len() < years {
            self.cash_flow.nwc_pcts.push(dec!(0));
        }
        self.cash_flow.capex_pcts.truncate(years);
        while self.cash_flow.capex_pcts.len() < years {
            self.cash_flow.capex_pcts.push(dec!(3));
        }

        years
    }

    /// Clamp the horizon and exit year and resize the per-year vectors so
    /// that downstream stages can index without bounds checks.
    pub fn normalize(&mut self) {
        let years = self.set_projection_years(self.projections.len());
        self.exit.exit_year = self.exit.exit_year.clamp(1, years);
    }

    /// Re-derive the per-tranche servicing assumptions from the current
    /// tranche list. Amounts come from LTM EBITDA x tranche multiple; rates
    /// reset to the defaults (5% amortization, 6% interest, 50% sweep).
    pub fn populate_debt_assumptions(&mut self) {
        let ltm_ebitda = self.transaction.ltm_ebitda;
        self.debt_assumptions = self
            .tranches
            .iter()
            .map(|tranche| DebtAssumption {
                name: tranche.name.clone(),
                amount: ltm_ebitda * tranche.multiple,
                amortization_pct: dec!(5),
                interest_rate: dec!(6),
                cash_flow_sweep_pct: dec!(50),
            })
            .collect();
    }

    /// Apply boundary overrides on top of the freshly populated debt
    /// assumptions, matched by tranche name.
    pub fn apply_debt_overrides(&mut self) -> LboResult<()> {
        for i in 0..self.debt_overrides.len() {
            let name = self.debt_overrides[i].name.clone();
            let Some(assumption) = self
                .debt_assumptions
                .iter_mut()
                .find(|a| a.name == name)
            else {
                return Err(LboError::InvalidInput {
                    field: format!("debt_overrides[{i}]"),
                    reason: format!("No debt tranche named '{name}'"),
                });
            };
            let over = &self.debt_overrides[i];
            if let Some(amort) = over.amortization_pct {
                assumption.amortization_pct = amort;
            }
            if let Some(rate) = over.interest_rate {
                assumption.interest_rate = rate;
            }
            if let Some(sweep) = over.cash_flow_sweep_pct {
                assumption.cash_flow_sweep_pct = sweep;
            }
        }
        Ok(())
    }
}
