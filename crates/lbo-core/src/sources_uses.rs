use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::assumptions::ModelAssumptions;
use crate::model::Model;
use crate::types::*;

/// Sources & Uses of funds at close.
///
/// Degenerate inputs (zero EBITDA, no tranches) produce zero-valued fields,
/// never an error. The only hard floor is equity contribution >= 0.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcesUses {
    /// Labelled source lines: debt tranches, then sponsor and management equity
    pub sources: Vec<(String, Money)>,
    /// Labelled use lines: purchase EV and the two fee items
    pub uses: Vec<(String, Money)>,
    pub purchase_ev: Money,
    pub transaction_fees: Money,
    pub debt_issuance_fees: Money,
    pub total_uses: Money,
    pub total_debt: Money,
    pub equity_contribution: Money,
    pub management_equity: Money,
    pub sponsor_equity: Money,
    pub total_sources: Money,
    /// Debt share of total sources, in percent (0 when sources are 0)
    pub debt_pct: Pct,
    /// Equity share of total sources, in percent
    pub equity_pct: Pct,
}

/// Recompute the Sources & Uses table from the current assumptions.
pub fn calculate(model: &mut Model) {
    model.sources_uses = build(&model.assumptions);
}

pub(crate) fn build(assumptions: &ModelAssumptions) -> SourcesUses {
    let transaction = &assumptions.transaction;
    let ltm_ebitda = transaction.ltm_ebitda;

    let purchase_ev = ltm_ebitda * transaction.ev_multiple;
    let transaction_fees = purchase_ev * pct(transaction.transaction_fees_pct);

    let mut sources: Vec<(String, Money)> = Vec::new();
    let mut total_debt = Decimal::ZERO;
    for tranche in &assumptions.tranches {
        let amount = ltm_ebitda * tranche.multiple;
        sources.push((tranche.name.clone(), amount));
        total_debt += amount;
    }

    let debt_issuance_fees = total_debt * pct(transaction.debt_fees_pct);
    let total_uses = purchase_ev + transaction_fees + debt_issuance_fees;

    let equity_contribution = (total_uses - total_debt).max(Decimal::ZERO);
    let management_equity = equity_contribution * pct(transaction.management_equity_pct);
    let sponsor_equity = equity_contribution - management_equity;
    let total_sources = total_debt + equity_contribution;

    sources.push(("Sponsor Equity".into(), sponsor_equity));
    sources.push(("Management Equity".into(), management_equity));

    let uses = vec![
        ("Purchase Enterprise Value".into(), purchase_ev),
        ("Transaction Fees".into(), transaction_fees),
        ("Debt Issuance Fees".into(), debt_issuance_fees),
    ];

    let (debt_pct, equity_pct) = if total_sources > Decimal::ZERO {
        (
            total_debt / total_sources * Decimal::ONE_HUNDRED,
            equity_contribution / total_sources * Decimal::ONE_HUNDRED,
        )
    } else {
        (Decimal::ZERO, Decimal::ZERO)
    };

    SourcesUses {
        sources,
        uses,
        purchase_ev,
        transaction_fees,
        debt_issuance_fees,
        total_uses,
        total_debt,
        equity_contribution,
        management_equity,
        sponsor_equity,
        total_sources,
        debt_pct,
        equity_pct,
    }
}
