use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use lbo_core::assumptions::ModelAssumptions;
use lbo_core::calculate_model;

use crate::input;

/// Arguments for the full LBO model
#[derive(Args)]
pub struct ModelArgs {
    /// Path to a JSON or YAML assumptions file (flags apply on top)
    #[arg(long)]
    pub input: Option<String>,

    /// LTM EBITDA of the target
    #[arg(long)]
    pub ltm_ebitda: Option<Decimal>,

    /// Entry EV/EBITDA multiple
    #[arg(long)]
    pub ev_multiple: Option<Decimal>,

    /// Exit EV/EBITDA multiple
    #[arg(long)]
    pub exit_multiple: Option<Decimal>,

    /// Exit year (clamped to the projection horizon)
    #[arg(long)]
    pub exit_year: Option<usize>,

    /// Projection horizon in years (clamped to 5..=10)
    #[arg(long)]
    pub years: Option<usize>,
}

pub fn run_model(args: ModelArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut assumptions: ModelAssumptions = if let Some(ref path) = args.input {
        input::file::read_document(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        ModelAssumptions::default()
    };

    if let Some(ltm_ebitda) = args.ltm_ebitda {
        assumptions.transaction.ltm_ebitda = ltm_ebitda;
    }
    if let Some(ev_multiple) = args.ev_multiple {
        assumptions.transaction.ev_multiple = ev_multiple;
    }
    if let Some(exit_multiple) = args.exit_multiple {
        assumptions.exit.exit_multiple = exit_multiple;
    }
    if let Some(exit_year) = args.exit_year {
        assumptions.exit.exit_year = exit_year;
    }
    if let Some(years) = args.years {
        assumptions.set_projection_years(years);
    }

    let result = calculate_model(assumptions)?;
    Ok(serde_json::to_value(result)?)
}
