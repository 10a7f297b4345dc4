use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use lbo_core::returns;

/// Arguments for the standalone IRR solver
#[derive(Args)]
pub struct IrrArgs {
    /// Cash flows in time order (comma-separated, e.g. "-100,30,30,130")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub cash_flows: Vec<Decimal>,
}

pub fn run_irr(args: IrrArgs) -> Result<Value, Box<dyn std::error::Error>> {
    if args.cash_flows.is_empty() {
        return Err("--cash-flows is required, e.g. --cash-flows=-100,30,30,130".into());
    }

    let irr = returns::internal_rate_of_return(&args.cash_flows);
    let residual = returns::npv(irr / Decimal::ONE_HUNDRED, &args.cash_flows);

    Ok(json!({
        "result": {
            "irr": irr,
            "npv_at_irr": residual,
            "cash_flows": args.cash_flows,
        },
        "methodology": "Newton-Raphson IRR (annual periods, percent units)",
    }))
}
