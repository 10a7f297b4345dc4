use serde_json::Value;
use tabled::{builder::Builder, Table};

/// Render the model envelope as a set of tables, one per statement.
/// Anything that is not a model envelope falls back to a flat field/value
/// table.
pub fn print_table(value: &Value) {
    let envelope = match value.as_object() {
        Some(map) => map,
        None => {
            println!("{}", value);
            return;
        }
    };

    match envelope.get("result") {
        Some(Value::Object(result)) if result.contains_key("sources_uses") => {
            print_model_tables(result);
        }
        Some(result) => print_flat(result),
        None => print_flat(value),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for warning in warnings {
                if let Value::String(s) = warning {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(methodology)) = envelope.get("methodology") {
        println!("\nMethodology: {}", methodology);
    }
}

fn print_model_tables(model: &serde_json::Map<String, Value>) {
    if let Some(Value::Object(su)) = model.get("sources_uses") {
        println!("Sources & Uses");
        let mut builder = Builder::default();
        builder.push_record(["Line", "Amount"]);
        for key in ["sources", "uses"] {
            if let Some(Value::Array(lines)) = su.get(key) {
                for line in lines {
                    if let Value::Array(pair) = line {
                        if let (Some(name), Some(amount)) = (pair.first(), pair.get(1)) {
                            builder.push_record([&scalar(name), &scalar(amount)]);
                        }
                    }
                }
            }
        }
        println!("{}", Table::from(builder));
    }

    if let Some(Value::Object(statement)) = model.get("income_statement") {
        if let Some(Value::Array(projections)) = statement.get("projections") {
            println!("\nIncome Statement");
            print_year_rows(
                projections,
                &["year", "revenue", "ebitda", "interest_expense", "net_income"],
            );
        }
    }

    if let Some(Value::Object(schedule)) = model.get("debt_schedule") {
        if let Some(Value::Array(totals)) = schedule.get("totals_by_year") {
            println!("\nDebt Schedule (totals)");
            print_year_rows(
                totals,
                &[
                    "year",
                    "beginning_balance",
                    "total_amortization",
                    "ending_balance",
                    "interest_expense",
                ],
            );
        }
    }

    if let Some(Value::Object(cash_flow)) = model.get("cash_flow") {
        if let Some(Value::Array(years)) = cash_flow.get("years") {
            println!("\nCash Flow");
            print_year_rows(
                years,
                &[
                    "year",
                    "fcf_before_debt",
                    "available_for_sweep",
                    "additional_amortization",
                    "fcf_to_equity",
                ],
            );
        }
    }

    if let Some(Value::Object(returns)) = model.get("returns") {
        println!("\nReturns");
        let mut builder = Builder::default();
        builder.push_record(["Metric", "Value"]);
        for key in [
            "initial_equity",
            "exit_equity",
            "moic",
            "irr",
            "cash_flow_attribution",
            "exit_value_attribution",
        ] {
            if let Some(value) = returns.get(key) {
                builder.push_record([key, &scalar(value)]);
            }
        }
        println!("{}", Table::from(builder));
    }
}

fn print_year_rows(rows: &[Value], columns: &[&str]) {
    let mut builder = Builder::default();
    builder.push_record(columns.iter().copied());
    for row in rows {
        if let Value::Object(map) = row {
            let record: Vec<String> = columns
                .iter()
                .map(|column| map.get(*column).map(scalar).unwrap_or_default())
                .collect();
            builder.push_record(record);
        }
    }
    println!("{}", Table::from(builder));
}

fn print_flat(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &scalar(val)]);
        }
        println!("{}", Table::from(builder));
    } else {
        println!("{}", value);
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
