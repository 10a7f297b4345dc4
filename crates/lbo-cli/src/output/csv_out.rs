use serde_json::Value;
use std::io;

/// Write the output as CSV to stdout.
///
/// A model envelope becomes one section per statement, separated by blank
/// rows; anything else becomes a two-column field/value listing.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut writer = csv::Writer::from_writer(stdout.lock());

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result {
        Value::Object(model) if model.contains_key("sources_uses") => {
            if let Some(Value::Object(statement)) = model.get("income_statement") {
                if let Some(Value::Array(projections)) = statement.get("projections") {
                    write_section(&mut writer, "income_statement", projections);
                }
            }
            if let Some(Value::Object(schedule)) = model.get("debt_schedule") {
                if let Some(Value::Array(totals)) = schedule.get("totals_by_year") {
                    write_section(&mut writer, "debt_schedule_totals", totals);
                }
            }
            if let Some(Value::Object(cash_flow)) = model.get("cash_flow") {
                if let Some(Value::Array(years)) = cash_flow.get("years") {
                    write_section(&mut writer, "cash_flow", years);
                }
            }
            if let Some(Value::Array(ratios)) = model.get("credit_ratios") {
                write_section(&mut writer, "credit_ratios", ratios);
            }
            if let Some(Value::Object(returns)) = model.get("returns") {
                let _ = writer.write_record(["section", "field", "value"]);
                for (key, val) in returns {
                    if val.is_object() || val.is_array() {
                        continue;
                    }
                    let _ = writer.write_record(["returns", key.as_str(), &scalar(val)]);
                }
            }
        }
        Value::Object(map) => {
            let _ = writer.write_record(["field", "value"]);
            for (key, val) in map {
                let _ = writer.write_record([key.as_str(), &scalar(val)]);
            }
        }
        Value::Array(rows) => {
            write_rows(&mut writer, rows);
        }
        other => {
            let _ = writer.write_record([&scalar(other)]);
        }
    }

    let _ = writer.flush();
}

fn write_section(writer: &mut csv::Writer<io::StdoutLock<'_>>, name: &str, rows: &[Value]) {
    let _ = writer.write_record([name]);
    write_rows(writer, rows);
    let _ = writer.write_record([""]);
}

fn write_rows(writer: &mut csv::Writer<io::StdoutLock<'_>>, rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        for row in rows {
            let _ = writer.write_record([&scalar(row)]);
        }
        return;
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = writer.write_record(&headers);

    for row in rows {
        if let Value::Object(map) = row {
            let record: Vec<String> = headers
                .iter()
                .map(|header| map.get(*header).map(scalar).unwrap_or_default())
                .collect();
            let _ = writer.write_record(&record);
        }
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
