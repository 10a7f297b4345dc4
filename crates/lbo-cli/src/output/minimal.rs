use serde_json::Value;

/// Print just the headline answer.
///
/// For a model envelope that means the IRR and MOIC; for anything else the
/// first recognised metric, falling back to the first field.
pub fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Some(Value::Object(returns)) = result.get("returns") {
        if let (Some(irr), Some(moic)) = (returns.get("irr"), returns.get("moic")) {
            println!("irr: {}", scalar(irr));
            println!("moic: {}", scalar(moic));
            return;
        }
    }

    let priority_keys = ["irr", "moic", "equity_contribution", "ending_balance"];

    if let Value::Object(map) = result {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", scalar(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, scalar(val));
            return;
        }
    }

    println!("{}", scalar(result));
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
