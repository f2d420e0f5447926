use serde_json::Value;

/// Headline figure of each calculator, in priority order.
const PRIORITY_KEYS: [&str; 9] = [
    "monthly_payment",
    "max_loan_amount",
    "settlement_amount",
    "zakat_due",
    "total_upfront_cash",
    "final_balance",
    "total",
    "months",
    "ceiling_months",
];

/// Print just the headline value from the output.
///
/// Looks for a priority key in the result, then one level down (the vehicle
/// loan nests its amortization; the payoff simulation nests its outcome),
/// then falls back to the first field.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        for key in PRIORITY_KEYS {
            if let Some(val) = find_key(map, key) {
                println!("{}", format_minimal(val));
                return;
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn find_key<'a>(map: &'a serde_json::Map<String, Value>, key: &str) -> Option<&'a Value> {
    if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
        return Some(val);
    }
    map.values()
        .filter_map(Value::as_object)
        .find_map(|nested| nested.get(key).filter(|v| !v.is_null()))
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_headline_found() {
        let result = json!({"down_payment": "20000", "amortization": {"monthly_payment": "1152.38"}});
        let map = result.as_object().unwrap();
        assert_eq!(find_key(map, "monthly_payment"), Some(&json!("1152.38")));
    }

    #[test]
    fn test_null_values_skipped() {
        let result = json!({"total": null});
        assert_eq!(find_key(result.as_object().unwrap(), "total"), None);
    }
}
