use serde_json::Value;

use super::display_value;

/// Print just the solved value.
pub fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result {
        if let Some(solved) = map.get("solved_value") {
            if !solved.is_null() {
                println!("{}", display_value(solved));
                return;
            }
        }

        // Fall back to the first field
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, display_value(val));
            return;
        }
    }

    println!("{}", display_value(result));
}
