use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::display_value;

const SCHEDULE_COLUMNS: [&str; 6] = [
    "period",
    "start_balance",
    "interest",
    "payment",
    "principal_paid",
    "end_balance",
];

/// Render the solved summary as one table and the amortization schedule as
/// another, followed by any warnings and the methodology line.
pub fn print_table(value: &Value) {
    let Some(envelope) = value.as_object() else {
        println!("{}", value);
        return;
    };

    let result = envelope.get("result").and_then(Value::as_object);

    if let Some(result) = result {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in result {
            // The schedule and its labels get their own table below
            if key == "schedule" || key == "period_labels" {
                continue;
            }
            builder.push_record([key.as_str(), &display_value(val)]);
        }
        println!("{}", Table::from(builder));

        if let Some(schedule) = result.get("schedule").and_then(Value::as_array) {
            if !schedule.is_empty() {
                println!();
                print_schedule_table(schedule, result.get("period_labels"));
            }
        }
    } else {
        println!("{}", value);
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

fn print_schedule_table(schedule: &[Value], labels: Option<&Value>) {
    let labels = labels.and_then(Value::as_array);

    let mut builder = Builder::default();
    let mut headers = vec!["label"];
    headers.extend(SCHEDULE_COLUMNS);
    builder.push_record(headers);

    for (i, row) in schedule.iter().enumerate() {
        let Some(row) = row.as_object() else { continue };
        let label = labels
            .and_then(|l| l.get(i))
            .map(display_value)
            .unwrap_or_default();

        let mut record = vec![label];
        for column in SCHEDULE_COLUMNS {
            record.push(row.get(column).map(display_value).unwrap_or_default());
        }
        builder.push_record(record);
    }

    println!("{}", Table::from(builder));
}
