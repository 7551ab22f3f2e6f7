use serde_json::Value;
use std::io;

use super::display_value;

const SCHEDULE_COLUMNS: [&str; 6] = [
    "period",
    "start_balance",
    "interest",
    "payment",
    "principal_paid",
    "end_balance",
];

/// Write the amortization schedule as CSV to stdout; envelopes without a
/// schedule degrade to field/value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .and_then(Value::as_object);

    match result {
        Some(result) => {
            if let Some(schedule) = result.get("schedule").and_then(Value::as_array) {
                if !schedule.is_empty() {
                    write_schedule_csv(&mut wtr, schedule);
                    let _ = wtr.flush();
                    return;
                }
            }

            let _ = wtr.write_record(["field", "value"]);
            for (key, val) in result {
                if key == "schedule" || key == "period_labels" {
                    continue;
                }
                let _ = wtr.write_record([key.as_str(), &display_value(val)]);
            }
        }
        None => {
            let _ = wtr.write_record([&display_value(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_schedule_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, schedule: &[Value]) {
    let _ = wtr.write_record(SCHEDULE_COLUMNS);

    for row in schedule {
        if let Value::Object(map) = row {
            let record: Vec<String> = SCHEDULE_COLUMNS
                .iter()
                .map(|column| map.get(*column).map(display_value).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&record);
        }
    }
}
