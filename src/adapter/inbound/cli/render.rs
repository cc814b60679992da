//! Rendering of retrieved records.

use serde_json::json;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::adapter::inbound::cli::output;
use crate::application::{Answer, Retrieval};
use crate::domain::{ResultRecord, StoredResult};

/// Rows shown in human-readable mode before the table is cut short.
const MAX_TABLE_ROWS: usize = 24;

/// Print the outcome of a retrieval.
pub fn answer(answer: &Answer) {
    match answer {
        Answer::Data(retrieval) => data(retrieval),
        Answer::NoData { message } => no_data(message),
    }
}

/// Print a `{"message": ...}` answer.
pub fn no_data(message: &str) {
    if output::is_json() {
        output::json_output(json!({ "message": message }));
        return;
    }
    output::warning(message);
}

fn data(retrieval: &Retrieval) {
    if output::is_json() {
        output::json_output(json!({
            "source": retrieval.source,
            "key": retrieval.key,
            "task_id": retrieval.task_id,
            "location": retrieval.record.location,
            "columns": retrieval.record.columns,
            "rows": retrieval.record.to_json_rows(),
        }));
        return;
    }

    output::section("NDVI series");
    output::field("Source", output::highlight(retrieval.source));
    output::field("Key", output::muted(&retrieval.key));
    if let Some(task_id) = &retrieval.task_id {
        output::field("Task", task_id);
    }
    records(&retrieval.record);
}

/// Print a result found in the fallback store.
pub fn stored(result: &StoredResult, distance_km: f64) {
    if output::is_json() {
        output::json_output(json!({
            "source": "store",
            "key": result.key,
            "distance_km": distance_km,
            "date_start": result.date_start,
            "date_end": result.date_end,
            "location": result.location,
            "columns": result.record.columns,
            "rows": result.record.to_json_rows(),
        }));
        return;
    }

    output::section("Stored result");
    output::field("Key", output::muted(&result.key));
    output::field("Distance", format!("{distance_km:.2} km"));
    output::field("Covers", format!("{} to {}", result.date_start, result.date_end));
    records(&result.record);
}

fn records(record: &ResultRecord) {
    output::field("Location", record.location.coordinate());
    output::field("Rows", record.len());
    if output::is_quiet() {
        return;
    }

    println!();
    output::lines(&table(record, MAX_TABLE_ROWS));
    if record.len() > MAX_TABLE_ROWS {
        output::note(&format!(
            "{} more rows (use --json for the full series)",
            record.len() - MAX_TABLE_ROWS
        ));
    }
}

/// Render up to `limit` rows of `record` as a table.
#[must_use]
pub fn table(record: &ResultRecord, limit: usize) -> String {
    let mut builder = Builder::default();
    builder.push_record(record.columns.iter().cloned());
    for row in record.rows.iter().take(limit) {
        builder.push_record(row.iter().cloned());
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}
