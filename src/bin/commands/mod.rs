pub mod config;
pub mod geolocation;
pub mod registry;
pub mod reputation;
pub mod vendor;

use json_to_table::json_to_table;
use netsleuth::lens::utils::{record_fields, records_to_psv};
use netsleuth::{LookupResult, OutputFormat};
use serde::Serialize;
use serde_json::json;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct FieldRow {
    field: String,
    value: String,
}

/// Print a lookup result in the requested format
pub(crate) fn print_result<R: Serialize>(result: &LookupResult<R>, output_format: OutputFormat) {
    if let LookupResult::Single(None) = result {
        eprintln!("no data returned for the requested identifier");
        return;
    }
    let records = result.records();

    match output_format {
        OutputFormat::Table => {
            for record in records {
                let value = json!(record);
                let mut table = json_to_table(&value);
                table.collapse();
                println!("{}", table);
            }
        }
        OutputFormat::Markdown => {
            for record in records {
                let rows: Vec<FieldRow> = record_fields(record)
                    .into_iter()
                    .map(|(field, value)| FieldRow { field, value })
                    .collect();
                println!("{}\n", Table::new(rows).with(Style::markdown()));
            }
        }
        OutputFormat::Json => match serde_json::to_string(result) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("ERROR: Failed to serialize to JSON: {}", e),
        },
        OutputFormat::JsonPretty => match serde_json::to_string_pretty(result) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("ERROR: Failed to serialize to JSON: {}", e),
        },
        OutputFormat::JsonLine => {
            for record in records {
                match serde_json::to_string(record) {
                    Ok(json) => println!("{}", json),
                    Err(e) => eprintln!("ERROR: Failed to serialize to JSON: {}", e),
                }
            }
        }
        OutputFormat::Psv => {
            if !records.is_empty() {
                println!("{}", records_to_psv(records));
            }
        }
    }
}
