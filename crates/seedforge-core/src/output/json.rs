//! JSON exporter and importer.
//!
//! Shape: `{ "metadata": { ... }, "tables": { "<name>": [ records ] } }`,
//! pretty-printed by default. The writer streams table by table instead of
//! building one serde tree for the whole dataset; keys are escaped through
//! serde_json so the output is RFC 8259 compliant. The importer reverses the
//! mapping for round-trips and for validating previously exported data.

use std::io::Write;

use indexmap::IndexMap;

use crate::error::{Result, SeedForgeError};
use crate::generate::{Dataset, Record, TableData, Value};
use crate::personas::Locale;

pub fn write_json<W: Write>(writer: &mut W, dataset: &Dataset) -> Result<()> {
    write_str(writer, "{\n")?;

    write_str(writer, "  \"metadata\": {\n")?;
    write_str(writer, &format!("    \"seed\": {},\n", dataset.seed))?;
    write_str(
        writer,
        &format!("    \"locale\": {},\n", json_key(&dataset.locale.to_string())?),
    )?;
    write_str(
        writer,
        &format!("    \"tables\": {},\n", dataset.tables.len()),
    )?;
    write_str(
        writer,
        &format!("    \"rows\": {}\n", dataset.total_rows()),
    )?;
    write_str(writer, "  },\n")?;

    write_str(writer, "  \"tables\": {\n")?;
    let table_count = dataset.tables.len();
    for (table_index, table) in dataset.tables.values().enumerate() {
        write_str(writer, &format!("    {}: [\n", json_key(&table.name)?))?;
        for (row_index, row) in table.rows.iter().enumerate() {
            write_str(writer, "      {")?;
            let column_count = row.len();
            for (col_index, (name, value)) in row.iter().enumerate() {
                write_str(
                    writer,
                    &format!("\n        {}: {}", json_key(name)?, json_value(value)?),
                )?;
                if col_index < column_count - 1 {
                    write_str(writer, ",")?;
                }
            }
            write_str(writer, "\n      }")?;
            if row_index < table.rows.len() - 1 {
                write_str(writer, ",")?;
            }
            write_str(writer, "\n")?;
        }
        write_str(writer, "    ]")?;
        if table_index < table_count - 1 {
            write_str(writer, ",")?;
        }
        write_str(writer, "\n")?;
    }
    write_str(writer, "  }\n}\n")?;

    Ok(())
}

/// Parse a previously exported JSON document back into a dataset.
pub fn read_json(input: &str) -> Result<Dataset> {
    let doc: serde_json::Value =
        serde_json::from_str(input).map_err(|e| SeedForgeError::ConfigInvalid {
            message: format!("dataset JSON parse error: {}", e),
        })?;

    let seed = doc
        .pointer("/metadata/seed")
        .and_then(|v| v.as_u64())
        .unwrap_or(0);
    let locale = doc
        .pointer("/metadata/locale")
        .and_then(|v| v.as_str())
        .map(Locale::parse)
        .unwrap_or_default();

    let mut tables = IndexMap::new();
    let table_map = doc
        .get("tables")
        .and_then(|t| t.as_object())
        .ok_or_else(|| SeedForgeError::ConfigInvalid {
            message: "dataset JSON has no 'tables' object".to_string(),
        })?;

    for (name, rows_json) in table_map {
        let mut rows = Vec::new();
        for row_json in rows_json.as_array().into_iter().flatten() {
            let mut record = Record::new();
            if let Some(object) = row_json.as_object() {
                for (column, value) in object {
                    record.insert(column.clone(), Value::from_json(value));
                }
            }
            rows.push(record);
        }
        tables.insert(
            name.clone(),
            TableData {
                name: name.clone(),
                rows,
            },
        );
    }

    Ok(Dataset {
        tables,
        seed,
        locale,
        validation: None,
    })
}

fn write_str<W: Write>(writer: &mut W, s: &str) -> Result<()> {
    writer
        .write_all(s.as_bytes())
        .map_err(|e| SeedForgeError::Output {
            message: "writing JSON".to_string(),
            source: e,
        })
}

/// RFC 8259-compliant key escaping via serde_json (Rust's `{:?}` does not
/// escape unicode control characters per the JSON spec).
fn json_key(s: &str) -> Result<String> {
    serde_json::to_string(s).map_err(|e| SeedForgeError::ConfigInvalid {
        message: format!("JSON key error: {}", e),
    })
}

fn json_value(value: &Value) -> Result<String> {
    serde_json::to_string(&value.to_json()).map_err(|e| SeedForgeError::ConfigInvalid {
        message: format!("JSON serialization error: {}", e),
    })
}
