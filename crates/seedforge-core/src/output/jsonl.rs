//! JSON Lines exporter: one record per line with a `_table` discriminator,
//! tables in generation order.

use std::io::Write;

use crate::error::{Result, SeedForgeError};
use crate::generate::Dataset;

pub fn write_jsonl<W: Write>(writer: &mut W, dataset: &Dataset) -> Result<()> {
    for table in dataset.tables.values() {
        for row in &table.rows {
            let mut object = serde_json::Map::with_capacity(row.len() + 1);
            object.insert(
                "_table".to_string(),
                serde_json::Value::String(table.name.clone()),
            );
            for (name, value) in row {
                object.insert(name.clone(), value.to_json());
            }
            let line = serde_json::to_string(&serde_json::Value::Object(object)).map_err(|e| {
                SeedForgeError::ConfigInvalid {
                    message: format!("JSON serialization error: {}", e),
                }
            })?;
            writeln!(writer, "{}", line).map_err(|e| SeedForgeError::Output {
                message: "writing JSON Lines".to_string(),
                source: e,
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{Record, TableData, Value};
    use crate::personas::Locale;
    use indexmap::IndexMap;

    #[test]
    fn test_one_line_per_record_with_discriminator() {
        let mut a = Record::new();
        a.insert("id".to_string(), Value::Int(1));
        let mut b = Record::new();
        b.insert("id".to_string(), Value::Int(2));

        let mut tables = IndexMap::new();
        tables.insert(
            "users".to_string(),
            TableData {
                name: "users".to_string(),
                rows: vec![a, b],
            },
        );
        let dataset = Dataset {
            tables,
            seed: 0,
            locale: Locale::EnUs,
            validation: None,
        };

        let mut out = Vec::new();
        write_jsonl(&mut out, &dataset).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let parsed: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(parsed["_table"], "users");
            assert!(parsed["id"].is_i64());
        }
    }
}
