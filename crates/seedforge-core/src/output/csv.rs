//! CSV exporter: one section per table introduced by a `# <table>` comment
//! line, RFC 4180 quoting throughout.

use std::io::Write;

use crate::error::{Result, SeedForgeError};
use crate::generate::{Dataset, Record};

pub fn write_csv<W: Write>(writer: &mut W, dataset: &Dataset) -> Result<()> {
    for table in dataset.tables.values() {
        write_line(writer, &format!("# {}", table.name))?;
        write_csv_table(writer, &table.name, &table.rows)?;
        write_line(writer, "")?;
    }
    Ok(())
}

/// Write one table's rows (header + data) without the section comment.
pub fn write_csv_table<W: Write>(writer: &mut W, table_name: &str, rows: &[Record]) -> Result<()> {
    let Some(first) = rows.first() else {
        return Ok(());
    };

    let io_err = |e: std::io::Error| SeedForgeError::Output {
        message: format!("writing CSV for {}", table_name),
        source: e,
    };

    let columns: Vec<&String> = first.keys().collect();
    let header = columns
        .iter()
        .map(|c| csv_escape(c))
        .collect::<Vec<_>>()
        .join(",");
    writeln!(writer, "{}", header).map_err(io_err)?;

    for row in rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|col| {
                row.get(*col)
                    .map(|v| csv_escape(&v.to_csv_string()))
                    .unwrap_or_default()
            })
            .collect();
        writeln!(writer, "{}", cells.join(",")).map_err(io_err)?;
    }
    Ok(())
}

/// RFC 4180: quote a field containing comma, quote, or line breaks; double
/// embedded quotes.
fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Minimal RFC 4180 parser for round-trip tests and the import path. Returns
/// rows of cells; handles quoted fields with embedded commas, quotes, and
/// newlines.
pub fn parse_csv(input: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    cell.push('"');
                }
                '"' => in_quotes = false,
                _ => cell.push(c),
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => row.push(std::mem::take(&mut cell)),
                '\r' => {}
                '\n' => {
                    row.push(std::mem::take(&mut cell));
                    rows.push(std::mem::take(&mut row));
                }
                _ => cell.push(c),
            }
        }
    }
    if !cell.is_empty() || !row.is_empty() {
        row.push(cell);
        rows.push(row);
    }
    rows
}

fn write_line<W: Write>(writer: &mut W, line: &str) -> Result<()> {
    writeln!(writer, "{}", line).map_err(|e| SeedForgeError::Output {
        message: "writing CSV".to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{TableData, Value};
    use crate::personas::Locale;
    use indexmap::IndexMap;

    #[test]
    fn test_escape() {
        assert_eq!(csv_escape("hello"), "hello");
        assert_eq!(csv_escape("hello,world"), "\"hello,world\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_escape("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn test_sections_and_headers() {
        let mut row = Record::new();
        row.insert("id".to_string(), Value::Int(1));
        row.insert("name".to_string(), Value::from_string("a,b".to_string()));

        let mut tables = IndexMap::new();
        tables.insert(
            "users".to_string(),
            TableData {
                name: "users".to_string(),
                rows: vec![row],
            },
        );
        let dataset = Dataset {
            tables,
            seed: 0,
            locale: Locale::EnUs,
            validation: None,
        };

        let mut out = Vec::new();
        write_csv(&mut out, &dataset).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("# users\n"));
        assert!(text.contains("id,name\n"));
        assert!(text.contains("1,\"a,b\"\n"));
    }

    #[test]
    fn test_round_trip_survives_edge_case_strings() {
        let adversarial = [
            "", " ", "\n", "\t", "'", "\"", "\\", "NULL", "a,b,c",
            "\"quoted\"", "multi\nline\ncell", "🎉🚀", "数据", "trailing,",
        ];
        for payload in adversarial {
            let escaped = csv_escape(payload);
            let line = format!("{},tail\n", escaped);
            let parsed = parse_csv(&line);
            assert_eq!(parsed.len(), 1, "payload {:?}", payload);
            assert_eq!(parsed[0][0], payload, "payload {:?}", payload);
            assert_eq!(parsed[0][1], "tail");
        }
    }
}
