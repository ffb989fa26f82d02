//! SQL exporter.
//!
//! One `INSERT INTO <table> (<cols>) VALUES (...);` per row, tables emitted
//! in generation order. Optional `BEGIN;`/`COMMIT;` wrapper and an optional
//! `DELETE FROM` prelude in reverse order so child rows are cleared before
//! their parents. String literals are single-quoted with doubled-quote
//! escaping, bytes are hex, dates ISO-8601 (see `Value::to_sql_literal`).

use std::io::Write;

use crate::error::{Result, SeedForgeError};
use crate::generate::Dataset;

#[derive(Debug, Clone, Copy, Default)]
pub struct SqlOptions {
    /// Wrap the script in `BEGIN; ... COMMIT;`.
    pub transaction: bool,
    /// Emit `DELETE FROM <table>;` for every table, in reverse generation
    /// order, before the inserts.
    pub delete_prelude: bool,
}

pub fn write_sql<W: Write>(writer: &mut W, dataset: &Dataset, options: &SqlOptions) -> Result<()> {
    if options.transaction {
        write_line(writer, "BEGIN;")?;
    }

    if options.delete_prelude {
        for table in dataset.tables.values().rev() {
            write_line(writer, &format!("DELETE FROM {};", table.name))?;
        }
    }

    for table in dataset.tables.values() {
        for row in &table.rows {
            let columns: Vec<&str> = row.keys().map(|k| k.as_str()).collect();
            let values: Vec<String> = row.values().map(|v| v.to_sql_literal()).collect();
            write_line(
                writer,
                &format!(
                    "INSERT INTO {} ({}) VALUES ({});",
                    table.name,
                    columns.join(", "),
                    values.join(", ")
                ),
            )?;
        }
    }

    if options.transaction {
        write_line(writer, "COMMIT;")?;
    }
    Ok(())
}

fn write_line<W: Write>(writer: &mut W, line: &str) -> Result<()> {
    writeln!(writer, "{}", line).map_err(|e| SeedForgeError::Output {
        message: "writing SQL".to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{Record, TableData, Value};
    use crate::personas::Locale;
    use indexmap::IndexMap;

    fn dataset() -> Dataset {
        let mut users_row = Record::new();
        users_row.insert("id".to_string(), Value::Int(1));
        users_row.insert(
            "name".to_string(),
            Value::from_string("O'Brien".to_string()),
        );

        let mut orders_row = Record::new();
        orders_row.insert("id".to_string(), Value::Int(1));
        orders_row.insert("user_id".to_string(), Value::Int(1));

        let mut tables = IndexMap::new();
        tables.insert(
            "users".to_string(),
            TableData {
                name: "users".to_string(),
                rows: vec![users_row],
            },
        );
        tables.insert(
            "orders".to_string(),
            TableData {
                name: "orders".to_string(),
                rows: vec![orders_row],
            },
        );
        Dataset {
            tables,
            seed: 1,
            locale: Locale::EnUs,
            validation: None,
        }
    }

    #[test]
    fn test_insert_per_row_in_order() {
        let mut out = Vec::new();
        write_sql(&mut out, &dataset(), &SqlOptions::default()).unwrap();
        let sql = String::from_utf8(out).unwrap();
        assert_eq!(
            sql,
            "INSERT INTO users (id, name) VALUES (1, 'O''Brien');\n\
             INSERT INTO orders (id, user_id) VALUES (1, 1);\n"
        );
    }

    #[test]
    fn test_transaction_wrapper() {
        let mut out = Vec::new();
        let options = SqlOptions {
            transaction: true,
            delete_prelude: false,
        };
        write_sql(&mut out, &dataset(), &options).unwrap();
        let sql = String::from_utf8(out).unwrap();
        assert!(sql.starts_with("BEGIN;\n"));
        assert!(sql.ends_with("COMMIT;\n"));
    }

    #[test]
    fn test_delete_prelude_reverse_order() {
        let mut out = Vec::new();
        let options = SqlOptions {
            transaction: false,
            delete_prelude: true,
        };
        write_sql(&mut out, &dataset(), &options).unwrap();
        let sql = String::from_utf8(out).unwrap();
        let orders_delete = sql.find("DELETE FROM orders;").unwrap();
        let users_delete = sql.find("DELETE FROM users;").unwrap();
        let first_insert = sql.find("INSERT INTO").unwrap();
        assert!(orders_delete < users_delete, "children deleted first");
        assert!(users_delete < first_insert, "deletes precede inserts");
    }
}
