//! Post-hoc constraint validation.
//!
//! Re-checks a completed dataset against its schema: duplicate primary keys,
//! NULLs in non-nullable columns, unique violations (single and composite),
//! orphan foreign keys, self-reference ordering, and the whitelisted CHECK
//! subset. Read-only and order-independent; findings are returned as data
//! for the caller to judge, never raised as errors.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde::Serialize;

use crate::generate::value::Value;
use crate::generate::Dataset;
use crate::schema::{ParsedCheck, Schema, Table};

/// Kind of a single violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    DuplicatePrimaryKey,
    NullInNotNullColumn,
    UniqueViolation,
    OrphanForeignKey,
    SelfReferenceViolation,
    CheckViolation,
}

#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub row_index: usize,
    pub column: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableReport {
    pub valid: bool,
    pub errors: Vec<Violation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub tables: IndexMap<String, TableReport>,
    pub total_errors: usize,
    /// CHECK expressions outside the whitelist, listed as
    /// `table: expression`. Present in the output, not enforced by the
    /// generator, and not evaluated here.
    pub not_enforced_checks: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.total_errors == 0
    }

    /// Human-readable summary for terminal output.
    pub fn summary(&self) -> String {
        let mut lines = if self.is_valid() {
            vec!["All constraints satisfied.".to_string()]
        } else {
            vec![format!("{} constraint violations:", self.total_errors)]
        };
        for (table, report) in &self.tables {
            for v in &report.errors {
                lines.push(format!(
                    "  {} row {} column {}: {}",
                    table, v.row_index, v.column, v.message
                ));
            }
        }
        for check in &self.not_enforced_checks {
            lines.push(format!("  not enforced by generator: {}", check));
        }
        lines.join("\n")
    }
}

/// Validate a dataset against its schema.
pub fn validate(schema: &Schema, dataset: &Dataset) -> ValidationReport {
    let mut tables = IndexMap::new();
    let mut not_enforced = Vec::new();
    let mut total = 0;

    for (table_name, table) in &schema.tables {
        let mut errors = Vec::new();
        let rows: &[crate::generate::Record] = dataset
            .table(table_name)
            .map(|t| t.rows.as_slice())
            .unwrap_or(&[]);

        check_not_null(table, rows, &mut errors);
        if let Some(pk) = table.primary_key() {
            check_unique(rows, pk, ViolationKind::DuplicatePrimaryKey, &mut errors);
        }
        for uc in table.unique_constraints() {
            check_unique(rows, uc, ViolationKind::UniqueViolation, &mut errors);
        }
        check_foreign_keys(table, rows, dataset, &mut errors);
        check_checks(table, rows, &mut errors, &mut not_enforced);

        total += errors.len();
        tables.insert(
            table_name.clone(),
            TableReport {
                valid: errors.is_empty(),
                errors,
            },
        );
    }

    ValidationReport {
        tables,
        total_errors: total,
        not_enforced_checks: not_enforced,
    }
}

fn check_not_null(table: &Table, rows: &[crate::generate::Record], errors: &mut Vec<Violation>) {
    for column in table.columns.iter().filter(|c| !c.nullable) {
        for (row_index, row) in rows.iter().enumerate() {
            let is_null = row.get(&column.name).map(|v| v.is_null()).unwrap_or(true);
            if is_null {
                errors.push(Violation {
                    kind: ViolationKind::NullInNotNullColumn,
                    row_index,
                    column: column.name.clone(),
                    message: format!("NULL in non-nullable column '{}'", column.name),
                });
            }
        }
    }
}

fn check_unique(
    rows: &[crate::generate::Record],
    columns: &[String],
    kind: ViolationKind,
    errors: &mut Vec<Violation>,
) {
    let mut seen: HashMap<String, usize> = HashMap::new();
    for (row_index, row) in rows.iter().enumerate() {
        let values: Vec<&Value> = columns.iter().filter_map(|c| row.get(c)).collect();
        if values.len() != columns.len() {
            continue;
        }
        // SQL unique constraints admit multiple NULLs.
        if columns.len() == 1 && values[0].is_null() {
            continue;
        }
        let key = values
            .iter()
            .map(|v| v.to_unique_key())
            .collect::<Vec<_>>()
            .join("\u{1f}");
        if let Some(&first) = seen.get(&key) {
            errors.push(Violation {
                kind,
                row_index,
                column: columns.join(", "),
                message: format!(
                    "duplicate value for ({}) also present at row {}",
                    columns.join(", "),
                    first
                ),
            });
        } else {
            seen.insert(key, row_index);
        }
    }
}

fn check_foreign_keys(
    table: &Table,
    rows: &[crate::generate::Record],
    dataset: &Dataset,
    errors: &mut Vec<Violation>,
) {
    for fk in table.foreign_keys() {
        let self_ref = fk.referenced_table == table.name;
        let parent_rows: &[crate::generate::Record] = dataset
            .table(fk.referenced_table)
            .map(|t| t.rows.as_slice())
            .unwrap_or(&[]);

        // Index of referenced tuples → first row index holding them.
        let mut parent_keys: HashMap<String, usize> = HashMap::new();
        for (i, parent) in parent_rows.iter().enumerate() {
            let values: Vec<String> = fk
                .referenced_columns
                .iter()
                .filter_map(|c| parent.get(c))
                .map(|v| v.to_unique_key())
                .collect();
            if values.len() == fk.referenced_columns.len() {
                parent_keys.entry(values.join("\u{1f}")).or_insert(i);
            }
        }

        for (row_index, row) in rows.iter().enumerate() {
            let values: Vec<&Value> = fk.columns.iter().filter_map(|c| row.get(c)).collect();
            if values.len() != fk.columns.len() || values.iter().any(|v| v.is_null()) {
                continue;
            }
            let key = values
                .iter()
                .map(|v| v.to_unique_key())
                .collect::<Vec<_>>()
                .join("\u{1f}");
            match parent_keys.get(&key) {
                None => errors.push(Violation {
                    kind: ViolationKind::OrphanForeignKey,
                    row_index,
                    column: fk.columns.join(", "),
                    message: format!(
                        "({}) = {} has no matching row in {}",
                        fk.columns.join(", "),
                        key.replace('\u{1f}', ", "),
                        fk.referenced_table
                    ),
                }),
                Some(&parent_index) if self_ref => {
                    // Tiered self-references: a row may only point at a row
                    // generated before it, and never at itself.
                    if parent_index == row_index {
                        errors.push(Violation {
                            kind: ViolationKind::SelfReferenceViolation,
                            row_index,
                            column: fk.columns.join(", "),
                            message: "row references itself".to_string(),
                        });
                    } else if parent_index > row_index {
                        errors.push(Violation {
                            kind: ViolationKind::SelfReferenceViolation,
                            row_index,
                            column: fk.columns.join(", "),
                            message: format!(
                                "row references a later row (index {})",
                                parent_index
                            ),
                        });
                    }
                }
                Some(_) => {}
            }
        }
    }
}

fn check_checks(
    table: &Table,
    rows: &[crate::generate::Record],
    errors: &mut Vec<Violation>,
    not_enforced: &mut Vec<String>,
) {
    for (expression, _) in table.check_constraints() {
        match ParsedCheck::parse(expression) {
            Some(check) => {
                let column = check.column().to_string();
                for (row_index, row) in rows.iter().enumerate() {
                    if let Some(value) = row.get(&column) {
                        if !check.evaluate(value) {
                            errors.push(Violation {
                                kind: ViolationKind::CheckViolation,
                                row_index,
                                column: column.clone(),
                                message: format!(
                                    "value {} violates CHECK ({})",
                                    value, expression
                                ),
                            });
                        }
                    }
                }
            }
            None => not_enforced.push(format!("{}: {}", table.name, expression)),
        }
    }
}

/// Convenience: the distinct set of tables with at least one violation.
pub fn failing_tables(report: &ValidationReport) -> HashSet<&str> {
    report
        .tables
        .iter()
        .filter(|(_, r)| !r.valid)
        .map(|(name, _)| name.as_str())
        .collect()
}
