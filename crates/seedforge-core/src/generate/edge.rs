//! Edge-case injection.
//!
//! With probability P/100 per record, substitutes exactly one nullable,
//! non-identity column's value with a boundary or adversarial value from the
//! per-type catalog. Injection shares the run RNG stream, so the seed
//! governs it. Every failure mode here (no candidate column, no catalog
//! entry, unique collision) is a silent no-op; injection is never fatal.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rand::rngs::StdRng;
use rand::Rng;
use uuid::Uuid;

use crate::generate::unique::UniqueRegistry;
use crate::generate::value::Value;
use crate::generate::Record;
use crate::schema::{LogicalType, Table};

const EDGE_STRINGS: &[&str] = &[
    "",
    " ",
    "  ",
    "\n",
    "\t",
    "'",
    "\"",
    "\\",
    "NULL",
    "null",
    "<script>alert('xss')</script>",
    "'; DROP TABLE users; --",
    "' OR '1'='1",
    "../../../etc/passwd",
    "\0",
    "🎉🚀😀",
    "数据库测试数据",
    "àéîõüñçß",
];

#[derive(Debug, Clone, Copy)]
pub struct EdgeCaseInjector {
    /// Injection probability in percent, clamped to [0, 100].
    percentage: f64,
}

impl EdgeCaseInjector {
    pub fn new(percentage: f64) -> Self {
        Self {
            percentage: percentage.clamp(0.0, 100.0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.percentage > 0.0
    }

    /// Maybe substitute one column of `row`. `excluded` carries the PK and
    /// FK columns (identity must survive injection); columns under a
    /// composite unique constraint are skipped, and a substitution that
    /// collides with a registered single-column unique set is abandoned.
    pub fn inject(
        &self,
        rng: &mut StdRng,
        table: &Table,
        row: &mut Record,
        excluded: &HashSet<String>,
        registry: &mut UniqueRegistry,
    ) {
        if self.percentage <= 0.0 {
            return;
        }
        let roll: f64 = rng.random();
        if roll >= self.percentage / 100.0 {
            return;
        }

        let composite_cols: HashSet<&str> = table
            .unique_constraints()
            .filter(|uc| uc.len() > 1)
            .flatten()
            .map(|c| c.as_str())
            .collect();

        let candidates: Vec<&crate::schema::Column> = table
            .columns
            .iter()
            .filter(|c| {
                c.nullable
                    && !excluded.contains(&c.name)
                    && !composite_cols.contains(c.name.as_str())
                    && row.contains_key(&c.name)
            })
            .collect();
        if candidates.is_empty() {
            return;
        }

        let column = candidates[rng.random_range(0..candidates.len())];
        let Some(value) = pick_edge_case(rng, column.logical_type, column.length) else {
            return;
        };

        // Honor single-column unique sets: a colliding substitution is
        // treated as "no applicable case".
        let columns = [column.name.clone()];
        if registry.is_registered(&table.name, &columns)
            && !registry.mark_used(&table.name, &columns, &[&value])
        {
            return;
        }

        row.insert(column.name.clone(), value);
    }
}

/// Draw one edge case for a logical type, or `None` when the catalog has no
/// entry for it. String values are clipped to the column length.
pub fn pick_edge_case(rng: &mut StdRng, ty: LogicalType, length: Option<u32>) -> Option<Value> {
    let value = match ty {
        LogicalType::TinyInt => pick_int(rng, i8::MIN as i64, i8::MAX as i64),
        LogicalType::SmallInt => pick_int(rng, i16::MIN as i64, i16::MAX as i64),
        LogicalType::Integer => pick_int(rng, i32::MIN as i64, i32::MAX as i64),
        LogicalType::BigInt => pick_int(rng, i64::MIN, i64::MAX),
        LogicalType::Float | LogicalType::Double => {
            let cases = [
                0.0,
                -0.0,
                f64::MAX,
                f64::MIN_POSITIVE,
                f64::EPSILON,
                -f64::EPSILON,
            ];
            Value::Float(cases[rng.random_range(0..cases.len())])
        }
        LogicalType::Decimal => {
            let cases = ["0", "-0.00", "0.01", "-1", "99999999.99"];
            Value::Decimal(cases[rng.random_range(0..cases.len())].to_string())
        }
        LogicalType::Char | LogicalType::VarChar | LogicalType::Text => {
            let mut s = EDGE_STRINGS[rng.random_range(0..EDGE_STRINGS.len())].to_string();
            if let Some(len) = length {
                s = s.chars().take(len as usize).collect();
            }
            Value::from_string(s)
        }
        LogicalType::Date => {
            let cases = [
                NaiveDate::from_ymd_opt(1970, 1, 1),
                NaiveDate::from_ymd_opt(1969, 12, 31),
                NaiveDate::from_ymd_opt(2038, 1, 19),
                NaiveDate::from_ymd_opt(2100, 1, 1),
                NaiveDate::from_ymd_opt(2000, 2, 29),
                NaiveDate::from_ymd_opt(2001, 2, 28),
            ];
            Value::Date(cases[rng.random_range(0..cases.len())]?)
        }
        LogicalType::DateTime | LogicalType::Timestamp => {
            let cases = [
                datetime(1970, 1, 1, 0, 0, 0),
                datetime(1969, 12, 31, 23, 59, 59),
                datetime(2038, 1, 19, 3, 14, 7),
                datetime(2100, 1, 1, 0, 0, 0),
                datetime(2000, 2, 29, 12, 0, 0),
                datetime(2001, 2, 28, 12, 0, 0),
            ];
            Value::Timestamp(cases[rng.random_range(0..cases.len())]?)
        }
        LogicalType::Boolean => Value::Bool(rng.random_bool(0.5)),
        LogicalType::Json => {
            let cases = [
                serde_json::json!({}),
                serde_json::json!([]),
                serde_json::json!({ "nested": { "list": [1, 2, 3], "null": null } }),
            ];
            Value::Json(cases[rng.random_range(0..cases.len())].clone())
        }
        LogicalType::Uuid => {
            if rng.random_bool(0.5) {
                Value::Uuid(Uuid::nil())
            } else {
                Value::Uuid(Uuid::max())
            }
        }
        LogicalType::Binary => {
            let cases: [&[u8]; 3] = [&[], &[0x00], &[0xff]];
            Value::Bytes(cases[rng.random_range(0..cases.len())].to_vec())
        }
        LogicalType::Time => return None,
    };
    Some(value)
}

fn pick_int(rng: &mut StdRng, min: i64, max: i64) -> Value {
    let cases = [0, 1, -1, min, max];
    Value::Int(cases[rng.random_range(0..cases.len())])
}

fn datetime(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> Option<NaiveDateTime> {
    Some(NaiveDateTime::new(
        NaiveDate::from_ymd_opt(y, mo, d)?,
        NaiveTime::from_hms_opt(h, mi, s)?,
    ))
}

/// True if a string matches some entry of the string edge-case catalog
/// (used by tests and the validator's diagnostics).
pub fn is_string_edge_case(s: &str) -> bool {
    EDGE_STRINGS.iter().any(|e| *e == s || s.starts_with(e) && !e.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, Constraint};
    use indexmap::IndexMap;
    use rand::SeedableRng;

    fn users_table() -> Table {
        let mut t = Table::new("users");
        let mut id = Column::new("id", LogicalType::Integer);
        id.nullable = false;
        t.columns.push(id);
        let mut email = Column::new("email", LogicalType::VarChar);
        email.length = Some(255);
        t.columns.push(email);
        t.constraints.push(Constraint::PrimaryKey {
            columns: vec!["id".to_string()],
        });
        t
    }

    fn row() -> Record {
        let mut r = IndexMap::new();
        r.insert("id".to_string(), Value::Int(1));
        r.insert(
            "email".to_string(),
            Value::from_string("a@example.com".to_string()),
        );
        r
    }

    #[test]
    fn test_full_rate_always_injects() {
        let injector = EdgeCaseInjector::new(100.0);
        let table = users_table();
        let excluded: HashSet<String> = ["id".to_string()].into();
        let mut registry = UniqueRegistry::new();
        let mut rng = StdRng::seed_from_u64(3);

        let mut hit = 0;
        for _ in 0..50 {
            let mut r = row();
            injector.inject(&mut rng, &table, &mut r, &excluded, &mut registry);
            if r["email"].as_str() != Some("a@example.com") {
                hit += 1;
            }
        }
        assert_eq!(hit, 50);
    }

    #[test]
    fn test_zero_rate_never_injects() {
        let injector = EdgeCaseInjector::new(0.0);
        let table = users_table();
        let excluded = HashSet::new();
        let mut registry = UniqueRegistry::new();
        let mut rng = StdRng::seed_from_u64(3);

        let mut r = row();
        injector.inject(&mut rng, &table, &mut r, &excluded, &mut registry);
        assert_eq!(r["email"].as_str(), Some("a@example.com"));
    }

    #[test]
    fn test_excluded_columns_survive() {
        let injector = EdgeCaseInjector::new(100.0);
        let mut table = users_table();
        // Make id nullable so exclusion (not nullability) is what protects it.
        table.columns[0].nullable = true;
        let excluded: HashSet<String> = ["id".to_string()].into();
        let mut registry = UniqueRegistry::new();
        let mut rng = StdRng::seed_from_u64(4);

        for _ in 0..50 {
            let mut r = row();
            injector.inject(&mut rng, &table, &mut r, &excluded, &mut registry);
            assert_eq!(r["id"], Value::Int(1));
        }
    }

    #[test]
    fn test_no_candidates_is_a_noop() {
        let injector = EdgeCaseInjector::new(100.0);
        let mut table = users_table();
        table.columns[1].nullable = false;
        let excluded: HashSet<String> = ["id".to_string()].into();
        let mut registry = UniqueRegistry::new();
        let mut rng = StdRng::seed_from_u64(5);

        let mut r = row();
        injector.inject(&mut rng, &table, &mut r, &excluded, &mut registry);
        assert_eq!(r["email"].as_str(), Some("a@example.com"));
    }

    #[test]
    fn test_string_catalog_respects_length() {
        let mut rng = StdRng::seed_from_u64(6);
        for _ in 0..100 {
            if let Some(Value::Str(s)) = pick_edge_case(&mut rng, LogicalType::VarChar, Some(4)) {
                assert!(s.chars().count() <= 4, "too long: {:?}", s);
            }
        }
    }

    #[test]
    fn test_catalog_covers_spec_types() {
        let mut rng = StdRng::seed_from_u64(7);
        for ty in [
            LogicalType::Integer,
            LogicalType::Float,
            LogicalType::VarChar,
            LogicalType::Date,
            LogicalType::Timestamp,
            LogicalType::Boolean,
            LogicalType::Json,
            LogicalType::Uuid,
            LogicalType::Binary,
        ] {
            assert!(pick_edge_case(&mut rng, ty, None).is_some(), "{:?}", ty);
        }
    }
}
