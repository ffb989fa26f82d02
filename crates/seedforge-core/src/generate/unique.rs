//! Uniqueness registry.
//!
//! Tracks canonical serializations of every value emitted under a UNIQUE
//! constraint, per `(table, column-set)`. Composite tuples are canonicalized
//! by sorting `(column, value)` pairs by column name before joining, so the
//! registered key is independent of the order callers pass columns in.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::error::{Result, SeedForgeError};
use crate::generate::value::Value;

/// Default bound on value-generation retries before `UniqueExhausted`.
pub const MAX_ATTEMPTS: usize = 1000;

pub struct UniqueRegistry {
    sets: HashMap<String, HashSet<String>>,
    pub max_attempts: usize,
}

impl UniqueRegistry {
    pub fn new() -> Self {
        Self {
            sets: HashMap::new(),
            max_attempts: MAX_ATTEMPTS,
        }
    }

    /// Register a constraint so its values are tracked. Unregistered
    /// constraints admit everything.
    pub fn register(&mut self, table: &str, columns: &[String]) {
        self.sets.entry(set_key(table, columns)).or_default();
    }

    pub fn is_registered(&self, table: &str, columns: &[String]) -> bool {
        self.sets.contains_key(&set_key(table, columns))
    }

    /// True if the tuple was already emitted for this constraint.
    pub fn is_used(&self, table: &str, columns: &[String], values: &[&Value]) -> bool {
        self.sets
            .get(&set_key(table, columns))
            .is_some_and(|seen| seen.contains(&tuple_key(columns, values)))
    }

    /// Record a tuple. Returns false (without inserting twice) if it was
    /// already present; true if it was new or the constraint is untracked.
    pub fn mark_used(&mut self, table: &str, columns: &[String], values: &[&Value]) -> bool {
        match self.sets.get_mut(&set_key(table, columns)) {
            Some(seen) => seen.insert(tuple_key(columns, values)),
            None => true,
        }
    }

    /// Call `gen_fn` until it produces a value not yet used for the
    /// single-column constraint, record it, and return it. Bounded by
    /// [`Self::max_attempts`]; exhaustion is an error naming the table,
    /// column, and attempt count.
    pub fn generate<F>(
        &mut self,
        table: &str,
        column: &str,
        row_index: usize,
        mut gen_fn: F,
    ) -> Result<Value>
    where
        F: FnMut(usize) -> Value,
    {
        let columns = [column.to_string()];
        for attempt in 0..self.max_attempts {
            let value = gen_fn(attempt);
            if self.mark_used(table, &columns, &[&value]) {
                if attempt > 0 {
                    warn!(
                        table,
                        column, attempt, "unique collision repaired by regeneration"
                    );
                }
                return Ok(value);
            }
        }
        Err(SeedForgeError::UniqueExhausted {
            table: table.to_string(),
            columns: column.to_string(),
            row_index,
            attempts: self.max_attempts,
        })
    }

    /// Forget all values recorded for one constraint.
    pub fn reset(&mut self, table: &str, columns: &[String]) {
        if let Some(seen) = self.sets.get_mut(&set_key(table, columns)) {
            seen.clear();
        }
    }

    /// Forget every constraint of a table.
    pub fn reset_table(&mut self, table: &str) {
        let prefix = format!("{}:", table);
        for (key, seen) in self.sets.iter_mut() {
            if key.starts_with(&prefix) {
                seen.clear();
            }
        }
    }

    /// Number of distinct tuples recorded for a constraint.
    pub fn unique_count(&self, table: &str, columns: &[String]) -> usize {
        self.sets
            .get(&set_key(table, columns))
            .map(|s| s.len())
            .unwrap_or(0)
    }
}

impl Default for UniqueRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn set_key(table: &str, columns: &[String]) -> String {
    let mut sorted: Vec<&str> = columns.iter().map(|c| c.as_str()).collect();
    sorted.sort_unstable();
    format!("{}:{}", table, sorted.join(","))
}

fn tuple_key(columns: &[String], values: &[&Value]) -> String {
    debug_assert_eq!(columns.len(), values.len());
    let mut pairs: Vec<(&str, String)> = columns
        .iter()
        .map(|c| c.as_str())
        .zip(values.iter().map(|v| v.to_unique_key()))
        .collect();
    pairs.sort_unstable_by(|a, b| a.0.cmp(b.0));
    pairs
        .into_iter()
        .map(|(c, v)| format!("{}={}", c, v))
        .collect::<Vec<_>>()
        .join("\u{1f}")
}
