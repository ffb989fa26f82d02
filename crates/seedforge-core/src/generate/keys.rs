//! Primary-key allocation.
//!
//! Every `(table, column)` pair gets a monotonically increasing 64-bit
//! counter starting at 1; auto-increment columns share one table-scoped
//! counter irrespective of column name. UUID keys are v4-shaped but built
//! from the run RNG so the seed governs them too.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::Rng;
use uuid::Uuid;

use crate::generate::value::Value;
use crate::schema::{Column, LogicalType};

#[derive(Debug, Default)]
pub struct KeyAllocator {
    counters: HashMap<(String, String), u64>,
    table_counters: HashMap<String, u64>,
}

impl KeyAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next counter value for a `(table, column)` pair. First call yields 1.
    pub fn next(&mut self, table: &str, column: &str) -> u64 {
        let counter = self
            .counters
            .entry((table.to_string(), column.to_string()))
            .or_insert(0);
        *counter += 1;
        *counter
    }

    /// Next value of the table-scoped auto-increment counter.
    pub fn next_auto_increment(&mut self, table: &str) -> u64 {
        let counter = self.table_counters.entry(table.to_string()).or_insert(0);
        *counter += 1;
        *counter
    }

    /// Allocate a key value for a primary-key column.
    pub fn allocate(&mut self, table: &str, column: &Column, rng: &mut StdRng) -> Value {
        if column.auto_increment {
            return Value::Int(self.next_auto_increment(table) as i64);
        }
        match column.logical_type {
            LogicalType::Uuid => Value::Uuid(random_uuid(rng)),
            t if t.is_string() => {
                let mut key = format!("pk{}", self.next(table, &column.name));
                if let Some(len) = column.length {
                    key.truncate(len as usize);
                }
                Value::from_string(key)
            }
            _ => Value::Int(self.next(table, &column.name) as i64),
        }
    }
}

/// A v4-shaped UUID drawn from the run RNG (reproducible per seed, unlike
/// `Uuid::new_v4` which pulls from the OS).
pub fn random_uuid(rng: &mut StdRng) -> Uuid {
    uuid::Builder::from_random_bytes(rng.random()).into_uuid()
}
