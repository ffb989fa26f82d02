//! Foreign-key value pool and sampler.
//!
//! Parent tables are generated first (topological order) and their key
//! values are recorded here in generation order. Child columns then sample
//! from the pool: uniform by default, Zipf- or Normal-skewed when a
//! distribution is configured for the column. Each row's draws come from a
//! sub-stream seeded `seed + row_index`, so FK choices are reproducible
//! independent of every other draw in the run.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::dist::Sampler;
use crate::generate::value::Value;

/// Pools of generated key values, keyed by `(table, column)`.
#[derive(Debug, Default)]
pub struct ForeignKeyPool {
    pools: HashMap<(String, String), Vec<Value>>,
}

impl ForeignKeyPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_value(&mut self, table: &str, column: &str, value: Value) {
        self.pools
            .entry((table.to_string(), column.to_string()))
            .or_default()
            .push(value);
    }

    pub fn values(&self, table: &str, column: &str) -> Option<&[Value]> {
        self.pools
            .get(&(table.to_string(), column.to_string()))
            .map(|v| v.as_slice())
    }

    pub fn pool_len(&self, table: &str, column: &str) -> usize {
        self.values(table, column).map(|v| v.len()).unwrap_or(0)
    }
}

/// Samples referenced-row keys for FK columns.
#[derive(Debug, Clone, Copy)]
pub struct FkSampler {
    seed: u64,
}

impl FkSampler {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Pick a key from the referenced table's pool, or `None` when the pool
    /// is empty (the caller decides between null and `MissingParent`).
    pub fn pick(
        &self,
        pool: &ForeignKeyPool,
        table: &str,
        column: &str,
        row_index: usize,
        skew: Option<&Sampler>,
    ) -> Option<Value> {
        let values = pool.values(table, column)?;
        if values.is_empty() {
            return None;
        }
        let mut sub = StdRng::seed_from_u64(self.seed.wrapping_add(row_index as u64));
        let idx = match skew {
            Some(sampler) => sampler.sample_index(&mut sub, values.len()),
            None => sub.random_range(0..values.len()),
        };
        Some(values[idx].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool_with(n: i64) -> ForeignKeyPool {
        let mut pool = ForeignKeyPool::new();
        for i in 1..=n {
            pool.record_value("users", "id", Value::Int(i));
        }
        pool
    }

    #[test]
    fn test_empty_pool_is_none() {
        let pool = ForeignKeyPool::new();
        let sampler = FkSampler::new(1);
        assert!(sampler.pick(&pool, "users", "id", 0, None).is_none());
    }

    #[test]
    fn test_uniform_pick_in_pool() {
        let pool = pool_with(5);
        let sampler = FkSampler::new(1);
        for row in 0..50 {
            let v = sampler.pick(&pool, "users", "id", row, None).unwrap();
            assert!((1..=5).contains(&v.as_int().unwrap()));
        }
    }

    #[test]
    fn test_sub_stream_depends_only_on_row_index() {
        let pool = pool_with(10);
        let sampler = FkSampler::new(42);
        let a = sampler.pick(&pool, "users", "id", 3, None);
        let b = sampler.pick(&pool, "users", "id", 3, None);
        assert_eq!(a, b);
    }

    #[test]
    fn test_zipf_skew_prefers_early_rows() {
        let pool = pool_with(100);
        let sampler = FkSampler::new(7);
        let skew = Sampler::zipf(1.5);
        let head = (0..1000)
            .filter(|&row| {
                sampler
                    .pick(&pool, "users", "id", row, Some(&skew))
                    .and_then(|v| v.as_int())
                    .is_some_and(|v| v <= 10)
            })
            .count();
        assert!(head > 400, "only {} of 1000 picks hit the head", head);
    }
}
