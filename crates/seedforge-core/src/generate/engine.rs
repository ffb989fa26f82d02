//! The generation engine.
//!
//! Executes the analyzer's plan: ordinary tables row by row in topological
//! order, cycle groups in two passes (deferred FK columns null in pass one,
//! populated in place in pass two), and self-referencing tables through the
//! tiered model. All randomness flows from one seeded `StdRng`, so a fixed
//! seed fixes the entire dataset. No partial dataset ever escapes: every
//! failure path returns the error and drops the work in progress.

use std::collections::HashSet;

use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::cancel::CancellationToken;
use crate::config::GenerationOptions;
use crate::error::{Result, SeedForgeError};
use crate::generate::edge::EdgeCaseInjector;
use crate::generate::foreign_key::{FkSampler, ForeignKeyPool};
use crate::generate::keys::KeyAllocator;
use crate::generate::synth::{nonnull_value_for, unique_fallback_value, value_for, SynthPolicy};
use crate::generate::unique::UniqueRegistry;
use crate::generate::value::Value;
use crate::graph::{build_plan, DeferredFk, GenerationPlan, Phase, SelfRefPlan};
use crate::personas::Locale;
use crate::schema::{ParsedCheck, Schema, Table};
use crate::validate::ValidationReport;

/// A generated row: column name → value, in declaration order.
pub type Record = IndexMap<String, Value>;

/// All rows of one table, in generation order.
#[derive(Debug, Clone)]
pub struct TableData {
    pub name: String,
    pub rows: Vec<Record>,
}

/// The result of a run.
#[derive(Debug)]
pub struct Dataset {
    /// Tables in generation order.
    pub tables: IndexMap<String, TableData>,
    /// The seed that produced this dataset (explicit or clock-derived).
    pub seed: u64,
    pub locale: Locale,
    /// Present when the run was configured with `validate: true`. Findings
    /// are data for the caller to judge, not errors.
    pub validation: Option<ValidationReport>,
}

impl Dataset {
    pub fn table(&self, name: &str) -> Option<&TableData> {
        self.tables.get(name)
    }

    pub fn total_rows(&self) -> usize {
        self.tables.values().map(|t| t.rows.len()).sum()
    }

    /// Ordered lazy sequence of per-table record batches for streaming
    /// writers. `batch_size` 0 yields each table as one batch.
    pub fn batches(&self, batch_size: usize) -> impl Iterator<Item = Batch<'_>> {
        self.tables.values().flat_map(move |table| {
            let size = if batch_size == 0 {
                table.rows.len().max(1)
            } else {
                batch_size
            };
            table
                .rows
                .chunks(size)
                .enumerate()
                .map(move |(index, rows)| Batch {
                    table: &table.name,
                    index,
                    rows,
                })
        })
    }
}

/// One batch of records from one table.
#[derive(Debug, Clone, Copy)]
pub struct Batch<'a> {
    pub table: &'a str,
    pub index: usize,
    pub rows: &'a [Record],
}

/// Progress callback: `(table, rows_done, rows_total)`.
pub type ProgressFn<'a> = &'a (dyn Fn(&str, usize, usize) + 'a);

/// Progress reporting interval, to keep terminal I/O off the hot path.
const PROGRESS_BATCH_SIZE: usize = 100;

/// Depth cap for the tiered self-reference model.
const MAX_TIERS: usize = 8;

/// Share of rows assigned to tier zero.
const TIER_ZERO_SHARE: f64 = 0.15;

/// Growth factor between consecutive tiers.
const TIER_GROWTH: f64 = 1.5;

/// Probability that a non-root row keeps a null self-reference.
const SELF_REF_NULL_PCT: f64 = 0.20;

/// Bound on whole-row regeneration when a composite unique tuple collides.
const MAX_COMPOSITE_ATTEMPTS: usize = 50;

/// Generate a dataset satisfying every constraint of `schema`.
pub fn generate(schema: &Schema, options: &GenerationOptions) -> Result<Dataset> {
    generate_with(schema, options, &CancellationToken::new(), None)
}

/// [`generate`] with cooperative cancellation and a progress callback.
pub fn generate_with(
    schema: &Schema,
    options: &GenerationOptions,
    cancel: &CancellationToken,
    progress: Option<ProgressFn<'_>>,
) -> Result<Dataset> {
    schema.validate()?;
    let plan = build_plan(schema)?;

    let seed = match options.seed {
        Some(seed) => seed,
        None => {
            let seed = clock_seed();
            info!(seed, "no seed supplied; derived one from the system clock");
            seed
        }
    };

    let mut run = Run {
        schema,
        options,
        plan: &plan,
        seed,
        policy: SynthPolicy {
            locale: options.locale,
            honor_defaults: options.honor_defaults,
            anchor: crate::generate::synth::anchor_time(),
        },
        rng: StdRng::seed_from_u64(seed),
        keys: KeyAllocator::new(),
        registry: UniqueRegistry::new(),
        fk_pool: ForeignKeyPool::new(),
        fk_sampler: FkSampler::new(seed),
        tables: IndexMap::new(),
        cancel,
        progress,
        rows_done: 0,
        rows_total: 0,
    };

    for (name, table) in &schema.tables {
        if let Some(pk) = table.primary_key() {
            run.registry.register(name, pk);
        }
        for uc in table.unique_constraints() {
            run.registry.register(name, uc);
        }
    }
    run.rows_total = plan
        .table_order()
        .iter()
        .map(|t| options.row_count_for(t))
        .sum();

    for phase in &plan.phases {
        run.cancel.check()?;
        match phase {
            Phase::Single(table_name) => {
                run.generate_table(table_name)?;
                run.resolve_self_refs(table_name)?;
            }
            Phase::CycleGroup { tables, deferred } => {
                for table_name in tables {
                    run.generate_table(table_name)?;
                }
                for d in deferred {
                    run.cancel.check()?;
                    run.resolve_deferred(d);
                }
                for table_name in tables {
                    run.resolve_self_refs(table_name)?;
                }
            }
        }
    }

    let mut dataset = Dataset {
        tables: run.tables,
        seed,
        locale: options.locale,
        validation: None,
    };

    if options.validate {
        dataset.validation = Some(crate::validate::validate(schema, &dataset));
    }

    Ok(dataset)
}

fn clock_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// Mutable state of one run; the engine exclusively owns all of it.
struct Run<'a> {
    schema: &'a Schema,
    options: &'a GenerationOptions,
    plan: &'a GenerationPlan,
    seed: u64,
    policy: SynthPolicy,
    rng: StdRng,
    keys: KeyAllocator,
    registry: UniqueRegistry,
    fk_pool: ForeignKeyPool,
    fk_sampler: FkSampler,
    tables: IndexMap<String, TableData>,
    cancel: &'a CancellationToken,
    progress: Option<ProgressFn<'a>>,
    rows_done: usize,
    rows_total: usize,
}

impl<'a> Run<'a> {
    fn generate_table(&mut self, table_name: &str) -> Result<()> {
        let schema = self.schema;
        let table = schema
            .table(table_name)
            .ok_or_else(|| SeedForgeError::SchemaInvalid {
                message: format!("plan references unknown table '{}'", table_name),
            })?;
        let row_count = self.options.row_count_for(table_name);
        let deferred: HashSet<String> = self
            .plan
            .deferred_columns(table_name)
            .into_iter()
            .map(|c| c.to_string())
            .collect();
        let injector = EdgeCaseInjector::new(self.options.edge_cases_for(table_name));

        // Identity columns are off-limits to the injector.
        let mut identity: HashSet<String> = HashSet::new();
        if let Some(pk) = table.primary_key() {
            identity.extend(pk.iter().cloned());
        }
        for fk in table.foreign_keys() {
            identity.extend(fk.columns.iter().cloned());
        }

        let checks = column_checks(table);
        let composites: Vec<Vec<String>> = table
            .unique_constraints()
            .filter(|uc| uc.len() > 1)
            .map(|uc| uc.to_vec())
            .collect();

        let mut rows = Vec::with_capacity(row_count);
        for row_index in 0..row_count {
            self.cancel.check()?;
            let mut row = self.generate_row(table, row_index, &deferred, &checks)?;
            self.repair_composites(table, row_index, &composites, &deferred, &mut row, &checks)?;
            injector.inject(&mut self.rng, table, &mut row, &identity, &mut self.registry);
            self.record_key_values(table, &row);
            rows.push(row);

            self.rows_done += 1;
            if let Some(cb) = self.progress {
                if self.rows_done % PROGRESS_BATCH_SIZE == 0 || self.rows_done == self.rows_total {
                    cb(table_name, self.rows_done, self.rows_total);
                }
            }
        }

        self.tables.insert(
            table_name.to_string(),
            TableData {
                name: table_name.to_string(),
                rows,
            },
        );
        Ok(())
    }

    fn generate_row(
        &mut self,
        table: &Table,
        row_index: usize,
        deferred: &HashSet<String>,
        checks: &[(String, Vec<ParsedCheck>)],
    ) -> Result<Record> {
        let mut row = Record::with_capacity(table.columns.len());

        // Multi-column FKs must reference one parent row consistently, so
        // their values are picked per constraint, not per column.
        let mut composite_fk_values: IndexMap<String, Value> = IndexMap::new();
        for fk in table.foreign_keys().filter(|fk| fk.columns.len() > 1) {
            if fk.referenced_table == table.name {
                continue;
            }
            let len = self
                .fk_pool
                .pool_len(fk.referenced_table, &fk.referenced_columns[0]);
            if len == 0 {
                continue;
            }
            let mut sub = StdRng::seed_from_u64(self.seed.wrapping_add(row_index as u64));
            let idx = sub.random_range(0..len);
            for (col, ref_col) in fk.columns.iter().zip(fk.referenced_columns.iter()) {
                if let Some(values) = self.fk_pool.values(fk.referenced_table, ref_col) {
                    composite_fk_values.insert(col.clone(), values[idx].clone());
                }
            }
        }

        for column in &table.columns {
            let value = if deferred.contains(&column.name) {
                Value::Null
            } else if table.is_pk_column(&column.name) {
                let value = self.keys.allocate(&table.name, column, &mut self.rng);
                if let Some(pk) = table.primary_key() {
                    if pk.len() == 1 {
                        let cols = [column.name.clone()];
                        self.registry.mark_used(&table.name, &cols, &[&value]);
                    }
                }
                value
            } else if column.auto_increment {
                self.keys.allocate(&table.name, column, &mut self.rng)
            } else if let Some(v) = composite_fk_values.shift_remove(&column.name) {
                v
            } else if let Some(fk) = table.fk_for_column(&column.name) {
                let skew = self.options.sampler_for(&table.name, &column.name);
                match self.fk_sampler.pick(
                    &self.fk_pool,
                    fk.referenced_table,
                    &fk.referenced_columns[0],
                    row_index,
                    skew,
                ) {
                    Some(v) => v,
                    None if column.nullable => Value::Null,
                    None => {
                        return Err(SeedForgeError::MissingParent {
                            table: table.name.clone(),
                            column: column.name.clone(),
                            referenced_table: fk.referenced_table.to_string(),
                            referenced_column: fk.referenced_columns[0].clone(),
                        })
                    }
                }
            } else {
                let column_checks = checks_for(checks, &column.name);
                let single = [column.name.clone()];
                if self.registry.is_registered(&table.name, &single) {
                    let policy = self.policy;
                    let rng = &mut self.rng;
                    // After a handful of collisions, widen the value space
                    // instead of redrawing from the same small vocabulary.
                    self.registry
                        .generate(&table.name, &column.name, row_index, |attempt| {
                            if attempt < 8 {
                                nonnull_value_for(column, column_checks, &policy, rng)
                            } else {
                                unique_fallback_value(column, column_checks, &policy, rng)
                            }
                        })?
                } else {
                    value_for(column, column_checks, &self.policy, &mut self.rng)
                }
            };
            row.insert(column.name.clone(), value);
        }

        Ok(row)
    }

    /// Composite-unique repair: when a tuple collides, regenerate its
    /// synthesizable columns until the tuple is fresh or attempts run out.
    fn repair_composites(
        &mut self,
        table: &Table,
        row_index: usize,
        composites: &[Vec<String>],
        deferred: &HashSet<String>,
        row: &mut Record,
        checks: &[(String, Vec<ParsedCheck>)],
    ) -> Result<()> {
        for columns in composites {
            // Columns the repair loop may regenerate: synthesizable ones get
            // fresh values, single-column FKs get re-sampled from the pool.
            // PK columns are already distinct and deferred columns are not
            // materialized yet, so both stay fixed.
            let free: Vec<&str> = columns
                .iter()
                .filter(|c| !table.is_pk_column(c) && !deferred.contains(c.as_str()))
                .map(|c| c.as_str())
                .collect();

            let mut attempts = 0;
            loop {
                let values: Vec<&Value> = columns.iter().filter_map(|c| row.get(c)).collect();
                if values.len() != columns.len() {
                    break;
                }
                if self.registry.mark_used(&table.name, columns, &values) {
                    break;
                }
                attempts += 1;
                if free.is_empty() || attempts >= MAX_COMPOSITE_ATTEMPTS {
                    return Err(SeedForgeError::UniqueExhausted {
                        table: table.name.clone(),
                        columns: columns.join(", "),
                        row_index,
                        attempts,
                    });
                }
                tracing::warn!(
                    table = %table.name,
                    row_index,
                    attempts,
                    "composite unique collision, regenerating"
                );
                for name in &free {
                    let Some(column) = table.column(name) else {
                        continue;
                    };
                    let value = if let Some(fk) = table.fk_for_column(name) {
                        let values = self
                            .fk_pool
                            .values(fk.referenced_table, &fk.referenced_columns[0]);
                        match values {
                            Some(pool) if !pool.is_empty() => {
                                pool[self.rng.random_range(0..pool.len())].clone()
                            }
                            _ => continue,
                        }
                    } else {
                        let column_checks = checks_for(checks, name);
                        nonnull_value_for(column, column_checks, &self.policy, &mut self.rng)
                    };
                    row.insert(column.name.clone(), value);
                }
            }
        }
        Ok(())
    }

    /// Record PK and unique-key values so child tables can sample them.
    fn record_key_values(&mut self, table: &Table, row: &Record) {
        let mut key_columns: HashSet<&str> = HashSet::new();
        if let Some(pk) = table.primary_key() {
            key_columns.extend(pk.iter().map(|c| c.as_str()));
        }
        for uc in table.unique_constraints() {
            key_columns.extend(uc.iter().map(|c| c.as_str()));
        }
        for col in key_columns {
            if let Some(value) = row.get(col) {
                if !value.is_null() {
                    self.fk_pool.record_value(&table.name, col, value.clone());
                }
            }
        }
    }

    /// Pass two for a broken cycle edge: overwrite the nulls in place with
    /// uniformly sampled keys from the now-materialized referenced table.
    fn resolve_deferred(&mut self, d: &DeferredFk) {
        let row_count = self
            .tables
            .get(&d.table)
            .map(|t| t.rows.len())
            .unwrap_or(0);
        for row_index in 0..row_count {
            for (col, ref_col) in d.columns.iter().zip(d.referenced_columns.iter()) {
                let picked = {
                    let values = self.fk_pool.values(&d.referenced_table, ref_col);
                    match values {
                        Some(values) if !values.is_empty() => {
                            Some(values[self.rng.random_range(0..values.len())].clone())
                        }
                        // Deferred columns are nullable by the break policy,
                        // so an empty parent simply leaves the null.
                        _ => None,
                    }
                };
                if let Some(value) = picked {
                    if let Some(table) = self.tables.get_mut(&d.table) {
                        table.rows[row_index].insert(col.clone(), value);
                    }
                }
            }
        }
    }

    /// Tiered self-reference resolution. Rows are assigned to geometric
    /// tiers; tier-zero rows keep a null self-FK, and a tier-k row picks a
    /// uniform parent among rows of tiers below k (which also guarantees it
    /// never references itself or a later row).
    fn resolve_self_refs(&mut self, table_name: &str) -> Result<()> {
        let plans: Vec<SelfRefPlan> = self
            .plan
            .self_refs
            .iter()
            .filter(|sr| sr.table == table_name)
            .cloned()
            .collect();
        if plans.is_empty() {
            return Ok(());
        }

        let row_count = self
            .tables
            .get(table_name)
            .map(|t| t.rows.len())
            .unwrap_or(0);
        if row_count == 0 {
            return Ok(());
        }
        let boundaries = tier_boundaries(row_count);

        for sr in plans {
            for row_index in 0..row_count {
                let tier = boundaries
                    .iter()
                    .position(|&start| row_index < start)
                    .unwrap_or(boundaries.len());
                if tier == 0 {
                    continue;
                }
                if self.rng.random::<f64>() < SELF_REF_NULL_PCT {
                    continue;
                }
                // Parents live strictly below this tier's start.
                let parent_limit = boundaries[tier - 1];
                let parent_index = self.rng.random_range(0..parent_limit);

                let parent_values: Vec<Option<Value>> = {
                    let rows = &self.tables[table_name].rows;
                    sr.referenced_columns
                        .iter()
                        .map(|rc| rows[parent_index].get(rc).cloned())
                        .collect()
                };
                let rows = &mut self
                    .tables
                    .get_mut(table_name)
                    .expect("table was generated above")
                    .rows;
                for (col, parent_value) in sr.columns.iter().zip(parent_values) {
                    if let Some(value) = parent_value {
                        rows[row_index].insert(col.clone(), value);
                    }
                }
            }
        }
        Ok(())
    }

}

/// Cumulative tier end positions for `n` rows: tier 0 holds ~15% (at least
/// one row), each later tier grows by ~1.5x, capped at `MAX_TIERS`.
fn tier_boundaries(n: usize) -> Vec<usize> {
    let mut boundaries = Vec::new();
    let mut size = ((n as f64 * TIER_ZERO_SHARE).round() as usize).max(1);
    let mut total = 0;
    while total < n && boundaries.len() < MAX_TIERS {
        total = (total + size).min(n);
        boundaries.push(total);
        size = ((size as f64) * TIER_GROWTH).ceil() as usize;
    }
    if total < n {
        // Row budget exceeds the depth cap; the last tier absorbs the rest.
        *boundaries.last_mut().expect("at least one tier") = n;
    }
    boundaries
}

fn column_checks(table: &Table) -> Vec<(String, Vec<ParsedCheck>)> {
    let mut out: Vec<(String, Vec<ParsedCheck>)> = Vec::new();
    for (expression, _) in table.check_constraints() {
        if let Some(parsed) = ParsedCheck::parse(expression) {
            let column = parsed.column().to_string();
            match out.iter_mut().find(|(c, _)| *c == column) {
                Some((_, list)) => list.push(parsed),
                None => out.push((column, vec![parsed])),
            }
        }
    }
    out
}

fn checks_for<'c>(checks: &'c [(String, Vec<ParsedCheck>)], column: &str) -> &'c [ParsedCheck] {
    checks
        .iter()
        .find(|(c, _)| c == column)
        .map(|(_, list)| list.as_slice())
        .unwrap_or(&[])
}
