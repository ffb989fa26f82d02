//! # Configuration
//!
//! The options file is JSON with a closed key set; unrecognized keys fail
//! parsing with `ConfigInvalid`. Range rules serde cannot express (edge-case
//! percentages, distribution parameters) are validated in
//! [`ConfigFile::validate`] before anything expensive runs.
//!
//! Example:
//!
//! ```json
//! {
//!   "seed": 42,
//!   "locale": "en_GB",
//!   "count": 500,
//!   "format": "sql",
//!   "output": "seed.sql",
//!   "validate": true,
//!   "edge_cases": 5,
//!   "distributions": [
//!     { "column": "orders.user_id", "type": "zipf", "params": { "a": 1.3 } }
//!   ],
//!   "tables": {
//!     "users": { "count": 100 },
//!     "orders": { "count": 2000, "edge_cases": 0 }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::dist::Sampler;
use crate::error::{Result, SeedForgeError};
use crate::personas::Locale;

/// Output format selector. Consumed by exporters, not the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Sql,
    Json,
    Jsonl,
    Csv,
    All,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Sql => "sql",
            OutputFormat::Json => "json",
            OutputFormat::Jsonl => "jsonl",
            OutputFormat::Csv => "csv",
            OutputFormat::All => "all",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = SeedForgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sql" => Ok(OutputFormat::Sql),
            "json" => Ok(OutputFormat::Json),
            "jsonl" => Ok(OutputFormat::Jsonl),
            "csv" => Ok(OutputFormat::Csv),
            "all" => Ok(OutputFormat::All),
            other => Err(SeedForgeError::ConfigInvalid {
                message: format!(
                    "unknown format '{}' (expected sql, json, jsonl, csv, or all)",
                    other
                ),
            }),
        }
    }
}

/// The options file. Key set is exhaustive; unknown keys are rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub seed: Option<u64>,
    pub locale: Option<String>,
    pub count: Option<usize>,
    pub format: Option<OutputFormat>,
    pub output: Option<String>,
    pub validate: Option<bool>,
    pub edge_cases: Option<f64>,
    pub distributions: Option<Vec<DistributionConfig>>,
    pub tables: Option<BTreeMap<String, TableOverrideConfig>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableOverrideConfig {
    pub count: Option<usize>,
    pub edge_cases: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DistributionConfig {
    pub column: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub params: DistParams,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DistParams {
    pub a: Option<f64>,
    pub mean: Option<f64>,
    pub std: Option<f64>,
}

impl ConfigFile {
    pub fn parse(input: &str) -> Result<Self> {
        let config: ConfigFile =
            serde_json::from_str(input).map_err(|e| SeedForgeError::ConfigInvalid {
                message: format!("options file parse error: {}", e),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SeedForgeError::ConfigInvalid {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;
        Self::parse(&content)
    }

    /// Validate ranges serde cannot enforce.
    pub fn validate(&self) -> Result<()> {
        if let Some(p) = self.edge_cases {
            check_percentage(p, "edge_cases")?;
        }
        if let Some(tables) = &self.tables {
            for (name, t) in tables {
                if let Some(p) = t.edge_cases {
                    check_percentage(p, &format!("tables.{}.edge_cases", name))?;
                }
            }
        }
        for dist in self.distributions.iter().flatten() {
            dist.to_sampler()?;
        }
        Ok(())
    }

    /// Merge the file into engine options (required `count` must come from
    /// the file or the caller).
    pub fn to_generation_options(&self) -> Result<GenerationOptions> {
        let count = self.count.ok_or_else(|| SeedForgeError::ConfigInvalid {
            message: "missing required key 'count'".to_string(),
        })?;
        let mut options = GenerationOptions::new(count);
        options.seed = self.seed;
        if let Some(locale) = &self.locale {
            options.locale = Locale::parse(locale);
        }
        if let Some(p) = self.edge_cases {
            options.edge_cases = p;
        }
        if let Some(v) = self.validate {
            options.validate = v;
        }
        for dist in self.distributions.iter().flatten() {
            options.distributions.push(DistributionSpec {
                column: dist.column.clone(),
                sampler: dist.to_sampler()?,
            });
        }
        for (name, t) in self.tables.iter().flatten() {
            options.table_overrides.insert(
                name.clone(),
                TableOverride {
                    count: t.count,
                    edge_cases: t.edge_cases,
                },
            );
        }
        Ok(options)
    }
}

impl DistributionConfig {
    pub fn to_sampler(&self) -> Result<Sampler> {
        match self.kind.as_str() {
            "zipf" => {
                let a = self.params.a.ok_or_else(|| SeedForgeError::ConfigInvalid {
                    message: format!("distribution for '{}': zipf requires 'a'", self.column),
                })?;
                if !a.is_finite() || a <= 0.0 {
                    return Err(SeedForgeError::ConfigInvalid {
                        message: format!(
                            "distribution for '{}': zipf 'a' must be a positive number, got {}",
                            self.column, a
                        ),
                    });
                }
                Ok(Sampler::zipf(a))
            }
            "normal" => {
                let mean = self
                    .params
                    .mean
                    .ok_or_else(|| SeedForgeError::ConfigInvalid {
                        message: format!(
                            "distribution for '{}': normal requires 'mean'",
                            self.column
                        ),
                    })?;
                let std = self
                    .params
                    .std
                    .ok_or_else(|| SeedForgeError::ConfigInvalid {
                        message: format!(
                            "distribution for '{}': normal requires 'std'",
                            self.column
                        ),
                    })?;
                if !std.is_finite() || std <= 0.0 {
                    return Err(SeedForgeError::ConfigInvalid {
                        message: format!(
                            "distribution for '{}': normal 'std' must be > 0, got {}",
                            self.column, std
                        ),
                    });
                }
                Ok(Sampler::Normal { mean, std })
            }
            other => Err(SeedForgeError::ConfigInvalid {
                message: format!(
                    "distribution for '{}': unknown type '{}' (expected zipf or normal)",
                    self.column, other
                ),
            }),
        }
    }
}

fn check_percentage(p: f64, key: &str) -> Result<()> {
    if !(0.0..=100.0).contains(&p) || !p.is_finite() {
        return Err(SeedForgeError::ConfigInvalid {
            message: format!("{} must be between 0 and 100, got {}", key, p),
        });
    }
    Ok(())
}

/// A configured column distribution for FK sampling or numeric columns.
/// `column` is matched as `table.column` first, then as a bare column name.
#[derive(Debug, Clone)]
pub struct DistributionSpec {
    pub column: String,
    pub sampler: Sampler,
}

/// Per-table overrides of the global options.
#[derive(Debug, Clone, Default)]
pub struct TableOverride {
    pub count: Option<usize>,
    pub edge_cases: Option<f64>,
}

/// The engine's full option surface.
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    /// Records per table (per-table overrides may change individual tables).
    pub count: usize,
    /// RNG seed; when absent one is taken from the system clock and logged.
    pub seed: Option<u64>,
    pub locale: Locale,
    /// Edge-case injection percentage in [0, 100].
    pub edge_cases: f64,
    pub distributions: Vec<DistributionSpec>,
    /// Run the constraint validator after generation.
    pub validate: bool,
    /// Streaming hint: maximum records per batch handed to writers
    /// (0 disables batching).
    pub batch_size: usize,
    /// Emit declared column defaults instead of synthesizing.
    pub honor_defaults: bool,
    pub table_overrides: BTreeMap<String, TableOverride>,
}

impl GenerationOptions {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            seed: None,
            locale: Locale::default(),
            edge_cases: 0.0,
            distributions: Vec::new(),
            validate: false,
            batch_size: 0,
            honor_defaults: false,
            table_overrides: BTreeMap::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn row_count_for(&self, table: &str) -> usize {
        self.table_overrides
            .get(table)
            .and_then(|t| t.count)
            .unwrap_or(self.count)
    }

    pub fn edge_cases_for(&self, table: &str) -> f64 {
        self.table_overrides
            .get(table)
            .and_then(|t| t.edge_cases)
            .unwrap_or(self.edge_cases)
    }

    /// Find the configured sampler for a column, preferring a qualified
    /// `table.column` entry over a bare column name.
    pub fn sampler_for(&self, table: &str, column: &str) -> Option<&Sampler> {
        let qualified = format!("{}.{}", table, column);
        self.distributions
            .iter()
            .find(|d| d.column == qualified)
            .or_else(|| self.distributions.iter().find(|d| d.column == column))
            .map(|d| &d.sampler)
    }
}
