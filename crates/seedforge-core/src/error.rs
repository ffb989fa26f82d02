//! # Error Types
//!
//! Defines `SeedForgeError`, the unified error enum for every failure mode in
//! the SeedForge pipeline. Every variant includes enough context (table name,
//! column names, row index, attempt counts) to debug immediately without
//! digging through logs.

use thiserror::Error;

/// All errors that can occur in SeedForge operations.
#[derive(Error, Debug)]
pub enum SeedForgeError {
    #[error("Invalid schema: {message}")]
    SchemaInvalid { message: String },

    #[error("No breakable edge found for circular dependency involving: {tables}\n  All FK columns in the cycle are NOT NULL. Consider making one FK column nullable.")]
    UnbreakableCycle { tables: String },

    #[error("Foreign key resolution failed: {table}.{column} references {referenced_table}.{referenced_column}, but the referenced table has no generated rows")]
    MissingParent {
        table: String,
        column: String,
        referenced_table: String,
        referenced_column: String,
    },

    #[error("Failed to generate unique value for {table}.({columns}) at row {row_index}: {attempts} attempts exhausted\n  Consider reducing the row count or widening the column's value space")]
    UniqueExhausted {
        table: String,
        columns: String,
        row_index: usize,
        attempts: usize,
    },

    #[error("Invalid pattern '{pattern}' at position {position}: {message}")]
    PatternInvalid {
        pattern: String,
        position: usize,
        message: String,
    },

    #[error("Configuration error: {message}")]
    ConfigInvalid { message: String },

    #[error("Generation cancelled")]
    CancelRequested,

    #[error("Output error: {message}: {source}")]
    Output {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, SeedForgeError>;
