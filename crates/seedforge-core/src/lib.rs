//! # SeedForge
//!
//! Synthesizes relational test data from a declarative schema: given tables
//! with typed columns and integrity constraints, produces for each table a
//! requested number of records that jointly satisfy every constraint, and
//! emits them in reloadable formats.
//!
//! ```
//! use seedforge_core::config::GenerationOptions;
//! use seedforge_core::schema::Schema;
//!
//! let schema = Schema::from_json(r#"{
//!     "tables": [{
//!         "name": "users",
//!         "columns": [
//!             { "name": "id", "type": "INT", "nullable": false },
//!             { "name": "email", "type": "VARCHAR", "nullable": false, "length": 255 }
//!         ],
//!         "constraints": [
//!             { "type": "PRIMARY_KEY", "columns": ["id"] },
//!             { "type": "UNIQUE", "columns": ["email"] }
//!         ]
//!     }]
//! }"#).unwrap();
//!
//! let options = GenerationOptions::new(10).with_seed(42);
//! let dataset = seedforge_core::generate(&schema, &options).unwrap();
//! assert_eq!(dataset.table("users").unwrap().rows.len(), 10);
//! ```

pub mod cancel;
pub mod classify;
pub mod config;
pub mod dist;
pub mod error;
pub mod generate;
pub mod graph;
pub mod output;
pub mod pattern;
pub mod personas;
pub mod schema;
pub mod validate;

// Re-export key types for convenience
pub use cancel::CancellationToken;
pub use config::{ConfigFile, GenerationOptions, OutputFormat};
pub use error::{Result, SeedForgeError};
pub use generate::{generate, generate_with, Dataset, Record, TableData, Value};
pub use personas::Locale;
pub use schema::Schema;
pub use validate::{validate, ValidationReport};
