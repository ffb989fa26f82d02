pub mod edge;
pub mod engine;
pub mod foreign_key;
pub mod keys;
pub mod synth;
pub mod unique;
pub mod value;

pub use engine::{generate, generate_with, Batch, Dataset, Record, TableData};
pub use value::Value;
