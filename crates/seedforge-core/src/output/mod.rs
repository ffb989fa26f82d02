pub mod csv;
pub mod json;
pub mod jsonl;
pub mod sql;

pub use csv::write_csv;
pub use json::{read_json, write_json};
pub use jsonl::write_jsonl;
pub use sql::{write_sql, SqlOptions};
