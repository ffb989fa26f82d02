pub mod check;
pub mod types;

pub use check::ParsedCheck;
pub use types::{
    Column, Constraint, ForeignKeyAction, ForeignKeySpec, LogicalType, Schema, Table,
};
