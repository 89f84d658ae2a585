//! Core data types and I/O operations.

pub mod table;
pub mod writers;

pub use table::{read_two_columns, Series, TableError};
pub use writers::{negate_in_place, WriteError};
