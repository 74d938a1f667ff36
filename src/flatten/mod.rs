//! Record flattening - project run records onto a fixed column layout
//!
//! A [`Schema`] declares the output columns, a [`FilterSet`] names the runs to
//! skip, a [`Flattener`] turns each record into a row and a [`RowWriter`]
//! streams rows to CSV.

pub mod filter;
pub mod flattener;
pub mod schema;
pub mod writer;

pub use filter::{FilterRule, FilterSet};
pub use flattener::{display_string, Flattened, Flattener, ELEMENT_SEPARATOR, LIST_SEPARATOR};
pub use schema::{Schema, SchemaEntry};
pub use writer::RowWriter;
