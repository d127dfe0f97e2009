//! Report generation for normalized insight rows.
//!
//! Two generators are provided, each accessed through a `generate` function:
//! - **CSV**: one header row from the row's columns, unset fields left empty.
//!   The header is written even when there are no rows.
//! - **JSON**: a pretty-printed document
//!
//! CSV rows implement [`Tabular`] so the header is known without an instance.

mod csv;
mod json;

pub use csv::generate as generate_csv;
pub use json::generate as generate_json;

use serde::Serialize;

/// A row type with a fixed set of CSV columns.
pub trait Tabular: Serialize {
    /// Column names, in serialization order.
    const COLUMNS: &'static [&'static str];
}

