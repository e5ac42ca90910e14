//! The dataset layer for rustata.
//!
//! A [`Dataset`] is an ordered collection of named, typed columns; numeric
//! columns use NaN as the missing-value sentinel. Datasets are loaded from
//! CSV files with an optional TOML metadata sidecar (file label, variable
//! labels, value-label names, notes), or from the shipped examples embedded
//! in the binary. The [`slice`] module applies `in`-range, `if`-filter, and
//! `by`-group restrictions, producing [`DataSubset`] index views consumed by
//! the statistical procedures.

pub mod builtin;
pub mod dataset;
pub mod filter;
pub mod loader;
pub mod slice;

pub use builtin::{builtin_names, resolve_dataset};
pub use dataset::{Column, ColumnData, Dataset, Metadata};
pub use filter::FilterExpr;
pub use slice::{DataSubset, listwise_numeric, slice};
