//! Foundation types for rustata.
//!
//! This crate contains the error enum and result alias shared by all rustata
//! crates. Error display strings are user-facing: the shell prints them
//! verbatim, so syntax and computation variants carry the exact message the
//! operator sees.

pub mod error;

pub use error::{Result, RustataError};
