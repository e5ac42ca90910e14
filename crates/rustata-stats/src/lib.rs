//! Statistical engine for rustata.
//!
//! Two families of computations live here: descriptive summaries
//! (`summary`) backing the `summarize` command, and ordinary least
//! squares with classical inference (`ols`) backing `regress`. Both
//! operate on plain numeric slices; variable resolution, filtering,
//! and missing-value handling happen upstream in `rustata-data`.

pub mod ols;
pub mod summary;

pub use ols::{estimate, OlsFit};
pub use summary::{basic, detail, BasicSummary, DetailSummary};
