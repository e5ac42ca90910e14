//! Shell session state.

use std::collections::HashMap;

use rustata_data::dataset::{Dataset, Metadata};

/// A value stashed in the result mapping by the last statistical command.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredResult {
    Scalar(f64),
    Vector(Vec<f64>),
}

/// The one piece of shared mutable state: the active dataset and its
/// metadata, the global macro mapping, the results of the last statistical
/// command, and the unsaved-changes flag consulted by `exit`.
///
/// Created once at shell start; the dataset is only ever replaced wholesale
/// by a load or read by a computation.
#[derive(Debug, Default)]
pub struct Session {
    pub data: Option<Dataset>,
    pub meta: Metadata,
    pub globals: HashMap<String, String>,
    pub results: HashMap<String, StoredResult>,
    pub dirty: bool,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    /// Replace the active dataset wholesale. `source` is the display name
    /// recorded in the `dir` global for the describe header.
    pub fn load(&mut self, data: Dataset, meta: Metadata, source: String) {
        self.data = Some(data);
        self.meta = meta;
        self.globals.insert("dir".to_string(), source);
        self.dirty = false;
    }

    pub fn set_scalar(&mut self, name: &str, value: f64) {
        self.results
            .insert(name.to_string(), StoredResult::Scalar(value));
    }

    pub fn set_vector(&mut self, name: &str, values: Vec<f64>) {
        self.results
            .insert(name.to_string(), StoredResult::Vector(values));
    }

    pub fn scalar(&self, name: &str) -> Option<f64> {
        match self.results.get(name) {
            Some(StoredResult::Scalar(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn vector(&self, name: &str) -> Option<&[f64]> {
        match self.results.get(name) {
            Some(StoredResult::Vector(v)) => Some(v),
            _ => None,
        }
    }
}
