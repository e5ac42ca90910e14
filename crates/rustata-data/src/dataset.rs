//! Dataset and metadata types.

use std::collections::HashMap;

use rustata_types::error::{Result, RustataError};

/// Column storage. Numeric columns use NaN as the missing-value sentinel;
/// text columns carry their cells verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<f64>),
    Text(Vec<String>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A named column of the active dataset.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<f64>) -> Self {
        Column {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    pub fn text(name: impl Into<String>, values: Vec<String>) -> Self {
        Column {
            name: name.into(),
            data: ColumnData::Text(values),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.data, ColumnData::Numeric(_))
    }

    /// Displayed storage type: `int64` for numeric columns whose finite
    /// values are all integral, `float64` for other numeric columns, and
    /// `object` for text.
    pub fn dtype(&self) -> &'static str {
        match &self.data {
            ColumnData::Numeric(v) => {
                let integral = v
                    .iter()
                    .filter(|x| x.is_finite())
                    .all(|x| x.fract() == 0.0);
                if integral { "int64" } else { "float64" }
            }
            ColumnData::Text(_) => "object",
        }
    }
}

/// The in-memory table: ordered named columns of equal length.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    columns: Vec<Column>,
}

impl Dataset {
    /// Build a dataset, checking that all columns have the same length.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let n = first.data.len();
            for col in &columns {
                if col.data.len() != n {
                    return Err(RustataError::Metadata(format!(
                        "column {} has {} rows, expected {n}",
                        col.name,
                        col.data.len()
                    )));
                }
            }
        }
        Ok(Dataset { columns })
    }

    pub fn nrows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.data.len())
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Resolve a requested variable list against the table: an empty request
    /// means every column, and every requested name must exist.
    pub fn resolve_varlist(&self, requested: &[String]) -> Result<Vec<String>> {
        if requested.is_empty() {
            return Ok(self.columns.iter().map(|c| c.name.clone()).collect());
        }
        for name in requested {
            if self.column(name).is_none() {
                return Err(RustataError::Syntax(format!("variable {name} not found")));
            }
        }
        Ok(requested.to_vec())
    }

    /// Approximate in-memory size in bytes: eight bytes per numeric cell
    /// plus the byte length of every text cell.
    pub fn approx_size(&self) -> usize {
        self.columns
            .iter()
            .map(|c| match &c.data {
                ColumnData::Numeric(v) => v.len() * 8,
                ColumnData::Text(v) => v.iter().map(String::len).sum(),
            })
            .sum()
    }
}

/// Dataset metadata from the sidecar: a file label, per-variable labels and
/// value-label names, and free-text notes.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    pub file_label: String,
    pub labels: HashMap<String, String>,
    pub value_labels: HashMap<String, String>,
    pub notes: Vec<String>,
}

impl Metadata {
    pub fn label_for(&self, var: &str) -> &str {
        self.labels.get(var).map_or("", String::as_str)
    }

    pub fn value_label_for(&self, var: &str) -> &str {
        self.value_labels.get(var).map_or("", String::as_str)
    }
}
