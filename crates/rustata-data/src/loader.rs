//! CSV dataset loading with a TOML metadata sidecar.
//!
//! CSV layout: a header row with variable names, one observation per record.
//! A cell parses as numeric when `f64::from_str` accepts it; empty cells and
//! `.` are missing. A column where every non-missing cell is numeric becomes
//! a numeric column; anything else is text.
//!
//! Sidecar layout (all keys optional):
//!
//! ```toml
//! file_label = "1978 Automobile Data"
//! notes = ["from Consumer Reports with permission"]
//!
//! [[variable]]
//! name = "make"
//! label = "Make and Model"
//! value_label = ""
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use rustata_types::error::{Result, RustataError};

use crate::dataset::{Column, ColumnData, Dataset, Metadata};

/// Parse a dataset from CSV text.
pub fn dataset_from_csv(text: &str) -> Result<Dataset> {
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record?;
        for (idx, cell) in cells.iter_mut().enumerate() {
            cell.push(record.get(idx).unwrap_or("").trim().to_string());
        }
    }
    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, raw)| Column {
            name,
            data: infer_column(raw),
        })
        .collect();
    Dataset::new(columns)
}

fn infer_column(raw: Vec<String>) -> ColumnData {
    let mut numeric = Vec::with_capacity(raw.len());
    for cell in &raw {
        if is_missing(cell) {
            numeric.push(f64::NAN);
        } else if let Ok(v) = cell.parse::<f64>() {
            numeric.push(v);
        } else {
            return ColumnData::Text(raw);
        }
    }
    ColumnData::Numeric(numeric)
}

fn is_missing(cell: &str) -> bool {
    cell.is_empty() || cell == "."
}

/// Parse a metadata sidecar. `source` names the sidecar in error messages.
pub fn metadata_from_toml(text: &str, source: &str) -> Result<Metadata> {
    #[derive(Deserialize)]
    struct MetaFile {
        #[serde(default)]
        file_label: String,
        #[serde(default)]
        notes: Vec<String>,
        #[serde(default)]
        variable: Vec<VarMeta>,
    }

    #[derive(Deserialize)]
    struct VarMeta {
        name: String,
        #[serde(default)]
        label: String,
        #[serde(default)]
        value_label: String,
    }

    let parsed: MetaFile = toml::from_str(text)
        .map_err(|e| RustataError::Metadata(format!("{source}: {e}")))?;
    let mut labels = HashMap::new();
    let mut value_labels = HashMap::new();
    for var in parsed.variable {
        if !var.label.is_empty() {
            labels.insert(var.name.clone(), var.label);
        }
        if !var.value_label.is_empty() {
            value_labels.insert(var.name, var.value_label);
        }
    }
    Ok(Metadata {
        file_label: parsed.file_label,
        labels,
        value_labels,
        notes: parsed.notes,
    })
}

/// Load `{path}` as CSV, with metadata from a `.toml` sidecar beside it when
/// one exists. A missing or unreadable CSV is a dataset-not-found failure so
/// the caller's previously loaded data stays untouched.
pub fn load_path(path: &str) -> Result<(Dataset, Metadata)> {
    let csv_text = std::fs::read_to_string(path)
        .map_err(|_| RustataError::DatasetNotFound(path.to_string()))?;
    let data = dataset_from_csv(&csv_text)?;
    let sidecar = Path::new(path).with_extension("toml");
    let meta = match std::fs::read_to_string(&sidecar) {
        Ok(text) => metadata_from_toml(&text, &sidecar.display().to_string())?,
        Err(_) => {
            log::debug!("no metadata sidecar for {path}");
            Metadata::default()
        }
    };
    log::info!(
        "loaded {path}: {} obs, {} vars",
        data.nrows(),
        data.ncols()
    );
    Ok((data, meta))
}
