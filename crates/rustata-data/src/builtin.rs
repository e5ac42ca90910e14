//! Shipped example datasets, embedded in the binary.

use rustata_types::error::Result;

use crate::dataset::{Dataset, Metadata};
use crate::loader;

const AUTO_CSV: &str = include_str!("../../../data/auto.csv");
const AUTO_TOML: &str = include_str!("../../../data/auto.toml");
const LIFEEXP_CSV: &str = include_str!("../../../data/lifeexp.csv");
const LIFEEXP_TOML: &str = include_str!("../../../data/lifeexp.toml");

/// Stems of the shipped datasets, in listing order.
pub fn builtin_names() -> &'static [&'static str] {
    &["auto", "lifeexp"]
}

fn load_builtin(stem: &str) -> Option<Result<(Dataset, Metadata)>> {
    let (csv_text, toml_text) = match stem {
        "auto" => (AUTO_CSV, AUTO_TOML),
        "lifeexp" => (LIFEEXP_CSV, LIFEEXP_TOML),
        _ => return None,
    };
    let load = || {
        let data = loader::dataset_from_csv(csv_text)?;
        let meta = loader::metadata_from_toml(toml_text, stem)?;
        Ok((data, meta))
    };
    Some(load())
}

/// Resolve a dataset by name.
///
/// Resolution order:
/// 1. Shipped dataset stem (`auto`, also accepted as `auto.dta`/`auto.csv`)
/// 2. `{stem}.csv` on the filesystem, with an optional `{stem}.toml` sidecar
///
/// Returns the table, its metadata, and the display source (`{stem}.csv`).
pub fn resolve_dataset(name: &str) -> Result<(Dataset, Metadata, String)> {
    let stem = name
        .strip_suffix(".dta")
        .or_else(|| name.strip_suffix(".csv"))
        .unwrap_or(name);
    if let Some(loaded) = load_builtin(stem) {
        let (data, meta) = loaded?;
        log::info!(
            "loaded shipped dataset {stem}: {} obs, {} vars",
            data.nrows(),
            data.ncols()
        );
        return Ok((data, meta, format!("{stem}.csv")));
    }
    let path = format!("{stem}.csv");
    let (data, meta) = loader::load_path(&path)?;
    Ok((data, meta, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_dataset_loads() {
        let (data, meta, source) = resolve_dataset("auto").unwrap();
        assert_eq!(source, "auto.csv");
        assert_eq!(meta.file_label, "1978 Automobile Data");
        assert_eq!(data.ncols(), 12);
        assert_eq!(data.nrows(), 74);
        assert_eq!(data.column("make").unwrap().dtype(), "object");
        assert_eq!(data.column("gear_ratio").unwrap().dtype(), "float64");
        assert_eq!(meta.value_label_for("foreign"), "origin");
        assert!(!meta.notes.is_empty());
    }

    #[test]
    fn auto_rep78_has_five_missing_cells() {
        let (data, ..) = resolve_dataset("auto").unwrap();
        let sub = crate::slice::DataSubset::all(&data);
        let rep78 = sub.numeric_clean(data.column("rep78").unwrap());
        assert_eq!(rep78.len(), 69);
    }

    #[test]
    fn extension_variants_hit_the_same_builtin() {
        let (a, ..) = resolve_dataset("auto").unwrap();
        let (b, ..) = resolve_dataset("auto.dta").unwrap();
        let (c, ..) = resolve_dataset("auto.csv").unwrap();
        assert_eq!(a.nrows(), b.nrows());
        assert_eq!(a.nrows(), c.nrows());
    }

    #[test]
    fn lifeexp_has_missing_cells_and_no_notes() {
        let (data, meta, _) = resolve_dataset("lifeexp").unwrap();
        assert_eq!(meta.file_label, "Life expectancy, 1998");
        assert!(meta.notes.is_empty());
        let sub = crate::slice::DataSubset::all(&data);
        let gnppc = sub.numeric_clean(data.column("gnppc").unwrap());
        assert!(gnppc.len() < data.nrows());
    }

    #[test]
    fn unknown_name_reports_csv_file() {
        let err = resolve_dataset("census").unwrap_err();
        assert_eq!(format!("{err}"), "file \"census.csv\" not found");
    }
}
