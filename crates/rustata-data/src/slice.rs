//! Row slicing: `in`-range, `if`-filter, and `by`-group partitioning.

use std::collections::HashMap;

use rustata_types::error::{Result, RustataError};

use crate::dataset::{Column, ColumnData, Dataset};
use crate::filter::FilterExpr;

/// A set of row indices into the active dataset, tagged with a group key
/// when produced by `by`-splitting. Subsets live for one command invocation.
#[derive(Debug, Clone)]
pub struct DataSubset {
    pub indices: Vec<usize>,
    pub key: Option<String>,
}

impl DataSubset {
    /// A subset covering every row of the table.
    pub fn all(data: &Dataset) -> DataSubset {
        DataSubset {
            indices: (0..data.nrows()).collect(),
            key: None,
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The non-missing numeric values of `column` within this subset, in row
    /// order. Text columns contribute no eligible observations.
    pub fn numeric_clean(&self, column: &Column) -> Vec<f64> {
        match &column.data {
            ColumnData::Numeric(values) => self
                .indices
                .iter()
                .map(|&row| values[row])
                .filter(|v| !v.is_nan())
                .collect(),
            ColumnData::Text(_) => Vec::new(),
        }
    }
}

/// Apply range, filter, and grouping in that order, producing the subsets a
/// command runs over. Without `by` the result is exactly one subset.
pub fn slice(
    data: &Dataset,
    range: Option<(usize, usize)>,
    filter: Option<&str>,
    by: Option<&[String]>,
) -> Result<Vec<DataSubset>> {
    let mut indices: Vec<usize> = match range {
        Some((start, end)) => {
            if start == 0 || start > end || end > data.nrows() {
                return Err(RustataError::syntax("observation numbers out of range"));
            }
            (start - 1..end).collect()
        }
        None => (0..data.nrows()).collect(),
    };

    if let Some(src) = filter {
        let expr = FilterExpr::compile(src, data)?;
        indices.retain(|&row| expr.matches(data, row));
    }

    let Some(group_vars) = by else {
        return Ok(vec![DataSubset {
            indices,
            key: None,
        }]);
    };

    let mut columns = Vec::with_capacity(group_vars.len());
    for name in group_vars {
        let column = data
            .column(name)
            .ok_or_else(|| RustataError::Syntax(format!("variable {name} not found")))?;
        columns.push(column);
    }

    // Partition in first-encounter order; rows with a missing group value
    // are dropped.
    let mut order: Vec<(String, Vec<usize>)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    'rows: for row in indices {
        let mut parts = Vec::with_capacity(columns.len());
        for column in &columns {
            match group_value(column, row) {
                Some(value) => parts.push(format!("{} = {}", column.name, value)),
                None => continue 'rows,
            }
        }
        let key = parts.join(", ");
        match positions.get(&key) {
            Some(&pos) => order[pos].1.push(row),
            None => {
                positions.insert(key.clone(), order.len());
                order.push((key, vec![row]));
            }
        }
    }

    Ok(order
        .into_iter()
        .map(|(key, indices)| DataSubset {
            indices,
            key: Some(key),
        })
        .collect())
}

/// Display form of a grouping value; `None` when the value is missing.
fn group_value(column: &Column, row: usize) -> Option<String> {
    match &column.data {
        ColumnData::Numeric(values) => {
            let v = values[row];
            if v.is_nan() {
                None
            } else if v.fract() == 0.0 && v.abs() < 1e15 {
                Some(format!("{}", v as i64))
            } else {
                Some(format!("{v}"))
            }
        }
        ColumnData::Text(values) => Some(values[row].clone()),
    }
}

/// Gather the named variables over a subset with listwise deletion: any row
/// missing a value in one of them is dropped from all of them. The result is
/// one cleaned column per requested variable, all of equal length.
pub fn listwise_numeric(
    data: &Dataset,
    subset: &DataSubset,
    vars: &[String],
) -> Result<Vec<Vec<f64>>> {
    let mut sources = Vec::with_capacity(vars.len());
    for name in vars {
        let column = data
            .column(name)
            .ok_or_else(|| RustataError::Syntax(format!("variable {name} not found")))?;
        match &column.data {
            ColumnData::Numeric(values) => sources.push(values),
            ColumnData::Text(_) => {
                return Err(RustataError::Syntax(format!(
                    "string variables not allowed: {name}"
                )));
            }
        }
    }
    let mut out = vec![Vec::new(); vars.len()];
    for &row in &subset.indices {
        if sources.iter().any(|v| v[row].is_nan()) {
            continue;
        }
        for (dst, src) in out.iter_mut().zip(&sources) {
            dst.push(src[row]);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new(vec![
            Column::numeric("x", vec![1.0, 2.0, 3.0, 4.0, 5.0]),
            Column::numeric("w", vec![10.0, f64::NAN, 30.0, 40.0, f64::NAN]),
            Column::text(
                "g",
                vec!["b".into(), "a".into(), "b".into(), "a".into(), "b".into()],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn no_clauses_yields_one_full_subset() {
        let data = sample();
        let subs = slice(&data, None, None, None).unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].len(), 5);
        assert!(subs[0].key.is_none());
    }

    #[test]
    fn range_is_one_indexed_inclusive() {
        let data = sample();
        let subs = slice(&data, Some((2, 4)), None, None).unwrap();
        assert_eq!(subs[0].indices, vec![1, 2, 3]);
    }

    #[test]
    fn range_identity_law() {
        let data = sample();
        let subs = slice(&data, Some((1, data.nrows())), None, None).unwrap();
        assert_eq!(subs[0].len(), data.nrows());
    }

    #[test]
    fn range_out_of_bounds() {
        let data = sample();
        for bad in [(0, 3), (4, 2), (1, 6)] {
            let err = slice(&data, Some(bad), None, None).unwrap_err();
            assert_eq!(format!("{err}"), "observation numbers out of range");
        }
    }

    #[test]
    fn filter_restricts_rows() {
        let data = sample();
        let subs = slice(&data, None, Some("x > 2"), None).unwrap();
        assert_eq!(subs[0].indices, vec![2, 3, 4]);
    }

    #[test]
    fn range_applies_before_filter() {
        let data = sample();
        let subs = slice(&data, Some((1, 3)), Some("x > 1"), None).unwrap();
        assert_eq!(subs[0].indices, vec![1, 2]);
    }

    #[test]
    fn groups_in_first_encounter_order() {
        let data = sample();
        let subs = slice(&data, None, None, Some(&["g".into()])).unwrap();
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].key.as_deref(), Some("g = b"));
        assert_eq!(subs[0].indices, vec![0, 2, 4]);
        assert_eq!(subs[1].key.as_deref(), Some("g = a"));
        assert_eq!(subs[1].indices, vec![1, 3]);
    }

    #[test]
    fn missing_group_values_dropped() {
        let data = sample();
        let subs = slice(&data, None, None, Some(&["w".into()])).unwrap();
        // Rows 1 and 4 have missing w and belong to no group.
        assert_eq!(subs.len(), 3);
        assert_eq!(subs[0].key.as_deref(), Some("w = 10"));
        assert_eq!(subs[1].key.as_deref(), Some("w = 30"));
        assert_eq!(subs[2].key.as_deref(), Some("w = 40"));
    }

    #[test]
    fn multi_variable_group_key() {
        let data = sample();
        let subs = slice(&data, None, None, Some(&["g".into(), "w".into()])).unwrap();
        assert_eq!(subs[0].key.as_deref(), Some("g = b, w = 10"));
    }

    #[test]
    fn unknown_group_variable() {
        let data = sample();
        let err = slice(&data, None, None, Some(&["z".into()])).unwrap_err();
        assert_eq!(format!("{err}"), "variable z not found");
    }

    #[test]
    fn numeric_clean_drops_missing() {
        let data = sample();
        let sub = DataSubset::all(&data);
        assert_eq!(sub.numeric_clean(data.column("w").unwrap()), vec![10.0, 30.0, 40.0]);
        assert!(sub.numeric_clean(data.column("g").unwrap()).is_empty());
    }

    #[test]
    fn listwise_deletion_drops_rows_with_any_missing() {
        let data = sample();
        let sub = DataSubset::all(&data);
        let cols = listwise_numeric(&data, &sub, &["x".into(), "w".into()]).unwrap();
        assert_eq!(cols[0], vec![1.0, 3.0, 4.0]);
        assert_eq!(cols[1], vec![10.0, 30.0, 40.0]);
    }

    #[test]
    fn listwise_rejects_text_columns() {
        let data = sample();
        let sub = DataSubset::all(&data);
        let err = listwise_numeric(&data, &sub, &["x".into(), "g".into()]).unwrap_err();
        assert_eq!(format!("{err}"), "string variables not allowed: g");
    }
}
