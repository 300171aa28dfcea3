//! Null counts, column metadata and descriptive statistics of a raw table.

use crate::data::loader::RawTable;
use crate::features::basic::{maximum, mean, minimum, quantile, standard_deviation};
use std::fmt;

/// Storage type a column would take when read by a dataframe library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DType {
    Int64,
    Float64,
    Object,
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::Int64 => "int64",
            DType::Float64 => "float64",
            DType::Object => "object",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub non_null: usize,
    pub dtype: DType,
}

/// `count mean std min 25% 50% 75% max` for one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

/// Number of empty cells per column, in header order.
pub fn null_counts(table: &RawTable) -> Vec<(String, usize)> {
    table
        .headers
        .iter()
        .enumerate()
        .map(|(i, name)| (name.clone(), table.column(i).filter(|c| c.is_none()).count()))
        .collect()
}

/// Infer a column type from its non-empty cells.
///
/// Integers with gaps widen to `Float64`; a column with no values at all is
/// `Float64` unless the table has no rows.
pub fn infer_dtype<'a>(cells: impl Iterator<Item = Option<&'a str>>) -> DType {
    let mut rows = 0;
    let mut nulls = 0;
    let mut all_int = true;
    let mut all_float = true;
    for cell in cells {
        rows += 1;
        match cell {
            None => nulls += 1,
            Some(text) => {
                all_int &= text.parse::<i64>().is_ok();
                all_float &= text.parse::<f64>().is_ok();
            }
        }
    }
    if rows == 0 {
        DType::Object
    } else if all_int && nulls == 0 {
        DType::Int64
    } else if all_float {
        DType::Float64
    } else {
        DType::Object
    }
}

pub fn column_info(table: &RawTable) -> Vec<ColumnInfo> {
    table
        .headers
        .iter()
        .enumerate()
        .map(|(i, name)| ColumnInfo {
            name: name.clone(),
            non_null: table.column(i).filter(|c| c.is_some()).count(),
            dtype: infer_dtype(table.column(i)),
        })
        .collect()
}

/// Descriptive statistics of every numeric column.
pub fn describe(table: &RawTable) -> Vec<ColumnStats> {
    table
        .headers
        .iter()
        .enumerate()
        .filter(|(i, _)| infer_dtype(table.column(*i)) != DType::Object)
        .map(|(i, name)| {
            let values: Vec<f64> = table
                .column(i)
                .flatten()
                .filter_map(|text| text.parse::<f64>().ok())
                .collect();
            ColumnStats {
                name: name.clone(),
                count: values.len(),
                mean: mean(&values),
                std: standard_deviation(&values),
                min: minimum(&values),
                q25: quantile(&values, 0.25),
                q50: quantile(&values, 0.5),
                q75: quantile(&values, 0.75),
                max: maximum(&values),
            }
        })
        .collect()
}
