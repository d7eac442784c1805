// ============================================================
// DERIVED AGGREGATES
// ============================================================
// Summary statistics, group-by views, rankings, and the correlation
// matrix consumed by the chart layer

use serde::{Deserialize, Serialize};

use crate::domain::error::{AppError, Result};
use crate::domain::table::DataTable;

/// Summary statistics of one numeric column.
///
/// `std` is the sample standard deviation (n - 1) and is absent for a
/// single observation. Quantiles use linear interpolation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// One group-by result entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupStat {
    pub key: String,
    pub value: f64,
}

/// Numeric values of a field split by a derived boolean column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagSplit {
    pub flag_column: String,
    pub with_flag: Vec<f64>,
    pub without_flag: Vec<f64>,
}

/// Pearson correlation coefficients over every pair of numeric columns.
/// `values[i][j]` is the coefficient between `columns[i]` and
/// `columns[j]`; undefined entries (zero variance, fewer than two
/// complete observations) are `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

/// Summary statistics for every numeric column of the table
pub fn describe(table: &DataTable) -> Vec<ColumnSummary> {
    table
        .numeric_column_names()
        .into_iter()
        .filter_map(|column| summarize_column(table, &column))
        .collect()
}

fn summarize_column(table: &DataTable, column: &str) -> Option<ColumnSummary> {
    let mut values = numeric_values(table, column);
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let std = if count > 1 {
        let variance =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        Some(variance.sqrt())
    } else {
        None
    };

    Some(ColumnSummary {
        column: column.to_string(),
        count,
        mean,
        std,
        min: values[0],
        q25: quantile(&values, 0.25),
        median: quantile(&values, 0.5),
        q75: quantile(&values, 0.75),
        max: values[count - 1],
    })
}

/// Parseable numeric values of one column, in row order. Empty and
/// non-numeric cells are skipped.
fn numeric_values(table: &DataTable, column: &str) -> Vec<f64> {
    let idx = match table.column_index(column) {
        Some(idx) => idx,
        None => return Vec::new(),
    };
    table
        .rows()
        .iter()
        .filter_map(|row| crate::domain::table::parse_numeric(row.get(idx)))
        .collect()
}

/// Linear-interpolation quantile over an ascending-sorted slice
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }

    let position = q * (n - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;

    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

/// Mean of `value_field` per distinct `key_field` value, groups ordered
/// by key. Rows whose value cell is not numeric are skipped; groups with
/// no numeric values at all are dropped.
pub fn group_mean(table: &DataTable, key_field: &str, value_field: &str) -> Result<Vec<GroupStat>> {
    grouped(table, key_field, value_field, |values| {
        values.iter().sum::<f64>() / values.len() as f64
    })
}

/// Maximum of `value_field` per distinct `key_field` value, groups
/// ordered by key
pub fn group_max(table: &DataTable, key_field: &str, value_field: &str) -> Result<Vec<GroupStat>> {
    grouped(table, key_field, value_field, |values| {
        values.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
    })
}

fn grouped<F>(
    table: &DataTable,
    key_field: &str,
    value_field: &str,
    aggregate: F,
) -> Result<Vec<GroupStat>>
where
    F: Fn(&[f64]) -> f64,
{
    let key_idx = table
        .column_index(key_field)
        .ok_or_else(|| AppError::Schema(vec![key_field.to_string()]))?;
    let value_idx = table
        .column_index(value_field)
        .ok_or_else(|| AppError::Schema(vec![value_field.to_string()]))?;

    let mut groups: Vec<(String, Vec<f64>)> = Vec::new();
    for row in table.rows() {
        let value = match crate::domain::table::parse_numeric(row.get(value_idx)) {
            Some(value) => value,
            None => continue,
        };
        let key = row.get(key_idx);
        match groups.iter_mut().find(|(name, _)| name == key) {
            Some((_, values)) => values.push(value),
            None => groups.push((key.to_string(), vec![value])),
        }
    }

    groups.sort_by(|a, b| a.0.cmp(&b.0));

    Ok(groups
        .into_iter()
        .map(|(key, values)| GroupStat {
            key,
            value: aggregate(&values),
        })
        .collect())
}

/// First `n` entries by descending value. The sort is stable, so ties at
/// the cutoff keep the incoming order; everything past `n` is dropped.
pub fn top_n(mut entries: Vec<GroupStat>, n: usize) -> Vec<GroupStat> {
    entries.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    entries.truncate(n);
    entries
}

/// Numeric values of `value_field` split by a derived boolean column
pub fn rates_by_flag(table: &DataTable, flag_column: &str, value_field: &str) -> Result<FlagSplit> {
    let flag_idx = table
        .column_index(flag_column)
        .ok_or_else(|| AppError::Schema(vec![flag_column.to_string()]))?;
    let value_idx = table
        .column_index(value_field)
        .ok_or_else(|| AppError::Schema(vec![value_field.to_string()]))?;

    let mut with_flag = Vec::new();
    let mut without_flag = Vec::new();

    for row in table.rows() {
        let value = match crate::domain::table::parse_numeric(row.get(value_idx)) {
            Some(value) => value,
            None => continue,
        };
        if row.get(flag_idx).eq_ignore_ascii_case("true") {
            with_flag.push(value);
        } else {
            without_flag.push(value);
        }
    }

    Ok(FlagSplit {
        flag_column: flag_column.to_string(),
        with_flag,
        without_flag,
    })
}

/// Pearson correlation over every pair of numeric columns, using
/// pairwise-complete observations. The diagonal is 1.0.
pub fn correlation_matrix(table: &DataTable) -> CorrelationMatrix {
    let columns = table.numeric_column_names();
    let series: Vec<Vec<Option<f64>>> = columns
        .iter()
        .map(|column| {
            let idx = table.column_index(column).unwrap_or(usize::MAX);
            table
                .rows()
                .iter()
                .map(|row| crate::domain::table::parse_numeric(row.get(idx)))
                .collect()
        })
        .collect();

    let mut values = vec![vec![None; columns.len()]; columns.len()];
    for i in 0..columns.len() {
        for j in 0..columns.len() {
            if i == j {
                values[i][j] = Some(1.0);
                continue;
            }

            let pairs: Vec<(f64, f64)> = series[i]
                .iter()
                .zip(&series[j])
                .filter_map(|(a, b)| a.zip(*b))
                .collect();
            values[i][j] = pearson(&pairs);
        }
    }

    CorrelationMatrix { columns, values }
}

fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    let n = pairs.len();
    if n < 2 {
        return None;
    }

    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n as f64;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n as f64;

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    Some(covariance / (var_x.sqrt() * var_y.sqrt()))
}
