use serde::{Deserialize, Serialize};

use super::TableRow;
use crate::domain::error::{AppError, Result};

/// Parse a cell as a number.
///
/// Accepts plain integers and floats, plus values with thousands
/// separators ("1,200"). Empty cells parse to `None` and behave like NaN
/// throughout the pipeline: they never match a range filter and never win
/// an extremum.
pub fn parse_numeric(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(parsed) = trimmed.parse::<f64>() {
        return Some(parsed);
    }

    trimmed.replace(',', "").parse::<f64>().ok()
}

/// An ordered set of headers plus rows of string cells.
///
/// Every transform in the pipeline produces a new `DataTable`; rows are
/// cloned, never mutated in place, and keep their original index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataTable {
    headers: Vec<String>,
    rows: Vec<TableRow>,
}

impl DataTable {
    /// Create a new table, checking that every row matches the header width
    pub fn new(headers: Vec<String>, rows: Vec<TableRow>) -> Result<Self> {
        let width = headers.len();
        if let Some(row) = rows.iter().find(|r| r.values.len() != width) {
            return Err(AppError::ValidationError(format!(
                "Row {} has {} cells, expected {}",
                row.index + 1,
                row.values.len(),
                width
            )));
        }
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by exact header name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell value for a row by column name
    pub fn value<'a>(&self, row: &'a TableRow, name: &str) -> Option<&'a str> {
        self.column_index(name).map(|idx| row.get(idx))
    }

    /// Numeric cell value for a row by column name
    pub fn numeric(&self, row: &TableRow, name: &str) -> Option<f64> {
        self.value(row, name).and_then(parse_numeric)
    }

    /// All cell values of one column, in row order
    pub fn column_values(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row.get(idx)).collect())
    }

    /// Whether a column holds numeric data: at least one numeric cell and
    /// no non-empty cell that fails to parse. Empty cells are allowed and
    /// treated as missing values.
    pub fn is_numeric_column(&self, name: &str) -> bool {
        let idx = match self.column_index(name) {
            Some(idx) => idx,
            None => return false,
        };

        let mut numeric_cells = 0usize;
        for row in &self.rows {
            let cell = row.get(idx);
            if cell.trim().is_empty() {
                continue;
            }
            if parse_numeric(cell).is_none() {
                return false;
            }
            numeric_cells += 1;
        }

        numeric_cells > 0
    }

    /// Names of all numeric columns, in header order
    pub fn numeric_column_names(&self) -> Vec<String> {
        self.headers
            .iter()
            .filter(|name| self.is_numeric_column(name))
            .cloned()
            .collect()
    }

    /// Return a new table with a column set to the given values.
    ///
    /// Replaces the column when the name already exists, appends it
    /// otherwise. `values` must hold exactly one cell per row.
    pub fn with_column(&self, name: &str, values: Vec<String>) -> Result<Self> {
        if values.len() != self.rows.len() {
            return Err(AppError::ValidationError(format!(
                "Column '{}' has {} values for {} rows",
                name,
                values.len(),
                self.rows.len()
            )));
        }

        let mut headers = self.headers.clone();
        let mut rows = self.rows.clone();

        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in rows.iter_mut().zip(values) {
                    row.values[idx] = value;
                }
            }
            None => {
                headers.push(name.to_string());
                for (row, value) in rows.iter_mut().zip(values) {
                    row.values.push(value);
                }
            }
        }

        Ok(Self { headers, rows })
    }

    /// Return a new table keeping only the rows the predicate accepts.
    /// Row order and original indices are preserved.
    pub fn filtered<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&TableRow) -> bool,
    {
        Self {
            headers: self.headers.clone(),
            rows: self.rows.iter().filter(|row| keep(row)).cloned().collect(),
        }
    }

    /// First `n` rows, for dataset previews
    pub fn head(&self, n: usize) -> Vec<TableRow> {
        self.rows.iter().take(n).cloned().collect()
    }
}
