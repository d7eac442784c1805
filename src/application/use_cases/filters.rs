// ============================================================
// RANGE FILTERS AND EXTREMA
// ============================================================

use serde::{Deserialize, Serialize};

use crate::domain::error::{AppError, Result};
use crate::domain::table::{DataTable, TableRow};

/// Direction for an extremum lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Min,
    Max,
}

/// Keep rows whose numeric value of `field` lies in the inclusive range
/// `[min, max]`. Cells that are empty or not numeric never match, so
/// they drop out of the filtered view. `min > max` is a caller error.
pub fn filter_by_range(table: &DataTable, field: &str, min: f64, max: f64) -> Result<DataTable> {
    let idx = table
        .column_index(field)
        .ok_or_else(|| AppError::Schema(vec![field.to_string()]))?;

    if min > max {
        return Err(AppError::Range { min, max });
    }

    Ok(table.filtered(|row| {
        crate::domain::table::parse_numeric(row.get(idx))
            .map(|value| value >= min && value <= max)
            .unwrap_or(false)
    }))
}

/// The row holding the minimal or maximal numeric value of `field`.
/// Ties return the first occurrence in table order. A table with no rows,
/// or no numeric cells in `field`, cannot produce an extremum.
pub fn extremum(table: &DataTable, field: &str, direction: Direction) -> Result<TableRow> {
    let idx = table
        .column_index(field)
        .ok_or_else(|| AppError::Schema(vec![field.to_string()]))?;

    if table.is_empty() {
        return Err(AppError::EmptyTable(format!(
            "Cannot take the {:?} of '{}' over zero rows",
            direction, field
        )));
    }

    let mut best: Option<(f64, &TableRow)> = None;
    for row in table.rows() {
        let value = match crate::domain::table::parse_numeric(row.get(idx)) {
            Some(value) => value,
            None => continue,
        };

        // Strict comparison so earlier rows win ties.
        let better = match best {
            None => true,
            Some((current, _)) => match direction {
                Direction::Min => value < current,
                Direction::Max => value > current,
            },
        };

        if better {
            best = Some((value, row));
        }
    }

    best.map(|(_, row)| row.clone()).ok_or_else(|| {
        AppError::EmptyTable(format!("Column '{}' has no numeric values", field))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rates_table(rates: &[&str]) -> DataTable {
        DataTable::new(
            vec!["Name".to_string(), "Starting Rate in ($)".to_string()],
            rates
                .iter()
                .enumerate()
                .map(|(i, r)| TableRow::new(i, vec![format!("Hotel {}", i), r.to_string()]))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_range_filter_is_inclusive() {
        let table = rates_table(&["100", "250", "500", "501"]);
        let filtered = filter_by_range(&table, "Starting Rate in ($)", 100.0, 500.0).unwrap();
        assert_eq!(filtered.row_count(), 3);
        assert_eq!(filtered.rows()[2].index, 2);
    }

    #[test]
    fn test_range_filter_rejects_inverted_bounds() {
        let table = rates_table(&["100"]);
        let result = filter_by_range(&table, "Starting Rate in ($)", 500.0, 100.0);
        match result {
            Err(AppError::Range { min, max }) => {
                assert_eq!(min, 500.0);
                assert_eq!(max, 100.0);
            }
            other => panic!("expected range error, got {:?}", other),
        }
    }

    #[test]
    fn test_range_filter_skips_non_numeric_cells() {
        let table = rates_table(&["100", "", "n/a", "300"]);
        let filtered = filter_by_range(&table, "Starting Rate in ($)", 0.0, 1000.0).unwrap();
        assert_eq!(filtered.row_count(), 2);
    }

    #[test]
    fn test_range_filter_unknown_field() {
        let table = rates_table(&["100"]);
        let result = filter_by_range(&table, "Rooms", 0.0, 10.0);
        assert!(matches!(result, Err(AppError::Schema(_))));
    }

    #[test]
    fn test_extremum_max_and_min() {
        let table = rates_table(&["120", "999", "45"]);

        let most = extremum(&table, "Starting Rate in ($)", Direction::Max).unwrap();
        assert_eq!(most.index, 1);

        let least = extremum(&table, "Starting Rate in ($)", Direction::Min).unwrap();
        assert_eq!(least.index, 2);
    }

    #[test]
    fn test_extremum_tie_returns_first_occurrence() {
        let table = rates_table(&["999", "999", "45"]);
        let most = extremum(&table, "Starting Rate in ($)", Direction::Max).unwrap();
        assert_eq!(most.index, 0);
    }

    #[test]
    fn test_extremum_on_empty_table() {
        let table = rates_table(&[]);
        let result = extremum(&table, "Starting Rate in ($)", Direction::Max);
        assert!(matches!(result, Err(AppError::EmptyTable(_))));
    }

    #[test]
    fn test_extremum_without_numeric_values() {
        let table = rates_table(&["", "n/a"]);
        let result = extremum(&table, "Starting Rate in ($)", Direction::Min);
        assert!(matches!(result, Err(AppError::EmptyTable(_))));
    }
}
