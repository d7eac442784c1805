// ============================================================
// AMENITY OPERATIONS
// ============================================================
// Cleaning, derived flags, and views over the free-text amenities column

use regex::RegexBuilder;

use crate::domain::error::{AppError, Result};
use crate::domain::prepare_config::AmenityFlag;
use crate::domain::schema::COL_AMENITIES;
use crate::domain::table::DataTable;

/// Replace missing amenities with the empty string.
///
/// A table without the amenities column gets it materialized as an
/// all-empty column, so downstream stages can rely on its presence.
/// Idempotent: applying it twice equals applying it once.
pub fn fill_missing_amenities(table: &DataTable) -> Result<DataTable> {
    if table.has_column(COL_AMENITIES) {
        return Ok(table.clone());
    }

    let empty = vec![String::new(); table.row_count()];
    table.with_column(COL_AMENITIES, empty)
}

/// Append one boolean column per flag, set wherever the flag's pattern
/// occurs case-insensitively in the row's amenities text. Rows without
/// amenities text yield `false`. Flags are pure functions of the
/// amenities column and are recomputed on every pipeline run.
pub fn derive_amenity_flags(table: &DataTable, flags: &[AmenityFlag]) -> Result<DataTable> {
    let mut result = table.clone();

    for flag in flags {
        let pattern = flag.pattern.to_lowercase();
        let values: Vec<String> = table
            .rows()
            .iter()
            .map(|row| {
                let text = table.value(row, COL_AMENITIES).unwrap_or("");
                let matched = text.to_lowercase().contains(&pattern);
                matched.to_string()
            })
            .collect();

        result = result.with_column(&flag.column, values)?;
    }

    Ok(result)
}

/// Distinct amenity tokens across all rows: split on commas, trim, keep
/// first-seen order. No case folding here; "Pool" and "pool" stay
/// separate entries. Case only matters at the flag/filter stages.
pub fn explode_amenities(table: &DataTable) -> Vec<String> {
    let mut seen = Vec::new();

    let values = match table.column_values(COL_AMENITIES) {
        Some(values) => values,
        None => return seen,
    };

    for text in values {
        for token in text.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            if !seen.iter().any(|s| s == token) {
                seen.push(token.to_string());
            }
        }
    }

    seen
}

/// Keep rows whose amenities text contains ANY selected amenity as a
/// case-insensitive substring. Deliberately an OR-substring match, so a
/// selection of "Spa" retains "Spa/wellness centre". An empty selection
/// returns the table unchanged.
pub fn filter_by_amenities(table: &DataTable, selected: &[String]) -> Result<DataTable> {
    if selected.is_empty() {
        return Ok(table.clone());
    }

    let alternation = selected
        .iter()
        .map(|s| regex::escape(s))
        .collect::<Vec<_>>()
        .join("|");

    let matcher = RegexBuilder::new(&alternation)
        .case_insensitive(true)
        .build()
        .map_err(|e| AppError::ValidationError(format!("Invalid amenity selection: {}", e)))?;

    let amenities_idx = table.column_index(COL_AMENITIES);

    Ok(table.filtered(|row| {
        let text = amenities_idx.map(|idx| row.get(idx)).unwrap_or("");
        matcher.is_match(text)
    }))
}

/// Token counts across all rows, ordered by descending count; ties keep
/// first-occurrence order. Tokens are compared verbatim after trimming.
pub fn amenity_distribution(table: &DataTable) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();

    if let Some(values) = table.column_values(COL_AMENITIES) {
        for text in values {
            for token in text.split(',') {
                let token = token.trim();
                if token.is_empty() {
                    continue;
                }
                match counts.iter_mut().find(|(name, _)| name == token) {
                    Some((_, count)) => *count += 1,
                    None => counts.push((token.to_string(), 1)),
                }
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::prepare_config::PrepareConfig;
    use crate::domain::schema::{COL_HAS_POOL, COL_HAS_SPA};
    use crate::domain::table::TableRow;

    fn amenities_table(values: &[&str]) -> DataTable {
        DataTable::new(
            vec!["Name".to_string(), COL_AMENITIES.to_string()],
            values
                .iter()
                .enumerate()
                .map(|(i, v)| TableRow::new(i, vec![format!("Hotel {}", i), v.to_string()]))
                .collect(),
        )
        .unwrap()
    }

    fn bare_table(rows: usize) -> DataTable {
        DataTable::new(
            vec!["Name".to_string()],
            (0..rows)
                .map(|i| TableRow::new(i, vec![format!("Hotel {}", i)]))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_fill_materializes_absent_column() {
        let filled = fill_missing_amenities(&bare_table(2)).unwrap();
        assert!(filled.has_column(COL_AMENITIES));
        assert_eq!(filled.value(&filled.rows()[0], COL_AMENITIES), Some(""));
    }

    #[test]
    fn test_fill_is_idempotent() {
        let once = fill_missing_amenities(&bare_table(2)).unwrap();
        let twice = fill_missing_amenities(&once).unwrap();
        assert_eq!(once.headers(), twice.headers());
        for (a, b) in once.rows().iter().zip(twice.rows()) {
            assert_eq!(a.values, b.values);
        }
    }

    #[test]
    fn test_derive_flags_case_insensitive_substring() {
        let table = amenities_table(&["Spa/Wellness Centre, Gym", "Swimming pool, Bar"]);
        let flags = PrepareConfig::default().amenity_flags;
        let derived = derive_amenity_flags(&table, &flags).unwrap();

        let first = &derived.rows()[0];
        assert_eq!(derived.value(first, COL_HAS_SPA), Some("true"));
        assert_eq!(derived.value(first, COL_HAS_POOL), Some("false"));

        let second = &derived.rows()[1];
        assert_eq!(derived.value(second, COL_HAS_POOL), Some("true"));
        assert_eq!(derived.value(second, COL_HAS_SPA), Some("false"));
    }

    #[test]
    fn test_derive_flags_without_amenities_column() {
        let flags = PrepareConfig::default().amenity_flags;
        let derived = derive_amenity_flags(&bare_table(1), &flags).unwrap();
        assert_eq!(derived.value(&derived.rows()[0], COL_HAS_POOL), Some("false"));
    }

    #[test]
    fn test_explode_trims_and_preserves_case() {
        let table = amenities_table(&["Pool, Gym", "pool , Spa"]);
        assert_eq!(explode_amenities(&table), vec!["Pool", "Gym", "pool", "Spa"]);
    }

    #[test]
    fn test_explode_skips_empty_rows() {
        let table = amenities_table(&["", "Gym"]);
        assert_eq!(explode_amenities(&table), vec!["Gym"]);
    }

    #[test]
    fn test_filter_is_substring_or_match() {
        let table = amenities_table(&[
            "Spa/wellness centre, Gym",
            "Swimming pool",
            "Private beach",
        ]);

        let filtered = filter_by_amenities(
            &table,
            &["Spa".to_string(), "Swimming pool".to_string()],
        )
        .unwrap();

        assert_eq!(filtered.row_count(), 2);
        assert_eq!(filtered.rows()[0].index, 0);
        assert_eq!(filtered.rows()[1].index, 1);
    }

    #[test]
    fn test_filter_empty_selection_keeps_all_rows() {
        let table = amenities_table(&["Gym", "Spa"]);
        let filtered = filter_by_amenities(&table, &[]).unwrap();
        assert_eq!(filtered.row_count(), 2);
    }

    #[test]
    fn test_filter_escapes_regex_metacharacters() {
        let table = amenities_table(&["Rooftop (heated) pool", "Gym"]);
        let filtered =
            filter_by_amenities(&table, &["Rooftop (heated) pool".to_string()]).unwrap();
        assert_eq!(filtered.row_count(), 1);
    }

    #[test]
    fn test_distribution_orders_by_count_then_first_seen() {
        let table = amenities_table(&["Gym, Spa", "Gym, Bar", "Spa, Gym"]);
        let distribution = amenity_distribution(&table);
        assert_eq!(
            distribution,
            vec![
                ("Gym".to_string(), 3),
                ("Spa".to_string(), 2),
                ("Bar".to_string(), 1),
            ]
        );
    }
}
