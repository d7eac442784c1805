// Expected column layout for the hotel dataset.
//
// Goal: one schema constant and one validation pass instead of scattered
// per-operation column existence checks.

use crate::domain::error::{AppError, Result};
use crate::domain::table::DataTable;

pub const COL_NAME: &str = "Name";
pub const COL_LOCATION: &str = "Location";
pub const COL_STARTING_RATE: &str = "Starting Rate in ($)";
pub const COL_TOTAL_ROOMS: &str = "Total Rooms";
pub const COL_DINING_AREA: &str = "Dining Area";

// NOTE: "Ammenties" is the dataset's own header spelling; keep it verbatim.
pub const COL_AMENITIES: &str = "Hotel Ammenties";

pub const COL_HAS_POOL: &str = "Has Swimming Pool";
pub const COL_HAS_SPA: &str = "Has Spa";

/// Columns every upload must carry. `Dining Area` and `Hotel Ammenties`
/// are optional; an absent amenities column is filled with empty strings
/// during preparation.
pub const REQUIRED_COLUMNS: &[&str] = &[
    COL_NAME,
    COL_LOCATION,
    COL_STARTING_RATE,
    COL_TOTAL_ROOMS,
];

/// Derived boolean columns: (column name, case-insensitive substring
/// matched against the amenities free text).
pub const AMENITY_FLAGS: &[(&str, &str)] = &[
    (COL_HAS_POOL, "Swimming pool"),
    (COL_HAS_SPA, "spa/wellness centre"),
];

/// Check that all required columns are present. Pure presence check, no
/// type coercion. Missing columns are reported in `REQUIRED_COLUMNS`
/// order.
pub fn validate_schema(table: &DataTable) -> Result<()> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !table.has_column(col))
        .map(|col| col.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::Schema(missing))
    }
}
