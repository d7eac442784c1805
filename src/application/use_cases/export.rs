// ============================================================
// FILTERED EXPORT
// ============================================================
// Serialize the current filtered view to a CSV file on disk

use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

use crate::domain::error::Result;
use crate::domain::table::DataTable;
use crate::infrastructure::csv::CsvWriter;

static FILE_NAME_SANITIZER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]+").unwrap());

/// Reduce a configured export name to a safe file name
fn sanitize_file_name(name: &str) -> String {
    let sanitized = FILE_NAME_SANITIZER.replace_all(name.trim(), "_").to_string();
    if sanitized.is_empty() {
        "filtered_data.csv".to_string()
    } else {
        sanitized
    }
}

/// Write a table to `<dir>/<file_name>` as CSV, creating the directory
/// on demand. Returns the written path; callers surface only a success
/// notice.
pub fn export_table(table: &DataTable, dir: &Path, file_name: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let path = dir.join(sanitize_file_name(file_name));
    CsvWriter::write_file(table, &path)?;

    info!(
        path = %path.display(),
        rows = table.row_count(),
        "Exported filtered table"
    );
    Ok(path)
}
