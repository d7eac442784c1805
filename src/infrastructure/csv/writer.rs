// ============================================================
// CSV WRITER
// ============================================================
// Serialize a table back to comma-separated text

use std::fs;
use std::path::Path;

use csv::WriterBuilder;

use crate::domain::error::{AppError, Result};
use crate::domain::table::DataTable;

/// CSV writer for filtered exports. Writes headers plus rows, no index
/// column.
pub struct CsvWriter;

impl CsvWriter {
    /// Serialize a table to a CSV string
    pub fn to_string(table: &DataTable) -> Result<String> {
        let mut writer = WriterBuilder::new().from_writer(Vec::new());

        writer.write_record(table.headers())?;
        for row in table.rows() {
            writer.write_record(&row.values)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::IoError(format!("Failed to flush CSV writer: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::IoError(format!("Exported CSV is not valid UTF-8: {}", e)))
    }

    /// Write a table to a file on disk
    pub fn write_file(table: &DataTable, path: &Path) -> Result<()> {
        let content = Self::to_string(table)?;
        fs::write(path, content)
            .map_err(|e| AppError::IoError(format!("Failed to write {}: {}", path.display(), e)))
    }
}
