// ============================================================
// TABLE PREPARER USE CASE
// ============================================================
// Orchestrate decoding, schema validation, cleaning, and derived columns

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::application::use_cases::amenities::{
    derive_amenity_flags, explode_amenities, fill_missing_amenities,
};
use crate::domain::error::{AppError, Result};
use crate::domain::prepare_config::PrepareConfig;
use crate::domain::schema::validate_schema;
use crate::domain::table::{DataTable, TableRow};
use crate::infrastructure::csv::CsvReader;

/// Result of one preparation run.
///
/// Rebuilt from scratch on every interaction; nothing here is cached or
/// mutated between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreparedTable {
    /// The cleaned table with derived boolean columns appended
    pub table: DataTable,

    /// Headers after preparation (raw headers plus derived columns)
    pub headers: Vec<String>,

    pub row_count: usize,
    pub column_count: usize,

    /// Distinct amenity tokens, first-seen order
    pub amenities: Vec<String>,

    /// First rows, for the dataset overview
    pub preview: Vec<TableRow>,

    /// Preparation time in milliseconds
    pub processing_time_ms: u64,
}

/// Table preparation use case
pub struct TablePreparer {
    config: PrepareConfig,
}

impl TablePreparer {
    /// Create a new preparer
    pub fn new(config: PrepareConfig) -> Self {
        Self { config }
    }

    /// Create with default configuration
    pub fn default_config() -> Self {
        Self::new(PrepareConfig::default())
    }

    pub fn config(&self) -> &PrepareConfig {
        &self.config
    }

    /// Prepare a table from raw upload bytes
    pub fn prepare_bytes(&self, bytes: &[u8]) -> Result<PreparedTable> {
        let start = Instant::now();
        let table = CsvReader::new().read_bytes(bytes)?;
        self.prepare_table(table, start)
    }

    /// Prepare a table from in-memory CSV content
    pub fn prepare_str(&self, content: &str) -> Result<PreparedTable> {
        let start = Instant::now();
        let table = CsvReader::new().read_str(content)?;
        self.prepare_table(table, start)
    }

    fn prepare_table(&self, table: DataTable, start: Instant) -> Result<PreparedTable> {
        self.config
            .validate()
            .map_err(|e| AppError::ValidationError(format!("Invalid prepare config: {}", e)))?;

        validate_schema(&table)?;

        let filled = fill_missing_amenities(&table)?;
        let prepared = derive_amenity_flags(&filled, &self.config.amenity_flags)?;
        let amenities = explode_amenities(&prepared);

        Ok(PreparedTable {
            headers: prepared.headers().to_vec(),
            row_count: prepared.row_count(),
            column_count: prepared.column_count(),
            amenities,
            preview: prepared.head(self.config.preview_rows),
            processing_time_ms: start.elapsed().as_millis() as u64,
            table: prepared,
        })
    }
}

impl Default for TablePreparer {
    fn default() -> Self {
        Self::default_config()
    }
}
