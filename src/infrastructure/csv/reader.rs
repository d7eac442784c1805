// ============================================================
// CSV READER
// ============================================================
// Decode uploaded bytes and parse strict comma-separated text

use csv::{ReaderBuilder, StringRecord};
use encoding_rs::Encoding;

use crate::domain::error::{AppError, Result};
use crate::domain::table::{DataTable, TableRow};

/// CSV reader for uploaded files.
///
/// Hotel exports are frequently not UTF-8, so bytes are decoded with a
/// Latin-1-compatible encoding before parsing. ISO-8859-1 labels resolve
/// to windows-1252 under the WHATWG encoding standard, which is what
/// `encoding_rs` provides.
pub struct CsvReader {
    /// Delimiter character (default: comma)
    delimiter: u8,

    /// Byte decoding applied before parsing
    encoding: &'static Encoding,
}

impl Default for CsvReader {
    fn default() -> Self {
        Self {
            delimiter: b',',
            encoding: encoding_rs::WINDOWS_1252,
        }
    }
}

impl CsvReader {
    /// Create a new CSV reader with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Decode raw upload bytes and parse them into a table
    pub fn read_bytes(&self, bytes: &[u8]) -> Result<DataTable> {
        let (content, _, _) = self.encoding.decode(bytes);
        self.read_str(&content)
    }

    /// Parse CSV content from a string
    pub fn read_str(&self, content: &str) -> Result<DataTable> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            // Uneven row lengths are a parse failure, not something to
            // paper over; cells keep their whitespace untouched.
            .flexible(false)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| AppError::Parse(format!("Failed to read CSV headers: {}", e)))?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AppError::Parse(format!("Failed to parse CSV row {}: {}", index + 1, e))
            })?;
            rows.push(Self::record_to_row(index, &record));
        }

        DataTable::new(headers, rows)
    }

    fn record_to_row(index: usize, record: &StringRecord) -> TableRow {
        TableRow::new(index, record.iter().map(|v| v.to_string()).collect())
    }
}
