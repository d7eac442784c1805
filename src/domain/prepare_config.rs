// ============================================================
// PREPARATION CONFIGURATION
// ============================================================
// Configuration values for table preparation and derived views

use serde::{Deserialize, Serialize};

use crate::domain::schema;

/// One derived boolean column: `column` is appended to the prepared table,
/// set wherever `pattern` occurs case-insensitively in the amenities text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmenityFlag {
    pub column: String,
    pub pattern: String,
}

impl AmenityFlag {
    pub fn new(column: &str, pattern: &str) -> Self {
        Self {
            column: column.to_string(),
            pattern: pattern.to_string(),
        }
    }
}

/// Configuration for the preparation pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepareConfig {
    /// Derived boolean columns computed from the amenities text
    pub amenity_flags: Vec<AmenityFlag>,

    /// Cutoff for "top N" rankings (default: 5)
    pub top_n: usize,

    /// Number of rows returned in dataset previews (default: 5)
    pub preview_rows: usize,

    /// File name used when exporting a filtered table (default:
    /// "filtered_data.csv")
    pub export_file_name: String,
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            amenity_flags: schema::AMENITY_FLAGS
                .iter()
                .map(|(column, pattern)| AmenityFlag::new(column, pattern))
                .collect(),
            top_n: 5,
            preview_rows: 5,
            export_file_name: "filtered_data.csv".to_string(),
        }
    }
}

impl PrepareConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.top_n == 0 {
            return Err("top_n must be > 0".to_string());
        }
        if self.preview_rows == 0 {
            return Err("preview_rows must be > 0".to_string());
        }
        if self.export_file_name.trim().is_empty() {
            return Err("export_file_name must not be empty".to_string());
        }
        for flag in &self.amenity_flags {
            if flag.column.trim().is_empty() || flag.pattern.trim().is_empty() {
                return Err("amenity flags need a column name and a pattern".to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PrepareConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_flags_cover_pool_and_spa() {
        let config = PrepareConfig::default();
        let columns: Vec<&str> = config
            .amenity_flags
            .iter()
            .map(|f| f.column.as_str())
            .collect();
        assert_eq!(columns, vec![schema::COL_HAS_POOL, schema::COL_HAS_SPA]);
    }

    #[test]
    fn test_validate_rejects_zero_top_n() {
        let config = PrepareConfig {
            top_n: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_flag() {
        let config = PrepareConfig {
            amenity_flags: vec![AmenityFlag::new("", "pool")],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
