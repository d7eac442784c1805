pub mod error;
pub mod prepare_config;
pub mod schema;
pub mod table;

pub use error::{AppError, Result};
pub use prepare_config::{AmenityFlag, PrepareConfig};
pub use table::{DataTable, TableRow};
