pub mod app;
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;

pub use application::{PreparedTable, TablePreparer};
pub use domain::{AppError, DataTable, PrepareConfig, Result, TableRow};
