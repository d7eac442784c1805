pub mod aggregates;
pub mod amenities;
pub mod export;
pub mod filters;
pub mod preparer;
