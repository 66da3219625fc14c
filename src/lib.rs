pub mod batch;
pub mod cli;
pub mod dicom;
pub mod display;
pub mod display_metadata;
pub mod image;
pub mod interactive;
pub mod measurement;
pub mod payload;
pub mod series;
pub mod session;
pub mod types;
pub mod viewport;

// Re-export commonly used functions
pub use display_metadata::print_metadata;
