//! CoinTracking CSV export.

pub mod cointracking;

pub use cointracking::{records_to_csv, ExportError};
