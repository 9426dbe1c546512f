//! Report generation orchestration: fetch, store, process, finalize.

pub mod runner;
pub mod wallets;

pub use runner::{ReportError, ReportRunner};
pub use wallets::{normalize_addresses, report_key};
