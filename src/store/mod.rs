//! SQLite persistence for reports, their raw actions, and the emitted
//! records.

pub mod migrations;
pub mod repo;

pub use migrations::init_db;
pub use repo::Repository;

/// Lifecycle state of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStatus {
    Generating,
    Ready,
    Failed,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Generating => "generating",
            ReportStatus::Ready => "ready",
            ReportStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "generating" => Some(ReportStatus::Generating),
            "ready" => Some(ReportStatus::Ready),
            "failed" => Some(ReportStatus::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
