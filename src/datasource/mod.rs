//! Data source abstraction for fetching wallet action history.

use crate::domain::Action;
use async_trait::async_trait;
use std::fmt;

pub mod midgard;
pub mod mock;

pub use midgard::MidgardSource;
pub use mock::MockActionSource;

/// One page of a wallet's action history. `count` is the total number of
/// actions matching the query, not the page size; pagination stops once
/// `offset` reaches it.
#[derive(Debug, Clone, Default)]
pub struct ActionPage {
    pub count: u64,
    pub actions: Vec<Action>,
}

/// Source of wallet action history.
///
/// Implementations must handle retry/backoff and rate limiting; callers
/// drive pagination through `offset`.
#[async_trait]
pub trait ActionSource: Send + Sync + fmt::Debug {
    /// Fetch one page of actions for a set of wallets.
    ///
    /// # Arguments
    /// * `wallets` - normalized wallet addresses, comma-joined into the query
    /// * `offset` - number of actions already fetched
    async fn fetch_actions(
        &self,
        wallets: &[String],
        offset: u64,
    ) -> Result<ActionPage, DataSourceError>;
}

/// Error type for data source operations.
#[derive(Debug, Clone)]
pub enum DataSourceError {
    /// Network error (e.g., connection timeout, DNS failure)
    NetworkError(String),
    /// HTTP error (e.g., 429 rate limit, 5xx server error)
    HttpError { status: u16, message: String },
    /// Parsing error (invalid JSON or malformed response)
    ParseError(String),
    /// Rate limit exceeded (caller should implement backoff)
    RateLimited,
    /// Other error
    Other(String),
}

impl fmt::Display for DataSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSourceError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            DataSourceError::HttpError { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            DataSourceError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            DataSourceError::RateLimited => write!(f, "Rate limited"),
            DataSourceError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for DataSourceError {}
