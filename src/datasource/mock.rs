//! Mock action source for testing without network calls.

use super::{ActionPage, ActionSource, DataSourceError};
use crate::domain::Action;
use async_trait::async_trait;

/// Mock action source that serves a fixed action list, paginated the way
/// Midgard paginates.
#[derive(Debug, Clone)]
pub struct MockActionSource {
    actions: Vec<Action>,
    page_size: usize,
    fail_with: Option<String>,
}

impl MockActionSource {
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
            page_size: 50,
            fail_with: None,
        }
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_actions(mut self, actions: Vec<Action>) -> Self {
        self.actions.extend(actions);
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Make every fetch fail with the given message.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.fail_with = Some(message.into());
        self
    }
}

impl Default for MockActionSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ActionSource for MockActionSource {
    async fn fetch_actions(
        &self,
        _wallets: &[String],
        offset: u64,
    ) -> Result<ActionPage, DataSourceError> {
        if let Some(message) = &self.fail_with {
            return Err(DataSourceError::Other(message.clone()));
        }

        let start = (offset as usize).min(self.actions.len());
        let end = (start + self.page_size).min(self.actions.len());
        Ok(ActionPage {
            count: self.actions.len() as u64,
            actions: self.actions[start..end].to_vec(),
        })
    }
}
