//! Midgard API client implementation.

use super::{ActionPage, ActionSource, DataSourceError};
use crate::domain::Action;
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Wire shape of Midgard's `/v2/actions` response.
#[derive(Debug, Deserialize)]
struct ActionsResponse {
    /// Total action count as a decimal string.
    count: String,
    #[serde(default)]
    actions: Vec<serde_json::Value>,
}

/// Midgard action source using the public actions API.
///
/// The URL is a template with `{WALLETS}` and `{OFFSET}` placeholders so
/// operators can point at any Midgard instance and tune the query.
#[derive(Debug, Clone)]
pub struct MidgardSource {
    client: Client,
    url_template: String,
}

impl MidgardSource {
    pub fn new(url_template: String) -> Self {
        Self {
            client: Client::new(),
            url_template,
        }
    }

    async fn get_json(&self, url: &str) -> Result<serde_json::Value, DataSourceError> {
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(30)),
            ..Default::default()
        };

        retry(backoff, || async {
            let response = self.client.get(url).send().await.map_err(|e| {
                backoff::Error::transient(DataSourceError::NetworkError(e.to_string()))
            })?;

            let status = response.status();
            if status == 429 {
                return Err(backoff::Error::transient(DataSourceError::RateLimited));
            }
            if status.is_server_error() {
                return Err(backoff::Error::transient(DataSourceError::HttpError {
                    status: status.as_u16(),
                    message: "Server error".to_string(),
                }));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(DataSourceError::HttpError {
                    status: status.as_u16(),
                    message: "Client error".to_string(),
                }));
            }

            response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| backoff::Error::permanent(DataSourceError::ParseError(e.to_string())))
        })
        .await
    }
}

#[async_trait]
impl ActionSource for MidgardSource {
    async fn fetch_actions(
        &self,
        wallets: &[String],
        offset: u64,
    ) -> Result<ActionPage, DataSourceError> {
        let url = self
            .url_template
            .replace("{WALLETS}", &wallets.join(","))
            .replace("{OFFSET}", &offset.to_string());
        debug!(offset, "fetching actions page");

        let response = self.get_json(&url).await?;
        let page: ActionsResponse = serde_json::from_value(response)
            .map_err(|e| DataSourceError::ParseError(e.to_string()))?;

        let count = page
            .count
            .parse::<u64>()
            .map_err(|e| DataSourceError::ParseError(format!("Invalid count: {}", e)))?;

        // one unreadable action must not sink the whole report
        let mut actions = Vec::with_capacity(page.actions.len());
        for value in page.actions {
            match serde_json::from_value::<Action>(value) {
                Ok(action) => actions.push(action),
                Err(e) => warn!("Failed to parse action: {}", e),
            }
        }

        Ok(ActionPage { count, actions })
    }
}
