//! Report runner: drives one report from wallet list to stored records.

use crate::datasource::{ActionSource, DataSourceError};
use crate::engine::{Calculation, EngineConfig, EngineError, PoolLedger};
use crate::store::{Repository, ReportStatus};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Invalid wallet: {0}")]
    InvalidWallet(String),
    #[error(transparent)]
    Fetch(#[from] DataSourceError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

#[derive(Clone)]
pub struct ReportRunner {
    repo: Arc<Repository>,
    source: Arc<dyn ActionSource>,
    config: EngineConfig,
}

impl ReportRunner {
    pub fn new(repo: Arc<Repository>, source: Arc<dyn ActionSource>, config: EngineConfig) -> Self {
        Self {
            repo,
            source,
            config,
        }
    }

    /// Generate one report end to end, recording the outcome in the
    /// report's status row. Suitable for running in a spawned task.
    pub async fn run(&self, key: &str, wallets: &[String]) {
        if let Err(e) = self.generate(key, wallets).await {
            error!(key, "report generation failed: {}", e);
            // best-effort; the status row may be gone if the db died
            let _ = self
                .repo
                .set_status(key, ReportStatus::Failed, Some(&e.to_string()))
                .await;
        }
    }

    async fn generate(&self, key: &str, wallets: &[String]) -> Result<(), ReportError> {
        self.repo.start_report(key).await?;
        self.repo.clear_actions(key).await?;

        let total = self.fetch_all(key, wallets).await?;
        info!(key, total, "action history fetched");

        let actions = self.repo.load_actions(key).await?;

        // one shared ledger across the whole sorted history; an action
        // that fails poisons the report rather than being skipped
        let mut ledger = PoolLedger::new();
        let mut records = Vec::new();
        for action in &actions {
            let emitted = Calculation::new(action, &self.config, &mut ledger).process()?;
            records.extend(emitted);
        }

        self.repo.replace_records(key, &records).await?;
        self.repo.clear_actions(key).await?;
        self.repo.set_status(key, ReportStatus::Ready, None).await?;
        info!(key, records = records.len(), "report ready");
        Ok(())
    }

    /// Page through the source until every action is stored.
    async fn fetch_all(&self, key: &str, wallets: &[String]) -> Result<u64, ReportError> {
        let mut offset = 0u64;
        loop {
            let page = self.source.fetch_actions(wallets, offset).await?;
            let fetched = page.actions.len() as u64;
            self.repo.insert_actions_batch(key, &page.actions).await?;

            offset += fetched;
            if fetched == 0 || offset >= page.count {
                return Ok(offset);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::MockActionSource;
    use crate::domain::{
        Action, ActionStatus, ActionType, CoinAmount, MetadataEntry, RecordKind, Transfer,
    };
    use crate::store::init_db;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    async fn repo(temp_dir: &TempDir) -> Arc<Repository> {
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        Arc::new(Repository::new(init_db(&db_path).await.unwrap()))
    }

    fn transfer(address: &str, asset: &str, amount: i64, tx: &str) -> Transfer {
        Transfer {
            address: address.to_string(),
            coins: vec![CoinAmount::new(asset, amount)],
            tx_id: tx.to_string(),
        }
    }

    fn deposit_action(date: &str) -> Action {
        let mut metadata = BTreeMap::new();
        metadata.insert(
            "addLiquidity".to_string(),
            MetadataEntry {
                liquidity_units: Some("10000000000".to_string()),
                network_fees: vec![],
            },
        );
        Action {
            action_type: ActionType::AddLiquidity,
            status: ActionStatus::Success,
            pools: vec!["BNB.BUSD-BD1".to_string()],
            metadata,
            inbound: vec![transfer("thor1a", "THOR.RUNE", 5_000_000_000, "DEP")],
            outbound: vec![],
            date: date.to_string(),
        }
    }

    fn withdraw_action(date: &str) -> Action {
        let mut metadata = BTreeMap::new();
        metadata.insert(
            "withdraw".to_string(),
            MetadataEntry {
                liquidity_units: Some("-10000000000".to_string()),
                network_fees: vec![],
            },
        );
        Action {
            action_type: ActionType::Withdraw,
            status: ActionStatus::Success,
            pools: vec!["BNB.BUSD-BD1".to_string()],
            metadata,
            inbound: vec![transfer("thor1a", "THOR.RUNE", 1, "REQ")],
            outbound: vec![transfer("bnb1a", "BNB.BUSD-BD1", 6_000_000_000, "OUT")],
            date: date.to_string(),
        }
    }

    #[tokio::test]
    async fn test_run_produces_ready_report() {
        let temp_dir = TempDir::new().unwrap();
        let repo = repo(&temp_dir).await;
        // deliberately fetched out of order; processing must sort
        let source = Arc::new(
            MockActionSource::new()
                .with_action(withdraw_action("2000000000000000000"))
                .with_action(deposit_action("1000000000000000000"))
                .with_page_size(1),
        );
        let runner = ReportRunner::new(repo.clone(), source, EngineConfig::default());

        runner.run("key1", &["thor1a".to_string()]).await;

        let (status, error) = repo.report_status("key1").await.unwrap().unwrap();
        assert_eq!(status, ReportStatus::Ready);
        assert_eq!(error, None);

        let records = repo.load_records("key1").await.unwrap();
        let kinds: Vec<_> = records.iter().map(|r| r.kind).collect();
        // deposit leg first, then the withdrawal's reconciliation
        assert_eq!(
            kinds,
            vec![
                RecordKind::Withdrawal, // sent to pool
                RecordKind::Deposit,    // basis back in the wallet
                RecordKind::Trade,
                RecordKind::Withdrawal,
            ]
        );

        // raw actions are discarded once the report is ready
        assert!(repo.load_actions("key1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_engine_failure_marks_report_failed() {
        let temp_dir = TempDir::new().unwrap();
        let repo = repo(&temp_dir).await;
        // withdrawal with no prior deposit
        let source = Arc::new(
            MockActionSource::new().with_action(withdraw_action("1000000000000000000")),
        );
        let runner = ReportRunner::new(repo.clone(), source, EngineConfig::default());

        runner.run("key1", &["thor1a".to_string()]).await;

        let (status, error) = repo.report_status("key1").await.unwrap().unwrap();
        assert_eq!(status, ReportStatus::Failed);
        assert!(error.unwrap().contains("missing cost-basis"));
    }

    #[tokio::test]
    async fn test_fetch_failure_marks_report_failed() {
        let temp_dir = TempDir::new().unwrap();
        let repo = repo(&temp_dir).await;
        let source = Arc::new(MockActionSource::new().failing("midgard unavailable"));
        let runner = ReportRunner::new(repo.clone(), source, EngineConfig::default());

        runner.run("key1", &["thor1a".to_string()]).await;

        let (status, _) = repo.report_status("key1").await.unwrap().unwrap();
        assert_eq!(status, ReportStatus::Failed);
    }

    #[tokio::test]
    async fn test_rerun_replaces_previous_results() {
        let temp_dir = TempDir::new().unwrap();
        let repo = repo(&temp_dir).await;
        let source = Arc::new(MockActionSource::new().with_action(deposit_action("1000000000000000000")));
        let runner = ReportRunner::new(repo.clone(), source, EngineConfig::default());

        runner.run("key1", &["thor1a".to_string()]).await;
        let first = repo.load_records("key1").await.unwrap();
        runner.run("key1", &["thor1a".to_string()]).await;
        let second = repo.load_records("key1").await.unwrap();

        assert_eq!(first, second);
    }
}
