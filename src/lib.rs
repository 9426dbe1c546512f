pub mod api;
pub mod config;
pub mod datasource;
pub mod domain;
pub mod engine;
pub mod error;
pub mod export;
pub mod orchestration;
pub mod store;

pub use config::Config;
pub use datasource::{ActionSource, DataSourceError, MidgardSource, MockActionSource};
pub use domain::{
    Action, ActionStatus, ActionType, AmountMap, Basis, Currency, DepositLot, FixedAmount,
    LedgerRecord, PoolId, RecordKind, TimestampNs,
};
pub use engine::{Calculation, ConsumeOrder, EngineConfig, EngineError, PoolLedger};
pub use error::AppError;
pub use orchestration::{report_key, ReportRunner};
pub use store::{init_db, Repository};
