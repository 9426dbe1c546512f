//! Pure domain types shared across the engine and the surrounding layers.

pub mod action;
pub mod decimal;
pub mod lot;
pub mod primitives;
pub mod record;

pub use action::{Action, ActionStatus, ActionType, CoinAmount, MetadataEntry, Transfer};
pub use decimal::{FixedAmount, ASSET_DECIMALS, BASE_OFFSET};
pub use lot::{AmountMap, Basis, DepositLot};
pub use primitives::{chain_token, token, Currency, PoolId, TimestampNs, RUNE_ASSET};
pub use record::{LedgerRecord, RecordKind};
