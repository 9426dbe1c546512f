//! Pure computation engine: cost-basis ledger, withdrawal classification,
//! fee attribution. No I/O happens here; the engine reads an action,
//! mutates the in-memory pool ledger, and returns the records to emit.

use crate::domain::{FixedAmount, PoolId};
use thiserror::Error;

pub mod basis;
pub mod calculation;
pub mod classifier;
pub mod fee;
pub mod ledger;

pub use basis::extract_basis;
pub use calculation::{Calculation, EngineConfig};
pub use classifier::WithdrawalCase;
pub use fee::{FeeAttributor, NATIVE_TX_FEE_RUNE};
pub use ledger::{ConsumeOrder, PoolLedger};

/// Errors raised by the engine. None of these are retried: ledger
/// consistency errors propagate to the report runner, which marks the
/// whole report failed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// Withdrawal requested against a pool with insufficient recorded
    /// deposit history. Downstream tax figures would be wrong, so the
    /// report must fail rather than fabricate a basis.
    #[error("missing cost-basis for pool: {0}")]
    EmptyLedger(PoolId),

    /// Basis/coins combination outside the nine classified cases. Should
    /// be unreachable given upstream invariants; surfaced loudly instead
    /// of silently dropping data.
    #[error(
        "unhandled withdrawal case for pool {pool}: \
         basis {basis_base}/{basis_asset}, coins {coins_base}/{coins_asset}"
    )]
    UnhandledCase {
        pool: PoolId,
        basis_base: FixedAmount,
        basis_asset: FixedAmount,
        coins_base: FixedAmount,
        coins_asset: FixedAmount,
    },

    /// Caller contract violation: non-positive extraction magnitude.
    #[error("invalid liquidity units for extraction: {0}")]
    InvalidUnits(FixedAmount),

    /// Action is missing a field its type requires (pool id, withdraw
    /// units, ...). Rejected before any ledger mutation.
    #[error("malformed action: {0}")]
    MalformedAction(String),
}
