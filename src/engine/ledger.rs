//! Per-pool deposit lot queues.
//!
//! One `PoolLedger` exists per report and is passed explicitly into the
//! engine; it is never shared across reports. Each pool holds an ordered
//! queue of deposit lots, created lazily on first deposit and kept for
//! the lifetime of the report.

use crate::domain::{DepositLot, PoolId};
use std::collections::{BTreeMap, VecDeque};

use super::EngineError;

/// Which end of a pool's queue withdrawals consume from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsumeOrder {
    /// First-in-first-out: consume the oldest lot first.
    #[default]
    Fifo,
    /// Last-in-first-out: consume the newest lot first.
    Lifo,
}

#[derive(Debug, Default)]
pub struct PoolLedger {
    pools: BTreeMap<PoolId, VecDeque<DepositLot>>,
}

impl PoolLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a new deposit lot onto the tail of the pool's queue.
    pub fn append(&mut self, pool: &PoolId, lot: DepositLot) {
        self.pools.entry(pool.clone()).or_default().push_back(lot);
    }

    /// Pop the next lot to consume: head for FIFO, tail for LIFO.
    ///
    /// # Errors
    /// `EmptyLedger` when the pool has no lots left. A withdrawal against
    /// an empty ledger is a data-integrity error, fatal for the report.
    pub fn remove_next(
        &mut self,
        pool: &PoolId,
        order: ConsumeOrder,
    ) -> Result<DepositLot, EngineError> {
        let queue = self
            .pools
            .get_mut(pool)
            .ok_or_else(|| EngineError::EmptyLedger(pool.clone()))?;
        let lot = match order {
            ConsumeOrder::Fifo => queue.pop_front(),
            ConsumeOrder::Lifo => queue.pop_back(),
        };
        lot.ok_or_else(|| EngineError::EmptyLedger(pool.clone()))
    }

    /// Push a lot back onto the end it was popped from, so the next
    /// withdrawal sees it first again.
    pub fn reinsert(&mut self, pool: &PoolId, lot: DepositLot, order: ConsumeOrder) {
        let queue = self.pools.entry(pool.clone()).or_default();
        match order {
            ConsumeOrder::Fifo => queue.push_front(lot),
            ConsumeOrder::Lifo => queue.push_back(lot),
        }
    }

    /// Number of lots currently queued for the pool.
    pub fn lot_count(&self, pool: &PoolId) -> usize {
        self.pools.get(pool).map_or(0, VecDeque::len)
    }

    /// Snapshot of the pool's queue, head first. Test and debug helper.
    pub fn lots(&self, pool: &PoolId) -> Vec<DepositLot> {
        self.pools
            .get(pool)
            .map(|q| q.iter().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AmountMap, FixedAmount};

    fn lot(units: &str) -> DepositLot {
        DepositLot::new(FixedAmount::parse(units).unwrap(), AmountMap::new())
    }

    fn pool() -> PoolId {
        PoolId::new("BNB.BUSD-BD1")
    }

    #[test]
    fn test_fifo_pops_head() {
        let mut ledger = PoolLedger::new();
        ledger.append(&pool(), lot("10"));
        ledger.append(&pool(), lot("20"));

        let first = ledger.remove_next(&pool(), ConsumeOrder::Fifo).unwrap();
        assert_eq!(first.liquidity_units, FixedAmount::parse("10").unwrap());
    }

    #[test]
    fn test_lifo_pops_tail() {
        let mut ledger = PoolLedger::new();
        ledger.append(&pool(), lot("10"));
        ledger.append(&pool(), lot("20"));

        let first = ledger.remove_next(&pool(), ConsumeOrder::Lifo).unwrap();
        assert_eq!(first.liquidity_units, FixedAmount::parse("20").unwrap());
    }

    #[test]
    fn test_reinsert_returns_to_same_end() {
        let mut ledger = PoolLedger::new();
        ledger.append(&pool(), lot("10"));
        ledger.append(&pool(), lot("20"));

        let popped = ledger.remove_next(&pool(), ConsumeOrder::Fifo).unwrap();
        ledger.reinsert(&pool(), popped, ConsumeOrder::Fifo);
        let again = ledger.remove_next(&pool(), ConsumeOrder::Fifo).unwrap();
        assert_eq!(again.liquidity_units, FixedAmount::parse("10").unwrap());

        let popped = ledger.remove_next(&pool(), ConsumeOrder::Lifo).unwrap();
        ledger.reinsert(&pool(), popped, ConsumeOrder::Lifo);
        let again = ledger.remove_next(&pool(), ConsumeOrder::Lifo).unwrap();
        assert_eq!(again.liquidity_units, FixedAmount::parse("20").unwrap());
    }

    #[test]
    fn test_empty_pool_errors() {
        let mut ledger = PoolLedger::new();
        let err = ledger.remove_next(&pool(), ConsumeOrder::Fifo).unwrap_err();
        assert_eq!(err, EngineError::EmptyLedger(pool()));

        // exhausting a known pool errors the same way
        ledger.append(&pool(), lot("10"));
        ledger.remove_next(&pool(), ConsumeOrder::Fifo).unwrap();
        let err = ledger.remove_next(&pool(), ConsumeOrder::Fifo).unwrap_err();
        assert_eq!(err, EngineError::EmptyLedger(pool()));
    }

    #[test]
    fn test_pools_are_independent() {
        let mut ledger = PoolLedger::new();
        let other = PoolId::new("ETH.ETH");
        ledger.append(&pool(), lot("10"));
        ledger.append(&other, lot("30"));

        assert_eq!(ledger.lot_count(&pool()), 1);
        assert_eq!(ledger.lot_count(&other), 1);
        ledger.remove_next(&pool(), ConsumeOrder::Fifo).unwrap();
        assert_eq!(ledger.lot_count(&other), 1);
    }
}
