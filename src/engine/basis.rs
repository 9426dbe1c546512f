//! Basis extraction: walk a pool's lot queue until exactly the withdrawn
//! liquidity units are covered, splitting the final lot proportionally.

use crate::domain::{AmountMap, Basis, Currency, DepositLot, FixedAmount, PoolId};
use tracing::debug;

use super::{ConsumeOrder, EngineError, PoolLedger};

/// Accumulate exactly `units_needed` liquidity units of historical
/// contribution from the pool's queue.
///
/// Fully covered lots are consumed whole; the final lot is split at the
/// boundary and its remainder reinserted at the pop end, so the next
/// withdrawal sees it first again. All accumulation is rounded to eight
/// places; the split fraction is the only unrounded intermediate.
///
/// # Errors
/// - `InvalidUnits` when `units_needed` is not positive (rejected before
///   any ledger mutation), or when a popped lot carries non-positive
///   units (a corrupted queue must not dilute the basis).
/// - `EmptyLedger` when the queue runs out before the magnitude is
///   covered.
pub fn extract_basis(
    ledger: &mut PoolLedger,
    pool: &PoolId,
    units_needed: FixedAmount,
    order: ConsumeOrder,
    base: &Currency,
    asset: &Currency,
) -> Result<Basis, EngineError> {
    if !units_needed.is_positive() {
        return Err(EngineError::InvalidUnits(units_needed));
    }

    let mut basis = Basis::new();

    while basis.liquidity_units < units_needed {
        let lot = ledger.remove_next(pool, order)?;
        if !lot.liquidity_units.is_positive() {
            return Err(EngineError::InvalidUnits(lot.liquidity_units));
        }
        let remaining = basis.liquidity_units + lot.liquidity_units - units_needed;

        if remaining.is_positive() {
            // this lot covers more than what's left needed: split it
            let consumed_units = units_needed - basis.liquidity_units;
            let mut remainder_amounts = AmountMap::new();
            for currency in [base, asset] {
                let total = lot.amounts.get(currency);
                let consumed = total.mul_fraction(consumed_units, lot.liquidity_units);
                basis.amounts.add(currency, consumed);
                remainder_amounts.set(currency.clone(), total - consumed);
            }
            basis.liquidity_units = basis.liquidity_units + consumed_units;

            let remainder = DepositLot::new(lot.liquidity_units - consumed_units, remainder_amounts);
            if !remainder.is_empty() {
                ledger.reinsert(pool, remainder, order);
            }
            break;
        }

        // lot fully consumed; the loop re-evaluates against the grown
        // accumulator (remaining == 0 simply ends the loop)
        basis.liquidity_units = basis.liquidity_units + lot.liquidity_units;
        for currency in [base, asset] {
            basis.amounts.add(currency, lot.amounts.get(currency));
        }
    }

    debug!(
        pool = %pool,
        units = %basis.liquidity_units,
        base = %basis.amounts.get(base),
        asset = %basis.amounts.get(asset),
        "extracted basis"
    );

    Ok(basis)
}
