//! Deposit lots and extracted basis.

use crate::domain::{Currency, FixedAmount};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Currency-to-amount mapping where an absent key means zero.
///
/// The accessor makes the zero default explicit; callers never reason
/// about missing keys.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AmountMap(BTreeMap<Currency, FixedAmount>);

impl AmountMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Amount held for the currency; zero when the key is absent.
    pub fn get(&self, currency: &Currency) -> FixedAmount {
        self.0.get(currency).copied().unwrap_or_else(FixedAmount::zero)
    }

    pub fn set(&mut self, currency: Currency, amount: FixedAmount) {
        self.0.insert(currency, amount);
    }

    /// Add to the existing amount (zero when absent), rounding per the
    /// fixed-point contract.
    pub fn add(&mut self, currency: &Currency, amount: FixedAmount) {
        let next = self.get(currency) + amount;
        self.0.insert(currency.clone(), next);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Currency, &FixedAmount)> {
        self.0.iter()
    }

    /// True when every stored amount is exactly zero.
    pub fn is_all_zero(&self) -> bool {
        self.0.values().all(FixedAmount::is_zero)
    }
}

impl FromIterator<(Currency, FixedAmount)> for AmountMap {
    fn from_iter<T: IntoIterator<Item = (Currency, FixedAmount)>>(iter: T) -> Self {
        AmountMap(iter.into_iter().collect())
    }
}

/// One historical contribution to a pool: the liquidity units granted and
/// the currency amounts that produced them.
///
/// Invariant: the amounts are proportional to `liquidity_units`; scaling
/// the units by a factor scales every amount by the same factor. Partial
/// consumption relies on this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositLot {
    pub liquidity_units: FixedAmount,
    pub amounts: AmountMap,
}

impl DepositLot {
    pub fn new(liquidity_units: FixedAmount, amounts: AmountMap) -> Self {
        Self {
            liquidity_units,
            amounts,
        }
    }

    /// True when the lot carries no units and no amounts at all.
    pub fn is_empty(&self) -> bool {
        self.liquidity_units.is_zero() && self.amounts.is_all_zero()
    }
}

/// The historical contribution attributable to one withdrawal, accumulated
/// from consumed deposit lots. Same shape as a lot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Basis {
    pub liquidity_units: FixedAmount,
    pub amounts: AmountMap,
}

impl Basis {
    pub fn new() -> Self {
        Self::default()
    }
}
