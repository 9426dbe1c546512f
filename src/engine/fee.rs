//! Network fee attribution.
//!
//! Finds the fee amount/currency to attach to exactly one record per
//! originating transaction. Callers pass `skip` when the fee has already
//! been attached elsewhere in the same transaction's record sequence.

use crate::domain::{token, Action, Currency, FixedAmount, RUNE_ASSET};

/// Withdraw requests and native deposits/swaps pay a fixed network fee on
/// a separate call, so no explicit fee appears in metadata.
pub const NATIVE_TX_FEE_RUNE: &str = "0.02";

pub struct FeeAttributor<'a> {
    action: &'a Action,
    include_upgrades: bool,
}

impl<'a> FeeAttributor<'a> {
    pub fn new(action: &'a Action, include_upgrades: bool) -> Self {
        Self {
            action,
            include_upgrades,
        }
    }

    fn token(&self, asset: &str) -> Currency {
        token(asset, self.include_upgrades)
    }

    /// The fee to attach, or None.
    ///
    /// `filter` restricts the answer to fees denominated in that currency.
    /// Explicit `networkFees` metadata wins; otherwise the implicit
    /// native-fee rule applies: withdraw requests paid from the RUNE
    /// wallet, RUNE-to-asset swaps and native deposits all cost
    /// [`NATIVE_TX_FEE_RUNE`] even though nothing in metadata says so.
    pub fn fee(&self, filter: Option<&Currency>, skip: bool) -> Option<(FixedAmount, Currency)> {
        if skip {
            return None;
        }

        for (kind, entry) in &self.action.metadata {
            for fee in &entry.network_fees {
                let currency = self.token(&fee.asset);
                if filter.is_none() || filter == Some(&currency) {
                    return Some((fee.asset_amount(), currency));
                }
            }

            let rune_wanted = filter.map_or(true, Currency::is_rune);
            if rune_wanted && self.implicit_native_fee(kind) {
                let amount = FixedAmount::parse(NATIVE_TX_FEE_RUNE).unwrap_or_default();
                return Some((amount, Currency::rune()));
            }
        }

        None
    }

    fn implicit_native_fee(&self, metadata_kind: &str) -> bool {
        let inbound = self.action.inbound.first();
        match metadata_kind {
            // the withdrawal request itself still costs a transaction:
            // newer actions have no coin in (only a thor address), older
            // ones sent 1 tor of RUNE
            "withdraw" => inbound.is_some_and(|t| {
                (t.coins.is_empty() && t.address.starts_with("thor1"))
                    || t.coins.first().is_some_and(|c| c.asset == RUNE_ASSET)
            }),
            // swaps out of RUNE pay the native fee that is accounted
            // nowhere else
            "swap" => {
                inbound.is_some_and(|t| t.coins.first().is_some_and(|c| c.asset == RUNE_ASSET))
                    && self
                        .action
                        .outbound
                        .first()
                        .is_some_and(|t| t.coins.first().is_some_and(|c| c.asset != RUNE_ASSET))
            }
            "deposit" => true,
            _ => false,
        }
    }
}
