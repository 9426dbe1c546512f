//! Midgard action wire model.
//!
//! One action is one logical wallet interaction (swap, add-liquidity,
//! withdraw, ...) with its inbound and outbound transfers and a per-type
//! metadata map. Amounts on the wire are integer minor units.

use crate::domain::{FixedAmount, PoolId, TimestampNs};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionType {
    Swap,
    AddLiquidity,
    Withdraw,
    /// Upgrade of BEP2/ERC20 RUNE into native RUNE.
    Switch,
    Refund,
    Donate,
    Send,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionStatus {
    #[default]
    Success,
    /// Pending also covers failed transactions; both are skipped.
    Pending,
    #[serde(other)]
    Unknown,
}

/// One coin leg of a transfer: full asset name plus minor-unit amount.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CoinAmount {
    pub asset: String,
    /// Integer minor units, as the decimal string Midgard sends.
    pub amount: String,
}

impl CoinAmount {
    pub fn new(asset: impl Into<String>, amount: i64) -> Self {
        Self {
            asset: asset.into(),
            amount: amount.to_string(),
        }
    }

    /// Decode the minor-unit string into an asset-unit amount.
    pub fn asset_amount(&self) -> FixedAmount {
        FixedAmount::from_minor_units(self.amount.parse::<i64>().unwrap_or(0))
    }
}

/// One inbound or outbound transfer of an action.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Transfer {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub coins: Vec<CoinAmount>,
    #[serde(rename = "txID", default)]
    pub tx_id: String,
}

impl Transfer {
    /// The first (usually only) coin of the transfer.
    pub fn coin(&self) -> Option<&CoinAmount> {
        self.coins.first()
    }
}

/// Per-type metadata entry. Midgard nests these under the action type key
/// ("swap", "addLiquidity", "withdraw", ...); absent fields mean the entry
/// carries nothing of that kind.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MetadataEntry {
    #[serde(rename = "liquidityUnits", default, skip_serializing_if = "Option::is_none")]
    pub liquidity_units: Option<String>,
    #[serde(rename = "networkFees", default, skip_serializing_if = "Vec::is_empty")]
    pub network_fees: Vec<CoinAmount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    #[serde(default)]
    pub status: ActionStatus,
    #[serde(default)]
    pub pools: Vec<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, MetadataEntry>,
    #[serde(rename = "in", default)]
    pub inbound: Vec<Transfer>,
    #[serde(rename = "out", default)]
    pub outbound: Vec<Transfer>,
    /// Nanosecond timestamp as a decimal string.
    pub date: String,
}

impl Action {
    pub fn timestamp(&self) -> TimestampNs {
        TimestampNs::parse(&self.date).unwrap_or_default()
    }

    /// The pool the action ran against, if any.
    pub fn pool(&self) -> Option<PoolId> {
        self.pools.first().map(PoolId::new)
    }

    /// Signed liquidity units recorded under the given metadata key
    /// ("addLiquidity" grants positive units, "withdraw" negative ones).
    pub fn liquidity_units(&self, key: &str) -> Option<FixedAmount> {
        let entry = self.metadata.get(key)?;
        let raw = entry.liquidity_units.as_ref()?.parse::<i64>().ok()?;
        Some(FixedAmount::from_minor_units(raw))
    }
}
