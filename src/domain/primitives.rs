//! Domain primitives: PoolId, Currency, TimestampNs.

use serde::{Deserialize, Serialize};

/// Full on-chain asset name of the pool's paired asset, e.g. "BNB.BUSD-BD1".
///
/// Ledgers are keyed by the full name so that "BNB.ETH-1C9" and "ETH.ETH"
/// stay distinct even though both shorten to the token "ETH".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PoolId(pub String);

impl PoolId {
    pub fn new(pool: impl Into<String>) -> Self {
        PoolId(pool.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PoolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Short currency token used on emitted records, e.g. "RUNE", "BUSD".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Currency(pub String);

impl Currency {
    pub fn new(token: impl Into<String>) -> Self {
        Currency(token.into())
    }

    /// The base currency every pool pairs against.
    pub fn rune() -> Self {
        Currency("RUNE".to_string())
    }

    pub fn is_rune(&self) -> bool {
        self.0 == "RUNE"
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Full on-chain name of native RUNE.
pub const RUNE_ASSET: &str = "THOR.RUNE";

/// Convert "BNB.BUSD-BD1" into "BUSD".
///
/// With `include_upgrades` set, the non-native RUNE assets stay distinct
/// ("RUNE-ETH", "RUNE-B1A") so an upgrade shows up as a real trade.
pub fn token(asset: &str, include_upgrades: bool) -> Currency {
    if include_upgrades {
        match asset {
            "ETH.RUNE-0X3155BA85D5F96B2D030A4966AF206230E46849CB" => {
                return Currency::new("RUNE-ETH")
            }
            "BNB.RUNE-B1A" => return Currency::new("RUNE-B1A"),
            _ => {}
        }
    }
    let after_chain = asset.split('.').nth(1).unwrap_or(asset);
    Currency::new(after_chain.split('-').next().unwrap_or(after_chain))
}

/// Convert "BNB.BUSD-BD1" into "BNB.BUSD" (chain kept, issue id dropped).
pub fn chain_token(asset: &str) -> String {
    asset.split('-').next().unwrap_or(asset).to_string()
}

/// Action timestamp in nanoseconds since the Unix epoch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct TimestampNs(pub i64);

impl TimestampNs {
    pub fn new(ns: i64) -> Self {
        TimestampNs(ns)
    }

    /// Parse the decimal nanosecond string Midgard uses for `date`.
    pub fn parse(s: &str) -> Option<Self> {
        s.parse::<i64>().ok().map(TimestampNs)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }

    /// Format as "YYYY-MM-DD HH:MM:SS" with a second-level offset applied.
    ///
    /// Offsets keep export rows in causal order: -1 receiving into the
    /// RUNE wallet, 0 core operation, +1 sending out. The source feed's
    /// timestamps run four hours ahead of UTC, so that is subtracted here.
    pub fn format_date(&self, offset_secs: i64) -> String {
        const NANOS_PER_SEC: i64 = 1_000_000_000;
        const FEED_UTC_SKEW_SECS: i64 = 4 * 3600;

        let adjusted = self.0 + (offset_secs - FEED_UTC_SKEW_SECS) * NANOS_PER_SEC;
        chrono::DateTime::from_timestamp_nanos(adjusted)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    }
}
