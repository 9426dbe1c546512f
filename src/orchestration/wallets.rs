//! Wallet address normalization and report keying.

use sha2::{Digest, Sha256};

use super::ReportError;

/// Validate and clean up user-supplied wallet addresses.
///
/// Bech32-style addresses (thor, bnb, bc1, ltc1, bch) and hex ETH
/// addresses are lowercased; base58 legacy addresses are case-sensitive
/// and kept as given. The result is sorted and deduplicated so the same
/// wallet set always normalizes identically.
pub fn normalize_addresses(wallets: &[String]) -> Result<Vec<String>, ReportError> {
    if wallets.is_empty() {
        return Err(ReportError::InvalidWallet(
            "at least one wallet address is required".to_string(),
        ));
    }

    let mut normalized: Vec<String> = Vec::with_capacity(wallets.len());
    let mut invalid: Vec<String> = Vec::new();
    for wallet in wallets {
        match normalize_one(wallet.trim()) {
            Some(address) => normalized.push(address),
            None => invalid.push(wallet.trim().to_string()),
        }
    }

    if !invalid.is_empty() {
        return Err(ReportError::InvalidWallet(format!(
            "unrecognized wallet address(es): {}",
            invalid.join(", ")
        )));
    }

    normalized.sort_unstable();
    normalized.dedup();
    Ok(normalized)
}

fn normalize_one(address: &str) -> Option<String> {
    // legacy base58 first, before any case folding
    if is_base58_legacy(address, &['1', '3']) || is_base58_legacy(address, &['L', 'M', '3']) {
        return Some(address.to_string());
    }

    let lower = address.to_ascii_lowercase();
    if is_eth(&lower) {
        return Some(lower);
    }
    for prefix in ["thor", "bnb", "bc1", "ltc", "bitcoincash:q", "bitcoincash:p", "q", "p"] {
        if is_bech32_style(&lower, prefix) {
            return Some(lower);
        }
    }
    None
}

/// `0x` followed by exactly 40 hex digits.
fn is_eth(address: &str) -> bool {
    address.len() == 42
        && address.starts_with("0x")
        && address[2..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Prefix followed by 38 to 90 characters of `[a-z0-9]`.
fn is_bech32_style(address: &str, prefix: &str) -> bool {
    let Some(rest) = address.strip_prefix(prefix) else {
        return false;
    };
    (38..=90).contains(&rest.len())
        && rest
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}

/// One of the lead characters followed by 25 to 34 base58 characters
/// (no 0, O, I, or l).
fn is_base58_legacy(address: &str, leads: &[char]) -> bool {
    let mut chars = address.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !leads.contains(&first) {
        return false;
    }
    let rest: Vec<char> = chars.collect();
    (25..=34).contains(&rest.len())
        && rest
            .iter()
            .all(|&c| c.is_ascii_alphanumeric() && !matches!(c, '0' | 'O' | 'I' | 'l'))
}

/// Content-addressed report key: the same wallet set always maps to the
/// same report, regardless of input order.
pub fn report_key(wallets: &[String]) -> String {
    let mut sorted: Vec<&str> = wallets.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.dedup();

    let mut hasher = Sha256::new();
    hasher.update(sorted.join(",").as_bytes());
    hex::encode(hasher.finalize())
}
