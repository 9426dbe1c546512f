//! CoinTracking custom-exchange CSV format.
//!
//! Column order is fixed by the importer; blank cells stand for absent
//! optional fields. All rows carry "Thorchain" as the exchange.

use crate::domain::LedgerRecord;
use thiserror::Error;

const EXCHANGE: &str = "Thorchain";

const HEADER: [&str; 11] = [
    "Type",
    "Buy Amount",
    "Buy Currency",
    "Sell Amount",
    "Sell Currency",
    "Fee",
    "Fee Currency",
    "Exchange",
    "Comment",
    "Date",
    "Tx-ID",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV encoding error: {0}")]
    Encoding(String),
}

/// Serialize records into CoinTracking CSV, preserving record order.
pub fn records_to_csv(records: &[LedgerRecord]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;

    for record in records {
        let buy = amount_cell(&record.buy_amount);
        let sell = amount_cell(&record.sell_amount);
        let fee = amount_cell(&record.fee);
        writer.write_record([
            record.kind.as_str(),
            buy.as_str(),
            currency_cell(&record.buy_currency),
            sell.as_str(),
            currency_cell(&record.sell_currency),
            fee.as_str(),
            currency_cell(&record.fee_currency),
            EXCHANGE,
            record.comment.as_deref().unwrap_or(""),
            record.date.as_str(),
            record.tx_id.as_deref().unwrap_or(""),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Encoding(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ExportError::Encoding(e.to_string()))
}

fn amount_cell(amount: &Option<crate::domain::FixedAmount>) -> String {
    amount
        .as_ref()
        .map(|a| a.to_canonical_string())
        .unwrap_or_default()
}

fn currency_cell(currency: &Option<crate::domain::Currency>) -> &str {
    currency.as_ref().map(|c| c.as_str()).unwrap_or("")
}
