//! Emitted ledger records.
//!
//! Records are append-only and their emission order is significant: the
//! export treats it as chronological/causal order within a transaction.

use crate::domain::{Currency, FixedAmount};
use serde::{Deserialize, Serialize};

/// Accounting category of a record, named the way tax software expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    Trade,
    Deposit,
    Withdrawal,
    Income,
    Loss,
    #[serde(rename = "Income (non taxable)")]
    IncomeNonTaxable,
    #[serde(rename = "Expense (non taxable)")]
    ExpenseNonTaxable,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Trade => "Trade",
            RecordKind::Deposit => "Deposit",
            RecordKind::Withdrawal => "Withdrawal",
            RecordKind::Income => "Income",
            RecordKind::Loss => "Loss",
            RecordKind::IncomeNonTaxable => "Income (non taxable)",
            RecordKind::ExpenseNonTaxable => "Expense (non taxable)",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finished accounting record, ready for export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    #[serde(rename = "type")]
    pub kind: RecordKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buy_amount: Option<FixedAmount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buy_currency: Option<Currency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sell_amount: Option<FixedAmount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sell_currency: Option<Currency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<FixedAmount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_currency: Option<Currency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Formatted "YYYY-MM-DD HH:MM:SS", offsets already applied.
    pub date: String,
    #[serde(rename = "txID", skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,
}

impl LedgerRecord {
    pub fn new(kind: RecordKind, date: String) -> Self {
        Self {
            kind,
            buy_amount: None,
            buy_currency: None,
            sell_amount: None,
            sell_currency: None,
            fee: None,
            fee_currency: None,
            comment: None,
            date,
            tx_id: None,
        }
    }

    pub fn buy(mut self, amount: FixedAmount, currency: Currency) -> Self {
        self.buy_amount = Some(amount);
        self.buy_currency = Some(currency);
        self
    }

    pub fn sell(mut self, amount: FixedAmount, currency: Currency) -> Self {
        self.sell_amount = Some(amount);
        self.sell_currency = Some(currency);
        self
    }

    pub fn fee(mut self, fee: Option<(FixedAmount, Currency)>) -> Self {
        if let Some((amount, currency)) = fee {
            self.fee = Some(amount);
            self.fee_currency = Some(currency);
        }
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn tx(mut self, tx_id: impl Into<String>) -> Self {
        let tx_id = tx_id.into();
        if !tx_id.is_empty() {
            self.tx_id = Some(tx_id);
        }
        self
    }
}
