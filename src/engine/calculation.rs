//! Per-action calculation driver.
//!
//! One `Calculation` processes one action against the report's pool
//! ledger and returns the records to emit, in output order. Records are
//! only handed back on success, so a failing withdrawal never leaves
//! partial output behind.

use crate::domain::{
    chain_token, token, Action, ActionStatus, ActionType, AmountMap, Currency, FixedAmount,
    LedgerRecord, PoolId, RecordKind, DepositLot, RUNE_ASSET,
};
use tracing::debug;

use super::classifier::{classify_withdrawal, WithdrawalContext};
use super::{ConsumeOrder, EngineError, FeeAttributor, PoolLedger};

/// Engine-facing slice of the report configuration.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Lot consumption order for basis extraction.
    pub basis_method: ConsumeOrder,
    /// Emit extra non-taxable unit-transfer records.
    pub detailed_lp: bool,
    /// Treat BEP2/ERC20 RUNE upgrades as trades and keep their
    /// currencies distinct.
    pub include_upgrades: bool,
    /// Emit the "Sent to Pool" withdrawal records on deposits.
    pub standard_lp: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            basis_method: ConsumeOrder::Fifo,
            detailed_lp: false,
            include_upgrades: false,
            standard_lp: true,
        }
    }
}

pub struct Calculation<'a> {
    action: &'a Action,
    config: &'a EngineConfig,
    ledger: &'a mut PoolLedger,
    records: Vec<LedgerRecord>,
}

impl<'a> Calculation<'a> {
    pub fn new(action: &'a Action, config: &'a EngineConfig, ledger: &'a mut PoolLedger) -> Self {
        Self {
            action,
            config,
            ledger,
            records: Vec::new(),
        }
    }

    /// Process the action and return the records to emit, in order.
    pub fn process(mut self) -> Result<Vec<LedgerRecord>, EngineError> {
        // pending also covers failed transactions
        if self.action.status != ActionStatus::Success {
            return Ok(Vec::new());
        }

        match self.action.action_type {
            ActionType::Swap => self.log_trade()?,
            ActionType::AddLiquidity => self.log_deposit()?,
            ActionType::Withdraw => self.log_withdraw()?,
            ActionType::Switch => self.log_upgrade()?,
            ActionType::Send => self.log_send(),
            ActionType::Refund | ActionType::Donate | ActionType::Unknown => {
                debug!(kind = ?self.action.action_type, "skipping action without tax effect");
            }
        }

        Ok(self.records)
    }

    fn token(&self, asset: &str) -> Currency {
        token(asset, self.config.include_upgrades)
    }

    fn date(&self, offset_secs: i64) -> String {
        self.action.timestamp().format_date(offset_secs)
    }

    /// User swapped one asset for another. Exactly one "in"; large trades
    /// are sometimes broken into multiple "out"s, which get summed.
    fn log_trade(&mut self) -> Result<(), EngineError> {
        self.log_to_wallet(None);

        let inbound = self
            .action
            .inbound
            .first()
            .and_then(|t| t.coin())
            .ok_or_else(|| EngineError::MalformedAction("swap without inbound coin".into()))?;
        let outbound = self
            .action
            .outbound
            .first()
            .and_then(|t| t.coin())
            .ok_or_else(|| EngineError::MalformedAction("swap without outbound coin".into()))?
            .clone();

        let mut buy_amount = FixedAmount::zero();
        for sent in &self.action.outbound {
            if let Some(coin) = sent.coin() {
                buy_amount = buy_amount + coin.asset_amount();
            }
        }

        let fees = FeeAttributor::new(self.action, self.config.include_upgrades);
        self.records.push(
            LedgerRecord::new(RecordKind::Trade, self.date(0))
                .buy(buy_amount, self.token(&outbound.asset))
                .sell(inbound.asset_amount(), self.token(&inbound.asset))
                .fee(fees.fee(None, false)),
        );

        // whatever was bought into a non-RUNE asset moves on to the other
        // wallet; no second fee, the trade already carried it
        if outbound.asset != RUNE_ASSET {
            let tx_id = self.action.outbound[0].tx_id.clone();
            for sent in self.action.outbound.clone() {
                if let Some(coin) = sent.coin() {
                    self.records.push(
                        LedgerRecord::new(RecordKind::Withdrawal, self.date(1))
                            .sell(coin.asset_amount(), self.token(&coin.asset))
                            .tx(tx_id.clone()),
                    );
                }
            }
        }

        Ok(())
    }

    /// User added one or two assets into a pool; when two, one is always
    /// RUNE. The wallet receives each leg, the lot lands in the ledger,
    /// and each leg is sent on into the pool.
    fn log_deposit(&mut self) -> Result<(), EngineError> {
        let pool = self.require_pool()?;
        let units = self.log_to_wallet(None);

        if !self.config.standard_lp {
            return Ok(());
        }

        let comment = format!("Sent to Pool: {}/THOR.RUNE", chain_token(pool.as_str()));
        let fees = FeeAttributor::new(self.action, self.config.include_upgrades);
        for sent in self.action.inbound.clone() {
            if let Some(coin) = sent.coin() {
                let currency = self.token(&coin.asset);
                let fee = fees.fee(Some(&currency), false);
                self.records.push(
                    LedgerRecord::new(RecordKind::Withdrawal, self.date(0))
                        .sell(coin.asset_amount(), currency)
                        .comment(comment.clone())
                        .fee(fee),
                );
            }
        }

        // optionally show the liquidity units themselves as a
        // non-taxable acquisition
        if self.config.detailed_lp {
            if let Some(units) = units {
                if units.is_positive() {
                    self.records.push(
                        LedgerRecord::new(RecordKind::IncomeNonTaxable, self.date(1))
                            .buy(units, self.units_currency(&pool))
                            .comment(comment),
                    );
                }
            }
        }

        Ok(())
    }

    /// Upgrade of non-native RUNE. Included as a trade only on request;
    /// either way the coins moved into the RUNE wallet.
    fn log_upgrade(&mut self) -> Result<(), EngineError> {
        let inbound = self
            .action
            .inbound
            .first()
            .and_then(|t| t.coin())
            .ok_or_else(|| EngineError::MalformedAction("switch without inbound coin".into()))?
            .clone();
        let comment = format!("Upgraded {}", chain_token(&inbound.asset));

        if !self.config.include_upgrades {
            self.log_to_wallet(Some(&comment));
            return Ok(());
        }

        self.log_to_wallet(None);
        let outbound = self
            .action
            .outbound
            .first()
            .and_then(|t| t.coin())
            .ok_or_else(|| EngineError::MalformedAction("switch without outbound coin".into()))?;

        // no fee beyond the external chain's own transaction cost
        self.records.push(
            LedgerRecord::new(RecordKind::Trade, self.date(0))
                .buy(outbound.asset_amount(), self.token(&outbound.asset))
                .sell(inbound.asset_amount(), self.token(&inbound.asset))
                .comment(comment),
        );

        Ok(())
    }

    /// Plain transfer out of the tracked wallets.
    fn log_send(&mut self) {
        for sent in self.action.outbound.clone() {
            if let Some(coin) = sent.coin() {
                self.records.push(
                    LedgerRecord::new(RecordKind::Withdrawal, self.date(0))
                        .sell(coin.asset_amount(), self.token(&coin.asset))
                        .tx(sent.tx_id.clone()),
                );
            }
        }
    }

    fn log_withdraw(&mut self) -> Result<(), EngineError> {
        let pool = self.require_pool()?;
        let base = Currency::rune();
        let asset = self.token(pool.as_str());

        // liquidity units actually removed; this comes in negative
        let units = self.action.liquidity_units("withdraw").ok_or_else(|| {
            EngineError::MalformedAction("withdraw without liquidity units".into())
        })?;

        let basis = super::extract_basis(
            self.ledger,
            &pool,
            units.abs(),
            self.config.basis_method,
            &base,
            &asset,
        )?;

        // coins actually received; absent legs stay zero
        let mut coins = AmountMap::new();
        for received in &self.action.outbound {
            if let Some(coin) = received.coin() {
                coins.add(&self.token(&coin.asset), coin.asset_amount());
            }
        }

        let comment = format!("From Pool: {}/THOR.RUNE", chain_token(pool.as_str()));

        // the liquidity units leave before anything comes back
        if self.config.detailed_lp && units.is_negative() {
            self.records.push(
                LedgerRecord::new(RecordKind::ExpenseNonTaxable, self.date(-1))
                    .sell(units.abs(), self.units_currency(&pool))
                    .comment(comment.clone()),
            );
        }

        let fees = FeeAttributor::new(self.action, self.config.include_upgrades);
        let tx_id = self
            .action
            .outbound
            .first()
            .map(|t| t.tx_id.clone())
            .unwrap_or_default();
        let ctx = WithdrawalContext {
            pool_comment: comment,
            base: base.clone(),
            asset: asset.clone(),
            timestamp: self.action.timestamp(),
            tx_id: (!tx_id.is_empty()).then_some(tx_id.as_str()),
            fee: fees.fee(None, false),
        };

        let records =
            classify_withdrawal(&basis, coins.get(&base), coins.get(&asset), &pool, &ctx)?;
        self.records.extend(records);
        Ok(())
    }

    /// Receive each inbound leg into the RUNE wallet, and when liquidity
    /// is being added, append the lot to the pool's ledger. Returns the
    /// granted liquidity units, if any.
    fn log_to_wallet(&mut self, comment: Option<&str>) -> Option<FixedAmount> {
        let mut coins = AmountMap::new();

        for receive in self.action.inbound.clone() {
            if let Some(coin) = receive.coin() {
                let currency = self.token(&coin.asset);
                coins.set(currency.clone(), coin.asset_amount());

                // non-RUNE legs are received into the RUNE wallet first;
                // no fee, the other wallet already paid it
                if coin.asset != RUNE_ASSET {
                    let mut record = LedgerRecord::new(RecordKind::Deposit, self.date(-1))
                        .buy(coin.asset_amount(), currency)
                        .tx(receive.tx_id.clone());
                    if let Some(comment) = comment {
                        record = record.comment(comment);
                    }
                    self.records.push(record);
                }
            }
        }

        let units = self.action.liquidity_units("addLiquidity")?;
        let pool = self.action.pool()?;
        self.ledger.append(&pool, DepositLot::new(units, coins));
        Some(units)
    }

    fn require_pool(&self) -> Result<PoolId, EngineError> {
        self.action
            .pool()
            .ok_or_else(|| EngineError::MalformedAction("action without pool".into()))
    }

    /// Currency name for a pool's liquidity units, e.g. "BUSD-RUNE".
    fn units_currency(&self, pool: &PoolId) -> Currency {
        Currency::new(format!("{}-RUNE", self.token(pool.as_str())))
    }
}
