//! Withdrawal outcome classification.
//!
//! Compares the extracted basis (what was originally contributed for the
//! withdrawn units) against the coins actually received and emits the
//! minimal sequence of records that reconciles the two: implicit trades
//! where the mix changed, income/loss where one leg grew or shrank, and
//! withdrawal records for assets forwarded to the external wallet.

use crate::domain::{Basis, Currency, FixedAmount, LedgerRecord, RecordKind, TimestampNs};

use super::EngineError;

/// The nine realizable basis/coins combinations, named deposited-mix to
/// received-mix. A closed enum so a tenth combination fails loudly at
/// classification instead of silently falling through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawalCase {
    /// Deposited only base, received only the pool asset.
    BaseToAsset,
    /// Deposited only the pool asset, received only base.
    AssetToBase,
    /// Deposited only base, received both legs.
    BaseToBoth,
    /// Deposited only the pool asset, received both legs.
    AssetToBoth,
    /// Deposited both legs, received only base.
    BothToBase,
    /// Deposited both legs, received only the pool asset.
    BothToAsset,
    /// Deposited and received only the pool asset.
    AssetToAsset,
    /// Deposited and received only base.
    BaseToBase,
    /// Deposited and received both legs.
    BothToBoth,
}

impl WithdrawalCase {
    /// Classify a withdrawal by which legs the basis holds and which legs
    /// were effectively received.
    ///
    /// A leg of a two-sided basis that comes back in exactly the deposited
    /// amount is a pass-through, not a receipt that changes the case; the
    /// asymmetric leg alone decides. Combinations with an empty basis are
    /// unreachable through real deposit history and error out.
    pub fn classify(
        basis_base: FixedAmount,
        basis_asset: FixedAmount,
        coins_base: FixedAmount,
        coins_asset: FixedAmount,
    ) -> Option<Self> {
        let from_base = basis_base.is_positive();
        let from_asset = basis_asset.is_positive();
        let from_both = from_base && from_asset;

        let to_base = coins_base.is_positive() && !(from_both && coins_base == basis_base);
        let to_asset = coins_asset.is_positive() && !(from_both && coins_asset == basis_asset);

        match (from_base, from_asset, to_base, to_asset) {
            (true, false, false, true) => Some(WithdrawalCase::BaseToAsset),
            (true, false, true, true) => Some(WithdrawalCase::BaseToBoth),
            (true, false, _, false) => Some(WithdrawalCase::BaseToBase),
            (false, true, true, false) => Some(WithdrawalCase::AssetToBase),
            (false, true, true, true) => Some(WithdrawalCase::AssetToBoth),
            (false, true, false, _) => Some(WithdrawalCase::AssetToAsset),
            (true, true, true, false) => Some(WithdrawalCase::BothToBase),
            (true, true, false, true) => Some(WithdrawalCase::BothToAsset),
            (true, true, _, _) => Some(WithdrawalCase::BothToBoth),
            (false, false, _, _) => None,
        }
    }
}

/// Everything the classifier needs beyond the amounts themselves.
pub struct WithdrawalContext<'a> {
    pub pool_comment: String,
    pub base: Currency,
    pub asset: Currency,
    pub timestamp: TimestampNs,
    /// txID of the outbound transfer, attached to withdrawal records.
    pub tx_id: Option<&'a str>,
    /// Network fee for the originating transaction; attached to exactly
    /// the first emitted record.
    pub fee: Option<(FixedAmount, Currency)>,
}

/// Classify and emit the full record sequence for one withdrawal.
///
/// The basis Deposit records (base leg then asset leg, non-zero legs
/// only) come first, representing the contribution arriving back in the
/// wallet, followed by the case-specific reconciliation. Re-running on
/// the same inputs yields the identical ordered sequence.
///
/// # Errors
/// `UnhandledCase` when the combination is outside the nine rows; no
/// records are produced in that case.
pub fn classify_withdrawal(
    basis: &Basis,
    coins_base: FixedAmount,
    coins_asset: FixedAmount,
    pool: &crate::domain::PoolId,
    ctx: &WithdrawalContext<'_>,
) -> Result<Vec<LedgerRecord>, EngineError> {
    let basis_base = basis.amounts.get(&ctx.base);
    let basis_asset = basis.amounts.get(&ctx.asset);

    let case = WithdrawalCase::classify(basis_base, basis_asset, coins_base, coins_asset)
        .ok_or_else(|| EngineError::UnhandledCase {
            pool: pool.clone(),
            basis_base,
            basis_asset,
            coins_base,
            coins_asset,
        })?;

    let mut out = Emitter {
        ctx,
        records: Vec::new(),
        fee: ctx.fee.clone(),
    };

    // the basis arrives back into the wallet before any implicit trade
    for (currency, amount) in [(&ctx.base, basis_base), (&ctx.asset, basis_asset)] {
        if amount.is_positive() {
            out.records.push(
                LedgerRecord::new(RecordKind::Deposit, ctx.timestamp.format_date(-1))
                    .buy(amount, currency.clone())
                    .comment(ctx.pool_comment.clone()),
            );
        }
    }

    match case {
        WithdrawalCase::BaseToAsset => {
            out.trade(coins_asset, &ctx.asset, basis_base, &ctx.base);
            out.withdrawal(coins_asset);
        }
        WithdrawalCase::AssetToBase => {
            out.trade(coins_base, &ctx.base, basis_asset, &ctx.asset);
        }
        WithdrawalCase::BaseToBoth => {
            // half the base basis bought the asset leg; the other half is
            // measured against the base actually received
            let half = basis_base * FixedAmount::parse("0.5").unwrap_or_default();
            let other_half = basis_base - half;
            out.trade(coins_asset, &ctx.asset, half, &ctx.base);
            out.withdrawal(coins_asset);
            out.income_or_loss(coins_base - other_half, &ctx.base);
        }
        WithdrawalCase::AssetToBoth => {
            let half = basis_asset * FixedAmount::parse("0.5").unwrap_or_default();
            let other_half = basis_asset - half;
            out.trade(coins_base, &ctx.base, half, &ctx.asset);
            out.income_or_loss(coins_asset - other_half, &ctx.asset);
            out.withdrawal(coins_asset);
        }
        WithdrawalCase::BothToBase => {
            if basis_base < coins_base {
                // the extra base was bought with the asset basis
                out.trade(coins_base - basis_base, &ctx.base, basis_asset, &ctx.asset);
            } else {
                // shrinkage reports one loss per currency, never netted
                out.loss(basis_asset, &ctx.asset);
                if basis_base > coins_base {
                    out.loss(basis_base - coins_base, &ctx.base);
                }
            }
            out.withdrawal(coins_asset);
        }
        WithdrawalCase::BothToAsset => {
            if basis_asset < coins_asset {
                out.trade(coins_asset - basis_asset, &ctx.asset, basis_base, &ctx.base);
            } else {
                out.loss(basis_base, &ctx.base);
                if basis_asset > coins_asset {
                    out.loss(basis_asset - coins_asset, &ctx.asset);
                }
            }
            out.withdrawal(coins_asset);
        }
        WithdrawalCase::AssetToAsset => {
            out.income_or_loss(coins_asset - basis_asset, &ctx.asset);
            out.withdrawal(coins_asset);
        }
        WithdrawalCase::BaseToBase => {
            out.income_or_loss(coins_base - basis_base, &ctx.base);
        }
        WithdrawalCase::BothToBoth => {
            out.income_or_loss(coins_base - basis_base, &ctx.base);
            out.income_or_loss(coins_asset - basis_asset, &ctx.asset);
            out.withdrawal(coins_asset);
        }
    }

    Ok(out.records)
}

/// Accumulates the emitted sequence and hands the fee to the first
/// reconciliation record only.
struct Emitter<'a, 'c> {
    ctx: &'a WithdrawalContext<'c>,
    records: Vec<LedgerRecord>,
    fee: Option<(FixedAmount, Currency)>,
}

impl Emitter<'_, '_> {
    fn trade(&mut self, buy: FixedAmount, buy_curr: &Currency, sell: FixedAmount, sell_curr: &Currency) {
        let fee = self.fee.take();
        self.records.push(
            LedgerRecord::new(RecordKind::Trade, self.ctx.timestamp.format_date(0))
                .buy(buy, buy_curr.clone())
                .sell(sell, sell_curr.clone())
                .fee(fee),
        );
    }

    /// Record for a non-base leg leaving toward the external wallet.
    /// Zero amounts emit nothing.
    fn withdrawal(&mut self, amount: FixedAmount) {
        if !amount.is_positive() {
            return;
        }
        let fee = self.fee.take();
        let mut record = LedgerRecord::new(RecordKind::Withdrawal, self.ctx.timestamp.format_date(1))
            .sell(amount, self.ctx.asset.clone())
            .fee(fee);
        if let Some(tx_id) = self.ctx.tx_id {
            record = record.tx(tx_id);
        }
        self.records.push(record);
    }

    /// Positive difference is income, negative a loss (absolute value
    /// recorded), exactly zero emits nothing.
    fn income_or_loss(&mut self, diff: FixedAmount, currency: &Currency) {
        if diff.is_positive() {
            let fee = self.fee.take();
            self.records.push(
                LedgerRecord::new(RecordKind::Income, self.ctx.timestamp.format_date(0))
                    .buy(diff, currency.clone())
                    .fee(fee),
            );
        } else if diff.is_negative() {
            self.loss(diff.abs(), currency);
        }
    }

    fn loss(&mut self, amount: FixedAmount, currency: &Currency) {
        if !amount.is_positive() {
            return;
        }
        let fee = self.fee.take();
        self.records.push(
            LedgerRecord::new(RecordKind::Loss, self.ctx.timestamp.format_date(0))
                .sell(amount, currency.clone())
                .fee(fee),
        );
    }
}
