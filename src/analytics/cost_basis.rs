//! Per-symbol cost-basis walk
//!
//! Replays a position's transactions against the market calendar, one date at
//! a time, with a forward-only transaction cursor. The running state is an
//! explicit [`LedgerState`] value: each transaction produces the next state
//! from the previous one, and each date turns the current state plus that
//! day's quote into a [`StockStatsRow`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use super::calendar::MarketCalendar;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::models::{Position, Quote, Stock, Transaction};
use crate::utils::{percent_of, round_display};

/// Running average-cost ledger for one symbol
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerState {
    pub quantity: Decimal,
    pub average_cost: Decimal,
    pub realized_gain: Decimal,
}

impl LedgerState {
    /// Apply one transaction.
    ///
    /// Buys move the average cost; sells keep it and realize
    /// `(price - average_cost) * sold`. Selling more than is held fails.
    pub fn apply(self, symbol: &str, tx: &Transaction) -> AnalyticsResult<Self> {
        if tx.is_buy() {
            let quantity = self.quantity + tx.quantity;
            let average_cost =
                (self.average_cost * self.quantity + tx.quantity * tx.purchase_price) / quantity;
            Ok(Self {
                quantity,
                average_cost,
                ..self
            })
        } else if tx.is_sell() {
            let selling = -tx.quantity;
            if selling > self.quantity {
                return Err(AnalyticsError::OverSell {
                    symbol: symbol.to_string(),
                    trade_date: tx.trade_date,
                    selling,
                    held: self.quantity,
                });
            }
            Ok(Self {
                quantity: self.quantity - selling,
                realized_gain: self.realized_gain + (tx.purchase_price - self.average_cost) * selling,
                ..self
            })
        } else {
            Ok(self)
        }
    }

    pub fn invested_amount(&self) -> Decimal {
        self.quantity * self.average_cost
    }

    /// Value the ledger at `quote` and produce the (rounded) row for `date`
    pub fn snapshot(&self, date: NaiveDate, quote: &Quote, company_name: &str) -> StockStatsRow {
        let invested_amount = self.invested_amount();
        let realized_gain = self.realized_gain;

        let (market_value, unrealized_gain) = if invested_amount > Decimal::ZERO {
            let market_value = quote.close * self.quantity;
            (market_value, market_value - invested_amount)
        } else {
            (Decimal::ZERO, Decimal::ZERO)
        };
        let total_gain = unrealized_gain + realized_gain;

        StockStatsRow {
            date,
            invested_amount: round_display(invested_amount),
            market_value: round_display(market_value),
            unrealized_gain: round_display(unrealized_gain),
            unrealized_gain_pct: round_display(percent_of(unrealized_gain, invested_amount)),
            realized_gain: round_display(realized_gain),
            realized_gain_pct: round_display(percent_of(realized_gain, invested_amount)),
            total_gain: round_display(total_gain),
            total_gain_pct: round_display(percent_of(total_gain, invested_amount)),
            quantity: round_display(self.quantity),
            average_cost: round_display(self.average_cost),
            high: round_display(quote.high),
            low: round_display(quote.low),
            open: round_display(quote.open),
            close: round_display(quote.close),
            volume: round_display(quote.volume),
            company_name: company_name.to_string(),
        }
    }
}

/// One symbol's statistics on one market date
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockStatsRow {
    pub date: NaiveDate,
    pub invested_amount: Decimal,
    pub market_value: Decimal,
    pub unrealized_gain: Decimal,
    pub unrealized_gain_pct: Decimal,
    pub realized_gain: Decimal,
    pub realized_gain_pct: Decimal,
    pub total_gain: Decimal,
    pub total_gain_pct: Decimal,
    pub quantity: Decimal,
    pub average_cost: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub open: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    pub company_name: String,
}

/// Per-date statistics of one symbol over the whole market calendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockSeries {
    pub symbol: String,
    pub rows: Vec<StockStatsRow>,
}

impl StockSeries {
    pub fn latest(&self) -> Option<&StockStatsRow> {
        self.rows.last()
    }
}

/// Walk `position` (if any) over the calendar, pricing each date with the
/// right-anchored tail of the stock's quotes.
///
/// A stock without a position yields an all-zero ledger with passthrough
/// prices.
pub fn compute_stock_series(
    stock: &Stock,
    position: Option<&Position>,
    calendar: &MarketCalendar,
) -> AnalyticsResult<StockSeries> {
    let quotes = stock.tail_quotes(calendar.len())?;
    let transactions: &[Transaction] = position.map(Position::transactions).unwrap_or(&[]);
    let mut pending = transactions.iter().peekable();

    let mut state = LedgerState::default();
    let mut rows = Vec::with_capacity(calendar.len());

    for (date, quote) in calendar.dates().iter().zip(quotes) {
        while let Some(tx) = pending.next_if(|t| t.trade_date <= *date) {
            state = state.apply(&stock.symbol, tx)?;
        }
        rows.push(state.snapshot(*date, quote, &stock.company_name));
    }

    // Later trades are not shown but must still form a valid ledger
    let mut late = 0usize;
    for tx in pending {
        state = state.apply(&stock.symbol, tx)?;
        late += 1;
    }
    if late > 0 {
        debug!(
            "{}: {} transactions fall after the last market date",
            stock.symbol, late
        );
    }

    Ok(StockSeries {
        symbol: stock.symbol.clone(),
        rows,
    })
}
