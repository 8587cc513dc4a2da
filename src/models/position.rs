use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Buy or sell event. Positive quantity buys, negative quantity sells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(with = "super::calendar_date")]
    pub trade_date: NaiveDate,
    pub quantity: Decimal,
    pub purchase_price: Decimal,
}

impl Transaction {
    pub fn buy(trade_date: NaiveDate, quantity: Decimal, purchase_price: Decimal) -> Self {
        Self {
            trade_date,
            quantity: quantity.abs(),
            purchase_price,
        }
    }

    pub fn sell(trade_date: NaiveDate, quantity: Decimal, purchase_price: Decimal) -> Self {
        Self {
            trade_date,
            quantity: -quantity.abs(),
            purchase_price,
        }
    }

    pub fn is_buy(&self) -> bool {
        self.quantity > Decimal::ZERO
    }

    pub fn is_sell(&self) -> bool {
        self.quantity < Decimal::ZERO
    }
}

/// All transactions ever made for one symbol, ordered by trade date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PositionFields")]
pub struct Position {
    pub symbol: String,
    transactions: Vec<Transaction>,
}

/// Deserialized shape of [`Position`], ordered through [`Position::new`]
#[derive(Deserialize)]
struct PositionFields {
    symbol: String,
    transactions: Vec<Transaction>,
}

impl From<PositionFields> for Position {
    fn from(fields: PositionFields) -> Self {
        Position::new(fields.symbol, fields.transactions)
    }
}

impl Position {
    /// Build a position, ordering transactions by trade date.
    /// Same-day transactions keep their input order.
    pub fn new(symbol: impl Into<String>, mut transactions: Vec<Transaction>) -> Self {
        transactions.sort_by_key(|t| t.trade_date);
        Self {
            symbol: symbol.into(),
            transactions,
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn first_trade_date(&self) -> Option<NaiveDate> {
        self.transactions.first().map(|t| t.trade_date)
    }

    /// Net quantity after every transaction
    pub fn net_quantity(&self) -> Decimal {
        self.transactions.iter().map(|t| t.quantity).sum()
    }
}
