//! Error handling for investment-stats
//!
//! The analytics core reports input inconsistencies through the typed
//! [`AnalyticsError`]. The file loaders and the CLI use anyhow for context
//! chaining on top of it.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Input inconsistencies detected by the analytics core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("no positions with transactions; cannot determine portfolio start date")]
    NoPositions,

    #[error("no portfolio stock has quote history before the portfolio start date {start_date}")]
    NoReferenceStock { start_date: NaiveDate },

    #[error(
        "{symbol}: sell of {selling} units on {trade_date} exceeds the {held} units held"
    )]
    OverSell {
        symbol: String,
        trade_date: NaiveDate,
        selling: Decimal,
        held: Decimal,
    },

    #[error("{symbol}: {available} quotes available but the market calendar has {needed} dates")]
    InsufficientQuotes {
        symbol: String,
        needed: usize,
        available: usize,
    },

    #[error("{symbol}: day quotes are not strictly increasing at {date}")]
    UnorderedQuotes { symbol: String, date: NaiveDate },

    #[error("{symbol}: series has {actual} rows but the market calendar has {expected} dates")]
    MisalignedSeries {
        symbol: String,
        expected: usize,
        actual: usize,
    },

    #[error("no quote data loaded for portfolio symbol {0}")]
    MissingStock(String),

    #[error("{0} appears in more than one position")]
    DuplicatePosition(String),

    #[error("{symbol}: latest quote {latest} is older than the last day quote {last_day}")]
    StaleLatestQuote {
        symbol: String,
        latest: NaiveDate,
        last_day: NaiveDate,
    },

    #[error("date index {index} is outside the market calendar of {len} dates")]
    DateOutOfRange { index: usize, len: usize },
}

/// Result type for the analytics core
pub type AnalyticsResult<T> = std::result::Result<T, AnalyticsError>;

/// Result type alias for I/O and CLI operations
pub type Result<T> = anyhow::Result<T>;
