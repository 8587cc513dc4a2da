use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{AnalyticsError, AnalyticsResult};
use crate::models::{Position, Stock};

/// Ordered market dates shared by every per-date table of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketCalendar {
    start_date: NaiveDate,
    reference_symbol: String,
    dates: Vec<NaiveDate>,
}

impl MarketCalendar {
    /// Derive the market-date axis from the portfolio stocks and positions.
    ///
    /// The first portfolio stock whose history starts before the portfolio
    /// start date is used as the reference for which days are trading days.
    /// Its historical dates from the start date on are taken in order and the
    /// date of its latest quote is appended last.
    pub fn derive(portfolio_stocks: &[Stock], positions: &[Position]) -> AnalyticsResult<Self> {
        let start_date = portfolio_start_date(positions).ok_or(AnalyticsError::NoPositions)?;

        let reference = portfolio_stocks
            .iter()
            .find(|s| {
                s.earliest_history_date()
                    .is_some_and(|earliest| earliest < start_date)
            })
            .ok_or(AnalyticsError::NoReferenceStock { start_date })?;

        debug!(
            "Using {} as the market calendar reference stock",
            reference.symbol
        );

        let dates: Vec<NaiveDate> = reference
            .day_quotes
            .iter()
            .map(|q| q.date)
            .filter(|d| *d >= start_date)
            .chain(std::iter::once(reference.latest_quote.date))
            .collect();

        info!(
            "Market calendar: {} dates from {} (reference {})",
            dates.len(),
            start_date,
            reference.symbol
        );

        Ok(Self {
            start_date,
            reference_symbol: reference.symbol.clone(),
            dates,
        })
    }

    /// Build a calendar from explicit dates
    pub fn from_dates(start_date: NaiveDate, reference_symbol: impl Into<String>, dates: Vec<NaiveDate>) -> Self {
        Self {
            start_date,
            reference_symbol: reference_symbol.into(),
            dates,
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn reference_symbol(&self) -> &str {
        &self.reference_symbol
    }

    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Index of `date` on the axis. When the latest quote repeats the last
    /// historical date, the later entry wins.
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        self.dates.iter().rposition(|d| *d == date)
    }
}

/// Earliest first trade date across all positions
pub fn portfolio_start_date(positions: &[Position]) -> Option<NaiveDate> {
    positions.iter().filter_map(Position::first_trade_date).min()
}
