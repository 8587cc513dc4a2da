use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, AnalyticsResult};

/// One daily price bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    #[serde(with = "super::calendar_date")]
    pub date: NaiveDate,
    pub high: Decimal,
    pub low: Decimal,
    pub open: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl Quote {
    /// Bar where open, high, low and close are all `price`
    pub fn flat(date: NaiveDate, price: Decimal, volume: Decimal) -> Self {
        Self {
            date,
            high: price,
            low: price,
            open: price,
            close: price,
            volume,
        }
    }
}

/// Roles a stock can play in a run. A stock may carry several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StockRole {
    Portfolio,
    Watchlist,
    IndexTracker,
}

impl StockRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockRole::Portfolio => "PORTFOLIO",
            StockRole::Watchlist => "WATCHLIST",
            StockRole::IndexTracker => "INDEX_TRACKER",
        }
    }
}

/// Stock identity plus its quote series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    pub symbol: String,
    pub company_name: String,
    pub industry: String,
    pub issue_type: String,
    /// Historical day bars, strictly increasing by date
    pub day_quotes: Vec<Quote>,
    /// Most recent bar, always last in [`Stock::quotes`]
    pub latest_quote: Quote,
}

impl Stock {
    /// Historical day quotes followed by the latest quote
    pub fn quotes(&self) -> impl Iterator<Item = &Quote> {
        self.day_quotes.iter().chain(std::iter::once(&self.latest_quote))
    }

    /// Number of bars in [`Stock::quotes`]
    pub fn quote_count(&self) -> usize {
        self.day_quotes.len() + 1
    }

    /// Date of the first historical bar, if there is any history
    pub fn earliest_history_date(&self) -> Option<NaiveDate> {
        self.day_quotes.first().map(|q| q.date)
    }

    /// The last `n` bars of [`Stock::quotes`], oldest first.
    ///
    /// Fails when fewer than `n` bars exist.
    pub fn tail_quotes(&self, n: usize) -> AnalyticsResult<Vec<&Quote>> {
        let available = self.quote_count();
        if available < n {
            return Err(AnalyticsError::InsufficientQuotes {
                symbol: self.symbol.clone(),
                needed: n,
                available,
            });
        }
        Ok(self.quotes().skip(available - n).collect())
    }

    /// Check that day quotes are strictly increasing by date and that the
    /// latest quote is not older than the last of them
    pub fn validate(&self) -> AnalyticsResult<()> {
        for pair in self.day_quotes.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(AnalyticsError::UnorderedQuotes {
                    symbol: self.symbol.clone(),
                    date: pair[1].date,
                });
            }
        }
        if let Some(last_day) = self.day_quotes.last().map(|q| q.date) {
            if self.latest_quote.date < last_day {
                return Err(AnalyticsError::StaleLatestQuote {
                    symbol: self.symbol.clone(),
                    latest: self.latest_quote.date,
                    last_day,
                });
            }
        }
        Ok(())
    }
}
