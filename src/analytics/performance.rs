use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Quote, Stock};
use crate::utils::{percent_of, round_display};

/// Close-to-close change since the first quote of a window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerformancePoint {
    pub date: NaiveDate,
    pub close: Decimal,
    pub change_pct: Decimal,
}

/// Quotes (history plus latest) dated within `[start, end]`
pub fn quote_window(stock: &Stock, start: NaiveDate, end: NaiveDate) -> Vec<&Quote> {
    stock
        .quotes()
        .filter(|q| q.date >= start && q.date <= end)
        .collect()
}

/// Percent change of every close in the window relative to the first close
pub fn relative_performance(stock: &Stock, start: NaiveDate, end: NaiveDate) -> Vec<PerformancePoint> {
    let window = quote_window(stock, start, end);
    let Some(first) = window.first().map(|q| q.close) else {
        return Vec::new();
    };

    window
        .into_iter()
        .map(|q| PerformancePoint {
            date: q.date,
            close: q.close,
            change_pct: round_display(percent_of(q.close - first, first)),
        })
        .collect()
}

/// [`relative_performance`] for every stock, keyed by symbol
pub fn watchlist_performance<'a>(
    stocks: impl IntoIterator<Item = &'a Stock>,
    start: NaiveDate,
    end: NaiveDate,
) -> BTreeMap<String, Vec<PerformancePoint>> {
    stocks
        .into_iter()
        .map(|s| (s.symbol.clone(), relative_performance(s, start, end)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 11, d).unwrap()
    }

    fn stock(symbol: &str, closes: &[(u32, Decimal)], latest: (u32, Decimal)) -> Stock {
        Stock {
            symbol: symbol.to_string(),
            company_name: String::new(),
            industry: String::new(),
            issue_type: "et".to_string(),
            day_quotes: closes.iter().map(|(d, c)| Quote::flat(day(*d), *c, dec!(1))).collect(),
            latest_quote: Quote::flat(day(latest.0), latest.1, dec!(1)),
        }
    }

    #[test]
    fn test_window_includes_latest_quote() {
        let s = stock("SPY", &[(1, dec!(400)), (2, dec!(404)), (3, dec!(396))], (4, dec!(420)));
        let dates: Vec<_> = quote_window(&s, day(2), day(4)).iter().map(|q| q.date).collect();
        assert_eq!(dates, vec![day(2), day(3), day(4)]);
    }

    #[test]
    fn test_relative_performance_from_first_close() {
        let s = stock("SPY", &[(1, dec!(400)), (2, dec!(404)), (3, dec!(396))], (4, dec!(420)));
        let points = relative_performance(&s, day(1), day(30));
        let changes: Vec<_> = points.iter().map(|p| p.change_pct).collect();
        assert_eq!(changes, vec![dec!(0), dec!(1), dec!(-1), dec!(5)]);
    }

    #[test]
    fn test_empty_window_and_zero_first_close() {
        let s = stock("ZERO", &[(1, dec!(0)), (2, dec!(5))], (3, dec!(6)));
        assert!(relative_performance(&s, day(10), day(20)).is_empty());
        assert!(relative_performance(&s, day(1), day(3))
            .iter()
            .all(|p| p.change_pct.is_zero()));
    }

    #[test]
    fn test_watchlist_keyed_by_symbol() {
        let a = stock("QQQ", &[(1, dec!(100))], (2, dec!(110)));
        let b = stock("DIA", &[(1, dec!(50))], (2, dec!(45)));
        let all = watchlist_performance([&a, &b], day(1), day(2));
        assert_eq!(all.keys().collect::<Vec<_>>(), vec!["DIA", "QQQ"]);
        assert_eq!(all["DIA"][1].change_pct, dec!(-10));
    }
}
