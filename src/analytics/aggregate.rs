use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use super::calendar::MarketCalendar;
use super::cost_basis::StockSeries;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::utils::{percent_of, round_display};

/// Portfolio-wide totals on one market date
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateRow {
    pub date: NaiveDate,
    pub invested_amount: Decimal,
    pub market_value: Decimal,
    pub unrealized_gain: Decimal,
    pub unrealized_gain_pct: Decimal,
    pub realized_gain: Decimal,
    pub realized_gain_pct: Decimal,
    pub total_gain: Decimal,
    pub total_gain_pct: Decimal,
}

impl AggregateRow {
    fn zero(date: NaiveDate) -> Self {
        Self {
            date,
            invested_amount: Decimal::ZERO,
            market_value: Decimal::ZERO,
            unrealized_gain: Decimal::ZERO,
            unrealized_gain_pct: Decimal::ZERO,
            realized_gain: Decimal::ZERO,
            realized_gain_pct: Decimal::ZERO,
            total_gain: Decimal::ZERO,
            total_gain_pct: Decimal::ZERO,
        }
    }

    fn derive_percentages(&mut self) {
        self.unrealized_gain_pct = round_display(percent_of(self.unrealized_gain, self.invested_amount));
        self.realized_gain_pct = round_display(percent_of(self.realized_gain, self.invested_amount));
        self.total_gain_pct = round_display(percent_of(self.total_gain, self.invested_amount));
    }
}

/// Sum per-symbol series into one table over the calendar.
///
/// Absolute columns are summed; percentages are derived again from the sums.
pub fn aggregate<'a>(
    calendar: &MarketCalendar,
    series: impl IntoIterator<Item = &'a StockSeries>,
) -> AnalyticsResult<Vec<AggregateRow>> {
    let mut rows: Vec<AggregateRow> = calendar.dates().iter().copied().map(AggregateRow::zero).collect();

    let mut symbols = 0usize;
    for stock in series {
        if stock.rows.len() != rows.len() {
            return Err(AnalyticsError::MisalignedSeries {
                symbol: stock.symbol.clone(),
                expected: rows.len(),
                actual: stock.rows.len(),
            });
        }
        for (total, row) in rows.iter_mut().zip(&stock.rows) {
            total.invested_amount += row.invested_amount;
            total.market_value += row.market_value;
            total.unrealized_gain += row.unrealized_gain;
            total.realized_gain += row.realized_gain;
            total.total_gain += row.total_gain;
        }
        symbols += 1;
    }

    rows.iter_mut().for_each(AggregateRow::derive_percentages);

    debug!("Aggregated {} symbols over {} dates", symbols, rows.len());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::cost_basis::compute_stock_series;
    use crate::models::{Position, Quote, Stock, Transaction};
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 6, d).unwrap()
    }

    fn stock(symbol: &str, closes: &[Decimal]) -> Stock {
        let mut quotes: Vec<Quote> = closes
            .iter()
            .enumerate()
            .map(|(i, c)| Quote::flat(day(i as u32 + 1), *c, dec!(10)))
            .collect();
        let latest_quote = quotes.pop().unwrap();
        Stock {
            symbol: symbol.to_string(),
            company_name: symbol.to_string(),
            industry: String::new(),
            issue_type: "cs".to_string(),
            day_quotes: quotes,
            latest_quote,
        }
    }

    fn calendar() -> MarketCalendar {
        MarketCalendar::from_dates(day(1), "AAA", vec![day(1), day(2), day(3)])
    }

    #[test]
    fn test_aggregate_sums_absolutes_and_rederives_percentages() {
        let cal = calendar();
        let a = compute_stock_series(
            &stock("AAA", &[dec!(10), dec!(20), dec!(20)]),
            Some(&Position::new("AAA", vec![Transaction::buy(day(1), dec!(10), dec!(10))])),
            &cal,
        )
        .unwrap();
        let b = compute_stock_series(
            &stock("BBB", &[dec!(100), dec!(100), dec!(50)]),
            Some(&Position::new("BBB", vec![Transaction::buy(day(1), dec!(3), dec!(100))])),
            &cal,
        )
        .unwrap();

        let rows = aggregate(&cal, [&a, &b]).unwrap();
        assert_eq!(rows.len(), 3);

        // Day 2: AAA +100%, BBB flat
        assert_eq!(rows[1].invested_amount, dec!(400));
        assert_eq!(rows[1].market_value, dec!(500));
        assert_eq!(rows[1].unrealized_gain, dec!(100));
        assert_eq!(rows[1].unrealized_gain_pct, dec!(25));

        // Day 3: AAA +100, BBB -150
        assert_eq!(rows[2].unrealized_gain, dec!(-50));
        assert_eq!(rows[2].unrealized_gain_pct, dec!(-12.5));
        assert_eq!(rows[2].total_gain_pct, dec!(-12.5));

        for (i, row) in rows.iter().enumerate() {
            assert_eq!(
                row.invested_amount,
                a.rows[i].invested_amount + b.rows[i].invested_amount
            );
        }
    }

    #[test]
    fn test_empty_input_yields_zero_table() {
        let rows = aggregate(&calendar(), std::iter::empty()).unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.invested_amount.is_zero() && r.total_gain_pct.is_zero()));
        assert_eq!(rows[2].date, day(3));
    }

    #[test]
    fn test_misaligned_series_is_rejected() {
        let cal = calendar();
        let mut series = compute_stock_series(&stock("AAA", &[dec!(1), dec!(2), dec!(3)]), None, &cal).unwrap();
        series.rows.pop();

        assert_eq!(
            aggregate(&cal, [&series]).unwrap_err(),
            AnalyticsError::MisalignedSeries {
                symbol: "AAA".to_string(),
                expected: 3,
                actual: 2,
            }
        );
    }
}
