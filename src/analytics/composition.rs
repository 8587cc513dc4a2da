//! Portfolio composition on one market date
//!
//! Each stock's share of the portfolio's invested and market value, its share
//! of every gain, and the same figures rolled up per category alongside the
//! category's allocation target.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::aggregate::AggregateRow;
use super::cost_basis::StockSeries;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::utils::{percent_of, round_display};

/// Category label for symbols without an assignment
pub const UNKNOWN_CATEGORY: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockCompositionRow {
    pub symbol: String,
    pub category: String,
    pub composition_invested: Decimal,
    pub composition_market: Decimal,
    pub relative_realized_gain: Decimal,
    pub relative_unrealized_gain: Decimal,
    pub relative_total_gain: Decimal,
    pub invested_amount: Decimal,
    pub market_value: Decimal,
    pub realized_gain: Decimal,
    pub realized_gain_pct: Decimal,
    pub unrealized_gain: Decimal,
    pub unrealized_gain_pct: Decimal,
    pub total_gain: Decimal,
    pub total_gain_pct: Decimal,
    pub company_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCompositionRow {
    pub category: String,
    pub composition_invested: Decimal,
    pub composition_market: Decimal,
    pub relative_realized_gain: Decimal,
    pub relative_unrealized_gain: Decimal,
    pub relative_total_gain: Decimal,
    pub invested_amount: Decimal,
    pub market_value: Decimal,
    pub realized_gain: Decimal,
    pub realized_gain_pct: Decimal,
    pub unrealized_gain: Decimal,
    pub unrealized_gain_pct: Decimal,
    pub total_gain: Decimal,
    pub total_gain_pct: Decimal,
    pub desired_allocation: Decimal,
    pub desired_composition_diff: Decimal,
}

/// Stock and category composition for one date
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Composition {
    pub date: NaiveDate,
    pub stocks: Vec<StockCompositionRow>,
    pub categories: Vec<CategoryCompositionRow>,
}

#[derive(Debug, Default)]
struct CategoryTotals {
    composition_invested: Decimal,
    composition_market: Decimal,
    relative_realized_gain: Decimal,
    relative_unrealized_gain: Decimal,
    relative_total_gain: Decimal,
    invested_amount: Decimal,
    market_value: Decimal,
    realized_gain: Decimal,
    unrealized_gain: Decimal,
    total_gain: Decimal,
}

impl CategoryTotals {
    fn into_row(self, category: String, targets: &BTreeMap<String, Decimal>) -> CategoryCompositionRow {
        let desired_allocation = if category == UNKNOWN_CATEGORY {
            Decimal::ZERO
        } else {
            targets.get(&category).copied().unwrap_or(Decimal::ZERO)
        };

        CategoryCompositionRow {
            composition_invested: round_display(self.composition_invested),
            composition_market: round_display(self.composition_market),
            relative_realized_gain: round_display(self.relative_realized_gain),
            relative_unrealized_gain: round_display(self.relative_unrealized_gain),
            relative_total_gain: round_display(self.relative_total_gain),
            invested_amount: round_display(self.invested_amount),
            market_value: round_display(self.market_value),
            realized_gain: round_display(self.realized_gain),
            realized_gain_pct: round_display(percent_of(self.realized_gain, self.invested_amount)),
            unrealized_gain: round_display(self.unrealized_gain),
            unrealized_gain_pct: round_display(percent_of(self.unrealized_gain, self.invested_amount)),
            total_gain: round_display(self.total_gain),
            total_gain_pct: round_display(percent_of(self.total_gain, self.invested_amount)),
            desired_allocation: round_display(desired_allocation),
            desired_composition_diff: round_display(self.composition_invested - desired_allocation),
            category,
        }
    }
}

/// Category of `symbol`, falling back to [`UNKNOWN_CATEGORY`]
pub fn category_of<'a>(categories: &'a BTreeMap<String, String>, symbol: &str) -> &'a str {
    categories
        .get(symbol)
        .map(String::as_str)
        .unwrap_or(UNKNOWN_CATEGORY)
}

/// Composition of the portfolio at calendar position `index`.
///
/// `series` are the portfolio's per-symbol tables and `aggregate` their sum.
/// Only categories holding at least one stock produce a row; category rows
/// are ordered by label.
pub fn composition<'a>(
    index: usize,
    series: impl IntoIterator<Item = &'a StockSeries>,
    aggregate: &[AggregateRow],
    categories: &BTreeMap<String, String>,
    targets: &BTreeMap<String, Decimal>,
) -> AnalyticsResult<Composition> {
    let total = aggregate.get(index).ok_or(AnalyticsError::DateOutOfRange {
        index,
        len: aggregate.len(),
    })?;

    let mut stocks = Vec::new();
    let mut by_category: BTreeMap<String, CategoryTotals> = BTreeMap::new();

    for stock in series {
        let row = stock
            .rows
            .get(index)
            .filter(|_| stock.rows.len() == aggregate.len())
            .ok_or_else(|| AnalyticsError::MisalignedSeries {
                symbol: stock.symbol.clone(),
                expected: aggregate.len(),
                actual: stock.rows.len(),
            })?;
        let category = category_of(categories, &stock.symbol);

        let composition_invested = percent_of(row.invested_amount, total.invested_amount);
        let composition_market = percent_of(row.market_value, total.market_value);
        let relative_realized_gain = percent_of(row.realized_gain, total.realized_gain);
        let relative_unrealized_gain = percent_of(row.unrealized_gain, total.unrealized_gain);
        let relative_total_gain = percent_of(row.total_gain, total.total_gain);

        let totals = by_category.entry(category.to_string()).or_default();
        totals.composition_invested += composition_invested;
        totals.composition_market += composition_market;
        totals.relative_realized_gain += relative_realized_gain;
        totals.relative_unrealized_gain += relative_unrealized_gain;
        totals.relative_total_gain += relative_total_gain;
        totals.invested_amount += row.invested_amount;
        totals.market_value += row.market_value;
        totals.realized_gain += row.realized_gain;
        totals.unrealized_gain += row.unrealized_gain;
        totals.total_gain += row.total_gain;

        stocks.push(StockCompositionRow {
            symbol: stock.symbol.clone(),
            category: category.to_string(),
            composition_invested: round_display(composition_invested),
            composition_market: round_display(composition_market),
            relative_realized_gain: round_display(relative_realized_gain),
            relative_unrealized_gain: round_display(relative_unrealized_gain),
            relative_total_gain: round_display(relative_total_gain),
            invested_amount: row.invested_amount,
            market_value: row.market_value,
            realized_gain: row.realized_gain,
            realized_gain_pct: row.realized_gain_pct,
            unrealized_gain: row.unrealized_gain,
            unrealized_gain_pct: row.unrealized_gain_pct,
            total_gain: row.total_gain,
            total_gain_pct: row.total_gain_pct,
            company_name: row.company_name.clone(),
        });
    }

    let categories = by_category
        .into_iter()
        .map(|(category, totals)| totals.into_row(category, targets))
        .collect();

    Ok(Composition {
        date: total.date,
        stocks,
        categories,
    })
}
