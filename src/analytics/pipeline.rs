//! One analytics pass over fully loaded inputs
//!
//! [`PortfolioAnalytics::run`] derives the market calendar, walks every
//! portfolio stock, aggregates, and computes the composition of every market
//! date. The resulting tables are held for lookups by symbol or date.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use super::aggregate::{aggregate, AggregateRow};
use super::allocation::{solve_break_even, AllocationPlan};
use super::calendar::MarketCalendar;
use super::composition::{composition, CategoryCompositionRow, Composition, StockCompositionRow};
use super::cost_basis::{compute_stock_series, StockSeries, StockStatsRow};
use super::performance::{watchlist_performance, PerformancePoint};
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::models::{Position, Stock};

/// Parsed inputs of a run
#[derive(Debug, Clone, Default)]
pub struct PortfolioInputs {
    /// Every tracked symbol, deduplicated
    pub symbols: Vec<String>,
    /// Symbol to category label
    pub categories: BTreeMap<String, String>,
    /// Category label to target percent
    pub allocation: BTreeMap<String, Decimal>,
    pub index_trackers: Vec<Stock>,
    pub watchlist: Vec<Stock>,
    pub portfolio: Vec<Stock>,
    pub positions: Vec<Position>,
}

/// Stock stats row tagged with its symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolStatsRow {
    pub symbol: String,
    #[serde(flatten)]
    pub row: StockStatsRow,
}

/// Composition row tagged with its date
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatedRow<T> {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub row: T,
}

#[derive(Debug, Clone)]
pub struct PortfolioAnalytics {
    calendar: MarketCalendar,
    stock_stats: BTreeMap<String, StockSeries>,
    aggregate_stats: Vec<AggregateRow>,
    compositions: Vec<Composition>,
    index_trackers: Vec<Stock>,
    watchlist: Vec<Stock>,
}

impl PortfolioAnalytics {
    /// Run every stage. Any inconsistency in the inputs aborts the run.
    pub fn run(inputs: PortfolioInputs) -> AnalyticsResult<Self> {
        let PortfolioInputs {
            symbols,
            categories,
            allocation,
            index_trackers,
            watchlist,
            portfolio,
            positions,
        } = inputs;

        for stock in portfolio.iter().chain(&watchlist).chain(&index_trackers) {
            stock.validate()?;
        }

        info!(
            "Running analytics: {} symbols, {} portfolio stocks, {} positions",
            symbols.len(),
            portfolio.len(),
            positions.len()
        );

        let calendar = MarketCalendar::derive(&portfolio, &positions)?;

        let mut by_symbol: HashMap<&str, &Position> = HashMap::with_capacity(positions.len());
        for position in &positions {
            if by_symbol.insert(position.symbol.as_str(), position).is_some() {
                return Err(AnalyticsError::DuplicatePosition(position.symbol.clone()));
            }
        }
        if let Some(orphan) = positions
            .iter()
            .find(|p| !portfolio.iter().any(|s| s.symbol == p.symbol))
        {
            return Err(AnalyticsError::MissingStock(orphan.symbol.clone()));
        }

        let mut stock_stats = BTreeMap::new();
        for stock in &portfolio {
            let position = by_symbol.get(stock.symbol.as_str()).copied();
            let series = compute_stock_series(stock, position, &calendar)?;
            debug!("Walked {} over {} dates", stock.symbol, series.rows.len());
            stock_stats.insert(stock.symbol.clone(), series);
        }

        let aggregate_stats = aggregate(&calendar, stock_stats.values())?;

        let compositions = (0..calendar.len())
            .map(|i| composition(i, stock_stats.values(), &aggregate_stats, &categories, &allocation))
            .collect::<AnalyticsResult<Vec<_>>>()?;

        info!(
            "Analytics complete: {} dates, {} symbols",
            calendar.len(),
            stock_stats.len()
        );

        Ok(Self {
            calendar,
            stock_stats,
            aggregate_stats,
            compositions,
            index_trackers,
            watchlist,
        })
    }

    pub fn calendar(&self) -> &MarketCalendar {
        &self.calendar
    }

    pub fn stock_stats(&self, symbol: &str) -> Option<&StockSeries> {
        self.stock_stats.get(symbol)
    }

    /// Per-symbol tables, ordered by symbol
    pub fn all_stock_stats(&self) -> &BTreeMap<String, StockSeries> {
        &self.stock_stats
    }

    pub fn aggregate_stats(&self) -> &[AggregateRow] {
        &self.aggregate_stats
    }

    /// Composition of `date`; the last entry wins when the calendar repeats it
    pub fn composition_at(&self, date: NaiveDate) -> Option<&Composition> {
        self.calendar
            .index_of(date)
            .and_then(|i| self.compositions.get(i))
    }

    pub fn latest_composition(&self) -> Option<&Composition> {
        self.compositions.last()
    }

    pub fn compositions(&self) -> &[Composition] {
        &self.compositions
    }

    /// Break-even injections for the category composition of `date`
    pub fn break_even(&self, date: NaiveDate) -> Option<AllocationPlan> {
        self.composition_at(date)
            .map(|c| solve_break_even(&c.categories))
    }

    /// Every per-symbol row in one list, tagged with its symbol
    pub fn combined_stock_stats(&self) -> Vec<SymbolStatsRow> {
        self.stock_stats
            .values()
            .flat_map(|series| {
                series.rows.iter().map(move |row| SymbolStatsRow {
                    symbol: series.symbol.clone(),
                    row: row.clone(),
                })
            })
            .collect()
    }

    /// Every stock and category composition row, tagged with its date
    pub fn combined_compositions(
        &self,
    ) -> (
        Vec<DatedRow<StockCompositionRow>>,
        Vec<DatedRow<CategoryCompositionRow>>,
    ) {
        let stocks = self
            .compositions
            .iter()
            .flat_map(|c| {
                c.stocks.iter().map(move |row| DatedRow {
                    date: c.date,
                    row: row.clone(),
                })
            })
            .collect();
        let categories = self
            .compositions
            .iter()
            .flat_map(|c| {
                c.categories.iter().map(move |row| DatedRow {
                    date: c.date,
                    row: row.clone(),
                })
            })
            .collect();
        (stocks, categories)
    }

    /// Relative performance of the watchlist and index-tracker stocks
    pub fn watchlist_performance(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> BTreeMap<String, Vec<PerformancePoint>> {
        watchlist_performance(
            self.watchlist.iter().chain(&self.index_trackers),
            start,
            end,
        )
    }
}
