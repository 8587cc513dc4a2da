// Analytics module - calendar, cost basis, aggregation, composition and allocation

pub mod aggregate;
pub mod allocation;
pub mod calendar;
pub mod composition;
pub mod cost_basis;
pub mod performance;
pub mod pipeline;

pub use aggregate::{aggregate, AggregateRow};
pub use allocation::{solve_break_even, AllocationPlan, BreakEvenRow};
pub use calendar::{portfolio_start_date, MarketCalendar};
pub use composition::{
    category_of, composition, CategoryCompositionRow, Composition, StockCompositionRow,
    UNKNOWN_CATEGORY,
};
pub use cost_basis::{compute_stock_series, LedgerState, StockSeries, StockStatsRow};
pub use performance::{quote_window, relative_performance, watchlist_performance, PerformancePoint};
pub use pipeline::{DatedRow, PortfolioAnalytics, PortfolioInputs, SymbolStatsRow};
