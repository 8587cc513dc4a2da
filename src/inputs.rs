//! Assemble [`PortfolioInputs`] from the configured files

use std::collections::HashMap;

use anyhow::{Context, Result};
use itertools::Itertools;
use tracing::info;

use crate::analytics::PortfolioInputs;
use crate::config::Config;
use crate::importers::parse_positions_csv;
use crate::models::{Position, Stock, StockRole};
use crate::store::StockStore;

/// Position symbols, then index trackers, then watchlist, without repeats
pub fn all_symbols(positions: &[Position], index_trackers: &[String], watchlist: &[String]) -> Vec<String> {
    positions
        .iter()
        .map(|p| p.symbol.clone())
        .chain(index_trackers.iter().map(|s| s.to_uppercase()))
        .chain(watchlist.iter().map(|s| s.to_uppercase()))
        .unique()
        .collect()
}

/// Roles of `symbol` in this run
pub fn roles_of(symbol: &str, positions: &[Position], config: &Config) -> Vec<StockRole> {
    let listed = |list: &[String]| list.iter().any(|s| s.eq_ignore_ascii_case(symbol));

    let mut roles = Vec::new();
    if positions.iter().any(|p| p.symbol == symbol) {
        roles.push(StockRole::Portfolio);
    }
    if listed(&config.watchlist) {
        roles.push(StockRole::Watchlist);
    }
    if listed(&config.index_trackers) {
        roles.push(StockRole::IndexTracker);
    }
    roles
}

/// Tag loaded stocks into role lists. Each stock is loaded once and cloned
/// into every list it belongs to.
pub fn assemble_inputs(
    config: &Config,
    positions: Vec<Position>,
    mut stocks: HashMap<String, Stock>,
) -> PortfolioInputs {
    let symbols = all_symbols(&positions, &config.index_trackers, &config.watchlist);

    let mut inputs = PortfolioInputs {
        categories: config.categories.clone(),
        allocation: config.allocation.clone(),
        ..PortfolioInputs::default()
    };

    for symbol in &symbols {
        let Some(stock) = stocks.remove(symbol) else {
            continue;
        };
        for role in roles_of(symbol, &positions, config) {
            match role {
                StockRole::Portfolio => inputs.portfolio.push(stock.clone()),
                StockRole::Watchlist => inputs.watchlist.push(stock.clone()),
                StockRole::IndexTracker => inputs.index_trackers.push(stock.clone()),
            }
        }
    }

    inputs.symbols = symbols;
    inputs.positions = positions;
    inputs
}

/// Read the positions file and every tracked symbol's records
pub fn load_inputs(config: &Config) -> Result<PortfolioInputs> {
    let positions = parse_positions_csv(&config.positions_file)
        .with_context(|| format!("Failed to load positions from {}", config.positions_file.display()))?;

    let store = StockStore::new(&config.data_dir);
    let symbols = all_symbols(&positions, &config.index_trackers, &config.watchlist);

    let stocks = symbols
        .iter()
        .map(|symbol| {
            store
                .load_stock(symbol)
                .with_context(|| format!("Failed to load stock data for {}", symbol))
                .map(|stock| (symbol.clone(), stock))
        })
        .collect::<Result<HashMap<_, _>>>()?;

    info!(
        "Loaded {} positions and {} stocks from {}",
        positions.len(),
        stocks.len(),
        store.root().display()
    );

    Ok(assemble_inputs(config, positions, stocks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Quote, Transaction};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::path::PathBuf;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, 2).unwrap()
    }

    fn position(symbol: &str) -> Position {
        Position::new(symbol, vec![Transaction::buy(day(), dec!(1), dec!(1))])
    }

    fn stock(symbol: &str) -> Stock {
        Stock {
            symbol: symbol.to_string(),
            company_name: String::new(),
            industry: String::new(),
            issue_type: String::new(),
            day_quotes: vec![],
            latest_quote: Quote::flat(day(), dec!(1), dec!(1)),
        }
    }

    fn config() -> Config {
        Config {
            positions_file: PathBuf::from("p.csv"),
            data_dir: PathBuf::from("data"),
            index_trackers: vec!["SPY".to_string(), "VTI".to_string()],
            watchlist: vec!["nvda".to_string(), "SPY".to_string()],
            categories: Default::default(),
            allocation: Default::default(),
        }
    }

    #[test]
    fn test_all_symbols_dedups_in_first_seen_order() {
        let cfg = config();
        let positions = vec![position("VTI"), position("BND")];
        assert_eq!(
            all_symbols(&positions, &cfg.index_trackers, &cfg.watchlist),
            vec!["VTI", "BND", "SPY", "NVDA"]
        );
    }

    #[test]
    fn test_stock_is_tagged_into_every_role() {
        let cfg = config();
        let positions = vec![position("VTI"), position("BND")];
        let stocks: HashMap<String, Stock> = ["VTI", "BND", "SPY", "NVDA"]
            .iter()
            .map(|s| (s.to_string(), stock(s)))
            .collect();

        let inputs = assemble_inputs(&cfg, positions, stocks);
        let symbols = |list: &[Stock]| list.iter().map(|s| s.symbol.clone()).collect::<Vec<_>>();

        assert_eq!(symbols(&inputs.portfolio), vec!["VTI", "BND"]);
        assert_eq!(symbols(&inputs.index_trackers), vec!["VTI", "SPY"]);
        assert_eq!(symbols(&inputs.watchlist), vec!["SPY", "NVDA"]);
        assert_eq!(inputs.symbols.len(), 4);
        assert_eq!(inputs.positions.len(), 2);
    }
}
