//! Command dispatcher that loads the configured inputs, runs the analytics
//! pass and routes each subcommand to its formatter.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::analytics::{AllocationPlan, PortfolioAnalytics};
use crate::cli::formatters::{
    format_aggregate_table, format_allocation_plan, format_composition_tables,
    format_latest_stats_table, format_stock_stats_table, format_watchlist_table, tail_rows,
    to_json,
};
use crate::cli::Commands;
use crate::config::{default_config_path, Config};
use crate::inputs::load_inputs;

/// Route a parsed command to its handler
pub fn dispatch_command(command: &Commands, config_path: Option<&Path>, json_output: bool) -> Result<()> {
    let analytics = run_analytics(config_path)?;

    match command {
        Commands::Stats { symbol, tail } => {
            dispatch_stats(&analytics, symbol.as_deref(), *tail, json_output)
        }
        Commands::Aggregate { tail } => dispatch_aggregate(&analytics, *tail, json_output),
        Commands::Composition { date } => dispatch_composition(&analytics, *date, json_output),
        Commands::Rebalance { date } => dispatch_rebalance(&analytics, *date, json_output),
        Commands::Watchlist { from, to } => dispatch_watchlist(&analytics, *from, *to, json_output),
    }
}

/// Load the config at `path`, or at the default location
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path: PathBuf = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };
    Config::load(&path)
}

/// Load every input named by the config and run the analytics pass
pub fn run_analytics(config_path: Option<&Path>) -> Result<PortfolioAnalytics> {
    let config = load_config(config_path)?;
    let inputs = load_inputs(&config)?;
    let analytics = PortfolioAnalytics::run(inputs).context("Analytics run failed")?;
    info!(
        "Market calendar {} .. {:?}",
        analytics.calendar().start_date(),
        analytics.calendar().latest_date()
    );
    Ok(analytics)
}

/// `date` if it is a market date, otherwise an error; the latest date when absent
fn resolve_date(analytics: &PortfolioAnalytics, date: Option<NaiveDate>) -> Result<NaiveDate> {
    let calendar = analytics.calendar();
    match date {
        Some(d) if calendar.index_of(d).is_some() => Ok(d),
        Some(d) => Err(anyhow!(
            "{} is not a market date ({} .. {})",
            d,
            calendar.start_date(),
            calendar
                .latest_date()
                .map(|l| l.to_string())
                .unwrap_or_default()
        )),
        None => calendar
            .latest_date()
            .ok_or_else(|| anyhow!("Market calendar is empty")),
    }
}

fn dispatch_stats(
    analytics: &PortfolioAnalytics,
    symbol: Option<&str>,
    tail: Option<usize>,
    json_output: bool,
) -> Result<()> {
    match symbol {
        Some(symbol) => {
            let symbol = symbol.to_uppercase();
            let series = analytics
                .stock_stats(&symbol)
                .ok_or_else(|| anyhow!("{} is not a portfolio symbol", symbol))?;
            if json_output {
                println!("{}", to_json(tail_rows(&series.rows, tail))?);
            } else {
                println!("{}", format_stock_stats_table(series, tail));
            }
        }
        None => {
            if json_output {
                let latest: Vec<_> = analytics
                    .combined_stock_stats()
                    .into_iter()
                    .filter(|r| Some(r.row.date) == analytics.calendar().latest_date())
                    .collect();
                println!("{}", to_json(&latest)?);
            } else {
                println!("{}", format_latest_stats_table(analytics.all_stock_stats()));
            }
        }
    }
    Ok(())
}

fn dispatch_aggregate(analytics: &PortfolioAnalytics, tail: Option<usize>, json_output: bool) -> Result<()> {
    let rows = analytics.aggregate_stats();
    if json_output {
        println!("{}", to_json(tail_rows(rows, tail))?);
    } else {
        println!("{}", format_aggregate_table(rows, tail));
    }
    Ok(())
}

fn dispatch_composition(
    analytics: &PortfolioAnalytics,
    date: Option<NaiveDate>,
    json_output: bool,
) -> Result<()> {
    let date = resolve_date(analytics, date)?;
    let composition = analytics
        .composition_at(date)
        .ok_or_else(|| anyhow!("No composition for {}", date))?;

    if json_output {
        println!("{}", to_json(composition)?);
    } else {
        println!("{}", format_composition_tables(composition));
    }
    Ok(())
}

#[derive(Serialize)]
struct DatedPlan<'a> {
    date: NaiveDate,
    #[serde(flatten)]
    plan: &'a AllocationPlan,
}

fn dispatch_rebalance(
    analytics: &PortfolioAnalytics,
    date: Option<NaiveDate>,
    json_output: bool,
) -> Result<()> {
    let date = resolve_date(analytics, date)?;
    let plan = analytics
        .break_even(date)
        .ok_or_else(|| anyhow!("No composition for {}", date))?;

    if json_output {
        println!("{}", to_json(&DatedPlan { date, plan: &plan })?);
    } else {
        println!("{}", format_allocation_plan(date, &plan));
    }
    Ok(())
}

fn dispatch_watchlist(
    analytics: &PortfolioAnalytics,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    json_output: bool,
) -> Result<()> {
    let calendar = analytics.calendar();
    let from = from.unwrap_or_else(|| calendar.start_date());
    let to = to.or_else(|| calendar.latest_date()).unwrap_or(from);
    if to < from {
        return Err(anyhow!("Window end {} is before its start {}", to, from));
    }

    let performance = analytics.watchlist_performance(from, to);
    if json_output {
        println!("{}", to_json(&performance)?);
    } else {
        println!("{}", format_watchlist_table(&performance));
    }
    Ok(())
}
