use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

pub mod formatters;

#[derive(Parser, Debug)]
#[command(name = "investment-stats")]
#[command(
    version,
    about = "Portfolio analytics: cost basis, gains, composition and rebalancing"
)]
#[command(
    long_about = "Walks your positions against daily quotes to produce per-stock and aggregate cost basis, realized/unrealized gains, category composition and the capital needed to reach target allocations."
)]
pub struct Cli {
    /// Config file (default: <config dir>/investment-stats/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Per-date statistics of one symbol, or the latest row of every symbol
    Stats {
        /// Symbol to show (all symbols when omitted)
        symbol: Option<String>,

        /// Only show the last N dates
        #[arg(long)]
        tail: Option<usize>,
    },

    /// Portfolio-wide per-date totals
    Aggregate {
        /// Only show the last N dates
        #[arg(long)]
        tail: Option<usize>,
    },

    /// Stock and category composition on a date
    Composition {
        /// Market date (YYYY-MM-DD); latest when omitted
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Capital per category needed to reach the allocation targets
    Rebalance {
        /// Market date (YYYY-MM-DD); latest when omitted
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Relative performance of watchlist and index-tracker stocks
    Watchlist {
        /// Window start (YYYY-MM-DD); portfolio start when omitted
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Window end (YYYY-MM-DD); latest market date when omitted
        #[arg(long)]
        to: Option<NaiveDate>,
    },
}
