//! investment-stats - portfolio analytics over daily quotes
//!
//! Walks each position's transactions against the market calendar to build
//! per-date cost basis and gains, sums them into portfolio totals, breaks the
//! portfolio down by category, and solves for the capital each category needs
//! to reach its allocation target.

pub mod analytics;
pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod importers;
pub mod inputs;
pub mod models;
pub mod store;
pub mod utils;
