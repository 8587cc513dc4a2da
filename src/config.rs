//! Run configuration
//!
//! A TOML file naming the positions CSV, the stock-record directory, the
//! symbols tracked besides the portfolio, category assignments and allocation
//! targets:
//!
//! ```toml
//! positions_file = "portfolio.csv"
//! data_dir = "data"
//! index_trackers = ["SPY"]
//! watchlist = ["NVDA"]
//!
//! [categories]
//! VTI = "Equity"
//! BND = "Bonds"
//!
//! [allocation]
//! Equity = 60
//! Bonds = 40
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

const APP_DIR: &str = "investment-stats";
const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Positions CSV export
    pub positions_file: PathBuf,
    /// Root of the per-symbol stock records
    pub data_dir: PathBuf,
    #[serde(default)]
    pub index_trackers: Vec<String>,
    #[serde(default)]
    pub watchlist: Vec<String>,
    /// Symbol to category label
    #[serde(default)]
    pub categories: BTreeMap<String, String>,
    /// Category label to target percent of invested capital
    #[serde(default)]
    pub allocation: BTreeMap<String, Decimal>,
}

/// `<config_home>/investment-stats/config.toml`
pub fn default_config_path() -> Result<PathBuf> {
    let config_dir =
        dir_spec::config_home().ok_or_else(|| anyhow!("Could not determine config directory"))?;

    Ok(config_dir.join(APP_DIR).join(CONFIG_FILENAME))
}

impl Config {
    /// Load `path`, resolving relative paths against its directory
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));

        let config = Self::parse(&content, base)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        debug!(
            "Loaded config {}: positions {}, data {}",
            path.display(),
            config.positions_file.display(),
            config.data_dir.display()
        );
        Ok(config)
    }

    /// Parse TOML text, resolving relative paths against `base`
    pub fn parse(content: &str, base: &Path) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.positions_file = resolve(base, &config.positions_file);
        config.data_dir = resolve(base, &config.data_dir);
        // Symbols are matched in upper case everywhere else
        config.categories = std::mem::take(&mut config.categories)
            .into_iter()
            .map(|(symbol, category)| (symbol.trim().to_uppercase(), category))
            .collect();

        for (category, target) in &config.allocation {
            if *target < Decimal::ZERO || *target > Decimal::ONE_HUNDRED {
                return Err(anyhow!(
                    "Allocation target for {} must be between 0 and 100, got {}",
                    category,
                    target
                ));
            }
        }
        Ok(config)
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
