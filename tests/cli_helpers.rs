#![allow(dead_code)]

use anyhow::{bail, Result};
use assert_cmd::cargo;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use std::path::Path;
use std::process::{Command, Output};
use std::str::FromStr;
use tempfile::TempDir;

use investment_stats::models::{Quote, StockHistorical, StockLatest, StockMetaData};
use investment_stats::store::StockStore;

pub const CONFIG: &str = r#"
positions_file = "portfolio.csv"
data_dir = "data"
index_trackers = ["SPY"]
watchlist = ["NVDA"]

[categories]
VTI = "Equity"
BND = "Bonds"

[allocation]
Equity = 60
Bonds = 40
"#;

/// VTI 3 @ 100 and BND 2 @ 50, both bought on 2021-01-05
pub const POSITIONS: &str = "\
Symbol,Current Price,Trade Date,Purchase Price,Quantity,Comment
VTI,120,20210105,100,3,
BND,50,20210105,50,2,
NVDA,500,,,,watching
";

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 1, d).expect("valid fixture date")
}

fn sync_date() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2021-01-11T22:00:00Z")
        .expect("valid fixture timestamp")
        .with_timezone(&Utc)
}

/// History on Jan 4-8, latest quote on Jan 11
pub fn write_stock(store: &StockStore, symbol: &str, name: &str, closes: [i64; 6]) {
    let history_days = [4, 5, 6, 7, 8];
    let quotes: Vec<Quote> = history_days
        .iter()
        .zip(closes.iter())
        .map(|(d, c)| Quote::flat(day(*d), Decimal::from(*c), Decimal::from(1000)))
        .collect();

    let metadata = StockMetaData {
        symbol: symbol.to_string(),
        sync_date: sync_date(),
        company_name: name.to_string(),
        security_name: name.to_string(),
        exchange: "NYSE".to_string(),
        industry: String::new(),
        issue_type: "et".to_string(),
        sector: String::new(),
    };
    let latest = StockLatest {
        sync_date: sync_date(),
        quote: Quote::flat(day(11), Decimal::from(closes[5]), Decimal::from(1000)),
    };
    let historical =
        StockHistorical::from_quotes(sync_date(), quotes).expect("fixture history is not empty");

    store
        .write_stock(metadata, latest, historical)
        .expect("failed to write fixture stock");
}

/// Config, positions and quote store for a small two-category portfolio
pub fn setup_portfolio() -> TempDir {
    let dir = TempDir::new().expect("failed to create temp dir");
    write_portfolio(dir.path(), POSITIONS);
    dir
}

pub fn write_portfolio(root: &Path, positions: &str) {
    std::fs::write(root.join("config.toml"), CONFIG).expect("failed to write config");
    std::fs::write(root.join("portfolio.csv"), positions).expect("failed to write positions");

    let store = StockStore::new(root.join("data"));
    write_stock(&store, "VTI", "Vanguard Total Stock Market ETF", [100, 100, 110, 110, 120, 120]);
    write_stock(&store, "BND", "Vanguard Total Bond Market ETF", [50, 50, 50, 50, 50, 50]);
    write_stock(&store, "SPY", "SPDR S&P 500 ETF Trust", [300, 303, 306, 300, 297, 330]);
    write_stock(&store, "NVDA", "NVIDIA Corporation", [500, 510, 520, 530, 540, 550]);
}

pub fn base_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("investment-stats"));
    cmd.arg("--no-color");
    cmd.arg("--config").arg(dir.path().join("config.toml"));
    cmd
}

pub fn run_cmd(dir: &TempDir, args: &[&str]) -> Result<Output> {
    let mut cmd = base_cmd(dir);
    cmd.args(args);
    let output = cmd.output()?;
    if !output.status.success() {
        bail!(
            "command failed: {:?}\nstdout: {}\nstderr: {}",
            args,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(output)
}

pub fn run_cmd_json(dir: &TempDir, args: &[&str]) -> Result<Value> {
    let mut full_args = vec!["--json"];
    full_args.extend_from_slice(args);
    let output = run_cmd(dir, &full_args)?;
    let stdout = String::from_utf8(output.stdout)?;
    Ok(serde_json::from_str(&stdout)?)
}

/// Decimal field that may be encoded as a string or a number
pub fn dec_field(value: &Value, key: &str) -> Decimal {
    match &value[key] {
        Value::String(s) => Decimal::from_str(s).expect("decimal string"),
        Value::Number(n) => Decimal::from_str(&n.to_string()).expect("decimal number"),
        other => panic!("{} is not a decimal: {:?}", key, other),
    }
}
