//! Per-symbol stock record files
//!
//! ```text
//! <data_dir>/<SYMBOL>/metadata.json    StockMetaData
//! <data_dir>/<SYMBOL>/latest.json      StockLatest
//! <data_dir>/<SYMBOL>/historical.json  StockHistorical
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::models::{
    assemble_stock, Stock, StockHistorical, StockLatest, StockMetaData, StockRecord,
};

const METADATA_FILE: &str = "metadata.json";
const LATEST_FILE: &str = "latest.json";
const HISTORICAL_FILE: &str = "historical.json";

#[derive(Debug, Clone)]
pub struct StockStore {
    root: PathBuf,
}

impl StockStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn symbol_dir(&self, symbol: &str) -> PathBuf {
        self.root.join(symbol.to_uppercase())
    }

    /// Load and assemble the three records of `symbol`
    pub fn load_stock(&self, symbol: &str) -> Result<Stock> {
        let dir = self.symbol_dir(symbol);

        let metadata = read_record(&dir.join(METADATA_FILE))?
            .into_metadata()
            .with_context(|| format!("Unexpected record in {}", dir.join(METADATA_FILE).display()))?;
        let latest = read_record(&dir.join(LATEST_FILE))?
            .into_latest()
            .with_context(|| format!("Unexpected record in {}", dir.join(LATEST_FILE).display()))?;
        let historical = read_record(&dir.join(HISTORICAL_FILE))?
            .into_historical()
            .with_context(|| {
                format!("Unexpected record in {}", dir.join(HISTORICAL_FILE).display())
            })?;

        debug!(
            "Loaded {}: {} day quotes, latest {}",
            symbol,
            historical.day_quotes.len(),
            latest.quote.date
        );
        Ok(assemble_stock(metadata, latest, historical))
    }

    /// Write the three records of one symbol, keyed by the metadata symbol
    pub fn write_stock(
        &self,
        metadata: StockMetaData,
        latest: StockLatest,
        historical: StockHistorical,
    ) -> Result<()> {
        let dir = self.symbol_dir(&metadata.symbol);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create stock directory {}", dir.display()))?;

        write_record(&dir.join(METADATA_FILE), &StockRecord::StockMetaData(metadata))?;
        write_record(&dir.join(LATEST_FILE), &StockRecord::StockLatest(latest))?;
        write_record(&dir.join(HISTORICAL_FILE), &StockRecord::StockHistorical(historical))?;
        Ok(())
    }
}

pub fn read_record(path: &Path) -> Result<StockRecord> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read stock record {}", path.display()))?;
    StockRecord::decode(&text)
        .with_context(|| format!("Failed to decode stock record {}", path.display()))
}

pub fn write_record(path: &Path, record: &StockRecord) -> Result<()> {
    let text = record.encode()?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, text)
        .with_context(|| format!("Failed to write stock record {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to finalize stock record {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Quote;
    use chrono::{DateTime, NaiveDate, Utc};
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn sync() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2021-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn records(symbol: &str) -> (StockMetaData, StockLatest, StockHistorical) {
        let day = |d| NaiveDate::from_ymd_opt(2021, 5, d).unwrap();
        let metadata = StockMetaData {
            symbol: symbol.to_string(),
            sync_date: sync(),
            company_name: "Vanguard Total Bond Market ETF".to_string(),
            security_name: String::new(),
            exchange: "NASDAQ".to_string(),
            industry: String::new(),
            issue_type: "et".to_string(),
            sector: String::new(),
        };
        let latest = StockLatest {
            sync_date: sync(),
            quote: Quote::flat(day(31), dec!(85.40), dec!(5000)),
        };
        let historical = StockHistorical::from_quotes(
            sync(),
            vec![
                Quote::flat(day(27), dec!(85.10), dec!(4000)),
                Quote::flat(day(28), dec!(85.25), dec!(4100)),
            ],
        )
        .unwrap();
        (metadata, latest, historical)
    }

    #[test]
    fn test_written_stock_loads_back() {
        let dir = TempDir::new().unwrap();
        let store = StockStore::new(dir.path());
        let (metadata, latest, historical) = records("BND");
        store.write_stock(metadata, latest, historical).unwrap();

        assert!(dir.path().join("BND").join("latest.json").exists());
        let stock = store.load_stock("bnd").unwrap();
        assert_eq!(stock.symbol, "BND");
        assert_eq!(stock.quote_count(), 3);
        assert_eq!(stock.latest_quote.close, dec!(85.40));
    }

    #[test]
    fn test_swapped_record_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = StockStore::new(dir.path());
        let (metadata, latest, historical) = records("BND");
        store.write_stock(metadata, latest.clone(), historical).unwrap();

        let path = store.symbol_dir("BND").join(HISTORICAL_FILE);
        write_record(&path, &StockRecord::StockLatest(latest)).unwrap();

        let err = store.load_stock("BND").unwrap_err();
        let chain = format!("{:#}", err);
        assert!(chain.contains("historical.json"));
        assert!(chain.contains("expected a StockHistorical record, found StockLatest"));
    }

    #[test]
    fn test_missing_symbol_names_path() {
        let dir = TempDir::new().unwrap();
        let err = StockStore::new(dir.path()).load_stock("NOPE").unwrap_err();
        assert!(err.to_string().contains("metadata.json"));
    }
}
