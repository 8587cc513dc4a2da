//! Stored stock records
//!
//! Quote data is kept per symbol as three JSON documents (metadata, latest
//! quote, day history). Each document is one [`StockRecord`], tagged with a
//! `_class` field naming the variant. The variant set is closed: decoding an
//! unknown tag fails instead of looking anything up at runtime.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::quote::{Quote, Stock};

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("expected a {expected} record, found {found}")]
    KindMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("invalid stock record JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Descriptive data for a symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMetaData {
    pub symbol: String,
    pub sync_date: DateTime<Utc>,
    pub company_name: String,
    #[serde(default)]
    pub security_name: String,
    #[serde(default)]
    pub exchange: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub issue_type: String,
    #[serde(default)]
    pub sector: String,
}

/// Most recent quote for a symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockLatest {
    pub sync_date: DateTime<Utc>,
    pub quote: Quote,
}

/// Day history for a symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockHistorical {
    pub sync_date: DateTime<Utc>,
    #[serde(with = "super::calendar_date")]
    pub earliest_date: NaiveDate,
    #[serde(with = "super::calendar_date")]
    pub latest_date: NaiveDate,
    pub day_quotes: Vec<Quote>,
}

impl StockHistorical {
    /// Build a history record, deriving the date range from the quotes
    pub fn from_quotes(sync_date: DateTime<Utc>, day_quotes: Vec<Quote>) -> Option<Self> {
        let earliest_date = day_quotes.first()?.date;
        let latest_date = day_quotes.last()?.date;
        Some(Self {
            sync_date,
            earliest_date,
            latest_date,
            day_quotes,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_class")]
pub enum StockRecord {
    Quote(Quote),
    StockMetaData(StockMetaData),
    StockLatest(StockLatest),
    StockHistorical(StockHistorical),
}

impl StockRecord {
    pub fn kind(&self) -> &'static str {
        match self {
            StockRecord::Quote(_) => "Quote",
            StockRecord::StockMetaData(_) => "StockMetaData",
            StockRecord::StockLatest(_) => "StockLatest",
            StockRecord::StockHistorical(_) => "StockHistorical",
        }
    }

    pub fn encode(&self) -> Result<String, RecordError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn decode(text: &str) -> Result<Self, RecordError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn into_metadata(self) -> Result<StockMetaData, RecordError> {
        match self {
            StockRecord::StockMetaData(m) => Ok(m),
            other => Err(RecordError::KindMismatch {
                expected: "StockMetaData",
                found: other.kind(),
            }),
        }
    }

    pub fn into_latest(self) -> Result<StockLatest, RecordError> {
        match self {
            StockRecord::StockLatest(l) => Ok(l),
            other => Err(RecordError::KindMismatch {
                expected: "StockLatest",
                found: other.kind(),
            }),
        }
    }

    pub fn into_historical(self) -> Result<StockHistorical, RecordError> {
        match self {
            StockRecord::StockHistorical(h) => Ok(h),
            other => Err(RecordError::KindMismatch {
                expected: "StockHistorical",
                found: other.kind(),
            }),
        }
    }
}

/// Combine the three stored records of a symbol into a [`Stock`]
pub fn assemble_stock(
    metadata: StockMetaData,
    latest: StockLatest,
    historical: StockHistorical,
) -> Stock {
    Stock {
        symbol: metadata.symbol,
        company_name: metadata.company_name,
        industry: metadata.industry,
        issue_type: metadata.issue_type,
        day_quotes: historical.day_quotes,
        latest_quote: latest.quote,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn quote() -> Quote {
        Quote {
            date: NaiveDate::from_ymd_opt(2020, 5, 1).unwrap(),
            high: dec!(10.5),
            low: dec!(9.5),
            open: dec!(10),
            close: dec!(10.25),
            volume: dec!(12000),
        }
    }

    #[test]
    fn test_encoded_record_carries_class_tag() {
        let record = StockRecord::Quote(quote());
        let text = record.encode().unwrap();
        assert!(text.contains(r#""_class": "Quote""#));
        assert!(text.contains(r#""date": "2020-05-01""#));
        assert_eq!(StockRecord::decode(&text).unwrap(), record);
    }

    #[test]
    fn test_decode_accepts_timestamped_payload() {
        // Timestamps are normalized to their UTC calendar day; nested quote
        // objects may carry their own tag
        let text = r#"{
            "_class": "StockLatest",
            "sync_date": "2020-05-01T21:00:00+00:00",
            "quote": {
                "_class": "Quote",
                "date": "2020-05-01T20:00:00-04:00",
                "high": 10.5, "low": 9.5, "open": 10, "close": 10.25, "volume": 12000.0
            }
        }"#;
        let latest = StockRecord::decode(text).unwrap().into_latest().unwrap();
        assert_eq!(latest.quote.date, NaiveDate::from_ymd_opt(2020, 5, 2).unwrap());
        assert_eq!(latest.quote.close, dec!(10.25));
    }

    #[test]
    fn test_unknown_class_is_rejected() {
        let text = r#"{"_class": "Position", "symbol": "AAPL"}"#;
        assert!(matches!(
            StockRecord::decode(text),
            Err(RecordError::Json(_))
        ));
    }

    #[test]
    fn test_kind_mismatch_is_reported() {
        let err = StockRecord::Quote(quote()).into_historical().unwrap_err();
        assert_eq!(
            err.to_string(),
            "expected a StockHistorical record, found Quote"
        );
    }

    #[test]
    fn test_assemble_stock_uses_metadata_identity() {
        let sync = DateTime::parse_from_rfc3339("2020-05-02T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let metadata = StockMetaData {
            symbol: "AAPL".to_string(),
            sync_date: sync,
            company_name: "Apple Inc.".to_string(),
            security_name: "Apple Inc.".to_string(),
            exchange: "NASDAQ".to_string(),
            industry: "Telecommunications Equipment".to_string(),
            issue_type: "cs".to_string(),
            sector: "Electronic Technology".to_string(),
        };
        let latest = StockLatest {
            sync_date: sync,
            quote: quote(),
        };
        let historical = StockHistorical::from_quotes(sync, vec![quote()]).unwrap();

        let stock = assemble_stock(metadata, latest, historical);
        assert_eq!(stock.symbol, "AAPL");
        assert_eq!(stock.company_name, "Apple Inc.");
        assert_eq!(stock.quote_count(), 2);
    }
}
