// Models module - quotes, positions and stored stock records

pub mod position;
pub mod quote;
pub mod records;

pub use position::{Position, Transaction};
pub use quote::{Quote, Stock, StockRole};
pub use records::{
    assemble_stock, RecordError, StockHistorical, StockLatest, StockMetaData, StockRecord,
};

/// Serde adapter for calendar days.
///
/// Writes `YYYY-MM-DD`. Reads `YYYY-MM-DD`, RFC 3339 timestamps (normalized to
/// the UTC calendar day) and offset-less ISO timestamps.
pub(crate) mod calendar_date {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        parse(&text).ok_or_else(|| de::Error::custom(format!("invalid date: {}", text)))
    }

    pub fn parse(text: &str) -> Option<NaiveDate> {
        let text = text.trim();
        if let Ok(date) = NaiveDate::parse_from_str(text, FORMAT) {
            return Some(date);
        }
        if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
            return Some(ts.with_timezone(&Utc).date_naive());
        }
        NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|ts| ts.date())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_parse_variants() {
            let expected = NaiveDate::from_ymd_opt(2021, 3, 4);
            assert_eq!(parse("2021-03-04"), expected);
            assert_eq!(parse("2021-03-04T00:00:00+00:00"), expected);
            assert_eq!(parse("2021-03-04T00:00:00.000Z"), expected);
            assert_eq!(parse("2021-03-04T15:30:00"), expected);
            assert_eq!(parse("04/03/2021"), None);
        }
    }
}
