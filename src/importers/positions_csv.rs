use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::models::{Position, Transaction};

/// Parse a Yahoo-Finance-style positions export into one [`Position`] per
/// symbol, in the order symbols first appear.
pub fn parse_positions_csv<P: AsRef<Path>>(file_path: P) -> Result<Vec<Position>> {
    let path = file_path.as_ref();
    info!("Parsing positions CSV file: {:?}", path);

    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open positions file {}", path.display()))?;
    parse_positions(file)
}

/// Parse positions from any CSV source
pub fn parse_positions<R: Read>(source: R) -> Result<Vec<Position>> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .context("Failed to read CSV headers")?
        .clone();

    debug!("CSV headers: {:?}", headers);

    let column_mapping = find_columns(&headers)?;

    let mut order: Vec<String> = Vec::new();
    let mut grouped: HashMap<String, Vec<Transaction>> = HashMap::new();
    let mut skipped = 0usize;

    for (idx, result) in reader.records().enumerate() {
        let row_num = idx + 2;
        let record = result.with_context(|| format!("Failed to read CSV record at row {}", row_num))?;

        match parse_csv_row(&record, &column_mapping, row_num)? {
            Some((symbol, transaction)) => {
                grouped
                    .entry(symbol.clone())
                    .or_insert_with(|| {
                        order.push(symbol);
                        Vec::new()
                    })
                    .push(transaction);
            }
            None => skipped += 1,
        }
    }

    if order.is_empty() {
        warn!("Positions file has no transactions");
    }
    if skipped > 0 {
        debug!("Skipped {} watch-only rows", skipped);
    }

    let positions: Vec<Position> = order
        .into_iter()
        .map(|symbol| {
            let transactions = grouped.remove(&symbol).unwrap_or_default();
            Position::new(symbol, transactions)
        })
        .collect();

    info!("Successfully parsed {} positions from CSV", positions.len());
    Ok(positions)
}

#[derive(Debug)]
struct CsvColumnMapping {
    symbol: usize,
    trade_date: usize,
    purchase_price: usize,
    quantity: usize,
}

fn find_columns(headers: &csv::StringRecord) -> Result<CsvColumnMapping> {
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| anyhow!("{} column not found", name))
    };

    Ok(CsvColumnMapping {
        symbol: find("Symbol")?,
        trade_date: find("Trade Date")?,
        purchase_price: find("Purchase Price")?,
        quantity: find("Quantity")?,
    })
}

/// `Ok(None)` for rows without a trade date or quantity
fn parse_csv_row(
    record: &csv::StringRecord,
    mapping: &CsvColumnMapping,
    row_num: usize,
) -> Result<Option<(String, Transaction)>> {
    let field = |idx: usize| record.get(idx).unwrap_or("").trim();

    let symbol = field(mapping.symbol).to_uppercase();
    let date_str = field(mapping.trade_date);
    let quantity_str = field(mapping.quantity);

    if date_str.is_empty() || quantity_str.is_empty() {
        return Ok(None);
    }
    if symbol.is_empty() {
        return Err(anyhow!("Missing symbol at row {}", row_num));
    }

    let trade_date = parse_trade_date(date_str)
        .with_context(|| format!("Invalid trade date at row {} ({})", row_num, symbol))?;
    let quantity = parse_decimal(quantity_str)
        .with_context(|| format!("Invalid quantity at row {} ({})", row_num, symbol))?;
    let purchase_price = parse_decimal(field(mapping.purchase_price))
        .with_context(|| format!("Invalid purchase price at row {} ({})", row_num, symbol))?;

    Ok(Some((
        symbol,
        Transaction {
            trade_date,
            quantity,
            purchase_price,
        },
    )))
}

/// `YYYYMMDD` or `YYYY-MM-DD`
fn parse_trade_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .map_err(|_| anyhow!("Unrecognized date '{}'", s))
}

fn parse_decimal(s: &str) -> Result<Decimal> {
    let cleaned = s.replace(',', "");
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .map_err(|e| anyhow!("Invalid number '{}': {}", s, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const EXPORT: &str = "\
Symbol,Current Price,Date,Time,Change,Open,High,Low,Volume,Trade Date,Purchase Price,Quantity,Commission,High Limit,Low Limit,Comment
VTI,220.5,2021/05/07,4:00pm EDT,1.2,219,221,218,300000,20200312,135.2,10,,,,
BND,85.1,2021/05/07,4:00pm EDT,0.1,85,85.3,84.9,200000,2020-03-20,82.5,20,,,,
VTI,220.5,2021/05/07,4:00pm EDT,1.2,219,221,218,300000,20210104,195.0,5,,,,
NVDA,600,2021/05/07,4:00pm EDT,3,590,605,588,100000,,,,,,,watching
VTI,220.5,2021/05/07,4:00pm EDT,1.2,219,221,218,300000,20200901,170,-4,,,,
";

    #[test]
    fn test_groups_by_symbol_in_first_seen_order() {
        let positions = parse_positions(EXPORT.as_bytes()).unwrap();
        let symbols: Vec<_> = positions.iter().map(|p| p.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["VTI", "BND"]);

        let vti = &positions[0];
        assert_eq!(vti.transactions().len(), 3);
        // Ordered by trade date; the sell sits between the buys
        assert_eq!(vti.transactions()[1].quantity, dec!(-4));
        assert_eq!(vti.transactions()[1].purchase_price, dec!(170));
        assert_eq!(vti.first_trade_date(), NaiveDate::from_ymd_opt(2020, 3, 12));

        assert_eq!(
            positions[1].first_trade_date(),
            NaiveDate::from_ymd_opt(2020, 3, 20)
        );
    }

    #[test]
    fn test_malformed_row_reports_row_number() {
        let text = "Symbol,Trade Date,Purchase Price,Quantity\nVTI,20200312,abc,10\n";
        let err = parse_positions(text.as_bytes()).unwrap_err();
        assert!(format!("{:#}", err).contains("row 2"));
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let text = "Symbol,Trade Date,Quantity\nVTI,20200312,10\n";
        let err = parse_positions(text.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Purchase Price column not found"));
    }

    #[test]
    fn test_parse_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(EXPORT.as_bytes()).unwrap();
        let positions = parse_positions_csv(file.path()).unwrap();
        assert_eq!(positions.len(), 2);
    }

    #[test]
    fn test_trade_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2019, 12, 31).unwrap();
        assert_eq!(parse_trade_date("20191231").unwrap(), expected);
        assert_eq!(parse_trade_date("2019-12-31").unwrap(), expected);
        assert!(parse_trade_date("12/31/2019").is_err());
    }
}
