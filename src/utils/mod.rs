//! Numeric and formatting helpers shared by the analytics core and the CLI
//!
//! Percentages in every table are derived with [`percent_of`], which defines
//! division by zero as 0. Display values go through [`round_display`].

use rust_decimal::Decimal;

/// Decimal places kept in every output table
pub const DISPLAY_DECIMAL_PLACES: u32 = 2;

/// `part / whole * 100`, or 0 when `whole` is 0
pub fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        Decimal::ZERO
    } else {
        part / whole * Decimal::ONE_HUNDRED
    }
}

/// Round to display precision (banker's rounding)
pub fn round_display(value: Decimal) -> Decimal {
    value.round_dp(DISPLAY_DECIMAL_PLACES)
}

/// Currency symbol options for formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencySymbol {
    /// Include "$" prefix
    Usd,
    /// No currency symbol (for table cells)
    None,
}

/// Core formatting function with full control over output.
///
/// Thousands separator is `,` and the decimal separator is `.`.
///
/// # Examples
/// ```
/// use investment_stats::utils::{format_currency_with_width, CurrencySymbol};
/// use rust_decimal_macros::dec;
///
/// assert_eq!(
///     format_currency_with_width(dec!(1234.56), 0, CurrencySymbol::Usd),
///     "$1,234.56"
/// );
///
/// assert_eq!(
///     format_currency_with_width(dec!(1234), 12, CurrencySymbol::None),
///     "    1,234.00"
/// );
/// ```
pub fn format_currency_with_width(value: Decimal, width: usize, symbol: CurrencySymbol) -> String {
    let is_negative = value < Decimal::ZERO;
    let formatted = format!("{:.2}", value.abs());
    let (integer_part, decimal_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let with_separators: String = integer_part
        .chars()
        .rev()
        .enumerate()
        .flat_map(|(i, c)| {
            if i > 0 && i % 3 == 0 {
                vec![',', c]
            } else {
                vec![c]
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    let sign = if is_negative { "-" } else { "" };
    let prefix = match symbol {
        CurrencySymbol::Usd => "$",
        CurrencySymbol::None => "",
    };

    let result = format!("{}{}{}.{}", sign, prefix, with_separators, decimal_part);

    if width > 0 && result.len() < width {
        format!("{:>width$}", result, width = width)
    } else {
        result
    }
}

/// Format with a dollar sign: "$1,234.56"
///
/// # Examples
/// ```
/// use investment_stats::utils::format_currency;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_currency(dec!(1234.56)), "$1,234.56");
/// assert_eq!(format_currency(dec!(-500)), "-$500.00");
/// ```
pub fn format_currency(value: Decimal) -> String {
    format_currency_with_width(value, 0, CurrencySymbol::Usd)
}

/// Format a percentage with two decimals and a sign: "+12.50%"
pub fn format_percent(value: Decimal) -> String {
    if value > Decimal::ZERO {
        format!("+{:.2}%", value)
    } else {
        format!("{:.2}%", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_percent_of_guards_zero() {
        assert_eq!(percent_of(dec!(100), dec!(1000)), dec!(10));
        assert_eq!(percent_of(dec!(100), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(percent_of(dec!(-50), dec!(200)), dec!(-25));
    }

    #[test]
    fn test_round_display_uses_bankers_rounding() {
        assert_eq!(round_display(dec!(1.005)), dec!(1.00));
        assert_eq!(round_display(dec!(1.015)), dec!(1.02));
        assert_eq!(round_display(dec!(33.333333)), dec!(33.33));
    }

    #[test]
    fn test_format_currency_basic() {
        assert_eq!(format_currency(dec!(1234.56)), "$1,234.56");
        assert_eq!(format_currency(dec!(0)), "$0.00");
        assert_eq!(format_currency(dec!(1000000)), "$1,000,000.00");
        assert_eq!(format_currency(dec!(-1234.5)), "-$1,234.50");
    }

    #[test]
    fn test_format_with_width() {
        let result = format_currency_with_width(dec!(100), 10, CurrencySymbol::Usd);
        assert_eq!(result, "   $100.00");
        let result = format_currency_with_width(dec!(1000000), 5, CurrencySymbol::None);
        assert_eq!(result, "1,000,000.00");
    }

    #[test]
    fn test_format_percent_sign() {
        assert_eq!(format_percent(dec!(10)), "+10.00%");
        assert_eq!(format_percent(dec!(-2.5)), "-2.50%");
        assert_eq!(format_percent(Decimal::ZERO), "0.00%");
    }
}
