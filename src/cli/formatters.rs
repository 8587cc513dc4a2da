//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating
//! the concerns of data calculation from presentation.

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::NaiveDate;
use colored::Colorize;
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use crate::analytics::{
    AggregateRow, AllocationPlan, Composition, PerformancePoint, StockSeries,
};
use crate::utils::{format_currency, format_currency_with_width, format_percent, CurrencySymbol};

/// Pretty JSON for any output table
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Last `tail` rows, or all of them
pub fn tail_rows<T>(rows: &[T], tail: Option<usize>) -> &[T] {
    match tail {
        Some(n) if n < rows.len() => &rows[rows.len() - n..],
        _ => rows,
    }
}

fn amount(value: Decimal) -> String {
    format_currency_with_width(value, 0, CurrencySymbol::None)
}

fn colored_amount(value: Decimal) -> String {
    let text = amount(value);
    if value > Decimal::ZERO {
        text.green().to_string()
    } else if value < Decimal::ZERO {
        text.red().to_string()
    } else {
        text
    }
}

fn colored_percent(value: Decimal) -> String {
    let text = format_percent(value);
    if value > Decimal::ZERO {
        text.green().to_string()
    } else if value < Decimal::ZERO {
        text.red().to_string()
    } else {
        text
    }
}

fn finish(mut table: Table) -> String {
    table.with(Style::modern());
    // Right-align everything but the label column
    table.modify(Columns::new(1..), Alignment::right());
    table.to_string()
}

#[derive(Tabled)]
struct StatsRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Qty")]
    quantity: String,
    #[tabled(rename = "Avg Cost")]
    average_cost: String,
    #[tabled(rename = "Close")]
    close: String,
    #[tabled(rename = "Invested")]
    invested: String,
    #[tabled(rename = "Market")]
    market: String,
    #[tabled(rename = "Unrealized")]
    unrealized: String,
    #[tabled(rename = "Unrl %")]
    unrealized_pct: String,
    #[tabled(rename = "Realized")]
    realized: String,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Total %")]
    total_pct: String,
}

/// Per-date table of one symbol
pub fn format_stock_stats_table(series: &StockSeries, tail: Option<usize>) -> String {
    let rows: Vec<StatsRow> = tail_rows(&series.rows, tail)
        .iter()
        .map(|r| StatsRow {
            date: r.date.to_string(),
            quantity: r.quantity.normalize().to_string(),
            average_cost: amount(r.average_cost),
            close: amount(r.close),
            invested: amount(r.invested_amount),
            market: amount(r.market_value),
            unrealized: colored_amount(r.unrealized_gain),
            unrealized_pct: colored_percent(r.unrealized_gain_pct),
            realized: colored_amount(r.realized_gain),
            total: colored_amount(r.total_gain),
            total_pct: colored_percent(r.total_gain_pct),
        })
        .collect();

    let company = series
        .latest()
        .map(|r| r.company_name.as_str())
        .unwrap_or_default();

    format!(
        "\n{} {}\n\n{}\n",
        series.symbol.cyan().bold(),
        company,
        finish(Table::new(&rows))
    )
}

#[derive(Tabled)]
struct LatestRow {
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Qty")]
    quantity: String,
    #[tabled(rename = "Invested")]
    invested: String,
    #[tabled(rename = "Market")]
    market: String,
    #[tabled(rename = "Unrealized")]
    unrealized: String,
    #[tabled(rename = "Realized")]
    realized: String,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Total %")]
    total_pct: String,
}

/// Latest row of every symbol
pub fn format_latest_stats_table(all: &BTreeMap<String, StockSeries>) -> String {
    let rows: Vec<LatestRow> = all
        .values()
        .filter_map(|series| series.latest().map(|r| (series, r)))
        .map(|(series, r)| LatestRow {
            symbol: series.symbol.clone(),
            quantity: r.quantity.normalize().to_string(),
            invested: amount(r.invested_amount),
            market: amount(r.market_value),
            unrealized: colored_amount(r.unrealized_gain),
            realized: colored_amount(r.realized_gain),
            total: colored_amount(r.total_gain),
            total_pct: colored_percent(r.total_gain_pct),
        })
        .collect();

    let date = all
        .values()
        .find_map(|s| s.latest())
        .map(|r| r.date.to_string())
        .unwrap_or_default();

    format!(
        "\n{} Holdings as of {}\n\n{}\n",
        "📊".cyan().bold(),
        date,
        finish(Table::new(&rows))
    )
}

#[derive(Tabled)]
struct AggregateTableRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Invested")]
    invested: String,
    #[tabled(rename = "Market")]
    market: String,
    #[tabled(rename = "Unrealized")]
    unrealized: String,
    #[tabled(rename = "Unrl %")]
    unrealized_pct: String,
    #[tabled(rename = "Realized")]
    realized: String,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Total %")]
    total_pct: String,
}

pub fn format_aggregate_table(rows: &[AggregateRow], tail: Option<usize>) -> String {
    let table_rows: Vec<AggregateTableRow> = tail_rows(rows, tail)
        .iter()
        .map(|r| AggregateTableRow {
            date: r.date.to_string(),
            invested: amount(r.invested_amount),
            market: amount(r.market_value),
            unrealized: colored_amount(r.unrealized_gain),
            unrealized_pct: colored_percent(r.unrealized_gain_pct),
            realized: colored_amount(r.realized_gain),
            total: colored_amount(r.total_gain),
            total_pct: colored_percent(r.total_gain_pct),
        })
        .collect();

    let mut output = format!(
        "\n{} Portfolio\n\n{}\n",
        "📈".cyan().bold(),
        finish(Table::new(&table_rows))
    );

    if let Some(last) = rows.last() {
        output.push_str(&format!("\n{} Summary", "━".repeat(80).bright_black()));
        output.push_str(&format!(
            "\n{:<20} {}",
            "Invested:".bold(),
            format_currency(last.invested_amount)
        ));
        output.push_str(&format!(
            "\n{:<20} {}",
            "Market Value:".bold(),
            format_currency(last.market_value)
        ));
        output.push_str(&format!(
            "\n{:<20} {} ({})\n",
            "Total Gain:".bold(),
            colored_amount(last.total_gain),
            colored_percent(last.total_gain_pct)
        ));
    }

    output
}

#[derive(Tabled)]
struct StockCompositionTableRow {
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "% Invested")]
    composition_invested: String,
    #[tabled(rename = "% Market")]
    composition_market: String,
    #[tabled(rename = "% of Gain")]
    relative_total_gain: String,
    #[tabled(rename = "Invested")]
    invested: String,
    #[tabled(rename = "Total")]
    total: String,
}

#[derive(Tabled)]
struct CategoryCompositionTableRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "% Invested")]
    composition_invested: String,
    #[tabled(rename = "Target")]
    desired_allocation: String,
    #[tabled(rename = "Diff")]
    diff: String,
    #[tabled(rename = "% Market")]
    composition_market: String,
    #[tabled(rename = "Invested")]
    invested: String,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Total %")]
    total_pct: String,
}

pub fn format_composition_tables(composition: &Composition) -> String {
    let stocks: Vec<StockCompositionTableRow> = composition
        .stocks
        .iter()
        .map(|s| StockCompositionTableRow {
            symbol: s.symbol.clone(),
            category: s.category.clone(),
            composition_invested: format!("{:.2}%", s.composition_invested),
            composition_market: format!("{:.2}%", s.composition_market),
            relative_total_gain: format!("{:.2}%", s.relative_total_gain),
            invested: amount(s.invested_amount),
            total: colored_amount(s.total_gain),
        })
        .collect();

    let categories: Vec<CategoryCompositionTableRow> = composition
        .categories
        .iter()
        .map(|c| CategoryCompositionTableRow {
            category: c.category.clone(),
            composition_invested: format!("{:.2}%", c.composition_invested),
            desired_allocation: format!("{:.2}%", c.desired_allocation),
            diff: colored_percent(c.desired_composition_diff),
            composition_market: format!("{:.2}%", c.composition_market),
            invested: amount(c.invested_amount),
            total: colored_amount(c.total_gain),
            total_pct: colored_percent(c.total_gain_pct),
        })
        .collect();

    format!(
        "\n{} Composition on {}\n\n{}\n\n{}\n",
        "🧩".cyan().bold(),
        composition.date,
        finish(Table::new(&stocks)),
        finish(Table::new(&categories))
    )
}

#[derive(Tabled)]
struct BreakEvenTableRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Invest")]
    amount: String,
}

pub fn format_allocation_plan(date: NaiveDate, plan: &AllocationPlan) -> String {
    if !plan.converged {
        return format!(
            "\n{} Allocation solver did not converge on {} ({})\n",
            "⚠".yellow().bold(),
            date,
            plan.status
        );
    }

    let rows: Vec<BreakEvenTableRow> = plan
        .rows
        .iter()
        .map(|r| BreakEvenTableRow {
            category: r.category.clone(),
            amount: format_currency(r.allocation_break_even),
        })
        .collect();

    format!(
        "\n{} Break-even injections on {}\n\n{}\n\n{:<20} {}\n",
        "⚖".cyan().bold(),
        date,
        finish(Table::new(&rows)),
        "Total:".bold(),
        format_currency(plan.total_injection())
    )
}

#[derive(Tabled)]
struct WatchRow {
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
    #[tabled(rename = "First Close")]
    first_close: String,
    #[tabled(rename = "Last Close")]
    last_close: String,
    #[tabled(rename = "Change")]
    change: String,
}

pub fn format_watchlist_table(performance: &BTreeMap<String, Vec<PerformancePoint>>) -> String {
    if performance.is_empty() {
        return format!(
            "{} No watchlist or index-tracker symbols configured\n",
            "ℹ".blue().bold()
        );
    }

    let rows: Vec<WatchRow> = performance
        .iter()
        .map(|(symbol, points)| match (points.first(), points.last()) {
            (Some(first), Some(last)) => WatchRow {
                symbol: symbol.clone(),
                from: first.date.to_string(),
                to: last.date.to_string(),
                first_close: amount(first.close),
                last_close: amount(last.close),
                change: colored_percent(last.change_pct),
            },
            _ => WatchRow {
                symbol: symbol.clone(),
                from: "-".to_string(),
                to: "-".to_string(),
                first_close: "N/A".to_string(),
                last_close: "N/A".to_string(),
                change: "N/A".to_string(),
            },
        })
        .collect();

    format!(
        "\n{} Watchlist\n\n{}\n",
        "👀".cyan().bold(),
        finish(Table::new(&rows))
    )
}
