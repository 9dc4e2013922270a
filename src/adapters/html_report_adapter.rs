//! HTML watchlist implementing ReportPort.
//!
//! Renders an Askama template holding a static table that sorts client-side.
//! Numeric cells carry a `data-order` attribute so the script compares
//! numbers rather than formatted text.

use std::fs;
use std::path::Path;

use askama::Template;

use crate::domain::error::ScreenerError;
use crate::domain::ranking::{RankedTable, round2};
use crate::ports::report_port::{ReportContext, ReportPort};

const TICKER_LINK_BASE: &str = "https://ticker.finology.in/company/";

struct HeaderCell {
    index: usize,
    name: String,
    data_type: &'static str,
    description: String,
}

struct ValueCell {
    order: String,
    text: String,
}

struct RowView {
    highlight: bool,
    ticker: String,
    link: String,
    cells: Vec<Option<ValueCell>>,
}

#[derive(Template)]
#[template(path = "watchlist.html")]
struct WatchlistTemplate<'a> {
    title: String,
    scope_label: &'a str,
    benchmark: &'a str,
    row_count: usize,
    headers: Vec<HeaderCell>,
    rows: Vec<RowView>,
    score_column: usize,
}

fn describe(column: &str, table: &RankedTable, benchmark: &str) -> String {
    for lb in &table.lookbacks {
        if column == lb.abs_return_column() {
            return format!("Absolute return over last {} days (%)", lb.days);
        }
        if column == lb.rel_strength_column() {
            return format!("Relative strength vs {} over {} days", benchmark, lb.days);
        }
    }
    match column {
        "Ticker" => "Stock symbol (NSE code)".to_string(),
        "Rank" => "Position in RS Score ranking (1 = strongest)".to_string(),
        "RS Score" if table.benchmark_present => {
            "Average of all relative strength values (overall outperformance)".to_string()
        }
        "RS Score" => "Average of all absolute returns (%)".to_string(),
        other => format!("Data for {other}"),
    }
}

fn display_ticker(symbol: &str) -> String {
    match symbol.rsplit_once('.') {
        Some((base, _)) if !base.is_empty() => base.to_string(),
        _ => symbol.to_string(),
    }
}

fn build_view<'a>(table: &RankedTable, context: &'a ReportContext) -> WatchlistTemplate<'a> {
    let columns = table.columns();
    let headers = columns
        .iter()
        .enumerate()
        .map(|(index, name)| HeaderCell {
            index,
            name: name.clone(),
            data_type: if index == 0 { "string" } else { "numeric" },
            description: describe(name, table, &context.benchmark),
        })
        .collect();

    let numeric_names = &columns[1..];
    let rank_index = numeric_names.len() - 1;
    let rows = table
        .rows
        .iter()
        .map(|row| {
            let cells = table
                .values(row)
                .into_iter()
                .enumerate()
                .map(|(i, value)| {
                    value.map(|v| {
                        let order = format!("{:.2}", round2(v));
                        let text = if i == rank_index {
                            format!("{}", v as usize)
                        } else if numeric_names[i].starts_with("AbsRet_") {
                            format!("{order}%")
                        } else {
                            order.clone()
                        };
                        ValueCell { order, text }
                    })
                })
                .collect();
            let ticker = display_ticker(&row.symbol);
            RowView {
                highlight: row.rank == 1,
                link: format!("{TICKER_LINK_BASE}{ticker}"),
                ticker,
                cells,
            }
        })
        .collect();

    WatchlistTemplate {
        title: format!("RSQM Watchlist - {}", context.scope_label),
        scope_label: &context.scope_label,
        benchmark: &context.benchmark,
        row_count: table.len(),
        headers,
        rows,
        score_column: columns.len() - 2,
    }
}

#[derive(Debug, Default)]
pub struct HtmlReportAdapter;

impl HtmlReportAdapter {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, table: &RankedTable, context: &ReportContext) -> Result<String, ScreenerError> {
        build_view(table, context)
            .render()
            .map_err(|e| ScreenerError::Report {
                reason: format!("template error: {e}"),
            })
    }
}

impl ReportPort for HtmlReportAdapter {
    fn extension(&self) -> &'static str {
        "html"
    }

    fn write(
        &self,
        table: &RankedTable,
        context: &ReportContext,
        output_path: &Path,
    ) -> Result<(), ScreenerError> {
        let html = self.render(table, context)?;
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(output_path, html)?;
        Ok(())
    }
}
