//! Spreadsheet watchlist writer.
//!
//! Carries the same columns and rounding as the CSV report: returns and
//! strengths at two decimals, rank as a whole number, gaps left blank.

use crate::domain::error::ScreenerError;
use crate::domain::ranking::{RankedTable, round2};
use crate::ports::report_port::{ReportContext, ReportPort};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::fs;
use std::path::Path;

const SHEET_NAME: &str = "Watchlist";

#[derive(Debug, Clone, PartialEq)]
enum SheetCell {
    Text(String),
    Value(f64),
    Rank(f64),
    Blank,
}

#[derive(Debug, Default)]
pub struct XlsxReportAdapter;

impl XlsxReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

fn xlsx_error(e: XlsxError) -> ScreenerError {
    ScreenerError::Report {
        reason: format!("XLSX write error: {e}"),
    }
}

fn sheet_rows(table: &RankedTable) -> Vec<Vec<SheetCell>> {
    table
        .rows
        .iter()
        .map(|row| {
            let values = table.values(row);
            let rank_index = values.len() - 1;
            let mut cells = vec![SheetCell::Text(row.symbol.clone())];
            cells.extend(values.into_iter().enumerate().map(|(i, value)| match value {
                Some(v) if i == rank_index => SheetCell::Rank(v),
                Some(v) => SheetCell::Value(round2(v)),
                None => SheetCell::Blank,
            }));
            cells
        })
        .collect()
}

impl ReportPort for XlsxReportAdapter {
    fn extension(&self) -> &'static str {
        "xlsx"
    }

    fn write(
        &self,
        table: &RankedTable,
        _context: &ReportContext,
        output_path: &Path,
    ) -> Result<(), ScreenerError> {
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let header = Format::new().set_bold();
        let decimal = Format::new().set_num_format("0.00");
        let whole = Format::new().set_num_format("0");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME).map_err(xlsx_error)?;

        for (col, name) in table.columns().iter().enumerate() {
            sheet
                .write_string_with_format(0, col as u16, name.as_str(), &header)
                .map_err(xlsx_error)?;
        }
        sheet.set_freeze_panes(1, 0).map_err(xlsx_error)?;

        for (r, cells) in sheet_rows(table).into_iter().enumerate() {
            let row = r as u32 + 1;
            for (c, cell) in cells.into_iter().enumerate() {
                let col = c as u16;
                match cell {
                    SheetCell::Text(text) => sheet.write_string(row, col, text),
                    SheetCell::Value(v) => sheet.write_number_with_format(row, col, v, &decimal),
                    SheetCell::Rank(v) => sheet.write_number_with_format(row, col, v, &whole),
                    SheetCell::Blank => continue,
                }
                .map_err(xlsx_error)?;
            }
        }
        sheet.autofit();

        workbook.save(output_path).map_err(xlsx_error)?;
        tracing::debug!(path = %output_path.display(), rows = table.len(), "spreadsheet written");
        Ok(())
    }
}
