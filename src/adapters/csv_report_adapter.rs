//! CSV watchlist writer.

use crate::domain::error::ScreenerError;
use crate::domain::ranking::{RankedTable, round2};
use crate::ports::report_port::{ReportContext, ReportPort};
use std::fs;
use std::path::Path;

#[derive(Debug, Default)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

fn csv_error(e: impl std::fmt::Display) -> ScreenerError {
    ScreenerError::Report {
        reason: format!("CSV write error: {e}"),
    }
}

impl ReportPort for CsvReportAdapter {
    fn extension(&self) -> &'static str {
        "csv"
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
        let mut wtr = csv::Writer::from_path(output_path).map_err(csv_error)?;
        wtr.write_record(table.columns()).map_err(csv_error)?;

        for row in &table.rows {
            let values = table.values(row);
            let rank_index = values.len() - 1;
            let mut record = vec![row.symbol.clone()];
            for (i, value) in values.into_iter().enumerate() {
                record.push(match value {
                    Some(v) if i == rank_index => format!("{}", v as usize),
                    Some(v) => format!("{:.2}", round2(v)),
                    None => String::new(),
                });
            }
            wtr.write_record(&record).map_err(csv_error)?;
        }
        wtr.flush()?;
        Ok(())
    }
}
