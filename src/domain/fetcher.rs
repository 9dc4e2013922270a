//! Two-tier price retrieval: one bulk request, then per-symbol retries.
//!
//! The bulk answer is classified once into a [`BulkOutcome`]; anything other
//! than [`BulkOutcome::Accepted`] sends every symbol through the individual
//! path. Neither tier ever returns an error to the caller: an empty
//! [`PriceTable`] means nothing could be retrieved.

use crate::domain::error::ScreenerError;
use crate::domain::price::{PriceSeries, PriceTable};
use crate::domain::retry::RetryPolicy;
use crate::domain::universe::Universe;
use crate::ports::price_port::PricePort;
use crate::ports::progress_port::ProgressPort;
use chrono::{Duration, Local, NaiveDate};

/// Calendar days of history requested by default; covers 180 trading days.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 400;

/// Longest calendar window the configuration accepts, ten years.
pub const MAX_LOOKBACK_DAYS: i64 = 3650;

/// Classification of the bulk attempt.
#[derive(Debug)]
pub enum BulkOutcome {
    Accepted(PriceTable),
    BenchmarkMissing,
    Failed(ScreenerError),
}

pub struct SeriesFetcher<'a> {
    port: &'a dyn PricePort,
    progress: &'a dyn ProgressPort,
    retry: RetryPolicy,
}

impl<'a> SeriesFetcher<'a> {
    pub fn new(port: &'a dyn PricePort, progress: &'a dyn ProgressPort, retry: RetryPolicy) -> Self {
        Self {
            port,
            progress,
            retry,
        }
    }

    /// Fetches `[today - lookback_days, today]` for the symbols and the benchmark.
    /// A window reaching past the calendar's range starts at its first date.
    pub fn fetch(&self, symbols: &[String], benchmark: &str, lookback_days: i64) -> PriceTable {
        let end = Local::now().date_naive();
        let start = Duration::try_days(lookback_days)
            .and_then(|span| end.checked_sub_signed(span))
            .unwrap_or(NaiveDate::MIN);
        self.fetch_range(symbols, benchmark, start, end)
    }

    pub fn fetch_range(
        &self,
        symbols: &[String],
        benchmark: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> PriceTable {
        let all = Universe::new(symbols.to_vec(), benchmark).with_benchmark();

        tracing::info!(symbols = all.len(), %start_date, %end_date, "attempting bulk download");
        match self.try_bulk(&all, benchmark, start_date, end_date) {
            BulkOutcome::Accepted(table) => {
                tracing::info!(columns = table.symbols().len(), "bulk download successful");
                return table;
            }
            BulkOutcome::BenchmarkMissing => {
                tracing::warn!(%benchmark, "benchmark missing in bulk result, falling back to individual downloads");
            }
            BulkOutcome::Failed(e) => {
                tracing::warn!(error = %e, "bulk download failed, switching to individual downloads with retries");
            }
        }

        let table = self.fetch_individually(&all, start_date, end_date);
        if table.is_empty() {
            tracing::error!("all downloads failed");
        } else if table.has_values(benchmark) {
            tracing::info!(columns = table.symbols().len(), "individual downloads successful with benchmark");
        } else {
            tracing::warn!(%benchmark, "benchmark still missing, proceeding without it");
        }
        table
    }

    pub fn try_bulk(
        &self,
        all: &[String],
        benchmark: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> BulkOutcome {
        let frame = match self.port.fetch_bulk(all, start_date, end_date) {
            Ok(frame) => frame,
            Err(e) => return BulkOutcome::Failed(e),
        };
        let Some(field) = frame.close_field() else {
            return BulkOutcome::BenchmarkMissing;
        };
        let table = frame.select(field);
        if table.has_values(benchmark) {
            BulkOutcome::Accepted(table)
        } else {
            BulkOutcome::BenchmarkMissing
        }
    }

    /// Fetches each symbol on its own; symbols that exhaust their retries are left out.
    pub fn fetch_individually(
        &self,
        all: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> PriceTable {
        let mut collected: Vec<PriceSeries> = Vec::with_capacity(all.len());

        self.progress.begin(all.len());
        for symbol in all {
            self.progress.advance(symbol);
            match self.fetch_one(symbol, start_date, end_date) {
                Ok(series) => collected.push(series),
                Err(e) => {
                    tracing::warn!(%symbol, error = %e, "failed after retries");
                    self.progress.failed(symbol, &e.to_string());
                }
            }
        }
        self.progress.finish();

        if collected.is_empty() {
            return PriceTable::empty();
        }
        PriceTable::from_series(collected)
    }

    /// Single-symbol fetch under the retry policy. An empty answer counts as a failure.
    pub fn fetch_one(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, ScreenerError> {
        self.retry.run(|attempt| {
            tracing::debug!(%symbol, attempt, "fetching history");
            let frame = self.port.fetch_history(symbol, start_date, end_date)?;
            if frame.is_empty() {
                return Err(ScreenerError::NoData {
                    symbol: symbol.to_string(),
                });
            }
            frame
                .close_series(symbol)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| ScreenerError::NoData {
                    symbol: symbol.to_string(),
                })
        })
    }
}
