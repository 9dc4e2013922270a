#![allow(dead_code)]

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rsqm::domain::config::ScreenerConfig;
use rsqm::domain::error::ScreenerError;
use rsqm::domain::price::{FrameColumn, PriceField, PriceFrame};
use rsqm::domain::retry::RetryPolicy;
use rsqm::domain::universe::Scope;
use rsqm::ports::price_port::PricePort;
use rsqm::ports::progress_port::ProgressPort;
use rsqm::ports::symbol_port::SymbolPort;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::path::Path;

pub const BENCHMARK: &str = "BM";

/// Scripted price provider. Bulk answers are fixed up front; single-symbol
/// answers can fail a set number of times before succeeding.
pub struct MockPricePort {
    bulk: Result<PriceFrame, String>,
    histories: HashMap<String, Vec<(NaiveDate, f64)>>,
    flaky: HashMap<String, u32>,
    broken: HashSet<String>,
    pub bulk_calls: Cell<usize>,
    pub history_calls: RefCell<HashMap<String, u32>>,
}

impl MockPricePort {
    pub fn new() -> Self {
        Self {
            bulk: Err("bulk not scripted".into()),
            histories: HashMap::new(),
            flaky: HashMap::new(),
            broken: HashSet::new(),
            bulk_calls: Cell::new(0),
            history_calls: RefCell::new(HashMap::new()),
        }
    }

    pub fn with_bulk_frame(mut self, frame: PriceFrame) -> Self {
        self.bulk = Ok(frame);
        self
    }

    pub fn with_bulk_error(mut self, reason: &str) -> Self {
        self.bulk = Err(reason.to_string());
        self
    }

    pub fn with_history(mut self, symbol: &str, points: Vec<(NaiveDate, f64)>) -> Self {
        self.histories.insert(symbol.to_string(), points);
        self
    }

    /// The first `failures` single-symbol requests for `symbol` fail.
    pub fn failing_first(mut self, symbol: &str, failures: u32) -> Self {
        self.flaky.insert(symbol.to_string(), failures);
        self
    }

    pub fn always_failing(mut self, symbol: &str) -> Self {
        self.broken.insert(symbol.to_string());
        self
    }

    pub fn calls_for(&self, symbol: &str) -> u32 {
        self.history_calls.borrow().get(symbol).copied().unwrap_or(0)
    }
}

impl PricePort for MockPricePort {
    fn fetch_bulk(
        &self,
        _symbols: &[String],
        _start_date: NaiveDate,
        _end_date: NaiveDate,
    ) -> Result<PriceFrame, ScreenerError> {
        self.bulk_calls.set(self.bulk_calls.get() + 1);
        self.bulk.clone().map_err(|reason| ScreenerError::Provider { reason })
    }

    fn fetch_history(
        &self,
        symbol: &str,
        _start_date: NaiveDate,
        _end_date: NaiveDate,
    ) -> Result<PriceFrame, ScreenerError> {
        let attempt = {
            let mut calls = self.history_calls.borrow_mut();
            let count = calls.entry(symbol.to_string()).or_insert(0);
            *count += 1;
            *count
        };
        if self.broken.contains(symbol) {
            return Err(ScreenerError::Provider {
                reason: format!("{symbol} unavailable"),
            });
        }
        if attempt <= self.flaky.get(symbol).copied().unwrap_or(0) {
            return Err(ScreenerError::Provider {
                reason: format!("transient failure {attempt}"),
            });
        }
        let columns = match self.histories.get(symbol) {
            Some(points) => vec![close_column(symbol, PriceField::Close, points)],
            None => Vec::new(),
        };
        Ok(PriceFrame::new(columns))
    }
}

/// Records every progress callback as a string.
#[derive(Default)]
pub struct RecordingProgress {
    pub events: RefCell<Vec<String>>,
}

impl ProgressPort for RecordingProgress {
    fn begin(&self, total: usize) {
        self.events.borrow_mut().push(format!("begin {total}"));
    }

    fn advance(&self, symbol: &str) {
        self.events.borrow_mut().push(format!("advance {symbol}"));
    }

    fn failed(&self, symbol: &str, _reason: &str) {
        self.events.borrow_mut().push(format!("failed {symbol}"));
    }

    fn finish(&self) {
        self.events.borrow_mut().push("finish".to_string());
    }
}

pub struct MockSymbolPort {
    pub symbols: Result<Vec<String>, String>,
    pub calls: Cell<usize>,
}

impl MockSymbolPort {
    pub fn with_symbols(symbols: &[&str]) -> Self {
        Self {
            symbols: Ok(symbols.iter().map(|s| s.to_string()).collect()),
            calls: Cell::new(0),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            symbols: Err(reason.to_string()),
            calls: Cell::new(0),
        }
    }
}

impl SymbolPort for MockSymbolPort {
    fn load(&self, _scope: Scope) -> Result<Vec<String>, ScreenerError> {
        self.calls.set(self.calls.get() + 1);
        self.symbols
            .clone()
            .map_err(|reason| ScreenerError::SymbolList { reason })
    }
}

/// `n` consecutive weekdays starting on Monday 2024-01-01.
pub fn trading_days(n: usize) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(n);
    let mut date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    while days.len() < n {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            days.push(date);
        }
        date += Duration::days(1);
    }
    days
}

/// `start * (1 + daily)^t` on each of the given dates.
pub fn compounding(dates: &[NaiveDate], start: f64, daily: f64) -> Vec<(NaiveDate, f64)> {
    dates
        .iter()
        .enumerate()
        .map(|(t, &d)| (d, start * (1.0 + daily).powi(t as i32)))
        .collect()
}

/// Pairs the last `prices.len()` dates of `dates` with `prices`.
pub fn on_last_dates(dates: &[NaiveDate], prices: &[f64]) -> Vec<(NaiveDate, f64)> {
    let offset = dates.len() - prices.len();
    dates[offset..].iter().copied().zip(prices.iter().copied()).collect()
}

pub fn close_column(symbol: &str, field: PriceField, points: &[(NaiveDate, f64)]) -> FrameColumn {
    FrameColumn {
        symbol: symbol.to_string(),
        field,
        points: points.iter().map(|&(d, v)| (d, Some(v))).collect(),
    }
}

/// Bulk frame with an adjusted-close column for every entry.
pub fn adj_close_frame(series: &[(&str, Vec<(NaiveDate, f64)>)]) -> PriceFrame {
    PriceFrame::new(
        series
            .iter()
            .map(|(symbol, points)| close_column(symbol, PriceField::AdjClose, points))
            .collect(),
    )
}

/// Defaults with no delay between retries.
pub fn fast_config(output_dir: &Path) -> ScreenerConfig {
    let mut config = ScreenerConfig::default();
    config.benchmark = BENCHMARK.to_string();
    config.fetch.retry = RetryPolicy::new(3, std::time::Duration::ZERO);
    config.output_dir = output_dir.to_path_buf();
    config
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
