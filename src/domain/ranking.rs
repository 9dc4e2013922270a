//! Relative-strength ranking.
//!
//! For each lookback `d`:
//!   AbsRet = 100 * (p[last] / p[last - d] - 1), rows of the shared date axis
//!            with each symbol's gaps forward-filled
//!   RelStr = AbsRet / AbsRet(benchmark) when |AbsRet(benchmark)| > threshold, else AbsRet
//! RS Score is the mean of the non-missing RelStr values, or of the AbsRet
//! values when the benchmark has no prices at all.

use crate::domain::lookback::Lookback;
use crate::domain::price::PriceTable;
use crate::domain::universe::Universe;
use std::cmp::Ordering;

pub const DEFAULT_TOP_N: usize = 15;
pub const FLAT_BENCHMARK_THRESHOLD: f64 = 1e-4;

#[derive(Debug, Clone, PartialEq)]
pub struct RankSettings {
    pub lookbacks: Vec<Lookback>,
    pub top_n: usize,
    pub flat_benchmark_threshold: f64,
}

impl Default for RankSettings {
    fn default() -> Self {
        Self {
            lookbacks: Lookback::defaults(),
            top_n: DEFAULT_TOP_N,
            flat_benchmark_threshold: FLAT_BENCHMARK_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow {
    pub symbol: String,
    /// One entry per lookback, in lookback order.
    pub abs_returns: Vec<Option<f64>>,
    /// Present only when the benchmark branch applied.
    pub rel_strengths: Option<Vec<Option<f64>>>,
    pub score: f64,
    pub rank: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedTable {
    pub lookbacks: Vec<Lookback>,
    pub benchmark_present: bool,
    pub rows: Vec<MetricRow>,
}

impl RankedTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Output column names, `Ticker` first.
    pub fn columns(&self) -> Vec<String> {
        let mut columns = vec!["Ticker".to_string()];
        for lb in &self.lookbacks {
            columns.push(lb.abs_return_column());
            if self.benchmark_present {
                columns.push(lb.rel_strength_column());
            }
        }
        columns.push("RS Score".to_string());
        columns.push("Rank".to_string());
        columns
    }

    /// Numeric cells of a row in the order of [`Self::columns`] minus `Ticker`.
    pub fn values(&self, row: &MetricRow) -> Vec<Option<f64>> {
        let mut values = Vec::with_capacity(self.lookbacks.len() * 2 + 2);
        for (i, _) in self.lookbacks.iter().enumerate() {
            values.push(row.abs_returns.get(i).copied().flatten());
            if self.benchmark_present {
                values.push(
                    row.rel_strengths
                        .as_ref()
                        .and_then(|r| r.get(i).copied().flatten()),
                );
            }
        }
        values.push(Some(row.score));
        values.push(Some(row.rank as f64));
        values
    }
}

/// Rounds half away from zero to two decimals, for presentation.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percent change between the last row and the row `days` earlier of an
/// aligned, forward-filled column. Missing when either row has no price.
pub fn absolute_return(prices: &[Option<f64>], days: usize) -> Option<f64> {
    if days == 0 || prices.len() < days + 1 {
        return None;
    }
    let last = prices[prices.len() - 1]?;
    let base = prices[prices.len() - 1 - days]?;
    let ret = 100.0 * (last / base - 1.0);
    ret.is_finite().then_some(ret)
}

pub fn relative_strength(abs_return: Option<f64>, benchmark_return: Option<f64>, threshold: f64) -> Option<f64> {
    let abs_return = abs_return?;
    match benchmark_return {
        Some(bench) if bench.abs() > threshold => Some(abs_return / bench),
        _ => Some(abs_return),
    }
}

fn mean(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        None
    } else {
        Some(present.iter().sum::<f64>() / present.len() as f64)
    }
}

/// Scores the universe and returns the top rows, best first.
///
/// Symbols without a column are skipped, as is the benchmark itself. Rows
/// whose score cannot be computed are dropped. Equal scores keep universe order.
pub fn rank(
    table: &PriceTable,
    symbols: &[String],
    benchmark: &str,
    settings: &RankSettings,
) -> RankedTable {
    let keep = Universe::new(symbols.to_vec(), benchmark).with_benchmark();
    let table = table.restrict(&keep);

    let benchmark_present = table.has_values(benchmark);
    let benchmark_returns: Vec<Option<f64>> = if benchmark_present {
        let prices = table.forward_filled(benchmark);
        settings
            .lookbacks
            .iter()
            .map(|lb| absolute_return(&prices, lb.days))
            .collect()
    } else {
        tracing::warn!(%benchmark, "benchmark missing, computing only absolute returns");
        Vec::new()
    };

    let mut scored: Vec<MetricRow> = Vec::new();
    for symbol in table.symbols().iter().filter(|s| *s != benchmark) {
        let prices = table.forward_filled(symbol);
        let abs_returns: Vec<Option<f64>> = settings
            .lookbacks
            .iter()
            .map(|lb| absolute_return(&prices, lb.days))
            .collect();

        let (rel_strengths, score) = if benchmark_present {
            let rel: Vec<Option<f64>> = abs_returns
                .iter()
                .zip(&benchmark_returns)
                .map(|(&a, &b)| relative_strength(a, b, settings.flat_benchmark_threshold))
                .collect();
            let score = mean(&rel);
            (Some(rel), score)
        } else {
            (None, mean(&abs_returns))
        };

        if let Some(score) = score {
            scored.push(MetricRow {
                symbol: symbol.clone(),
                abs_returns,
                rel_strengths,
                score,
                rank: 0,
            });
        }
    }

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    for (i, row) in scored.iter_mut().enumerate() {
        row.rank = i + 1;
    }
    scored.truncate(settings.top_n);

    RankedTable {
        lookbacks: settings.lookbacks.clone(),
        benchmark_present,
        rows: scored,
    }
}
