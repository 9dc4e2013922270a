//! Yahoo Finance chart API adapter implementing [`PricePort`].
//!
//! Single-symbol history comes from `/v8/finance/chart/{symbol}`; the bulk
//! call uses `/v7/finance/spark`, which answers with one chart payload per
//! symbol. Requests are blocking and bounded by the client timeout.

use crate::domain::config::FetchConfig;
use crate::domain::error::ScreenerError;
use crate::domain::price::{FrameColumn, PriceField, PriceFrame};
use crate::ports::price_port::PricePort;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime};
use reqwest::blocking::Client;
use serde::Deserialize;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
    #[serde(default)]
    adjclose: Vec<AdjClose>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct SparkEnvelope {
    spark: SparkBody,
}

#[derive(Debug, Deserialize)]
struct SparkBody {
    result: Option<Vec<SparkResult>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct SparkResult {
    symbol: String,
    #[serde(default)]
    response: Vec<ChartResult>,
}

fn api_error(error: ApiError) -> ScreenerError {
    ScreenerError::Provider {
        reason: match error.description {
            Some(description) => format!("{}: {}", error.code, description),
            None => error.code,
        },
    }
}

fn parse_failure(e: serde_json::Error) -> ScreenerError {
    ScreenerError::Provider {
        reason: format!("failed to parse response: {e}"),
    }
}

/// Columns of one chart payload, dates limited to `[start_date, end_date)`.
fn chart_columns(
    symbol: &str,
    chart: &ChartResult,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Vec<FrameColumn> {
    let dates: Vec<Option<NaiveDate>> = chart
        .timestamp
        .iter()
        .map(|&ts| {
            DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.date_naive())
                .filter(|d| *d >= start_date && *d < end_date)
        })
        .collect();

    let column = |field: PriceField, values: &[Option<f64>]| FrameColumn {
        symbol: symbol.to_string(),
        field,
        points: dates
            .iter()
            .enumerate()
            .filter_map(|(i, date)| date.map(|d| (d, values.get(i).copied().flatten())))
            .collect(),
    };

    let mut columns = Vec::new();
    if let Some(quote) = chart.indicators.quote.first() {
        columns.push(column(PriceField::Open, &quote.open));
        columns.push(column(PriceField::High, &quote.high));
        columns.push(column(PriceField::Low, &quote.low));
        columns.push(column(PriceField::Close, &quote.close));
        columns.push(column(PriceField::Volume, &quote.volume));
    }
    if let Some(adj) = chart.indicators.adjclose.first() {
        columns.push(column(PriceField::AdjClose, &adj.adjclose));
    }
    columns
}

/// Parses a `/v8/finance/chart` body.
pub fn parse_chart(
    symbol: &str,
    body: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<PriceFrame, ScreenerError> {
    let envelope: ChartEnvelope = serde_json::from_str(body).map_err(parse_failure)?;
    if let Some(error) = envelope.chart.error {
        return Err(api_error(error));
    }
    let columns = envelope
        .chart
        .result
        .unwrap_or_default()
        .iter()
        .take(1)
        .flat_map(|chart| chart_columns(symbol, chart, start_date, end_date))
        .collect();
    Ok(PriceFrame::new(columns))
}

/// Parses a `/v7/finance/spark` body into a frame grouped by symbol.
pub fn parse_spark(
    body: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<PriceFrame, ScreenerError> {
    let envelope: SparkEnvelope = serde_json::from_str(body).map_err(parse_failure)?;
    if let Some(error) = envelope.spark.error {
        return Err(api_error(error));
    }
    let mut columns = Vec::new();
    for result in envelope.spark.result.unwrap_or_default() {
        if let Some(chart) = result.response.first() {
            columns.extend(chart_columns(&result.symbol, chart, start_date, end_date));
        }
    }
    Ok(PriceFrame::new(columns))
}

fn encode_symbol(symbol: &str) -> String {
    symbol.replace('^', "%5E")
}

fn epoch(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

pub struct YahooAdapter {
    client: Client,
    base_url: String,
    bulk_chunk_size: usize,
}

impl YahooAdapter {
    pub fn new(
        base_url: impl Into<String>,
        timeout: std::time::Duration,
        bulk_chunk_size: usize,
    ) -> Result<Self, ScreenerError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ScreenerError::Provider {
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            bulk_chunk_size: bulk_chunk_size.max(1),
        })
    }

    pub fn from_config(config: &FetchConfig) -> Result<Self, ScreenerError> {
        Self::new(config.base_url.clone(), config.timeout, config.bulk_chunk_size)
    }

    fn chart_url(&self, symbol: &str) -> String {
        format!("{}/v8/finance/chart/{}", self.base_url, encode_symbol(symbol))
    }

    fn spark_url(&self) -> String {
        format!("{}/v7/finance/spark", self.base_url)
    }

    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<String, ScreenerError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .map_err(|e| ScreenerError::Provider {
                reason: format!("request to {url} failed: {e}"),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ScreenerError::Provider {
                reason: "rate limit exceeded".into(),
            });
        }
        let text = response.text().map_err(|e| ScreenerError::Provider {
            reason: format!("failed to read response from {url}: {e}"),
        })?;
        if !status.is_success() && !text.trim_start().starts_with('{') {
            return Err(ScreenerError::Provider {
                reason: format!("HTTP {status} from {url}"),
            });
        }
        Ok(text)
    }
}

impl PricePort for YahooAdapter {
    fn fetch_bulk(
        &self,
        symbols: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceFrame, ScreenerError> {
        let end_exclusive = end_date + Duration::days(1);
        let mut columns = Vec::new();
        for chunk in symbols.chunks(self.bulk_chunk_size) {
            let query = [
                ("symbols", chunk.join(",")),
                ("period1", epoch(start_date).to_string()),
                ("period2", epoch(end_exclusive).to_string()),
                ("interval", "1d".to_string()),
            ];
            let body = self.get(&self.spark_url(), &query)?;
            columns.extend(parse_spark(&body, start_date, end_exclusive)?.columns);
        }
        Ok(PriceFrame::new(columns))
    }

    fn fetch_history(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceFrame, ScreenerError> {
        let query = [
            ("period1", epoch(start_date).to_string()),
            ("period2", epoch(end_date).to_string()),
            ("interval", "1d".to_string()),
            ("events", "history".to_string()),
            ("includeAdjustedClose", "true".to_string()),
        ];
        let body = self.get(&self.chart_url(symbol), &query)?;
        parse_chart(symbol, &body, start_date, end_date)
    }
}
