//! Run configuration assembled from a [`ConfigPort`] with defaults.

use crate::domain::error::ScreenerError;
use crate::domain::fetcher::{DEFAULT_LOOKBACK_DAYS, MAX_LOOKBACK_DAYS};
use crate::domain::lookback::{parse_lookbacks, Lookback};
use crate::domain::ranking::{RankSettings, DEFAULT_TOP_N, FLAT_BENCHMARK_THRESHOLD};
use crate::domain::retry::RetryPolicy;
use crate::ports::config_port::ConfigPort;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BENCHMARK: &str = "^NSEI";
pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_REMOTE_URL_TEMPLATE: &str =
    "https://nsearchives.nseindia.com/content/indices/ind_nifty{scope}list.csv";
pub const DEFAULT_SUFFIX: &str = ".NS";

#[derive(Debug, Clone, PartialEq)]
pub struct FetchConfig {
    pub base_url: String,
    pub retry: RetryPolicy,
    pub timeout: Duration,
    pub bulk_chunk_size: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolsConfig {
    pub local_dir: PathBuf,
    pub remote_url_template: String,
    pub suffix: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenerConfig {
    pub benchmark: String,
    pub lookback_days: i64,
    pub rank: RankSettings,
    pub fetch: FetchConfig,
    pub symbols: SymbolsConfig,
    pub output_dir: PathBuf,
    pub log_level: String,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            benchmark: DEFAULT_BENCHMARK.to_string(),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            rank: RankSettings::default(),
            fetch: FetchConfig {
                base_url: DEFAULT_BASE_URL.to_string(),
                retry: RetryPolicy::default(),
                timeout: Duration::from_secs(10),
                bulk_chunk_size: 20,
            },
            symbols: SymbolsConfig {
                local_dir: PathBuf::from("."),
                remote_url_template: DEFAULT_REMOTE_URL_TEMPLATE.to_string(),
                suffix: DEFAULT_SUFFIX.to_string(),
            },
            output_dir: PathBuf::from("."),
            log_level: "info".to_string(),
        }
    }
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> ScreenerError {
    ScreenerError::ConfigInvalid {
        section: section.into(),
        key: key.into(),
        reason: reason.into(),
    }
}

fn positive(adapter: &dyn ConfigPort, section: &str, key: &str, default: i64) -> Result<i64, ScreenerError> {
    let value = adapter.get_int(section, key, default);
    if value < 1 {
        return Err(invalid(section, key, format!("must be at least 1, got {value}")));
    }
    Ok(value)
}

fn non_negative(adapter: &dyn ConfigPort, section: &str, key: &str, default: i64) -> Result<i64, ScreenerError> {
    let value = adapter.get_int(section, key, default);
    if value < 0 {
        return Err(invalid(section, key, format!("must not be negative, got {value}")));
    }
    Ok(value)
}

pub fn build_screener_config(adapter: &dyn ConfigPort) -> Result<ScreenerConfig, ScreenerError> {
    let defaults = ScreenerConfig::default();

    let lookbacks: Vec<Lookback> = match adapter.get_string("screener", "lookbacks") {
        Some(raw) => parse_lookbacks(&raw).map_err(|e| invalid("screener", "lookbacks", e.to_string()))?,
        None => Lookback::defaults(),
    };

    let lookback_days = positive(adapter, "screener", "lookback_days", defaults.lookback_days)?;
    if lookback_days > MAX_LOOKBACK_DAYS {
        return Err(invalid(
            "screener",
            "lookback_days",
            format!("must be at most {MAX_LOOKBACK_DAYS}, got {lookback_days}"),
        ));
    }
    let longest = lookbacks.iter().map(|l| l.days).max().unwrap_or(0) as i64;
    if lookback_days < longest {
        return Err(invalid(
            "screener",
            "lookback_days",
            format!("{lookback_days} calendar days cannot hold a {longest}-day lookback"),
        ));
    }

    let threshold = adapter.get_double(
        "screener",
        "flat_benchmark_threshold",
        FLAT_BENCHMARK_THRESHOLD,
    );
    if threshold.is_nan() || threshold < 0.0 {
        return Err(invalid("screener", "flat_benchmark_threshold", "must not be negative"));
    }

    let benchmark = adapter
        .get_string("screener", "benchmark")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or(defaults.benchmark);

    let max_attempts = positive(adapter, "fetch", "max_attempts", 3)?;
    let retry_delay = non_negative(adapter, "fetch", "retry_delay_secs", 2)?;
    let timeout = positive(adapter, "fetch", "timeout_secs", 10)?;
    let bulk_chunk_size = positive(adapter, "fetch", "bulk_chunk_size", 20)?;

    Ok(ScreenerConfig {
        benchmark,
        lookback_days,
        rank: RankSettings {
            lookbacks,
            top_n: positive(adapter, "screener", "top_n", DEFAULT_TOP_N as i64)? as usize,
            flat_benchmark_threshold: threshold,
        },
        fetch: FetchConfig {
            base_url: adapter
                .get_string("fetch", "base_url")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or(defaults.fetch.base_url),
            retry: RetryPolicy::new(max_attempts as u32, Duration::from_secs(retry_delay as u64)),
            timeout: Duration::from_secs(timeout as u64),
            bulk_chunk_size: bulk_chunk_size as usize,
        },
        symbols: SymbolsConfig {
            local_dir: adapter
                .get_string("symbols", "local_dir")
                .map(PathBuf::from)
                .unwrap_or(defaults.symbols.local_dir),
            remote_url_template: adapter
                .get_string("symbols", "remote_url_template")
                .unwrap_or(defaults.symbols.remote_url_template),
            suffix: adapter
                .get_string("symbols", "suffix")
                .unwrap_or(defaults.symbols.suffix),
        },
        output_dir: adapter
            .get_string("report", "output_dir")
            .map(PathBuf::from)
            .unwrap_or(defaults.output_dir),
        log_level: adapter
            .get_string("logging", "level")
            .unwrap_or(defaults.log_level),
    })
}
