//! CLI integration tests for scan orchestration.
//!
//! Tests cover:
//! - Config loading from INI files on disk
//! - Universe resolution (index list, `--symbols` override, empty lists)
//! - Exit codes for fatal input errors, which never reach the network
//! - Full pipeline with MockPricePort writing CSV, XLSX and HTML into a temp dir

mod common;

use clap::Parser;
use common::*;
use rsqm::adapters::csv_report_adapter::CsvReportAdapter;
use rsqm::adapters::html_report_adapter::HtmlReportAdapter;
use rsqm::adapters::xlsx_report_adapter::XlsxReportAdapter;
use rsqm::cli::{self, Cli};
use rsqm::domain::error::ScreenerError;
use rsqm::domain::universe::{Scope, Universe};
use rsqm::ports::progress_port::SilentProgress;
use rsqm::ports::report_port::ReportPort;
use std::io::Write;
use std::process::ExitCode;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn same(a: ExitCode, b: ExitCode) -> bool {
    format!("{a:?}") == format!("{b:?}")
}

fn run_args(args: &[&str]) -> ExitCode {
    cli::run(Cli::try_parse_from(args).unwrap())
}

const VALID_INI: &str = r#"
[screener]
benchmark = BM
lookback_days = 300
top_n = 2
lookbacks = 30D:30, 90D:90

[fetch]
base_url = http://127.0.0.1:9/
max_attempts = 4
retry_delay_secs = 0

[symbols]
suffix = .BO

[report]
output_dir = /tmp/rsqm-out
"#;

mod config_loading {
    use super::*;

    #[test]
    fn load_config_reads_every_section() {
        let file = write_temp_ini(VALID_INI);
        let config = cli::load_config(Some(file.path())).unwrap();

        assert_eq!(config.benchmark, "BM");
        assert_eq!(config.lookback_days, 300);
        assert_eq!(config.rank.top_n, 2);
        assert_eq!(config.rank.lookbacks.len(), 2);
        assert_eq!(config.fetch.base_url, "http://127.0.0.1:9");
        assert_eq!(config.fetch.retry.max_attempts, 4);
        assert!(config.fetch.retry.delay.is_zero());
        assert_eq!(config.symbols.suffix, ".BO");
        assert_eq!(config.output_dir.to_str(), Some("/tmp/rsqm-out"));
    }

    #[test]
    fn load_config_rejects_short_calendar_window() {
        let file = write_temp_ini("[screener]\nlookback_days = 100\n");
        let err = cli::load_config(Some(file.path())).unwrap_err();
        assert!(matches!(err, ScreenerError::ConfigInvalid { ref key, .. } if key == "lookback_days"));
    }

    #[test]
    fn load_config_rejects_malformed_lookbacks() {
        let file = write_temp_ini("[screener]\nlookbacks = 30D:abc\n");
        assert!(matches!(
            cli::load_config(Some(file.path())),
            Err(ScreenerError::ConfigInvalid { .. })
        ));
    }
}

mod universe_resolution {
    use super::*;

    #[test]
    fn index_list_drops_benchmark_and_duplicates() {
        let port = MockSymbolPort::with_symbols(&["A.NS", "B.NS", "A.NS", "BM"]);
        let config = fast_config(std::path::Path::new("."));

        let universe = cli::resolve_universe(&port, Scope::Nifty50, None, &config).unwrap();

        assert_eq!(universe.symbols, strings(&["A.NS", "B.NS"]));
        assert_eq!(universe.benchmark, "BM");
    }

    #[test]
    fn override_skips_symbol_list() {
        let port = MockSymbolPort::failing("should not be called");
        let config = fast_config(std::path::Path::new("."));

        let universe =
            cli::resolve_universe(&port, Scope::Nifty50, Some(" tcs, infy.ns "), &config).unwrap();

        assert_eq!(universe.symbols, strings(&["TCS.NS", "INFY.NS"]));
        assert_eq!(port.calls.get(), 0);
    }

    #[test]
    fn override_with_empty_token_is_invalid() {
        let port = MockSymbolPort::with_symbols(&[]);
        let config = fast_config(std::path::Path::new("."));

        let err = cli::resolve_universe(&port, Scope::Nifty50, Some("tcs,,infy"), &config)
            .unwrap_err();
        assert!(same(ExitCode::from(&err), ExitCode::from(2)));
    }

    #[test]
    fn empty_list_is_fatal() {
        let port = MockSymbolPort::with_symbols(&[]);
        let config = fast_config(std::path::Path::new("."));

        let err = cli::resolve_universe(&port, Scope::Nifty100, None, &config).unwrap_err();
        assert!(matches!(err, ScreenerError::EmptyUniverse { ref scope } if scope == "Nifty100"));
    }

    #[test]
    fn symbol_list_failure_propagates() {
        let port = MockSymbolPort::failing("archive unreachable");
        let config = fast_config(std::path::Path::new("."));

        let err = cli::resolve_universe(&port, Scope::Nifty50, None, &config).unwrap_err();
        assert!(matches!(err, ScreenerError::SymbolList { .. }));
    }
}

mod exit_codes {
    use super::*;

    #[test]
    fn unsupported_scope_exits_with_two() {
        assert!(same(run_args(&["rsqm", "scan", "42"]), ExitCode::from(2)));
        assert!(same(run_args(&["rsqm", "symbols", "75"]), ExitCode::from(2)));
    }

    #[test]
    fn missing_config_file_exits_with_two() {
        let code = run_args(&["rsqm", "scan", "50", "-c", "/nonexistent/rsqm.ini"]);
        assert!(same(code, ExitCode::from(2)));
    }

    #[test]
    fn zero_top_exits_with_two() {
        assert!(same(
            run_args(&["rsqm", "scan", "50", "--top", "0"]),
            ExitCode::from(2)
        ));
    }

    #[test]
    fn malformed_symbol_override_exits_with_two() {
        let code = run_args(&["rsqm", "scan", "50", "--symbols", "A,,B"]);
        assert!(same(code, ExitCode::from(2)));
    }
}

mod pipeline {
    use super::*;

    fn universe() -> Universe {
        Universe::new(strings(&["A", "B", "C"]), BENCHMARK)
    }

    fn port() -> MockPricePort {
        let dates = trading_days(200);
        let bm = compounding(&dates, 100.0, 0.001);
        MockPricePort::new()
            .with_bulk_error("down")
            .with_history("A", compounding(&dates, 10.0, 0.002))
            .with_history("B", compounding(&dates, 20.0, 0.0012))
            .with_history("C", compounding(&dates, 30.0, 0.0002))
            .with_history(BENCHMARK, bm)
    }

    #[test]
    fn writes_csv_xlsx_and_html_reports() {
        let dir = tempfile::tempdir().unwrap();
        let config = fast_config(dir.path());
        let csv = CsvReportAdapter::new();
        let xlsx = XlsxReportAdapter::new();
        let html = HtmlReportAdapter::new();
        let reports: [&dyn ReportPort; 3] = [&csv, &xlsx, &html];

        let outcome = cli::run_scan_pipeline(
            &port(),
            &SilentProgress,
            &config,
            Scope::Nifty50,
            &universe(),
            &reports,
        )
        .unwrap();

        let csv_path = dir.path().join("RSQM_watchlist_Nifty50.csv");
        let xlsx_path = dir.path().join("RSQM_watchlist_Nifty50.xlsx");
        let html_path = dir.path().join("RSQM_watchlist_Nifty50.html");
        assert_eq!(
            outcome.written,
            vec![csv_path.clone(), xlsx_path.clone(), html_path.clone()]
        );
        assert!(std::fs::read(&xlsx_path).unwrap().starts_with(b"PK"));

        let csv_text = std::fs::read_to_string(&csv_path).unwrap();
        let lines: Vec<&str> = csv_text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("A,"));
        assert!(lines[1].ends_with(",1"));
        assert!(lines[3].starts_with("C,"));

        let html_text = std::fs::read_to_string(&html_path).unwrap();
        assert!(html_text.contains("RSQM Watchlist - Nifty 50"));
        assert!(html_text.contains("sortTable(7);"));
    }

    #[test]
    fn top_n_limits_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = fast_config(dir.path());
        config.rank.top_n = 2;

        let outcome = cli::run_scan_pipeline(
            &port(),
            &SilentProgress,
            &config,
            Scope::Nifty50,
            &universe(),
            &[],
        )
        .unwrap();

        let order: Vec<&str> = outcome.ranked.rows.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(order, vec!["A", "B"]);
        assert!(outcome.written.is_empty());
    }

    #[test]
    fn no_data_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = fast_config(dir.path());
        let port = MockPricePort::new()
            .with_bulk_error("down")
            .always_failing("A")
            .always_failing("B")
            .always_failing("C")
            .always_failing(BENCHMARK);
        let csv = CsvReportAdapter::new();
        let reports: [&dyn ReportPort; 1] = [&csv];

        let outcome = cli::run_scan_pipeline(
            &port,
            &SilentProgress,
            &config,
            Scope::Nifty50,
            &universe(),
            &reports,
        )
        .unwrap();

        assert!(outcome.ranked.is_empty());
        assert!(outcome.written.is_empty());
        assert!(!dir.path().join("RSQM_watchlist_Nifty50.csv").exists());
    }
}
