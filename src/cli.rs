//! CLI definition and dispatch.

use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::console_progress::ConsoleProgress;
use crate::adapters::console_table::render_table;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::html_report_adapter::HtmlReportAdapter;
use crate::adapters::symbol_list_adapter::SymbolListAdapter;
use crate::adapters::xlsx_report_adapter::XlsxReportAdapter;
use crate::adapters::yahoo_adapter::YahooAdapter;
use crate::domain::config::{build_screener_config, ScreenerConfig};
use crate::domain::error::ScreenerError;
use crate::domain::fetcher::SeriesFetcher;
use crate::domain::ranking::{rank, RankedTable};
use crate::domain::universe::{parse_symbols, Scope, Universe};
use crate::logging::{effective_level, init_logging};
use crate::ports::price_port::PricePort;
use crate::ports::progress_port::ProgressPort;
use crate::ports::report_port::{ReportContext, ReportPort};
use crate::ports::symbol_port::SymbolPort;

#[derive(Parser, Debug)]
#[command(
    name = "rsqm",
    version,
    about = "Relative strength screener for Nifty index constituents"
)]
pub struct Cli {
    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rank an index against its benchmark and write the watchlist
    Scan {
        /// Index size: 50, 100, 200 or 500
        scope: u32,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Comma separated symbols replacing the index list
        #[arg(long)]
        symbols: Option<String>,
        /// Number of leaders to keep
        #[arg(long)]
        top: Option<usize>,
        /// Print the table without writing CSV/XLSX/HTML files
        #[arg(long)]
        no_report: bool,
    },
    /// Print the symbols a scan would score
    Symbols {
        scope: u32,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Result of a completed scan.
#[derive(Debug)]
pub struct ScanOutcome {
    pub ranked: RankedTable,
    pub written: Vec<PathBuf>,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Scan {
            scope,
            config,
            output_dir,
            symbols,
            top,
            no_report,
        } => run_scan(
            scope,
            config.as_deref(),
            output_dir,
            symbols.as_deref(),
            top,
            no_report,
            cli.verbose,
        ),
        Command::Symbols { scope, config } => run_symbols(scope, config.as_deref(), cli.verbose),
    }
}

fn fail(err: &ScreenerError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(err)
}

/// Reads and validates the INI file; no path means built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<ScreenerConfig, ScreenerError> {
    let adapter = match path {
        Some(path) => FileConfigAdapter::from_file(path).map_err(|e| ScreenerError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        })?,
        None => FileConfigAdapter::empty(),
    };
    build_screener_config(&adapter)
}

/// Builds the universe from the `--symbols` override or the index list.
pub fn resolve_universe(
    symbol_port: &dyn SymbolPort,
    scope: Scope,
    symbols_override: Option<&str>,
    config: &ScreenerConfig,
) -> Result<Universe, ScreenerError> {
    let symbols = match symbols_override {
        Some(raw) => parse_symbols(raw, &config.symbols.suffix).map_err(|e| {
            ScreenerError::ConfigInvalid {
                section: "cli".into(),
                key: "symbols".into(),
                reason: e.to_string(),
            }
        })?,
        None => symbol_port.load(scope)?,
    };

    let universe = Universe::new(symbols, config.benchmark.clone());
    if universe.is_empty() {
        return Err(ScreenerError::EmptyUniverse {
            scope: scope.to_string(),
        });
    }
    tracing::info!(count = universe.count(), %scope, "loaded symbols");
    Ok(universe)
}

pub fn report_path(output_dir: &Path, scope: Scope, extension: &str) -> PathBuf {
    output_dir.join(format!("RSQM_watchlist_{scope}.{extension}"))
}

/// Fetch, rank and write every report. An empty ranking writes nothing.
pub fn run_scan_pipeline(
    prices: &dyn PricePort,
    progress: &dyn ProgressPort,
    config: &ScreenerConfig,
    scope: Scope,
    universe: &Universe,
    reports: &[&dyn ReportPort],
) -> Result<ScanOutcome, ScreenerError> {
    let fetcher = SeriesFetcher::new(prices, progress, config.fetch.retry);
    let table = fetcher.fetch(&universe.symbols, &universe.benchmark, config.lookback_days);

    if table.is_empty() {
        return Ok(ScanOutcome {
            ranked: RankedTable {
                lookbacks: config.rank.lookbacks.clone(),
                benchmark_present: false,
                rows: Vec::new(),
            },
            written: Vec::new(),
        });
    }

    let ranked = rank(&table, &universe.symbols, &universe.benchmark, &config.rank);
    if ranked.is_empty() {
        tracing::warn!("no symbol had enough history to score");
        return Ok(ScanOutcome {
            ranked,
            written: Vec::new(),
        });
    }

    let context = ReportContext {
        scope_label: format!("Nifty {}", scope.size()),
        benchmark: universe.benchmark.clone(),
    };
    let mut written = Vec::with_capacity(reports.len());
    for report in reports {
        let path = report_path(&config.output_dir, scope, report.extension());
        report.write(&ranked, &context, &path)?;
        tracing::info!(path = %path.display(), "report written");
        written.push(path);
    }

    Ok(ScanOutcome { ranked, written })
}

fn prepare(
    scope: u32,
    config_path: Option<&Path>,
    verbose: u8,
) -> Result<(Scope, ScreenerConfig), ExitCode> {
    let config = load_config(config_path).map_err(|e| fail(&e))?;
    init_logging(effective_level(&config.log_level, verbose));
    let scope = Scope::try_from(scope).map_err(|e| fail(&e))?;
    Ok((scope, config))
}

fn run_scan(
    scope: u32,
    config_path: Option<&Path>,
    output_dir: Option<PathBuf>,
    symbols_override: Option<&str>,
    top: Option<usize>,
    no_report: bool,
    verbose: u8,
) -> ExitCode {
    let (scope, mut config) = match prepare(scope, config_path, verbose) {
        Ok(prepared) => prepared,
        Err(code) => return code,
    };
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }
    if let Some(top) = top {
        if top == 0 {
            return fail(&ScreenerError::ConfigInvalid {
                section: "cli".into(),
                key: "top".into(),
                reason: "must be at least 1".into(),
            });
        }
        config.rank.top_n = top;
    }

    let symbol_adapter = match SymbolListAdapter::new(&config.symbols, config.fetch.timeout) {
        Ok(adapter) => adapter,
        Err(e) => return fail(&e),
    };
    let universe = match resolve_universe(&symbol_adapter, scope, symbols_override, &config) {
        Ok(universe) => universe,
        Err(e) => return fail(&e),
    };
    let prices = match YahooAdapter::from_config(&config.fetch) {
        Ok(adapter) => adapter,
        Err(e) => return fail(&e),
    };

    let csv = CsvReportAdapter::new();
    let xlsx = XlsxReportAdapter::new();
    let html = HtmlReportAdapter::new();
    let reports: Vec<&dyn ReportPort> = if no_report {
        Vec::new()
    } else {
        vec![&csv, &xlsx, &html]
    };

    let progress = ConsoleProgress::new();
    let outcome =
        match run_scan_pipeline(&prices, &progress, &config, scope, &universe, &reports) {
            Ok(outcome) => outcome,
            Err(e) => return fail(&e),
        };

    if outcome.ranked.is_empty() {
        eprintln!("No data available for {scope}; nothing to report.");
        return ExitCode::SUCCESS;
    }

    println!("\nTop {} by RS Score ({scope}):", outcome.ranked.len());
    println!("{}", render_table(&outcome.ranked));
    if !outcome.written.is_empty() {
        let names: Vec<String> = outcome
            .written
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        eprintln!("\nExported: {}", names.join(", "));
    }
    ExitCode::SUCCESS
}

fn run_symbols(scope: u32, config_path: Option<&Path>, verbose: u8) -> ExitCode {
    let (scope, config) = match prepare(scope, config_path, verbose) {
        Ok(prepared) => prepared,
        Err(code) => return code,
    };
    let result = SymbolListAdapter::new(&config.symbols, config.fetch.timeout)
        .and_then(|adapter| resolve_universe(&adapter, scope, None, &config));
    match result {
        Ok(universe) => {
            for symbol in &universe.symbols {
                println!("{symbol}");
            }
            eprintln!("{} symbols, benchmark {}", universe.count(), universe.benchmark);
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}
