//! Index constituent lists: a local CSV copy first, the exchange archive second.

use crate::domain::config::SymbolsConfig;
use crate::domain::error::ScreenerError;
use crate::domain::universe::{qualify, Scope};
use crate::ports::symbol_port::SymbolPort;
use reqwest::blocking::Client;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

const SYMBOL_HEADER: &str = "Symbol";

/// Reads the `Symbol` column of a constituent list and appends `suffix`.
/// Blank entries are skipped.
pub fn parse_symbol_csv(content: &str, suffix: &str) -> Result<Vec<String>, ScreenerError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = rdr.headers().map_err(|e| ScreenerError::SymbolList {
        reason: format!("CSV header error: {e}"),
    })?;
    let index = headers
        .iter()
        .position(|h| h == SYMBOL_HEADER)
        .ok_or_else(|| ScreenerError::SymbolList {
            reason: format!("missing '{SYMBOL_HEADER}' column"),
        })?;

    let mut symbols = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| ScreenerError::SymbolList {
            reason: format!("CSV parse error: {e}"),
        })?;
        match record.get(index) {
            Some(symbol) if !symbol.is_empty() => symbols.push(qualify(symbol, suffix)),
            _ => continue,
        }
    }
    Ok(symbols)
}

pub struct SymbolListAdapter {
    local_dir: PathBuf,
    remote_url_template: String,
    suffix: String,
    client: Client,
}

impl SymbolListAdapter {
    pub fn new(config: &SymbolsConfig, timeout: Duration) -> Result<Self, ScreenerError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) rsqm")
            .build()
            .map_err(|e| ScreenerError::SymbolList {
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            local_dir: config.local_dir.clone(),
            remote_url_template: config.remote_url_template.clone(),
            suffix: config.suffix.clone(),
            client,
        })
    }

    pub fn local_path(&self, scope: Scope) -> PathBuf {
        self.local_dir.join(scope.list_file_name())
    }

    pub fn remote_url(&self, scope: Scope) -> String {
        self.remote_url_template
            .replace("{scope}", &scope.size().to_string())
    }

    fn load_local(&self, scope: Scope) -> Option<Result<Vec<String>, ScreenerError>> {
        let path = self.local_path(scope);
        if !path.exists() {
            return None;
        }
        tracing::info!(path = %path.display(), "using local copy of {scope} list");
        Some(
            fs::read_to_string(&path)
                .map_err(ScreenerError::from)
                .and_then(|content| parse_symbol_csv(&content, &self.suffix)),
        )
    }

    fn load_remote(&self, scope: Scope) -> Result<Vec<String>, ScreenerError> {
        let url = self.remote_url(scope);
        let response = self
            .client
            .get(&url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| ScreenerError::SymbolList {
                reason: format!("failed to fetch {url}: {e}"),
            })?;
        let content = response.text().map_err(|e| ScreenerError::SymbolList {
            reason: format!("failed to read {url}: {e}"),
        })?;
        let symbols = parse_symbol_csv(&content, &self.suffix)?;
        tracing::info!(%url, count = symbols.len(), "using online {scope} list");
        Ok(symbols)
    }
}

impl SymbolPort for SymbolListAdapter {
    fn load(&self, scope: Scope) -> Result<Vec<String>, ScreenerError> {
        match self.load_local(scope) {
            Some(Ok(symbols)) => return Ok(symbols),
            Some(Err(e)) => tracing::warn!(error = %e, "error reading local symbol list"),
            None => {}
        }
        self.load_remote(scope)
    }
}
