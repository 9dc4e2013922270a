//! Index scopes and the symbol universe.
//!
//! A universe is the ordered list of symbols to score plus the benchmark they
//! are measured against. The benchmark never appears among the scored symbols.

use crate::domain::error::ScreenerError;
use std::collections::HashSet;
use std::fmt;

/// Supported Nifty index sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Nifty50,
    Nifty100,
    Nifty200,
    Nifty500,
}

impl Scope {
    pub const ALL: [Scope; 4] = [
        Scope::Nifty50,
        Scope::Nifty100,
        Scope::Nifty200,
        Scope::Nifty500,
    ];

    pub fn size(self) -> u32 {
        match self {
            Scope::Nifty50 => 50,
            Scope::Nifty100 => 100,
            Scope::Nifty200 => 200,
            Scope::Nifty500 => 500,
        }
    }

    /// File name the exchange publishes the constituents under.
    pub fn list_file_name(self) -> String {
        format!("ind_nifty{}list.csv", self.size())
    }
}

impl TryFrom<u32> for Scope {
    type Error = ScreenerError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Scope::ALL
            .into_iter()
            .find(|s| s.size() == value)
            .ok_or(ScreenerError::InvalidScope(value))
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nifty{}", self.size())
    }
}

#[derive(Debug, Clone)]
pub struct Universe {
    pub symbols: Vec<String>,
    pub benchmark: String,
}

impl Universe {
    /// Drops duplicates and the benchmark itself, keeping first-seen order.
    pub fn new(symbols: Vec<String>, benchmark: impl Into<String>) -> Self {
        let benchmark = benchmark.into();
        let mut seen = HashSet::new();
        let symbols = symbols
            .into_iter()
            .filter(|s| *s != benchmark && seen.insert(s.clone()))
            .collect();
        Self { symbols, benchmark }
    }

    pub fn count(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Scored symbols followed by the benchmark.
    pub fn with_benchmark(&self) -> Vec<String> {
        let mut all = self.symbols.clone();
        all.push(self.benchmark.clone());
        all
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),
}

/// Appends the exchange suffix unless the symbol already carries one.
pub fn qualify(symbol: &str, suffix: &str) -> String {
    if suffix.is_empty() || symbol.ends_with(suffix) || symbol.starts_with('^') {
        symbol.to_string()
    } else {
        format!("{symbol}{suffix}")
    }
}

/// Parses a comma separated symbol override such as `tcs, infy`.
pub fn parse_symbols(input: &str, suffix: &str) -> Result<Vec<String>, UniverseError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let symbol = qualify(&trimmed.to_uppercase(), &suffix.to_uppercase());
        if !seen.insert(symbol.clone()) {
            return Err(UniverseError::DuplicateSymbol(symbol));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_from_supported_sizes() {
        assert_eq!(Scope::try_from(50).unwrap(), Scope::Nifty50);
        assert_eq!(Scope::try_from(500).unwrap(), Scope::Nifty500);
        assert!(matches!(
            Scope::try_from(75),
            Err(ScreenerError::InvalidScope(75))
        ));
    }

    #[test]
    fn scope_display_and_file_name() {
        assert_eq!(Scope::Nifty100.to_string(), "Nifty100");
        assert_eq!(Scope::Nifty200.list_file_name(), "ind_nifty200list.csv");
    }

    #[test]
    fn universe_excludes_benchmark_and_duplicates() {
        let universe = Universe::new(
            vec![
                "TCS.NS".into(),
                "^NSEI".into(),
                "INFY.NS".into(),
                "TCS.NS".into(),
            ],
            "^NSEI",
        );
        assert_eq!(universe.symbols, vec!["TCS.NS", "INFY.NS"]);
        assert_eq!(universe.count(), 2);
        assert_eq!(universe.with_benchmark(), vec!["TCS.NS", "INFY.NS", "^NSEI"]);
    }

    #[test]
    fn qualify_appends_suffix_once() {
        assert_eq!(qualify("TCS", ".NS"), "TCS.NS");
        assert_eq!(qualify("TCS.NS", ".NS"), "TCS.NS");
        assert_eq!(qualify("^NSEI", ".NS"), "^NSEI");
        assert_eq!(qualify("AAPL", ""), "AAPL");
    }

    #[test]
    fn parse_symbols_normalizes() {
        let result = parse_symbols(" tcs , INFY.ns,reliance ", ".NS").unwrap();
        assert_eq!(result, vec!["TCS.NS", "INFY.NS", "RELIANCE.NS"]);
    }

    #[test]
    fn parse_symbols_empty_token() {
        assert!(matches!(
            parse_symbols("TCS,,INFY", ".NS"),
            Err(UniverseError::EmptyToken)
        ));
    }

    #[test]
    fn parse_symbols_duplicate() {
        let result = parse_symbols("TCS,INFY,tcs.NS", ".NS");
        assert!(matches!(result, Err(UniverseError::DuplicateSymbol(s)) if s == "TCS.NS"));
    }
}
