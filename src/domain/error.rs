//! Domain error types.

/// Top-level error type for rsqm.
#[derive(Debug, thiserror::Error)]
pub enum ScreenerError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("unsupported scope {0} (expected one of 50, 100, 200, 500)")]
    InvalidScope(u32),

    #[error("no symbols available for {scope}")]
    EmptyUniverse { scope: String },

    #[error("invalid symbol list: {reason}")]
    SymbolList { reason: String },

    #[error("price provider error: {reason}")]
    Provider { reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&ScreenerError> for std::process::ExitCode {
    fn from(err: &ScreenerError) -> Self {
        let code: u8 = match err {
            ScreenerError::Io(_) => 1,
            ScreenerError::ConfigParse { .. }
            | ScreenerError::ConfigInvalid { .. }
            | ScreenerError::InvalidScope(_)
            | ScreenerError::EmptyUniverse { .. } => 2,
            ScreenerError::SymbolList { .. }
            | ScreenerError::Provider { .. }
            | ScreenerError::NoData { .. } => 3,
            ScreenerError::Report { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
