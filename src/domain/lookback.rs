//! Named return horizons.

use std::collections::HashSet;
use std::fmt;

/// A named horizon measured in trading days, e.g. `30D` = 30.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Lookback {
    pub label: String,
    pub days: usize,
}

impl Lookback {
    pub fn new(label: impl Into<String>, days: usize) -> Self {
        Self {
            label: label.into(),
            days,
        }
    }

    /// 30D, 90D and 180D.
    pub fn defaults() -> Vec<Lookback> {
        vec![
            Lookback::new("30D", 30),
            Lookback::new("90D", 90),
            Lookback::new("180D", 180),
        ]
    }

    pub fn abs_return_column(&self) -> String {
        format!("AbsRet_{}", self.label)
    }

    pub fn rel_strength_column(&self) -> String {
        format!("RelStr_{}", self.label)
    }
}

impl fmt::Display for Lookback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} days)", self.label, self.days)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LookbackError {
    #[error("empty lookback list")]
    Empty,

    #[error("invalid lookback '{0}' (expected LABEL:DAYS or DAYS)")]
    Malformed(String),

    #[error("lookback '{0}' must span at least one day")]
    ZeroDays(String),

    #[error("duplicate lookback label: {0}")]
    DuplicateLabel(String),
}

/// Parses `30D:30, 90D:90`. A bare number `45` becomes `45D:45`.
pub fn parse_lookbacks(input: &str) -> Result<Vec<Lookback>, LookbackError> {
    let mut lookbacks = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            continue;
        }

        let lookback = match trimmed.split_once(':') {
            Some((label, days)) => {
                let label = label.trim();
                let days: usize = days
                    .trim()
                    .parse()
                    .map_err(|_| LookbackError::Malformed(trimmed.to_string()))?;
                if label.is_empty() {
                    return Err(LookbackError::Malformed(trimmed.to_string()));
                }
                Lookback::new(label, days)
            }
            None => {
                let days: usize = trimmed
                    .parse()
                    .map_err(|_| LookbackError::Malformed(trimmed.to_string()))?;
                Lookback::new(format!("{days}D"), days)
            }
        };

        if lookback.days == 0 {
            return Err(LookbackError::ZeroDays(lookback.label));
        }
        if !seen.insert(lookback.label.clone()) {
            return Err(LookbackError::DuplicateLabel(lookback.label));
        }
        lookbacks.push(lookback);
    }

    if lookbacks.is_empty() {
        return Err(LookbackError::Empty);
    }
    Ok(lookbacks)
}
