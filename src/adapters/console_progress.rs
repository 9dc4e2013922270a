//! Terminal progress bar for the per-symbol fallback fetch.

use crate::ports::progress_port::ProgressPort;
use indicatif::{ProgressBar, ProgressStyle};

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}";

pub struct ConsoleProgress {
    bar: ProgressBar,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        let style = ProgressStyle::default_bar()
            .template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        let bar = ProgressBar::new(0);
        bar.set_style(style);
        Self { bar }
    }

    /// Counts progress without drawing anything.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn length(&self) -> Option<u64> {
        self.bar.length()
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressPort for ConsoleProgress {
    fn begin(&self, total: usize) {
        self.bar.reset();
        self.bar.set_length(total as u64);
        self.bar.set_message("fetching");
    }

    fn advance(&self, symbol: &str) {
        self.bar.inc(1);
        self.bar.set_message(symbol.to_string());
    }

    fn failed(&self, symbol: &str, reason: &str) {
        self.bar.println(format!("  {symbol}: {reason}"));
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
