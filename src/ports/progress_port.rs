//! Operator progress reporting for long per-symbol loops.

pub trait ProgressPort {
    fn begin(&self, total: usize);
    fn advance(&self, symbol: &str);
    fn failed(&self, symbol: &str, reason: &str);
    fn finish(&self);
}

/// Reports nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl ProgressPort for SilentProgress {
    fn begin(&self, _total: usize) {}
    fn advance(&self, _symbol: &str) {}
    fn failed(&self, _symbol: &str, _reason: &str) {}
    fn finish(&self) {}
}
