//! Report generation port trait.

use crate::domain::error::ScreenerError;
use crate::domain::ranking::RankedTable;
use std::path::Path;

/// What a report is about, for titles and tooltips.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub scope_label: String,
    pub benchmark: String,
}

/// Port for writing the ranked watchlist.
pub trait ReportPort {
    /// File extension, without the dot.
    fn extension(&self) -> &'static str;

    fn write(
        &self,
        table: &RankedTable,
        context: &ReportContext,
        output_path: &Path,
    ) -> Result<(), ScreenerError>;
}
