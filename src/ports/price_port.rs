//! Historical price provider port.

use crate::domain::error::ScreenerError;
use crate::domain::price::PriceFrame;
use chrono::NaiveDate;

pub trait PricePort {
    /// One request covering every symbol, grouped by symbol then field.
    fn fetch_bulk(
        &self,
        symbols: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceFrame, ScreenerError>;

    /// Daily history of a single symbol for `[start_date, end_date)`.
    fn fetch_history(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceFrame, ScreenerError>;
}
