//! Price series, provider frames and the date-aligned price table.

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A field reported by the price provider for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
    AdjClose,
    Volume,
}

/// One symbol's date-ordered closing prices.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub symbol: String,
    pub points: Vec<(NaiveDate, f64)>,
}

impl PriceSeries {
    /// Builds a series sorted by date. Later duplicates of a date win.
    pub fn new(symbol: impl Into<String>, points: Vec<(NaiveDate, f64)>) -> Self {
        let by_date: BTreeMap<NaiveDate, f64> = points.into_iter().collect();
        Self {
            symbol: symbol.into(),
            points: by_date.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// A single (symbol, field) column as returned by the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameColumn {
    pub symbol: String,
    pub field: PriceField,
    pub points: Vec<(NaiveDate, Option<f64>)>,
}

/// Raw provider answer: columns keyed by symbol and field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceFrame {
    pub columns: Vec<FrameColumn>,
}

impl PriceFrame {
    pub fn new(columns: Vec<FrameColumn>) -> Self {
        Self { columns }
    }

    /// True when no column carries a single observation.
    pub fn is_empty(&self) -> bool {
        self.columns
            .iter()
            .all(|c| c.points.iter().all(|(_, v)| v.is_none()))
    }

    pub fn has_field(&self, field: PriceField) -> bool {
        self.columns.iter().any(|c| c.field == field)
    }

    /// Adjusted close when the provider reports it, plain close otherwise.
    pub fn close_field(&self) -> Option<PriceField> {
        if self.has_field(PriceField::AdjClose) {
            Some(PriceField::AdjClose)
        } else if self.has_field(PriceField::Close) {
            Some(PriceField::Close)
        } else {
            None
        }
    }

    /// Outer-joins every column of `field` into a price table.
    pub fn select(&self, field: PriceField) -> PriceTable {
        let series = self
            .columns
            .iter()
            .filter(|c| c.field == field)
            .map(|c| {
                PriceSeries::new(
                    c.symbol.clone(),
                    c.points
                        .iter()
                        .filter_map(|&(date, value)| value.map(|v| (date, v)))
                        .collect(),
                )
            })
            .collect();
        PriceTable::from_series(series)
    }

    /// The close series of one symbol, picking the field the same way as [`Self::close_field`].
    pub fn close_series(&self, symbol: &str) -> Option<PriceSeries> {
        let field = self.close_field()?;
        let column = self
            .columns
            .iter()
            .find(|c| c.field == field && c.symbol == symbol)?;
        Some(PriceSeries::new(
            symbol,
            column
                .points
                .iter()
                .filter_map(|&(date, value)| value.map(|v| (date, v)))
                .collect(),
        ))
    }
}

/// Close prices of many symbols on one shared date axis.
///
/// Columns keep insertion order; a symbol with no price on a date holds `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    symbols: Vec<String>,
    columns: HashMap<String, Vec<Option<f64>>>,
}

impl PriceTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Outer-joins the series on date. A repeated symbol keeps its first series.
    pub fn from_series(series: Vec<PriceSeries>) -> Self {
        let dates: Vec<NaiveDate> = series
            .iter()
            .flat_map(|s| s.points.iter().map(|&(d, _)| d))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let position: HashMap<NaiveDate, usize> =
            dates.iter().enumerate().map(|(i, &d)| (d, i)).collect();

        let mut symbols = Vec::with_capacity(series.len());
        let mut columns = HashMap::with_capacity(series.len());
        for s in series {
            if columns.contains_key(&s.symbol) {
                continue;
            }
            let mut column = vec![None; dates.len()];
            for (date, value) in s.points {
                column[position[&date]] = Some(value);
            }
            symbols.push(s.symbol.clone());
            columns.insert(s.symbol, column);
        }

        Self {
            dates,
            symbols,
            columns,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.columns.contains_key(symbol)
    }

    pub fn column(&self, symbol: &str) -> Option<&[Option<f64>]> {
        self.columns.get(symbol).map(Vec::as_slice)
    }

    /// True when the column exists and holds at least one price.
    pub fn has_values(&self, symbol: &str) -> bool {
        self.column(symbol)
            .is_some_and(|c| c.iter().any(Option::is_some))
    }

    /// The symbol's column on the shared date axis with gaps carried forward
    /// from the last known price. Rows before the first price stay `None`.
    pub fn forward_filled(&self, symbol: &str) -> Vec<Option<f64>> {
        let mut last = None;
        self.column(symbol)
            .map(|c| {
                c.iter()
                    .map(|value| {
                        if value.is_some() {
                            last = *value;
                        }
                        last
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Keeps only the listed symbols that are present, in the order given.
    /// The date axis is left untouched.
    pub fn restrict(&self, keep: &[String]) -> PriceTable {
        let mut symbols = Vec::new();
        let mut columns = HashMap::new();
        for symbol in keep {
            if columns.contains_key(symbol) {
                continue;
            }
            if let Some(column) = self.columns.get(symbol) {
                symbols.push(symbol.clone());
                columns.insert(symbol.clone(), column.clone());
            }
        }
        PriceTable {
            dates: self.dates.clone(),
            symbols,
            columns,
        }
    }
}
