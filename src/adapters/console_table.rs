//! Plain-terminal rendering of the ranked watchlist.

use crate::domain::ranking::{RankedTable, round2};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{CellAlignment, ContentArrangement, Table};

pub fn render_table(table: &RankedTable) -> String {
    let mut out = Table::new();
    out.load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(table.columns());

    for row in &table.rows {
        let values = table.values(row);
        let rank_index = values.len() - 1;
        let mut cells = vec![row.symbol.clone()];
        cells.extend(values.into_iter().enumerate().map(|(i, value)| match value {
            Some(v) if i == rank_index => format!("{}", v as usize),
            Some(v) => format!("{:.2}", round2(v)),
            None => "-".to_string(),
        }));
        out.add_row(cells);
    }

    for index in 1..table.columns().len() {
        if let Some(column) = out.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
    out.to_string()
}
