//! Title-row detection.
//!
//! Some tables open with a single cell spanning (almost) the full width that
//! names the whole table. That row is not a column header; it is removed
//! from the analysed view and surfaced as the table title instead.

use tablefold_core::table::{SourceRow, SourceTable};

use crate::matrix::CellMatrix;

/// Rows the analysis runs on, with the title row (if any) taken out.
#[derive(Debug, Clone)]
pub struct AdjustedTableView {
    pub rows: Vec<SourceRow>,
    pub title: Option<String>,
    pub title_row_excluded: bool,
}

/// Text of the first row when it qualifies as a title row.
///
/// `ratio` is the fraction of the table width the lone cell has to span.
pub fn detect_title_row(table: &SourceTable, ratio: f64) -> Option<String> {
    if table.rows.len() < 2 {
        return None;
    }
    let first = &table.rows[0];
    if first.cells.len() != 1 {
        return None;
    }
    let cell = &first.cells[0];
    if cell.is_blank() || cell.row_span != 1 {
        return None;
    }

    let total_cols = CellMatrix::build(&table.rows).max_cols();
    if total_cols < 2 {
        return None;
    }
    if (cell.col_span as f64) < ratio * total_cols as f64 {
        return None;
    }
    Some(cell.text.clone())
}

/// Build the analysed view of `table`.
///
/// Without a title row the caption, when present, is used as the title.
pub fn adjust_table_view(table: &SourceTable, ratio: f64) -> AdjustedTableView {
    match detect_title_row(table, ratio) {
        Some(title) => {
            log::debug!("Title row detected: {}", title);
            AdjustedTableView {
                rows: table.rows[1..].to_vec(),
                title: Some(title),
                title_row_excluded: true,
            }
        }
        None => AdjustedTableView {
            rows: table.rows.clone(),
            title: table.caption.clone(),
            title_row_excluded: false,
        },
    }
}
