//! Header/data boundary detection.
//!
//! Rows: the header block is every row before the first row that owns a data
//! cell. Columns: the row-label block ends at the last leading header cell of
//! the first data row, optionally widened by one data cell that acts as a
//! sublabel rather than content.

use once_cell::sync::Lazy;
use regex::Regex;

use tablefold_core::structure::Boundaries;

use crate::matrix::{CellInfo, CellMatrix};

static NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\d\s.,:;%+\-−–/()$€£¥]*$").unwrap());

/// How the first data cell after the row labels is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryCellKind {
    /// The cell is data; the boundary sits at it.
    Content,
    /// The cell labels its row; the boundary moves past it.
    Sublabel,
}

/// Detect both boundaries of the matrix.
pub fn detect_boundaries(matrix: &CellMatrix, snap_distance: usize) -> Boundaries {
    let header_end = detect_header_end(matrix);
    if header_end >= matrix.row_count() {
        return Boundaries::new(header_end, 0);
    }
    let data_column_start = detect_data_column_start(matrix, header_end, snap_distance);
    log::debug!(
        "Boundaries: header_end={} data_column_start={}",
        header_end,
        data_column_start
    );
    Boundaries::new(header_end, data_column_start)
}

/// First row owning a data cell; the row count when there is none.
pub fn detect_header_end(matrix: &CellMatrix) -> usize {
    (0..matrix.row_count())
        .find(|&r| matrix.row_has_own_data_cell(r))
        .unwrap_or(matrix.row_count())
}

/// First data column, judged on the first data row.
pub fn detect_data_column_start(matrix: &CellMatrix, header_end: usize, snap_distance: usize) -> usize {
    let row = header_end;
    let max_cols = matrix.max_cols();

    let leading_headers = (0..max_cols)
        .take_while(|&p| matrix.get(row, p).is_some_and(|c| c.is_header))
        .count();
    if leading_headers == 0 {
        return 0;
    }
    let last_th = leading_headers - 1;

    let Some(first_td) =
        (last_th + 1..max_cols).find(|&p| matrix.get(row, p).is_some_and(|c| !c.is_header))
    else {
        return leading_headers;
    };

    let raw = match classify_boundary_cell(matrix, header_end, row, last_th, first_td) {
        BoundaryCellKind::Content => first_td,
        BoundaryCellKind::Sublabel => match matrix.get(row, first_td) {
            Some(cell) => cell.col_end() + 1,
            None => first_td,
        },
    };
    snap_to_header_boundary(matrix, header_end, raw, last_th + 1, snap_distance)
}

/// Decide whether the data cell at `candidate` is content or a sublabel.
///
/// Only a cell right after the last leading header can be a sublabel, and
/// only when no distinct column header sits above it: either the header over
/// the row labels also spans the candidate, or the header over it is empty.
pub fn classify_boundary_cell(
    matrix: &CellMatrix,
    header_end: usize,
    row: usize,
    last_th: usize,
    candidate: usize,
) -> BoundaryCellKind {
    if header_end == 0 || candidate != last_th + 1 {
        return BoundaryCellKind::Content;
    }
    let Some(cell) = matrix.get(row, candidate) else {
        return BoundaryCellKind::Content;
    };
    // A sublabel has to leave at least one data column behind it.
    if cell.col_end() + 1 >= matrix.max_cols() {
        return BoundaryCellKind::Content;
    }

    let over_labels = header_context(matrix, header_end, last_th);
    let over_candidate = header_context(matrix, header_end, candidate);
    match (over_labels, over_candidate) {
        (Some(labels), Some(column)) if labels.id == column.id => BoundaryCellKind::Sublabel,
        (Some(_), Some(column)) if column.is_blank() => BoundaryCellKind::Sublabel,
        (Some(_), None) => BoundaryCellKind::Sublabel,
        _ => BoundaryCellKind::Content,
    }
}

/// Header cell of the deepest header row covering `col`.
fn header_context(matrix: &CellMatrix, header_end: usize, col: usize) -> Option<&CellInfo> {
    (0..header_end).rev().find_map(|r| matrix.get(r, col))
}

/// Move `dcs` onto a cell boundary of the leaf header row when it is within
/// `snap_distance` of one. Ties go to the smaller position; the result never
/// drops below `min`. A forward move may not pass over a non-blank data cell
/// of the first data row, which would turn a value into label text.
fn snap_to_header_boundary(
    matrix: &CellMatrix,
    header_end: usize,
    dcs: usize,
    min: usize,
    snap_distance: usize,
) -> usize {
    if header_end == 0 || snap_distance == 0 || dcs >= matrix.max_cols() {
        return dcs;
    }
    let leaf_row = header_end - 1;
    let is_boundary = |p: usize| p == 0 || matrix.id_at(leaf_row, p) != matrix.id_at(leaf_row, p - 1);
    if is_boundary(dcs) {
        return dcs;
    }

    let crosses_data = |p: usize| {
        (dcs..p).any(|q| {
            matrix
                .get(header_end, q)
                .is_some_and(|c| !c.is_header && !c.is_blank())
        })
    };

    let lower = dcs.saturating_sub(snap_distance).max(min);
    let upper = (dcs + snap_distance).min(matrix.max_cols() - 1);
    let snapped = (lower..=upper)
        .filter(|&p| is_boundary(p) && !crosses_data(p))
        .min_by_key(|&p| (p.abs_diff(dcs), p))
        .unwrap_or(dcs);
    if snapped != dcs {
        log::debug!("Data column start snapped from {} to {}", dcs, snapped);
    }
    snapped
}

/// Treat the first column as row labels when a table has no header cells in
/// its data rows but the first column plainly names each row.
///
/// Every data row needs a non-empty, single-column data cell at position 0,
/// and at least one of them must read as a label rather than a number.
pub fn promote_label_column(matrix: &CellMatrix, boundaries: &Boundaries) -> Option<Boundaries> {
    if boundaries.data_column_start != 0 || matrix.max_cols() < 2 {
        return None;
    }
    let rows = boundaries.data_start_index..matrix.row_count();
    if rows.is_empty() {
        return None;
    }

    let mut label_like = false;
    for r in rows {
        let cell = matrix.get(r, 0)?;
        if cell.is_header || cell.is_blank() || cell.col_span != 1 {
            return None;
        }
        if cell.origin_row == r && !NUMERIC.is_match(&cell.text) {
            label_like = true;
        }
    }
    label_like.then(|| Boundaries::new(boundaries.header_end_index, 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tablefold_core::table::{SourceCell, SourceRow};

    fn th(t: &str) -> SourceCell {
        SourceCell::header(t)
    }

    fn td(t: &str) -> SourceCell {
        SourceCell::data(t)
    }

    fn matrix(rows: Vec<Vec<SourceCell>>) -> CellMatrix {
        let rows: Vec<SourceRow> = rows.into_iter().map(SourceRow::new).collect();
        CellMatrix::build(&rows)
    }

    #[test]
    fn test_simple_row_labels() {
        let m = matrix(vec![
            vec![th("Item"), th("Min"), th("Max")],
            vec![th("Power"), td("10"), td("20")],
            vec![th("Torque"), td("5"), td("9")],
        ]);
        let b = detect_boundaries(&m, 2);
        assert_eq!(b, Boundaries::new(1, 1));
    }

    #[test]
    fn test_no_header_cells() {
        let m = matrix(vec![vec![td("1"), td("2")], vec![td("3"), td("4")]]);
        assert_eq!(detect_boundaries(&m, 2), Boundaries::new(0, 0));
    }

    #[test]
    fn test_header_only_table() {
        let m = matrix(vec![vec![th("A"), th("B")], vec![th("C"), th("D")]]);
        assert_eq!(detect_boundaries(&m, 2), Boundaries::new(2, 0));
    }

    #[test]
    fn test_multi_row_header() {
        let m = matrix(vec![
            vec![th("Item").with_row_span(2), th("Values").with_col_span(2)],
            vec![th("Min"), th("Max")],
            vec![th("Power"), td("10"), td("20")],
        ]);
        assert_eq!(detect_boundaries(&m, 2), Boundaries::new(2, 1));
    }

    #[test]
    fn test_sublabel_under_shared_header() {
        let m = matrix(vec![
            vec![th("Item").with_col_span(2), th("Min"), th("Max")],
            vec![th("Engine").with_row_span(2), td("Power"), td("10"), td("20")],
            vec![td("Torque"), td("5"), td("9")],
        ]);
        assert_eq!(
            classify_boundary_cell(&m, 1, 1, 0, 1),
            BoundaryCellKind::Sublabel
        );
        assert_eq!(detect_boundaries(&m, 2).data_column_start, 2);
    }

    #[test]
    fn test_sublabel_under_empty_header() {
        let m = matrix(vec![
            vec![th("Item"), th(""), th("Value")],
            vec![th("Engine"), td("Power"), td("10")],
        ]);
        assert_eq!(detect_boundaries(&m, 2).data_column_start, 2);
    }

    #[test]
    fn test_distinct_header_means_content() {
        let m = matrix(vec![
            vec![th("Item"), th("Min"), th("Max")],
            vec![th("Engine"), td("Power"), td("20")],
        ]);
        assert_eq!(
            classify_boundary_cell(&m, 1, 1, 0, 1),
            BoundaryCellKind::Content
        );
        assert_eq!(detect_boundaries(&m, 2).data_column_start, 1);
    }

    #[test]
    fn test_sublabel_must_leave_data_columns() {
        let m = matrix(vec![
            vec![th("Item").with_col_span(2)],
            vec![th("Engine"), td("Power")],
        ]);
        assert_eq!(
            classify_boundary_cell(&m, 1, 1, 0, 1),
            BoundaryCellKind::Content
        );
    }

    #[test]
    fn test_snap_tie_prefers_lower_boundary() {
        // The blank header spans the sublabel and the first data column.
        let m = matrix(vec![
            vec![th("Item"), th("").with_col_span(2), th("V")],
            vec![th("A"), td("a1"), td("1"), td("2")],
        ]);
        assert_eq!(detect_boundaries(&m, 2).data_column_start, 1);
        assert_eq!(detect_boundaries(&m, 0).data_column_start, 2);
    }

    #[test]
    fn test_snap_never_swallows_a_value() {
        let m = matrix(vec![
            vec![th("Item").with_col_span(3), th("V"), th("W")],
            vec![th("A"), td("a1"), td("1"), td("2"), td("3")],
        ]);
        assert_eq!(detect_boundaries(&m, 2).data_column_start, 2);

        // A blank cell may be passed over.
        let m = matrix(vec![
            vec![th("Item").with_col_span(3), th("V"), th("W")],
            vec![th("A"), td("a1"), td(""), td("2"), td("3")],
        ]);
        assert_eq!(detect_boundaries(&m, 2).data_column_start, 3);
    }

    #[test]
    fn test_trailing_header_ignored() {
        let m = matrix(vec![
            vec![th("Item"), th("Value"), th("Note")],
            vec![th("Power"), td("10"), th("peak")],
        ]);
        assert_eq!(detect_boundaries(&m, 2).data_column_start, 1);
    }

    #[test]
    fn test_promote_label_column() {
        let m = matrix(vec![
            vec![th("Name"), th("Age")],
            vec![td("Alice"), td("30")],
            vec![td("Bob"), td("25")],
        ]);
        let b = detect_boundaries(&m, 2);
        assert_eq!(b, Boundaries::new(1, 0));
        assert_eq!(promote_label_column(&m, &b), Some(Boundaries::new(1, 1)));
    }

    #[test]
    fn test_numeric_first_column_not_promoted() {
        let m = matrix(vec![
            vec![td("1"), td("Alice")],
            vec![td("2"), td("Bob")],
        ]);
        let b = detect_boundaries(&m, 2);
        assert_eq!(promote_label_column(&m, &b), None);
    }

    #[test]
    fn test_blank_first_cell_not_promoted() {
        let m = matrix(vec![
            vec![td("Alice"), td("30")],
            vec![td(""), td("25")],
        ]);
        let b = detect_boundaries(&m, 2);
        assert_eq!(promote_label_column(&m, &b), None);
    }
}
