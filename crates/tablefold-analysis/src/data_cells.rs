//! Data-cell assignment.
//!
//! Collects the data found in a sublabel's rows and columns. Cells starting
//! on those rows are taken directly (once per column they span); positions
//! covered by a cell reaching down from an earlier row are filled from it.
//! All values at one position are then consolidated, ordered by source row.

use std::collections::{BTreeMap, HashSet};
use std::ops::RangeInclusive;

use tablefold_core::structure::{Boundaries, CellId, CellValue, ColumnRange, DataEntry, Sublabel};

use crate::matrix::{CellInfo, CellMatrix};

/// Data entries of one sublabel, sorted by position then row.
pub fn assign_data_cells(matrix: &CellMatrix, boundaries: &Boundaries, sublabel: &Sublabel) -> Vec<DataEntry> {
    let max_cols = matrix.max_cols();
    let dcs = boundaries.data_column_start;
    if dcs >= max_cols || matrix.row_count() == 0 {
        return Vec::new();
    }

    let columns = sublabel
        .columns
        .unwrap_or_else(|| ColumnRange::new(dcs, max_cols - 1));
    let cols = ColumnRange::new(columns.start.max(dcs), columns.end.min(max_cols - 1));
    let rows = sublabel.row_index..=sublabel.row_end().min(matrix.row_count() - 1);
    if cols.is_empty() || rows.is_empty() {
        return Vec::new();
    }

    let mut entries = Vec::new();
    let mut direct: HashSet<(usize, usize)> = HashSet::new();
    for row in rows.clone() {
        for position in cols.start..=cols.end {
            let Some(cell) = matrix.get(row, position) else {
                continue;
            };
            if cell.origin_row == row {
                direct.insert((row, position));
                entries.push(entry(cell, row, position, false));
            }
        }
    }

    for ((row, position), id) in rowspan_relationships(matrix, rows, cols) {
        if direct.contains(&(row, position)) {
            continue;
        }
        if let Some(cell) = matrix.cell(id) {
            entries.push(entry(cell, row, position, true));
        }
    }

    consolidate(matrix, sublabel, &mut entries);
    entries
}

/// Positions in `rows × cols` held by cells spanning more than one row.
fn rowspan_relationships(
    matrix: &CellMatrix,
    rows: RangeInclusive<usize>,
    cols: ColumnRange,
) -> BTreeMap<(usize, usize), CellId> {
    let mut map = BTreeMap::new();
    for cell in matrix.cells().iter().filter(|c| c.row_span > 1) {
        for row in cell.origin_row.max(*rows.start())..=cell.row_end().min(*rows.end()) {
            for position in cell.origin_col.max(cols.start)..=cell.col_end().min(cols.end) {
                if matrix.id_at(row, position) == Some(cell.id) {
                    map.insert((row, position), cell.id);
                }
            }
        }
    }
    map
}

fn entry(cell: &CellInfo, row: usize, position: usize, is_from_rowspan: bool) -> DataEntry {
    DataEntry {
        position,
        row_index: row,
        content: cell.html.clone(),
        text: cell.text.clone(),
        source: cell.id,
        values: Vec::new(),
        is_from_rowspan,
        is_from_colspan: cell.col_span > 1,
        is_complex_structure: false,
    }
}

fn consolidate(matrix: &CellMatrix, sublabel: &Sublabel, entries: &mut [DataEntry]) {
    entries.sort_by_key(|e| (e.position, e.row_index));

    let mut by_position: BTreeMap<usize, Vec<CellValue>> = BTreeMap::new();
    for e in entries.iter() {
        let values = by_position.entry(e.position).or_default();
        if values.iter().any(|v| v.cell == e.source) {
            continue;
        }
        let origin_row = matrix.cell(e.source).map_or(e.row_index, |c| c.origin_row);
        values.push(CellValue {
            cell: e.source,
            row_index: origin_row,
            html: e.content.clone(),
            text: e.text.clone(),
        });
    }
    for values in by_position.values_mut() {
        values.sort_by_key(|v| (v.row_index, v.cell));
    }

    let spans_in = entries.iter().any(|e| e.is_from_rowspan);
    let sublabel_complex =
        sublabel.row_span > 1 || sublabel.is_virtual || sublabel.structural_only || spans_in;
    for e in entries.iter_mut() {
        if let Some(values) = by_position.get(&e.position) {
            e.is_complex_structure = sublabel_complex || values.len() > 1;
            e.values = values.clone();
        }
    }
}
