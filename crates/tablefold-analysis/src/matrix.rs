//! Position-accurate grid of a table's cells.
//!
//! Every grid position `(row, col)` points at the one source cell covering it.
//! A cell with `rowspan = r` and `colspan = c` is painted over an `r × c`
//! rectangle starting at its origin. When two cells would claim the same
//! position (a malformed table) the cell painted first keeps it.

use std::collections::HashSet;

use tablefold_core::structure::CellId;
use tablefold_core::table::SourceRow;

/// A source cell placed on the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellInfo {
    pub id: CellId,
    pub html: String,
    pub text: String,
    /// Row span clamped to the rows that exist.
    pub row_span: usize,
    pub col_span: usize,
    pub is_header: bool,
    /// Source row the cell belongs to (also its top grid row).
    pub origin_row: usize,
    /// Leftmost grid column of the cell.
    pub origin_col: usize,
    /// Index of the cell among its source row's cells.
    pub cell_index: usize,
}

impl CellInfo {
    pub fn row_end(&self) -> usize {
        self.origin_row + self.row_span - 1
    }

    pub fn col_end(&self) -> usize {
        self.origin_col + self.col_span - 1
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Dense grid of cell references.
#[derive(Debug, Clone, Default)]
pub struct CellMatrix {
    cells: Vec<CellInfo>,
    grid: Vec<Vec<Option<CellId>>>,
    max_cols: usize,
}

impl CellMatrix {
    /// Build the matrix for a sequence of rows.
    ///
    /// Never fails: an empty row list gives an empty matrix, and positions no
    /// cell covers stay `None`.
    pub fn build(rows: &[SourceRow]) -> Self {
        let row_count = rows.len();
        if row_count == 0 {
            return Self::default();
        }

        let width_hint = rows.iter().map(|r| r.span_width()).max().unwrap_or(0);
        let mut grid: Vec<Vec<Option<CellId>>> = vec![vec![None; width_hint]; row_count];
        let mut cells: Vec<CellInfo> = Vec::new();

        for (r, row) in rows.iter().enumerate() {
            let mut cursor = 0;
            for (cell_index, cell) in row.cells.iter().enumerate() {
                while grid[r].get(cursor).is_some_and(|slot| slot.is_some()) {
                    cursor += 1;
                }

                let remaining = row_count - r;
                let row_span = match cell.row_span {
                    0 => remaining,
                    n => n.min(remaining),
                };
                let col_span = cell.col_span.max(1);
                let id = CellId(cells.len());

                for grid_row in grid.iter_mut().skip(r).take(row_span) {
                    if grid_row.len() < cursor + col_span {
                        grid_row.resize(cursor + col_span, None);
                    }
                    for slot in &mut grid_row[cursor..cursor + col_span] {
                        if slot.is_none() {
                            *slot = Some(id);
                        } else {
                            log::trace!("Overlapping span at row {} ignored for cell {:?}", r, id);
                        }
                    }
                }

                cells.push(CellInfo {
                    id,
                    html: cell.html.clone(),
                    text: cell.text.clone(),
                    row_span,
                    col_span,
                    is_header: cell.is_header,
                    origin_row: r,
                    origin_col: cursor,
                    cell_index,
                });
                cursor += col_span;
            }
        }

        // Trim trailing columns nothing covers, then square the grid.
        let max_cols = grid
            .iter()
            .map(|row| row.iter().rposition(|s| s.is_some()).map_or(0, |p| p + 1))
            .max()
            .unwrap_or(0);
        for row in &mut grid {
            row.resize(max_cols, None);
        }

        Self {
            cells,
            grid,
            max_cols,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty() || self.max_cols == 0
    }

    pub fn row_count(&self) -> usize {
        self.grid.len()
    }

    pub fn max_cols(&self) -> usize {
        self.max_cols
    }

    pub fn cells(&self) -> &[CellInfo] {
        &self.cells
    }

    /// Cell by id. Ids are only meaningful for the matrix that issued them.
    pub fn cell(&self, id: CellId) -> Option<&CellInfo> {
        self.cells.get(id.0)
    }

    pub fn id_at(&self, row: usize, col: usize) -> Option<CellId> {
        self.grid.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&CellInfo> {
        self.id_at(row, col).and_then(|id| self.cell(id))
    }

    /// Whether the cell at `(row, col)` starts on `row`.
    pub fn is_own(&self, row: usize, col: usize) -> bool {
        self.get(row, col).is_some_and(|c| c.origin_row == row)
    }

    /// Cells whose origin is on `row`, left to right.
    pub fn own_cells(&self, row: usize) -> Vec<&CellInfo> {
        let mut own: Vec<&CellInfo> = self.cells.iter().filter(|c| c.origin_row == row).collect();
        own.sort_by_key(|c| c.origin_col);
        own
    }

    /// Distinct cells covering `row` within `[start, end)`, left to right.
    pub fn row_cells_in(&self, row: usize, start: usize, end: usize) -> Vec<&CellInfo> {
        let mut seen = HashSet::new();
        let end = end.min(self.max_cols);
        (start..end)
            .filter_map(|col| self.get(row, col))
            .filter(|c| seen.insert(c.id))
            .collect()
    }

    /// Whether `row` has at least one data cell of its own.
    pub fn row_has_own_data_cell(&self, row: usize) -> bool {
        self.cells
            .iter()
            .any(|c| c.origin_row == row && !c.is_header)
    }

    /// Number of grid positions a cell actually holds.
    pub fn covered_positions(&self, id: CellId) -> usize {
        self.grid
            .iter()
            .map(|row| row.iter().filter(|s| **s == Some(id)).count())
            .sum()
    }
}
