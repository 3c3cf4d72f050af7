//! Column header hierarchy.
//!
//! Every data column gets the chain of header cells above it, outermost first.
//! Adjacent columns sharing their outermost header form a top-level group.

use std::collections::HashSet;

use tablefold_core::structure::{Boundaries, ColumnInfo, ColumnPath, HeaderNode, TopLevelHeader};

use crate::matrix::CellMatrix;

/// Build the header paths of all data columns.
pub fn build_column_info(matrix: &CellMatrix, boundaries: &Boundaries) -> ColumnInfo {
    let start = boundaries.data_column_start;
    let count = matrix.max_cols();
    let paths: Vec<ColumnPath> = (start..count)
        .map(|position| column_path(matrix, boundaries.header_end_index, start, position))
        .collect();

    let header_depth = paths.iter().map(|p| p.depth()).max().unwrap_or(0);
    let top_level_headers = top_level_groups(&paths);

    ColumnInfo {
        data_column_start: start,
        column_count: count,
        paths,
        header_depth,
        top_level_headers,
    }
}

/// Header path of one column.
///
/// Distinct header cells covering `position` in the header rows, ordered by
/// the row they start on. Blank headers are skipped. A column with no header
/// at all gets a single placeholder node named after its ordinal.
pub fn column_path(
    matrix: &CellMatrix,
    header_end: usize,
    data_column_start: usize,
    position: usize,
) -> ColumnPath {
    let mut seen = HashSet::new();
    let mut nodes: Vec<HeaderNode> = (0..header_end)
        .filter_map(|r| matrix.get(r, position))
        .filter(|cell| seen.insert(cell.id))
        .filter(|cell| !cell.is_blank())
        .map(|cell| HeaderNode {
            text: cell.text.clone(),
            row_index: cell.origin_row,
            col_index: cell.origin_col,
            row_span: cell.row_span,
            col_span: cell.col_span,
            is_top_level: false,
            is_leaf: false,
            cell: Some(cell.id),
        })
        .collect();

    if nodes.is_empty() {
        return ColumnPath {
            position,
            nodes: vec![HeaderNode {
                text: format!("Column {}", position - data_column_start + 1),
                row_index: 0,
                col_index: position,
                row_span: 1,
                col_span: 1,
                is_top_level: true,
                is_leaf: true,
                cell: None,
            }],
            is_placeholder: true,
        };
    }

    nodes.sort_by_key(|n| n.row_index);
    if let Some(first) = nodes.first_mut() {
        first.is_top_level = true;
    }
    if let Some(last) = nodes.last_mut() {
        last.is_leaf = true;
    }
    ColumnPath {
        position,
        nodes,
        is_placeholder: false,
    }
}

/// Group adjacent columns by their top-level header cell.
fn top_level_groups(paths: &[ColumnPath]) -> Vec<TopLevelHeader> {
    let mut groups: Vec<TopLevelHeader> = Vec::new();
    for path in paths {
        let Some(top) = path.top_level() else {
            continue;
        };
        match groups.last_mut() {
            Some(group)
                if top.cell.is_some() && group.cell == top.cell && group.end_col + 1 == path.position =>
            {
                group.end_col = path.position;
                group.leaf_count += 1;
            }
            _ => groups.push(TopLevelHeader {
                text: top.text.clone(),
                start_col: path.position,
                end_col: path.position,
                leaf_count: 1,
                cell: top.cell,
            }),
        }
    }
    groups
}
