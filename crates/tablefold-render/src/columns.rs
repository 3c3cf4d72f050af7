//! Column grouping for one sublabel's data.
//!
//! Data positions are grouped under their header cells. Two-level grouping
//! keeps only the top-level header and the leaf; N-level grouping keeps every
//! header on the path. Positions sharing a leaf header (a spanned header)
//! merge into one leaf, with each source cell listed once.

use tablefold_core::structure::{CellId, CellValue, ColumnInfo, HeaderNode, Sublabel};

use crate::error::RenderError;

/// Identity of a header node: its source cell, or the column it stands in for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKey {
    Header(CellId),
    Placeholder(usize),
}

impl NodeKey {
    fn of(node: &HeaderNode, position: usize) -> Self {
        match node.cell {
            Some(id) => NodeKey::Header(id),
            None => NodeKey::Placeholder(position),
        }
    }
}

/// Values under one leaf header.
#[derive(Debug, Clone)]
pub struct LeafGroup<'a> {
    pub key: NodeKey,
    pub label: &'a str,
    pub positions: Vec<usize>,
    pub values: Vec<&'a CellValue>,
}

/// A node of the column tree: a header wrapper or a leaf with values.
#[derive(Debug, Clone)]
pub enum ColumnNode<'a> {
    Group {
        key: NodeKey,
        title: &'a str,
        children: Vec<ColumnNode<'a>>,
    },
    Leaf(LeafGroup<'a>),
}

/// Grouping depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    TwoLevel,
    NLevel,
}

impl Grouping {
    pub fn for_columns(column_info: &ColumnInfo) -> Self {
        if column_info.is_multi_level() {
            Grouping::NLevel
        } else {
            Grouping::TwoLevel
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grouping::TwoLevel => "two-level",
            Grouping::NLevel => "n-level",
        }
    }
}

/// Group a sublabel's data positions into a column tree.
pub fn group_columns<'a>(
    sublabel: &'a Sublabel,
    column_info: &'a ColumnInfo,
    grouping: Grouping,
) -> Result<Vec<ColumnNode<'a>>, RenderError> {
    let mut roots: Vec<ColumnNode<'a>> = Vec::new();
    for position in sublabel.positions() {
        let path = column_info
            .path(position)
            .ok_or(RenderError::MissingColumnPath(position))?;
        let levels: Vec<&HeaderNode> = match grouping {
            Grouping::NLevel => path.nodes.iter().collect(),
            Grouping::TwoLevel => match (path.top_level(), path.leaf()) {
                (Some(top), Some(leaf)) if path.depth() > 1 => vec![top, leaf],
                (Some(top), _) => vec![top],
                _ => Vec::new(),
            },
        };
        let Some((leaf, parents)) = levels.split_last() else {
            return Err(RenderError::MissingColumnPath(position));
        };

        let mut siblings = &mut roots;
        for node in parents {
            let key = NodeKey::of(node, position);
            let existing = siblings
                .iter()
                .position(|n| matches!(n, ColumnNode::Group { key: k, .. } if *k == key));
            let index = match existing {
                Some(index) => index,
                None => {
                    siblings.push(ColumnNode::Group {
                        key,
                        title: node.text.as_str(),
                        children: Vec::new(),
                    });
                    siblings.len() - 1
                }
            };
            siblings = match &mut siblings[index] {
                ColumnNode::Group { children, .. } => children,
                ColumnNode::Leaf(_) => return Err(RenderError::MissingColumnPath(position)),
            };
        }

        let key = NodeKey::of(leaf, position);
        let values = sublabel.values_at(position);
        let existing = siblings
            .iter()
            .position(|n| matches!(n, ColumnNode::Leaf(group) if group.key == key));
        match existing {
            Some(index) => {
                if let ColumnNode::Leaf(group) = &mut siblings[index] {
                    group.positions.push(position);
                    for value in values {
                        if !group.values.iter().any(|v| v.cell == value.cell) {
                            group.values.push(value);
                        }
                    }
                    group.values.sort_by_key(|v| (v.row_index, v.cell));
                }
            }
            None => siblings.push(ColumnNode::Leaf(LeafGroup {
                key,
                label: leaf.text.as_str(),
                positions: vec![position],
                values: values.iter().collect(),
            })),
        }
    }
    Ok(roots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tablefold_core::structure::{ColumnPath, DataEntry};

    fn node(text: &str, cell: usize, row: usize) -> HeaderNode {
        HeaderNode {
            text: text.to_string(),
            row_index: row,
            col_index: 0,
            row_span: 1,
            col_span: 1,
            is_top_level: row == 0,
            is_leaf: false,
            cell: Some(CellId(cell)),
        }
    }

    fn path(position: usize, nodes: Vec<HeaderNode>) -> ColumnPath {
        ColumnPath {
            position,
            nodes,
            is_placeholder: false,
        }
    }

    fn entry(position: usize, cell: usize, text: &str) -> DataEntry {
        let value = CellValue {
            cell: CellId(cell),
            row_index: 1,
            html: text.to_string(),
            text: text.to_string(),
        };
        DataEntry {
            position,
            row_index: 1,
            content: text.to_string(),
            text: text.to_string(),
            source: CellId(cell),
            values: vec![value],
            is_from_rowspan: false,
            is_from_colspan: false,
            is_complex_structure: false,
        }
    }

    fn sublabel(data: Vec<DataEntry>) -> Sublabel {
        Sublabel {
            title: "Row".to_string(),
            row_index: 1,
            cell_index: Some(0),
            position: 0,
            row_span: 1,
            data,
            is_virtual: false,
            structural_only: false,
            parent_subtitle: String::new(),
            columns: None,
        }
    }

    fn three_level_info() -> ColumnInfo {
        // Dimensions > Outer > (W, H), Dimensions > Inner > W
        ColumnInfo {
            data_column_start: 1,
            column_count: 4,
            paths: vec![
                path(1, vec![node("Dimensions", 0, 0), node("Outer", 1, 1), node("W", 3, 2)]),
                path(2, vec![node("Dimensions", 0, 0), node("Outer", 1, 1), node("H", 4, 2)]),
                path(3, vec![node("Dimensions", 0, 0), node("Inner", 2, 1), node("W", 5, 2)]),
            ],
            header_depth: 3,
            top_level_headers: Vec::new(),
        }
    }

    fn labels(nodes: &[ColumnNode<'_>]) -> Vec<String> {
        nodes
            .iter()
            .map(|n| match n {
                ColumnNode::Group { title, children, .. } => {
                    format!("{}[{}]", title, labels(children).join(","))
                }
                ColumnNode::Leaf(leaf) => leaf.label.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_n_level_tree() {
        let info = three_level_info();
        let sl = sublabel(vec![entry(1, 10, "1"), entry(2, 11, "2"), entry(3, 12, "3")]);
        let tree = group_columns(&sl, &info, Grouping::for_columns(&info)).unwrap();
        assert_eq!(labels(&tree), vec!["Dimensions[Outer[W,H],Inner[W]]"]);
    }

    #[test]
    fn test_two_level_keeps_top_and_leaf() {
        let info = three_level_info();
        let sl = sublabel(vec![entry(1, 10, "1"), entry(3, 12, "3")]);
        let tree = group_columns(&sl, &info, Grouping::TwoLevel).unwrap();
        // Both leaves read "W" but come from different header cells.
        assert_eq!(labels(&tree), vec!["Dimensions[W,W]"]);
    }

    #[test]
    fn test_spanned_leaf_merges_positions() {
        let info = ColumnInfo {
            data_column_start: 1,
            column_count: 3,
            paths: vec![
                path(1, vec![node("Range", 7, 0)]),
                path(2, vec![node("Range", 7, 0)]),
            ],
            header_depth: 1,
            top_level_headers: Vec::new(),
        };
        let sl = sublabel(vec![entry(1, 10, "min"), entry(2, 11, "max")]);
        let tree = group_columns(&sl, &info, Grouping::TwoLevel).unwrap();
        assert_eq!(tree.len(), 1);
        let ColumnNode::Leaf(leaf) = &tree[0] else {
            panic!("expected a leaf");
        };
        assert_eq!(leaf.positions, vec![1, 2]);
        let texts: Vec<&str> = leaf.values.iter().map(|v| v.text.as_str()).collect();
        assert_eq!(texts, vec!["min", "max"]);
    }

    #[test]
    fn test_colspan_value_listed_once() {
        let info = ColumnInfo {
            data_column_start: 1,
            column_count: 3,
            paths: vec![
                path(1, vec![node("Range", 7, 0)]),
                path(2, vec![node("Range", 7, 0)]),
            ],
            header_depth: 1,
            top_level_headers: Vec::new(),
        };
        let sl = sublabel(vec![entry(1, 10, "both"), entry(2, 10, "both")]);
        let tree = group_columns(&sl, &info, Grouping::TwoLevel).unwrap();
        let ColumnNode::Leaf(leaf) = &tree[0] else {
            panic!("expected a leaf");
        };
        assert_eq!(leaf.values.len(), 1);
    }

    #[test]
    fn test_missing_path_is_error() {
        let info = ColumnInfo::default();
        let sl = sublabel(vec![entry(4, 1, "x")]);
        let err = group_columns(&sl, &info, Grouping::TwoLevel).unwrap_err();
        assert_eq!(err, RenderError::MissingColumnPath(4));
    }
}
