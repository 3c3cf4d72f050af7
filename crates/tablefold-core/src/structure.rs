//! Structural model derived from a table.
//!
//! These types are the output of the analysis stages and the input of the
//! renderer. They are built fresh for every conversion pass and are read-only
//! once built. Row indices refer to the analysed row view (after a title row,
//! if any, has been excluded); column indices are grid positions.

use std::fmt;

use serde::Serialize;

/// Index of a cell in a cell matrix's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CellId(pub usize);

/// Header/data split of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Boundaries {
    /// First row that is not a header row.
    pub header_end_index: usize,
    /// Same value as `header_end_index`; kept separate for readability at call sites.
    pub data_start_index: usize,
    /// First grid column that holds data rather than row labels.
    pub data_column_start: usize,
}

impl Boundaries {
    pub fn new(header_end_index: usize, data_column_start: usize) -> Self {
        Self {
            header_end_index,
            data_start_index: header_end_index,
            data_column_start,
        }
    }
}

/// Inclusive range of grid columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnRange {
    pub start: usize,
    pub end: usize,
}

impl ColumnRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, position: usize) -> bool {
        position >= self.start && position <= self.end
    }

    pub fn len(&self) -> usize {
        self.end + 1 - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    /// A range covering no column.
    pub fn empty() -> Self {
        Self { start: 1, end: 0 }
    }
}

// ---------------------------------------------------------------------------
// Column hierarchy
// ---------------------------------------------------------------------------

/// One header cell on a column's path from the top-level group to the leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderNode {
    pub text: String,
    pub row_index: usize,
    pub col_index: usize,
    pub row_span: usize,
    pub col_span: usize,
    pub is_top_level: bool,
    pub is_leaf: bool,
    /// Source header cell; `None` for placeholder nodes.
    pub cell: Option<CellId>,
}

/// Header ancestry of one data column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnPath {
    pub position: usize,
    pub nodes: Vec<HeaderNode>,
    pub is_placeholder: bool,
}

impl ColumnPath {
    pub fn depth(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf(&self) -> Option<&HeaderNode> {
        self.nodes.last()
    }

    pub fn top_level(&self) -> Option<&HeaderNode> {
        self.nodes.first()
    }

    pub fn leaf_text(&self) -> &str {
        self.leaf().map(|n| n.text.as_str()).unwrap_or("")
    }
}

/// A run of adjacent data columns sharing one top-level header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopLevelHeader {
    pub text: String,
    pub start_col: usize,
    pub end_col: usize,
    pub leaf_count: usize,
    pub cell: Option<CellId>,
}

impl TopLevelHeader {
    pub fn range(&self) -> ColumnRange {
        ColumnRange::new(self.start_col, self.end_col)
    }
}

/// Column hierarchy of a whole table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub data_column_start: usize,
    pub column_count: usize,
    /// One path per data column, in column order.
    pub paths: Vec<ColumnPath>,
    /// Deepest path length.
    pub header_depth: usize,
    pub top_level_headers: Vec<TopLevelHeader>,
}

impl ColumnInfo {
    pub fn path(&self, position: usize) -> Option<&ColumnPath> {
        self.paths.iter().find(|p| p.position == position)
    }

    /// Whether the renderer has to walk more than two header levels.
    pub fn is_multi_level(&self) -> bool {
        self.header_depth >= 3 || self.paths.iter().any(|p| p.depth() >= 3)
    }

    /// Whether the top-level headers group columns at all.
    ///
    /// A flat header row gives one top-level header per column; those are
    /// column labels, not groups. Grouping needs a header covering several
    /// leaves or a header block more than one level deep.
    pub fn has_column_groups(&self) -> bool {
        self.top_level_headers.len() >= 2
            && (self.header_depth >= 2 || self.top_level_headers.iter().any(|g| g.leaf_count > 1))
    }

    pub fn data_range(&self) -> Option<ColumnRange> {
        if self.column_count > self.data_column_start {
            Some(ColumnRange::new(self.data_column_start, self.column_count - 1))
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Row hierarchy
// ---------------------------------------------------------------------------

/// Shape of a table's row labelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HierarchyType {
    DataOnly,
    SectionOnly,
    SectionSubtitle,
    SectionSubtitleSublabel,
}

impl HierarchyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HierarchyType::DataOnly => "data-only",
            HierarchyType::SectionOnly => "section-only",
            HierarchyType::SectionSubtitle => "section-subtitle",
            HierarchyType::SectionSubtitleSublabel => "section-subtitle-sublabel",
        }
    }

    /// Whether section subtitles and subtitle headings are shown.
    pub fn shows_subtitles(&self) -> bool {
        matches!(
            self,
            HierarchyType::SectionSubtitle | HierarchyType::SectionSubtitleSublabel
        )
    }
}

impl fmt::Display for HierarchyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level grouping of data rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub start_row: usize,
    pub end_row: usize,
    pub subtitles: Vec<Subtitle>,
    pub is_virtual: bool,
}

impl Section {
    pub fn row_count(&self) -> usize {
        self.end_row + 1 - self.start_row
    }

    pub fn contains_row(&self, row: usize) -> bool {
        row >= self.start_row && row <= self.end_row
    }
}

/// Second-level grouping inside a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subtitle {
    pub title: String,
    pub row_start: usize,
    pub row_end: usize,
    pub col_index: usize,
    pub row_span: usize,
    pub sublabels: Vec<Sublabel>,
    pub is_virtual: bool,
    /// Restricts the subtitle to a column group; `None` means every data column.
    pub columns: Option<ColumnRange>,
}

impl Subtitle {
    pub fn contains_row(&self, row: usize) -> bool {
        row >= self.row_start && row <= self.row_end
    }
}

/// Third-level row label, the unit data cells are assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sublabel {
    pub title: String,
    pub row_index: usize,
    /// Index of the label cell among its source row's own cells.
    pub cell_index: Option<usize>,
    /// Grid column of the label cell.
    pub position: usize,
    pub row_span: usize,
    pub data: Vec<DataEntry>,
    pub is_virtual: bool,
    /// Synthesised only to keep the model uniform; its title is never printed.
    pub structural_only: bool,
    pub parent_subtitle: String,
    pub columns: Option<ColumnRange>,
}

impl Sublabel {
    pub fn row_end(&self) -> usize {
        self.row_index + self.row_span.max(1) - 1
    }

    pub fn contains_row(&self, row: usize) -> bool {
        row >= self.row_index && row <= self.row_end()
    }

    /// Data positions in ascending order, each listed once.
    pub fn positions(&self) -> Vec<usize> {
        let mut positions: Vec<usize> = self.data.iter().map(|d| d.position).collect();
        positions.dedup();
        positions
    }

    /// Consolidated values at one data position.
    pub fn values_at(&self, position: usize) -> &[CellValue] {
        self.data
            .iter()
            .find(|d| d.position == position)
            .map(|d| d.values.as_slice())
            .unwrap_or(&[])
    }
}

/// One contributing source cell at a data position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellValue {
    pub cell: CellId,
    /// Row the source cell starts on.
    pub row_index: usize,
    pub html: String,
    pub text: String,
}

/// Content found for a sublabel at one `(row, position)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataEntry {
    pub position: usize,
    pub row_index: usize,
    pub content: String,
    pub text: String,
    pub source: CellId,
    /// Every value at this position, ordered by source row.
    pub values: Vec<CellValue>,
    pub is_from_rowspan: bool,
    pub is_from_colspan: bool,
    pub is_complex_structure: bool,
}

/// Root result of the analysis of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableStructure {
    pub title: Option<String>,
    pub hierarchy_type: HierarchyType,
    pub sections: Vec<Section>,
    pub column_info: ColumnInfo,
    pub boundaries: Boundaries,
    pub row_count: usize,
    pub title_row_excluded: bool,
}

impl TableStructure {
    pub fn sublabels(&self) -> impl Iterator<Item = &Sublabel> {
        self.sections
            .iter()
            .flat_map(|s| s.subtitles.iter())
            .flat_map(|st| st.sublabels.iter())
    }
}
