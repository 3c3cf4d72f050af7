//! Source table intermediate representation.
//!
//! A `SourceTable` is an immutable snapshot of one `<table>` element: its rows,
//! its cells (with spans and header flags) and the verbatim markup it was read
//! from. Every later stage works on this snapshot and never on the live document.

use std::collections::HashMap;

use serde::Serialize;

/// Largest `colspan` honoured by HTML parsers.
pub const MAX_COL_SPAN: usize = 1000;
/// Largest `rowspan` honoured by HTML parsers.
pub const MAX_ROW_SPAN: usize = 65534;

/// One `<table>` read from a document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SourceTable {
    /// Rows in document order (`thead`, `tbody`, `tfoot` flattened).
    pub rows: Vec<SourceRow>,
    /// Plain text of the `<caption>` element, if any.
    pub caption: Option<String>,
    /// Attributes of the `<table>` element itself.
    #[serde(skip)]
    pub attributes: HashMap<String, String>,
    /// Verbatim markup of the table, as found in the document.
    #[serde(skip)]
    pub outer_html: String,
}

impl SourceTable {
    pub fn new(rows: Vec<SourceRow>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|r| r.cells.is_empty())
    }

    /// Attribute value of the `<table>` element.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }
}

/// A `<tr>` element.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SourceRow {
    pub cells: Vec<SourceCell>,
}

impl SourceRow {
    pub fn new(cells: Vec<SourceCell>) -> Self {
        Self { cells }
    }

    /// Sum of the column spans of the row's own cells.
    pub fn span_width(&self) -> usize {
        self.cells.iter().map(|c| c.col_span).sum()
    }
}

/// A `<th>` or `<td>` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceCell {
    /// Inner markup, preserved as written.
    pub html: String,
    /// Whitespace-collapsed plain text.
    pub text: String,
    pub row_span: usize,
    pub col_span: usize,
    pub is_header: bool,
}

impl SourceCell {
    pub fn new(text: impl Into<String>, is_header: bool) -> Self {
        let text = text.into();
        Self {
            html: text.clone(),
            text,
            row_span: 1,
            col_span: 1,
            is_header,
        }
    }

    pub fn header(text: impl Into<String>) -> Self {
        Self::new(text, true)
    }

    pub fn data(text: impl Into<String>) -> Self {
        Self::new(text, false)
    }

    pub fn with_row_span(mut self, span: usize) -> Self {
        self.row_span = span.clamp(1, MAX_ROW_SPAN);
        self
    }

    pub fn with_col_span(mut self, span: usize) -> Self {
        self.col_span = span.clamp(1, MAX_COL_SPAN);
        self
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = html.into();
        self
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Parse a `colspan` attribute value the way browsers do.
pub fn parse_col_span(value: Option<&str>) -> usize {
    value
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .map(|n| n.min(MAX_COL_SPAN))
        .unwrap_or(1)
}

/// Parse a `rowspan` attribute value.
///
/// Returns `0` for `rowspan="0"`, which means "extend to the last row"; the
/// matrix builder resolves it against the real row count.
pub fn parse_row_span(value: Option<&str>) -> usize {
    match value.and_then(|v| v.trim().parse::<usize>().ok()) {
        Some(0) => 0,
        Some(n) => n.min(MAX_ROW_SPAN),
        None => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_col_span() {
        assert_eq!(parse_col_span(None), 1);
        assert_eq!(parse_col_span(Some("3")), 3);
        assert_eq!(parse_col_span(Some(" 2 ")), 2);
        assert_eq!(parse_col_span(Some("0")), 1);
        assert_eq!(parse_col_span(Some("abc")), 1);
        assert_eq!(parse_col_span(Some("5000")), MAX_COL_SPAN);
    }

    #[test]
    fn test_parse_row_span() {
        assert_eq!(parse_row_span(None), 1);
        assert_eq!(parse_row_span(Some("4")), 4);
        assert_eq!(parse_row_span(Some("0")), 0);
        assert_eq!(parse_row_span(Some("-1")), 1);
        assert_eq!(parse_row_span(Some("99999")), MAX_ROW_SPAN);
    }

    #[test]
    fn test_span_width() {
        let row = SourceRow::new(vec![
            SourceCell::header("A").with_col_span(2),
            SourceCell::data("B"),
        ]);
        assert_eq!(row.span_width(), 3);
    }

    #[test]
    fn test_table_is_empty() {
        let table = SourceTable::new(vec![
            SourceRow::new(vec![SourceCell::header("A"), SourceCell::header("B")]),
            SourceRow::new(vec![SourceCell::header("x"), SourceCell::data("1")]),
        ]);
        assert!(!table.is_empty());
        assert!(SourceTable::default().is_empty());
    }
}
