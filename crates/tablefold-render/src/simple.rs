//! Row-wise strategies that skip structural analysis: carousel, list and
//! hidden placeholder.
//!
//! The first row labels the columns when it consists of header cells only;
//! every following row becomes one slide or one list item.

use tablefold_analysis::matrix::CellMatrix;
use tablefold_analysis::title_row::adjust_table_view;
use tablefold_core::error::Result;
use tablefold_core::marker::MarkerKind;
use tablefold_core::options::ConversionOptions;
use tablefold_core::plugin::{ConversionContext, TableConverter};
use tablefold_core::structure::CellId;
use tablefold_core::table::SourceTable;
use tablefold_utils::html::HtmlBuilder;

/// One label/value pair of a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub label: String,
    pub html: String,
}

/// Rows of a table read as label/value pairs.
#[derive(Debug, Clone, Default)]
pub struct RowRecords {
    pub title: Option<String>,
    pub rows: Vec<Vec<Field>>,
}

/// Read `table` row by row, labelling values from its first row.
///
/// A cell spanning several columns is listed once per row, under the label
/// of its first column. Cells spanning rows appear in every row they cover.
pub fn read_records(table: &SourceTable, title_row_ratio: f64) -> RowRecords {
    let view = adjust_table_view(table, title_row_ratio);
    let matrix = CellMatrix::build(&view.rows);
    if matrix.is_empty() {
        return RowRecords {
            title: view.title,
            rows: Vec::new(),
        };
    }

    let first = matrix.own_cells(0);
    let header_row = !first.is_empty() && first.iter().all(|c| c.is_header);
    let labels: Vec<String> = (0..matrix.max_cols())
        .map(|col| match matrix.get(0, col) {
            Some(cell) if header_row && !cell.is_blank() => cell.text.clone(),
            _ => format!("Column {}", col + 1),
        })
        .collect();

    let start = usize::from(header_row);
    let rows = (start..matrix.row_count())
        .map(|row| {
            let mut seen: Vec<CellId> = Vec::new();
            let mut fields = Vec::new();
            for (col, label) in labels.iter().enumerate() {
                let Some(cell) = matrix.get(row, col) else {
                    continue;
                };
                if seen.contains(&cell.id) {
                    continue;
                }
                seen.push(cell.id);
                fields.push(Field {
                    label: label.clone(),
                    html: cell.html.clone(),
                });
            }
            fields
        })
        .filter(|fields| !fields.is_empty())
        .collect();

    RowRecords {
        title: view.title,
        rows,
    }
}

fn definition_list(b: &mut HtmlBuilder, class: &'static str, id: &str, fields: &[Field]) {
    b.open_tag("dl", &[("class", class), ("id", id)]);
    for field in fields {
        b.text_element("dt", &field.label, &[]);
        b.raw_element("dd", &field.html, &[]);
    }
    b.close_tag();
}

/// One slide per row, in a horizontal or vertical track.
pub struct CarouselConverter;

impl TableConverter for CarouselConverter {
    fn name(&self) -> &str {
        "Carousel"
    }

    fn handles(&self, kind: MarkerKind) -> bool {
        matches!(kind, MarkerKind::CarouselHorizontal | MarkerKind::CarouselVertical)
    }

    fn convert(
        &self,
        table: &SourceTable,
        context: &ConversionContext,
        options: &ConversionOptions,
    ) -> Result<Option<String>> {
        let records = read_records(table, options.title_row_ratio);
        if records.rows.is_empty() {
            return Ok(None);
        }
        let class = match context.kind {
            MarkerKind::CarouselVertical => "tf-carousel tf-carousel--vertical",
            _ => "tf-carousel tf-carousel--horizontal",
        };
        let label = records.title.as_deref().unwrap_or("Table");

        let mut b = HtmlBuilder::new();
        b.open_tag(
            "div",
            &[
                ("class", class),
                ("role", "region"),
                ("aria-roledescription", "carousel"),
                ("aria-label", label),
            ],
        );
        b.open_tag("div", &[("class", "tf-carousel__track")]);
        let total = records.rows.len();
        for (i, row) in records.rows.iter().enumerate() {
            let id = format!("{}-slide-{}", context.id_prefix, i + 1);
            let position = format!("{} of {}", i + 1, total);
            b.open_tag(
                "div",
                &[
                    ("class", "tf-carousel__slide"),
                    ("role", "group"),
                    ("aria-roledescription", "slide"),
                    ("aria-label", position.as_str()),
                ],
            );
            definition_list(&mut b, "tf-fields", &id, row);
            b.close_tag();
        }
        Ok(Some(b.build()))
    }
}

/// One definition list per row.
pub struct ListConverter;

impl TableConverter for ListConverter {
    fn name(&self) -> &str {
        "List"
    }

    fn handles(&self, kind: MarkerKind) -> bool {
        kind == MarkerKind::List
    }

    fn convert(
        &self,
        table: &SourceTable,
        context: &ConversionContext,
        options: &ConversionOptions,
    ) -> Result<Option<String>> {
        let records = read_records(table, options.title_row_ratio);
        if records.rows.is_empty() {
            return Ok(None);
        }
        let mut b = HtmlBuilder::new();
        b.open_tag("div", &[("class", "tf-list")]);
        if let Some(title) = &records.title {
            b.text_element("div", title, &[("class", "tf-list__title")]);
        }
        for (i, row) in records.rows.iter().enumerate() {
            let id = format!("{}-item-{}", context.id_prefix, i + 1);
            definition_list(&mut b, "tf-list__item", &id, row);
        }
        Ok(Some(b.build()))
    }
}

/// Hides the table on narrow viewports.
pub struct HiddenConverter;

impl TableConverter for HiddenConverter {
    fn name(&self) -> &str {
        "Hidden"
    }

    fn handles(&self, kind: MarkerKind) -> bool {
        kind == MarkerKind::NoShow
    }

    fn convert(
        &self,
        _table: &SourceTable,
        _context: &ConversionContext,
        _options: &ConversionOptions,
    ) -> Result<Option<String>> {
        Ok(Some("<div class=\"tf-hidden\" hidden></div>".to_string()))
    }
}
