//! HTML table source. Finds top-level tables in a document and reads them into the IR.

use std::collections::HashMap;
use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};

use tablefold_core::error::{Result, TableError};
use tablefold_core::marker::Marker;
use tablefold_core::options::ConversionOptions;
use tablefold_core::plugin::{LocatedTable, TableSource};
use tablefold_core::table::{parse_col_span, parse_row_span, SourceCell, SourceRow, SourceTable};
use tablefold_utils::html::normalize_whitespace;

static TABLE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<(/?)table\b[^>]*>").unwrap());
static OPAQUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<!--.*?-->|<script\b.*?</script\s*>|<style\b.*?</style\s*>").unwrap()
});

pub struct HtmlTableSource;

impl TableSource for HtmlTableSource {
    fn name(&self) -> &str {
        "HTML Tables"
    }

    fn locate(&self, document: &str, options: &ConversionOptions) -> Result<Vec<LocatedTable>> {
        let mut located = Vec::new();
        for (index, span) in locate_table_spans(document).into_iter().enumerate() {
            let table = match parse_table(&document[span.clone()]) {
                Ok(table) => table,
                Err(e) => {
                    log::warn!("Skipping table {}: {}", index, e);
                    continue;
                }
            };
            let marker = match table.attr(&options.marker_attribute) {
                Some(text) => Marker::Explicit {
                    table_index: index,
                    text: text.to_string(),
                },
                None => Marker::Default {
                    text: options.default_marker.as_str().to_string(),
                },
            };
            located.push(LocatedTable {
                index,
                span,
                table,
                marker,
            });
        }
        Ok(located)
    }
}

/// Byte ranges of the top-level `<table>` elements in `document`.
///
/// Nested tables stay inside their parent's range. Tags inside comments,
/// scripts and styles are ignored; a table without a closing tag is dropped.
pub fn locate_table_spans(document: &str) -> Vec<Range<usize>> {
    let opaque: Vec<Range<usize>> = OPAQUE.find_iter(document).map(|m| m.range()).collect();
    let is_opaque = |pos: usize| opaque.iter().any(|r| r.contains(&pos));

    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for caps in TABLE_TAG.captures_iter(document) {
        let Some(tag) = caps.get(0) else {
            continue;
        };
        if is_opaque(tag.start()) {
            continue;
        }
        let closing = !caps[1].is_empty();
        if !closing {
            if depth == 0 {
                start = tag.start();
            }
            depth += 1;
        } else if depth > 0 {
            depth -= 1;
            if depth == 0 {
                spans.push(start..tag.end());
            }
        }
    }
    if depth > 0 {
        log::warn!("Unclosed <table> at byte {}; ignored", start);
    }
    spans
}

/// Parse the markup of one table.
pub fn parse_table(markup: &str) -> Result<SourceTable> {
    let fragment = Html::parse_fragment(markup);
    let element = fragment
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "table")
        .ok_or_else(|| TableError::Html("no <table> element".to_string()))?;

    let mut table = read_table(element);
    table.outer_html = markup.to_string();
    Ok(table)
}

/// Read a `<table>` element into the IR. Nested tables are left inside cell markup.
pub fn read_table(element: ElementRef<'_>) -> SourceTable {
    let mut rows = Vec::new();
    let mut caption = None;

    for child in element.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(read_row(child)),
            "thead" | "tbody" | "tfoot" => {
                for tr in child
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|e| e.value().name() == "tr")
                {
                    rows.push(read_row(tr));
                }
            }
            "caption" => {
                let text = normalize_whitespace(&child.text().collect::<String>());
                if !text.is_empty() {
                    caption = Some(text);
                }
            }
            _ => {}
        }
    }

    let attributes: HashMap<String, String> = element
        .value()
        .attrs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    SourceTable {
        rows,
        caption,
        attributes,
        outer_html: element.html(),
    }
}

fn read_row(tr: ElementRef<'_>) -> SourceRow {
    let cells = tr
        .children()
        .filter_map(ElementRef::wrap)
        .filter_map(|cell| {
            let is_header = match cell.value().name() {
                "th" => true,
                "td" => false,
                _ => return None,
            };
            Some(SourceCell {
                html: cell.inner_html().trim().to_string(),
                text: normalize_whitespace(&cell.text().collect::<String>()),
                row_span: parse_row_span(cell.value().attr("rowspan")),
                col_span: parse_col_span(cell.value().attr("colspan")),
                is_header,
            })
        })
        .collect();
    SourceRow::new(cells)
}
