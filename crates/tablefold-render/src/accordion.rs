//! Accordion rendering of an analysed table.
//!
//! Sections become collapsible panels. Inside a panel, subtitles and
//! sublabels become headings and each sublabel's data is laid out under its
//! column headers, either two levels deep or along the full header path.

use tablefold_analysis::{analyze_table, AnalysisOptions};
use tablefold_core::error::Result;
use tablefold_core::marker::MarkerKind;
use tablefold_core::options::ConversionOptions;
use tablefold_core::plugin::{ConversionContext, TableConverter};
use tablefold_core::structure::{CellValue, HierarchyType, Section, Sublabel, Subtitle, TableStructure};
use tablefold_core::table::SourceTable;
use tablefold_utils::html::{escape_text, HtmlBuilder};

use crate::columns::{group_columns, ColumnNode, Grouping, LeafGroup};
use crate::error::RenderError;

/// Rendering settings for one table.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Prefix for every DOM id in the output.
    pub id_prefix: String,
    /// Always render values as a bullet list.
    pub list_values: bool,
    pub expand_first_section: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            id_prefix: "tf-0".to_string(),
            list_values: false,
            expand_first_section: false,
        }
    }
}

/// Converter for the accordion-class markers.
pub struct AccordionConverter;

impl TableConverter for AccordionConverter {
    fn name(&self) -> &str {
        "Accordion"
    }

    fn handles(&self, kind: MarkerKind) -> bool {
        kind.is_accordion_class()
    }

    fn convert(
        &self,
        table: &SourceTable,
        context: &ConversionContext,
        options: &ConversionOptions,
    ) -> Result<Option<String>> {
        let Some(structure) = analyze_table(table, &AnalysisOptions::from(options)) else {
            return Ok(None);
        };
        let render_options = RenderOptions {
            id_prefix: context.id_prefix.clone(),
            list_values: context.kind == MarkerKind::ListAccordion,
            expand_first_section: options.expand_first_section,
        };
        Ok(Some(render_structure(&structure, &render_options)))
    }
}

/// Render `structure`; failures become an inline error element.
pub fn render_structure(structure: &TableStructure, options: &RenderOptions) -> String {
    match try_render(structure, options) {
        Ok(html) => html,
        Err(e) => {
            log::warn!("Rendering failed: {}", e);
            error_placeholder(&e)
        }
    }
}

/// Inline element shown in place of a table that could not be rendered.
pub fn error_placeholder(error: &RenderError) -> String {
    format!(
        "<div class=\"tablefold-error\" role=\"alert\">{}</div>",
        escape_text(&error.to_string())
    )
}

/// Render `structure`, reporting inconsistencies as errors.
pub fn try_render(structure: &TableStructure, options: &RenderOptions) -> std::result::Result<String, RenderError> {
    validate(structure)?;

    let grouping = Grouping::for_columns(&structure.column_info);
    let mut b = HtmlBuilder::new();
    b.open_tag(
        "div",
        &[
            ("class", "tf-accordion"),
            ("data-hierarchy", structure.hierarchy_type.as_str()),
        ],
    );
    if let Some(title) = &structure.title {
        b.text_element("div", title, &[("class", "tf-accordion__title")]);
    }

    let renderer = SectionRenderer {
        structure,
        options,
        grouping,
    };
    for (index, section) in structure.sections.iter().enumerate() {
        renderer.section(&mut b, section, index)?;
    }
    Ok(b.build())
}

fn validate(structure: &TableStructure) -> std::result::Result<(), RenderError> {
    for section in &structure.sections {
        if section.end_row < section.start_row {
            return Err(RenderError::InvalidSection {
                id: section.id.clone(),
                start: section.start_row,
                end: section.end_row,
            });
        }
    }
    if let Some(sublabel) = structure.sublabels().find(|s| s.row_index >= structure.row_count) {
        return Err(RenderError::RowOutOfRange {
            title: sublabel.title.clone(),
            row: sublabel.row_index,
        });
    }
    Ok(())
}

struct SectionRenderer<'a> {
    structure: &'a TableStructure,
    options: &'a RenderOptions,
    grouping: Grouping,
}

impl SectionRenderer<'_> {
    fn section(&self, b: &mut HtmlBuilder, section: &Section, index: usize) -> std::result::Result<(), RenderError> {
        if section.title.is_empty() {
            b.open_tag("div", &[("class", "tf-section tf-section--flat")]);
            self.subtitles(b, section)?;
            b.close_tag();
            return Ok(());
        }

        let open = self.options.expand_first_section && index == 0;
        let base = format!("{}-s{}", self.options.id_prefix, index + 1);
        let toggle_id = format!("{}-toggle", base);
        let panel_id = format!("{}-panel", base);
        let class = if open {
            "tf-section tf-section--open"
        } else {
            "tf-section"
        };

        b.open_tag("div", &[("class", class), ("data-section-id", section.id.as_str())]);
        b.open_tag(
            "button",
            &[
                ("type", "button"),
                ("class", "tf-section__toggle"),
                ("id", toggle_id.as_str()),
                ("aria-expanded", if open { "true" } else { "false" }),
                ("aria-controls", panel_id.as_str()),
            ],
        );
        b.text_element("span", &section.title, &[("class", "tf-section__title")]);
        if self.structure.hierarchy_type.shows_subtitles() {
            if let Some(subtitle) = &section.subtitle {
                b.text_element("span", subtitle, &[("class", "tf-section__subtitle")]);
            }
        }
        b.close_tag();

        let mut panel = vec![
            ("class", "tf-section__panel"),
            ("id", panel_id.as_str()),
            ("role", "region"),
            ("aria-labelledby", toggle_id.as_str()),
        ];
        if !open {
            panel.push(("hidden", "hidden"));
        }
        b.open_tag("div", &panel);
        self.subtitles(b, section)?;
        b.close_tag();
        b.close_tag();
        Ok(())
    }

    fn subtitles(&self, b: &mut HtmlBuilder, section: &Section) -> std::result::Result<(), RenderError> {
        for subtitle in &section.subtitles {
            b.open_tag("div", &[("class", "tf-subtitle")]);
            if self.shows_subtitle_title(section, subtitle) {
                b.text_element("div", &subtitle.title, &[("class", "tf-subtitle__title")]);
            }
            for sublabel in &subtitle.sublabels {
                self.sublabel(b, sublabel)?;
            }
            b.close_tag();
        }
        Ok(())
    }

    fn shows_subtitle_title(&self, section: &Section, subtitle: &Subtitle) -> bool {
        self.structure.hierarchy_type.shows_subtitles()
            && !subtitle.title.is_empty()
            && !(subtitle.is_virtual && subtitle.title == section.title)
    }

    fn sublabel(&self, b: &mut HtmlBuilder, sublabel: &Sublabel) -> std::result::Result<(), RenderError> {
        let tree = group_columns(sublabel, &self.structure.column_info, self.grouping)?;
        let show_title = shows_sublabel_title(sublabel);
        if tree.is_empty() && !show_title {
            return Ok(());
        }

        let class = match self.structure.hierarchy_type {
            HierarchyType::DataOnly => "tf-sublabel tf-sublabel--row",
            _ => "tf-sublabel",
        };
        b.open_tag("div", &[("class", class)]);
        if show_title {
            b.text_element("div", &sublabel.title, &[("class", "tf-sublabel__title")]);
        }
        if !tree.is_empty() {
            let class = format!("tf-columns tf-columns--{}", self.grouping.as_str());
            b.open_tag("div", &[("class", class.as_str())]);
            self.nodes(b, &tree, 1);
            b.close_tag();
        }
        b.close_tag();
        Ok(())
    }

    fn nodes(&self, b: &mut HtmlBuilder, nodes: &[ColumnNode<'_>], level: usize) {
        for node in nodes {
            match node {
                ColumnNode::Group { title, children, .. } => {
                    let class = format!("tf-group tf-group--level-{}", level);
                    b.open_tag("div", &[("class", class.as_str())]);
                    b.text_element("div", title, &[("class", "tf-group__title")]);
                    self.nodes(b, children, level + 1);
                    b.close_tag();
                }
                ColumnNode::Leaf(leaf) => self.leaf(b, leaf),
            }
        }
    }

    fn leaf(&self, b: &mut HtmlBuilder, leaf: &LeafGroup<'_>) {
        let column = leaf.positions.first().map(|p| p.to_string()).unwrap_or_default();
        b.open_tag("div", &[("class", "tf-item"), ("data-column", column.as_str())]);
        b.text_element("div", leaf.label, &[("class", "tf-item__label")]);

        let values: Vec<&CellValue> = leaf
            .values
            .iter()
            .copied()
            .filter(|v| !v.text.is_empty() || v.html.contains('<'))
            .collect();
        match values.as_slice() {
            [] => {
                b.raw_element("div", "", &[("class", "tf-item__value tf-item__value--empty")]);
            }
            [single] if !self.options.list_values => {
                b.raw_element("div", &single.html, &[("class", "tf-item__value")]);
            }
            many => {
                b.open_tag("ul", &[("class", "tf-item__values")]);
                for value in many {
                    b.raw_element("li", &value.html, &[]);
                }
                b.close_tag();
            }
        }
        b.close_tag();
    }
}

/// Virtual and structural sublabels repeat their parent's title; those
/// titles, and empty ones, are not printed.
fn shows_sublabel_title(sublabel: &Sublabel) -> bool {
    if sublabel.title.is_empty() {
        return false;
    }
    let synthesized = sublabel.is_virtual || sublabel.structural_only;
    !(synthesized && sublabel.title == sublabel.parent_subtitle)
}
