//! Full structural analysis of one table.

use tablefold_core::options::ConversionOptions;
use tablefold_core::structure::TableStructure;
use tablefold_core::table::SourceTable;

use crate::boundary::{detect_boundaries, promote_label_column};
use crate::column_hierarchy::build_column_info;
use crate::data_cells::assign_data_cells;
use crate::matrix::CellMatrix;
use crate::sections::{apply_column_groups, detect_sections};
use crate::title_row::adjust_table_view;

/// Knobs of the analysis, taken from the conversion options.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisOptions {
    pub title_row_ratio: f64,
    pub boundary_snap_distance: usize,
    pub promote_label_column: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self::from(&ConversionOptions::default())
    }
}

impl From<&ConversionOptions> for AnalysisOptions {
    fn from(options: &ConversionOptions) -> Self {
        Self {
            title_row_ratio: options.title_row_ratio,
            boundary_snap_distance: options.boundary_snap_distance,
            promote_label_column: options.promote_label_column,
        }
    }
}

/// Analyse `table` into its structural model.
///
/// Returns `None` when there is nothing to restructure: no cells, no data
/// rows, or no data columns. Callers leave such tables untouched.
pub fn analyze_table(table: &SourceTable, options: &AnalysisOptions) -> Option<TableStructure> {
    let view = adjust_table_view(table, options.title_row_ratio);
    let matrix = CellMatrix::build(&view.rows);
    if matrix.is_empty() {
        log::debug!("Empty table; nothing to analyse");
        return None;
    }

    let mut boundaries = detect_boundaries(&matrix, options.boundary_snap_distance);
    let mut promoted = false;
    if options.promote_label_column {
        if let Some(promoted_boundaries) = promote_label_column(&matrix, &boundaries) {
            log::debug!("Promoting first column to row labels");
            boundaries = promoted_boundaries;
            promoted = true;
        }
    }
    if boundaries.data_start_index >= matrix.row_count()
        || boundaries.data_column_start >= matrix.max_cols()
    {
        log::debug!("Table has no data region; left as is");
        return None;
    }

    // Column paths and row hierarchy only read the matrix.
    let (column_info, mut detection) = rayon::join(
        || build_column_info(&matrix, &boundaries),
        || detect_sections(&matrix, &boundaries, promoted),
    );
    apply_column_groups(&mut detection, &column_info);

    for section in &mut detection.sections {
        for subtitle in &mut section.subtitles {
            for sublabel in &mut subtitle.sublabels {
                sublabel.data = assign_data_cells(&matrix, &boundaries, sublabel);
            }
        }
    }

    Some(TableStructure {
        title: view.title,
        hierarchy_type: detection.hierarchy_type,
        sections: detection.sections,
        column_info,
        boundaries,
        row_count: matrix.row_count(),
        title_row_excluded: view.title_row_excluded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tablefold_core::structure::HierarchyType;
    use tablefold_core::table::{SourceCell, SourceRow};

    fn th(t: &str) -> SourceCell {
        SourceCell::header(t)
    }

    fn td(t: &str) -> SourceCell {
        SourceCell::data(t)
    }

    fn table(rows: Vec<Vec<SourceCell>>) -> SourceTable {
        SourceTable::new(rows.into_iter().map(SourceRow::new).collect())
    }

    #[test]
    fn test_empty_table_is_none() {
        assert!(analyze_table(&SourceTable::default(), &AnalysisOptions::default()).is_none());
    }

    #[test]
    fn test_header_only_table_is_none() {
        let t = table(vec![vec![th("A"), th("B")]]);
        assert!(analyze_table(&t, &AnalysisOptions::default()).is_none());
    }

    #[test]
    fn test_title_row_excluded_and_sections_found() {
        let t = table(vec![
            vec![th("Engine data").with_col_span(3)],
            vec![th("Item"), th("Min"), th("Max")],
            vec![th("Power"), td("10"), td("20")],
            vec![th("Torque"), td("5"), td("9")],
        ]);
        let s = analyze_table(&t, &AnalysisOptions::default()).unwrap();
        assert!(s.title_row_excluded);
        assert_eq!(s.title.as_deref(), Some("Engine data"));
        assert_eq!(s.row_count, 3);
        assert_eq!(s.boundaries.header_end_index, 1);
        assert_eq!(s.hierarchy_type, HierarchyType::SectionOnly);
        assert_eq!(s.sections.len(), 2);
        let power = s.sections[0].subtitles[0].sublabels[0].clone();
        let texts: Vec<&str> = power.data.iter().map(|d| d.text.as_str()).collect();
        assert_eq!(texts, vec!["10", "20"]);
        assert_eq!(s.column_info.path(1).unwrap().leaf_text(), "Min");
    }

    #[test]
    fn test_sublabel_rowspan_data() {
        let t = table(vec![
            vec![th("Item").with_col_span(3), th("Value")],
            vec![th("Engine").with_row_span(4), th("Petrol").with_row_span(2), td("Power"), td("10")],
            vec![td("Torque"), td("20")],
            vec![th("Diesel").with_row_span(2), td("Power"), td("30").with_row_span(2)],
            vec![td("Torque")],
        ]);
        let s = analyze_table(&t, &AnalysisOptions::default()).unwrap();
        assert_eq!(s.hierarchy_type, HierarchyType::SectionSubtitleSublabel);
        let diesel = &s.sections[0].subtitles[1];
        let torque = &diesel.sublabels[1];
        assert_eq!(torque.title, "Torque");
        assert_eq!(torque.data.len(), 1);
        assert!(torque.data[0].is_from_rowspan);
        assert_eq!(torque.data[0].text, "30");
    }

    #[test]
    fn test_every_data_cell_reaches_a_sublabel() {
        let t = table(vec![
            vec![th("Item").with_col_span(2), th("A"), th("B")],
            vec![th("S1").with_row_span(2), td("x"), td("1"), td("2")],
            vec![td("y"), td("3"), td("4")],
            vec![th("S2"), td("z"), td("5"), td("6")],
        ]);
        let s = analyze_table(&t, &AnalysisOptions::default()).unwrap();
        let mut texts: Vec<String> = s
            .sublabels()
            .flat_map(|sl| sl.data.iter().map(|d| d.text.clone()))
            .collect();
        texts.sort();
        assert_eq!(texts, vec!["1", "2", "3", "4", "5", "6"]);
    }

    #[test]
    fn test_promotion_can_be_disabled() {
        let t = table(vec![
            vec![th("Name"), th("Age")],
            vec![td("Alice"), td("30")],
            vec![td("Bob"), td("25")],
        ]);
        let on = analyze_table(&t, &AnalysisOptions::default()).unwrap();
        assert_eq!(on.hierarchy_type, HierarchyType::SectionOnly);

        let options = AnalysisOptions {
            promote_label_column: false,
            ..AnalysisOptions::default()
        };
        let off = analyze_table(&t, &options).unwrap();
        assert_eq!(off.hierarchy_type, HierarchyType::DataOnly);
        assert_eq!(off.sections[0].subtitles[0].sublabels.len(), 2);
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let t = table(vec![
            vec![th("Item").with_row_span(2), th("Size").with_col_span(2)],
            vec![th("W"), th("H")],
            vec![th("Box"), td("1"), td("2")],
        ]);
        let a = analyze_table(&t, &AnalysisOptions::default());
        let b = analyze_table(&t, &AnalysisOptions::default());
        assert_eq!(a, b);
    }
}
