//! Row hierarchy: sections, subtitles and sublabels.
//!
//! Sections start at rows that own header cells in the row-label block and
//! extend over the tallest of those cells. Within a section, the remaining
//! header cells become subtitles and the label cell closest to the data
//! columns becomes the row's sublabel. Every data row ends up in exactly one
//! section, and inside a subtitle every row belongs to exactly one sublabel;
//! rows nothing labels are covered by virtual entries.

use std::collections::HashSet;

use tablefold_core::structure::{
    Boundaries, CellId, ColumnInfo, ColumnRange, HierarchyType, Section, Sublabel, Subtitle,
};

use crate::matrix::{CellInfo, CellMatrix};

/// Sections and the hierarchy shape they form.
#[derive(Debug, Clone)]
pub struct SectionDetection {
    pub sections: Vec<Section>,
    pub hierarchy_type: HierarchyType,
}

struct SectionHead<'a> {
    leader: &'a CellInfo,
    subtitle_field: Option<&'a CellInfo>,
    /// Subtitles opened on the section's first row, left to right.
    subtitles: Vec<&'a CellInfo>,
    row_span: usize,
    /// Led by a promoted data cell rather than a header cell.
    is_virtual: bool,
}

impl SectionHead<'_> {
    fn consumed(&self) -> HashSet<CellId> {
        std::iter::once(self.leader)
            .chain(self.subtitle_field)
            .map(|c| c.id)
            .collect()
    }

    /// First column label cells of this section may start at.
    fn label_floor(&self) -> usize {
        std::iter::once(self.leader)
            .chain(self.subtitle_field)
            .map(|c| c.col_end() + 1)
            .max()
            .unwrap_or(0)
    }
}

struct SectionDraft<'a> {
    start_row: usize,
    end_row: usize,
    head: Option<SectionHead<'a>>,
}

struct SubtitleDraft {
    subtitle: Subtitle,
    cell: Option<CellId>,
    label_floor: usize,
    /// Set on a first-row subtitle followed by another one on the same row.
    /// The last of them labels the rows they share.
    shares_row: bool,
}

/// Detect the row hierarchy of the data rows.
///
/// `promoted` makes first-column data cells lead sections when the table has
/// no row-header cells.
pub fn detect_sections(matrix: &CellMatrix, boundaries: &Boundaries, promoted: bool) -> SectionDetection {
    let first = boundaries.data_start_index;
    let row_count = matrix.row_count();
    if first >= row_count {
        return SectionDetection {
            sections: Vec::new(),
            hierarchy_type: HierarchyType::DataOnly,
        };
    }
    let dcs = boundaries.data_column_start;

    let drafts = draft_sections(matrix, first, row_count, dcs, promoted);
    if drafts.iter().all(|d| d.head.is_none()) {
        return data_only(matrix, first, row_count - 1, dcs);
    }

    let sections: Vec<Section> = drafts
        .iter()
        .enumerate()
        .map(|(index, draft)| build_section(matrix, dcs, draft, index))
        .collect();
    let hierarchy_type = classify_hierarchy(&sections);
    log::debug!(
        "Detected {} sections, hierarchy {}",
        sections.len(),
        hierarchy_type
    );
    SectionDetection {
        sections,
        hierarchy_type,
    }
}

/// Split section-only tables along their top-level column groups.
///
/// Each section gets one virtual subtitle/sublabel pair per group, restricted
/// to that group's columns. Tables whose headers form no groups are left
/// alone.
pub fn apply_column_groups(detection: &mut SectionDetection, column_info: &ColumnInfo) {
    if detection.hierarchy_type != HierarchyType::SectionOnly || !column_info.has_column_groups() {
        return;
    }
    for section in &mut detection.sections {
        let col_index = section.subtitles.first().map_or(0, |s| s.col_index);
        let (start_row, end_row, rows) = (section.start_row, section.end_row, section.row_count());
        section.subtitles = column_info
            .top_level_headers
            .iter()
            .map(|group| {
                let columns = Some(group.range());
                Subtitle {
                    title: group.text.clone(),
                    row_start: start_row,
                    row_end: end_row,
                    col_index,
                    row_span: rows,
                    sublabels: vec![virtual_sublabel(&group.text, start_row, rows, group.start_col, columns)],
                    is_virtual: true,
                    columns,
                }
            })
            .collect();
    }
}

fn draft_sections(
    matrix: &CellMatrix,
    first: usize,
    row_count: usize,
    dcs: usize,
    promoted: bool,
) -> Vec<SectionDraft<'_>> {
    let mut drafts: Vec<SectionDraft<'_>> = Vec::new();
    let mut row = first;
    while row < row_count {
        match section_head(matrix, row, dcs, promoted) {
            Some(head) => {
                let end_row = (row + head.row_span - 1).min(row_count - 1);
                drafts.push(SectionDraft {
                    start_row: row,
                    end_row,
                    head: Some(head),
                });
                row = end_row + 1;
            }
            None => {
                // Rows without their own headers continue the previous section.
                match drafts.last_mut() {
                    Some(last) => last.end_row = row,
                    None => drafts.push(SectionDraft {
                        start_row: row,
                        end_row: row,
                        head: None,
                    }),
                }
                row += 1;
            }
        }
    }
    drafts
}

fn section_head(matrix: &CellMatrix, row: usize, dcs: usize, promoted: bool) -> Option<SectionHead<'_>> {
    let front = own_front(matrix, row, dcs);
    let headers: Vec<&CellInfo> = front.iter().copied().filter(|c| c.is_header).collect();

    if let Some(&leader) = headers.first() {
        let row_span = headers.iter().map(|c| c.row_span).max().unwrap_or(1);
        let (subtitle_field, subtitles) = match headers.len() {
            1 => (None, Vec::new()),
            2 => (None, vec![headers[1]]),
            _ => (Some(headers[1]), headers[2..].to_vec()),
        };
        return Some(SectionHead {
            leader,
            subtitle_field,
            subtitles,
            row_span,
            is_virtual: false,
        });
    }

    if promoted {
        let leader = front
            .first()
            .copied()
            .filter(|c| c.origin_col == 0 && !c.is_header)?;
        return Some(SectionHead {
            leader,
            subtitle_field: None,
            subtitles: Vec::new(),
            row_span: leader.row_span,
            is_virtual: true,
        });
    }
    None
}

fn build_section(matrix: &CellMatrix, dcs: usize, draft: &SectionDraft<'_>, index: usize) -> Section {
    let (title, subtitle_field, consumed, label_floor, section_col, is_virtual) = match &draft.head {
        Some(head) => (
            head.leader.text.clone(),
            head.subtitle_field.map(|c| c.text.clone()),
            head.consumed(),
            head.label_floor(),
            head.leader.origin_col,
            head.is_virtual,
        ),
        None => (String::new(), None, HashSet::new(), 0, 0, true),
    };
    let id = if title.is_empty() {
        format!("section-{}", index + 1)
    } else {
        title.clone()
    };

    let mut drafts = detect_subtitles(matrix, dcs, draft, &consumed);
    for (start, end) in uncovered_runs(draft.start_row, draft.end_row, |r| {
        drafts.iter().any(|d| d.subtitle.contains_row(r))
    }) {
        drafts.push(SubtitleDraft {
            subtitle: Subtitle {
                title: title.clone(),
                row_start: start,
                row_end: end,
                col_index: section_col,
                row_span: end - start + 1,
                sublabels: Vec::new(),
                is_virtual: true,
                columns: None,
            },
            cell: None,
            label_floor,
            shares_row: false,
        });
    }
    drafts.sort_by_key(|d| d.subtitle.row_start);

    let subtitle_cells: HashSet<CellId> = drafts.iter().filter_map(|d| d.cell).collect();
    let shared_until: Vec<Option<usize>> = drafts
        .iter()
        .map(|d| {
            if !d.shares_row {
                return None;
            }
            drafts
                .iter()
                .find(|o| !o.shares_row && o.subtitle.row_start == d.subtitle.row_start)
                .map(|o| o.subtitle.row_end.min(d.subtitle.row_end))
        })
        .collect();
    let excluded = |c: &CellInfo| consumed.contains(&c.id) || subtitle_cells.contains(&c.id);
    let subtitles = drafts
        .into_iter()
        .zip(shared_until)
        .map(|(mut d, shared)| {
            d.subtitle.sublabels = match shared {
                None => detect_sublabels(matrix, dcs, &d, d.subtitle.row_start, excluded),
                Some(until) => {
                    let st = &d.subtitle;
                    // The rows it shares carry no labels or data of their own.
                    let mut sublabels = vec![virtual_sublabel(
                        &st.title,
                        st.row_start,
                        until - st.row_start + 1,
                        st.col_index,
                        Some(ColumnRange::empty()),
                    )];
                    if until < st.row_end {
                        sublabels.extend(detect_sublabels(matrix, dcs, &d, until + 1, excluded));
                    }
                    sublabels
                }
            };
            d.subtitle
        })
        .collect();

    Section {
        id,
        title,
        subtitle: subtitle_field,
        start_row: draft.start_row,
        end_row: draft.end_row,
        subtitles,
        is_virtual,
    }
}

fn detect_subtitles(
    matrix: &CellMatrix,
    dcs: usize,
    draft: &SectionDraft<'_>,
    consumed: &HashSet<CellId>,
) -> Vec<SubtitleDraft> {
    let mut subtitles: Vec<SubtitleDraft> = Vec::new();
    if let Some(head) = &draft.head {
        let last = head.subtitles.len().saturating_sub(1);
        for (i, cell) in head.subtitles.iter().enumerate() {
            subtitles.push(subtitle_draft(cell, draft.start_row, draft.end_row, i < last));
        }
    }

    for row in draft.start_row + 1..=draft.end_row {
        let Some(cell) = own_front(matrix, row, dcs)
            .into_iter()
            .find(|c| c.is_header && !consumed.contains(&c.id))
        else {
            continue;
        };

        // Inside a taller subtitle to its left, a header labels rows instead.
        if subtitles
            .iter()
            .any(|s| s.subtitle.contains_row(row) && s.subtitle.col_index < cell.origin_col)
        {
            continue;
        }
        for previous in &mut subtitles {
            if previous.subtitle.contains_row(row) {
                previous.subtitle.row_end = row - 1;
                previous.subtitle.row_span = row - previous.subtitle.row_start;
            }
        }
        subtitles.push(subtitle_draft(cell, row, draft.end_row, false));
    }
    subtitles
}

fn subtitle_draft(cell: &CellInfo, row: usize, section_end: usize, shares_row: bool) -> SubtitleDraft {
    let row_end = cell.row_end().min(section_end);
    SubtitleDraft {
        subtitle: Subtitle {
            title: cell.text.clone(),
            row_start: row,
            row_end,
            col_index: cell.origin_col,
            row_span: row_end - row + 1,
            sublabels: Vec::new(),
            is_virtual: false,
            columns: None,
        },
        cell: Some(cell.id),
        label_floor: cell.col_end() + 1,
        shares_row,
    }
}

/// Sublabels of a subtitle's rows from `first_row` on.
fn detect_sublabels(
    matrix: &CellMatrix,
    dcs: usize,
    draft: &SubtitleDraft,
    first_row: usize,
    excluded: impl Fn(&CellInfo) -> bool,
) -> Vec<Sublabel> {
    let subtitle = &draft.subtitle;
    let mut sublabels: Vec<Sublabel> = Vec::new();

    for row in first_row..=subtitle.row_end {
        let labels: Vec<&CellInfo> = own_front(matrix, row, dcs)
            .into_iter()
            .filter(|c| !excluded(*c) && c.origin_col >= draft.label_floor)
            .collect();
        let Some(cell) = labels.last() else {
            continue;
        };

        if let Some(previous) = sublabels.last_mut() {
            if previous.contains_row(row) {
                previous.row_span = row - previous.row_index;
            }
        }
        let title = labels
            .iter()
            .filter(|c| !c.is_blank())
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" / ");
        sublabels.push(Sublabel {
            title,
            row_index: row,
            cell_index: Some(cell.cell_index),
            position: cell.origin_col,
            row_span: cell.row_span.min(subtitle.row_end - row + 1),
            data: Vec::new(),
            is_virtual: false,
            structural_only: false,
            parent_subtitle: subtitle.title.clone(),
            columns: None,
        });
    }

    for (start, end) in uncovered_runs(first_row, subtitle.row_end, |r| {
        sublabels.iter().any(|s| s.contains_row(r))
    }) {
        sublabels.push(virtual_sublabel(
            &subtitle.title,
            start,
            end - start + 1,
            subtitle.col_index,
            subtitle.columns,
        ));
    }
    sublabels.sort_by_key(|s| s.row_index);
    sublabels
}

fn data_only(matrix: &CellMatrix, first: usize, last: usize, dcs: usize) -> SectionDetection {
    let sublabels = (first..=last)
        .map(|row| {
            let labels = own_front(matrix, row, dcs);
            let title = labels
                .iter()
                .filter(|c| !c.is_blank())
                .map(|c| c.text.as_str())
                .collect::<Vec<_>>()
                .join(" / ");
            Sublabel {
                structural_only: title.is_empty(),
                title,
                row_index: row,
                cell_index: labels.last().map(|c| c.cell_index),
                position: dcs.saturating_sub(1),
                row_span: 1,
                data: Vec::new(),
                is_virtual: true,
                parent_subtitle: String::new(),
                columns: None,
            }
        })
        .collect();

    let rows = last - first + 1;
    let section = Section {
        id: "section-1".to_string(),
        title: String::new(),
        subtitle: None,
        start_row: first,
        end_row: last,
        subtitles: vec![Subtitle {
            title: String::new(),
            row_start: first,
            row_end: last,
            col_index: 0,
            row_span: rows,
            sublabels,
            is_virtual: true,
            columns: None,
        }],
        is_virtual: true,
    };
    SectionDetection {
        sections: vec![section],
        hierarchy_type: HierarchyType::DataOnly,
    }
}

fn classify_hierarchy(sections: &[Section]) -> HierarchyType {
    let subtitles = || sections.iter().flat_map(|s| s.subtitles.iter());
    if subtitles()
        .flat_map(|st| st.sublabels.iter())
        .any(|sl| !sl.is_virtual)
    {
        HierarchyType::SectionSubtitleSublabel
    } else if subtitles().any(|st| !st.is_virtual) {
        HierarchyType::SectionSubtitle
    } else {
        HierarchyType::SectionOnly
    }
}

fn virtual_sublabel(
    title: &str,
    row_index: usize,
    row_span: usize,
    position: usize,
    columns: Option<ColumnRange>,
) -> Sublabel {
    Sublabel {
        title: title.to_string(),
        row_index,
        cell_index: None,
        position,
        row_span,
        data: Vec::new(),
        is_virtual: true,
        structural_only: true,
        parent_subtitle: title.to_string(),
        columns,
    }
}

/// Cells starting on `row` in the row-label block, left to right.
fn own_front(matrix: &CellMatrix, row: usize, dcs: usize) -> Vec<&CellInfo> {
    matrix
        .row_cells_in(row, 0, dcs)
        .into_iter()
        .filter(|c| c.origin_row == row)
        .collect()
}

/// Maximal runs of rows in `start..=end` for which `covered` is false.
fn uncovered_runs(start: usize, end: usize, covered: impl Fn(usize) -> bool) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut run_start = None;
    for row in start..=end {
        match (covered(row), run_start) {
            (false, None) => run_start = Some(row),
            (true, Some(s)) => {
                runs.push((s, row - 1));
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = run_start {
        runs.push((s, end));
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::{detect_boundaries, promote_label_column};
    use crate::column_hierarchy::build_column_info;
    use tablefold_core::table::{SourceCell, SourceRow};

    fn th(t: &str) -> SourceCell {
        SourceCell::header(t)
    }

    fn td(t: &str) -> SourceCell {
        SourceCell::data(t)
    }

    fn detect(rows: Vec<Vec<SourceCell>>) -> (CellMatrix, Boundaries, SectionDetection) {
        let rows: Vec<SourceRow> = rows.into_iter().map(SourceRow::new).collect();
        let matrix = CellMatrix::build(&rows);
        let mut boundaries = detect_boundaries(&matrix, 2);
        let promoted = match promote_label_column(&matrix, &boundaries) {
            Some(b) => {
                boundaries = b;
                true
            }
            None => false,
        };
        let detection = detect_sections(&matrix, &boundaries, promoted);
        (matrix, boundaries, detection)
    }

    /// Every data row sits in one section, and within each subtitle every
    /// row sits in one sublabel.
    fn assert_exclusive_rows(matrix: &CellMatrix, boundaries: &Boundaries, detection: &SectionDetection) {
        for row in boundaries.data_start_index..matrix.row_count() {
            let owners: Vec<&Section> = detection
                .sections
                .iter()
                .filter(|s| s.contains_row(row))
                .collect();
            assert_eq!(owners.len(), 1, "row {} owned by {} sections", row, owners.len());
            for st in owners[0].subtitles.iter().filter(|st| st.contains_row(row)) {
                let count = st.sublabels.iter().filter(|sl| sl.contains_row(row)).count();
                assert_eq!(count, 1, "row {} in subtitle {:?}", row, st.title);
            }
        }
    }

    #[test]
    fn test_section_only() {
        let (m, b, d) = detect(vec![
            vec![th("Item"), th("Min"), th("Max")],
            vec![th("Power"), td("10"), td("20")],
            vec![th("Torque"), td("5"), td("9")],
        ]);
        assert_eq!(d.hierarchy_type, HierarchyType::SectionOnly);
        assert_eq!(d.sections.len(), 2);
        assert_eq!(d.sections[0].title, "Power");
        assert_eq!(d.sections[0].id, "Power");
        let st = &d.sections[0].subtitles;
        assert_eq!(st.len(), 1);
        assert!(st[0].is_virtual);
        assert_eq!(st[0].sublabels.len(), 1);
        assert!(st[0].sublabels[0].structural_only);
        assert_exclusive_rows(&m, &b, &d);
    }

    #[test]
    fn test_section_subtitle_sublabel_with_rowspans() {
        let (m, b, d) = detect(vec![
            vec![th("Item").with_col_span(3), th("Value")],
            vec![th("Engine").with_row_span(4), th("Petrol").with_row_span(2), td("Power"), td("10")],
            vec![td("Torque"), td("20")],
            vec![th("Diesel").with_row_span(2), td("Power"), td("30")],
            vec![td("Torque"), td("40")],
        ]);
        assert_eq!(b, Boundaries::new(1, 3));
        assert_eq!(d.hierarchy_type, HierarchyType::SectionSubtitleSublabel);
        assert_eq!(d.sections.len(), 1);
        let section = &d.sections[0];
        assert_eq!((section.start_row, section.end_row), (1, 4));
        let titles: Vec<&str> = section.subtitles.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Petrol", "Diesel"]);
        let diesel = &section.subtitles[1];
        assert_eq!((diesel.row_start, diesel.row_end), (3, 4));
        let labels: Vec<&str> = diesel.sublabels.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(labels, vec!["Power", "Torque"]);
        assert_eq!(diesel.sublabels[1].parent_subtitle, "Diesel");
        assert_eq!(diesel.sublabels[1].position, 2);
        assert!(!diesel.sublabels[1].is_virtual);
        assert_exclusive_rows(&m, &b, &d);
    }

    #[test]
    fn test_section_subtitle_gets_structural_sublabels() {
        let (m, b, d) = detect(vec![
            vec![th("Item").with_col_span(2), th("Value")],
            vec![th("A").with_row_span(2), th("a1"), td("1")],
            vec![th("a2"), td("2")],
        ]);
        assert_eq!(d.hierarchy_type, HierarchyType::SectionSubtitle);
        let section = &d.sections[0];
        assert_eq!(section.subtitles.len(), 2);
        for st in &section.subtitles {
            assert_eq!(st.sublabels.len(), 1);
            let sl = &st.sublabels[0];
            assert!(sl.is_virtual && sl.structural_only);
            assert_eq!(sl.title, st.title);
            assert_eq!((sl.row_index, sl.row_end()), (st.row_start, st.row_end));
        }
        assert_exclusive_rows(&m, &b, &d);
    }

    #[test]
    fn test_three_or_more_headers() {
        let (_, b, d) = detect(vec![
            vec![th("Item").with_col_span(4), th("Val")],
            vec![th("S"), th("T"), th("U"), th("V"), td("1")],
        ]);
        assert_eq!(b.data_column_start, 4);
        assert_eq!(d.hierarchy_type, HierarchyType::SectionSubtitle);
        let section = &d.sections[0];
        assert_eq!(section.id, "S");
        assert_eq!(section.subtitle.as_deref(), Some("T"));
        let titles: Vec<&str> = section.subtitles.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["U", "V"]);
        assert_eq!(section.subtitles[0].col_index, 2);
        assert_eq!(section.subtitles[1].col_index, 3);

        // Only the subtitle nearest the data takes the row's values.
        let outer = &section.subtitles[0].sublabels;
        assert_eq!(outer.len(), 1);
        assert_eq!(outer[0].columns.map(|c| c.is_empty()), Some(true));
        let inner = &section.subtitles[1].sublabels;
        assert_eq!(inner.len(), 1);
        assert!(inner[0].is_virtual);
        assert_eq!(inner[0].columns, None);
    }

    #[test]
    fn test_shared_first_row_subtitle_keeps_its_later_rows() {
        let (m, b, d) = detect(vec![
            vec![th("Item").with_col_span(4), th("Val")],
            vec![th("S").with_row_span(2), th("T").with_row_span(2), th("U").with_row_span(2), th("V"), td("1")],
            vec![td("w"), td("2")],
        ]);
        assert_eq!(b.data_column_start, 4);
        let u = &d.sections[0].subtitles[0];
        assert_eq!(u.title, "U");
        assert_eq!((u.row_start, u.row_end), (1, 2));
        assert_eq!(u.sublabels.len(), 2);
        assert_eq!(u.sublabels[0].row_end(), 1);
        assert_eq!(u.sublabels[1].title, "w");
        assert_eq!(u.sublabels[1].row_index, 2);
        assert_exclusive_rows(&m, &b, &d);
    }

    #[test]
    fn test_id_title_subtitle_then_lone_header_rows() {
        let (m, b, d) = detect(vec![
            vec![th("Item").with_col_span(3), th("A"), th("B")],
            vec![th("id").with_row_span(3), th("title").with_row_span(3), th("sub1"), td("1"), td("2")],
            vec![th("sub2"), td("3"), td("4")],
            vec![th("sub3"), td("5"), td("6")],
        ]);
        assert_eq!(b, Boundaries::new(1, 3));
        assert_eq!(d.sections.len(), 1);
        let section = &d.sections[0];
        assert_eq!(section.id, "id");
        assert_eq!(section.subtitle.as_deref(), Some("title"));
        let titles: Vec<&str> = section.subtitles.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["sub1", "sub2", "sub3"]);
        let rows: Vec<(usize, usize)> = section
            .subtitles
            .iter()
            .map(|s| (s.row_start, s.row_end))
            .collect();
        assert_eq!(rows, vec![(1, 1), (2, 2), (3, 3)]);
        assert_eq!(d.hierarchy_type, HierarchyType::SectionSubtitle);
        assert_exclusive_rows(&m, &b, &d);
    }

    #[test]
    fn test_subsequent_row_header_inside_subtitle_is_sublabel() {
        let (m, b, d) = detect(vec![
            vec![th("Item").with_col_span(2), th("Value")],
            vec![th("Engine").with_row_span(3), th("Power"), td("10")],
            vec![th("Torque"), td("20")],
            vec![th("Speed"), td("30")],
        ]);
        // Every later header is a subtitle candidate of its own row.
        assert_eq!(d.hierarchy_type, HierarchyType::SectionSubtitle);
        assert_eq!(d.sections[0].subtitles.len(), 3);
        assert_exclusive_rows(&m, &b, &d);

        let (m, b, d) = detect(vec![
            vec![th("Item").with_col_span(3), th("Value")],
            vec![th("Engine").with_row_span(3), th("Petrol").with_row_span(3), td("Power"), td("10")],
            vec![th("Torque"), td("20")],
            vec![th("Speed"), td("30")],
        ]);
        assert_eq!(b.data_column_start, 3);
        assert_eq!(d.hierarchy_type, HierarchyType::SectionSubtitleSublabel);
        let section = &d.sections[0];
        assert_eq!(section.subtitles.len(), 1);
        assert_eq!(section.subtitles[0].title, "Petrol");
        let titles: Vec<&str> = section.subtitles[0]
            .sublabels
            .iter()
            .map(|s| s.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Power", "Torque", "Speed"]);
        assert_exclusive_rows(&m, &b, &d);
    }

    #[test]
    fn test_orphan_row_extends_previous_section() {
        let (m, b, d) = detect(vec![
            vec![th("Item"), th("V")],
            vec![th("A"), td("1")],
            vec![td(""), td("2")],
            vec![th("B"), td("3")],
        ]);
        assert_eq!(d.sections.len(), 2);
        assert_eq!((d.sections[0].start_row, d.sections[0].end_row), (1, 2));
        assert_eq!(d.sections[1].start_row, 3);
        assert_exclusive_rows(&m, &b, &d);
    }

    #[test]
    fn test_data_only() {
        let (m, b, d) = detect(vec![
            vec![td("1"), td("2")],
            vec![td("3"), td("4")],
            vec![td("5"), td("6")],
        ]);
        assert_eq!(d.hierarchy_type, HierarchyType::DataOnly);
        assert_eq!(d.sections.len(), 1);
        let section = &d.sections[0];
        assert!(section.is_virtual);
        assert_eq!(section.subtitles.len(), 1);
        assert_eq!(section.subtitles[0].sublabels.len(), 3);
        assert!(section.subtitles[0].sublabels.iter().all(|s| s.structural_only));
        assert_exclusive_rows(&m, &b, &d);
    }

    #[test]
    fn test_promoted_label_column() {
        let (m, b, d) = detect(vec![
            vec![th("Name"), th("Age"), th("City")],
            vec![td("Alice"), td("30"), td("Oslo")],
            vec![td("Bob"), td("25"), td("Rome")],
        ]);
        assert_eq!(b.data_column_start, 1);
        assert_eq!(d.hierarchy_type, HierarchyType::SectionOnly);
        let titles: Vec<&str> = d.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Alice", "Bob"]);
        assert!(d.sections.iter().all(|s| s.is_virtual));
        assert_exclusive_rows(&m, &b, &d);
    }

    #[test]
    fn test_column_groups_split_section_only() {
        let rows: Vec<SourceRow> = vec![
            vec![th("Item").with_row_span(2), th("Size").with_col_span(2), th("Weight").with_row_span(2)],
            vec![th("W"), th("H")],
            vec![th("Box"), td("1"), td("2"), td("3")],
        ]
        .into_iter()
        .map(SourceRow::new)
        .collect();
        let matrix = CellMatrix::build(&rows);
        let boundaries = detect_boundaries(&matrix, 2);
        let info = build_column_info(&matrix, &boundaries);
        let mut detection = detect_sections(&matrix, &boundaries, false);
        assert_eq!(detection.hierarchy_type, HierarchyType::SectionOnly);

        apply_column_groups(&mut detection, &info);
        let subtitles = &detection.sections[0].subtitles;
        assert_eq!(subtitles.len(), 2);
        assert_eq!(subtitles[0].title, "Size");
        assert_eq!(subtitles[0].columns, Some(ColumnRange::new(1, 2)));
        assert_eq!(subtitles[1].sublabels[0].columns, Some(ColumnRange::new(3, 3)));
        assert!(subtitles[1].sublabels[0].structural_only);
    }

    #[test]
    fn test_flat_header_does_not_split() {
        let rows: Vec<SourceRow> = vec![
            vec![th("Item"), th("Min"), th("Max")],
            vec![th("Power"), td("10"), td("20")],
        ]
        .into_iter()
        .map(SourceRow::new)
        .collect();
        let matrix = CellMatrix::build(&rows);
        let boundaries = detect_boundaries(&matrix, 2);
        let info = build_column_info(&matrix, &boundaries);
        assert_eq!(info.top_level_headers.len(), 2);
        let mut detection = detect_sections(&matrix, &boundaries, false);

        apply_column_groups(&mut detection, &info);
        let subtitles = &detection.sections[0].subtitles;
        assert_eq!(subtitles.len(), 1);
        assert_eq!(subtitles[0].title, "Power");
        assert_eq!(subtitles[0].sublabels[0].columns, None);
    }

    #[test]
    fn test_no_data_rows() {
        let (_, _, d) = detect(vec![vec![th("A"), th("B")]]);
        assert!(d.sections.is_empty());
    }

    #[test]
    fn test_uncovered_runs() {
        let covered = [false, true, false, false, true];
        assert_eq!(uncovered_runs(0, 4, |r| covered[r]), vec![(0, 0), (2, 3)]);
        assert!(uncovered_runs(0, 1, |_| true).is_empty());
    }
}
