//! Structural analysis of HTML tables.
//!
//! Stages, in order: title-row exclusion, cell matrix, header/data
//! boundaries, column header hierarchy, row hierarchy (sections, subtitles,
//! sublabels) and data-cell assignment. [`analyze_table`] runs them all.

pub mod analyze;
pub mod boundary;
pub mod column_hierarchy;
pub mod data_cells;
pub mod matrix;
pub mod sections;
pub mod title_row;

pub use analyze::{analyze_table, AnalysisOptions};
