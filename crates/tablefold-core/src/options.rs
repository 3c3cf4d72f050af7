//! Conversion options shared across the session.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TableError};
use crate::marker::MarkerKind;

/// All options controlling table conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    // -- General --
    pub verbose: u8,
    /// Run per-table analysis on the rayon pool.
    pub parallel: bool,

    // -- Viewport --
    /// Viewport width (px) below which tables are converted.
    pub breakpoint: u32,

    // -- Markers --
    pub default_marker: MarkerKind,
    /// Table attribute holding an explicit marker token.
    pub marker_attribute: String,

    // -- Analysis --
    /// Share of the table width a lone first-row cell must span to be a title row.
    pub title_row_ratio: f64,
    /// Largest distance (in columns) the data boundary is snapped to a header boundary.
    pub boundary_snap_distance: usize,
    /// Promote a first column of label-like data cells to section headers.
    pub promote_label_column: bool,

    // -- Rendering --
    pub id_strategy: IdStrategy,
    pub id_prefix: String,
    pub expand_first_section: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            verbose: 0,
            parallel: true,
            breakpoint: 768,
            default_marker: MarkerKind::Accordion,
            marker_attribute: "data-tablefold".to_string(),
            title_row_ratio: 0.7,
            boundary_snap_distance: 2,
            promote_label_column: true,
            id_strategy: IdStrategy::Sequential,
            id_prefix: "tf".to_string(),
            expand_first_section: false,
        }
    }
}

impl ConversionOptions {
    /// Reject settings the analysis cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.title_row_ratio > 0.0 && self.title_row_ratio <= 1.0) {
            return Err(TableError::Config(format!(
                "title_row_ratio must be in (0, 1], got {}",
                self.title_row_ratio
            )));
        }
        if self.marker_attribute.trim().is_empty() {
            return Err(TableError::Config("marker_attribute must not be empty".to_string()));
        }
        if self.breakpoint == 0 {
            return Err(TableError::Config("breakpoint must be positive".to_string()));
        }
        Ok(())
    }
}

/// How DOM ids in rendered markup are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdStrategy {
    /// Prefix plus the table's sequence number; identical input gives identical output.
    #[default]
    Sequential,
    /// Prefix plus a random v4 UUID per table.
    Uuid,
}

/// Viewport state supplied by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewMode {
    Narrow,
    Wide,
}

impl ViewMode {
    pub fn from_width(width: u32, breakpoint: u32) -> Self {
        if width < breakpoint {
            ViewMode::Narrow
        } else {
            ViewMode::Wide
        }
    }
}
