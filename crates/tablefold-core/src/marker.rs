//! Conversion markers: which strategy a table is converted with.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TableError;

/// Conversion strategy requested for a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarkerKind {
    #[default]
    Accordion,
    CarouselHorizontal,
    CarouselVertical,
    List,
    ListAccordion,
    NoConversion,
    NoShow,
}

impl MarkerKind {
    pub const ALL: [MarkerKind; 7] = [
        MarkerKind::Accordion,
        MarkerKind::CarouselHorizontal,
        MarkerKind::CarouselVertical,
        MarkerKind::List,
        MarkerKind::ListAccordion,
        MarkerKind::NoConversion,
        MarkerKind::NoShow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerKind::Accordion => "accordion",
            MarkerKind::CarouselHorizontal => "carousel-horizontal",
            MarkerKind::CarouselVertical => "carousel-vertical",
            MarkerKind::List => "list",
            MarkerKind::ListAccordion => "list-accordion",
            MarkerKind::NoConversion => "no-conversion",
            MarkerKind::NoShow => "no-show",
        }
    }

    /// Whether this kind goes through structural analysis.
    pub fn is_accordion_class(&self) -> bool {
        matches!(self, MarkerKind::Accordion | MarkerKind::ListAccordion)
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarkerKind {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_ascii_lowercase().replace('_', "-");
        MarkerKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == token)
            .ok_or_else(|| TableError::UnknownMarker(s.to_string()))
    }
}

/// Where a table's conversion kind came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    /// Read from the table itself.
    Explicit { table_index: usize, text: String },
    /// No marker on the table; the session default applies.
    Default { text: String },
}

impl Marker {
    pub fn text(&self) -> &str {
        match self {
            Marker::Explicit { text, .. } | Marker::Default { text } => text,
        }
    }

    pub fn is_explicit(&self) -> bool {
        matches!(self, Marker::Explicit { .. })
    }

    /// Resolve the marker to a kind, falling back to `default` for unknown tokens.
    pub fn kind(&self, default: MarkerKind) -> MarkerKind {
        match self.text().parse::<MarkerKind>() {
            Ok(kind) => kind,
            Err(e) => {
                log::warn!("{}; using {}", e, default);
                default
            }
        }
    }
}
