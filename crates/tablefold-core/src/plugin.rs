//! Plugin traits for table sources and table converters.

use std::ops::Range;

use crate::error::Result;
use crate::marker::{Marker, MarkerKind};
use crate::options::ConversionOptions;
use crate::table::SourceTable;

/// Progress reporter callback type.
pub type ProgressReporter = Box<dyn Fn(f64, &str) + Send + Sync>;

/// A table found in a document.
#[derive(Debug, Clone)]
pub struct LocatedTable {
    /// Position among the document's top-level tables.
    pub index: usize,
    /// Byte range of the table's markup in the document.
    pub span: Range<usize>,
    pub table: SourceTable,
    pub marker: Marker,
}

/// Finds tables in a document and reads them into the IR.
pub trait TableSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Locate every top-level table in `document`, in document order.
    ///
    /// Tables that cannot be read are skipped rather than failing the whole document.
    fn locate(&self, document: &str, options: &ConversionOptions) -> Result<Vec<LocatedTable>>;
}

/// Per-table information handed to a converter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionContext {
    /// Session-wide sequence number of this conversion.
    pub sequence: usize,
    pub kind: MarkerKind,
    /// Prefix for every DOM id the converter emits.
    pub id_prefix: String,
}

impl ConversionContext {
    pub fn new(sequence: usize, kind: MarkerKind) -> Self {
        Self {
            sequence,
            kind,
            id_prefix: format!("tf-{}", sequence),
        }
    }
}

/// Converts one table into mobile markup.
pub trait TableConverter: Send + Sync {
    /// Human-readable name of this converter.
    fn name(&self) -> &str;

    /// Whether this converter implements the given marker kind.
    fn handles(&self, kind: MarkerKind) -> bool;

    /// Produce replacement markup, or `None` to leave the table untouched.
    fn convert(
        &self,
        table: &SourceTable,
        context: &ConversionContext,
        options: &ConversionOptions,
    ) -> Result<Option<String>>;
}
