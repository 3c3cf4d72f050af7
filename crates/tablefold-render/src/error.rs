use thiserror::Error;

use tablefold_core::error::TableError;

/// Inconsistencies found while turning a structure into markup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("no column header path for data position {0}")]
    MissingColumnPath(usize),

    #[error("section {id:?} ends before it starts ({start}..{end})")]
    InvalidSection { id: String, start: usize, end: usize },

    #[error("sublabel {title:?} starts on row {row}, outside the table")]
    RowOutOfRange { title: String, row: usize },
}

impl From<RenderError> for TableError {
    fn from(e: RenderError) -> Self {
        TableError::Render(e.to_string())
    }
}
