use thiserror::Error;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTML parsing error: {0}")]
    Html(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Unknown marker: {0}")]
    UnknownMarker(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, TableError>;
