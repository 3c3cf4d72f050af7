//! Core types for tablefold: the source-table IR, the structural model,
//! markers, options, plugin traits and the conversion session.

pub mod error;
pub mod marker;
pub mod options;
pub mod plugin;
pub mod session;
pub mod structure;
pub mod table;
