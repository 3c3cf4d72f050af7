//! Shared helpers: HTML escaping and building, text normalisation, input decoding.

pub mod encoding;
pub mod html;
