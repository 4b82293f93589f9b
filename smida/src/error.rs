//! Errors that end a font build.

use thiserror::Error;
use write_fonts::tables::cmap::CmapConflict;

/// A fatal build failure.
///
/// Per-glyph geometry problems never appear here: they are absorbed into
/// placeholder glyphs and surface only in the build summary tally, so a
/// font with some bad glyphs is still delivered.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Nothing in the source document looked like a character shape.
    #[error("no character shapes found in the source document")]
    NoShapes,
    #[error("conflicting character map entry: {0}")]
    Cmap(#[from] CmapConflict),
    #[error("table compilation failed: {0}")]
    Compile(#[from] write_fonts::error::Error),
    #[error("could not serialize the build summary: {0}")]
    Summary(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
