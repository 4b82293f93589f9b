//! Building font files from vector glyph art.
//!
//! Takes an SVG document containing one drawn shape per character (the way
//! design tools export a lettering sheet) and compiles a TrueType font from
//! it:
//!
//! 1. [`dom`] parses the XML into a typed node tree.
//! 2. [`collect`] discovers per-character shape groups.
//! 3. [`layout`] sorts them into reading order and assigns the requested
//!    characters positionally.
//! 4. [`glyph`] moves each shape into font space on a shared baseline and
//!    reduces its curves to the quadratic segments `glyf` requires.
//! 5. [`build`] assembles the character map, metrics and name tables and
//!    delegates binary packing to [`write_fonts::FontBuilder`].
//!
//! Geometry that cannot be drawn never aborts a build; affected characters
//! get placeholder glyphs and are tallied in the returned summary.

mod error;

pub mod build;
pub mod collect;
pub mod dom;
pub mod glyph;
pub mod layout;
pub mod metrics;
pub mod path_data;

pub use build::{
    build_font, compile_font, BuildArtifacts, BuildOptions, BuildSummary, CompiledFont,
    DEFAULT_CHAR_ORDER,
};
pub use error::BuildError;
