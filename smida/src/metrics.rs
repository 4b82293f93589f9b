//! Shared design metrics for one font build.

use log::debug;

use crate::collect::ShapeGroup;

/// Default design grid.
pub const UNITS_PER_EM: u16 = 1000;
/// Typographic ascent in font units; the uppercase reference height maps
/// onto this.
pub const ASCENDER: i16 = 800;
/// Typographic descent in font units (negative, below the baseline).
pub const DESCENDER: i16 = -200;
pub const LINE_GAP: i16 = 0;
pub const CAP_HEIGHT: i16 = 700;
pub const X_HEIGHT: i16 = 500;

/// Uppercase-derived reference frame, in source coordinates.
#[derive(Clone, Copy, Debug)]
pub struct Reference {
    /// Mean bounding-box height of the assigned uppercase Latin letters.
    pub cap_height: f64,
    /// Mean bounding-box bottom edge of those letters. Text rests on its
    /// lower bound in y-down source space, so this is the line that maps to
    /// font-space zero.
    pub baseline_y: f64,
}

/// Read-only metric context for a single build.
///
/// Computed once from the character assignment and threaded into every
/// glyph, so all characters share one scale and one baseline instead of
/// each normalizing to its own bounding box. Concurrent builds each get
/// their own context.
#[derive(Clone, Debug)]
pub struct FontMetrics {
    pub units_per_em: u16,
    pub ascender: i16,
    pub descender: i16,
    reference: Option<Reference>,
}

impl FontMetrics {
    pub fn new<'a>(
        units_per_em: u16,
        assigned: impl IntoIterator<Item = (char, &'a ShapeGroup)>,
    ) -> FontMetrics {
        let mut heights = Vec::new();
        let mut baselines = Vec::new();
        for (ch, shape) in assigned {
            if ch.is_ascii_uppercase() {
                let bbox = shape.bbox();
                heights.push(bbox.height());
                baselines.push(bbox.y1);
            }
        }
        let reference = match mean(&heights).zip(mean(&baselines)) {
            Some((cap_height, baseline_y)) if cap_height > 0.0 => {
                debug!("reference cap height {cap_height:.1}, source baseline y {baseline_y:.2}");
                Some(Reference {
                    cap_height,
                    baseline_y,
                })
            }
            _ => None,
        };
        FontMetrics {
            units_per_em,
            ascender: ASCENDER,
            descender: DESCENDER,
            reference,
        }
    }

    /// The uppercase reference frame, when at least one uppercase Latin
    /// letter with a usable bounding box was assigned.
    pub fn reference(&self) -> Option<Reference> {
        self.reference
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}
