//! Turning one shape into a font-space glyph outline.
//!
//! Each glyph gets an affine from source space into font space (shared
//! baseline and scale when an uppercase reference exists), its path data is
//! rewritten through that affine and parsed, cubic segments are reduced to
//! quadratic splines, and the closed contours become a `glyf` simple glyph.

use kurbo::{BezPath, CubicBez, PathEl, Point, Rect};
use thiserror::Error;
use write_fonts::tables::glyf::{MalformedPath, SimpleGlyph};

use crate::collect::ShapeGroup;
use crate::metrics::FontMetrics;
use crate::path_data::{transform_path, PathTransform};

/// Maximum deviation allowed when reducing a cubic to quadratics, in font
/// units.
pub const CURVE_TOLERANCE: f64 = 1.0;

/// Horizontal padding added to every drawn glyph's advance width.
const ADVANCE_PADDING: u32 = 80;

pub const NOTDEF_ADVANCE: u16 = 500;
pub const SPACE_ADVANCE: u16 = 250;
/// Advance used when a character has no drawable geometry.
pub const FALLBACK_ADVANCE: u16 = 400;

/// A per-glyph geometry failure.
///
/// These are never fatal: the caller substitutes a placeholder glyph and
/// tallies the character as failed.
#[derive(Debug, Error)]
pub enum GlyphError {
    #[error("bounding box has no area")]
    DegenerateBounds,
    #[error("unparseable outline: {0}")]
    BadPathData(#[from] kurbo::SvgParseError),
    #[error("no quadratic approximation within tolerance")]
    CurveReduction,
    #[error("malformed contours: {0:?}")]
    BadContours(MalformedPath),
}

/// Draws one shape as a simple glyph, returning the outline and its advance
/// width.
pub fn draw_glyph(
    shape: &ShapeGroup,
    metrics: &FontMetrics,
) -> Result<(SimpleGlyph, u16), GlyphError> {
    let bbox = shape.bbox();
    if bbox.width() <= 0.0 || bbox.height() <= 0.0 {
        return Err(GlyphError::DegenerateBounds);
    }
    let (transform, advance) = glyph_transform(bbox, metrics);
    let combined = shape
        .paths()
        .iter()
        .map(|d| transform_path(d, transform))
        .collect::<Vec<_>>()
        .join(" ");
    let outline = BezPath::from_svg(&combined)?;
    let outline = to_quadratic(&outline, CURVE_TOLERANCE)?;
    let glyph = SimpleGlyph::from_bezpath(&outline).map_err(GlyphError::BadContours)?;
    Ok((glyph, advance))
}

/// The affine from this shape's source box into font space, plus the advance
/// width it implies.
///
/// With an uppercase reference every glyph shares one scale
/// (`ascender / cap_height`) and one baseline; without one the glyph's own
/// box is stretched over the full ascender-to-descender span and its bottom
/// edge becomes the baseline. Vertical scale is always the negative of the
/// horizontal scale: source y grows downward, font y upward.
pub(crate) fn glyph_transform(bbox: Rect, metrics: &FontMetrics) -> (PathTransform, u16) {
    let (scale, ty) = match metrics.reference() {
        Some(reference) => {
            let scale = metrics.ascender as f64 / reference.cap_height;
            (scale, reference.baseline_y * scale)
        }
        None => {
            let scale = (metrics.ascender - metrics.descender) as f64 / bbox.height();
            (scale, metrics.ascender as f64 + bbox.y0 * scale)
        }
    };
    let transform = PathTransform::new(scale, -scale, -bbox.x0 * scale, ty);
    let advance = ((bbox.width() * scale) as u32 + ADVANCE_PADDING).min(u16::MAX as u32) as u16;
    (transform, advance)
}

/// Rewrites an outline so it contains only line and quadratic segments, and
/// explicitly closes every contour. Direction and contour order are
/// preserved.
fn to_quadratic(path: &BezPath, tolerance: f64) -> Result<BezPath, GlyphError> {
    let mut out = BezPath::new();
    let mut start = Point::ZERO;
    let mut current = Point::ZERO;
    let mut open = false;
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                if open {
                    out.close_path();
                }
                out.move_to(p);
                start = p;
                current = p;
                open = true;
            }
            PathEl::LineTo(p) => {
                out.line_to(p);
                current = p;
            }
            PathEl::QuadTo(c, p) => {
                out.quad_to(c, p);
                current = p;
            }
            PathEl::CurveTo(c0, c1, p) => {
                let cubic = CubicBez::new(current, c0, c1, p);
                let spline = cubic
                    .approx_spline(tolerance)
                    .ok_or(GlyphError::CurveReduction)?;
                for quad in spline.to_quads() {
                    out.quad_to(quad.p1, quad.p2);
                }
                current = p;
            }
            PathEl::ClosePath => {
                out.close_path();
                current = start;
                open = false;
            }
        }
    }
    if open {
        out.close_path();
    }
    Ok(out)
}

/// Minimal closed square substituted for ".notdef", the space, characters
/// with no shape, and characters whose geometry failed to draw. Every glyph
/// slot carries valid outline data even when it is meant to be invisible.
pub fn placeholder_glyph() -> SimpleGlyph {
    let mut path = BezPath::new();
    path.move_to((0.0, 0.0));
    path.line_to((1.0, 0.0));
    path.line_to((1.0, 1.0));
    path.line_to((0.0, 1.0));
    path.close_path();
    SimpleGlyph::from_bezpath(&path).unwrap()
}
