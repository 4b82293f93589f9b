//! Parsing and transforming SVG path data strings.
//!
//! Glyph sources arrive as raw `d` attribute strings. Rather than building a
//! full geometry model up front, coordinates are remapped textually and the
//! result is handed to [`kurbo::BezPath::from_svg`] once a glyph's outlines
//! have been moved into font space.

use kurbo::Rect;
use regex::Regex;

/// Scale and offset applied to path coordinates.
///
/// Maps `x` to `x * sx + tx` and `y` to `y * sy + ty`. Vertical scale is
/// negative when flipping from y-down source space into y-up font space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathTransform {
    pub sx: f64,
    pub sy: f64,
    pub tx: f64,
    pub ty: f64,
}

impl PathTransform {
    pub const IDENTITY: PathTransform = PathTransform::new(1.0, 1.0, 0.0, 0.0);

    pub const fn new(sx: f64, sy: f64, tx: f64, ty: f64) -> Self {
        PathTransform { sx, sy, tx, ty }
    }

    fn apply_x(&self, x: f64) -> f64 {
        x * self.sx + self.tx
    }

    fn apply_y(&self, y: f64) -> f64 {
        y * self.sy + self.ty
    }
}

const NUMBER: &str = r"[-+]?\d*\.?\d+(?:[eE][-+]?\d+)?";

fn tokenize(d: &str) -> Vec<&str> {
    let re = Regex::new(&format!("[A-Za-z]|{NUMBER}")).unwrap();
    re.find_iter(d).map(|m| m.as_str()).collect()
}

fn is_command(token: &str) -> bool {
    token.len() == 1 && token.as_bytes()[0].is_ascii_alphabetic()
}

/// Reads up to `n` numeric operands, stopping early at the next command
/// letter. Missing or malformed operands read as 0.0 so that a truncated
/// command still yields a usable glyph instead of aborting the build.
fn take(tokens: &[&str], idx: &mut usize, n: usize) -> Vec<f64> {
    let mut vals = Vec::with_capacity(n);
    for _ in 0..n {
        match tokens.get(*idx) {
            Some(token) if !is_command(token) => {
                vals.push(token.parse::<f64>().unwrap_or(0.0));
                *idx += 1;
            }
            _ => vals.push(0.0),
        }
    }
    vals
}

fn fmt(value: f64) -> String {
    format!("{value:.3}")
}

/// Re-emits path data with every coordinate remapped through `transform`.
///
/// Command letters keep their relative/absolute case; coordinate counts
/// follow the SVG command table (M/L/T one point, H/V one ordinate, C three
/// points, Q/S two points, A radii + rotation + flags + endpoint). Arc radii
/// are scaled and made non-negative, arc flags are emitted as integers, and
/// the rotation passes through untransformed. Numbers are formatted with
/// three decimal digits. Anything following a command this table does not
/// know passes through verbatim.
pub fn transform_path(d: &str, transform: PathTransform) -> String {
    let tokens = tokenize(d);
    let mut out: Vec<String> = Vec::with_capacity(tokens.len());
    let mut cmd = 'M';
    let mut idx = 0;

    while idx < tokens.len() {
        let token = tokens[idx];
        if is_command(token) {
            cmd = token.as_bytes()[0] as char;
            out.push(token.to_string());
            idx += 1;
            continue;
        }
        match cmd.to_ascii_uppercase() {
            'M' | 'L' | 'T' => {
                let v = take(&tokens, &mut idx, 2);
                out.push(fmt(transform.apply_x(v[0])));
                out.push(fmt(transform.apply_y(v[1])));
            }
            'H' => {
                let v = take(&tokens, &mut idx, 1);
                out.push(fmt(transform.apply_x(v[0])));
            }
            'V' => {
                let v = take(&tokens, &mut idx, 1);
                out.push(fmt(transform.apply_y(v[0])));
            }
            'C' => {
                let v = take(&tokens, &mut idx, 6);
                for point in v.chunks(2) {
                    out.push(fmt(transform.apply_x(point[0])));
                    out.push(fmt(transform.apply_y(point[1])));
                }
            }
            'Q' | 'S' => {
                let v = take(&tokens, &mut idx, 4);
                for point in v.chunks(2) {
                    out.push(fmt(transform.apply_x(point[0])));
                    out.push(fmt(transform.apply_y(point[1])));
                }
            }
            'A' => {
                let radii = take(&tokens, &mut idx, 2);
                let rotation = take(&tokens, &mut idx, 1)[0];
                let large_arc = take(&tokens, &mut idx, 1)[0];
                let sweep = take(&tokens, &mut idx, 1)[0];
                let to = take(&tokens, &mut idx, 2);
                out.push(fmt((radii[0] * transform.sx).abs()));
                out.push(fmt((radii[1] * transform.sy).abs()));
                out.push(fmt(rotation));
                out.push(format!("{}", large_arc as i64));
                out.push(format!("{}", sweep as i64));
                out.push(fmt(transform.apply_x(to[0])));
                out.push(fmt(transform.apply_y(to[1])));
            }
            // Z takes no operands; numbers stranded after it, or after a
            // command letter we don't recognize, pass through untouched.
            _ => {
                out.push(token.to_string());
                idx += 1;
            }
        }
    }
    out.join(" ")
}

/// Pairs the numeric tokens of a path string in order of appearance:
/// 1st+2nd number form one pair, 3rd+4th the next, and so on. A trailing
/// unpaired number is dropped.
///
/// This pays no attention to which command a number belongs to, so an arc's
/// rotation and flag operands shift the pairing. Shape discovery and row
/// bucketing depend on this cheap pairing as-is; the tests characterize the
/// arc case.
pub fn coordinate_pairs(d: &str) -> Vec<(f64, f64)> {
    let re = Regex::new(NUMBER).unwrap();
    let nums: Vec<f64> = re
        .find_iter(d)
        .filter_map(|m| m.as_str().parse().ok())
        .collect();
    nums.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect()
}

/// Bounding box over the coordinate pairs of every path string, or `None`
/// when no pair is discoverable.
pub fn approx_bbox<'a>(paths: impl IntoIterator<Item = &'a str>) -> Option<Rect> {
    let mut bounds: Option<Rect> = None;
    for d in paths {
        for (x, y) in coordinate_pairs(d) {
            bounds = Some(match bounds {
                None => Rect::new(x, y, x, y),
                Some(r) => Rect::new(r.x0.min(x), r.y0.min(y), r.x1.max(x), r.y1.max(y)),
            });
        }
    }
    bounds
}
