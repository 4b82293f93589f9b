//! A typed view of an SVG document.
//!
//! Shape discovery only cares about three kinds of node, so the XML tree is
//! folded into a small polymorphic variant up front and the collector works
//! structurally instead of string-matching tag names.

use kurbo::Rect;
use regex::Regex;
use thiserror::Error;

/// One node of the source document.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// A grouping element, possibly carrying a declared 2-D translation.
    Group {
        translate: Option<(f64, f64)>,
        children: Vec<Node>,
    },
    /// A path element and its raw `d` data.
    Path { data: String },
    /// Anything else we may still need to descend through.
    Other { children: Vec<Node> },
}

impl Node {
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Group { children, .. } | Node::Other { children } => children,
            Node::Path { .. } => &[],
        }
    }
}

/// An error produced when reading the source document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid XML: {0}")]
    Xml(#[from] roxmltree::Error),
}

/// A parsed source document: the typed node tree plus its declared extent.
#[derive(Clone, Debug)]
pub struct Document {
    root: Node,
    view_box: Rect,
}

impl Document {
    /// Parse SVG XML text.
    ///
    /// Tag names are matched without regard to namespace prefixes, the way
    /// design tools export them.
    pub fn parse(xml: &str) -> Result<Document, DocumentError> {
        let doc = roxmltree::Document::parse(xml)?;
        let root_element = doc.root_element();
        Ok(Document {
            view_box: parse_view_box(root_element),
            root: convert(root_element),
        })
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// The declared `viewBox`, or a rectangle from the width/height
    /// attributes (1000 x 1000 when those are missing too). Diagnostic only;
    /// glyph scaling derives from the shapes themselves.
    pub fn view_box(&self) -> Rect {
        self.view_box
    }
}

fn convert(node: roxmltree::Node) -> Node {
    let children = || {
        node.children()
            .filter(|child| child.is_element())
            .map(convert)
            .collect()
    };
    match node.tag_name().name() {
        "g" => Node::Group {
            translate: parse_translate(node.attribute("transform")),
            children: children(),
        },
        "path" => Node::Path {
            data: node.attribute("d").unwrap_or_default().to_string(),
        },
        _ => Node::Other {
            children: children(),
        },
    }
}

/// Extracts a `translate(x, y)` component from a transform attribute.
/// Single-argument translations and other transform kinds read as no
/// declared offset.
fn parse_translate(transform: Option<&str>) -> Option<(f64, f64)> {
    let transform = transform?;
    let re = Regex::new(r"translate\(([^,)]+),\s*([^)]+)\)").unwrap();
    let caps = re.captures(transform)?;
    let x = caps[1].trim().parse().ok()?;
    let y = caps[2].trim().parse().ok()?;
    Some((x, y))
}

fn parse_view_box(root: roxmltree::Node) -> Rect {
    if let Some(view_box) = root.attribute("viewBox") {
        let parts: Vec<f64> = view_box
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .filter_map(|part| part.parse().ok())
            .collect();
        if let [x, y, w, h] = parts[..] {
            return Rect::new(x, y, x + w, y + h);
        }
    }
    let w = dimension(root.attribute("width"));
    let h = dimension(root.attribute("height"));
    Rect::new(0.0, 0.0, w, h)
}

/// Reads a length attribute, shedding units ("512px" reads as 512).
fn dimension(attr: Option<&str>) -> f64 {
    attr.map(|value| {
        value
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect::<String>()
    })
    .and_then(|digits| digits.parse().ok())
    .unwrap_or(1000.0)
}
