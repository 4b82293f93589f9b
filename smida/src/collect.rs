//! Discovering candidate character shapes in a source document.

use kurbo::Rect;
use log::debug;

use crate::dom::Node;
use crate::path_data;

/// One discovered shape intended to represent a single character: the path
/// data of one visual unit, the group's declared translation when the source
/// had one, and the positional-pair bounding box of the paths.
#[derive(Clone, Debug)]
pub struct ShapeGroup {
    paths: Vec<String>,
    offset: Option<(f64, f64)>,
    bbox: Rect,
}

impl ShapeGroup {
    /// Returns `None` when no coordinate pair is discoverable in `paths`;
    /// such a group cannot be laid out or drawn and is dropped.
    pub(crate) fn new(paths: Vec<String>, offset: Option<(f64, f64)>) -> Option<ShapeGroup> {
        let bbox = path_data::approx_bbox(paths.iter().map(String::as_str))?;
        Some(ShapeGroup {
            paths,
            offset,
            bbox,
        })
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn offset(&self) -> Option<(f64, f64)> {
        self.offset
    }

    pub fn bbox(&self) -> Rect {
        self.bbox
    }

    /// Vertical layout position: the declared translation when present, else
    /// the bounding box's top edge.
    pub(crate) fn row_position(&self) -> f64 {
        self.offset.map(|(_, ty)| ty).unwrap_or(self.bbox.y0)
    }

    /// Horizontal layout position, same preference order.
    pub(crate) fn column_position(&self) -> f64 {
        self.offset.map(|(tx, _)| tx).unwrap_or(self.bbox.x0)
    }
}

/// Discovers character shapes, preferring translation-declared groups and
/// falling back to plain grouping when the document declares none.
pub fn collect_shapes(root: &Node) -> Vec<ShapeGroup> {
    let shapes = collect_translated(root);
    if !shapes.is_empty() {
        debug!("found {} translation-grouped shapes", shapes.len());
        return shapes;
    }
    let shapes = collect_grouped(root);
    debug!("found {} shapes via grouping fallback", shapes.len());
    shapes
}

/// First strategy: a group that declares a 2-D translation and contains at
/// least one path is one character. Its subtree is not searched further;
/// nested groups belong to the same character.
pub fn collect_translated(root: &Node) -> Vec<ShapeGroup> {
    let mut shapes = Vec::new();
    walk_translated(root, &mut shapes);
    shapes
}

fn walk_translated(node: &Node, shapes: &mut Vec<ShapeGroup>) {
    if let Node::Group {
        translate: Some(offset),
        ..
    } = node
    {
        let paths = gather_path_data(node);
        if !paths.is_empty() {
            shapes.extend(ShapeGroup::new(paths, Some(*offset)));
            return;
        }
    }
    for child in node.children() {
        walk_translated(child, shapes);
    }
}

/// Fallback strategy: every group containing at least one path is one
/// character, with no declared offset.
pub fn collect_grouped(root: &Node) -> Vec<ShapeGroup> {
    let mut shapes = Vec::new();
    walk_grouped(root, &mut shapes);
    shapes
}

fn walk_grouped(node: &Node, shapes: &mut Vec<ShapeGroup>) {
    if let Node::Group { .. } = node {
        let paths = gather_path_data(node);
        if !paths.is_empty() {
            shapes.extend(ShapeGroup::new(paths, None));
            return;
        }
    }
    for child in node.children() {
        walk_grouped(child, shapes);
    }
}

fn gather_path_data(node: &Node) -> Vec<String> {
    fn gather(node: &Node, out: &mut Vec<String>) {
        if let Node::Path { data } = node {
            if !data.is_empty() {
                out.push(data.clone());
            }
        }
        for child in node.children() {
            gather(child, out);
        }
    }
    let mut out = Vec::new();
    gather(node, &mut out);
    out
}
