//! Ordering discovered shapes into reading order and assigning them to the
//! requested characters.

use crate::collect::ShapeGroup;

/// Vertical bucket size for row detection, in source units. Hand-exported
/// character grids are rarely pixel-aligned; quantizing the row position
/// keeps sub-pixel jitter from reordering characters within a visual row.
pub const ROW_QUANTUM: f64 = 50.0;

/// Sorts shapes top row first, left to right within a row. The sort is
/// stable, so shapes landing in the same row at the same column keep their
/// discovery order.
pub fn sort_reading_order(mut shapes: Vec<ShapeGroup>) -> Vec<ShapeGroup> {
    shapes.sort_by(|a, b| {
        row_key(a)
            .total_cmp(&row_key(b))
            .then(a.column_position().total_cmp(&b.column_position()))
    });
    shapes
}

fn row_key(shape: &ShapeGroup) -> f64 {
    (shape.row_position() / ROW_QUANTUM).round() * ROW_QUANTUM
}

/// Zips shapes in reading order against the requested character sequence.
/// Characters beyond the shape count stay unassigned (the assembler gives
/// them placeholder glyphs); shapes beyond the character count are
/// discarded.
pub fn assign_characters(
    shapes: Vec<ShapeGroup>,
    characters: &[char],
) -> Vec<(char, Option<ShapeGroup>)> {
    let mut shapes = shapes.into_iter();
    characters.iter().map(|&ch| (ch, shapes.next())).collect()
}
