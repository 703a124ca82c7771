use serde::{Deserialize, Serialize};

use crate::GridItem;

/// Reading direction of the surface. Rtl mirrors columns so the first
/// tiles still sit at the reading-start edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Ltr,
    Rtl,
}

/// Pixel box for one tile, ready for a renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// Pixel width of the whole grid: `total_cols` cells plus the gaps between
/// them. Also the axis Rtl mirrors around.
pub fn grid_width(total_cols: u32, cell_w: f32, gap: f32) -> f32 {
    span_px(total_cols, cell_w, gap)
}

/// Pixel height of `total_rows` rows.
pub fn grid_height(total_rows: u32, cell_h: f32, gap: f32) -> f32 {
    span_px(total_rows, cell_h, gap)
}

/// Map a tile's grid coordinates to its pixel box.
///
/// Pure and stateless: identical inputs give bit-identical output, which
/// the layout-stability tests rely on.
pub fn map_to_pixels(
    item: &GridItem,
    total_cols: u32,
    cell_w: f32,
    cell_h: f32,
    gap: f32,
    dir: Direction,
) -> Rect {
    let col = match dir {
        Direction::Ltr => item.origin.col,
        // flip around the grid's full width
        Direction::Rtl => total_cols - item.origin.col - item.span.col_span,
    };

    Rect {
        left: col as f32 * (cell_w + gap),
        top: item.origin.row as f32 * (cell_h + gap),
        width: span_px(item.span.col_span, cell_w, gap),
        height: span_px(item.span.row_span, cell_h, gap),
    }
}

/// `n` cells plus the `n - 1` gaps between them, 0 when `n` is 0.
fn span_px(n: u32, cell: f32, gap: f32) -> f32 {
    if n == 0 {
        return 0.0;
    }
    n as f32 * cell + (n - 1) as f32 * gap
}
