use anyhow::Context;
use tracing::debug;

use crate::{GridItem, GridModel, Origin};

/// Apply a drop gesture: move `item_id` to the target cell, leaving every
/// other tile where it is. This is a displacement, not a re-flow; nothing
/// gets pushed aside or swapped.
///
/// The target is clamped into the grid (a drag can end past an edge, so
/// the host passes raw, possibly negative cells). A clamped target that
/// would overlap another tile rejects the move: the returned model equals
/// the input, which is also how a zero-delta drop comes back. Callers
/// compare models to decide whether anything actually changed before
/// persisting.
///
/// An id that is not in the model is a contract violation and fails; the
/// host is holding a stale reference.
pub fn reorder(
    model: &GridModel,
    item_id: &str,
    target_col: i32,
    target_row: i32,
) -> anyhow::Result<GridModel> {
    let idx = model
        .items
        .iter()
        .position(|it| it.id == item_id)
        .with_context(|| format!("unknown item id '{item_id}'"))?;
    let item = &model.items[idx];

    let max_col = model.total_cols.saturating_sub(item.span.col_span);
    let origin = Origin {
        col: target_col.clamp(0, max_col as i32) as u32,
        row: target_row.max(0) as u32,
    };

    if origin == item.origin {
        return Ok(model.clone());
    }

    let moved = GridItem {
        origin,
        ..item.clone()
    };
    let blocked = model
        .items
        .iter()
        .enumerate()
        .any(|(i, other)| i != idx && moved.overlaps(other));
    if blocked {
        debug!(
            item = item_id,
            col = origin.col,
            row = origin.row,
            "move rejected: target overlaps another tile"
        );
        return Ok(model.clone());
    }

    let mut next = model.clone();
    next.items[idx] = moved;
    Ok(next)
}
