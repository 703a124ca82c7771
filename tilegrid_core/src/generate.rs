use anyhow::bail;
use std::collections::BTreeSet;

use crate::sizes::{SizeClass, smallest_class};
use crate::{GridItem, GridModel, Origin, Span};

/// Produce the initial arrangement for a surface: one tile per id, placed
/// in input order, left-to-right and top-to-bottom, with a size class drawn
/// from the catalog for each tile.
///
/// The draw is pseudo-random; passing the same `seed` reproduces the same
/// model exactly. Without a seed the shapes vary from run to run.
///
/// A drawn class wider than the grid is replaced by the catalog's smallest
/// entry for that tile (the draw still consumes one RNG step, so seeded
/// sequences stay stable across catalogs).
pub fn generate_layout(
    ids: &[String],
    total_cols: u32,
    catalog: &[SizeClass],
    seed: Option<u64>,
) -> anyhow::Result<GridModel> {
    if total_cols == 0 {
        bail!("grid needs at least one column");
    }
    let Some(fallback) = smallest_class(catalog) else {
        bail!("size-class catalog is empty");
    };
    if fallback.span.col_span > total_cols {
        bail!("no size class fits a {} column grid", total_cols);
    }
    for class in catalog {
        if class.span.col_span == 0 || class.span.row_span == 0 {
            bail!("size class '{}' has an empty span", class.name);
        }
    }

    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id.as_str()) {
            bail!("duplicate item id '{}'", id);
        }
    }

    let mut rng = match seed {
        Some(s) => fastrand::Rng::with_seed(s),
        None => fastrand::Rng::new(),
    };

    let mut model = GridModel::new(total_cols);
    let mut cursor = Origin { col: 0, row: 0 };

    for id in ids {
        let drawn = &catalog[rng.usize(..catalog.len())];
        let span = if drawn.span.col_span > total_cols {
            fallback.span
        } else {
            drawn.span
        };

        let origin = first_fit(&model, cursor, span);
        cursor = Origin {
            col: origin.col + span.col_span,
            row: origin.row,
        };
        model.items.push(GridItem::new(id.clone(), origin, span));
    }

    Ok(model)
}

/// First free position at or after `from`, scanning columns then wrapping
/// to the next row. A plain `(0, row+1)` wrap is not enough once row spans
/// exceed 1: a tall tile's lower rows are already taken, so each candidate
/// cell is checked against everything placed so far.
fn first_fit(model: &GridModel, from: Origin, span: Span) -> Origin {
    let mut col = from.col;
    let mut row = from.row;

    loop {
        if col + span.col_span > model.total_cols {
            col = 0;
            row += 1;
            continue;
        }
        let candidate = GridItem::new("", Origin { col, row }, span);
        if !model.items.iter().any(|it| it.overlaps(&candidate)) {
            return Origin { col, row };
        }
        col += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sizes::default_size_classes;

    fn ids(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("t{i}")).collect()
    }

    #[test]
    fn same_seed_gives_identical_models() -> anyhow::Result<()> {
        let ids = ids(8);
        let catalog = default_size_classes();
        let a = generate_layout(&ids, 4, &catalog, Some(42))?;
        let b = generate_layout(&ids, 4, &catalog, Some(42))?;
        assert_eq!(a, b);
        Ok(())
    }

    #[test]
    fn eleven_items_on_four_columns() -> anyhow::Result<()> {
        let ids = ids(11);
        let m = generate_layout(&ids, 4, &default_size_classes(), Some(7))?;
        assert_eq!(m.items.len(), 11);
        m.validate()?;
        assert!(m.total_rows() >= 3);
        Ok(())
    }

    #[test]
    fn every_seed_yields_a_valid_model() -> anyhow::Result<()> {
        let ids = ids(13);
        let catalog = default_size_classes();
        for seed in 0..32 {
            let m = generate_layout(&ids, 4, &catalog, Some(seed))?;
            assert_eq!(m.items.len(), 13);
            m.validate()?;
        }
        Ok(())
    }

    #[test]
    fn tall_tiles_never_collide_after_wrap() -> anyhow::Result<()> {
        // Single 1x2 class on 2 columns: the third tile must skip the rows
        // still covered by the first two, not land back on (0, 1).
        let catalog = vec![SizeClass::new("tall", 1, 2)];
        let m = generate_layout(&ids(3), 2, &catalog, Some(0))?;
        m.validate()?;
        assert_eq!(m.items[0].origin, Origin { col: 0, row: 0 });
        assert_eq!(m.items[1].origin, Origin { col: 1, row: 0 });
        assert_eq!(m.items[2].origin, Origin { col: 0, row: 2 });
        Ok(())
    }

    #[test]
    fn too_wide_class_falls_back_to_smallest() -> anyhow::Result<()> {
        let catalog = vec![
            SizeClass::new("banner", 6, 1),
            SizeClass::new("small", 1, 1),
        ];
        let m = generate_layout(&ids(10), 4, &catalog, Some(3))?;
        m.validate()?;
        // "banner" can never fit, so every tile must come out 1x1
        assert!(
            m.items
                .iter()
                .all(|it| it.span.col_span == 1 && it.span.row_span == 1)
        );
        Ok(())
    }

    #[test]
    fn no_class_fits_is_an_error() {
        let catalog = vec![SizeClass::new("banner", 6, 1)];
        assert!(generate_layout(&ids(2), 4, &catalog, Some(0)).is_err());
    }

    #[test]
    fn empty_id_list_gives_empty_model() -> anyhow::Result<()> {
        let m = generate_layout(&[], 4, &default_size_classes(), Some(0))?;
        assert!(m.items.is_empty());
        assert_eq!(m.total_rows(), 0);
        Ok(())
    }

    #[test]
    fn zero_columns_is_an_error() {
        assert!(generate_layout(&ids(1), 0, &default_size_classes(), Some(0)).is_err());
    }

    #[test]
    fn empty_catalog_is_an_error() {
        assert!(generate_layout(&ids(1), 4, &[], Some(0)).is_err());
    }

    #[test]
    fn duplicate_ids_are_an_error() {
        let ids = vec!["a".to_string(), "a".to_string()];
        assert!(generate_layout(&ids, 4, &default_size_classes(), Some(0)).is_err());
    }

    #[test]
    fn single_column_stacks_everything() -> anyhow::Result<()> {
        // On 1 column the wide classes fall back and tiles stack vertically.
        let m = generate_layout(&ids(5), 1, &default_size_classes(), Some(9))?;
        m.validate()?;
        assert!(m.items.iter().all(|it| it.origin.col == 0));
        Ok(())
    }
}
