use std::collections::BTreeSet;
use tracing::debug;

use crate::GridModel;
use crate::generate::generate_layout;
use crate::reorder::reorder;
use crate::sizes::SizeClass;
use crate::store::{LayoutStore, StorageBackend};

/// One mounted content surface: the current arrangement plus the store it
/// persists through. Hosts render `model` (via the mapper) and forward
/// completed drop gestures to `drag`; everything else is wiring.
#[derive(Debug)]
pub struct Surface<B: StorageBackend> {
    pub surface_id: String,
    pub model: GridModel,
    ids: Vec<String>,
    catalog: Vec<SizeClass>,
    store: LayoutStore<B>,
}

impl<B: StorageBackend> Surface<B> {
    /// Restore the surface's layout from the store, generating a fresh one
    /// when nothing usable is there. A stored layout also counts as
    /// unusable when its column count or id set no longer matches what the
    /// host is mounting; content comes and goes between sessions, and a
    /// stale arrangement would render orphan tiles.
    pub fn mount(
        store: LayoutStore<B>,
        surface_id: impl Into<String>,
        ids: &[String],
        total_cols: u32,
        catalog: Vec<SizeClass>,
        seed: Option<u64>,
    ) -> anyhow::Result<Self> {
        let surface_id = surface_id.into();

        let model = match store.load(&surface_id)? {
            Some(m) if m.total_cols == total_cols && same_ids(&m, ids) => m,
            Some(_) => {
                debug!(surface = %surface_id, "stored layout is stale, regenerating");
                generate_layout(ids, total_cols, &catalog, seed)?
            }
            None => {
                debug!(surface = %surface_id, "no stored layout, generating");
                generate_layout(ids, total_cols, &catalog, seed)?
            }
        };

        Ok(Self {
            surface_id,
            model,
            ids: ids.to_vec(),
            catalog,
            store,
        })
    }

    /// Apply a completed drop gesture. Returns whether the model changed;
    /// only an actual change is written back to the store, so rejected and
    /// zero-delta drops cost no writes.
    pub fn drag(
        &mut self,
        item_id: &str,
        target_col: i32,
        target_row: i32,
    ) -> anyhow::Result<bool> {
        let next = reorder(&self.model, item_id, target_col, target_row)?;
        if next == self.model {
            return Ok(false);
        }
        self.store.save(&self.surface_id, &next)?;
        self.model = next;
        Ok(true)
    }

    /// Throw the current arrangement away and place everything again.
    /// Persisted immediately so the next mount cannot resurrect the
    /// replaced layout.
    pub fn regenerate(&mut self, seed: Option<u64>) -> anyhow::Result<()> {
        self.model = generate_layout(&self.ids, self.model.total_cols, &self.catalog, seed)?;
        self.store.save(&self.surface_id, &self.model)
    }

    /// The content list changed under us: adopt the new ids and re-place.
    pub fn remount(&mut self, ids: &[String], seed: Option<u64>) -> anyhow::Result<()> {
        self.ids = ids.to_vec();
        self.regenerate(seed)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }
}

fn same_ids(model: &GridModel, ids: &[String]) -> bool {
    let stored: BTreeSet<&str> = model.items.iter().map(|it| it.id.as_str()).collect();
    let wanted: BTreeSet<&str> = ids.iter().map(|s| s.as_str()).collect();
    stored == wanted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sizes::default_size_classes;
    use crate::store::MemoryBackend;

    fn ids(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("t{i}")).collect()
    }

    fn mount<'a>(
        backend: &'a mut MemoryBackend,
        ids: &[String],
    ) -> anyhow::Result<Surface<&'a mut MemoryBackend>> {
        Surface::mount(
            LayoutStore::new(backend),
            "home",
            ids,
            4,
            default_size_classes(),
            Some(42),
        )
    }

    #[test]
    fn mount_generates_when_store_is_empty() -> anyhow::Result<()> {
        let mut backend = MemoryBackend::new();
        let surface = mount(&mut backend, &ids(6))?;
        assert_eq!(surface.model.items.len(), 6);
        surface.model.validate()?;
        Ok(())
    }

    #[test]
    fn successful_drag_persists_across_mounts() -> anyhow::Result<()> {
        let mut backend = MemoryBackend::new();
        let list = ids(4);

        let moved = {
            let mut surface = mount(&mut backend, &list)?;
            // park t1 far below everything so the move cannot collide
            assert!(surface.drag("t1", 0, 20)?);
            surface.model.clone()
        };

        let surface = mount(&mut backend, &list)?;
        assert_eq!(surface.model, moved);
        assert_eq!(surface.model.get("t1").unwrap().origin.row, 20);
        Ok(())
    }

    #[test]
    fn rejected_drag_writes_nothing() -> anyhow::Result<()> {
        let mut backend = MemoryBackend::new();
        let list = ids(4);

        {
            let mut surface = mount(&mut backend, &list)?;
            let before = surface.model.clone();
            let first = before.items[0].clone();
            // drop the second tile exactly onto the first
            let changed = surface.drag(
                &before.items[1].id.clone(),
                first.origin.col as i32,
                first.origin.row as i32,
            )?;
            assert!(!changed);
            assert_eq!(surface.model, before);
        }

        // nothing was ever saved, so a remount regenerates
        assert!(LayoutStore::new(&mut backend).load("home")?.is_none());
        Ok(())
    }

    #[test]
    fn stale_id_set_regenerates() -> anyhow::Result<()> {
        let mut backend = MemoryBackend::new();

        {
            let mut surface = mount(&mut backend, &ids(3))?;
            assert!(surface.drag("t1", 0, 20)?);
        }

        // the catalog gained a tile since last session
        let surface = mount(&mut backend, &ids(4))?;
        assert_eq!(surface.model.items.len(), 4);
        assert!(surface.model.get("t1").unwrap().origin.row < 20);
        Ok(())
    }

    #[test]
    fn stale_column_count_regenerates() -> anyhow::Result<()> {
        let mut backend = MemoryBackend::new();
        let list = ids(3);

        {
            let mut surface = mount(&mut backend, &list)?;
            assert!(surface.drag("t1", 0, 20)?);
        }

        let surface = Surface::mount(
            LayoutStore::new(&mut backend),
            "home",
            &list,
            6,
            default_size_classes(),
            Some(42),
        )?;
        assert_eq!(surface.model.total_cols, 6);
        assert!(surface.model.get("t1").unwrap().origin.row < 20);
        Ok(())
    }

    #[test]
    fn regenerate_overwrites_the_stored_layout() -> anyhow::Result<()> {
        let mut backend = MemoryBackend::new();
        let list = ids(5);

        let regenerated = {
            let mut surface = mount(&mut backend, &list)?;
            surface.regenerate(Some(7))?;
            surface.model.clone()
        };

        let surface = mount(&mut backend, &list)?;
        assert_eq!(surface.model, regenerated);
        Ok(())
    }

    #[test]
    fn remount_adopts_a_new_id_set() -> anyhow::Result<()> {
        let mut backend = MemoryBackend::new();
        let mut surface = mount(&mut backend, &ids(3))?;

        let grown = ids(5);
        surface.remount(&grown, Some(1))?;
        assert_eq!(surface.model.items.len(), 5);
        assert_eq!(surface.ids(), &grown[..]);
        surface.model.validate()?;
        Ok(())
    }
}
