use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

use crate::{GridItem, GridModel, Origin, Span};

/// Where serialized layouts live. Injected so tests run against memory and
/// hosts run against files (or whatever the platform offers).
pub trait StorageBackend {
    fn put(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
}

/// Lets one backend be shared across stores (tests remount against the
/// same memory backend).
impl<B: StorageBackend + ?Sized> StorageBackend for &mut B {
    fn put(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        (**self).put(key, value)
    }

    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        (**self).get(key)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: BTreeMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn put(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }
}

/// One `<key>.json` file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> anyhow::Result<PathBuf> {
        if key.contains('/') || key.contains('\\') {
            bail!("storage key '{}' contains a path separator", key);
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl StorageBackend for FileBackend {
    fn put(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create layout dir {}", self.dir.display()))?;
        fs::write(&path, value).with_context(|| format!("write layout file {}", path.display()))
    }

    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => {
                Err(e).with_context(|| format!("read layout file {}", path.display()))
            }
        }
    }
}

/// What actually hits storage: a flat record per tile, so the persisted
/// schema stays stable even if the in-memory types move around.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredLayout {
    total_cols: u32,
    items: Vec<StoredItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredItem {
    id: String,
    col: u32,
    row: u32,
    col_span: u32,
    row_span: u32,
}

impl StoredLayout {
    fn from_model(model: &GridModel) -> Self {
        Self {
            total_cols: model.total_cols,
            items: model
                .items
                .iter()
                .map(|it| StoredItem {
                    id: it.id.clone(),
                    col: it.origin.col,
                    row: it.origin.row,
                    col_span: it.span.col_span,
                    row_span: it.span.row_span,
                })
                .collect(),
        }
    }

    fn into_model(self) -> GridModel {
        GridModel {
            total_cols: self.total_cols,
            items: self
                .items
                .into_iter()
                .map(|it| {
                    GridItem::new(
                        it.id,
                        Origin {
                            col: it.col,
                            row: it.row,
                        },
                        Span {
                            col_span: it.col_span,
                            row_span: it.row_span,
                        },
                    )
                })
                .collect(),
        }
    }
}

/// Persists grid models, one record per surface id.
#[derive(Debug)]
pub struct LayoutStore<B: StorageBackend> {
    pub backend: B,
}

impl<B: StorageBackend> LayoutStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Serialize and write `model` under the surface's key, overwriting any
    /// prior record. Saving the same model twice writes the same bytes.
    pub fn save(&mut self, surface_id: &str, model: &GridModel) -> anyhow::Result<()> {
        let stored = StoredLayout::from_model(model);
        let json = serde_json::to_string_pretty(&stored).context("serialize layout")?;
        self.backend.put(&storage_key(surface_id), &json)
    }

    /// Read the surface's record back. `Ok(None)` means "nothing usable":
    /// no record, unparseable JSON, or a decoded model that fails
    /// validation (e.g. the column count changed between app versions).
    /// Callers fall back to `generate_layout`; only a backend I/O failure
    /// is an actual error.
    pub fn load(&self, surface_id: &str) -> anyhow::Result<Option<GridModel>> {
        let key = storage_key(surface_id);
        let Some(raw) = self.backend.get(&key)? else {
            return Ok(None);
        };

        let stored: StoredLayout = match serde_json::from_str(&raw) {
            Ok(s) => s,
            Err(e) => {
                debug!(key = %key, error = %e, "discarding unreadable stored layout");
                return Ok(None);
            }
        };

        let model = stored.into_model();
        if let Err(e) = model.validate() {
            debug!(key = %key, error = %e, "discarding invalid stored layout");
            return Ok(None);
        }

        Ok(Some(model))
    }
}

fn storage_key(surface_id: &str) -> String {
    format!("layout.{surface_id}")
}
