//! Predefined CMap loading with `usecmap` resolution.
//!
//! Predefined CMaps (`UniGB-UCS2-H`, `90ms-RKSJ-H`, ...) live in an external
//! asset collection reached through the [`AssetStore`] trait, so callers can
//! back it with bundled bytes, a directory of CMap files, or a fake in tests.

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use pdfcmap_core::{BitWidth, CMapError, LoadOptions};
use tracing::{debug, trace};

use crate::builder::CMapBuilder;
use crate::cmap::{CMap, ensure_usable};
use crate::grammar;

/// Read-only name → CMap bytes repository.
///
/// Names are case-sensitive ASCII identifiers such as `"UniGB-UCS2-H"`.
pub trait AssetStore: Send + Sync {
    /// Whether an asset named `name` exists.
    fn exists(&self, name: &str) -> bool;

    /// Fetch the raw CMap text for `name`.
    ///
    /// Returns [`CMapError::NotFound`] if the asset does not exist.
    fn fetch(&self, name: &str) -> Result<Cow<'_, [u8]>, CMapError>;
}

/// In-memory asset store.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetStore {
    assets: HashMap<String, Vec<u8>>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an asset.
    pub fn insert(&mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) -> &mut Self {
        self.assets.insert(name.into(), data.into());
        self
    }

    /// Builder-style variant of [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.insert(name, data);
        self
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl AssetStore for MemoryAssetStore {
    fn exists(&self, name: &str) -> bool {
        self.assets.contains_key(name)
    }

    fn fetch(&self, name: &str) -> Result<Cow<'_, [u8]>, CMapError> {
        self.assets
            .get(name)
            .map(|data| Cow::Borrowed(data.as_slice()))
            .ok_or_else(|| CMapError::NotFound(name.to_string()))
    }
}

/// Asset store reading one file per CMap name from a directory,
/// e.g. the `CMap/` folder of Adobe's cmap-resources.
#[derive(Debug, Clone)]
pub struct DirAssetStore {
    root: PathBuf,
}

impl DirAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path for `name`, or `None` if the name could escape the directory.
    fn path_for(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            return None;
        }
        Some(self.root.join(name))
    }
}

impl AssetStore for DirAssetStore {
    fn exists(&self, name: &str) -> bool {
        self.path_for(name).is_some_and(|path| path.is_file())
    }

    fn fetch(&self, name: &str) -> Result<Cow<'_, [u8]>, CMapError> {
        let path = self
            .path_for(name)
            .ok_or_else(|| CMapError::NotFound(name.to_string()))?;
        match std::fs::read(&path) {
            Ok(data) => Ok(Cow::Owned(data)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(CMapError::NotFound(name.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Loads predefined CMaps from an [`AssetStore`], resolving `usecmap` chains.
#[derive(Debug, Clone)]
pub struct PredefinedLoader<S> {
    store: S,
    options: LoadOptions,
}

impl<S: AssetStore> PredefinedLoader<S> {
    pub fn new(store: S) -> Self {
        Self::with_options(store, LoadOptions::default())
    }

    pub fn with_options(store: S, options: LoadOptions) -> Self {
        Self { store, options }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Whether `name` is available, without parsing it.
    pub fn is_predefined(&self, name: &str) -> bool {
        self.store.exists(name)
    }

    /// Load and finalize the predefined CMap `name`.
    ///
    /// If it declares a `usecmap`, the base is loaded recursively and merged:
    /// the child's own code→CID entries win and base codespaces are appended.
    ///
    /// # Errors
    ///
    /// - [`CMapError::NotFound`] if `name` or any base is absent.
    /// - [`CMapError::UnusableCMap`] if a CMap has no codespaces and no `usecmap`.
    /// - [`CMapError::InvalidOperand`] for a `usecmap` cycle.
    /// - [`CMapError::ResourceLimitExceeded`] if the chain is deeper than
    ///   `max_usecmap_depth`.
    pub fn load(&self, name: &str) -> Result<CMap, CMapError> {
        let mut chain = Vec::new();
        Ok(self.load_builder(name, 0, &mut chain)?.build())
    }

    /// Parse an embedded CMap stream and resolve its `usecmap` against the store.
    pub fn load_embedded(&self, data: &[u8], bit_width: BitWidth) -> Result<CMap, CMapError> {
        let builder = grammar::parse(data, bit_width, &self.options)?;
        ensure_usable(&builder)?;
        let mut chain = Vec::new();
        if !builder.name().is_empty() {
            chain.push(builder.name().to_string());
        }
        Ok(self.resolve_base(builder, 0, &mut chain)?.build())
    }

    fn load_builder(
        &self,
        name: &str,
        depth: usize,
        chain: &mut Vec<String>,
    ) -> Result<CMapBuilder, CMapError> {
        if chain.iter().any(|seen| seen == name) {
            return Err(CMapError::InvalidOperand(format!(
                "usecmap cycle: {} -> {name}",
                chain.join(" -> ")
            )));
        }
        if !self.store.exists(name) {
            debug!(name, "predefined CMap not found");
            return Err(CMapError::NotFound(name.to_string()));
        }

        let data = self.store.fetch(name)?;
        let builder = grammar::parse(&data, BitWidth::Cid, &self.options)?;
        ensure_usable(&builder)?;
        trace!(name, depth, usecmap = ?builder.usecmap(), "loaded predefined CMap");

        chain.push(name.to_string());
        self.resolve_base(builder, depth, chain)
    }

    fn resolve_base(
        &self,
        mut builder: CMapBuilder,
        depth: usize,
        chain: &mut Vec<String>,
    ) -> Result<CMapBuilder, CMapError> {
        let Some(base_name) = builder.usecmap().map(str::to_owned) else {
            return Ok(builder);
        };
        let max = self.options.max_usecmap_depth;
        if depth + 1 > max {
            return Err(CMapError::limit("max_usecmap_depth", max, depth + 1));
        }
        let base = self.load_builder(&base_name, depth + 1, chain)?.build();
        builder.merge_base(&base);
        Ok(builder)
    }
}

type CacheSlot = Arc<OnceLock<Result<Arc<CMap>, CMapError>>>;

/// Name-keyed cache of predefined CMaps.
///
/// Every caller asking for the same name gets the same `Arc<CMap>`. Each name
/// is loaded at most once, even when several threads ask for it at the same
/// time. Load failures of names the store has are cached as well; names the
/// store lacks get `NotFound` without taking a slot.
#[derive(Debug)]
pub struct CMapCache<S> {
    loader: PredefinedLoader<S>,
    slots: Mutex<HashMap<String, CacheSlot>>,
}

impl<S: AssetStore> CMapCache<S> {
    pub fn new(loader: PredefinedLoader<S>) -> Self {
        Self {
            loader,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn loader(&self) -> &PredefinedLoader<S> {
        &self.loader
    }

    pub fn is_predefined(&self, name: &str) -> bool {
        self.loader.is_predefined(name)
    }

    /// Get the CMap `name`, loading it on first access.
    pub fn get(&self, name: &str) -> Result<Arc<CMap>, CMapError> {
        if !self.loader.is_predefined(name) {
            debug!(name, "predefined CMap not found");
            return Err(CMapError::NotFound(name.to_string()));
        }
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(name.to_string()).or_default())
        };
        // The map lock is released; only callers of this name wait here.
        slot.get_or_init(|| {
            debug!(name, "loading predefined CMap into cache");
            self.loader.load(name).map(Arc::new)
        })
        .clone()
    }

    /// Number of names requested so far.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
