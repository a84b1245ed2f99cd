//! # `VelesDB` Core
//!
//! An embedded, persistent vector database engine.
//!
//! `VelesDB` stores vectors in named collections, each backed by its own
//! page store and write-ahead log, and searched through either an exact
//! (flat) index or an approximate (HNSW) one. A [`Database`] is the entry
//! point: it owns the shared search executor and result-cache
//! configuration, and opens or creates collections underneath a single
//! data directory.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use velesdb_core::{Database, CollectionOptions, DistanceMetric, Point, SearchRequest};
//!
//! let db = Database::open("./data")?;
//! let docs = db.create_collection("documents", CollectionOptions {
//!     dimensions: 768,
//!     metric: Some(DistanceMetric::Cosine),
//!     index_kind: None,
//! })?;
//!
//! docs.insert(&Point::new("doc-1", vec![0.1; 768]))?;
//!
//! let results = docs.search(&SearchRequest {
//!     vector: Some(vec![0.1; 768]),
//!     k: 10,
//!     ..SearchRequest::default()
//! })?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod collection;
pub mod config;
pub mod distance;
pub mod embedder;
pub mod error;
pub mod executor;
pub mod filter;
pub mod index;
pub mod point;
pub mod storage;

pub use collection::{
    Collection, CollectionDescriptor, CollectionOptions, CollectionStats, InsertBatchOutcome,
    SearchRequest, SearchResponse,
};
pub use config::VelesConfig;
pub use distance::DistanceMetric;
pub use embedder::Embedder;
pub use error::{Error, Result};
pub use executor::Executor;
pub use filter::{Condition, Filter};
pub use index::{HnswIndex, VectorIndex};
pub use point::{Point, SearchHit};

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

const DESCRIPTOR_FILE: &str = "descriptor.json";

/// A database: a data directory holding zero or more collections, a shared
/// search executor, and an optional embedder new collections inherit.
pub struct Database {
    data_dir: PathBuf,
    config: VelesConfig,
    executor: Arc<Executor>,
    embedder: RwLock<Option<Arc<dyn Embedder>>>,
    collections: Arc<RwLock<HashMap<String, Arc<Collection>>>>,
    cache_cleaner: CacheCleaner,
    wal_syncer: WalSyncer,
}

/// Background thread that periodically sweeps every open collection's
/// expired result-cache entries, at `search_cache_cleanup_interval`.
///
/// Parked on a channel `recv_timeout` rather than a plain sleep, so dropping
/// the sender wakes it immediately instead of leaving it asleep for up to a
/// full interval on shutdown.
struct CacheCleaner {
    stop: Option<mpsc::Sender<()>>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl CacheCleaner {
    fn spawn(collections: Arc<RwLock<HashMap<String, Arc<Collection>>>>, interval: Duration) -> Self {
        let (stop, rx) = mpsc::channel::<()>();
        let handle = std::thread::Builder::new()
            .name("velesdb-cache-cleaner".into())
            .spawn(move || loop {
                match rx.recv_timeout(interval) {
                    Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
                    Err(mpsc::RecvTimeoutError::Timeout) => {
                        for collection in collections.read().values() {
                            collection.sweep_cache();
                        }
                    }
                }
            })
            .expect("failed to spawn cache cleaner thread");
        Self { stop: Some(stop), handle: Some(handle) }
    }
}

impl Drop for CacheCleaner {
    fn drop(&mut self) {
        drop(self.stop.take());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Background thread that fsyncs every open collection under
/// [`SyncPolicy::Interval`](config::SyncPolicy::Interval) at `wal_sync_interval`.
/// `Collection::sync_wal_on_interval` is a no-op for collections under any
/// other policy, so this thread is harmless overhead when every collection
/// syncs per-op or not at all.
struct WalSyncer {
    stop: Option<mpsc::Sender<()>>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl WalSyncer {
    fn spawn(collections: Arc<RwLock<HashMap<String, Arc<Collection>>>>, interval: Duration) -> Self {
        let (stop, rx) = mpsc::channel::<()>();
        let handle = std::thread::Builder::new()
            .name("velesdb-wal-syncer".into())
            .spawn(move || loop {
                match rx.recv_timeout(interval) {
                    Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
                    Err(mpsc::RecvTimeoutError::Timeout) => {
                        for collection in collections.read().values() {
                            if let Err(e) = collection.sync_wal_on_interval() {
                                tracing::warn!(collection = collection.name(), error = %e, "interval WAL sync failed");
                            }
                        }
                    }
                }
            })
            .expect("failed to spawn WAL syncer thread");
        Self { stop: Some(stop), handle: Some(handle) }
    }
}

impl Drop for WalSyncer {
    fn drop(&mut self) {
        drop(self.stop.take());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Aggregate stats across every collection in a database.
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    /// Per-collection stats, keyed by collection name.
    pub collections: Vec<(String, CollectionStats)>,
}

/// Outcome of [`Database::health`]: whether every collection opened cleanly
/// and the directory is writable.
#[derive(Debug, Clone)]
pub struct HealthReport {
    /// True if every known collection is reachable and the data directory is writable.
    pub healthy: bool,
    /// Number of collections currently open.
    pub collection_count: usize,
    /// First problem found, if `healthy` is false.
    pub detail: Option<String>,
}

impl Database {
    /// Opens (creating if absent) the database at `path`, loading
    /// configuration from `<path>/config.toml` layered under environment
    /// variables, and eagerly opening every existing collection found there.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if configuration fails to load or validate,
    /// and [`Error::Io`] or [`Error::Corruption`] if a collection fails to open.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data_dir = path.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir)?;
        let config = VelesConfig::load(&data_dir)?;
        config.validate()?;
        Self::open_with_config(data_dir, config)
    }

    /// Like [`Database::open`], but applies `overrides` to the loaded
    /// configuration before validating it. This is the top of the config
    /// precedence order: defaults, then config file, then environment, then
    /// whatever `overrides` changes.
    ///
    /// # Errors
    ///
    /// Same as [`Database::open`].
    pub fn open_with_overrides(
        path: impl AsRef<Path>,
        overrides: impl FnOnce(&mut VelesConfig),
    ) -> Result<Self> {
        let data_dir = path.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir)?;
        let mut config = VelesConfig::load(&data_dir)?;
        overrides(&mut config);
        config.validate()?;
        Self::open_with_config(data_dir, config)
    }

    fn open_with_config(data_dir: PathBuf, config: VelesConfig) -> Result<Self> {
        let executor = Arc::new(Executor::new(&config));
        let collections = Arc::new(RwLock::new(HashMap::new()));
        let cache_cleaner = CacheCleaner::spawn(
            Arc::clone(&collections),
            Duration::from_secs(config.search_cache_cleanup_interval),
        );
        // `wal_sync_interval == 0` means per-op syncing, handled inline by each
        // write; this thread would otherwise spin, so give it a floor.
        let sync_interval_ms = config.wal_sync_interval.max(50);
        let wal_syncer = WalSyncer::spawn(Arc::clone(&collections), Duration::from_millis(sync_interval_ms));
        let db = Self {
            data_dir,
            config,
            executor,
            embedder: RwLock::new(None),
            collections,
            cache_cleaner,
            wal_syncer,
        };

        let discovered = db.discover_collection_names()?;
        tracing::info!(data_dir = %db.data_dir.display(), collections = discovered.len(), "opening database");
        for name in discovered {
            let collection = Collection::open(&db.data_dir, &name, &db.config, Arc::clone(&db.executor), None)?;
            db.collections.write().insert(name, Arc::new(collection));
        }

        Ok(db)
    }

    fn discover_collection_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        if !self.data_dir.exists() {
            return Ok(names);
        }
        for entry in fs::read_dir(&self.data_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() && entry.path().join(DESCRIPTOR_FILE).exists() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        Ok(names)
    }

    /// Binds an embedder new and freshly opened collections will use for
    /// text insert/search. Does not affect collections already open in
    /// this `Database` instance.
    pub fn set_embedder(&self, embedder: Arc<dyn Embedder>) {
        *self.embedder.write() = Some(embedder);
    }

    /// This database's effective configuration.
    #[must_use]
    pub fn config(&self) -> &VelesConfig {
        &self.config
    }

    /// Creates a new collection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyExists`] if a collection named `name` already exists.
    pub fn create_collection(&self, name: &str, options: CollectionOptions) -> Result<Arc<Collection>> {
        let mut collections = self.collections.write();
        if collections.contains_key(name) {
            return Err(Error::AlreadyExists(format!("collection '{name}' already exists")));
        }
        let embedder = self.embedder.read().clone();
        let collection = Collection::create(&self.data_dir, name, options, &self.config, Arc::clone(&self.executor), embedder)?;
        let collection = Arc::new(collection);
        collections.insert(name.to_string(), Arc::clone(&collection));
        Ok(collection)
    }

    /// Returns the named collection, if it has been created.
    #[must_use]
    pub fn get_collection(&self, name: &str) -> Option<Arc<Collection>> {
        self.collections.read().get(name).cloned()
    }

    /// Names of every collection currently open.
    #[must_use]
    pub fn list_collections(&self) -> Vec<String> {
        self.collections.read().keys().cloned().collect()
    }

    /// Drops a collection, removing its on-disk directory entirely.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no collection named `name` is open.
    pub fn drop_collection(&self, name: &str) -> Result<()> {
        let collection = {
            let mut collections = self.collections.write();
            collections.remove(name).ok_or_else(|| Error::NotFound(format!("collection '{name}' does not exist")))?
        };
        let dir = collection.dir().to_path_buf();
        drop(collection);
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        tracing::info!(collection = name, "collection dropped");
        Ok(())
    }

    /// Stats for every open collection.
    #[must_use]
    pub fn stats(&self) -> DatabaseStats {
        let collections = self
            .collections
            .read()
            .iter()
            .map(|(name, collection)| (name.clone(), collection.stats()))
            .collect();
        DatabaseStats { collections }
    }

    /// Checks that the data directory is writable and every open collection
    /// responds to a trivial read.
    #[must_use]
    pub fn health(&self) -> HealthReport {
        let collections = self.collections.read();
        for (name, collection) in collections.iter() {
            if let Err(e) = collection.get("__health_probe__") {
                return HealthReport {
                    healthy: false,
                    collection_count: collections.len(),
                    detail: Some(format!("collection '{name}' failed a read probe: {e}")),
                };
            }
        }
        let probe = self.data_dir.join(".health_probe");
        if let Err(e) = fs::write(&probe, b"ok") {
            return HealthReport {
                healthy: false,
                collection_count: collections.len(),
                detail: Some(format!("data directory not writable: {e}")),
            };
        }
        let _ = fs::remove_file(&probe);
        HealthReport { healthy: true, collection_count: collections.len(), detail: None }
    }

    /// Flushes and checkpoints every open collection.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered closing any collection.
    pub fn close(&self) -> Result<()> {
        for collection in self.collections.read().values() {
            collection.close()?;
        }
        Ok(())
    }
}
