//! The `Collection`: one page store, one WAL, one vector index, and a result
//! cache bound together around a single named set of vectors.
//!
//! Writes go WAL-first (append, then apply to the page store and index) so a
//! crash between the two leaves a replayable trail rather than a silent
//! loss. A duplicate id on insert is a replace: the old point is deleted and
//! the new one inserted fresh, so the WAL and the index never have to model
//! an in-place update.


use crate::cache::ResultCache;
use crate::config::{IndexKind, VelesConfig};
use crate::distance::DistanceMetric;
use crate::embedder::Embedder;
use crate::error::{Error, Result};
use crate::executor::Executor;
use crate::index::flat::FlatIndex;
use crate::index::hnsw::{self, HnswIndex, HnswParams};
use crate::index::{SearchOptions, VectorIndex};
use crate::point::{Point, SearchHit};
use crate::storage::page::{self, Page, PageType, PAGE_HEADER_SIZE};
use crate::storage::{Store, Wal, WalTag};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde_json::Value as JsonValue;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::types::{
    CollectionDescriptor, CollectionStats, InsertBatchOutcome, SearchRequest, SearchResponse,
    DESCRIPTOR_SCHEMA_VERSION,
};

const DESCRIPTOR_FILE: &str = "descriptor.json";
const PAGE_FILE: &str = "data.pages";
const WAL_FILE: &str = "wal.log";
const INDEX_FILE: &str = "index.bin";

/// Longest allowed collection name, in bytes.
const MAX_NAME_BYTES: usize = 128;

/// Validates a collection name against the on-disk directory-name
/// constraints: non-empty, at most [`MAX_NAME_BYTES`] bytes, and restricted
/// to `[A-Za-z0-9_-]` so it can never escape `data_dir` when joined into a path.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `name` violates any of the above.
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidArgument("collection name must not be empty".into()));
    }
    if name.len() > MAX_NAME_BYTES {
        return Err(Error::InvalidArgument(format!(
            "collection name exceeds {MAX_NAME_BYTES} bytes"
        )));
    }
    if !name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-') {
        return Err(Error::InvalidArgument(
            "collection name must match [A-Za-z0-9_-]".into(),
        ));
    }
    Ok(())
}

/// A named collection of vectors: durable storage, a search index, and the
/// caches and cross-cutting services (executor, embedder) it was opened with.
pub struct Collection {
    dir: PathBuf,
    descriptor: CollectionDescriptor,
    store: Store,
    wal: Wal,
    index: Arc<dyn VectorIndex>,
    id_to_page: RwLock<FxHashMap<String, u32>>,
    cache: ResultCache,
    generation: AtomicU64,
    executor: Arc<Executor>,
    embedder: Option<Arc<dyn Embedder>>,
    wal_max_size: u64,
    sync_policy: crate::config::SyncPolicy,
}

/// Parameters a caller supplies when creating a new collection; everything
/// else in [`CollectionDescriptor`] is derived from `config`.
#[derive(Debug, Clone)]
pub struct CollectionOptions {
    /// Vector dimensionality every point in this collection must match.
    pub dimensions: usize,
    /// Distance metric, defaulting to `config.index_default_metric`.
    pub metric: Option<DistanceMetric>,
    /// Index kind, defaulting to `config.index_default_type`.
    pub index_kind: Option<IndexKind>,
}

impl Collection {
    /// Creates a new collection under `data_dir/<name>`, persisting its
    /// descriptor before returning.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyExists`] if the collection's directory already
    /// holds a descriptor, or [`Error::Io`] on a file-system failure.
    pub fn create(
        data_dir: &Path,
        name: &str,
        options: CollectionOptions,
        config: &VelesConfig,
        executor: Arc<Executor>,
        embedder: Option<Arc<dyn Embedder>>,
    ) -> Result<Self> {
        validate_name(name)?;
        let dir = data_dir.join(name);
        if dir.join(DESCRIPTOR_FILE).exists() {
            return Err(Error::AlreadyExists(format!("collection '{name}' already exists")));
        }
        fs::create_dir_all(&dir)?;

        let params = HnswParams::from_config(config);
        let descriptor = CollectionDescriptor {
            name: name.to_string(),
            dimensions: options.dimensions,
            metric: options.metric.unwrap_or(config.index_default_metric),
            index_kind: options.index_kind.unwrap_or(config.index_default_type),
            hnsw_m: params.m,
            hnsw_max_m: params.max_m,
            hnsw_max_m0: params.max_m0,
            hnsw_ml: params.ml,
            hnsw_ef_construction: params.ef_construction,
            hnsw_ef_search: params.ef_search,
            hnsw_seed: params.seed,
            created_at: now_unix(),
            schema_version: DESCRIPTOR_SCHEMA_VERSION,
        };
        write_descriptor(&dir, &descriptor)?;

        let store = Store::open(
            dir.join(PAGE_FILE),
            config.storage_page_size,
            config.storage_cache_size,
            config.storage_sync_writes,
            config.perf_io_max_retries,
        )?;
        let wal = Wal::open(dir.join(WAL_FILE), config.perf_io_max_retries)?;
        let index = build_index(&descriptor);

        tracing::info!(collection = name, dimensions = descriptor.dimensions, index_kind = ?descriptor.index_kind, "collection created");

        Ok(Self {
            dir,
            descriptor,
            store,
            wal,
            index,
            id_to_page: RwLock::new(FxHashMap::default()),
            cache: ResultCache::new(config.search_cache_max_entries, Duration::from_secs(config.search_cache_ttl)),
            generation: AtomicU64::new(0),
            executor,
            embedder,
            wal_max_size: config.wal_max_size,
            sync_policy: config.wal_sync_policy(),
        })
    }

    /// Reopens an existing collection. If a persisted HNSW index file is
    /// present, the graph is rebuilt from it directly and only the WAL
    /// entries written since the last checkpoint are replayed; otherwise
    /// (no index file yet, or a flat index) the index is rebuilt from
    /// scratch by scanning the page store, then replaying the WAL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no descriptor exists at `data_dir/<name>`,
    /// and [`Error::Corruption`] if the page store, WAL, or index file are inconsistent.
    pub fn open(
        data_dir: &Path,
        name: &str,
        config: &VelesConfig,
        executor: Arc<Executor>,
        embedder: Option<Arc<dyn Embedder>>,
    ) -> Result<Self> {
        validate_name(name)?;
        let dir = data_dir.join(name);
        let descriptor = read_descriptor(&dir, name)?;

        let store = Store::open(
            dir.join(PAGE_FILE),
            config.storage_page_size,
            config.storage_cache_size,
            config.storage_sync_writes,
            config.perf_io_max_retries,
        )?;
        let wal = Wal::open(dir.join(WAL_FILE), config.perf_io_max_retries)?;

        let (index, id_to_page) = match load_hnsw_snapshot(&dir, &descriptor)? {
            Some(index) => {
                let mut id_to_page = scan_id_to_page(&store)?;
                replay_wal(&store, &wal, &index, &mut id_to_page)?;
                (index, id_to_page)
            }
            None => {
                let index = build_index(&descriptor);
                let id_to_page = rebuild(&store, &wal, &index)?;
                (index, id_to_page)
            }
        };

        tracing::info!(collection = name, vectors = id_to_page.len(), "collection reopened");

        Ok(Self {
            dir,
            descriptor,
            store,
            wal,
            index,
            id_to_page: RwLock::new(id_to_page),
            cache: ResultCache::new(config.search_cache_max_entries, Duration::from_secs(config.search_cache_ttl)),
            generation: AtomicU64::new(0),
            executor,
            embedder,
            wal_max_size: config.wal_max_size,
            sync_policy: config.wal_sync_policy(),
        })
    }

    /// This collection's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// The descriptor this collection was created or reopened with.
    #[must_use]
    pub fn descriptor(&self) -> &CollectionDescriptor {
        &self.descriptor
    }

    /// Inserts a point, replacing any existing point with the same id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] or [`Error::DimensionMismatch`] if
    /// `point` fails validation against this collection's dimensions.
    pub fn insert(&self, point: &Point) -> Result<()> {
        point.validate(self.descriptor.dimensions)?;

        if self.id_to_page.read().contains_key(&point.id) {
            self.delete(&point.id)?;
        }

        let payload = page::encode_record(point)?;
        self.wal.append(WalTag::Insert, &payload)?;
        if matches!(self.sync_policy, crate::config::SyncPolicy::PerOp) {
            self.wal.sync()?;
        }

        let page_id = self.store.allocate()?;
        let capacity = self.store.page_size() as usize - PAGE_HEADER_SIZE;
        let body = page::encode_page_body(std::slice::from_ref(point), capacity)?;
        self.store.write(Page {
            id: page_id,
            page_type: PageType::VectorRecord,
            body,
            free_space_offset: 0,
        })?;

        self.index.insert(point)?;
        self.id_to_page.write().insert(point.id.clone(), page_id);
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.maybe_checkpoint()?;
        Ok(())
    }

    /// Inserts a batch of points, stopping at the first validation failure.
    /// Everything before the failure persists; nothing after it is attempted.
    pub fn insert_batch(&self, points: &[Point]) -> InsertBatchOutcome {
        for (i, point) in points.iter().enumerate() {
            if self.insert(point).is_err() {
                return InsertBatchOutcome { inserted: i, failed_at: Some(i) };
            }
        }
        InsertBatchOutcome { inserted: points.len(), failed_at: None }
    }

    /// Embeds `text` and inserts it under `id`, carrying `text` as the
    /// point's content and `metadata` as its metadata.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if this collection has no bound
    /// embedder, propagating any embedding or insert failure otherwise.
    pub fn insert_text(&self, id: &str, text: &str, metadata: JsonValue) -> Result<()> {
        let embedder = self.require_embedder()?;
        let vector = embedder.embed(text)?;
        let point = Point::new(id, vector).with_metadata(metadata).with_content(text);
        self.insert(&point)
    }

    /// Batch form of [`Collection::insert_text`]: `items` is `(id, text, metadata)`.
    ///
    /// # Errors
    ///
    /// Same as [`Collection::insert_text`].
    pub fn insert_text_batch(&self, items: &[(String, String, JsonValue)]) -> Result<InsertBatchOutcome> {
        let embedder = self.require_embedder()?;
        let texts: Vec<String> = items.iter().map(|(_, text, _)| text.clone()).collect();
        let vectors = embedder.embed_batch(&texts)?;
        let points: Vec<Point> = items
            .iter()
            .zip(vectors)
            .map(|((id, text, metadata), vector)| {
                Point::new(id.clone(), vector).with_metadata(metadata.clone()).with_content(text.clone())
            })
            .collect();
        Ok(self.insert_batch(&points))
    }

    /// Removes a point by id. Returns `false` if `id` wasn't present.
    ///
    /// # Errors
    ///
    /// Returns an error only on an underlying storage or index failure.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let page_id = {
            let mut map = self.id_to_page.write();
            match map.remove(id) {
                Some(page_id) => page_id,
                None => return Ok(false),
            }
        };

        self.wal.append(WalTag::Delete, id.as_bytes())?;
        if matches!(self.sync_policy, crate::config::SyncPolicy::PerOp) {
            self.wal.sync()?;
        }

        self.index.delete(id)?;
        self.store.free(page_id)?;
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.maybe_checkpoint()?;
        Ok(true)
    }

    /// Fetches a point by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Corruption`] if the stored page can't be decoded.
    pub fn get(&self, id: &str) -> Result<Option<Point>> {
        let page_id = match self.id_to_page.read().get(id).copied() {
            Some(page_id) => page_id,
            None => return Ok(None),
        };
        let page = self.store.read(page_id)?;
        let mut records = page::decode_page_body(&page.body)?;
        Ok(records.pop())
    }

    /// Number of live points in this collection.
    #[must_use]
    pub fn count(&self) -> usize {
        self.id_to_page.read().len()
    }

    /// True if this collection holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Runs a search, dispatching to the parallel executor when the
    /// collection is large enough to benefit, and serving from the result
    /// cache when an identical request was answered since the last write.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if neither `request.vector` nor
    /// `request.text` is set (or `text` is set without a bound embedder),
    /// and [`Error::DimensionMismatch`] if the query vector's length doesn't
    /// match this collection's dimensions.
    pub fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let query = self.resolve_query_vector(request)?;

        let fingerprint = ResultCache::fingerprint(
            &query,
            request.k,
            request.ef_search,
            request.filter.as_ref(),
            request.with_vectors,
            request.with_metadata,
            request.with_content,
        );
        let generation = self.generation.load(Ordering::SeqCst);
        if let Some(hits) = self.cache.get(fingerprint, generation) {
            return Ok(SearchResponse { hits, partial: false });
        }

        let opts = SearchOptions {
            ef_search: request.ef_search,
            deadline: request.deadline,
            cancel: request.cancel.clone(),
        };

        // A filter is evaluated against stored metadata after scoring, so an
        // index-level k isn't necessarily enough to fill the response; widen
        // the candidate pool rather than re-querying on a miss.
        let fetch_k = if request.filter.is_some() {
            request.k.saturating_mul(4).max(request.k + 50)
        } else {
            request.k
        };

        let outcome = self.executor.search(Arc::clone(&self.index), &query, fetch_k, &opts)?;

        let mut hits = Vec::with_capacity(request.k.min(outcome.hits.len()));
        for hit in outcome.hits {
            if hits.len() >= request.k {
                break;
            }
            let Some(point) = self.get(&hit.id)? else { continue };
            if let Some(filter) = &request.filter {
                if !filter.matches(&point.metadata) {
                    continue;
                }
            }
            hits.push(build_hit(hit.id, hit.score, &point, request));
        }

        if !outcome.partial {
            self.cache.put(fingerprint, generation, hits.clone());
        }

        Ok(SearchResponse { hits, partial: outcome.partial })
    }

    /// Convenience wrapper over [`Collection::search`] for a text query.
    ///
    /// # Errors
    ///
    /// Same as [`Collection::search`].
    pub fn search_text(&self, text: &str, k: usize, filter: Option<crate::filter::Filter>) -> Result<SearchResponse> {
        self.search(&SearchRequest {
            text: Some(text.to_string()),
            k,
            filter,
            with_metadata: true,
            with_content: true,
            ..SearchRequest::default()
        })
    }

    /// Flushes the page store and WAL, checkpointing the WAL if it has
    /// grown past `wal_max_size` since the last one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] on any underlying flush or fsync failure.
    pub fn flush(&self) -> Result<()> {
        self.store.sync()?;
        self.wal.sync()?;
        Ok(())
    }

    /// Flushes and checkpoints the WAL unconditionally. Called on graceful shutdown.
    ///
    /// # Errors
    ///
    /// Same as [`Collection::flush`].
    pub fn close(&self) -> Result<()> {
        self.store.sync()?;
        write_hnsw_snapshot(&self.dir, &self.descriptor, &self.index)?;
        self.wal.checkpoint()?;
        Ok(())
    }

    /// Drops every result-cache entry whose TTL has elapsed. Called on the
    /// periodic cleanup interval by [`crate::Database`]'s background cleaner.
    pub fn sweep_cache(&self) {
        self.cache.sweep_expired();
    }

    /// Fsyncs the WAL if this collection's durability policy is
    /// [`crate::config::SyncPolicy::Interval`]. Called on the periodic sync
    /// interval by [`crate::Database`]'s background syncer; a no-op under
    /// `PerOp` (already synced on every write) or `Off`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] on fsync failure.
    pub fn sync_wal_on_interval(&self) -> Result<()> {
        if matches!(self.sync_policy, crate::config::SyncPolicy::Interval) {
            self.wal.sync()?;
        }
        Ok(())
    }

    /// Snapshot of this collection's size and cache effectiveness.
    #[must_use]
    pub fn stats(&self) -> CollectionStats {
        CollectionStats {
            vector_count: self.count(),
            dimensions: self.descriptor.dimensions,
            metric: self.descriptor.metric,
            index_kind: self.descriptor.index_kind,
            storage_bytes: self.store.page_count() * u64::from(self.store.page_size()),
            cache_stats: self.cache.stats(),
        }
    }

    /// The on-disk directory backing this collection.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn maybe_checkpoint(&self) -> Result<()> {
        let size = self.wal.size()?;
        if size >= self.wal_max_size {
            tracing::debug!(collection = self.descriptor.name, wal_bytes = size, "checkpointing WAL");
            self.store.sync()?;
            write_hnsw_snapshot(&self.dir, &self.descriptor, &self.index)?;
            self.wal.checkpoint()?;
        }
        Ok(())
    }

    fn require_embedder(&self) -> Result<&Arc<dyn Embedder>> {
        self.embedder
            .as_ref()
            .ok_or_else(|| Error::InvalidArgument("collection has no bound embedder".into()))
    }

    fn resolve_query_vector(&self, request: &SearchRequest) -> Result<Vec<f32>> {
        if let Some(vector) = &request.vector {
            return Ok(vector.clone());
        }
        if let Some(text) = &request.text {
            let embedder = self.require_embedder()?;
            return embedder.embed(text);
        }
        Err(Error::InvalidArgument("search request needs either a vector or text query".into()))
    }
}

fn build_hit(id: String, score: f32, point: &Point, request: &SearchRequest) -> SearchHit {
    SearchHit {
        id,
        score,
        vector: request.with_vectors.then(|| point.vector.clone()),
        metadata: request.with_metadata.then(|| point.metadata.clone()),
        content: request.with_content.then(|| point.content.clone()).flatten(),
    }
}

fn build_index(descriptor: &CollectionDescriptor) -> Arc<dyn VectorIndex> {
    match descriptor.index_kind {
        IndexKind::Flat => Arc::new(FlatIndex::new(descriptor.dimensions, descriptor.metric)),
        IndexKind::Hnsw => {
            let params = hnsw_params_from_descriptor(descriptor);
            Arc::new(HnswIndex::new(descriptor.dimensions, descriptor.metric, params))
        }
    }
}

/// Builds the id-to-page map by scanning the page store's live pages,
/// without touching `index`. Used when the index itself was already
/// restored from a persisted snapshot.
fn scan_id_to_page(store: &Store) -> Result<FxHashMap<String, u32>> {
    let mut id_to_page = FxHashMap::default();
    for page_id in 1..store.page_count() {
        let page_id = u32::try_from(page_id)
            .map_err(|_| Error::Corruption("page id exceeds u32 range".into()))?;
        let page = store.read(page_id)?;
        if page.page_type != PageType::VectorRecord {
            continue;
        }
        for point in page::decode_page_body(&page.body)? {
            id_to_page.insert(point.id, page_id);
        }
    }
    Ok(id_to_page)
}

/// Replays WAL records written since the last checkpoint onto `store`,
/// `index`, and `id_to_page`.
fn replay_wal(
    store: &Store,
    wal: &Wal,
    index: &Arc<dyn VectorIndex>,
    id_to_page: &mut FxHashMap<String, u32>,
) -> Result<()> {
    for entry in wal.recover()? {
        match entry.tag {
            WalTag::Insert => {
                let (point, _) = page::decode_record(&entry.payload)?;
                if let Some(old_page_id) = id_to_page.remove(&point.id) {
                    index.delete(&point.id)?;
                    store.free(old_page_id)?;
                }
                let page_id = store.allocate()?;
                let capacity = store.page_size() as usize - PAGE_HEADER_SIZE;
                let body = page::encode_page_body(std::slice::from_ref(&point), capacity)?;
                store.write(Page { id: page_id, page_type: PageType::VectorRecord, body, free_space_offset: 0 })?;
                index.insert(&point)?;
                id_to_page.insert(point.id, page_id);
            }
            WalTag::Delete => {
                let id = std::str::from_utf8(&entry.payload)
                    .map_err(|e| Error::Corruption(format!("WAL delete payload not utf8: {e}")))?;
                if let Some(page_id) = id_to_page.remove(id) {
                    index.delete(id)?;
                    store.free(page_id)?;
                }
            }
            WalTag::CreateCollection | WalTag::DropCollection | WalTag::MetricNoop | WalTag::Checkpoint => {}
        }
    }
    store.sync()?;
    Ok(())
}

/// Rebuilds `index` and the id-to-page map from scratch: every live page in
/// the store, then any WAL records written since the last checkpoint.
fn rebuild(store: &Store, wal: &Wal, index: &Arc<dyn VectorIndex>) -> Result<FxHashMap<String, u32>> {
    let mut id_to_page = FxHashMap::default();

    for page_id in 1..store.page_count() {
        let page_id = u32::try_from(page_id)
            .map_err(|_| Error::Corruption("page id exceeds u32 range".into()))?;
        let page = store.read(page_id)?;
        if page.page_type != PageType::VectorRecord {
            continue;
        }
        for point in page::decode_page_body(&page.body)? {
            index.insert(&point)?;
            id_to_page.insert(point.id, page_id);
        }
    }

    replay_wal(store, wal, index, &mut id_to_page)?;
    Ok(id_to_page)
}

/// Reads and decodes a persisted HNSW index file for `descriptor`, if one
/// exists. Returns `Ok(None)` for a flat index (no snapshot file) or when
/// no index file has been written yet (a brand-new collection or one never
/// checkpointed).
///
/// # Errors
///
/// Returns [`Error::Corruption`] if the file exists but fails to decode, or
/// its recorded dimensions/metric don't match the descriptor.
fn load_hnsw_snapshot(dir: &Path, descriptor: &CollectionDescriptor) -> Result<Option<Arc<dyn VectorIndex>>> {
    if descriptor.index_kind != IndexKind::Hnsw {
        return Ok(None);
    }
    let path = dir.join(INDEX_FILE);
    if !path.exists() {
        return Ok(None);
    }
    let bytes = fs::read(&path)?;
    let snapshot = hnsw::persistence::decode(&bytes)?;
    let params = hnsw_params_from_descriptor(descriptor);
    let index = HnswIndex::from_snapshot(snapshot, descriptor.dimensions, descriptor.metric, params)?;
    Ok(Some(Arc::new(index)))
}

/// Encodes and atomically writes the current HNSW graph to `dir/index.bin`.
/// A no-op for a flat index, whose pages in the page store already are its
/// persisted form.
///
/// # Errors
///
/// Returns [`Error::Io`] on any write/rename failure.
fn write_hnsw_snapshot(dir: &Path, descriptor: &CollectionDescriptor, index: &Arc<dyn VectorIndex>) -> Result<()> {
    if descriptor.index_kind != IndexKind::Hnsw {
        return Ok(());
    }
    let Some(snapshot) = index.snapshot() else {
        return Ok(());
    };
    let bytes = hnsw::persistence::encode(&snapshot)?;
    let final_path = dir.join(INDEX_FILE);
    let tmp_path = final_path.with_extension("bin.tmp");
    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(&bytes)?;
    file.sync_all()?;
    drop(file);
    fs::rename(&tmp_path, &final_path)?;
    Ok(())
}

fn hnsw_params_from_descriptor(descriptor: &CollectionDescriptor) -> HnswParams {
    HnswParams {
        m: descriptor.hnsw_m,
        max_m: descriptor.hnsw_max_m,
        max_m0: descriptor.hnsw_max_m0,
        ml: descriptor.hnsw_ml,
        ef_construction: descriptor.hnsw_ef_construction,
        ef_search: descriptor.hnsw_ef_search,
        seed: descriptor.hnsw_seed,
    }
}

fn write_descriptor(dir: &Path, descriptor: &CollectionDescriptor) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(descriptor).map_err(|e| Error::Serialization(e.to_string()))?;
    fs::write(dir.join(DESCRIPTOR_FILE), bytes)?;
    Ok(())
}

fn read_descriptor(dir: &Path, name: &str) -> Result<CollectionDescriptor> {
    let path = dir.join(DESCRIPTOR_FILE);
    let bytes = fs::read(&path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound(format!("collection '{name}' does not exist"))
        } else {
            Error::Io(e)
        }
    })?;
    serde_json::from_slice(&bytes).map_err(|e| Error::Serialization(e.to_string()))
}

fn now_unix() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| d.as_secs())
}
