//! Fixed-size page store: allocation, a checksum-verifying read/write path,
//! an in-process page cache, and a free list threaded through freed pages
//! themselves rather than a separate structure.


use crate::error::{Error, Result};
use crate::storage::page::{checksum, MetaPage, Page, PageType, META_PAGE_ID};
use crate::storage::retry::with_io_retry;
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Number of cache shards, each independently locked. Matches the page id
/// modulus used to route a page to its shard.
const NUM_SHARDS: usize = 16;

struct CacheEntry {
    page: Page,
    dirty: bool,
}

#[derive(Default)]
struct CacheShard {
    entries: IndexMap<u32, CacheEntry>,
}

/// Page cache split into independently-locked shards by `page_id % NUM_SHARDS`,
/// so a cache hit on one page never blocks a concurrent hit on another page
/// that happens to land in a different shard.
struct ShardedCache {
    shards: [Mutex<CacheShard>; NUM_SHARDS],
    capacity_per_shard: usize,
}

impl ShardedCache {
    fn new(capacity_pages: usize) -> Self {
        Self {
            shards: std::array::from_fn(|_| Mutex::new(CacheShard::default())),
            capacity_per_shard: (capacity_pages / NUM_SHARDS).max(1),
        }
    }

    #[inline]
    const fn shard_for(page_id: u32) -> usize {
        (page_id as usize) % NUM_SHARDS
    }

    fn get(&self, page_id: u32) -> Option<Page> {
        let shard = self.shards[Self::shard_for(page_id)].lock();
        shard.entries.get(&page_id).map(|e| e.page.clone())
    }

    fn insert(&self, page_id: u32, page: Page, dirty: bool) {
        let mut shard = self.shards[Self::shard_for(page_id)].lock();
        shard.entries.insert(page_id, CacheEntry { page, dirty });
        Self::evict_if_needed(&mut shard, self.capacity_per_shard);
    }

    fn remove(&self, page_id: u32) {
        let mut shard = self.shards[Self::shard_for(page_id)].lock();
        shard.entries.swap_remove(&page_id);
    }

    fn mark_clean(&self, page_id: u32) {
        let mut shard = self.shards[Self::shard_for(page_id)].lock();
        if let Some(entry) = shard.entries.get_mut(&page_id) {
            entry.dirty = false;
        }
    }

    /// All dirty pages across every shard, in no particular order.
    fn dirty_pages(&self) -> Vec<Page> {
        let mut out = Vec::new();
        for shard in &self.shards {
            let guard = shard.lock();
            out.extend(guard.entries.values().filter(|e| e.dirty).map(|e| e.page.clone()));
        }
        out
    }

    fn evict_if_needed(shard: &mut CacheShard, capacity: usize) {
        while shard.entries.len() > capacity {
            // Evict the oldest clean entry; dirty pages stay resident until synced
            // so eviction never silently drops unflushed writes.
            let victim = shard.entries.iter().find(|(_, entry)| !entry.dirty).map(|(id, _)| *id);
            match victim {
                Some(id) => {
                    shard.entries.shift_remove(&id);
                }
                None => break, // everything resident is dirty; grow past capacity rather than lose data
            }
        }
    }
}

/// The store's sequential, file-backed state: the open handle and the
/// allocator bookkeeping (page count, free-list head). Unlike the cache,
/// this cannot be sharded — it's a single file offset space and a single
/// free-list chain — so it stays behind one lock.
struct StoreFile {
    file: File,
    page_size: u32,
    page_count: u64,
    free_list_head: u32,
}

/// A fixed-page-size file store: page 0 is the meta page, every other page
/// is either a vector-record page or a free-list page.
///
/// The page cache is split into [`NUM_SHARDS`] independently-locked shards
/// keyed by page id, so concurrent cache hits on different pages don't
/// contend with each other. File I/O itself — a cache miss, a write-through,
/// or a sync — still serializes through a single lock around the one
/// underlying file handle, since reads and writes share its seek position.
pub struct Store {
    file: Mutex<StoreFile>,
    cache: ShardedCache,
    sync_writes: bool,
    max_retries: u32,
}

impl Store {
    /// Opens the page file at `path`, creating it (with a fresh meta page)
    /// if absent.
    ///
    /// `max_retries` bounds how many times a transient fsync/write failure is
    /// retried, with exponential backoff, before being surfaced as [`Error::Io`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] on file-system failure and [`Error::Corruption`]
    /// if an existing file's meta page is invalid.
    pub fn open(
        path: impl AsRef<Path>,
        page_size: u32,
        cache_pages: usize,
        sync_writes: bool,
        max_retries: u32,
    ) -> Result<Self> {
        let path = path.as_ref();
        let existed = path.exists();
        let mut file = OpenOptions::new().create(true).read(true).write(true).open(path)?;

        let (page_count, free_list_head) = if existed && file.metadata()?.len() > 0 {
            let mut buf = vec![0u8; page_size as usize];
            file.seek(SeekFrom::Start(0))?;
            file.read_exact(&mut buf)?;
            let meta = MetaPage::decode(&buf)?;
            if meta.page_size != page_size {
                return Err(Error::Config(format!(
                    "page store opened with page_size {page_size} but file uses {}",
                    meta.page_size
                )));
            }
            (meta.page_count, meta.free_list_head)
        } else {
            let meta = MetaPage {
                page_size,
                page_count: 1,
                free_list_head: 0,
            };
            let buf = meta.encode()?;
            file.seek(SeekFrom::Start(0))?;
            file.write_all(&buf)?;
            file.sync_all()?;
            (1, 0)
        };

        Ok(Self {
            file: Mutex::new(StoreFile {
                file,
                page_size,
                page_count,
                free_list_head,
            }),
            cache: ShardedCache::new(cache_pages.max(1)),
            sync_writes,
            max_retries,
        })
    }

    /// Allocates a page, reusing one from the free list when available.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] on a read/write failure against the backing file.
    pub fn allocate(&self) -> Result<u32> {
        let mut file = self.file.lock();
        if file.free_list_head != 0 {
            let id = file.free_list_head;
            let page = self.read_page_locked(&mut file, id)?;
            let next = u32::from_le_bytes(page.body[0..4].try_into().unwrap());
            file.free_list_head = next;
            self.cache.remove(id);
            Ok(id)
        } else {
            let id = u32::try_from(file.page_count)
                .map_err(|_| Error::IndexFull("page store exhausted u32 page ids".into()))?;
            file.page_count += 1;
            Ok(id)
        }
    }

    /// Reads a page, verifying its checksum.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Corruption`] on a checksum mismatch and [`Error::Io`]
    /// on a read failure.
    pub fn read(&self, page_id: u32) -> Result<Page> {
        if let Some(page) = self.cache.get(page_id) {
            return Ok(page);
        }
        let mut file = self.file.lock();
        self.read_page_locked(&mut file, page_id)
    }

    fn read_page_locked(&self, file: &mut StoreFile, page_id: u32) -> Result<Page> {
        if let Some(page) = self.cache.get(page_id) {
            return Ok(page);
        }
        let page_size = file.page_size as usize;
        let mut buf = vec![0u8; page_size];
        file.file.seek(SeekFrom::Start(page_id as u64 * page_size as u64))?;
        file.file.read_exact(&mut buf)?;
        let page = Page::decode(&buf)?;
        self.cache.insert(page_id, page.clone(), false);
        Ok(page)
    }

    /// Writes a page back into the cache, marking it dirty. If the store was
    /// opened with `sync_writes`, the page is flushed to disk immediately.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] on a write failure when `sync_writes` is set.
    pub fn write(&self, page: Page) -> Result<()> {
        let id = page.id;
        if self.sync_writes {
            let mut file = self.file.lock();
            Self::flush_page_locked(&mut file, &page, self.max_retries)?;
            self.cache.insert(id, page, false);
        } else {
            self.cache.insert(id, page, true);
        }
        Ok(())
    }

    fn flush_page_locked(file: &mut StoreFile, page: &Page, max_retries: u32) -> Result<()> {
        let page_size = file.page_size as u64;
        let encoded = page.encode();
        with_io_retry(max_retries, || {
            file.file.seek(SeekFrom::Start(u64::from(page.id) * page_size))?;
            file.file.write_all(&encoded)?;
            file.file.sync_data()?;
            Ok(())
        })
    }

    /// Returns a page to the free list, overwriting its body with a pointer
    /// to the previous free-list head.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `page_id` is the meta page, since
    /// the free list must never reference it.
    pub fn free(&self, page_id: u32) -> Result<()> {
        if page_id == META_PAGE_ID {
            return Err(Error::InvalidArgument("cannot free the meta page".into()));
        }
        let mut file = self.file.lock();
        let page_size = file.page_size;
        let mut page = Page::new(page_id, PageType::FreeList, page_size);
        page.body[0..4].copy_from_slice(&file.free_list_head.to_le_bytes());
        file.free_list_head = page_id;
        if self.sync_writes {
            Self::flush_page_locked(&mut file, &page, self.max_retries)?;
            self.cache.insert(page_id, page, false);
        } else {
            self.cache.insert(page_id, page, true);
        }
        Ok(())
    }

    /// Flushes all dirty pages and the meta page to disk, in the order the
    /// on-disk format requires: vector-record pages, then free-list pages,
    /// then the meta page last.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] on any underlying write or fsync failure.
    pub fn sync(&self) -> Result<()> {
        let mut file = self.file.lock();

        let mut vector_pages = Vec::new();
        let mut free_list_pages = Vec::new();
        for page in self.cache.dirty_pages() {
            match page.page_type {
                PageType::VectorRecord => vector_pages.push(page),
                PageType::FreeList => free_list_pages.push(page),
                PageType::Meta => {}
            }
        }
        for page in vector_pages.into_iter().chain(free_list_pages) {
            Self::flush_page_locked(&mut file, &page, self.max_retries)?;
            self.cache.mark_clean(page.id);
        }

        let meta = MetaPage {
            page_size: file.page_size,
            page_count: file.page_count,
            free_list_head: file.free_list_head,
        };
        let encoded = meta.encode()?;
        let max_retries = self.max_retries;
        with_io_retry(max_retries, || {
            file.file.seek(SeekFrom::Start(0))?;
            file.file.write_all(&encoded)?;
            file.file.sync_all()?;
            Ok(())
        })
    }

    /// Number of pages in the file, including the meta page.
    pub fn page_count(&self) -> u64 {
        self.file.lock().page_count
    }

    /// Configured page size in bytes.
    pub fn page_size(&self) -> u32 {
        self.file.lock().page_size
    }
}

/// Verifies a raw on-disk buffer's checksum without going through the cache;
/// used by offline consistency checks.
#[must_use]
pub fn verify_checksum(body: &[u8], stored: u32) -> bool {
    checksum(body) == stored
}
