//! Write-ahead log: an append-only file of framed records, paired with one
//! collection, replayed on open to recover writes that committed before a
//! crash but hadn't yet reached a checkpoint.


use crate::error::{Error, Result};
use crate::storage::page::checksum;
use crate::storage::retry::with_io_retry;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

const HEADER_LEN: usize = 8 + 1 + 4; // seq + tag + length
const TRAILER_LEN: usize = 4; // crc32

/// Logical operation a WAL record represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalTag {
    /// A vector was inserted (or replaced an existing id).
    Insert,
    /// A vector id was deleted.
    Delete,
    /// A collection was created.
    CreateCollection,
    /// A collection was dropped.
    DropCollection,
    /// Reserved no-op used for metric/parameter bookkeeping; carries no replay effect.
    MetricNoop,
    /// Marks a checkpoint: everything before it has been durably applied to the page store.
    Checkpoint,
}

impl WalTag {
    const fn to_byte(self) -> u8 {
        match self {
            Self::Insert => 0,
            Self::Delete => 1,
            Self::CreateCollection => 2,
            Self::DropCollection => 3,
            Self::MetricNoop => 4,
            Self::Checkpoint => 5,
        }
    }

    fn from_byte(b: u8) -> Result<Self> {
        match b {
            0 => Ok(Self::Insert),
            1 => Ok(Self::Delete),
            2 => Ok(Self::CreateCollection),
            3 => Ok(Self::DropCollection),
            4 => Ok(Self::MetricNoop),
            5 => Ok(Self::Checkpoint),
            _ => Err(Error::Corruption(format!("unknown WAL record tag {b}"))),
        }
    }
}

/// A decoded WAL record, as produced by [`Wal::recover`].
#[derive(Debug, Clone)]
pub struct WalEntry {
    /// Monotonically increasing sequence number assigned at append time.
    pub seq: u64,
    /// The logical operation this record represents.
    pub tag: WalTag,
    /// Opaque payload (an encoded vector record for `Insert`, a bare id for `Delete`, etc).
    pub payload: Vec<u8>,
}

fn frame(seq: u64, tag: WalTag, payload: &[u8]) -> Vec<u8> {
    let mut header = Vec::with_capacity(HEADER_LEN);
    header.extend_from_slice(&seq.to_le_bytes());
    header.push(tag.to_byte());
    header.extend_from_slice(&(payload.len() as u32).to_le_bytes());

    let mut crc_input = header.clone();
    crc_input.extend_from_slice(payload);
    let crc = checksum(&crc_input);

    let mut record = header;
    record.extend_from_slice(payload);
    record.extend_from_slice(&crc.to_le_bytes());
    record
}

struct WalInner {
    file: File,
}

/// Append-only write-ahead log backing one collection.
pub struct Wal {
    path: PathBuf,
    inner: Mutex<WalInner>,
    next_seq: AtomicU64,
    max_retries: u32,
}

impl Wal {
    /// Opens (creating if absent) the WAL file at `path`. Does not replay it —
    /// call [`Wal::recover`] separately so the caller controls when replay runs.
    ///
    /// `max_retries` bounds how many times a transient append/fsync failure is
    /// retried, with exponential backoff, before being surfaced as [`Error::Io`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be opened, or [`Error::Corruption`]
    /// if an existing file contains a torn header past an otherwise intact prefix
    /// that can't be used to seed the next sequence number.
    pub fn open(path: impl AsRef<Path>, max_retries: u32) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).read(true).append(true).open(&path)?;
        let next_seq = Self::scan_last_seq(&path)?.map_or(1, |last| last + 1);
        Ok(Self {
            path,
            inner: Mutex::new(WalInner { file }),
            next_seq: AtomicU64::new(next_seq),
            max_retries,
        })
    }

    fn scan_last_seq(path: &Path) -> Result<Option<u64>> {
        let entries = Self::read_all(path)?;
        Ok(entries.last().map(|e| e.seq))
    }

    fn read_all(path: &Path) -> Result<Vec<WalEntry>> {
        let mut file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        Ok(parse_records(&bytes))
    }

    /// Scans the file from the start, returning every intact record up to (and
    /// not including) the first torn or corrupt one. A torn trailing record —
    /// the common shape of a crash mid-append — is silently discarded rather
    /// than treated as an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] on a read failure.
    pub fn recover(&self) -> Result<Vec<WalEntry>> {
        Self::read_all(&self.path)
    }

    /// Appends a record, returning its assigned sequence number. Does not
    /// fsync; callers apply the configured sync policy separately via [`Wal::sync`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] on a write failure.
    pub fn append(&self, tag: WalTag, payload: &[u8]) -> Result<u64> {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        let record = frame(seq, tag, payload);
        let mut inner = self.inner.lock();
        with_io_retry(self.max_retries, || Ok(inner.file.write_all(&record)?))?;
        Ok(seq)
    }

    /// Flushes and fsyncs the log file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] on a flush or fsync failure.
    pub fn sync(&self) -> Result<()> {
        let inner = self.inner.lock();
        with_io_retry(self.max_retries, || Ok(inner.file.sync_data()?))
    }

    /// Current on-disk size in bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file's metadata can't be read.
    pub fn size(&self) -> Result<u64> {
        let inner = self.inner.lock();
        Ok(inner.file.metadata()?.len())
    }

    /// Appends a checkpoint record, fsyncs, then truncates the log back to
    /// just that record. Callers must have already fsynced the page store
    /// before calling this, per the ordering §4.C requires.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] on any underlying file operation failure.
    pub fn checkpoint(&self) -> Result<()> {
        let seq = self.append(WalTag::Checkpoint, &[])?;
        self.sync()?;

        let record = frame(seq, WalTag::Checkpoint, &[]);
        let mut inner = self.inner.lock();
        inner.file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(true)
            .append(false)
            .open(&self.path)?;
        inner.file.write_all(&record)?;
        inner.file.sync_data()?;
        inner.file.seek(SeekFrom::End(0))?;
        drop(inner);

        // Reopen in append mode so subsequent appends land after the checkpoint record.
        let mut inner = self.inner.lock();
        inner.file = OpenOptions::new().create(true).read(true).append(true).open(&self.path)?;
        Ok(())
    }
}

fn parse_records(bytes: &[u8]) -> Vec<WalEntry> {
    let mut entries = Vec::new();
    let mut offset = 0usize;
    while offset + HEADER_LEN <= bytes.len() {
        let seq = u64::from_le_bytes(bytes[offset..offset + 8].try_into().unwrap());
        let tag_byte = bytes[offset + 8];
        let length = u32::from_le_bytes(bytes[offset + 9..offset + 13].try_into().unwrap()) as usize;

        let Ok(tag) = WalTag::from_byte(tag_byte) else {
            tracing::warn!(
                offset,
                tag_byte,
                discarded_bytes = bytes.len() - offset,
                "WAL recovery stopped at unknown record tag; remaining bytes discarded"
            );
            break;
        };
        let record_end = offset + HEADER_LEN + length + TRAILER_LEN;
        if record_end > bytes.len() {
            tracing::warn!(
                offset,
                seq,
                discarded_bytes = bytes.len() - offset,
                "WAL recovery stopped at a torn trailing record; remaining bytes discarded"
            );
            break;
        }
        let payload = &bytes[offset + HEADER_LEN..offset + HEADER_LEN + length];
        let stored_crc =
            u32::from_le_bytes(bytes[record_end - TRAILER_LEN..record_end].try_into().unwrap());
        let crc_input = &bytes[offset..offset + HEADER_LEN + length];
        if checksum(crc_input) != stored_crc {
            tracing::warn!(
                offset,
                seq,
                discarded_bytes = bytes.len() - offset,
                "WAL recovery stopped at a checksum mismatch; remaining bytes discarded"
            );
            break;
        }

        entries.push(WalEntry {
            seq,
            tag,
            payload: payload.to_vec(),
        });
        offset = record_end;
    }
    entries
}
