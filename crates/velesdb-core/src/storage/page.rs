//! Page header/body encoding: the fixed-size-page wire format fixed by the
//! on-disk layout (meta page, vector-record pages, free-list pages).
//!
//! Checksums use CRC-32C (Castagnoli), matching the on-disk format's
//! checksum requirement and the hardware-accelerated polynomial most
//! storage engines in this ecosystem settle on.


use crate::error::{Error, Result};
use crate::point::Point;
use std::convert::TryInto;

/// Magic bytes identifying a VelesDB page file.
pub const MAGIC: &[u8; 8] = b"VITTv1\0\0";

/// Page id reserved for the file's meta page.
pub const META_PAGE_ID: u32 = 0;

/// Size, in bytes, of the generic per-page header (id, type, checksum, free-space offset).
pub const PAGE_HEADER_SIZE: usize = 4 + 1 + 4 + 2;

/// Tag identifying the kind of a non-meta page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    /// The distinguished page 0 carrying the file header.
    Meta,
    /// A page holding encoded vector records.
    VectorRecord,
    /// A page on the free list.
    FreeList,
}

impl PageType {
    const fn tag(self) -> u8 {
        match self {
            Self::Meta => 0,
            Self::VectorRecord => 1,
            Self::FreeList => 2,
        }
    }

    fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(Self::Meta),
            1 => Ok(Self::VectorRecord),
            2 => Ok(Self::FreeList),
            _ => Err(Error::Corruption(format!("unknown page type tag {tag}"))),
        }
    }
}

/// Computes the checksum used throughout the on-disk format.
#[must_use]
pub fn checksum(bytes: &[u8]) -> u32 {
    crc32c::crc32c(bytes)
}

/// The file-header page (page 0). Not itself checksummed; its own magic and
/// version serve as the corruption check on open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaPage {
    /// Page size in bytes, fixed for the lifetime of the file.
    pub page_size: u32,
    /// Total number of pages in the file, including page 0.
    pub page_count: u64,
    /// Head of the free-list chain, or `0` if empty.
    pub free_list_head: u32,
}

impl MetaPage {
    /// Encodes the meta page into a buffer of exactly `page_size` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `page_size` is too small to hold the header.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let page_size = self.page_size as usize;
        if page_size < MAGIC.len() + 4 + 8 + 4 {
            return Err(Error::Config(format!(
                "page_size {page_size} too small for meta page header"
            )));
        }
        let mut buf = vec![0u8; page_size];
        buf[0..8].copy_from_slice(MAGIC);
        buf[8..12].copy_from_slice(&self.page_size.to_le_bytes());
        buf[12..20].copy_from_slice(&self.page_count.to_le_bytes());
        buf[20..24].copy_from_slice(&self.free_list_head.to_le_bytes());
        Ok(buf)
    }

    /// Decodes and validates a meta page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Corruption`] if the magic bytes don't match.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < 24 || &buf[0..8] != MAGIC {
            return Err(Error::Corruption("meta page magic mismatch".into()));
        }
        let page_size = u32::from_le_bytes(buf[8..12].try_into().unwrap());
        let page_count = u64::from_le_bytes(buf[12..20].try_into().unwrap());
        let free_list_head = u32::from_le_bytes(buf[20..24].try_into().unwrap());
        Ok(Self {
            page_size,
            page_count,
            free_list_head,
        })
    }
}

/// A decoded non-meta page: header plus raw body bytes.
#[derive(Debug, Clone)]
pub struct Page {
    /// This page's id.
    pub id: u32,
    /// Page kind.
    pub page_type: PageType,
    /// Raw body bytes, `page_size - PAGE_HEADER_SIZE` long.
    pub body: Vec<u8>,
    /// Offset into `body` where free space begins.
    pub free_space_offset: u16,
}

impl Page {
    /// Creates a fresh, empty page of the given type.
    #[must_use]
    pub fn new(id: u32, page_type: PageType, page_size: u32) -> Self {
        Self {
            id,
            page_type,
            body: vec![0u8; page_size as usize - PAGE_HEADER_SIZE],
            free_space_offset: 0,
        }
    }

    /// Encodes the page, recomputing the checksum over `body`.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(PAGE_HEADER_SIZE + self.body.len());
        buf.extend_from_slice(&self.id.to_le_bytes());
        buf.push(self.page_type.tag());
        let crc = checksum(&self.body);
        buf.extend_from_slice(&crc.to_le_bytes());
        buf.extend_from_slice(&self.free_space_offset.to_le_bytes());
        buf.extend_from_slice(&self.body);
        buf
    }

    /// Decodes a page, verifying the stored checksum against the body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Corruption`] on a checksum or page-type mismatch.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < PAGE_HEADER_SIZE {
            return Err(Error::Corruption("page shorter than header".into()));
        }
        let id = u32::from_le_bytes(buf[0..4].try_into().unwrap());
        let page_type = PageType::from_tag(buf[4])?;
        let stored_crc = u32::from_le_bytes(buf[5..9].try_into().unwrap());
        let free_space_offset = u16::from_le_bytes(buf[9..11].try_into().unwrap());
        let body = buf[PAGE_HEADER_SIZE..].to_vec();
        let actual_crc = checksum(&body);
        if actual_crc != stored_crc {
            return Err(Error::Corruption(format!("page {id} checksum mismatch")));
        }
        Ok(Self {
            id,
            page_type,
            body,
            free_space_offset,
        })
    }
}

/// Encodes a single vector record: `id_len(u16) · id · dim(u16) · values(f32 LE * dim)
/// · metadata_len(u32) · metadata (JSON bytes) · content_len(u32) · content`.
///
/// JSON is used as the self-describing metadata encoding the wire format
/// calls for (the format footnote allows "CBOR or equivalent").
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `id` exceeds `u16::MAX` bytes or
/// `values` exceeds `u16::MAX` components, and [`Error::Serialization`] if
/// metadata fails to encode.
pub fn encode_record(point: &Point) -> Result<Vec<u8>> {
    let id_bytes = point.id.as_bytes();
    let id_len: u16 = id_bytes
        .len()
        .try_into()
        .map_err(|_| Error::InvalidArgument("id too long to encode".into()))?;
    let dim: u16 = point
        .vector
        .len()
        .try_into()
        .map_err(|_| Error::InvalidArgument("vector too long to encode".into()))?;
    let metadata_bytes =
        serde_json::to_vec(&point.metadata).map_err(|e| Error::Serialization(e.to_string()))?;
    let content_bytes = point.content.as_deref().unwrap_or("").as_bytes();

    let mut buf = Vec::new();
    buf.extend_from_slice(&id_len.to_le_bytes());
    buf.extend_from_slice(id_bytes);
    buf.extend_from_slice(&dim.to_le_bytes());
    for v in &point.vector {
        buf.extend_from_slice(&v.to_le_bytes());
    }
    buf.extend_from_slice(&(metadata_bytes.len() as u32).to_le_bytes());
    buf.extend_from_slice(&metadata_bytes);
    buf.extend_from_slice(&(content_bytes.len() as u32).to_le_bytes());
    buf.extend_from_slice(content_bytes);
    Ok(buf)
}

/// Decodes a single vector record starting at `buf[0]`, returning the point
/// and the number of bytes consumed.
///
/// # Errors
///
/// Returns [`Error::Corruption`] if `buf` is too short for the lengths it declares.
pub fn decode_record(buf: &[u8]) -> Result<(Point, usize)> {
    let mut offset = 0usize;
    let id_len = read_u16(buf, &mut offset)?;
    let id = read_str(buf, &mut offset, id_len as usize)?;
    let dim = read_u16(buf, &mut offset)?;
    let mut vector = Vec::with_capacity(dim as usize);
    for _ in 0..dim {
        vector.push(f32::from_le_bytes(read_bytes(buf, &mut offset, 4)?.try_into().unwrap()));
    }
    let metadata_len = read_u32(buf, &mut offset)?;
    let metadata_bytes = read_bytes(buf, &mut offset, metadata_len as usize)?;
    let metadata = serde_json::from_slice(metadata_bytes)
        .map_err(|e| Error::Corruption(format!("metadata decode failed: {e}")))?;
    let content_len = read_u32(buf, &mut offset)?;
    let content_bytes = read_bytes(buf, &mut offset, content_len as usize)?;
    let content = if content_bytes.is_empty() {
        None
    } else {
        Some(
            std::str::from_utf8(content_bytes)
                .map_err(|e| Error::Corruption(format!("content not utf8: {e}")))?
                .to_string(),
        )
    };

    Ok((
        Point {
            id,
            vector,
            metadata,
            content,
        },
        offset,
    ))
}

fn read_bytes<'a>(buf: &'a [u8], offset: &mut usize, len: usize) -> Result<&'a [u8]> {
    let end = offset.checked_add(len).ok_or_else(|| Error::Corruption("length overflow".into()))?;
    let slice = buf.get(*offset..end).ok_or_else(|| Error::Corruption("record truncated".into()))?;
    *offset = end;
    Ok(slice)
}

fn read_u16(buf: &[u8], offset: &mut usize) -> Result<u16> {
    Ok(u16::from_le_bytes(read_bytes(buf, offset, 2)?.try_into().unwrap()))
}

fn read_u32(buf: &[u8], offset: &mut usize) -> Result<u32> {
    Ok(u32::from_le_bytes(read_bytes(buf, offset, 4)?.try_into().unwrap()))
}

fn read_str(buf: &[u8], offset: &mut usize, len: usize) -> Result<String> {
    let bytes = read_bytes(buf, offset, len)?;
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| Error::Corruption(format!("id not utf8: {e}")))
}

/// Encodes a vector-record page body: `record count (u16 LE)` followed by
/// each record's [`encode_record`] framing, back to back.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `records` exceeds `u16::MAX` entries
/// or doesn't fit within `capacity` bytes, propagating any [`encode_record`] error.
pub fn encode_page_body(records: &[Point], capacity: usize) -> Result<Vec<u8>> {
    let count: u16 = records
        .len()
        .try_into()
        .map_err(|_| Error::InvalidArgument("too many records for one page".into()))?;
    let mut buf = Vec::with_capacity(capacity);
    buf.extend_from_slice(&count.to_le_bytes());
    for record in records {
        buf.extend_from_slice(&encode_record(record)?);
    }
    if buf.len() > capacity {
        return Err(Error::InvalidArgument(format!(
            "encoded records ({} bytes) exceed page capacity ({capacity} bytes)",
            buf.len()
        )));
    }
    buf.resize(capacity, 0);
    Ok(buf)
}

/// Decodes a vector-record page body produced by [`encode_page_body`].
///
/// # Errors
///
/// Returns [`Error::Corruption`] if the declared record count doesn't fit
/// the body, propagating any [`decode_record`] error.
pub fn decode_page_body(body: &[u8]) -> Result<Vec<Point>> {
    let mut offset = 0usize;
    let count = read_u16(body, &mut offset)?;
    let mut records = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let (point, consumed) = decode_record(&body[offset..])?;
        offset += consumed;
        records.push(point);
    }
    Ok(records)
}
