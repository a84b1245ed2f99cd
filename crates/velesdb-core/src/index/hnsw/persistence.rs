//! Binary persistence for the HNSW index file: `version (u16) · dimensions
//! (u32) · metric tag (u8) · node count (u64) · repeated nodes (id_len u16 ·
//! id · layer u8 · per-layer neighbor lists as length-prefixed id arrays)`.


use crate::distance::DistanceMetric;
use crate::error::{Error, Result};

const FORMAT_VERSION: u16 = 1;

/// A decoded HNSW index file: everything needed to rebuild the in-memory graph.
pub struct IndexSnapshot {
    /// Vector dimensionality recorded in the file.
    pub dimensions: usize,
    /// Distance metric recorded in the file.
    pub metric: DistanceMetric,
    /// `(id, vector, layer, neighbor ids per layer)` for every live node.
    pub nodes: Vec<(String, Vec<f32>, usize, Vec<Vec<String>>)>,
}

/// Encodes a snapshot into the on-disk HNSW index file format.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if any id, layer list, or the node
/// count exceeds what the format's fixed-width fields can represent.
pub fn encode(snapshot: &IndexSnapshot) -> Result<Vec<u8>> {
    let node_count: u64 = snapshot
        .nodes
        .len()
        .try_into()
        .map_err(|_| Error::InvalidArgument("too many nodes to encode".into()))?;
    let dimensions: u32 = snapshot
        .dimensions
        .try_into()
        .map_err(|_| Error::InvalidArgument("dimensions too large to encode".into()))?;

    let mut buf = Vec::new();
    buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    buf.extend_from_slice(&dimensions.to_le_bytes());
    buf.push(snapshot.metric.tag());
    buf.extend_from_slice(&node_count.to_le_bytes());

    for (id, vector, layer, neighbors) in &snapshot.nodes {
        let id_bytes = id.as_bytes();
        let id_len: u16 = id_bytes
            .len()
            .try_into()
            .map_err(|_| Error::InvalidArgument("id too long to encode".into()))?;
        buf.extend_from_slice(&id_len.to_le_bytes());
        buf.extend_from_slice(id_bytes);

        let layer_tag: u8 = (*layer)
            .try_into()
            .map_err(|_| Error::InvalidArgument("layer exceeds u8 range".into()))?;
        buf.push(layer_tag);

        for v in vector {
            buf.extend_from_slice(&v.to_le_bytes());
        }

        // `layer` above already fixes the neighbor-list count at `layer + 1`.
        for layer_neighbors in neighbors {
            let count: u32 = layer_neighbors
                .len()
                .try_into()
                .map_err(|_| Error::InvalidArgument("neighbor list too long to encode".into()))?;
            buf.extend_from_slice(&count.to_le_bytes());
            for neighbor_id in layer_neighbors {
                let bytes = neighbor_id.as_bytes();
                let len: u16 = bytes
                    .len()
                    .try_into()
                    .map_err(|_| Error::InvalidArgument("neighbor id too long to encode".into()))?;
                buf.extend_from_slice(&len.to_le_bytes());
                buf.extend_from_slice(bytes);
            }
        }
    }

    Ok(buf)
}

/// Decodes an HNSW index file produced by [`encode`].
///
/// # Errors
///
/// Returns [`Error::Corruption`] if the buffer is truncated, declares an
/// unsupported version, or contains invalid UTF-8 ids.
pub fn decode(buf: &[u8]) -> Result<IndexSnapshot> {
    let mut offset = 0usize;
    let version = read_u16(buf, &mut offset)?;
    if version != FORMAT_VERSION {
        return Err(Error::Corruption(format!("unsupported HNSW index file version {version}")));
    }
    let dimensions = read_u32(buf, &mut offset)? as usize;
    let metric_tag = read_u8(buf, &mut offset)?;
    let metric = DistanceMetric::from_tag(metric_tag)?;
    let node_count = read_u64(buf, &mut offset)?;

    let mut nodes = Vec::with_capacity(node_count as usize);
    for _ in 0..node_count {
        let id_len = read_u16(buf, &mut offset)?;
        let id = read_str(buf, &mut offset, id_len as usize)?;
        let layer = read_u8(buf, &mut offset)? as usize;

        let mut vector = Vec::with_capacity(dimensions);
        for _ in 0..dimensions {
            vector.push(f32::from_le_bytes(read_bytes(buf, &mut offset, 4)?.try_into().unwrap()));
        }

        let layer_count = layer + 1;
        let mut neighbors = Vec::with_capacity(layer_count);
        for _ in 0..layer_count {
            let count = read_u32(buf, &mut offset)?;
            let mut layer_neighbors = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let len = read_u16(buf, &mut offset)?;
                layer_neighbors.push(read_str(buf, &mut offset, len as usize)?);
            }
            neighbors.push(layer_neighbors);
        }

        nodes.push((id, vector, layer, neighbors));
    }

    Ok(IndexSnapshot { dimensions, metric, nodes })
}

fn read_bytes<'a>(buf: &'a [u8], offset: &mut usize, len: usize) -> Result<&'a [u8]> {
    let end = offset.checked_add(len).ok_or_else(|| Error::Corruption("length overflow".into()))?;
    let slice = buf.get(*offset..end).ok_or_else(|| Error::Corruption("index file truncated".into()))?;
    *offset = end;
    Ok(slice)
}

fn read_u8(buf: &[u8], offset: &mut usize) -> Result<u8> {
    Ok(read_bytes(buf, offset, 1)?[0])
}

fn read_u16(buf: &[u8], offset: &mut usize) -> Result<u16> {
    Ok(u16::from_le_bytes(read_bytes(buf, offset, 2)?.try_into().unwrap()))
}

fn read_u32(buf: &[u8], offset: &mut usize) -> Result<u32> {
    Ok(u32::from_le_bytes(read_bytes(buf, offset, 4)?.try_into().unwrap()))
}

fn read_u64(buf: &[u8], offset: &mut usize) -> Result<u64> {
    Ok(u64::from_le_bytes(read_bytes(buf, offset, 8)?.try_into().unwrap()))
}

fn read_str(buf: &[u8], offset: &mut usize, len: usize) -> Result<String> {
    let bytes = read_bytes(buf, offset, len)?;
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| Error::Corruption(format!("id not utf8: {e}")))
}
