//! Pure chunk arithmetic over a zone buffer.
//!
//! Chunk `c` of a zone under budget `m` covers `[c*m, min(len, (c+1)*m))`.
//! A zone always has at least one chunk, so an empty zone is addressable
//! as the single empty chunk 0. A budget of zero disables splitting.

use std::ops::Range;

use bytes::Bytes;

use crate::error::{WorkspaceError, WorkspaceResult};

pub fn chunk_count(len: usize, max_chunk_size: usize) -> u64 {
    if max_chunk_size == 0 || len == 0 {
        return 1;
    }
    len.div_ceil(max_chunk_size) as u64
}

/// Byte range of chunk `chunk_id`, or `None` past the last chunk.
pub fn chunk_range(len: usize, chunk_id: u64, max_chunk_size: usize) -> Option<Range<usize>> {
    if chunk_id >= chunk_count(len, max_chunk_size) {
        return None;
    }
    if max_chunk_size == 0 {
        return Some(0..len);
    }
    // chunk_id < chunk_count, so the start fits in usize
    let start = chunk_id as usize * max_chunk_size;
    let end = start.saturating_add(max_chunk_size).min(len);
    Some(start..end)
}

/// Zero-copy slice of one chunk.
pub fn chunk_at(bytes: &Bytes, chunk_id: u64, max_chunk_size: usize) -> WorkspaceResult<Bytes> {
    match chunk_range(bytes.len(), chunk_id, max_chunk_size) {
        Some(range) => Ok(bytes.slice(range)),
        None => Err(WorkspaceError::OutOfRange {
            chunk_id,
            chunk_count: chunk_count(bytes.len(), max_chunk_size),
        }),
    }
}

/// All chunks of a zone buffer, in order.
pub fn chunks(bytes: &Bytes, max_chunk_size: usize) -> impl Iterator<Item = Bytes> + '_ {
    (0..chunk_count(bytes.len(), max_chunk_size)).filter_map(move |id| {
        chunk_range(bytes.len(), id, max_chunk_size).map(|range| bytes.slice(range))
    })
}
