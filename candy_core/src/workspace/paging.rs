//! Stateless paging over a workspace.
//!
//! A page is the single re-chunked chunk at a cursor. The collection is
//! not mutated and no server-side state is kept, so the same
//! `(collection, max_chunk_size, cursor)` always yields the same page and
//! an interrupted transfer resumes from the last cursor it received.

use std::fmt;

use bytes::Bytes;
use tracing::trace;

use crate::error::WorkspaceResult;

use super::ChunkingOutcome;
use super::chunk;
use super::collection::{AddressedChunk, AddressedChunkCollection, ChunkPayload};

/// Position of the next chunk to request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cursor {
    pub zone_id: u64,
    pub chunk_id: u64,
}

impl Cursor {
    pub const START: Cursor = Cursor::new(0, 0);

    pub const fn new(zone_id: u64, chunk_id: u64) -> Self {
        Self { zone_id, chunk_id }
    }

    /// Offset of this chunk's first byte within its zone.
    pub fn byte_offset(&self, max_chunk_size: usize) -> u64 {
        self.chunk_id.saturating_mul(max_chunk_size as u64)
    }

    /// The chunk holding the same byte offset under budget `to`, given
    /// this cursor was issued under budget `from`.
    pub fn rebase(&self, from: usize, to: usize) -> Cursor {
        let chunk_id = if to == 0 {
            0
        } else {
            let offset = self.chunk_id as u128 * from as u128;
            u64::try_from(offset / to as u128).unwrap_or(u64::MAX)
        };
        Cursor::new(self.zone_id, chunk_id)
    }

    /// The following chunk in the same zone, if the zone has one.
    pub fn next_in(&self, zone_chunk_count: u64) -> Option<Cursor> {
        let chunk_id = self.chunk_id.checked_add(1)?;
        (chunk_id < zone_chunk_count).then_some(Cursor::new(self.zone_id, chunk_id))
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.zone_id, self.chunk_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// `Complete` when the page carries the last chunk of its zone.
    pub outcome: ChunkingOutcome,
    pub chunks: AddressedChunkCollection,
    /// Where to resume; `None` once the whole workspace has been paged.
    pub next: Option<Cursor>,
}

impl AddressedChunkCollection {
    /// Re-chunks the cursor's zone under `max_chunk_size` and returns the
    /// chunk at the cursor.
    pub fn page(&self, max_chunk_size: usize, cursor: Cursor) -> WorkspaceResult<Page> {
        let bytes = self.zone_bytes(cursor.zone_id)?;
        self.page_from_zone(&bytes, max_chunk_size, cursor)
    }

    /// Every page of the workspace, starting at [`Cursor::START`].
    pub fn pages(&self, max_chunk_size: usize) -> Pages<'_> {
        let cursor = self.zone_ids().next().map(|zone_id| Cursor::new(zone_id, 0));
        Pages {
            collection: self,
            max_chunk_size,
            cursor,
            zone: None,
        }
    }

    fn page_from_zone(
        &self,
        bytes: &Bytes,
        max_chunk_size: usize,
        cursor: Cursor,
    ) -> WorkspaceResult<Page> {
        let chunk_count = chunk::chunk_count(bytes.len(), max_chunk_size);
        let payload = chunk::chunk_at(bytes, cursor.chunk_id, max_chunk_size)?;

        let (outcome, next) = match cursor.next_in(chunk_count) {
            Some(next) => (ChunkingOutcome::More, Some(next)),
            None => (
                ChunkingOutcome::Complete,
                self.next_zone_after(cursor.zone_id)
                    .map(|zone_id| Cursor::new(zone_id, 0)),
            ),
        };
        trace!(
            %cursor,
            chunk_count,
            len = payload.len(),
            ?outcome,
            "page"
        );

        let mut chunks = AddressedChunkCollection::new();
        chunks.insert(AddressedChunk::new(
            cursor.zone_id,
            cursor.chunk_id,
            ChunkPayload::Bytes(payload),
        ))?;
        Ok(Page {
            outcome,
            chunks,
            next,
        })
    }
}

/// Iterator over every page of a workspace.
///
/// Each zone buffer is reassembled once and sliced for all of its pages.
/// Iteration stops after the first error.
pub struct Pages<'a> {
    collection: &'a AddressedChunkCollection,
    max_chunk_size: usize,
    cursor: Option<Cursor>,
    zone: Option<(u64, Bytes)>,
}

impl Iterator for Pages<'_> {
    type Item = WorkspaceResult<Page>;

    fn next(&mut self) -> Option<Self::Item> {
        let cursor = self.cursor.take()?;
        let cached = match &self.zone {
            Some((zone_id, bytes)) if *zone_id == cursor.zone_id => Some(bytes.clone()),
            _ => None,
        };
        let bytes = match cached {
            Some(bytes) => bytes,
            None => match self.collection.zone_bytes(cursor.zone_id) {
                Ok(bytes) => {
                    self.zone = Some((cursor.zone_id, bytes.clone()));
                    bytes
                }
                Err(err) => return Some(Err(err)),
            },
        };
        let page = self
            .collection
            .page_from_zone(&bytes, self.max_chunk_size, cursor);
        if let Ok(page) = &page {
            self.cursor = page.next;
        }
        Some(page)
    }
}
