//! Chunked transfer of encoded values across a size-limited channel.
//!
//! Each top-level value is encoded into its own zone. Zones are split
//! into chunks addressed by `(zone_id, chunk_id)`, sent in any order and
//! reassembled on the other side. A sender that only holds a workspace
//! can serve it page by page under whatever budget the channel allows,
//! see [`AddressedChunkCollection::page`].

mod assembler;
pub mod chunk;
mod collection;
mod paging;
mod zone;

pub use self::assembler::{chunked, to_addressed_byte_chunks, to_addressed_chunks};
pub use self::collection::{AddressedChunk, AddressedChunkCollection, ChunkAddress, ChunkPayload};
pub use self::paging::{Cursor, Page, Pages};
pub use self::zone::{Zone, ZoneSummary, flatten, partition};

/// Whether a paged zone has been fully delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkingOutcome {
    Complete,
    More,
}
