use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;

use bytes::{Bytes, BytesMut};

use crate::error::{WorkspaceError, WorkspaceResult};
use crate::value::{EncodeError, ShareableValue, encode, encoded_len};

/// Position of a chunk in a workspace. Orders by zone, then chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkAddress {
    pub zone_id: u64,
    pub chunk_id: u64,
}

impl ChunkAddress {
    pub const fn new(zone_id: u64, chunk_id: u64) -> Self {
        Self { zone_id, chunk_id }
    }
}

impl fmt::Display for ChunkAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.zone_id, self.chunk_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChunkPayload {
    /// A raw slice of the zone's byte buffer.
    Bytes(Bytes),
    /// A whole value; contributes its encoding to the zone buffer.
    Value(ShareableValue),
}

impl ChunkPayload {
    /// Number of bytes this payload contributes to its zone.
    pub fn len(&self) -> usize {
        match self {
            Self::Bytes(bytes) => bytes.len(),
            Self::Value(value) => encoded_len(value),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_bytes(&self) -> Result<Bytes, EncodeError> {
        Ok(match self {
            Self::Bytes(bytes) => bytes.clone(),
            Self::Value(value) => Bytes::from(encode(value)?),
        })
    }

    fn write_to(&self, out: &mut BytesMut) -> Result<(), EncodeError> {
        match self {
            Self::Bytes(bytes) => out.extend_from_slice(bytes),
            Self::Value(value) => out.extend_from_slice(&encode(value)?),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddressedChunk {
    pub address: ChunkAddress,
    pub payload: ChunkPayload,
}

impl AddressedChunk {
    pub fn new(zone_id: u64, chunk_id: u64, payload: ChunkPayload) -> Self {
        Self {
            address: ChunkAddress::new(zone_id, chunk_id),
            payload,
        }
    }
}

/// Address-keyed set of chunks making up an in-flight workspace.
///
/// At most one chunk exists per address and iteration is always in
/// ascending address order, regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddressedChunkCollection {
    chunks: BTreeMap<ChunkAddress, ChunkPayload>,
}

impl AddressedChunkCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_chunks(
        chunks: impl IntoIterator<Item = AddressedChunk>,
    ) -> WorkspaceResult<Self> {
        let mut collection = Self::new();
        for chunk in chunks {
            collection.insert(chunk)?;
        }
        Ok(collection)
    }

    /// Builds a collection from `(zone_id, chunk_id, bytes)` triples, as
    /// received from the wire.
    pub fn from_raw_chunks(
        chunks: impl IntoIterator<Item = (u64, u64, Bytes)>,
    ) -> WorkspaceResult<Self> {
        Self::from_chunks(chunks.into_iter().map(|(zone_id, chunk_id, bytes)| {
            AddressedChunk::new(zone_id, chunk_id, ChunkPayload::Bytes(bytes))
        }))
    }

    pub fn insert(&mut self, chunk: AddressedChunk) -> WorkspaceResult<()> {
        match self.chunks.entry(chunk.address) {
            Entry::Occupied(_) => Err(WorkspaceError::DuplicateAddress {
                zone_id: chunk.address.zone_id,
                chunk_id: chunk.address.chunk_id,
            }),
            Entry::Vacant(slot) => {
                slot.insert(chunk.payload);
                Ok(())
            }
        }
    }

    /// Adds a chunk at an address the caller has just allocated.
    pub(super) fn push_fresh(&mut self, address: ChunkAddress, payload: ChunkPayload) {
        let previous = self.chunks.insert(address, payload);
        debug_assert!(previous.is_none(), "chunk {address} allocated twice");
    }

    pub fn remove(&mut self, zone_id: u64, chunk_id: u64) -> Option<ChunkPayload> {
        self.chunks.remove(&ChunkAddress::new(zone_id, chunk_id))
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn count_chunks(&self) -> u64 {
        self.chunks.len() as u64
    }

    pub fn get(&self, zone_id: u64, chunk_id: u64) -> Option<&ChunkPayload> {
        self.chunks.get(&ChunkAddress::new(zone_id, chunk_id))
    }

    pub fn chunk_at(&self, zone_id: u64, chunk_id: u64) -> WorkspaceResult<&ChunkPayload> {
        self.get(zone_id, chunk_id)
            .ok_or(WorkspaceError::NotFound { zone_id, chunk_id })
    }

    pub fn iter(&self) -> impl Iterator<Item = (ChunkAddress, &ChunkPayload)> {
        self.chunks.iter().map(|(address, payload)| (*address, payload))
    }

    pub fn into_chunks(self) -> impl Iterator<Item = AddressedChunk> {
        self.chunks
            .into_iter()
            .map(|(address, payload)| AddressedChunk { address, payload })
    }

    /// Distinct zone ids, ascending.
    pub fn zone_ids(&self) -> impl Iterator<Item = u64> + '_ {
        let mut last = None;
        self.chunks.keys().filter_map(move |address| {
            if last == Some(address.zone_id) {
                return None;
            }
            last = Some(address.zone_id);
            last
        })
    }

    /// Chunks of one zone, by ascending chunk id.
    pub fn zone_chunks(
        &self,
        zone_id: u64,
    ) -> impl Iterator<Item = (u64, &ChunkPayload)> + '_ {
        self.chunks
            .range(ChunkAddress::new(zone_id, 0)..=ChunkAddress::new(zone_id, u64::MAX))
            .map(|(address, payload)| (address.chunk_id, payload))
    }

    /// Smallest zone id strictly after `zone_id`.
    pub fn next_zone_after(&self, zone_id: u64) -> Option<u64> {
        let start = ChunkAddress::new(zone_id.checked_add(1)?, 0);
        self.chunks.range(start..).next().map(|(address, _)| address.zone_id)
    }

    /// Reassembles one zone's byte buffer from its chunks.
    ///
    /// Chunk ids must run contiguously from 0. A zone held as a single
    /// byte chunk is returned without copying.
    pub fn zone_bytes(&self, zone_id: u64) -> WorkspaceResult<Bytes> {
        let parts: Vec<(u64, &ChunkPayload)> = self.zone_chunks(zone_id).collect();
        if parts.is_empty() {
            return Err(WorkspaceError::NotFound {
                zone_id,
                chunk_id: 0,
            });
        }
        for (expected, (chunk_id, _)) in parts.iter().enumerate() {
            if *chunk_id != expected as u64 {
                return Err(WorkspaceError::IncompleteZone {
                    zone_id,
                    missing_chunk: expected as u64,
                });
            }
        }

        let encode_err = |source| WorkspaceError::Encode { zone_id, source };
        if let [(_, only)] = parts.as_slice() {
            return only.to_bytes().map_err(encode_err);
        }
        let total = parts.iter().map(|(_, payload)| payload.len()).sum();
        let mut out = BytesMut::with_capacity(total);
        for (_, payload) in parts {
            payload.write_to(&mut out).map_err(encode_err)?;
        }
        Ok(out.freeze())
    }
}
