use bytes::{Bytes, BytesMut};
use tracing::{debug, trace};

use crate::error::{WorkspaceError, WorkspaceResult};
use crate::value::{ShareableValue, check_depth};

use super::chunk;
use super::collection::{AddressedChunkCollection, ChunkAddress, ChunkPayload};
use super::zone::{Zone, ZoneSummary, partition};

/// One value payload per zone, zone ids in input order.
///
/// Fails for a value too deeply nested to encode, as [`chunked`] does.
pub fn to_addressed_chunks(
    values: &[ShareableValue],
) -> WorkspaceResult<AddressedChunkCollection> {
    let mut collection = AddressedChunkCollection::new();
    for (zone_id, value) in values.iter().enumerate() {
        let zone_id = zone_id as u64;
        check_depth(value).map_err(|source| WorkspaceError::Encode { zone_id, source })?;
        collection.push_fresh(
            ChunkAddress::new(zone_id, 0),
            ChunkPayload::Value(value.clone()),
        );
    }
    Ok(collection)
}

/// One byte payload per zone holding the zone's whole encoding.
pub fn to_addressed_byte_chunks(
    values: &[ShareableValue],
) -> WorkspaceResult<AddressedChunkCollection> {
    chunked(values, 0)
}

/// Encodes each value and splits its zone under `max_chunk_size`.
pub fn chunked(
    values: &[ShareableValue],
    max_chunk_size: usize,
) -> WorkspaceResult<AddressedChunkCollection> {
    let mut collection = AddressedChunkCollection::new();
    for zone in partition(values)? {
        collection.extend_zone(&zone, max_chunk_size);
    }
    debug!(
        zones = values.len(),
        chunks = collection.len(),
        max_chunk_size,
        "chunked values"
    );
    Ok(collection)
}

impl AddressedChunkCollection {
    fn extend_zone(&mut self, zone: &Zone, max_chunk_size: usize) {
        for (chunk_id, bytes) in chunk::chunks(&zone.bytes, max_chunk_size).enumerate() {
            self.push_fresh(
                ChunkAddress::new(zone.id, chunk_id as u64),
                ChunkPayload::Bytes(bytes),
            );
        }
    }

    /// Reassembles every zone. Zone ids must run contiguously from 0.
    pub fn zones(&self) -> WorkspaceResult<Vec<Zone>> {
        let mut zones = Vec::new();
        for (expected, zone_id) in self.zone_ids().enumerate() {
            if zone_id != expected as u64 {
                return Err(WorkspaceError::IncompleteZone {
                    zone_id: expected as u64,
                    missing_chunk: 0,
                });
            }
            zones.push(Zone {
                id: zone_id,
                bytes: self.zone_bytes(zone_id)?,
            });
        }
        Ok(zones)
    }

    /// All zone buffers concatenated in zone order.
    pub fn flatten(&self) -> WorkspaceResult<Bytes> {
        let zones = self.zones()?;
        if let [only] = zones.as_slice() {
            return Ok(only.bytes.clone());
        }
        let mut out = BytesMut::with_capacity(zones.iter().map(Zone::len).sum());
        for zone in &zones {
            out.extend_from_slice(&zone.bytes);
        }
        Ok(out.freeze())
    }

    /// Decodes one value per zone, in zone order.
    ///
    /// A zone held as a single value payload is cloned rather than
    /// re-encoded and decoded.
    pub fn to_values(&self) -> WorkspaceResult<Vec<ShareableValue>> {
        let mut values = Vec::new();
        for (expected, zone_id) in self.zone_ids().enumerate() {
            if zone_id != expected as u64 {
                return Err(WorkspaceError::IncompleteZone {
                    zone_id: expected as u64,
                    missing_chunk: 0,
                });
            }
            let mut parts = self.zone_chunks(zone_id);
            let value = match (parts.next(), parts.next()) {
                (Some((0, ChunkPayload::Value(value))), None) => value.clone(),
                _ => Zone {
                    id: zone_id,
                    bytes: self.zone_bytes(zone_id)?,
                }
                .decode()?,
            };
            trace!(zone_id, variant = value.variant_name(), "decoded zone");
            values.push(value);
        }
        debug!(zones = values.len(), "reassembled workspace");
        Ok(values)
    }

    /// Decodes the workspace and rebuilds it in the value-payload form.
    pub fn round_trip(&self) -> WorkspaceResult<AddressedChunkCollection> {
        to_addressed_chunks(&self.to_values()?)
    }

    /// Re-splits every zone under a new budget.
    ///
    /// Zones keep their ids even if the id sequence has gaps.
    pub fn rechunk(&self, max_chunk_size: usize) -> WorkspaceResult<AddressedChunkCollection> {
        let mut collection = AddressedChunkCollection::new();
        for zone_id in self.zone_ids() {
            let zone = Zone {
                id: zone_id,
                bytes: self.zone_bytes(zone_id)?,
            };
            collection.extend_zone(&zone, max_chunk_size);
        }
        debug!(
            before = self.len(),
            after = collection.len(),
            max_chunk_size,
            "rechunked workspace"
        );
        Ok(collection)
    }

    /// Per-zone length, chunk count under `max_chunk_size` and digest.
    pub fn summaries(&self, max_chunk_size: usize) -> WorkspaceResult<Vec<ZoneSummary>> {
        self.zone_ids()
            .map(|zone_id| {
                let zone = Zone {
                    id: zone_id,
                    bytes: self.zone_bytes(zone_id)?,
                };
                Ok(zone.summary(max_chunk_size))
            })
            .collect()
    }
}
