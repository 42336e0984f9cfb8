use bytes::{Bytes, BytesMut};

use crate::error::{WorkspaceError, WorkspaceResult};
use crate::hash::Hash;
use crate::value::{ShareableValue, decode, encode};

use super::chunk;

/// The encoded byte buffer of one top-level value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    pub id: u64,
    pub bytes: Bytes,
}

/// Per-zone diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneSummary {
    pub id: u64,
    pub len: usize,
    pub chunk_count: u64,
    pub hash: Hash,
}

impl Zone {
    pub fn encode(id: u64, value: &ShareableValue) -> WorkspaceResult<Self> {
        let bytes = encode(value).map_err(|source| WorkspaceError::Encode {
            zone_id: id,
            source,
        })?;
        Ok(Self {
            id,
            bytes: Bytes::from(bytes),
        })
    }

    pub fn decode(&self) -> WorkspaceResult<ShareableValue> {
        decode(&self.bytes).map_err(|source| WorkspaceError::Decode {
            zone_id: self.id,
            source,
        })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn chunk_count(&self, max_chunk_size: usize) -> u64 {
        chunk::chunk_count(self.bytes.len(), max_chunk_size)
    }

    pub fn chunk_at(&self, chunk_id: u64, max_chunk_size: usize) -> WorkspaceResult<Bytes> {
        chunk::chunk_at(&self.bytes, chunk_id, max_chunk_size)
    }

    pub fn summary(&self, max_chunk_size: usize) -> ZoneSummary {
        ZoneSummary {
            id: self.id,
            len: self.bytes.len(),
            chunk_count: self.chunk_count(max_chunk_size),
            hash: Hash::new(&self.bytes),
        }
    }
}

/// Encodes each value into its own zone; zone ids follow input order.
pub fn partition(values: &[ShareableValue]) -> WorkspaceResult<Vec<Zone>> {
    values
        .iter()
        .enumerate()
        .map(|(id, value)| Zone::encode(id as u64, value))
        .collect()
}

/// Concatenates zone buffers in order.
///
/// Values are self-delimiting, so the flat buffer can be scanned back
/// into values, but zone boundaries are not recorded.
pub fn flatten(zones: &[Zone]) -> Bytes {
    let total = zones.iter().map(Zone::len).sum();
    let mut out = BytesMut::with_capacity(total);
    for zone in zones {
        out.extend_from_slice(&zone.bytes);
    }
    out.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{EncodeError, MAX_DEPTH};

    #[test]
    fn test_partition_assigns_ids_in_order() {
        let values = vec![ShareableValue::Nat8(1), ShareableValue::from("two")];
        let zones = partition(&values).unwrap();
        assert_eq!(zones.len(), 2);
        assert_eq!(zones[0].id, 0);
        assert_eq!(zones[1].id, 1);
        assert_eq!(zones[1].decode().unwrap(), values[1]);
    }

    #[test]
    fn test_partition_empty() {
        assert!(partition(&[]).unwrap().is_empty());
        assert!(flatten(&[]).is_empty());
    }

    #[test]
    fn test_flatten_concatenates() {
        let zones = partition(&[ShareableValue::Nat8(1), ShareableValue::Bool(true)]).unwrap();
        let flat = flatten(&zones);
        assert_eq!(flat.len(), zones[0].len() + zones[1].len());
        assert!(flat.starts_with(&zones[0].bytes));
        assert!(flat.ends_with(&zones[1].bytes));
    }

    #[test]
    fn test_summary() {
        let zone = Zone::encode(3, &ShareableValue::bytes(vec![7u8; 100])).unwrap();
        let summary = zone.summary(32);
        assert_eq!(summary.id, 3);
        assert_eq!(summary.len, zone.len());
        assert_eq!(summary.chunk_count, zone.len().div_ceil(32) as u64);
        assert_eq!(summary.hash, Hash::new(&zone.bytes));
    }

    #[test]
    fn test_decode_error_carries_zone() {
        let zone = Zone {
            id: 9,
            bytes: Bytes::from_static(&[0xff]),
        };
        let err = zone.decode().unwrap_err();
        assert!(matches!(err, WorkspaceError::Decode { zone_id: 9, .. }));
    }

    #[test]
    fn test_encode_error_carries_zone() {
        let mut value = ShareableValue::Nat8(0);
        for _ in 0..=MAX_DEPTH {
            value = ShareableValue::some(value);
        }
        let err = partition(&[ShareableValue::Nat8(1), value]).unwrap_err();
        assert!(matches!(
            err,
            WorkspaceError::Encode {
                zone_id: 1,
                source: EncodeError::TooDeep { .. }
            }
        ));
    }
}
