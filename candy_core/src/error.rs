use crate::value::{DecodeError, EncodeError};

pub type WorkspaceResult<T> = Result<T, WorkspaceError>;

/// Errors surfaced by zone, chunk and workspace operations.
///
/// None of these are retried internally. Every operation is a pure
/// function of its inputs, so a caller may simply repeat a request.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum WorkspaceError {
    #[error("zone {zone_id} failed to decode: {source}")]
    Decode {
        zone_id: u64,
        #[source]
        source: DecodeError,
    },

    #[error("zone {zone_id} failed to encode: {source}")]
    Encode {
        zone_id: u64,
        #[source]
        source: EncodeError,
    },

    #[error("chunk {chunk_id} out of range: zone has {chunk_count} chunks")]
    OutOfRange { chunk_id: u64, chunk_count: u64 },

    #[error("no chunk at zone {zone_id}, chunk {chunk_id}")]
    NotFound { zone_id: u64, chunk_id: u64 },

    #[error("zone {zone_id} is incomplete: chunk {missing_chunk} is missing")]
    IncompleteZone { zone_id: u64, missing_chunk: u64 },

    #[error("duplicate chunk address: zone {zone_id}, chunk {chunk_id}")]
    DuplicateAddress { zone_id: u64, chunk_id: u64 },
}
