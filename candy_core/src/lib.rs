//! Shareable values and chunked workspace transfer.
//!
//! ## Value format (wire-stable)
//!
//! - The recursive value type (`value::ShareableValue`) and its CBOR
//!   encoding (`value::encode`, `value::decode`)
//! - Principal identifiers and their text form (`value::Principal`)
//!
//! Encodings are deterministic: two equal values always encode to the same
//! bytes. Changes to the encoding are protocol changes.
//!
//! ## Workspaces
//!
//! - Zones, one per top-level value (`workspace::Zone`)
//! - Chunk addressing and the chunk collection
//!   (`workspace::AddressedChunkCollection`)
//! - Stateless paging under a caller-supplied budget (`workspace::Cursor`,
//!   `workspace::Page`)
//!
//! Every chunking operation takes its size budget as an argument;
//! `config::ChunkingConfig` only exists for front ends that load it from
//! a file.

pub mod config;
pub mod error;
pub mod hash;
pub mod value;
pub mod workspace;

pub use config::ChunkingConfig;
pub use error::{WorkspaceError, WorkspaceResult};
pub use hash::Hash;
pub use value::{
    DecodeError, EncodeError, Mutability, Principal, Property, ShareableValue, decode, encode,
};
pub use workspace::{
    AddressedChunk, AddressedChunkCollection, ChunkPayload, ChunkingOutcome, Cursor, Page,
    to_addressed_chunks,
};
