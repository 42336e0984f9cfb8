use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use bytes::Bytes;
use candy_core::AddressedChunkCollection;
use candy_core::workspace::ChunkAddress;
use tracing::debug;

pub const CHUNK_EXTENSION: &str = "chunk";

pub fn chunk_file_name(address: ChunkAddress) -> String {
    format!(
        "z{}-c{}.{CHUNK_EXTENSION}",
        address.zone_id, address.chunk_id
    )
}

/// Inverse of [`chunk_file_name`].
pub fn parse_chunk_file_name(name: &str) -> Option<ChunkAddress> {
    let stem = name.strip_suffix(CHUNK_EXTENSION)?.strip_suffix('.')?;
    let (zone, chunk) = stem.strip_prefix('z')?.split_once("-c")?;
    Some(ChunkAddress::new(zone.parse().ok()?, chunk.parse().ok()?))
}

/// Loads every `.chunk` file in `dir` into a collection. Other files are
/// ignored.
pub fn read_chunk_dir(dir: &Path) -> Result<AddressedChunkCollection> {
    let mut raw = Vec::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("failed to read directory {}", dir.display()))?
    {
        let path = entry?.path();
        let Some(address) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(parse_chunk_file_name)
        else {
            debug!("skipping {path:?}");
            continue;
        };
        let bytes = fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
        raw.push((address.zone_id, address.chunk_id, Bytes::from(bytes)));
    }
    debug!(chunks = raw.len(), "read chunk directory {dir:?}");
    AddressedChunkCollection::from_raw_chunks(raw)
        .with_context(|| format!("invalid chunk directory {}", dir.display()))
}

pub fn has_chunk_files(dir: &Path) -> Result<bool> {
    if !dir.exists() {
        return Ok(false);
    }
    for entry in fs::read_dir(dir)? {
        let name = entry?.file_name();
        if name.to_str().and_then(parse_chunk_file_name).is_some() {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Writes via a temporary file and rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp_path = path.with_extension("tmp");
    let mut tmp = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&tmp_path)
        .with_context(|| format!("failed to create {}", tmp_path.display()))?;
    tmp.write_all(bytes)?;
    tmp.sync_all()?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_file_names() {
        let address = ChunkAddress::new(3, 12);
        let name = chunk_file_name(address);
        assert_eq!(name, "z3-c12.chunk");
        assert_eq!(parse_chunk_file_name(&name), Some(address));
    }

    #[test]
    fn test_write_atomic_replaces_file() {
        let dir = std::env::temp_dir().join(format!("candy-write-atomic-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("candy.toml");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"second");
        assert!(!path.with_extension("tmp").exists());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_rejects_other_names() {
        assert_eq!(parse_chunk_file_name("z3-c12.bin"), None);
        assert_eq!(parse_chunk_file_name("z3.chunk"), None);
        assert_eq!(parse_chunk_file_name("zx-c1.chunk"), None);
        assert_eq!(parse_chunk_file_name("z1-c1chunk"), None);
        assert_eq!(parse_chunk_file_name("z-1-c1.chunk"), None);
    }
}
