//! BLAKE3 digests of zone buffers.
//!
//! Digests are diagnostics only: they let both ends of a transfer compare
//! a reassembled zone against the sender's copy. They are never part of
//! a chunk address.

use std::fmt;

#[derive(Clone, Copy, Hash, PartialEq, Eq)]
pub struct Hash(blake3::Hash);

impl Hash {
    /// Digest of the empty zone buffer.
    pub const EMPTY: Hash = Hash::from_bytes([
        175, 19, 73, 185, 245, 249, 161, 166, 160, 64, 77, 234, 54, 220, 201, 73, 155, 203, 37,
        201, 173, 193, 18, 183, 204, 154, 147, 202, 228, 31, 50, 98,
    ]);

    pub fn new(buf: impl AsRef<[u8]>) -> Self {
        Hash(blake3::hash(buf.as_ref()))
    }

    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(blake3::Hash::from_bytes(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex().to_string()
    }

    /// First five bytes as hex, for log lines.
    pub fn fmt_short(&self) -> String {
        data_encoding::HEXLOWER.encode(&self.as_bytes()[..5])
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Hash").field(&self.fmt_short()).finish()
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_empty() {
        assert_eq!(Hash::new(b""), Hash::EMPTY);
    }

    #[test]
    fn test_fmt_short_is_hex_prefix() {
        let hash = Hash::new(b"hello");
        assert_eq!(hash.fmt_short().len(), 10);
        assert!(hash.to_hex().starts_with(&hash.fmt_short()));
    }
}
