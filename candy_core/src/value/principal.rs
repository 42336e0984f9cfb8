//! Principal identifiers.
//!
//! A principal is an opaque identifier of at most 29 bytes. Its textual
//! form is lower-case base32 (no padding) over `crc32(bytes) ++ bytes`,
//! split into dash-separated groups of five characters. The empty
//! principal is written `aaaaa-aa`.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use data_encoding::BASE32_NOPAD;

/// Longest principal accepted by the codec and the text parser.
pub const MAX_PRINCIPAL_LEN: usize = 29;

const CHECKSUM_LEN: usize = 4;
const GROUP_LEN: usize = 5;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum PrincipalError {
    #[error("principal too long: {0} bytes (max: {MAX_PRINCIPAL_LEN})")]
    TooLong(usize),
    #[error("invalid base32 text: {0}")]
    Base32(#[from] data_encoding::DecodeError),
    #[error("principal text shorter than its checksum")]
    TooShort,
    #[error("principal checksum mismatch")]
    ChecksumMismatch,
    #[error("principal text is not canonical, expected `{0}`")]
    NotCanonical(String),
}

#[derive(Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Principal(Bytes);

impl Principal {
    /// The principal with no bytes (`aaaaa-aa`).
    pub const fn management() -> Self {
        Self(Bytes::new())
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, PrincipalError> {
        Self::try_from(Bytes::copy_from_slice(bytes))
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn to_bytes(&self) -> Bytes {
        self.0.clone()
    }

    pub fn to_text(&self) -> String {
        let mut raw = Vec::with_capacity(CHECKSUM_LEN + self.0.len());
        raw.extend_from_slice(&crc32fast::hash(&self.0).to_be_bytes());
        raw.extend_from_slice(&self.0);
        let encoded = BASE32_NOPAD.encode(&raw).to_ascii_lowercase();

        let mut out = String::with_capacity(encoded.len() + encoded.len() / GROUP_LEN);
        for (i, c) in encoded.chars().enumerate() {
            if i > 0 && i % GROUP_LEN == 0 {
                out.push('-');
            }
            out.push(c);
        }
        out
    }

    pub fn from_text(text: &str) -> Result<Self, PrincipalError> {
        let compact: String = text
            .chars()
            .filter(|c| *c != '-')
            .map(|c| c.to_ascii_uppercase())
            .collect();
        let raw = BASE32_NOPAD.decode(compact.as_bytes())?;
        if raw.len() < CHECKSUM_LEN {
            return Err(PrincipalError::TooShort);
        }
        let (checksum, body) = raw.split_at(CHECKSUM_LEN);
        if checksum != crc32fast::hash(body).to_be_bytes() {
            return Err(PrincipalError::ChecksumMismatch);
        }
        let principal = Self::from_slice(body)?;
        let canonical = principal.to_text();
        if canonical != text {
            return Err(PrincipalError::NotCanonical(canonical));
        }
        Ok(principal)
    }
}

impl TryFrom<Bytes> for Principal {
    type Error = PrincipalError;

    fn try_from(bytes: Bytes) -> Result<Self, Self::Error> {
        if bytes.len() > MAX_PRINCIPAL_LEN {
            return Err(PrincipalError::TooLong(bytes.len()));
        }
        Ok(Self(bytes))
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Principal").field(&self.to_text()).finish()
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl FromStr for Principal {
    type Err = PrincipalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Principal::from_text(s)
    }
}
