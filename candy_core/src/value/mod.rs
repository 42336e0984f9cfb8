//! The shareable value format.
//!
//! [`ShareableValue`] is a recursive tagged union. Children are owned
//! directly by their parent, so a value is always a finite tree and the
//! codec can match exhaustively over every variant.

pub mod codec;
mod display;
pub mod principal;

use bytes::Bytes;
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{FromPrimitive, ToPrimitive};

pub use codec::{
    DecodeError, EncodeError, MAX_DEPTH, check_depth, decode, encode, encoded_len,
};
pub use principal::{Principal, PrincipalError};

/// Intended mutability of a buffer or list.
///
/// This is a storage hint only. Both forms share one representation and
/// compare equal only when their tags match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mutability {
    #[default]
    Frozen,
    Thawed,
}

/// A named field of a [`ShareableValue::Class`] record.
#[derive(Clone, Debug, PartialEq)]
pub struct Property {
    pub name: String,
    pub value: ShareableValue,
    pub immutable: bool,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<ShareableValue>, immutable: bool) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            immutable,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ShareableValue {
    Int(BigInt),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Nat(BigUint),
    Nat8(u8),
    Nat16(u16),
    Nat32(u32),
    Nat64(u64),
    Float(f64),
    Bool(bool),
    Text(String),
    Bytes {
        data: Bytes,
        mutability: Mutability,
    },
    Principal(Principal),
    Option(Option<Box<ShareableValue>>),
    Array {
        items: Vec<ShareableValue>,
        mutability: Mutability,
    },
    /// List semantics; uniqueness is the producer's concern.
    Set(Vec<ShareableValue>),
    Map(Vec<(String, ShareableValue)>),
    ValueMap(Vec<(ShareableValue, ShareableValue)>),
    Class(Vec<Property>),
    Nats(Vec<BigUint>),
    Ints(Vec<BigInt>),
    Floats(Vec<f64>),
}

/// A conversion that is not defined for the source variant.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("cannot convert {variant} to {target}")]
    Unsupported {
        variant: &'static str,
        target: &'static str,
    },
}

macro_rules! to_nat_of_size {
    ($value:expr, $method:ident) => {
        match $value {
            ShareableValue::Nat(v) => v.$method(),
            ShareableValue::Nat8(v) => v.$method(),
            ShareableValue::Nat16(v) => v.$method(),
            ShareableValue::Nat32(v) => v.$method(),
            ShareableValue::Nat64(v) => v.$method(),
            ShareableValue::Int(v) => v.$method(),
            ShareableValue::Int8(v) => v.$method(),
            ShareableValue::Int16(v) => v.$method(),
            ShareableValue::Int32(v) => v.$method(),
            ShareableValue::Int64(v) => v.$method(),
            ShareableValue::Float(v) if v.is_finite() && *v >= 0.0 => v.round().$method(),
            _ => None,
        }
    };
}

macro_rules! to_int_of_size {
    ($value:expr, $method:ident) => {
        match $value {
            ShareableValue::Nat(v) => v.$method(),
            ShareableValue::Nat8(v) => v.$method(),
            ShareableValue::Nat16(v) => v.$method(),
            ShareableValue::Nat32(v) => v.$method(),
            ShareableValue::Nat64(v) => v.$method(),
            ShareableValue::Int(v) => v.$method(),
            ShareableValue::Int8(v) => v.$method(),
            ShareableValue::Int16(v) => v.$method(),
            ShareableValue::Int32(v) => v.$method(),
            ShareableValue::Int64(v) => v.$method(),
            ShareableValue::Float(v) if v.is_finite() => v.round().$method(),
            _ => None,
        }
    };
}

impl ShareableValue {
    /// Stable variant name, used in error messages and diagnostics.
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "Int",
            Self::Int8(_) => "Int8",
            Self::Int16(_) => "Int16",
            Self::Int32(_) => "Int32",
            Self::Int64(_) => "Int64",
            Self::Nat(_) => "Nat",
            Self::Nat8(_) => "Nat8",
            Self::Nat16(_) => "Nat16",
            Self::Nat32(_) => "Nat32",
            Self::Nat64(_) => "Nat64",
            Self::Float(_) => "Float",
            Self::Bool(_) => "Bool",
            Self::Text(_) => "Text",
            Self::Bytes { .. } => "Bytes",
            Self::Principal(_) => "Principal",
            Self::Option(_) => "Option",
            Self::Array { .. } => "Array",
            Self::Set(_) => "Set",
            Self::Map(_) => "Map",
            Self::ValueMap(_) => "ValueMap",
            Self::Class(_) => "Class",
            Self::Nats(_) => "Nats",
            Self::Ints(_) => "Ints",
            Self::Floats(_) => "Floats",
        }
    }

    pub fn bytes(data: impl Into<Bytes>) -> Self {
        Self::Bytes {
            data: data.into(),
            mutability: Mutability::Frozen,
        }
    }

    pub fn array(items: Vec<ShareableValue>) -> Self {
        Self::Array {
            items,
            mutability: Mutability::Frozen,
        }
    }

    pub fn some(value: impl Into<ShareableValue>) -> Self {
        Self::Option(Some(Box::new(value.into())))
    }

    pub fn none() -> Self {
        Self::Option(None)
    }

    /// Deepest child level; a value with no nested values is at level 0.
    pub fn nesting(&self) -> usize {
        let deepest = match self {
            Self::Option(Some(v)) => Some(v.nesting()),
            Self::Array { items, .. } | Self::Set(items) => items.iter().map(Self::nesting).max(),
            Self::Map(entries) => entries.iter().map(|(_, v)| v.nesting()).max(),
            Self::ValueMap(entries) => entries
                .iter()
                .map(|(k, v)| k.nesting().max(v.nesting()))
                .max(),
            Self::Class(props) => props.iter().map(|p| p.value.nesting()).max(),
            _ => None,
        };
        deepest.map_or(0, |n| n + 1)
    }

    pub fn to_nat(&self) -> Option<BigUint> {
        match self {
            Self::Nat(v) => Some(v.clone()),
            Self::Int(v) => v.to_biguint(),
            Self::Float(v) if v.is_finite() && *v >= 0.0 => BigUint::from_f64(v.round()),
            other => other.to_nat64().map(BigUint::from),
        }
    }

    pub fn to_nat8(&self) -> Option<u8> {
        to_nat_of_size!(self, to_u8)
    }

    pub fn to_nat16(&self) -> Option<u16> {
        to_nat_of_size!(self, to_u16)
    }

    pub fn to_nat32(&self) -> Option<u32> {
        to_nat_of_size!(self, to_u32)
    }

    pub fn to_nat64(&self) -> Option<u64> {
        to_nat_of_size!(self, to_u64)
    }

    pub fn to_int(&self) -> Option<BigInt> {
        match self {
            Self::Int(v) => Some(v.clone()),
            Self::Nat(v) => Some(BigInt::from(v.clone())),
            Self::Float(v) if v.is_finite() => BigInt::from_f64(v.round()),
            other => other.to_int64().map(BigInt::from),
        }
    }

    pub fn to_int8(&self) -> Option<i8> {
        to_int_of_size!(self, to_i8)
    }

    pub fn to_int16(&self) -> Option<i16> {
        to_int_of_size!(self, to_i16)
    }

    pub fn to_int32(&self) -> Option<i32> {
        to_int_of_size!(self, to_i32)
    }

    pub fn to_int64(&self) -> Option<i64> {
        to_int_of_size!(self, to_i64)
    }

    pub fn to_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Nat(v) => v.to_f64(),
            Self::Int(v) => v.to_f64(),
            other => other
                .to_int64()
                .and_then(|v| v.to_f64())
                .or_else(|| other.to_nat64().and_then(|v| v.to_f64())),
        }
    }

    pub fn to_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn to_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn to_principal(&self) -> Option<&Principal> {
        match self {
            Self::Principal(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[ShareableValue]> {
        match self {
            Self::Array { items, .. } | Self::Set(items) => Some(items),
            _ => None,
        }
    }

    /// Byte view of the value.
    ///
    /// Fixed-width integers are big-endian. Arbitrary precision naturals
    /// are a little-endian base-256 magnitude; `Int` prefixes that with a
    /// sign byte (1 for negative). Variants with no byte form fail.
    pub fn to_blob(&self) -> Result<Bytes, ConversionError> {
        let bytes = match self {
            Self::Bytes { data, .. } => data.clone(),
            Self::Text(v) => Bytes::copy_from_slice(v.as_bytes()),
            Self::Principal(v) => v.to_bytes(),
            Self::Nat(v) => Bytes::from(v.to_bytes_le()),
            Self::Int(v) => {
                let mut out = vec![u8::from(v.sign() == Sign::Minus)];
                out.extend_from_slice(&v.magnitude().to_bytes_le());
                Bytes::from(out)
            }
            Self::Nat8(v) => Bytes::copy_from_slice(&[*v]),
            Self::Nat16(v) => Bytes::copy_from_slice(&v.to_be_bytes()),
            Self::Nat32(v) => Bytes::copy_from_slice(&v.to_be_bytes()),
            Self::Nat64(v) => Bytes::copy_from_slice(&v.to_be_bytes()),
            Self::Int8(v) => Bytes::copy_from_slice(&v.to_be_bytes()),
            Self::Int16(v) => Bytes::copy_from_slice(&v.to_be_bytes()),
            Self::Int32(v) => Bytes::copy_from_slice(&v.to_be_bytes()),
            Self::Int64(v) => Bytes::copy_from_slice(&v.to_be_bytes()),
            other => {
                return Err(ConversionError::Unsupported {
                    variant: other.variant_name(),
                    target: "blob",
                });
            }
        };
        Ok(bytes)
    }
}

macro_rules! impl_from {
    ($($t:ty => $v:ident),* $(,)?) => {
        $(impl From<$t> for ShareableValue {
            fn from(value: $t) -> Self {
                ShareableValue::$v(value)
            }
        })*
    };
}

impl_from!(
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => Nat8,
    u16 => Nat16,
    u32 => Nat32,
    u64 => Nat64,
    f64 => Float,
    bool => Bool,
    String => Text,
    BigInt => Int,
    BigUint => Nat,
    Principal => Principal,
    Vec<Property> => Class,
    Vec<BigUint> => Nats,
    Vec<BigInt> => Ints,
    Vec<f64> => Floats,
);

impl From<&str> for ShareableValue {
    fn from(value: &str) -> Self {
        ShareableValue::Text(value.to_owned())
    }
}

impl From<u128> for ShareableValue {
    fn from(value: u128) -> Self {
        ShareableValue::Nat(BigUint::from(value))
    }
}

impl From<i128> for ShareableValue {
    fn from(value: i128) -> Self {
        ShareableValue::Int(BigInt::from(value))
    }
}

impl From<Bytes> for ShareableValue {
    fn from(value: Bytes) -> Self {
        ShareableValue::bytes(value)
    }
}

impl From<Vec<u8>> for ShareableValue {
    fn from(value: Vec<u8>) -> Self {
        ShareableValue::bytes(value)
    }
}

impl From<Vec<ShareableValue>> for ShareableValue {
    fn from(value: Vec<ShareableValue>) -> Self {
        ShareableValue::array(value)
    }
}

impl From<Option<ShareableValue>> for ShareableValue {
    fn from(value: Option<ShareableValue>) -> Self {
        ShareableValue::Option(value.map(Box::new))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_has_no_blob_form() {
        let err = ShareableValue::Float(1.5).to_blob().unwrap_err();
        assert_eq!(
            err,
            ConversionError::Unsupported {
                variant: "Float",
                target: "blob"
            }
        );
        assert!(ShareableValue::array(vec![]).to_blob().is_err());
    }

    #[test]
    fn test_fixed_width_blobs_are_big_endian() {
        assert_eq!(ShareableValue::Nat16(0x0102).to_blob().unwrap(), vec![1u8, 2]);
        assert_eq!(
            ShareableValue::Int32(-2).to_blob().unwrap(),
            vec![0xffu8, 0xff, 0xff, 0xfe]
        );
        assert_eq!(ShareableValue::from("hi").to_blob().unwrap(), b"hi".to_vec());
    }

    #[test]
    fn test_bignum_blobs() {
        assert_eq!(ShareableValue::from(256u128).to_blob().unwrap(), vec![0u8, 1]);
        assert_eq!(
            ShareableValue::from(-256i128).to_blob().unwrap(),
            vec![1u8, 0, 1]
        );
    }

    #[test]
    fn test_numeric_accessors() {
        assert_eq!(ShareableValue::Int8(-1).to_nat8(), None);
        assert_eq!(ShareableValue::Nat64(300).to_nat8(), None);
        assert_eq!(ShareableValue::Nat64(200).to_nat8(), Some(200));
        assert_eq!(ShareableValue::Float(2.6).to_int32(), Some(3));
        assert_eq!(ShareableValue::Float(-2.6).to_nat32(), None);
        assert_eq!(ShareableValue::Float(f64::NAN).to_int64(), None);
        assert_eq!(
            ShareableValue::from(-5i128).to_int(),
            Some(BigInt::from(-5))
        );
        assert_eq!(ShareableValue::from(-5i128).to_nat(), None);
        assert_eq!(ShareableValue::Nat8(7).to_nat(), Some(BigUint::from(7u8)));
        assert_eq!(ShareableValue::Int16(-4).to_float(), Some(-4.0));
        assert_eq!(ShareableValue::Text("x".into()).to_float(), None);
    }

    #[test]
    fn test_mutability_is_part_of_equality() {
        let frozen = ShareableValue::bytes(vec![1u8]);
        let thawed = ShareableValue::Bytes {
            data: Bytes::from_static(&[1]),
            mutability: Mutability::Thawed,
        };
        assert_ne!(frozen, thawed);
    }
}
