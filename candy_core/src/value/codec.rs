//! CBOR codec for [`ShareableValue`].
//!
//! Every value is a definite-length CBOR array: a one-byte variant tag
//! followed by the payload. The arity is fixed per tag. Recursive
//! payloads are arrays with an explicit element count, so each value is
//! self-delimiting and no out-of-band length table is needed.
//!
//! ```text
//! Nat8(1)          => [6, 1]
//! Bytes { .. }     => [13, mutability, h'..']
//! Map([(k, v)..])  => [18, [[k, v], ..]]
//! Nat(n)           => [5, 2(h'..')]          ; RFC 8949 bignum
//! Int(-n)          => [0, 3(h'..')]          ; magnitude is n - 1
//! ```

use bytes::Bytes;
use minicbor::CborLen;
use minicbor::data::{Tag, Type};
use minicbor::decode::{Decode, Decoder, Error};
use minicbor::encode::{self, Encode, Encoder, Write};
use num_bigint::{BigInt, BigUint, Sign};

use super::{Mutability, Principal, Property, ShareableValue};

/// Deepest nesting level accepted by [`encode`] and [`decode`]. A value
/// with no children is at level 0, see [`ShareableValue::nesting`].
pub const MAX_DEPTH: usize = 128;

/// Collection lengths are only trusted this far when pre-allocating.
const MAX_PREALLOC: u64 = 1024;

const POS_BIGNUM: u64 = 2;
const NEG_BIGNUM: u64 = 3;

const FLOAT_LEN: usize = 9;

const TAG_INT: u8 = 0;
const TAG_INT8: u8 = 1;
const TAG_INT16: u8 = 2;
const TAG_INT32: u8 = 3;
const TAG_INT64: u8 = 4;
const TAG_NAT: u8 = 5;
const TAG_NAT8: u8 = 6;
const TAG_NAT16: u8 = 7;
const TAG_NAT32: u8 = 8;
const TAG_NAT64: u8 = 9;
const TAG_FLOAT: u8 = 10;
const TAG_BOOL: u8 = 11;
const TAG_TEXT: u8 = 12;
const TAG_BYTES: u8 = 13;
const TAG_PRINCIPAL: u8 = 14;
const TAG_OPTION: u8 = 15;
const TAG_ARRAY: u8 = 16;
const TAG_SET: u8 = 17;
const TAG_MAP: u8 = 18;
const TAG_VALUE_MAP: u8 = 19;
const TAG_CLASS: u8 = 20;
const TAG_NATS: u8 = 21;
const TAG_INTS: u8 = 22;
const TAG_FLOATS: u8 = 23;

const MUTABILITY_FROZEN: u8 = 0;
const MUTABILITY_THAWED: u8 = 1;

/// Errors returned by [`decode`].
#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error("malformed value encoding: {0}")]
    Malformed(#[from] Error),
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),
}

/// Errors returned by [`encode`].
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum EncodeError {
    #[error("value nesting {nesting} exceeds depth limit {MAX_DEPTH}")]
    TooDeep { nesting: usize },
}

/// Encodes a value. Identical values always produce identical bytes.
///
/// Fails only for values nested deeper than [`MAX_DEPTH`], which
/// [`decode`] would reject.
pub fn encode(value: &ShareableValue) -> Result<Vec<u8>, EncodeError> {
    check_depth(value)?;
    Ok(minicbor::to_vec(value).expect("encoding into a Vec<u8> is infallible"))
}

/// Fails if `value` is nested deeper than [`MAX_DEPTH`].
pub fn check_depth(value: &ShareableValue) -> Result<(), EncodeError> {
    match value.nesting() {
        nesting if nesting > MAX_DEPTH => Err(EncodeError::TooDeep { nesting }),
        _ => Ok(()),
    }
}

/// Decodes exactly one value; the whole input must be consumed.
pub fn decode(bytes: &[u8]) -> Result<ShareableValue, DecodeError> {
    let mut d = Decoder::new(bytes);
    let value = decode_value(&mut d, 0)?;
    let rest = bytes.len() - d.position();
    if rest != 0 {
        return Err(DecodeError::TrailingBytes(rest));
    }
    Ok(value)
}

/// Size of `encode(value)` in bytes.
pub fn encoded_len(value: &ShareableValue) -> usize {
    value.cbor_len(&mut ())
}

fn tag_of(value: &ShareableValue) -> u8 {
    match value {
        ShareableValue::Int(_) => TAG_INT,
        ShareableValue::Int8(_) => TAG_INT8,
        ShareableValue::Int16(_) => TAG_INT16,
        ShareableValue::Int32(_) => TAG_INT32,
        ShareableValue::Int64(_) => TAG_INT64,
        ShareableValue::Nat(_) => TAG_NAT,
        ShareableValue::Nat8(_) => TAG_NAT8,
        ShareableValue::Nat16(_) => TAG_NAT16,
        ShareableValue::Nat32(_) => TAG_NAT32,
        ShareableValue::Nat64(_) => TAG_NAT64,
        ShareableValue::Float(_) => TAG_FLOAT,
        ShareableValue::Bool(_) => TAG_BOOL,
        ShareableValue::Text(_) => TAG_TEXT,
        ShareableValue::Bytes { .. } => TAG_BYTES,
        ShareableValue::Principal(_) => TAG_PRINCIPAL,
        ShareableValue::Option(_) => TAG_OPTION,
        ShareableValue::Array { .. } => TAG_ARRAY,
        ShareableValue::Set(_) => TAG_SET,
        ShareableValue::Map(_) => TAG_MAP,
        ShareableValue::ValueMap(_) => TAG_VALUE_MAP,
        ShareableValue::Class(_) => TAG_CLASS,
        ShareableValue::Nats(_) => TAG_NATS,
        ShareableValue::Ints(_) => TAG_INTS,
        ShareableValue::Floats(_) => TAG_FLOATS,
    }
}

fn arity_of_tag(tag: u8) -> Option<u64> {
    match tag {
        TAG_BYTES | TAG_ARRAY => Some(3),
        TAG_INT..=TAG_FLOATS => Some(2),
        _ => None,
    }
}

fn mutability_byte(m: Mutability) -> u8 {
    match m {
        Mutability::Frozen => MUTABILITY_FROZEN,
        Mutability::Thawed => MUTABILITY_THAWED,
    }
}

impl<C> Encode<C> for ShareableValue {
    fn encode<W: Write>(
        &self,
        e: &mut Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), encode::Error<W::Error>> {
        let tag = tag_of(self);
        // tags are always known on the encode side
        let arity = arity_of_tag(tag).unwrap_or(2);
        e.array(arity)?.u8(tag)?;

        match self {
            ShareableValue::Int(v) => encode_int(e, v)?,
            ShareableValue::Int8(v) => {
                e.i8(*v)?;
            }
            ShareableValue::Int16(v) => {
                e.i16(*v)?;
            }
            ShareableValue::Int32(v) => {
                e.i32(*v)?;
            }
            ShareableValue::Int64(v) => {
                e.i64(*v)?;
            }
            ShareableValue::Nat(v) => encode_nat(e, v)?,
            ShareableValue::Nat8(v) => {
                e.u8(*v)?;
            }
            ShareableValue::Nat16(v) => {
                e.u16(*v)?;
            }
            ShareableValue::Nat32(v) => {
                e.u32(*v)?;
            }
            ShareableValue::Nat64(v) => {
                e.u64(*v)?;
            }
            ShareableValue::Float(v) => {
                e.f64(*v)?;
            }
            ShareableValue::Bool(v) => {
                e.bool(*v)?;
            }
            ShareableValue::Text(v) => {
                e.str(v)?;
            }
            ShareableValue::Bytes { data, mutability } => {
                e.u8(mutability_byte(*mutability))?.bytes(data)?;
            }
            ShareableValue::Principal(p) => {
                e.bytes(p.as_slice())?;
            }
            ShareableValue::Option(inner) => match inner {
                None => {
                    e.array(0)?;
                }
                Some(v) => {
                    e.array(1)?;
                    v.encode(e, ctx)?;
                }
            },
            ShareableValue::Array { items, mutability } => {
                e.u8(mutability_byte(*mutability))?;
                encode_list(e, items, ctx)?;
            }
            ShareableValue::Set(items) => encode_list(e, items, ctx)?,
            ShareableValue::Map(entries) => {
                e.array(entries.len() as u64)?;
                for (k, v) in entries {
                    e.array(2)?.str(k)?;
                    v.encode(e, ctx)?;
                }
            }
            ShareableValue::ValueMap(entries) => {
                e.array(entries.len() as u64)?;
                for (k, v) in entries {
                    e.array(2)?;
                    k.encode(e, ctx)?;
                    v.encode(e, ctx)?;
                }
            }
            ShareableValue::Class(props) => {
                e.array(props.len() as u64)?;
                for p in props {
                    e.array(3)?.str(&p.name)?.bool(p.immutable)?;
                    p.value.encode(e, ctx)?;
                }
            }
            ShareableValue::Nats(vs) => {
                e.array(vs.len() as u64)?;
                for v in vs {
                    encode_nat(e, v)?;
                }
            }
            ShareableValue::Ints(vs) => {
                e.array(vs.len() as u64)?;
                for v in vs {
                    encode_int(e, v)?;
                }
            }
            ShareableValue::Floats(vs) => {
                e.array(vs.len() as u64)?;
                for v in vs {
                    e.f64(*v)?;
                }
            }
        }
        Ok(())
    }
}

fn encode_list<C, W: Write>(
    e: &mut Encoder<W>,
    items: &[ShareableValue],
    ctx: &mut C,
) -> Result<(), encode::Error<W::Error>> {
    e.array(items.len() as u64)?;
    for item in items {
        item.encode(e, ctx)?;
    }
    Ok(())
}

fn encode_nat<W: Write>(e: &mut Encoder<W>, v: &BigUint) -> Result<(), encode::Error<W::Error>> {
    e.tag(Tag::new(POS_BIGNUM))?.bytes(&v.to_bytes_be())?;
    Ok(())
}

fn encode_int<W: Write>(e: &mut Encoder<W>, v: &BigInt) -> Result<(), encode::Error<W::Error>> {
    match v.sign() {
        Sign::Minus => {
            let magnitude = v.magnitude().clone() - 1u32;
            e.tag(Tag::new(NEG_BIGNUM))?.bytes(&magnitude.to_bytes_be())?;
        }
        Sign::NoSign | Sign::Plus => encode_nat(e, v.magnitude())?,
    }
    Ok(())
}

impl<'b, C> Decode<'b, C> for ShareableValue {
    fn decode(d: &mut Decoder<'b>, _: &mut C) -> Result<Self, Error> {
        decode_value(d, 0)
    }
}

fn decode_value(d: &mut Decoder<'_>, depth: usize) -> Result<ShareableValue, Error> {
    let p = d.position();
    if depth > MAX_DEPTH {
        return Err(Error::message("value nesting exceeds depth limit").at(p));
    }
    let len = decode_len(d)?;
    let tag = d.u8()?;
    match arity_of_tag(tag) {
        Some(expected) if expected == len => {}
        Some(_) => return Err(Error::message(format!("unexpected arity {len} for tag {tag}")).at(p)),
        None => return Err(Error::message(format!("unknown value tag {tag}")).at(p)),
    }

    let value = match tag {
        TAG_INT => ShareableValue::Int(decode_int(d)?),
        TAG_INT8 => ShareableValue::Int8(d.i8()?),
        TAG_INT16 => ShareableValue::Int16(d.i16()?),
        TAG_INT32 => ShareableValue::Int32(d.i32()?),
        TAG_INT64 => ShareableValue::Int64(d.i64()?),
        TAG_NAT => ShareableValue::Nat(decode_nat(d)?),
        TAG_NAT8 => ShareableValue::Nat8(d.u8()?),
        TAG_NAT16 => ShareableValue::Nat16(d.u16()?),
        TAG_NAT32 => ShareableValue::Nat32(d.u32()?),
        TAG_NAT64 => ShareableValue::Nat64(d.u64()?),
        TAG_FLOAT => ShareableValue::Float(d.f64()?),
        TAG_BOOL => ShareableValue::Bool(d.bool()?),
        TAG_TEXT => ShareableValue::Text(decode_str(d)?),
        TAG_BYTES => {
            let mutability = decode_mutability(d)?;
            let data = Bytes::copy_from_slice(decode_bytes(d)?);
            ShareableValue::Bytes { data, mutability }
        }
        TAG_PRINCIPAL => {
            let p = d.position();
            let raw = decode_bytes(d)?;
            let principal =
                Principal::from_slice(raw).map_err(|err| Error::message(err.to_string()).at(p))?;
            ShareableValue::Principal(principal)
        }
        TAG_OPTION => match decode_len(d)? {
            0 => ShareableValue::Option(None),
            1 => ShareableValue::Option(Some(Box::new(decode_value(d, depth + 1)?))),
            n => return Err(Error::message(format!("option with {n} elements")).at(p)),
        },
        TAG_ARRAY => {
            let mutability = decode_mutability(d)?;
            let items = decode_list(d, depth)?;
            ShareableValue::Array { items, mutability }
        }
        TAG_SET => ShareableValue::Set(decode_list(d, depth)?),
        TAG_MAP => {
            let n = decode_len(d)?;
            let mut entries = Vec::with_capacity(n.min(MAX_PREALLOC) as usize);
            for _ in 0..n {
                expect_len(d, 2)?;
                let key = decode_str(d)?;
                entries.push((key, decode_value(d, depth + 1)?));
            }
            ShareableValue::Map(entries)
        }
        TAG_VALUE_MAP => {
            let n = decode_len(d)?;
            let mut entries = Vec::with_capacity(n.min(MAX_PREALLOC) as usize);
            for _ in 0..n {
                expect_len(d, 2)?;
                let key = decode_value(d, depth + 1)?;
                entries.push((key, decode_value(d, depth + 1)?));
            }
            ShareableValue::ValueMap(entries)
        }
        TAG_CLASS => {
            let n = decode_len(d)?;
            let mut props = Vec::with_capacity(n.min(MAX_PREALLOC) as usize);
            for _ in 0..n {
                expect_len(d, 3)?;
                let name = decode_str(d)?;
                let immutable = d.bool()?;
                let value = decode_value(d, depth + 1)?;
                props.push(Property {
                    name,
                    value,
                    immutable,
                });
            }
            ShareableValue::Class(props)
        }
        TAG_NATS => {
            let n = decode_len(d)?;
            let mut vs = Vec::with_capacity(n.min(MAX_PREALLOC) as usize);
            for _ in 0..n {
                vs.push(decode_nat(d)?);
            }
            ShareableValue::Nats(vs)
        }
        TAG_INTS => {
            let n = decode_len(d)?;
            let mut vs = Vec::with_capacity(n.min(MAX_PREALLOC) as usize);
            for _ in 0..n {
                vs.push(decode_int(d)?);
            }
            ShareableValue::Ints(vs)
        }
        TAG_FLOATS => {
            let n = decode_len(d)?;
            let mut vs = Vec::with_capacity(n.min(MAX_PREALLOC) as usize);
            for _ in 0..n {
                vs.push(d.f64()?);
            }
            ShareableValue::Floats(vs)
        }
        _ => return Err(Error::message(format!("unknown value tag {tag}")).at(p)),
    };
    Ok(value)
}

fn decode_len(d: &mut Decoder<'_>) -> Result<u64, Error> {
    let p = d.position();
    d.array()?.ok_or_else(|| {
        Error::type_mismatch(Type::ArrayIndef)
            .at(p)
            .with_message("missing array length")
    })
}

fn expect_len(d: &mut Decoder<'_>, expected: u64) -> Result<(), Error> {
    let p = d.position();
    let len = decode_len(d)?;
    if len != expected {
        return Err(Error::message(format!("expected {expected} elements, got {len}")).at(p));
    }
    Ok(())
}

fn decode_list(d: &mut Decoder<'_>, depth: usize) -> Result<Vec<ShareableValue>, Error> {
    let n = decode_len(d)?;
    let mut items = Vec::with_capacity(n.min(MAX_PREALLOC) as usize);
    for _ in 0..n {
        items.push(decode_value(d, depth + 1)?);
    }
    Ok(items)
}

fn decode_mutability(d: &mut Decoder<'_>) -> Result<Mutability, Error> {
    let p = d.position();
    match d.u8()? {
        MUTABILITY_FROZEN => Ok(Mutability::Frozen),
        MUTABILITY_THAWED => Ok(Mutability::Thawed),
        other => Err(Error::message(format!("unknown mutability {other}")).at(p)),
    }
}

// No size cap; a declared length past the end of input fails as truncation.
fn decode_bytes<'b>(d: &mut Decoder<'b>) -> Result<&'b [u8], Error> {
    d.bytes()
}

fn decode_str(d: &mut Decoder<'_>) -> Result<String, Error> {
    Ok(d.str()?.to_owned())
}

fn decode_nat(d: &mut Decoder<'_>) -> Result<BigUint, Error> {
    let p = d.position();
    let tag = d.tag()?.as_u64();
    if tag != POS_BIGNUM {
        return Err(Error::message(format!("expected bignum tag 2, got {tag}")).at(p));
    }
    Ok(BigUint::from_bytes_be(decode_bytes(d)?))
}

fn decode_int(d: &mut Decoder<'_>) -> Result<BigInt, Error> {
    let p = d.position();
    let tag = d.tag()?.as_u64();
    let magnitude = BigUint::from_bytes_be(decode_bytes(d)?);
    match tag {
        POS_BIGNUM => Ok(BigInt::from(magnitude)),
        NEG_BIGNUM => Ok(BigInt::from_biguint(Sign::Minus, magnitude + 1u32)),
        other => Err(Error::message(format!("expected bignum tag, got {other}")).at(p)),
    }
}

impl<C> CborLen<C> for ShareableValue {
    fn cbor_len(&self, ctx: &mut C) -> usize {
        let tag = tag_of(self);
        let header = arity_of_tag(tag).unwrap_or(2).cbor_len(ctx) + tag.cbor_len(ctx);
        let body = match self {
            ShareableValue::Int(v) => int_len(v, ctx),
            ShareableValue::Int8(v) => v.cbor_len(ctx),
            ShareableValue::Int16(v) => v.cbor_len(ctx),
            ShareableValue::Int32(v) => v.cbor_len(ctx),
            ShareableValue::Int64(v) => v.cbor_len(ctx),
            ShareableValue::Nat(v) => nat_len(v, ctx),
            ShareableValue::Nat8(v) => v.cbor_len(ctx),
            ShareableValue::Nat16(v) => v.cbor_len(ctx),
            ShareableValue::Nat32(v) => v.cbor_len(ctx),
            ShareableValue::Nat64(v) => v.cbor_len(ctx),
            ShareableValue::Float(_) => FLOAT_LEN,
            ShareableValue::Bool(v) => v.cbor_len(ctx),
            ShareableValue::Text(v) => string_len(v.len(), ctx),
            ShareableValue::Bytes { data, mutability } => {
                mutability_byte(*mutability).cbor_len(ctx) + string_len(data.len(), ctx)
            }
            ShareableValue::Principal(p) => string_len(p.as_slice().len(), ctx),
            ShareableValue::Option(None) => 0u64.cbor_len(ctx),
            ShareableValue::Option(Some(v)) => 1u64.cbor_len(ctx) + v.cbor_len(ctx),
            ShareableValue::Array { items, mutability } => {
                mutability_byte(*mutability).cbor_len(ctx) + list_len(items, ctx)
            }
            ShareableValue::Set(items) => list_len(items, ctx),
            ShareableValue::Map(entries) => {
                let mut n = (entries.len() as u64).cbor_len(ctx);
                for (k, v) in entries {
                    n += 2u64.cbor_len(ctx) + string_len(k.len(), ctx) + v.cbor_len(ctx);
                }
                n
            }
            ShareableValue::ValueMap(entries) => {
                let mut n = (entries.len() as u64).cbor_len(ctx);
                for (k, v) in entries {
                    n += 2u64.cbor_len(ctx) + k.cbor_len(ctx) + v.cbor_len(ctx);
                }
                n
            }
            ShareableValue::Class(props) => {
                let mut n = (props.len() as u64).cbor_len(ctx);
                for p in props {
                    n += 3u64.cbor_len(ctx)
                        + string_len(p.name.len(), ctx)
                        + p.immutable.cbor_len(ctx)
                        + p.value.cbor_len(ctx);
                }
                n
            }
            ShareableValue::Nats(vs) => {
                let mut n = (vs.len() as u64).cbor_len(ctx);
                for v in vs {
                    n += nat_len(v, ctx);
                }
                n
            }
            ShareableValue::Ints(vs) => {
                let mut n = (vs.len() as u64).cbor_len(ctx);
                for v in vs {
                    n += int_len(v, ctx);
                }
                n
            }
            ShareableValue::Floats(vs) => (vs.len() as u64).cbor_len(ctx) + vs.len() * FLOAT_LEN,
        };
        header + body
    }
}

/// Byte and text strings share the header layout of an unsigned integer.
fn string_len<C>(len: usize, ctx: &mut C) -> usize {
    (len as u64).cbor_len(ctx) + len
}

fn list_len<C>(items: &[ShareableValue], ctx: &mut C) -> usize {
    let mut n = (items.len() as u64).cbor_len(ctx);
    for item in items {
        n += item.cbor_len(ctx);
    }
    n
}

fn magnitude_len(v: &BigUint) -> usize {
    // `to_bytes_be` renders zero as a single byte
    (v.bits().div_ceil(8) as usize).max(1)
}

fn nat_len<C>(v: &BigUint, ctx: &mut C) -> usize {
    POS_BIGNUM.cbor_len(ctx) + string_len(magnitude_len(v), ctx)
}

fn int_len<C>(v: &BigInt, ctx: &mut C) -> usize {
    match v.sign() {
        Sign::Minus => {
            let magnitude = v.magnitude().clone() - 1u32;
            NEG_BIGNUM.cbor_len(ctx) + string_len(magnitude_len(&magnitude), ctx)
        }
        Sign::NoSign | Sign::Plus => nat_len(v.magnitude(), ctx),
    }
}
