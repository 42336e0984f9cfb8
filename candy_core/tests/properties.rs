use bytes::Bytes;
use candy_core::value::{Mutability, encoded_len};
use candy_core::workspace::{Cursor, chunk, chunked, to_addressed_chunks};
use candy_core::{ChunkingOutcome, Principal, Property, ShareableValue, WorkspaceError};
use candy_core::{decode, encode};
use num_bigint::{BigInt, BigUint};
use proptest::prelude::*;

fn mutability() -> impl Strategy<Value = Mutability> {
    prop_oneof![Just(Mutability::Frozen), Just(Mutability::Thawed)]
}

fn number() -> impl Strategy<Value = ShareableValue> {
    prop_oneof![
        any::<i128>().prop_map(|v| ShareableValue::Int(BigInt::from(v))),
        any::<i8>().prop_map(ShareableValue::Int8),
        any::<i32>().prop_map(ShareableValue::Int32),
        any::<i64>().prop_map(ShareableValue::Int64),
        any::<u128>().prop_map(|v| ShareableValue::Nat(BigUint::from(v))),
        any::<u16>().prop_map(ShareableValue::Nat16),
        any::<u64>().prop_map(ShareableValue::Nat64),
        (-1e15f64..1e15).prop_map(ShareableValue::Float),
    ]
}

fn leaf() -> impl Strategy<Value = ShareableValue> {
    prop_oneof![
        number(),
        any::<bool>().prop_map(ShareableValue::Bool),
        ".{0,24}".prop_map(ShareableValue::Text),
        (prop::collection::vec(any::<u8>(), 0..96), mutability()).prop_map(|(data, mutability)| {
            ShareableValue::Bytes {
                data: Bytes::from(data),
                mutability,
            }
        }),
        prop::collection::vec(any::<u8>(), 0..=29)
            .prop_map(|b| ShareableValue::Principal(Principal::from_slice(&b).unwrap())),
        Just(ShareableValue::none()),
        prop::collection::vec(any::<u64>(), 0..8)
            .prop_map(|vs| ShareableValue::Nats(vs.into_iter().map(BigUint::from).collect())),
        prop::collection::vec(any::<i64>(), 0..8)
            .prop_map(|vs| ShareableValue::Ints(vs.into_iter().map(BigInt::from).collect())),
        prop::collection::vec(-1e6f64..1e6, 0..8).prop_map(ShareableValue::Floats),
    ]
}

fn value() -> impl Strategy<Value = ShareableValue> {
    leaf().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            inner.clone().prop_map(ShareableValue::some),
            (prop::collection::vec(inner.clone(), 0..6), mutability())
                .prop_map(|(items, mutability)| ShareableValue::Array { items, mutability }),
            prop::collection::vec(inner.clone(), 0..6).prop_map(ShareableValue::Set),
            prop::collection::vec(("[a-z]{1,8}", inner.clone()), 0..6)
                .prop_map(ShareableValue::Map),
            prop::collection::vec((inner.clone(), inner.clone()), 0..4)
                .prop_map(ShareableValue::ValueMap),
            prop::collection::vec(("[a-z]{1,8}", inner, any::<bool>()), 0..6).prop_map(|props| {
                ShareableValue::Class(
                    props
                        .into_iter()
                        .map(|(name, value, immutable)| Property::new(name, value, immutable))
                        .collect(),
                )
            }),
        ]
    })
}

proptest! {
    #[test]
    fn prop_codec_round_trip(v in value()) {
        let bytes = encode(&v).unwrap();
        prop_assert_eq!(encoded_len(&v), bytes.len());
        prop_assert_eq!(decode(&bytes).unwrap(), v);
    }

    #[test]
    fn prop_encoding_is_deterministic(v in value()) {
        prop_assert_eq!(encode(&v).unwrap(), encode(&v.clone()).unwrap());
    }

    #[test]
    fn prop_chunks_cover_zone(data in prop::collection::vec(any::<u8>(), 0..512), max in 1usize..64) {
        let bytes = Bytes::from(data);
        let count = chunk::chunk_count(bytes.len(), max);
        prop_assert_eq!(count, std::cmp::max(1, bytes.len().div_ceil(max)) as u64);

        let mut joined = Vec::with_capacity(bytes.len());
        for chunk_id in 0..count {
            let part = chunk::chunk_at(&bytes, chunk_id, max).unwrap();
            prop_assert!(part.len() <= max);
            joined.extend_from_slice(&part);
        }
        prop_assert_eq!(joined, bytes.to_vec());
        let out_of_range = matches!(
            chunk::chunk_at(&bytes, count, max),
            Err(WorkspaceError::OutOfRange { .. })
        );
        prop_assert!(out_of_range);
    }

    #[test]
    fn prop_workspace_round_trip(values in prop::collection::vec(value(), 0..5), max in 0usize..48) {
        prop_assert_eq!(&to_addressed_chunks(&values).unwrap().to_values().unwrap(), &values);
        prop_assert_eq!(&chunked(&values, max).unwrap().to_values().unwrap(), &values);
    }

    #[test]
    fn prop_pages_reassemble(values in prop::collection::vec(value(), 1..4), max in 1usize..32) {
        let sender = to_addressed_chunks(&values).unwrap();
        let mut receiver = candy_core::AddressedChunkCollection::new();
        let mut cursor = Some(Cursor::START);
        while let Some(c) = cursor {
            let page = sender.page(max, c).unwrap();
            prop_assert_eq!(&page, &sender.page(max, c).unwrap());
            let last = c.next_in(chunk::chunk_count(sender.zone_bytes(c.zone_id).unwrap().len(), max)).is_none();
            prop_assert_eq!(page.outcome == ChunkingOutcome::Complete, last);
            for chunk in page.chunks.into_chunks() {
                receiver.insert(chunk).unwrap();
            }
            cursor = page.next;
        }
        prop_assert_eq!(receiver.to_values().unwrap(), values);
    }

    #[test]
    fn prop_rechunk_preserves_zones(values in prop::collection::vec(value(), 0..4), a in 1usize..32, b in 0usize..32) {
        let first = chunked(&values, a).unwrap();
        let second = first.rechunk(b).unwrap();
        prop_assert_eq!(first.flatten().unwrap(), second.flatten().unwrap());
        prop_assert_eq!(second, chunked(&values, b).unwrap());
    }
}
