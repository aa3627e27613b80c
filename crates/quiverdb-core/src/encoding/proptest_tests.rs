//! Property-based tests for encoding round-trips.

#![allow(clippy::expect_used, clippy::float_cmp)]

use proptest::prelude::*;

use crate::encoding::{Decoder, Encoder};
use crate::types::{Record, Scalar, ScalarType, Schema};

/// Strategy for generating arbitrary `Scalar` instances.
fn arb_scalar() -> impl Strategy<Value = Scalar> {
    prop_oneof![
        // Filter out NaN since NaN != NaN
        any::<f64>().prop_filter("not NaN", |f| !f.is_nan()).prop_map(Scalar::Double),
        any::<i64>().prop_map(Scalar::Int),
        ".*".prop_map(Scalar::String),
    ]
}

/// Strategy for generating arbitrary `Record` instances.
fn arb_record() -> impl Strategy<Value = Record> {
    (
        any::<u64>(),
        prop::collection::vec(arb_scalar(), 0..8),
        prop::collection::vec(
            prop::collection::vec(any::<f32>().prop_filter("not NaN", |f| !f.is_nan()), 0..32),
            0..4,
        ),
    )
        .prop_map(|(id, scalars, vectors)| Record { id, scalars, vectors })
}

/// Strategy for generating arbitrary `Schema` instances.
fn arb_schema() -> impl Strategy<Value = Schema> {
    (
        prop::collection::btree_map("[a-z][a-z0-9_]{0,12}", (1usize..512, 0usize..64), 0..4),
        prop::collection::btree_map(
            "[A-Z][a-z0-9_]{0,12}",
            prop_oneof![
                Just(ScalarType::Double),
                Just(ScalarType::Int),
                Just(ScalarType::String)
            ],
            0..4,
        ),
    )
        .prop_map(|(vectors, scalars)| {
            let mut schema = Schema::new();
            for (name, (dim, num_centroids)) in vectors {
                schema = schema
                    .add_vector_field(name, dim, num_centroids)
                    .expect("unique names by construction");
            }
            for (name, ty) in scalars {
                schema =
                    schema.add_scalar_field(name, ty).expect("unique names by construction");
            }
            schema
        })
}

proptest! {
    #[test]
    fn scalar_roundtrip(scalar in arb_scalar()) {
        let encoded = scalar.encode().expect("encoding should succeed");
        let decoded = Scalar::decode(&encoded).expect("decoding should succeed");
        prop_assert_eq!(scalar, decoded);
    }

    #[test]
    fn record_roundtrip(record in arb_record()) {
        let encoded = record.encode().expect("encoding should succeed");
        let decoded = Record::decode(&encoded).expect("decoding should succeed");
        prop_assert_eq!(record, decoded);
    }

    #[test]
    fn schema_roundtrip(schema in arb_schema()) {
        let encoded = schema.encode().expect("encoding should succeed");
        let decoded = Schema::decode(&encoded).expect("decoding should succeed");
        prop_assert_eq!(schema, decoded);
    }

    #[test]
    fn scalar_decode_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        // Arbitrary input must either decode or error, never panic.
        let _ = Scalar::decode(&bytes);
    }
}
