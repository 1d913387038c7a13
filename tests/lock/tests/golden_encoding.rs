//! Golden canonical encodings and fingerprint lock.
//!
//! Proves:
//! 1. Every scalar kind encodes to its documented wire bytes
//! 2. The sample record has a fixed canonical encoding
//! 3. Fingerprints are `sha256(DOMAIN_EXACT_ENCODING || canonical bytes)`
//! 4. Unknown trailers (including groups) pass through verbatim unless skipped

use std::sync::Arc;

use lock_tests::fixtures::{record_schema, sample_record};
use msgcmp_compare::Comparator;
use msgcmp_kernel::message::storage::Message;
use msgcmp_kernel::message::value::{ScalarValue, Value};
use msgcmp_kernel::proof::hash::DOMAIN_EXACT_ENCODING;
use msgcmp_kernel::schema::descriptor::{scalar, MessageSchema, SchemaBuilder};
use msgcmp_kernel::schema::field::ScalarKind;
use msgcmp_kernel::wire::encode::{encode, EncodeOptions};
use sha2::{Digest, Sha256};

fn single_field(kind: ScalarKind) -> Arc<MessageSchema> {
    SchemaBuilder::new("golden.Single")
        .implicit(1, "v", scalar(kind))
        .build()
        .unwrap()
}

fn canonical_hex(msg: &Message) -> String {
    hex::encode(encode(msg, msg.schema(), &EncodeOptions::CANONICAL).unwrap())
}

// ---------------------------------------------------------------------------
// 1. Scalar kinds
// ---------------------------------------------------------------------------

#[test]
fn scalar_kind_goldens() {
    let cases: Vec<(ScalarKind, Value, &str)> = vec![
        (ScalarKind::Bool, true.into(), "0801"),
        (ScalarKind::Int32, (-1i32).into(), "08ffffffffffffffffff01"),
        (ScalarKind::Int64, (-1i64).into(), "08ffffffffffffffffff01"),
        (ScalarKind::UInt32, u32::MAX.into(), "08ffffffff0f"),
        (ScalarKind::UInt64, u64::MAX.into(), "08ffffffffffffffffff01"),
        (ScalarKind::SInt32, (-1i32).into(), "0801"),
        (ScalarKind::SInt64, i64::MIN.into(), "08ffffffffffffffffff01"),
        (ScalarKind::Fixed32, 1u32.into(), "0d01000000"),
        (ScalarKind::Fixed64, 1u64.into(), "090100000000000000"),
        (ScalarKind::SFixed32, (-2i32).into(), "0dfeffffff"),
        (ScalarKind::SFixed64, (-2i64).into(), "09feffffffffffffff"),
        (ScalarKind::Float, 1.0f32.into(), "0d0000803f"),
        (ScalarKind::Double, (-0.0f64).into(), "090000000000000080"),
        (ScalarKind::Enum, Value::Scalar(ScalarValue::Int32(3)), "0803"),
    ];

    for (kind, value, expected) in cases {
        let schema = single_field(kind);
        let mut msg = Message::new(&schema);
        msg.set(1, value).unwrap();
        assert_eq!(canonical_hex(&msg), expected, "golden mismatch for {kind:?}");
    }
}

#[test]
fn zero_scalars_encode_to_nothing() {
    for kind in [ScalarKind::Int32, ScalarKind::Fixed64, ScalarKind::Double] {
        let schema = single_field(kind);
        let msg = Message::new(&schema);
        assert_eq!(canonical_hex(&msg), "", "unset {kind:?} must not encode");
    }
}

// ---------------------------------------------------------------------------
// 2. Sample record
// ---------------------------------------------------------------------------

const SAMPLE_RECORD_HEX: &str = concat!(
    "0a0178",                          // name = "x"
    "1203010203",                      // values = [1, 2, 3] packed
    "1a050a01611001",                  // attrs["a"] = 1
    "1a050a01621002",                  // attrs["b"] = 2
    "2208082a12046c656166",            // child = { id: 42, label: "leaf" }
    "2807",                            // count = 7
    "3000",                            // limit = 0 (explicit)
    "39000000000000e03f",              // ratio = 0.5
    "42050801120161",                  // children[0] = { 1, "a" }
    "42050802120162",                  // children[1] = { 2, "b" }
    "4a04000102ff",                    // payload
);

#[test]
fn sample_record_golden() {
    let schema = record_schema();
    let msg = sample_record(&schema, &[("b", 2), ("a", 1)]);
    assert_eq!(canonical_hex(&msg), SAMPLE_RECORD_HEX);
}

// ---------------------------------------------------------------------------
// 3. Fingerprint
// ---------------------------------------------------------------------------

#[test]
fn domain_prefix_locked() {
    assert_eq!(DOMAIN_EXACT_ENCODING, b"MSGCMP::EXACT_ENCODING::V1\0");
}

#[test]
fn fingerprint_is_domain_separated_sha256() {
    let schema = record_schema();
    let msg = sample_record(&schema, &[("a", 1), ("b", 2)]);

    let mut hasher = Sha256::new();
    hasher.update(DOMAIN_EXACT_ENCODING);
    hasher.update(hex::decode(SAMPLE_RECORD_HEX).unwrap());
    let expected = format!("sha256:{}", hex::encode(hasher.finalize()));

    let fp = Comparator::default().exact_fingerprint(&msg, &schema).unwrap();
    assert_eq!(fp.as_str(), expected);
}

// ---------------------------------------------------------------------------
// 4. Unknown trailers
// ---------------------------------------------------------------------------

#[test]
fn unknown_group_passthrough() {
    let schema = single_field(ScalarKind::Int32);
    let mut msg = Message::new(&schema);
    msg.set(1, 1i32).unwrap();
    // Field 2 group { field 1 = 5 }, then field 3 fixed32.
    msg.add_unknown(&hex::decode("130805141dffffffff").unwrap());

    let with_unknown = EncodeOptions {
        deterministic: true,
        ..EncodeOptions::default()
    };
    assert_eq!(
        hex::encode(encode(&msg, &schema, &with_unknown).unwrap()),
        "0801130805141dffffffff"
    );
    assert_eq!(canonical_hex(&msg), "0801");
}
