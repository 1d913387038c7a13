//! Shared corpus builders for the msgcmp benchmark suites.

use std::sync::Arc;

use lock_tests::fixtures::{field, leaf, leaf_schema, sample_record};
use msgcmp_kernel::message::storage::Message;
use msgcmp_kernel::schema::descriptor::MessageSchema;
use msgcmp_kernel::wire::WireType;
use prost::encoding::{encode_key, encode_varint};

/// A record scaled to `width`: `width` packed values, map entries,
/// and repeated children, on top of [`sample_record`].
///
/// Map entries are inserted in ascending key order unless `reverse` is set,
/// so two builds with different `reverse` are equal but stored differently.
///
/// # Panics
///
/// Panics if the record schema rejects a value. Benchmark setup failures are fatal.
#[must_use]
pub fn wide_record(schema: &Arc<MessageSchema>, width: usize, reverse: bool) -> Message {
    let mut msg = sample_record(schema, &[]);
    let leaf_schema = leaf_schema();

    let mut keys: Vec<String> = (0..width).map(|i| format!("key_{i:06}")).collect();
    if reverse {
        keys.reverse();
    }
    for (i, key) in keys.into_iter().enumerate() {
        let v = i64::try_from(i).unwrap_or(i64::MAX);
        msg.map_insert(field::ATTRS, key, v).expect("attrs");
    }
    for i in 0..width {
        let id = i32::try_from(i).unwrap_or(i32::MAX);
        msg.push(field::VALUES, id).expect("values");
        msg.push(field::CHILDREN, leaf(&leaf_schema, id, "bench"))
            .expect("children");
    }
    msg
}

/// Unknown-field trailer of `count` varint fields with descending numbers,
/// so the comparer has to reorder every entry.
#[must_use]
pub fn unsorted_trailer(count: u32) -> Vec<u8> {
    let mut out = Vec::new();
    for number in (1000..1000 + count).rev() {
        encode_key(number, WireType::Varint, &mut out);
        encode_varint(1, &mut out);
    }
    out
}
