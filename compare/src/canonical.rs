//! Exact equality: byte comparison of canonical encodings.
//!
//! Both messages are encoded with unknown fields skipped and deterministic
//! ordering, into a scratch arena that lives for one call. Encodings are
//! compared by length, then by content. The arena is released when it goes
//! out of scope, on every return path.

use std::ptr;
use std::sync::Arc;

use msgcmp_kernel::message::storage::Message;
use msgcmp_kernel::proof::hash::{canonical_hash, ContentHash, DOMAIN_EXACT_ENCODING};
use msgcmp_kernel::schema::descriptor::MessageSchema;
use msgcmp_kernel::wire::arena::ScratchArena;
use msgcmp_kernel::wire::encode::{encode_in, EncodeOptions};
use tracing::debug;

use crate::error::CompareError;
use crate::policy::ComparePolicyV1;
use crate::structural::check_schema;

fn arena_for(policy: &ComparePolicyV1) -> ScratchArena {
    policy
        .max_scratch_bytes
        .map_or_else(ScratchArena::new, ScratchArena::with_limit)
}

const fn options_for(policy: &ComparePolicyV1) -> EncodeOptions {
    EncodeOptions {
        max_depth: policy.max_encode_depth,
        ..EncodeOptions::CANONICAL
    }
}

pub(crate) fn exactly_equal(
    policy: &ComparePolicyV1,
    m1: &Message,
    m2: &Message,
    schema: &Arc<MessageSchema>,
) -> Result<bool, CompareError> {
    if ptr::eq(m1, m2) {
        return Ok(true);
    }
    check_schema(m1, schema)?;
    check_schema(m2, schema)?;

    let opts = options_for(policy);
    let mut arena = arena_for(policy);
    let b1 = encode_in(m1, schema, &opts, &mut arena)?;
    let b2 = encode_in(m2, schema, &opts, &mut arena)?;
    let (e1, e2) = (arena.get(b1), arena.get(b2));

    if e1.len() != e2.len() {
        debug!(
            schema = schema.full_name(),
            left = e1.len(),
            right = e2.len(),
            "canonical encodings differ in length"
        );
        return Ok(false);
    }
    let equal = e1 == e2;
    if !equal {
        debug!(schema = schema.full_name(), "canonical encodings differ");
    }
    Ok(equal)
}

pub(crate) fn fingerprint(
    policy: &ComparePolicyV1,
    msg: &Message,
    schema: &Arc<MessageSchema>,
) -> Result<ContentHash, CompareError> {
    check_schema(msg, schema)?;
    let mut arena = arena_for(policy);
    let buf = encode_in(msg, schema, &options_for(policy), &mut arena)?;
    Ok(canonical_hash(DOMAIN_EXACT_ENCODING, arena.get(buf)))
}
