//! Tiny binary that builds the sample record, encodes it canonically, and
//! prints deterministic output lines for cross-process verification.
//!
//! Used by `exact_crossproc` to verify that canonical bytes, fingerprints,
//! and verdicts are identical across process environments (cwd, locale,
//! env) and across map insertion orders.
//!
//! Usage: `exact_fixture`
//! Output: five lines, each `key=value`:
//!   `canonical_hex`=...
//!   `fingerprint`=sha256:...
//!   `fingerprint_reordered`=sha256:...
//!   `is_equal`=true
//!   `is_exactly_equal`=true

use lock_tests::fixtures::{record_schema, sample_record};
use msgcmp_compare::Comparator;
use msgcmp_kernel::wire::encode::{encode, EncodeOptions};

fn main() {
    let schema = record_schema();
    let forward = sample_record(&schema, &[("alpha", 1), ("beta", -2), ("gamma", 3)]);
    let reversed = sample_record(&schema, &[("gamma", 3), ("beta", -2), ("alpha", 1)]);

    let canonical = encode(&forward, &schema, &EncodeOptions::CANONICAL).unwrap();

    let cmp = Comparator::default();
    let fp = cmp.exact_fingerprint(&forward, &schema).unwrap();
    let fp_reordered = cmp.exact_fingerprint(&reversed, &schema).unwrap();

    println!("canonical_hex={}", hex::encode(&canonical));
    println!("fingerprint={fp}");
    println!("fingerprint_reordered={fp_reordered}");
    println!("is_equal={}", cmp.is_equal(&forward, &reversed, &schema));
    println!(
        "is_exactly_equal={}",
        cmp.is_exactly_equal(&forward, &reversed, &schema)
    );
}
