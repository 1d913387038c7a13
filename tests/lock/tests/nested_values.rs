//! Equality over nested container values.
//!
//! - Maps whose values are submessages compare values deeply, per key.
//! - Repeated, map and message-typed extensions dispatch like base fields.
//! - An extension holding an empty container still counts as present.
//! - Schemas that share sub-schemas compare in time linear in the message.

use std::sync::Arc;

use lock_tests::fixtures::{leaf, leaf_schema, record_schema, EXTENSION_BASE};
use msgcmp_compare::{is_equal, is_exactly_equal};
use msgcmp_kernel::message::storage::Message;
use msgcmp_kernel::schema::descriptor::{scalar, MessageSchema, SchemaBuilder};
use msgcmp_kernel::schema::extension::ExtensionDescriptor;
use msgcmp_kernel::schema::field::{FieldKind, ScalarKind, ValueType};

const BY_NAME: u32 = 1;

/// `message Index { map<string, Leaf> by_name = 1; }`
fn index_schema() -> Arc<MessageSchema> {
    SchemaBuilder::new("test.Index")
        .map(
            BY_NAME,
            "by_name",
            ValueType::String,
            ValueType::Message(leaf_schema()),
        )
        .build()
        .unwrap()
}

fn index(schema: &Arc<MessageSchema>, entries: &[(&str, i32, &str)]) -> Message {
    let leaf_schema = schema
        .field_by_number(BY_NAME)
        .and_then(|f| f.sub_schema())
        .cloned()
        .unwrap();
    let mut msg = Message::new(schema);
    for (key, id, label) in entries {
        msg.map_insert(BY_NAME, *key, leaf(&leaf_schema, *id, label))
            .unwrap();
    }
    msg
}

fn record_ext(offset: u32, name: &str, kind: FieldKind) -> Arc<ExtensionDescriptor> {
    ExtensionDescriptor::new("test.Record", EXTENSION_BASE + offset, name, kind).unwrap()
}

// ---------------------------------------------------------------------------
// Message-valued maps
// ---------------------------------------------------------------------------

#[test]
fn message_valued_map_equal_in_any_order() {
    let schema = index_schema();
    let a = index(&schema, &[("x", 1, "one"), ("y", 2, "two")]);
    let b = index(&schema, &[("y", 2, "two"), ("x", 1, "one")]);
    assert!(is_equal(&a, &b, &schema));
    assert!(is_exactly_equal(&a, &b, &schema));
}

#[test]
fn message_valued_map_nested_difference() {
    let schema = index_schema();
    let a = index(&schema, &[("x", 1, "one"), ("y", 2, "two")]);
    let b = index(&schema, &[("x", 1, "one"), ("y", 2, "TWO")]);
    assert!(!is_equal(&a, &b, &schema));
    assert!(!is_equal(&b, &a, &schema));
    assert!(!is_exactly_equal(&a, &b, &schema));
}

#[test]
fn message_valued_map_missing_key() {
    let schema = index_schema();
    let a = index(&schema, &[("x", 1, "one"), ("y", 2, "two")]);
    let b = index(&schema, &[("x", 1, "one"), ("z", 2, "two")]);
    assert!(!is_equal(&a, &b, &schema));

    let shorter = index(&schema, &[("x", 1, "one")]);
    assert!(!is_equal(&a, &shorter, &schema));
}

#[test]
fn message_valued_map_unknown_fields_in_values() {
    let schema = index_schema();
    let a = index(&schema, &[("x", 1, "one")]);
    let mut b = a.clone();
    let mut tagged = leaf(&leaf_schema(), 1, "one");
    tagged.add_unknown(&[0x50, 0x01]);
    b.map_insert(BY_NAME, "x", tagged).unwrap();

    assert!(!is_equal(&a, &b, &schema));
    assert!(is_exactly_equal(&a, &b, &schema));
}

// ---------------------------------------------------------------------------
// Extensions beyond singular scalars
// ---------------------------------------------------------------------------

#[test]
fn repeated_extension_is_order_sensitive() {
    let schema = record_schema();
    let nums = record_ext(
        0,
        "nums",
        FieldKind::Repeated {
            element: scalar(ScalarKind::Int32),
            packed: true,
        },
    );
    let build = |values: &[i32]| {
        let mut msg = Message::new(&schema);
        let arr = msg.extension_array_mut(&nums).unwrap();
        for v in values {
            arr.push(*v).unwrap();
        }
        msg
    };

    assert!(is_equal(&build(&[1, 2]), &build(&[1, 2]), &schema));
    assert!(!is_equal(&build(&[1, 2]), &build(&[2, 1]), &schema));
    assert!(!is_equal(&build(&[1, 2]), &build(&[1, 2, 3]), &schema));
    assert!(!is_exactly_equal(&build(&[1, 2]), &build(&[2, 1]), &schema));
}

#[test]
fn map_extension_is_order_insensitive() {
    let schema = record_schema();
    let tags = record_ext(
        1,
        "tags",
        FieldKind::Map {
            key: scalar(ScalarKind::Int32),
            value: ValueType::String,
        },
    );
    let mut d = Message::new(&schema);
    let map = d.extension_map_mut(&tags).unwrap();
    map.insert(1i32, "a").unwrap();
    map.insert(2i32, "b").unwrap();
    let mut e = Message::new(&schema);
    let map = e.extension_map_mut(&tags).unwrap();
    map.insert(2i32, "b").unwrap();
    map.insert(1i32, "a").unwrap();

    assert!(is_equal(&d, &e, &schema));
    assert!(is_exactly_equal(&d, &e, &schema));

    e.extension_map_mut(&tags).unwrap().insert(2i32, "c").unwrap();
    assert!(!is_equal(&d, &e, &schema));
}

#[test]
fn message_extension_compared_deeply() {
    let schema = record_schema();
    let leaf_schema = leaf_schema();
    let note = record_ext(
        2,
        "note",
        FieldKind::Singular(ValueType::Message(Arc::clone(&leaf_schema))),
    );

    let mut a = Message::new(&schema);
    a.set_extension(&note, leaf(&leaf_schema, 7, "seven")).unwrap();
    let mut b = Message::new(&schema);
    b.set_extension(&note, leaf(&leaf_schema, 7, "seven")).unwrap();
    assert!(is_equal(&a, &b, &schema));
    assert!(is_exactly_equal(&a, &b, &schema));

    b.set_extension(&note, leaf(&leaf_schema, 7, "SEVEN")).unwrap();
    assert!(!is_equal(&a, &b, &schema));
    assert!(!is_exactly_equal(&a, &b, &schema));
}

/// An empty container extension is stored, so the extension counts differ.
/// It encodes to nothing, so the canonical encodings agree.
#[test]
fn empty_array_extension_differs_from_absent() {
    let schema = record_schema();
    let nums = record_ext(
        0,
        "nums",
        FieldKind::Repeated {
            element: scalar(ScalarKind::Int32),
            packed: true,
        },
    );
    let mut a = Message::new(&schema);
    a.extension_array_mut(&nums).unwrap();
    let b = Message::new(&schema);

    assert_eq!(a.extension_count(), 1);
    assert!(!is_equal(&a, &b, &schema));
    assert!(!is_equal(&b, &a, &schema));
    assert!(is_exactly_equal(&a, &b, &schema));
}

// ---------------------------------------------------------------------------
// Shared sub-schemas
// ---------------------------------------------------------------------------

/// Each level holds two optional links to the level below.
fn diamond_chain(levels: usize) -> Arc<MessageSchema> {
    let mut schema = leaf_schema();
    for i in 0..levels {
        schema = SchemaBuilder::new(format!("test.Level{i}"))
            .optional(1, "left", ValueType::Message(Arc::clone(&schema)))
            .optional(2, "right", ValueType::Message(schema))
            .build()
            .unwrap();
    }
    schema
}

fn deep_path(schema: &Arc<MessageSchema>, levels: usize, label: &str) -> Message {
    let mut msg = Message::new(schema);
    let mut cursor = &mut msg;
    for _ in 0..levels {
        cursor = cursor.message_mut(1).unwrap();
    }
    cursor.set(2, label).unwrap();
    msg
}

#[test]
fn rebuilt_shared_schemas_compare_quickly() {
    const LEVELS: usize = 48;
    let s1 = diamond_chain(LEVELS);
    let s2 = diamond_chain(LEVELS);
    assert!(!Arc::ptr_eq(&s1, &s2));

    assert!(is_equal(&Message::new(&s1), &Message::new(&s2), &s1));

    let a = deep_path(&s1, LEVELS, "tip");
    let b = deep_path(&s2, LEVELS, "tip");
    assert!(is_equal(&a, &b, &s1));
    assert!(is_exactly_equal(&a, &b, &s2));

    let c = deep_path(&s2, LEVELS, "other");
    assert!(!is_equal(&a, &c, &s1));
}
