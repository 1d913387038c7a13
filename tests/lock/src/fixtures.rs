//! Canonical schemas and messages shared by the lock tests, the
//! `exact_fixture` binary, and the benchmarks.
//!
//! Every builder here is deterministic: same calls, same message, same
//! encoding.

use std::sync::Arc;

use msgcmp_kernel::message::storage::Message;
use msgcmp_kernel::schema::descriptor::{scalar, MessageSchema, SchemaBuilder};
use msgcmp_kernel::schema::extension::ExtensionDescriptor;
use msgcmp_kernel::schema::field::{FieldKind, ScalarKind, ValueType};

/// Field numbers of [`record_schema`].
pub mod field {
    pub const NAME: u32 = 1;
    pub const VALUES: u32 = 2;
    pub const ATTRS: u32 = 3;
    pub const CHILD: u32 = 4;
    pub const COUNT: u32 = 5;
    pub const LIMIT: u32 = 6;
    pub const RATIO: u32 = 7;
    pub const CHILDREN: u32 = 8;
    pub const PAYLOAD: u32 = 9;
}

/// Extension number range used by [`record_extensions`].
pub const EXTENSION_BASE: u32 = 100;

/// `test.Leaf { int32 id = 1; string label = 2; }`
///
/// # Panics
///
/// Never: the schema is static and valid.
#[must_use]
pub fn leaf_schema() -> Arc<MessageSchema> {
    SchemaBuilder::new("test.Leaf")
        .implicit(1, "id", scalar(ScalarKind::Int32))
        .implicit(2, "label", ValueType::String)
        .build()
        .expect("leaf schema is valid")
}

/// A record exercising every field shape the engines dispatch on.
///
/// ```text
/// message Record {
///   string name = 1;                    // implicit
///   repeated int32 values = 2;          // packed
///   map<string, int64> attrs = 3;
///   optional Leaf child = 4;
///   int32 count = 5;                    // implicit
///   optional int32 limit = 6;           // explicit
///   double ratio = 7;                   // implicit
///   repeated Leaf children = 8;
///   bytes payload = 9;                  // implicit
/// }
/// ```
///
/// # Panics
///
/// Never: the schema is static and valid.
#[must_use]
pub fn record_schema() -> Arc<MessageSchema> {
    let leaf = leaf_schema();
    SchemaBuilder::new("test.Record")
        .implicit(field::NAME, "name", ValueType::String)
        .repeated(field::VALUES, "values", scalar(ScalarKind::Int32))
        .map(
            field::ATTRS,
            "attrs",
            ValueType::String,
            scalar(ScalarKind::Int64),
        )
        .optional(field::CHILD, "child", ValueType::Message(Arc::clone(&leaf)))
        .implicit(field::COUNT, "count", scalar(ScalarKind::Int32))
        .optional(field::LIMIT, "limit", scalar(ScalarKind::Int32))
        .implicit(field::RATIO, "ratio", scalar(ScalarKind::Double))
        .repeated(field::CHILDREN, "children", ValueType::Message(leaf))
        .implicit(field::PAYLOAD, "payload", ValueType::Bytes)
        .build()
        .expect("record schema is valid")
}

/// `count` singular int32 extensions of `test.Record`, numbered from
/// [`EXTENSION_BASE`].
///
/// # Panics
///
/// Never for `count` small enough to stay in the valid number range.
#[must_use]
pub fn record_extensions(count: u32) -> Vec<Arc<ExtensionDescriptor>> {
    (0..count)
        .map(|i| {
            ExtensionDescriptor::new(
                "test.Record",
                EXTENSION_BASE + i,
                format!("ext_{i}"),
                FieldKind::Singular(scalar(ScalarKind::Int32)),
            )
            .expect("extension is valid")
        })
        .collect()
}

/// A leaf message.
///
/// # Panics
///
/// Never: values match the schema.
#[must_use]
pub fn leaf(schema: &Arc<MessageSchema>, id: i32, label: &str) -> Message {
    let mut msg = Message::new(schema);
    msg.set(1, id).expect("id");
    msg.set(2, label).expect("label");
    msg
}

/// `{ name: "x", values: [1, 2, 3] }`.
///
/// # Panics
///
/// Never: values match the schema.
#[must_use]
pub fn name_and_values(schema: &Arc<MessageSchema>, values: &[i32]) -> Message {
    let mut msg = Message::new(schema);
    msg.set(field::NAME, "x").expect("name");
    for v in values {
        msg.push(field::VALUES, *v).expect("values");
    }
    msg
}

/// A fully populated record, with map entries inserted in `attrs` order.
///
/// # Panics
///
/// Never: values match the schema.
#[must_use]
pub fn sample_record(schema: &Arc<MessageSchema>, attrs: &[(&str, i64)]) -> Message {
    let mut msg = name_and_values(schema, &[1, 2, 3]);
    for (k, v) in attrs {
        msg.map_insert(field::ATTRS, *k, *v).expect("attrs");
    }
    {
        let child = msg.message_mut(field::CHILD).expect("child");
        child.set(1, 42i32).expect("child id");
        child.set(2, "leaf").expect("child label");
    }
    msg.set(field::COUNT, 7i32).expect("count");
    msg.set(field::LIMIT, 0i32).expect("limit");
    msg.set(field::RATIO, 0.5f64).expect("ratio");
    let leaf_schema = schema
        .field_by_number(field::CHILDREN)
        .and_then(|f| f.sub_schema())
        .cloned()
        .expect("children is a message field");
    msg.push(field::CHILDREN, leaf(&leaf_schema, 1, "a"))
        .expect("children");
    msg.push(field::CHILDREN, leaf(&leaf_schema, 2, "b"))
        .expect("children");
    msg.set(field::PAYLOAD, vec![0u8, 1, 2, 0xff])
        .expect("payload");
    msg
}

/// Unknown-field bytes: `n` nested groups (field 1) around `field 2 = 1`.
#[must_use]
pub fn nested_groups(n: usize) -> Vec<u8> {
    let mut out = vec![0x0b; n];
    out.extend_from_slice(&[0x10, 0x01]);
    out.resize(out.len() + n, 0x0c);
    out
}
