//! Container equality: repeated fields and map fields.
//!
//! Arrays are ordered: equal iff same length and pairwise-equal elements.
//! Maps are unordered: equal iff same size and every key of the first maps
//! to an equal value in the second. An absent container counts as empty.

use std::ptr;

use msgcmp_kernel::message::array::Array;
use msgcmp_kernel::message::map::Map;
use msgcmp_kernel::schema::field::ValueType;

use crate::error::CompareError;
use crate::structural::Engine;

pub(crate) fn array_equal(
    engine: &Engine,
    a1: Option<&Array>,
    a2: Option<&Array>,
    element: &ValueType,
) -> Result<bool, CompareError> {
    if let (Some(x), Some(y)) = (a1, a2) {
        if ptr::eq(x, y) {
            return Ok(true);
        }
    }
    let len1 = a1.map_or(0, Array::len);
    if len1 != a2.map_or(0, Array::len) {
        return Ok(false);
    }
    let (Some(a1), Some(a2)) = (a1, a2) else {
        // Both empty.
        return Ok(true);
    };
    for (v1, v2) in a1.iter().zip(a2.iter()) {
        if !engine.value(element, v1, v2)? {
            return Ok(false);
        }
    }
    Ok(true)
}

pub(crate) fn map_equal(
    engine: &Engine,
    m1: Option<&Map>,
    m2: Option<&Map>,
    value_type: &ValueType,
) -> Result<bool, CompareError> {
    if let (Some(x), Some(y)) = (m1, m2) {
        if ptr::eq(x, y) {
            return Ok(true);
        }
    }
    let len1 = m1.map_or(0, Map::len);
    if len1 != m2.map_or(0, Map::len) {
        return Ok(false);
    }
    let (Some(m1), Some(m2)) = (m1, m2) else {
        return Ok(true);
    };
    for (key, v1) in m1.iter() {
        let Some(v2) = m2.get(key) else {
            return Ok(false);
        };
        if !engine.value(value_type, v1, v2)? {
            return Ok(false);
        }
    }
    Ok(true)
}
