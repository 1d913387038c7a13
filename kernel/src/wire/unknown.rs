//! Unknown-field comparer: semantic equality of two unparsed trailers.
//!
//! Trailers are raw wire bytes the decoder could not attribute to a known
//! field. Two trailers are equal when they carry the same fields with the
//! same values, regardless of how fields with *different* numbers are
//! interleaved. Relative order among fields sharing a number is significant
//! (it is the order of a repeated field).
//!
//! # Algorithm
//!
//! 1. Both empty ⇒ `Equal`; exactly one empty ⇒ `NotEqual`.
//! 2. Parse each buffer into a field tree. Groups become nested levels.
//! 3. Stable-sort every level by field number.
//! 4. Compare the trees.
//!
//! There is no byte-identity shortcut: identical buffers still have to parse
//! within the limits, so an over-deep trailer reports
//! [`UnknownCompareResult::MaxDepthExceeded`] even when compared with itself.
//!
//! # Limits
//!
//! Top-level fields are at level 0. Entering a group at level `d` fails when
//! `d + 1 >= max_depth`, so the default limit of 100 admits 99 nested groups.
//! Each buffer may contain at most `max_fields` fields in total.
//! Malformed input (truncation, bad wire type, field number 0, unbalanced
//! groups) compares `NotEqual`.

use prost::encoding::{decode_key, decode_varint};

use crate::wire::WireType;

/// Default group nesting limit.
pub const DEFAULT_UNKNOWN_DEPTH_LIMIT: u32 = 100;

/// Default per-buffer field budget.
pub const DEFAULT_UNKNOWN_FIELD_BUDGET: usize = 1 << 20;

/// Result of comparing two unknown-field trailers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownCompareResult {
    Equal,
    NotEqual,
    /// Group nesting reached the depth limit.
    MaxDepthExceeded,
    /// A buffer holds more fields than the budget allows.
    ResourceExhausted,
}

/// Bounds applied while parsing trailers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownLimits {
    pub max_depth: u32,
    pub max_fields: usize,
}

impl Default for UnknownLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_UNKNOWN_DEPTH_LIMIT,
            max_fields: DEFAULT_UNKNOWN_FIELD_BUDGET,
        }
    }
}

/// Compare two trailers.
#[must_use]
pub fn unknown_fields_equal(
    buf1: &[u8],
    buf2: &[u8],
    limits: &UnknownLimits,
) -> UnknownCompareResult {
    match (buf1.is_empty(), buf2.is_empty()) {
        (true, true) => return UnknownCompareResult::Equal,
        (true, false) | (false, true) => return UnknownCompareResult::NotEqual,
        (false, false) => {}
    }

    let first = match parse(buf1, limits) {
        Ok(tree) => tree,
        Err(e) => return e.into_result(),
    };
    let second = match parse(buf2, limits) {
        Ok(tree) => tree,
        Err(e) => return e.into_result(),
    };

    if first == second {
        UnknownCompareResult::Equal
    } else {
        UnknownCompareResult::NotEqual
    }
}

#[derive(Debug, PartialEq, Eq)]
struct UnknownField<'a> {
    number: u32,
    value: UnknownValue<'a>,
}

#[derive(Debug, PartialEq, Eq)]
enum UnknownValue<'a> {
    Varint(u64),
    Fixed64(u64),
    Fixed32(u32),
    Delimited(&'a [u8]),
    Group(Vec<UnknownField<'a>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseError {
    Malformed,
    TooDeep,
    TooMany,
}

impl ParseError {
    const fn into_result(self) -> UnknownCompareResult {
        match self {
            Self::Malformed => UnknownCompareResult::NotEqual,
            Self::TooDeep => UnknownCompareResult::MaxDepthExceeded,
            Self::TooMany => UnknownCompareResult::ResourceExhausted,
        }
    }
}

fn parse<'a>(data: &'a [u8], limits: &UnknownLimits) -> Result<Vec<UnknownField<'a>>, ParseError> {
    let mut parser = Parser {
        rest: data,
        limits,
        fields: 0,
    };
    parser.level(0, None)
}

struct Parser<'a, 'l> {
    rest: &'a [u8],
    limits: &'l UnknownLimits,
    fields: usize,
}

impl<'a> Parser<'a, '_> {
    /// Parse fields until end of input (top level) or the end-group tag
    /// matching `group`.
    fn level(&mut self, depth: u32, group: Option<u32>) -> Result<Vec<UnknownField<'a>>, ParseError> {
        let mut fields = Vec::new();
        loop {
            if self.rest.is_empty() {
                if group.is_some() {
                    return Err(ParseError::Malformed);
                }
                break;
            }

            // Rejects field number 0, numbers above 2^29 - 1 and wire types 6 and 7.
            let (number, wire_type) =
                decode_key(&mut self.rest).map_err(|_| ParseError::Malformed)?;

            let value = match wire_type {
                WireType::Varint => UnknownValue::Varint(self.varint()?),
                WireType::SixtyFourBit => {
                    let mut raw = [0u8; 8];
                    raw.copy_from_slice(self.take(8)?);
                    UnknownValue::Fixed64(u64::from_le_bytes(raw))
                }
                WireType::ThirtyTwoBit => {
                    let mut raw = [0u8; 4];
                    raw.copy_from_slice(self.take(4)?);
                    UnknownValue::Fixed32(u32::from_le_bytes(raw))
                }
                WireType::LengthDelimited => {
                    let len = usize::try_from(self.varint()?).map_err(|_| ParseError::Malformed)?;
                    UnknownValue::Delimited(self.take(len)?)
                }
                WireType::StartGroup => {
                    if depth + 1 >= self.limits.max_depth {
                        return Err(ParseError::TooDeep);
                    }
                    UnknownValue::Group(self.level(depth + 1, Some(number))?)
                }
                WireType::EndGroup => {
                    if group != Some(number) {
                        return Err(ParseError::Malformed);
                    }
                    break;
                }
            };

            self.fields += 1;
            if self.fields > self.limits.max_fields {
                return Err(ParseError::TooMany);
            }
            fields.push(UnknownField { number, value });
        }

        // Stable: same-numbered fields keep their relative order.
        fields.sort_by_key(|f| f.number);
        Ok(fields)
    }

    fn varint(&mut self) -> Result<u64, ParseError> {
        decode_varint(&mut self.rest).map_err(|_| ParseError::Malformed)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], ParseError> {
        if len > self.rest.len() {
            return Err(ParseError::Malformed);
        }
        let (bytes, rest) = self.rest.split_at(len);
        self.rest = rest;
        Ok(bytes)
    }
}
