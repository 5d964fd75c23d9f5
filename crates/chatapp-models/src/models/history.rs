/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! # History Module
//!
//! Requests for a slice of the message log, sent by clients over the websocket
//! as `{"first_id": F, "last_id": L}`. Both values may be JSON integers or
//! strings holding integers.
//!
//! Indices follow list-range semantics: they are zero-based log positions,
//! inclusive at both ends, and negative values count back from the end
//! (`-1` is the newest message).

use serde::{de, Deserialize, Deserializer, Serialize};

/// Number of messages a single request may span by default.
pub const DEFAULT_HISTORY_WINDOW: i64 = 50;

/// A client request for part of the message log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct HistoryRequest {
    #[serde(deserialize_with = "int_or_string")]
    pub first_id: i64,
    #[serde(deserialize_with = "int_or_string")]
    pub last_id: i64,
}

impl HistoryRequest {
    pub fn new(first_id: i64, last_id: i64) -> Self {
        HistoryRequest { first_id, last_id }
    }

    /// Parses a websocket text frame.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Returns the `(first, last)` range to query.
    ///
    /// When `last` is positive and the span exceeds `window`, or when `last`
    /// counts from the end, `first` is pulled up to `last - window`. The
    /// subtraction saturates at `i64::MIN`.
    pub fn window(&self, window: i64) -> (i64, i64) {
        let last = self.last_id;
        let mut first = self.first_id;
        let floor = last.saturating_sub(window);
        if (last > 0 && floor > first) || last < 0 {
            first = floor;
        }
        (first, last)
    }
}

/// Resolves an inclusive list-range against a log of `len` entries.
///
/// Returns the half-open `start..end` slice bounds, or `None` when the range
/// selects nothing.
pub fn resolve_list_range(len: usize, first: i64, last: i64) -> Option<(usize, usize)> {
    if len == 0 {
        return None;
    }
    let len = len as i64;
    let start = if first < 0 { len.saturating_add(first).max(0) } else { first };
    let end = if last < 0 { len.saturating_add(last) } else { last.min(len - 1) };
    if start > end || start >= len || end < 0 {
        return None;
    }
    Some((start as usize, end as usize + 1))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrString {
    Int(i64),
    Float(f64),
    Str(String),
}

fn int_or_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match IntOrString::deserialize(deserializer)? {
        IntOrString::Int(v) => Ok(v),
        IntOrString::Float(v) if v.is_finite() => Ok(v.trunc() as i64),
        IntOrString::Float(v) => Err(de::Error::custom(format!("invalid id {}", v))),
        IntOrString::Str(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| de::Error::custom(format!("invalid id {:?}", s))),
    }
}
