//! Ordered key/value lists used for headers and query parameters.
//!
//! Lists keep the user's row order for editing. Comparisons that decide
//! whether two lists carry the same content sort by `(key, value)` first.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// One header or query row.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct KeyValue {
    /// Row key.
    pub key: String,
    /// Row value.
    pub value: String,
}

impl KeyValue {
    /// Creates a row.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Rows with an empty key or value are never sent nor saved.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.key.trim().is_empty() && !self.value.is_empty()
    }
}

/// Returns only the complete rows, preserving order.
#[must_use]
pub fn complete(pairs: &[KeyValue]) -> Vec<KeyValue> {
    pairs.iter().filter(|p| p.is_complete()).cloned().collect()
}

/// Returns a copy sorted by `(key, value)`.
#[must_use]
pub fn sorted(pairs: &[KeyValue]) -> Vec<KeyValue> {
    let mut out = pairs.to_vec();
    out.sort();
    out
}

/// Order-insensitive content equality.
#[must_use]
pub fn same_content(a: &[KeyValue], b: &[KeyValue]) -> bool {
    a.len() == b.len() && sorted(a) == sorted(b)
}

/// Looks up a value by key, ignoring ASCII case.
#[must_use]
pub fn find<'a>(pairs: &'a [KeyValue], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|p| p.key.eq_ignore_ascii_case(key))
        .map(|p| p.value.as_str())
}

/// Sets `key` to `value`, replacing every row whose key matches ignoring case.
///
/// The replacement takes the position of the first match.
pub fn set(pairs: &mut Vec<KeyValue>, key: &str, value: &str) {
    match pairs.iter().position(|p| p.key.eq_ignore_ascii_case(key)) {
        Some(first) => {
            pairs[first] = KeyValue::new(key, value);
            let mut index = 0;
            pairs.retain(|p| {
                let keep = index <= first || !p.key.eq_ignore_ascii_case(key);
                index += 1;
                keep
            });
        }
        None => pairs.push(KeyValue::new(key, value)),
    }
}

/// Collapses rows into a map; later rows win on duplicate keys.
#[must_use]
pub fn to_map(pairs: &[KeyValue]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|p| (p.key.clone(), p.value.clone()))
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PairsRepr {
    List(Vec<KeyValue>),
    Map(BTreeMap<String, String>),
}

/// Reads rows written either as a `[{key, value}]` list or as a JSON object.
///
/// `null` reads as an empty list.
///
/// # Errors
///
/// Fails when the value is neither shape.
pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<KeyValue>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<PairsRepr>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(PairsRepr::List(list)) => list,
        Some(PairsRepr::Map(map)) => map
            .into_iter()
            .map(|(key, value)| KeyValue { key, value })
            .collect(),
    })
}
