//! The materialized filter object handed to data consumers and persisted in
//! saved filter sets.

use crate::range::{EncodedRangeToken, RangeFilter, decode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A selection identified by key, shown by label (personnel selections)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabeledKey {
    pub key: String,
    pub label: String,
}

impl LabeledKey {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

/// One value of a filter object
///
/// Variant order matters for deserialization: an empty array is a `List`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Selected option labels or codes
    List(Vec<String>),
    /// Selected `{key, label}` objects
    Labeled(Vec<LabeledKey>),
    /// A scalar string, including encoded range tokens
    Text(String),
    /// Anything else a saved set may carry (numbers, nested objects)
    Other(Value),
}

impl FilterValue {
    /// Human-readable parts of this value, in order
    pub fn labels(&self) -> Vec<&str> {
        match self {
            FilterValue::List(items) => items.iter().map(String::as_str).collect(),
            FilterValue::Labeled(items) => items.iter().map(|i| i.label.as_str()).collect(),
            FilterValue::Text(text) => vec![text.as_str()],
            FilterValue::Other(_) => Vec::new(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FilterValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, FilterValue::List(_) | FilterValue::Labeled(_))
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(items: Vec<String>) -> Self {
        FilterValue::List(items)
    }
}

impl From<Vec<&str>> for FilterValue {
    fn from(items: Vec<&str>) -> Self {
        FilterValue::List(items.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<LabeledKey>> for FilterValue {
    fn from(items: Vec<LabeledKey>) -> Self {
        FilterValue::Labeled(items)
    }
}

impl From<String> for FilterValue {
    fn from(text: String) -> Self {
        FilterValue::Text(text)
    }
}

impl From<&str> for FilterValue {
    fn from(text: &str) -> Self {
        FilterValue::Text(text.to_string())
    }
}

impl From<EncodedRangeToken> for FilterValue {
    fn from(token: EncodedRangeToken) -> Self {
        FilterValue::Text(token.into())
    }
}

/// Mapping from field name to value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterObject(BTreeMap<String, FilterValue>);

impl FilterObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode the entry at `key` as a range token
    pub fn range(&self, key: &str) -> Option<RangeFilter> {
        self.get(key).and_then(FilterValue::as_text).and_then(decode)
    }

    /// The entry at `key` as a list of labels, if it is an array
    pub fn list(&self, key: &str) -> Option<Vec<&str>> {
        self.get(key).filter(|v| v.is_array()).map(FilterValue::labels)
    }

    /// JSON object form, as sent to option sources
    pub fn to_json_map(&self) -> serde_json::Map<String, Value> {
        self.0
            .iter()
            .filter_map(|(k, v)| serde_json::to_value(v).ok().map(|v| (k.clone(), v)))
            .collect()
    }
}

impl FromIterator<(String, FilterValue)> for FilterObject {
    fn from_iter<T: IntoIterator<Item = (String, FilterValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
