//! Caller-supplied values that accompany a game update.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// An immutable snapshot of custom values sent by the game with one update.
///
/// Each update replaces the whole snapshot; values are never merged across
/// updates, so a key missing from the latest update reads as absent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomValues {
    values: BTreeMap<String, Value>,
}

impl CustomValues {
    /// An empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from a JSON object. Any other JSON value yields an empty snapshot.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => map.into_iter().collect(),
            _ => Self::default(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for CustomValues {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
