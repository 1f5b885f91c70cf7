//! Accumulating key/value context fed by mapping actions.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Values collected while running a template's data mappings.
///
/// Keys are kept in insertion order and are never removed. Writing an existing
/// key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataContext {
    values: IndexMap<String, Value>,
}

impl DataContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites `key`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    /// Merges every entry of `other`, later values winning.
    pub fn extend<K, I>(&mut self, other: I)
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        for (key, value) in other {
            self.values.insert(key.into(), value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
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

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Snapshot as a JSON object.
    pub fn to_json(&self) -> Value {
        Value::Object(self.values.iter().map(|(key, value)| (key.clone(), value.clone())).collect::<Map<_, _>>())
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for DataContext {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut context = Self::new();
        context.extend(iter);
        context
    }
}

impl From<Map<String, Value>> for DataContext {
    fn from(map: Map<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

impl IntoIterator for DataContext {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}
