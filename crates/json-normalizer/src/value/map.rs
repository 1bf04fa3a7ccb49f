use std::cmp::Ordering;

use indexmap::IndexMap;

use super::JsonValue;

/// An ordered JSON object.
///
/// Keys are unique and iteration follows insertion order, which is also the order in which the
/// object is encoded. Two maps are equal only if they hold the same entries in the same order.
#[derive(Debug, Clone, Default)]
pub struct Map {
    entries: IndexMap<String, JsonValue>,
}

impl Map {
    #[must_use]
    pub fn new() -> Map {
        Map {
            entries: IndexMap::new(),
        }
    }
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Map {
        Map {
            entries: IndexMap::with_capacity(capacity),
        }
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.entries.get(key)
    }
    pub fn get_mut(&mut self, key: &str) -> Option<&mut JsonValue> {
        self.entries.get_mut(key)
    }
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
    /// Insert a value under `key`.
    ///
    /// A new key is appended at the end. An existing key keeps its position and the previous value
    /// is returned.
    pub fn insert(&mut self, key: impl Into<String>, value: JsonValue) -> Option<JsonValue> {
        self.entries.insert(key.into(), value)
    }
    /// Remove `key`, preserving the relative order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<JsonValue> {
        self.entries.shift_remove(key)
    }
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
    pub fn values(&self) -> impl Iterator<Item = &JsonValue> {
        self.entries.values()
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &JsonValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }
    /// Reorder entries by ascending key.
    ///
    /// Canonical integer keys come first, by numeric value, followed by the other keys in
    /// byte-wise order.
    pub fn sort_keys(&mut self) {
        self.entries
            .sort_unstable_by(|left, _, right, _| compare_keys(left, right));
    }
    /// Reorder entries by comparing their keys with `compare`.
    ///
    /// The sort is stable: keys comparing equal keep their relative order.
    pub fn sort_keys_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&str, &str) -> Ordering,
    {
        self.entries
            .sort_by(|left, _, right, _| compare(left.as_str(), right.as_str()));
    }
    /// Compare with another map ignoring the order of entries.
    #[must_use]
    pub fn equivalent(&self, other: &Map) -> bool {
        self.len() == other.len()
            && self.iter().all(|(key, value)| {
                other
                    .get(key)
                    .is_some_and(|candidate| candidate.equivalent(value))
            })
    }
}

/// Total order over object keys.
///
/// Keys spelling a canonical decimal integer (`0`, `42`, `-7`, but not `007` or `+1`) that fits
/// into `i64` sort first, by numeric value. All other keys follow in byte-wise order.
#[must_use]
pub(crate) fn compare_keys(left: &str, right: &str) -> Ordering {
    match (integer_key(left), integer_key(right)) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => left.cmp(right),
    }
}

fn integer_key(key: &str) -> Option<i64> {
    let first = *key.as_bytes().first()?;
    if first != b'-' && !first.is_ascii_digit() {
        return None;
    }
    let number = key.parse::<i64>().ok()?;
    (itoa::Buffer::new().format(number) == key).then_some(number)
}

impl PartialEq for Map {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .zip(other.entries.iter())
                .all(|(left, right)| left == right)
    }
}

impl Eq for Map {}

impl FromIterator<(String, JsonValue)> for Map {
    fn from_iter<T: IntoIterator<Item = (String, JsonValue)>>(iter: T) -> Self {
        Map {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Extend<(String, JsonValue)> for Map {
    fn extend<T: IntoIterator<Item = (String, JsonValue)>>(&mut self, iter: T) {
        self.entries.extend(iter);
    }
}

impl IntoIterator for Map {
    type Item = (String, JsonValue);
    type IntoIter = indexmap::map::IntoIter<String, JsonValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Map {
    type Item = (&'a String, &'a JsonValue);
    type IntoIter = indexmap::map::Iter<'a, String, JsonValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
