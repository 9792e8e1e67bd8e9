//! Case-insensitive capability sets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Normalized comparison key for a capability tag.
pub fn normalize_capability(capability: &str) -> String {
    capability.trim().to_lowercase()
}

/// Set of capability tags compared case-insensitively.
///
/// The first spelling seen for a tag is kept for display; lookups and
/// equality use the normalized key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct CapabilitySet {
    tags: BTreeMap<String, String>,
}

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tag. Returns false when an equal tag (ignoring case) already exists.
    pub fn insert(&mut self, capability: &str) -> bool {
        let key = normalize_capability(capability);
        if key.is_empty() || self.tags.contains_key(&key) {
            return false;
        }
        self.tags.insert(key, capability.trim().to_string());
        true
    }

    pub fn contains(&self, capability: &str) -> bool {
        self.tags.contains_key(&normalize_capability(capability))
    }

    /// True when every requested tag is present. An empty request is always satisfied.
    pub fn contains_all<I, S>(&self, required: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        required
            .into_iter()
            .all(|capability| self.contains(capability.as_ref()))
    }

    /// Tags in their declared spelling, ordered by normalized key.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.values().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl PartialEq for CapabilitySet {
    fn eq(&self, other: &Self) -> bool {
        self.tags.keys().eq(other.tags.keys())
    }
}

impl Eq for CapabilitySet {}

impl<S: AsRef<str>> FromIterator<S> for CapabilitySet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut set = CapabilitySet::new();
        for capability in iter {
            set.insert(capability.as_ref());
        }
        set
    }
}

impl From<Vec<String>> for CapabilitySet {
    fn from(tags: Vec<String>) -> Self {
        tags.into_iter().collect()
    }
}

impl From<CapabilitySet> for Vec<String> {
    fn from(set: CapabilitySet) -> Self {
        set.tags.into_values().collect()
    }
}
