//! Accumulation of insights across several alternative plans.

use std::collections::BTreeMap;

use serde::Serialize;

use super::align::PassInsights;

/// Condition key to the insights gathered for it, in AQP processing order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct InsightMap {
    entries: BTreeMap<String, Vec<String>>,
}

impl InsightMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges per-AQP results in the order given.
    pub fn merge<I>(passes: I) -> Self
    where
        I: IntoIterator<Item = PassInsights>,
    {
        let mut map = Self::new();
        for pass in passes {
            map.absorb(pass);
        }
        map
    }

    /// Appends one AQP's insights; keys it does not mention are untouched.
    pub fn absorb(&mut self, pass: PassInsights) {
        for (key, text) in pass {
            self.entries.entry(key).or_default().push(text);
        }
    }

    /// Insights stored for `key`, oldest first.
    pub fn get(&self, key: &str) -> &[String] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether any insight was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct condition keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Total number of insight sentences.
    pub fn insight_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Iterates keys with their insights in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, texts)| (key.as_str(), texts.as_slice()))
    }
}
