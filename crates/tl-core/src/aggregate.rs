//! Per-project totals.

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::Serialize;

/// Total milliseconds per project key, ordered by key.
///
/// Keys are stored exactly as parsed. Nothing is ever removed. Totals
/// saturate at `i64::MAX` instead of overflowing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Aggregate {
    totals: BTreeMap<String, i64>,
}

impl Aggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `millis` to the total for `key`, starting from 0 if absent.
    pub fn accumulate(&mut self, key: &str, millis: i64) {
        debug_assert!(millis >= 0, "negative duration for {key}: {millis}");
        if let Some(total) = self.totals.get_mut(key) {
            *total = total.saturating_add(millis);
        } else {
            self.totals.insert(key.to_string(), millis);
        }
    }

    /// Adds every total of `other` into `self`.
    pub fn merge(&mut self, other: Self) {
        self.extend(other.totals);
    }

    /// Ensures each key is present, with 0 if it had no time.
    pub fn include_known<I, S>(&mut self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for key in keys {
            self.accumulate(key.as_ref(), 0);
        }
    }

    pub fn get(&self, key: &str) -> Option<i64> {
        self.totals.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.totals.iter().map(|(key, total)| (key.as_str(), *total))
    }

    pub const fn totals(&self) -> &BTreeMap<String, i64> {
        &self.totals
    }

    pub fn into_totals(self) -> BTreeMap<String, i64> {
        self.totals
    }

    /// Sum of all totals.
    pub fn grand_total(&self) -> i64 {
        self.totals
            .values()
            .fold(0_i64, |sum, total| sum.saturating_add(*total))
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

impl Extend<(String, i64)> for Aggregate {
    fn extend<T: IntoIterator<Item = (String, i64)>>(&mut self, iter: T) {
        for (key, millis) in iter {
            let total = self.totals.entry(key).or_insert(0);
            *total = total.saturating_add(millis);
        }
    }
}

impl FromIterator<(String, i64)> for Aggregate {
    fn from_iter<T: IntoIterator<Item = (String, i64)>>(iter: T) -> Self {
        let mut aggregate = Self::new();
        aggregate.extend(iter);
        aggregate
    }
}

impl IntoIterator for Aggregate {
    type Item = (String, i64);
    type IntoIter = btree_map::IntoIter<String, i64>;

    fn into_iter(self) -> Self::IntoIter {
        self.totals.into_iter()
    }
}
