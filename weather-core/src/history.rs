//! Recent searches and favorite locations.
//!
//! Both lists are plain values owned by the caller (normally stored in
//! [`Config`](crate::Config)); nothing here touches global state.

use serde::{Deserialize, Serialize};

/// How many recent searches are remembered.
pub const RECENT_CAPACITY: usize = 5;

// Full Unicode case folding, so "Zürich" and "ZÜRICH" collapse.
pub(crate) fn same_city(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// Most-recent-first list of searched locations, unique ignoring case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct RecentSearches(Vec<String>);

impl RecentSearches {
    /// Move `city` to the front, dropping any case-insensitive duplicate and
    /// anything past [`RECENT_CAPACITY`].
    pub fn record(&mut self, city: &str) {
        let city = city.trim();
        if city.is_empty() {
            return;
        }
        self.0.retain(|c| !same_city(c, city));
        self.0.insert(0, city.to_string());
        self.0.truncate(RECENT_CAPACITY);
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn latest(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// Favorite locations in insertion order, unique ignoring case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Favorites(Vec<String>);

impl Favorites {
    pub fn contains(&self, city: &str) -> bool {
        let city = city.trim();
        self.0.iter().any(|c| same_city(c, city))
    }

    /// Returns `false` if the city was already a favorite.
    pub fn add(&mut self, city: &str) -> bool {
        let city = city.trim();
        if city.is_empty() || self.contains(city) {
            return false;
        }
        self.0.push(city.to_string());
        true
    }

    /// Returns `false` if the city was not a favorite.
    pub fn remove(&mut self, city: &str) -> bool {
        let city = city.trim();
        let before = self.0.len();
        self.0.retain(|c| !same_city(c, city));
        self.0.len() != before
    }

    /// Add or remove `city`; returns whether it is a favorite afterwards.
    pub fn toggle(&mut self, city: &str) -> bool {
        if self.remove(city) { false } else { self.add(city) }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
