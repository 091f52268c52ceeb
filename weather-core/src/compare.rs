//! Side-by-side current conditions for a handful of cities.

use anyhow::bail;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{LocationQuery, Units, WeatherProvider, WeatherSample, history::same_city};

/// Most cities compared at once.
pub const MAX_CITIES: usize = 4;

/// Saved comparison cities in insertion order, unique ignoring case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct ComparisonList(Vec<String>);

impl ComparisonList {
    /// Returns `false` if the city was already present. Fails once the list
    /// holds [`MAX_CITIES`] entries.
    pub fn add(&mut self, city: &str) -> anyhow::Result<bool> {
        let city = city.trim();
        if city.is_empty() || self.0.iter().any(|c| same_city(c, city)) {
            return Ok(false);
        }
        if self.is_full() {
            bail!("Maximum {MAX_CITIES} cities allowed for comparison");
        }
        self.0.push(city.to_string());
        Ok(true)
    }

    pub fn remove(&mut self, city: &str) -> bool {
        let city = city.trim();
        let before = self.0.len();
        self.0.retain(|c| !same_city(c, city));
        self.0.len() != before
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_full(&self) -> bool {
        self.0.len() >= MAX_CITIES
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One compared city. Exactly one of `current` and `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<WeatherSample>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Parse every input as a location, rejecting more than [`MAX_CITIES`].
pub fn parse_locations<'a>(
    cities: impl IntoIterator<Item = &'a str>,
) -> anyhow::Result<Vec<LocationQuery>> {
    let locations = cities
        .into_iter()
        .map(LocationQuery::parse)
        .collect::<anyhow::Result<Vec<_>>>()?;
    if locations.len() > MAX_CITIES {
        bail!(
            "Maximum {MAX_CITIES} cities allowed for comparison, got {}",
            locations.len()
        );
    }
    Ok(locations)
}

/// Fetch current conditions for every location concurrently.
///
/// Rows keep the input order. A failed city becomes a row carrying the
/// user-facing error instead of failing the whole comparison.
pub async fn fetch_all(
    provider: &dyn WeatherProvider,
    locations: &[LocationQuery],
    units: Units,
) -> Vec<ComparisonRow> {
    let results = join_all(locations.iter().map(|loc| provider.current(loc, units))).await;

    locations
        .iter()
        .zip(results)
        .map(|(loc, result)| match result {
            Ok(sample) => ComparisonRow {
                query: loc.to_string(),
                current: Some(sample),
                error: None,
            },
            Err(err) => {
                warn!(location = %loc, error = %err, "comparison fetch failed");
                ComparisonRow {
                    query: loc.to_string(),
                    current: None,
                    error: Some(err.user_message()),
                }
            }
        })
        .collect()
}
