//! Core library for the `weather` dashboard.
//!
//! This crate defines:
//! - Configuration, recent searches, favorites and the comparison list
//! - An OpenWeather client behind the [`WeatherProvider`] trait
//! - Shared domain models (samples, forecasts, derived view data)
//! - Pure transformations over fetched data: daily forecast aggregation,
//!   outfit suggestions and weather notifications
//!
//! It is used by `weather-cli`, but the transformations have no I/O and can
//! be reused by any presentation layer.

pub mod compare;
pub mod config;
pub mod error;
pub mod forecast;
pub mod history;
pub mod model;
pub mod notify;
pub mod outfit;
pub mod provider;

pub use compare::{ComparisonList, ComparisonRow};
pub use config::Config;
pub use error::WeatherError;
pub use forecast::aggregate_daily;
pub use history::{Favorites, RecentSearches};
pub use model::{
    Condition, DailySummary, ForecastSample, ForecastSet, NotificationEvent, NotificationId,
    OutfitSuggestion, Severity, Units, WeatherSample,
};
pub use notify::evaluate as evaluate_notifications;
pub use outfit::{suggest_outfit, suggest_outfit_for};
pub use provider::{LocationQuery, WeatherProvider};
