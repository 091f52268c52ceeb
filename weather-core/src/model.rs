use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit system requested from the provider. Values in a sample stay in the
/// unit system they were fetched with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    /// Value of the OpenWeather `units` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }

    pub fn speed_symbol(&self) -> &'static str {
        match self {
            Units::Metric => "m/s",
            Units::Imperial => "mph",
        }
    }

    pub fn to_celsius(&self, temperature: f64) -> f64 {
        match self {
            Units::Metric => temperature,
            Units::Imperial => (temperature - 32.0) * 5.0 / 9.0,
        }
    }

    pub fn to_mps(&self, speed: f64) -> f64 {
        match self {
            Units::Metric => speed,
            Units::Imperial => speed * 0.44704,
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "metric" | "c" | "celsius" => Ok(Units::Metric),
            "imperial" | "f" | "fahrenheit" => Ok(Units::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown unit system '{value}'. Supported: metric, imperial."
            )),
        }
    }
}

/// Coarse weather classification (`weather[0].main` in OpenWeather payloads).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Condition {
    Clear,
    Clouds,
    Rain,
    Drizzle,
    Snow,
    Thunderstorm,
    Tornado,
    Squall,
    Mist,
    Fog,
    Haze,
    Other(String),
}

impl Condition {
    pub fn as_str(&self) -> &str {
        match self {
            Condition::Clear => "Clear",
            Condition::Clouds => "Clouds",
            Condition::Rain => "Rain",
            Condition::Drizzle => "Drizzle",
            Condition::Snow => "Snow",
            Condition::Thunderstorm => "Thunderstorm",
            Condition::Tornado => "Tornado",
            Condition::Squall => "Squall",
            Condition::Mist => "Mist",
            Condition::Fog => "Fog",
            Condition::Haze => "Haze",
            Condition::Other(raw) => raw.as_str(),
        }
    }

    /// Categories that warrant a severe-weather alert.
    pub fn is_severe(&self) -> bool {
        matches!(
            self,
            Condition::Thunderstorm | Condition::Tornado | Condition::Squall
        )
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Condition {
    fn from(value: &str) -> Self {
        match value {
            "Clear" => Condition::Clear,
            "Clouds" => Condition::Clouds,
            "Rain" => Condition::Rain,
            "Drizzle" => Condition::Drizzle,
            "Snow" => Condition::Snow,
            "Thunderstorm" => Condition::Thunderstorm,
            "Tornado" => Condition::Tornado,
            "Squall" => Condition::Squall,
            "Mist" => Condition::Mist,
            "Fog" => Condition::Fog,
            "Haze" => Condition::Haze,
            other => Condition::Other(other.to_string()),
        }
    }
}

impl From<String> for Condition {
    fn from(value: String) -> Self {
        Condition::from(value.as_str())
    }
}

impl From<Condition> for String {
    fn from(value: Condition) -> Self {
        match value {
            Condition::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// Current conditions for one location, as returned by a single fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    pub location_name: String,
    pub country: String,
    pub units: Units,
    pub temperature: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity_pct: u8,
    pub wind_speed: f64,
    pub condition: Condition,
    pub description: String,
    pub icon: String,
    /// Epoch seconds.
    pub observed_at: i64,
    pub sunrise: i64,
    pub sunset: i64,
    /// Location's offset from UTC, in seconds.
    pub utc_offset_secs: i32,
}

impl WeatherSample {
    /// Copy of this sample with temperatures in Celsius and wind in m/s.
    pub fn to_metric(&self) -> WeatherSample {
        let u = self.units;
        WeatherSample {
            units: Units::Metric,
            temperature: u.to_celsius(self.temperature),
            feels_like: u.to_celsius(self.feels_like),
            temp_min: u.to_celsius(self.temp_min),
            temp_max: u.to_celsius(self.temp_max),
            wind_speed: u.to_mps(self.wind_speed),
            ..self.clone()
        }
    }

    pub fn display_location(&self) -> String {
        if self.country.is_empty() {
            self.location_name.clone()
        } else {
            format!("{}, {}", self.location_name, self.country)
        }
    }

    pub fn sunrise_local(&self) -> Option<DateTime<FixedOffset>> {
        local_time(self.sunrise, self.utc_offset_secs)
    }

    pub fn sunset_local(&self) -> Option<DateTime<FixedOffset>> {
        local_time(self.sunset, self.utc_offset_secs)
    }
}

/// One 3-hour forecast point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    /// Epoch seconds.
    pub dt: i64,
    pub temperature: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    /// Probability of precipitation in [0, 1].
    #[serde(default)]
    pub pop: f64,
    pub condition: Condition,
    pub description: String,
    pub icon: String,
}

/// Forecast samples for one location, ordered by ascending timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ForecastSet {
    /// City name without the country code.
    pub location_name: String,
    #[serde(default)]
    pub country: String,
    pub units: Units,
    pub utc_offset_secs: i32,
    pub samples: Vec<ForecastSample>,
}

impl ForecastSet {
    pub fn display_location(&self) -> String {
        if self.country.is_empty() {
            self.location_name.clone()
        } else {
            format!("{}, {}", self.location_name, self.country)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// First `n` samples in their existing order.
    pub fn leading(&self, n: usize) -> &[ForecastSample] {
        &self.samples[..n.min(self.samples.len())]
    }
}

/// Aggregated statistics for all forecast samples on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    /// e.g. `Mon, Jan 5`
    pub date: String,
    pub avg_temp: i64,
    pub min_temp: i64,
    pub max_temp: i64,
    /// Highest precipitation probability of the day, percent 0..=100.
    pub max_pop: u8,
    pub icon: String,
    pub description: String,
}

impl DailySummary {
    /// Weekday part of the label (`Mon`).
    pub fn weekday(&self) -> &str {
        self.date.split(',').next().unwrap_or(&self.date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OutfitSuggestion {
    pub outfit: String,
    /// Rule-evaluation order; may contain duplicates.
    pub accessories: Vec<String>,
    pub advice: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationId {
    RainAlert,
    TempShift,
    SevereWeather,
}

impl NotificationId {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationId::RainAlert => "rain-alert",
            NotificationId::TempShift => "temp-shift",
            NotificationId::SevereWeather => "severe-weather",
        }
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Danger,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Danger => "danger",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub id: NotificationId,
    pub severity: Severity,
    pub message: String,
    pub icon: String,
}

pub(crate) fn local_time(ts: i64, utc_offset_secs: i32) -> Option<DateTime<FixedOffset>> {
    let offset = FixedOffset::east_opt(utc_offset_secs)?;
    DateTime::<Utc>::from_timestamp(ts, 0).map(|dt| dt.with_timezone(&offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_round_trips_unknown_categories() {
        let c = Condition::from("Sand");
        assert_eq!(c, Condition::Other("Sand".into()));
        assert_eq!(String::from(c), "Sand");

        let parsed: Condition = serde_json::from_str("\"Thunderstorm\"").expect("valid json");
        assert_eq!(parsed, Condition::Thunderstorm);
        assert!(parsed.is_severe());
        assert!(!Condition::Rain.is_severe());
    }

    #[test]
    fn imperial_sample_converts_to_metric() {
        let sample = WeatherSample {
            location_name: "Boston".into(),
            country: "US".into(),
            units: Units::Imperial,
            temperature: 50.0,
            feels_like: 32.0,
            temp_min: 41.0,
            temp_max: 59.0,
            humidity_pct: 40,
            wind_speed: 10.0,
            condition: Condition::Clear,
            description: "clear sky".into(),
            icon: "01d".into(),
            observed_at: 0,
            sunrise: 0,
            sunset: 0,
            utc_offset_secs: -18000,
        };

        let metric = sample.to_metric();
        assert_eq!(metric.units, Units::Metric);
        assert!((metric.temperature - 10.0).abs() < 1e-9);
        assert!((metric.feels_like - 0.0).abs() < 1e-9);
        assert!((metric.temp_max - 15.0).abs() < 1e-9);
        assert!((metric.wind_speed - 4.4704).abs() < 1e-9);
        assert_eq!(metric.display_location(), "Boston, US");
    }

    #[test]
    fn units_parse_aliases() {
        assert_eq!(Units::try_from("Imperial").expect("valid"), Units::Imperial);
        assert_eq!(Units::try_from("c").expect("valid"), Units::Metric);
        assert!(Units::try_from("kelvin").is_err());
    }

    #[test]
    fn notification_ids_serialize_kebab_case() {
        let json = serde_json::to_string(&NotificationId::SevereWeather).expect("serialize");
        assert_eq!(json, "\"severe-weather\"");
        assert_eq!(NotificationId::RainAlert.as_str(), "rain-alert");
    }

    #[test]
    fn forecast_leading_clamps_to_len() {
        let set = ForecastSet::default();
        assert!(set.leading(3).is_empty());
    }
}
