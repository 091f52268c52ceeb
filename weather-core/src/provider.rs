use crate::{
    Config, ForecastSet, Units, WeatherSample, error::WeatherError,
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::{self, Debug};

pub mod openweather;

/// Where to fetch weather for.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    City(String),
    Coords { lat: f64, lon: f64 },
}

impl LocationQuery {
    /// Parse user input: `"lat,lon"` becomes coordinates, anything else a
    /// sanitized city name.
    pub fn parse(input: &str) -> anyhow::Result<Self> {
        if let Some((lat, lon)) = input.split_once(',') {
            if let (Ok(lat), Ok(lon)) = (lat.trim().parse::<f64>(), lon.trim().parse::<f64>()) {
                if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                    anyhow::bail!("Coordinates out of range: {lat}, {lon}");
                }
                return Ok(LocationQuery::Coords { lat, lon });
            }
        }

        let city = sanitize_city(input);
        if city.is_empty() {
            anyhow::bail!("Location must not be empty.");
        }
        Ok(LocationQuery::City(city))
    }

    /// Query parameters identifying this location.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        match self {
            LocationQuery::City(name) => vec![("q", name.clone())],
            LocationQuery::Coords { lat, lon } => {
                vec![("lat", lat.to_string()), ("lon", lon.to_string())]
            }
        }
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationQuery::City(name) => f.write_str(name),
            LocationQuery::Coords { lat, lon } => write!(f, "{lat},{lon}"),
        }
    }
}

/// Strip punctuation the weather API chokes on and trim the result.
pub fn sanitize_city(input: &str) -> String {
    const STRIP: &str = ".,/#!$%^&*;:{}=-_`~()";
    input
        .chars()
        .filter(|c| !STRIP.contains(*c))
        .collect::<String>()
        .trim()
        .to_string()
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(
        &self,
        location: &LocationQuery,
        units: Units,
    ) -> Result<WeatherSample, WeatherError>;

    async fn forecast(
        &self,
        location: &LocationQuery,
        units: Units,
    ) -> Result<ForecastSet, WeatherError>;
}

/// Construct the provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No OpenWeather API key configured.\n\
                 Hint: run `weather configure` or set OPENWEATHER_API_KEY."
        )
    })?;

    Ok(Box::new(OpenWeatherProvider::new(api_key.to_owned())))
}
