use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, instrument};

use crate::{
    error::WeatherError,
    model::{Condition, ForecastSample, ForecastSet, Units, WeatherSample},
};

use super::{LocationQuery, WeatherProvider};

const OPENWEATHER_API_BASE: &str = "https://api.openweathermap.org/data/2.5";

/// 5 days at 3-hour resolution.
const FORECAST_COUNT: &str = "40";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    http: Client,
    base_url: String,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, OPENWEATHER_API_BASE)
    }

    /// Point the provider at another server, e.g. a mock in tests.
    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        location: &LocationQuery,
        units: Units,
        extra: &[(&'static str, String)],
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{endpoint}", self.base_url);

        let mut query = location.query_params();
        query.push(("appid", self.api_key.clone()));
        query.push(("units", units.as_str().to_string()));
        query.extend_from_slice(extra);

        let res = self.http.get(&url).query(&query).send().await?;

        let status = res.status();
        let body = res.text().await?;
        debug!(%status, bytes = body.len(), endpoint, "OpenWeather response");

        match status {
            s if s.is_success() => serde_json::from_str(&body).map_err(|e| {
                WeatherError::MalformedResponse(format!("OpenWeather {endpoint} JSON: {e}"))
            }),
            StatusCode::UNAUTHORIZED => Err(WeatherError::InvalidApiKey),
            StatusCode::NOT_FOUND => Err(WeatherError::LocationNotFound(location.to_string())),
            s => Err(WeatherError::Api {
                status: s.as_u16(),
                body: truncate_body(&body),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize, Default)]
struct OwSys {
    #[serde(default)]
    country: String,
    #[serde(default)]
    sunrise: i64,
    #[serde(default)]
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    #[serde(default)]
    timezone: i32,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    #[serde(default)]
    sys: OwSys,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    timezone: i32,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
    temp_min: f64,
    temp_max: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwForecastMain,
    weather: Vec<OwWeather>,
    pop: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

fn primary_weather(weather: Vec<OwWeather>) -> Result<OwWeather, WeatherError> {
    weather.into_iter().next().ok_or_else(|| {
        WeatherError::MalformedResponse("OpenWeather entry contained no weather conditions".into())
    })
}

impl OwCurrentResponse {
    fn into_sample(self, units: Units) -> Result<WeatherSample, WeatherError> {
        let weather = primary_weather(self.weather)?;
        Ok(WeatherSample {
            location_name: self.name,
            country: self.sys.country,
            units,
            temperature: self.main.temp,
            feels_like: self.main.feels_like,
            temp_min: self.main.temp_min,
            temp_max: self.main.temp_max,
            humidity_pct: self.main.humidity,
            wind_speed: self.wind.speed,
            condition: Condition::from(weather.main),
            description: weather.description,
            icon: weather.icon,
            observed_at: self.dt,
            sunrise: self.sys.sunrise,
            sunset: self.sys.sunset,
            utc_offset_secs: self.timezone,
        })
    }
}

impl OwForecastResponse {
    fn into_set(self, units: Units) -> Result<ForecastSet, WeatherError> {
        let samples = self
            .list
            .into_iter()
            .map(|entry| {
                let weather = primary_weather(entry.weather)?;
                Ok(ForecastSample {
                    dt: entry.dt,
                    temperature: entry.main.temp,
                    temp_min: entry.main.temp_min,
                    temp_max: entry.main.temp_max,
                    pop: entry.pop.unwrap_or(0.0),
                    condition: Condition::from(weather.main),
                    description: weather.description,
                    icon: weather.icon,
                })
            })
            .collect::<Result<Vec<_>, WeatherError>>()?;

        Ok(ForecastSet {
            location_name: self.city.name,
            country: self.city.country,
            units,
            utc_offset_secs: self.city.timezone,
            samples,
        })
    }
}

/// Map a `/weather` payload onto a [`WeatherSample`].
pub fn parse_current(body: &str, units: Units) -> Result<WeatherSample, WeatherError> {
    let parsed: OwCurrentResponse = serde_json::from_str(body)
        .map_err(|e| WeatherError::MalformedResponse(format!("OpenWeather weather JSON: {e}")))?;
    parsed.into_sample(units)
}

/// Map a `/forecast` payload onto a [`ForecastSet`].
pub fn parse_forecast(body: &str, units: Units) -> Result<ForecastSet, WeatherError> {
    let parsed: OwForecastResponse = serde_json::from_str(body)
        .map_err(|e| WeatherError::MalformedResponse(format!("OpenWeather forecast JSON: {e}")))?;
    parsed.into_set(units)
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip(self), level = "debug")]
    async fn current(
        &self,
        location: &LocationQuery,
        units: Units,
    ) -> Result<WeatherSample, WeatherError> {
        let parsed: OwCurrentResponse = self.get_json("weather", location, units, &[]).await?;
        parsed.into_sample(units)
    }

    #[instrument(skip(self), level = "debug")]
    async fn forecast(
        &self,
        location: &LocationQuery,
        units: Units,
    ) -> Result<ForecastSet, WeatherError> {
        let parsed: OwForecastResponse = self
            .get_json("forecast", location, units, &[("cnt", FORECAST_COUNT.to_string())])
            .await?;
        parsed.into_set(units)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn current_body() -> serde_json::Value {
        json!({
            "coord": {"lon": -0.1257, "lat": 51.5085},
            "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
            "main": {
                "temp": 11.3, "feels_like": 10.6, "temp_min": 10.1, "temp_max": 12.4,
                "pressure": 1012, "humidity": 81
            },
            "wind": {"speed": 5.7, "deg": 240},
            "dt": 1_704_110_400,
            "sys": {"country": "GB", "sunrise": 1_704_096_300, "sunset": 1_704_124_800},
            "timezone": 0,
            "name": "London"
        })
    }

    fn forecast_body() -> serde_json::Value {
        json!({
            "cod": "200",
            "cnt": 2,
            "list": [
                {
                    "dt": 1_704_117_600,
                    "main": {"temp": 11.0, "temp_min": 10.2, "temp_max": 11.0, "humidity": 80},
                    "weather": [{"main": "Rain", "description": "light rain", "icon": "10d"}],
                    "pop": 0.62
                },
                {
                    "dt": 1_704_128_400,
                    "main": {"temp": 9.4, "temp_min": 9.4, "temp_max": 9.4, "humidity": 76},
                    "weather": [{"main": "Clouds", "description": "overcast clouds", "icon": "04n"}]
                }
            ],
            "city": {"name": "London", "country": "GB", "timezone": 0}
        })
    }

    #[tokio::test]
    async fn fetches_current_weather() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("q", "London"))
            .and(query_param("appid", "KEY"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
            .mount(&mock_server)
            .await;

        let provider = OpenWeatherProvider::with_base_url("KEY".into(), &mock_server.uri());
        let sample = provider
            .current(&LocationQuery::City("London".into()), Units::Metric)
            .await
            .expect("current weather");

        assert_eq!(sample.display_location(), "London, GB");
        assert_eq!(sample.condition, Condition::Rain);
        assert_eq!(sample.description, "light rain");
        assert_eq!(sample.humidity_pct, 81);
        assert_eq!(sample.sunset, 1_704_124_800);
        assert!((sample.temperature - 11.3).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn fetches_forecast_by_coordinates() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/forecast"))
            .and(query_param("lat", "51.5"))
            .and(query_param("lon", "-0.12"))
            .and(query_param("units", "imperial"))
            .and(query_param("cnt", "40"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
            .mount(&mock_server)
            .await;

        let provider = OpenWeatherProvider::with_base_url("KEY".into(), &mock_server.uri());
        let set = provider
            .forecast(&LocationQuery::Coords { lat: 51.5, lon: -0.12 }, Units::Imperial)
            .await
            .expect("forecast");

        assert_eq!(set.location_name, "London");
        assert_eq!(set.display_location(), "London, GB");
        assert_eq!(set.units, Units::Imperial);
        assert_eq!(set.samples.len(), 2);
        assert!((set.samples[0].pop - 0.62).abs() < f64::EPSILON);
        assert_eq!(set.samples[1].pop, 0.0);
        assert_eq!(set.samples[1].condition, Condition::Clouds);
    }

    #[tokio::test]
    async fn maps_http_errors() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("q", "Atlantis"))
            .respond_with(ResponseTemplate::new(404).set_body_string("city not found"))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("q", "London"))
            .and(query_param("appid", "BAD"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("q", "Paris"))
            .respond_with(ResponseTemplate::new(502).set_body_string("x".repeat(500)))
            .mount(&mock_server)
            .await;

        let good = OpenWeatherProvider::with_base_url("KEY".into(), &mock_server.uri());
        let bad = OpenWeatherProvider::with_base_url("BAD".into(), &mock_server.uri());

        let err = good
            .current(&LocationQuery::City("Atlantis".into()), Units::Metric)
            .await
            .unwrap_err();
        assert!(matches!(err, WeatherError::LocationNotFound(ref l) if l == "Atlantis"));

        let err = bad
            .forecast(&LocationQuery::City("London".into()), Units::Metric)
            .await
            .unwrap_err();
        assert!(matches!(err, WeatherError::InvalidApiKey));

        let err = good
            .current(&LocationQuery::City("Paris".into()), Units::Metric)
            .await
            .unwrap_err();
        match err {
            WeatherError::Api { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body.len(), 203);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_weather_array_is_malformed() {
        let mut body = current_body();
        body["weather"] = json!([]);

        let err = parse_current(&body.to_string(), Units::Metric).unwrap_err();
        assert!(matches!(err, WeatherError::MalformedResponse(_)));
    }

    #[test]
    fn missing_nested_field_is_malformed() {
        let mut body = forecast_body();
        body["list"][0]["main"] = json!({"temp": 3.0});

        let err = parse_forecast(&body.to_string(), Units::Metric).unwrap_err();
        assert!(err.to_string().contains("forecast JSON"));
    }

    #[test]
    fn unknown_condition_is_preserved() {
        let mut body = current_body();
        body["weather"][0]["main"] = json!("Ash");

        let sample = parse_current(&body.to_string(), Units::Metric).expect("parse");
        assert_eq!(sample.condition, Condition::Other("Ash".into()));
    }
}
