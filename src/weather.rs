//! Current weather for the farm location and the unit preference.

use crate::api::{endpoints, ApiClient, ApiError};
use crate::storage::{PreferenceStorage, StorageError, WEATHER_UNITS_KEY};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub fn temperature_unit(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }

    pub fn wind_unit(&self) -> &'static str {
        match self {
            Units::Metric => "km/h",
            Units::Imperial => "mph",
        }
    }

    /// Convert a Celsius reading for display.
    pub fn temperature(&self, celsius: f64) -> f64 {
        match self {
            Units::Metric => celsius,
            Units::Imperial => celsius * 9.0 / 5.0 + 32.0,
        }
    }

    /// Convert a metres-per-second reading for display.
    pub fn wind_speed(&self, metres_per_second: f64) -> f64 {
        match self {
            Units::Metric => metres_per_second * 3.6,
            Units::Imperial => metres_per_second * 2.236_936,
        }
    }

    /// Saved preference, metric when unset or unrecognised.
    pub fn load(storage: &dyn PreferenceStorage) -> Units {
        match storage.get(WEATHER_UNITS_KEY) {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("Ignoring unknown weather units '{}'", raw);
                Units::default()
            }),
            None => Units::default(),
        }
    }

    pub fn save(&self, storage: &dyn PreferenceStorage) -> Result<(), StorageError> {
        storage.set(WEATHER_UNITS_KEY, self.as_str())
    }
}

impl FromStr for Units {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            other => Err(format!("unknown units '{}'", other)),
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Icon family for a condition description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionIcon {
    Sun,
    Rain,
    Cloud,
    Snow,
}

impl ConditionIcon {
    pub fn for_condition(condition: &str) -> Self {
        let lower = condition.to_lowercase();
        if lower.contains("sun") || lower.contains("clear") {
            ConditionIcon::Sun
        } else if lower.contains("rain") || lower.contains("drizzle") {
            ConditionIcon::Rain
        } else if lower.contains("cloud") {
            ConditionIcon::Cloud
        } else if lower.contains("snow") {
            ConditionIcon::Snow
        } else {
            ConditionIcon::Cloud
        }
    }
}

/// Current conditions; readings are Celsius and metres per second.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentWeather {
    pub location: Option<String>,
    pub temperature: Option<f64>,
    pub condition: Option<String>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub pressure: Option<f64>,
}

impl CurrentWeather {
    pub fn icon(&self) -> ConditionIcon {
        ConditionIcon::for_condition(self.condition.as_deref().unwrap_or_default())
    }
}

#[derive(Debug, Default, Deserialize)]
struct OpenWeatherResponse {
    name: Option<String>,
    main: Option<OpenWeatherMain>,
    #[serde(default)]
    weather: Vec<OpenWeatherCondition>,
    wind: Option<OpenWeatherWind>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenWeatherMain {
    temp: Option<f64>,
    humidity: Option<f64>,
    pressure: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherCondition {
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenWeatherWind {
    speed: Option<f64>,
}

impl From<OpenWeatherResponse> for CurrentWeather {
    fn from(data: OpenWeatherResponse) -> Self {
        let main = data.main.unwrap_or_default();
        Self {
            location: data.name,
            temperature: main.temp,
            condition: data.weather.into_iter().next().and_then(|w| w.description),
            humidity: main.humidity,
            wind_speed: data.wind.and_then(|w| w.speed),
            pressure: main.pressure,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherApi {
    client: ApiClient,
}

impl WeatherApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn current(&self, lat: f64, lon: f64) -> Result<CurrentWeather, ApiError> {
        let data: OpenWeatherResponse = self.client.get(&endpoints::weather(lat, lon)).await?;
        let weather = CurrentWeather::from(data);
        debug!("Weather for ({}, {}): {:?}", lat, lon, weather.condition);
        Ok(weather)
    }
}
