use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current conditions for one city, as returned by the provider.
///
/// Only `name` matters to the store; everything else is carried for display
/// and decoded leniently so a sparse body never fails on a missing field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherPayload {
    /// Canonical display name chosen by the provider. Empty when absent.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub main: Option<MainReadings>,
    #[serde(default)]
    pub wind: Option<Wind>,
    /// Metres.
    #[serde(default)]
    pub visibility: Option<u32>,
    #[serde(default)]
    pub clouds: Option<Clouds>,
    #[serde(default)]
    pub weather: Vec<Condition>,
    #[serde(default)]
    pub sys: Option<SystemInfo>,
    /// Observation time, unix seconds.
    #[serde(default)]
    pub dt: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MainReadings {
    pub temp: Option<f64>,
    pub feels_like: Option<f64>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    /// hPa.
    pub pressure: Option<f64>,
    pub humidity: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    /// m/s with metric units.
    pub speed: Option<f64>,
    pub deg: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Clouds {
    pub all: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default)]
    pub main: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub country: Option<String>,
}

impl WeatherPayload {
    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// Primary condition, if the provider sent any.
    pub fn condition(&self) -> Option<&Condition> {
        self.weather.first()
    }

    pub fn country(&self) -> Option<&str> {
        self.sys.as_ref().and_then(|s| s.country.as_deref())
    }

    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        self.dt.and_then(|ts| DateTime::from_timestamp(ts, 0))
    }
}
