use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Weather condition categories from OpenWeatherMap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum WeatherCondition {
    #[default]
    Clear,
    Clouds,
    Rain,
    Drizzle,
    Thunderstorm,
    Snow,
    Mist,
    Fog,
    Other,
}

impl WeatherCondition {
    pub fn from_owm_id(id: u32) -> Self {
        match id {
            200..=232 => WeatherCondition::Thunderstorm,
            300..=321 => WeatherCondition::Drizzle,
            500..=531 => WeatherCondition::Rain,
            600..=622 => WeatherCondition::Snow,
            701 => WeatherCondition::Mist,
            741 => WeatherCondition::Fog,
            800 => WeatherCondition::Clear,
            801..=804 => WeatherCondition::Clouds,
            _ => WeatherCondition::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherCondition::Clear => "Clear",
            WeatherCondition::Clouds => "Cloudy",
            WeatherCondition::Rain => "Rain",
            WeatherCondition::Drizzle => "Drizzle",
            WeatherCondition::Thunderstorm => "Thunderstorm",
            WeatherCondition::Snow => "Snow",
            WeatherCondition::Mist => "Mist",
            WeatherCondition::Fog => "Fog",
            WeatherCondition::Other => "Other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "clear" => Some(WeatherCondition::Clear),
            "clouds" | "cloudy" => Some(WeatherCondition::Clouds),
            "rain" => Some(WeatherCondition::Rain),
            "drizzle" => Some(WeatherCondition::Drizzle),
            "thunderstorm" => Some(WeatherCondition::Thunderstorm),
            "snow" => Some(WeatherCondition::Snow),
            "mist" => Some(WeatherCondition::Mist),
            "fog" => Some(WeatherCondition::Fog),
            "other" => Some(WeatherCondition::Other),
            _ => None,
        }
    }

    /// Whether this condition involves precipitation
    pub fn has_precipitation(&self) -> bool {
        matches!(
            self,
            WeatherCondition::Rain
                | WeatherCondition::Drizzle
                | WeatherCondition::Thunderstorm
                | WeatherCondition::Snow
        )
    }
}

impl std::fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One day of weather, either observed (today) or forecast.
///
/// A weather series handed to the recommendation engine holds at most one
/// observed sample followed by forecast samples in ascending date order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    pub date: NaiveDate,
    pub temperature_min_c: f64,
    pub temperature_max_c: f64,
    pub temperature_avg_c: f64,
    pub humidity_percent: f64,
    pub precipitation_mm: f64,
    pub wind_speed_ms: Option<f64>,
    pub uv_index: Option<f64>,
    pub condition: WeatherCondition,
    pub is_forecast: bool,
}

impl WeatherSample {
    pub fn is_rainy_day(&self, threshold_mm: f64) -> bool {
        self.precipitation_mm >= threshold_mm
    }

    pub fn is_hot_day(&self, threshold_c: f64) -> bool {
        self.temperature_max_c >= threshold_c
    }

    pub fn is_dry_day(&self, humidity_threshold: f64) -> bool {
        self.humidity_percent <= humidity_threshold
    }
}
