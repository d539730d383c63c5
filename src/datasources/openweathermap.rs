use crate::config::OpenWeatherMapConfig;
use crate::error::{PlantOpsError, Result};
use crate::models::{WeatherCondition, WeatherSample};
use chrono::{DateTime, Utc};
use serde::Deserialize;

const API_BASE_URL: &str = "https://api.openweathermap.org/data/3.0/onecall";

/// How many forecast days to keep from the One Call response (which returns 8
/// daily entries including today).
const FORECAST_DAYS: usize = 7;

pub struct OpenWeatherMapClient {
    client: reqwest::Client,
    config: OpenWeatherMapConfig,
}

// OpenWeatherMap One Call API response structures
#[derive(Debug, Deserialize)]
struct OwmOneCallResponse {
    current: OwmCurrent,
    daily: Vec<OwmDaily>,
}

#[derive(Debug, Deserialize)]
struct OwmCurrent {
    temp: f64,
    humidity: f64,
    #[serde(default)]
    uvi: f64,
    wind_speed: f64,
    weather: Vec<OwmWeather>,
}

#[derive(Debug, Deserialize)]
struct OwmDaily {
    dt: i64,
    temp: OwmDailyTemp,
    humidity: f64,
    #[serde(default)]
    rain: Option<f64>,
    #[serde(default)]
    snow: Option<f64>,
    #[serde(default)]
    uvi: f64,
    wind_speed: f64,
    weather: Vec<OwmWeather>,
}

#[derive(Debug, Deserialize)]
struct OwmDailyTemp {
    min: f64,
    max: f64,
    day: f64,
}

#[derive(Debug, Deserialize)]
struct OwmWeather {
    id: u32,
    #[allow(dead_code)]
    main: String,
    #[allow(dead_code)]
    description: String,
}

impl OpenWeatherMapClient {
    pub fn new(config: OpenWeatherMapConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Fetch today's conditions plus the daily forecast from OpenWeatherMap.
    ///
    /// Returns one observed sample for today followed by forecast samples in
    /// ascending date order.
    pub async fn fetch_daily(&self) -> Result<Vec<WeatherSample>> {
        let url = format!(
            "{}?lat={}&lon={}&appid={}&units=metric&exclude=minutely,hourly,alerts",
            API_BASE_URL, self.config.latitude, self.config.longitude, self.config.api_key
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PlantOpsError::DataSourceUnavailable(format!("OpenWeatherMap: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PlantOpsError::DataSourceUnavailable(format!(
                "OpenWeatherMap returned {}: {}",
                status, body
            )));
        }

        let owm_response: OwmOneCallResponse = response.json().await.map_err(|e| {
            PlantOpsError::DataSourceUnavailable(format!(
                "Failed to parse OpenWeatherMap response: {}",
                e
            ))
        })?;

        self.convert_response(owm_response)
    }

    /// Test connection to OpenWeatherMap API
    pub async fn test_connection(&self) -> Result<bool> {
        let url = format!(
            "{}?lat={}&lon={}&appid={}&units=metric&exclude=minutely,hourly,daily,alerts",
            API_BASE_URL, self.config.latitude, self.config.longitude, self.config.api_key
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PlantOpsError::DataSourceUnavailable(format!("OpenWeatherMap: {}", e)))?;

        Ok(response.status().is_success())
    }

    fn convert_response(&self, response: OwmOneCallResponse) -> Result<Vec<WeatherSample>> {
        let today = response.daily.first().ok_or_else(|| {
            PlantOpsError::DataSourceUnavailable(
                "OpenWeatherMap response contained no daily entries".into(),
            )
        })?;

        let mut samples = Vec::with_capacity(1 + FORECAST_DAYS);

        // Today: daily min/max with the live observed average and humidity.
        let current_condition = response
            .current
            .weather
            .first()
            .map(|w| WeatherCondition::from_owm_id(w.id))
            .unwrap_or_default();
        samples.push(WeatherSample {
            date: timestamp_date(today.dt),
            temperature_min_c: today.temp.min,
            temperature_max_c: today.temp.max,
            temperature_avg_c: response.current.temp,
            humidity_percent: response.current.humidity,
            precipitation_mm: daily_precipitation(today),
            wind_speed_ms: Some(response.current.wind_speed),
            uv_index: Some(response.current.uvi),
            condition: current_condition,
            is_forecast: false,
        });

        for day in response.daily.iter().skip(1).take(FORECAST_DAYS) {
            let condition = day
                .weather
                .first()
                .map(|w| WeatherCondition::from_owm_id(w.id))
                .unwrap_or_default();
            samples.push(WeatherSample {
                date: timestamp_date(day.dt),
                temperature_min_c: day.temp.min,
                temperature_max_c: day.temp.max,
                temperature_avg_c: day.temp.day,
                humidity_percent: day.humidity,
                precipitation_mm: daily_precipitation(day),
                wind_speed_ms: Some(day.wind_speed),
                uv_index: Some(day.uvi),
                condition,
                is_forecast: true,
            });
        }

        Ok(samples)
    }
}

// Combine rain and snow precipitation
fn daily_precipitation(day: &OwmDaily) -> f64 {
    day.rain.unwrap_or(0.0) + day.snow.unwrap_or(0.0)
}

fn timestamp_date(unix_seconds: i64) -> chrono::NaiveDate {
    DateTime::from_timestamp(unix_seconds, 0)
        .unwrap_or_else(Utc::now)
        .date_naive()
}
