//! Watering recommendation engine.
//!
//! A pure scoring function: given a plant's profile, the current weather
//! window (today plus forecast days, ascending dates) and the most recent
//! watering, decide whether to water, how much, and with what confidence.
//! Rules are evaluated in strict priority order and the first match wins:
//!
//! 1. Rain is forecast within the lookahead window and the plant can wait.
//! 2. It is already raining enough today and the plant can wait.
//! 3. The plant has gone far past its frequency: emergency watering.
//! 4. Otherwise a factor-scored decision.
//!
//! The engine never reads the clock; callers pass the evaluation instant so
//! results are reproducible.

use crate::error::{PlantOpsError, Result};
use crate::models::{
    PlantProfile, RainOutlook, Recommendation, Season, WateringEvent, WateringFactors,
    WeatherSample,
};
use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};

/// Days past the base frequency a plant may wait before watering is urgent.
pub const MAX_SKIP_DAYS: i64 = 3;

/// Forecast days scanned for incoming rain when the caller does not say.
pub const DEFAULT_LOOKAHEAD_DAYS: usize = 3;

pub fn recommend(
    plant: &PlantProfile,
    weather: &[WeatherSample],
    last_watering: Option<&WateringEvent>,
    lookahead_days: usize,
    now: DateTime<Utc>,
) -> Result<Recommendation> {
    if weather.is_empty() {
        return Err(PlantOpsError::InvalidData(format!(
            "no weather samples available to evaluate '{}'",
            plant.name
        )));
    }
    if plant.base_frequency_days == 0 {
        return Err(PlantOpsError::InvalidData(format!(
            "plant '{}' has a watering frequency of zero days",
            plant.name
        )));
    }

    let current = current_sample(weather);
    let base_frequency = i64::from(plant.base_frequency_days);
    let days_since = match last_watering {
        Some(event) => event.days_since(now),
        // Never watered: treat as already due.
        None => base_frequency + 1,
    };
    let is_overdue = days_since >= base_frequency;

    if let Some(rain) = predict_rain_incoming(weather, plant.rain_threshold_mm, lookahead_days) {
        if !is_overdue {
            return Ok(Recommendation {
                should_water: false,
                water_amount_ml: 0.0,
                confidence: 0.8,
                reason: format!(
                    "Rain expected in {} day(s): {:.1}mm",
                    rain.days_until_rain, rain.expected_mm
                ),
                next_watering_date: Some(rain.date),
            });
        }
    }

    if current.is_rainy_day(plant.rain_threshold_mm) && !is_overdue {
        return Ok(Recommendation {
            should_water: false,
            water_amount_ml: 0.0,
            confidence: 0.9,
            reason: format!("Rain today: {:.1}mm", current.precipitation_mm),
            next_watering_date: Some(next_watering_date(now, base_frequency)),
        });
    }

    let factors = calculate_factors(plant, current, days_since, last_watering.is_none(), now);

    if days_since > base_frequency + MAX_SKIP_DAYS {
        let emergency_amount = plant.base_water_amount_ml * factors.seasonal * 1.2;
        return Ok(Recommendation {
            should_water: true,
            water_amount_ml: emergency_amount.round(),
            confidence: 0.95,
            reason: format!("Urgent watering: {} days without water", days_since),
            next_watering_date: Some(next_watering_date(now, base_frequency)),
        });
    }

    let should_water = should_recommend_watering(days_since, base_frequency, &factors, current);
    let amount = adjusted_amount(plant.base_water_amount_ml, &factors);
    let confidence = calculate_confidence(current, plant, days_since, base_frequency);

    Ok(Recommendation {
        should_water,
        water_amount_ml: if should_water { amount.round() } else { 0.0 },
        confidence,
        reason: compose_reason(&factors, current, days_since, base_frequency),
        next_watering_date: should_water.then(|| next_watering_date(now, base_frequency)),
    })
}

/// The observed sample, or the first entry when the series is forecast-only.
fn current_sample(weather: &[WeatherSample]) -> &WeatherSample {
    weather
        .iter()
        .find(|w| !w.is_forecast)
        .unwrap_or(&weather[0])
}

/// Scan up to `lookahead_days` forecast entries, in order, for the first day
/// wet enough to cover a watering. Forecast entries must already be in
/// ascending date order starting tomorrow; the store guarantees this.
fn predict_rain_incoming(
    weather: &[WeatherSample],
    threshold_mm: f64,
    lookahead_days: usize,
) -> Option<RainOutlook> {
    weather
        .iter()
        .filter(|w| w.is_forecast)
        .take(lookahead_days)
        .enumerate()
        .find(|(_, day)| day.precipitation_mm >= threshold_mm)
        .map(|(i, day)| RainOutlook {
            days_until_rain: (i + 1) as u32,
            expected_mm: day.precipitation_mm,
            date: day.date,
        })
}

fn calculate_factors(
    plant: &PlantProfile,
    current: &WeatherSample,
    days_since: i64,
    never_watered: bool,
    now: DateTime<Utc>,
) -> WateringFactors {
    let season = Season::from_month(now.month());
    WateringFactors {
        seasonal: plant.seasonal_multiplier(season),
        weather: weather_factor(current, plant),
        history: history_factor(days_since, never_watered, plant),
        temperature: temperature_factor(current.temperature_avg_c, plant),
        humidity: humidity_factor(current.humidity_percent, plant),
        rain: rain_factor(current.precipitation_mm, plant),
    }
}

/// Compounding heat/dryness boosts, capped at 2.0.
fn weather_factor(weather: &WeatherSample, plant: &PlantProfile) -> f64 {
    let mut factor: f64 = 1.0;

    if weather.is_hot_day(25.0) {
        factor *= 1.3;
    }
    if weather.is_dry_day(40.0) {
        factor *= 1.2;
    }
    if weather.temperature_avg_c > plant.max_temperature_c {
        factor *= 1.4;
    }
    if weather.humidity_percent < plant.ideal_humidity_percent * 0.7 {
        factor *= 1.2;
    }

    factor.min(2.0)
}

fn history_factor(days_since: i64, never_watered: bool, plant: &PlantProfile) -> f64 {
    if never_watered {
        return 1.2;
    }

    let expected = f64::from(plant.base_frequency_days);
    let days = days_since as f64;

    if days > expected * 1.5 {
        1.4
    } else if days < expected * 0.7 {
        0.6
    } else {
        1.0
    }
}

/// First match wins: above max, below min, within 5°C of max, neutral.
fn temperature_factor(avg_temp_c: f64, plant: &PlantProfile) -> f64 {
    if avg_temp_c > plant.max_temperature_c {
        1.3
    } else if avg_temp_c < plant.min_temperature_c {
        0.7
    } else if avg_temp_c > plant.max_temperature_c - 5.0 {
        1.1
    } else {
        1.0
    }
}

/// First match wins: well below ideal, well above ideal, slightly below, neutral.
fn humidity_factor(humidity_percent: f64, plant: &PlantProfile) -> f64 {
    let ideal = plant.ideal_humidity_percent;

    if humidity_percent < ideal * 0.6 {
        1.3
    } else if humidity_percent > ideal * 1.4 {
        0.8
    } else if humidity_percent < ideal * 0.8 {
        1.1
    } else {
        1.0
    }
}

fn rain_factor(rain_mm: f64, plant: &PlantProfile) -> f64 {
    if rain_mm >= plant.rain_threshold_mm {
        0.3
    } else if rain_mm > plant.rain_threshold_mm * 0.5 {
        0.7
    } else {
        1.0
    }
}

/// The history factor is floored at 0.3 so a freshly watered plant still gets
/// a meaningful amount when the decision says to water.
fn adjusted_amount(base_amount_ml: f64, factors: &WateringFactors) -> f64 {
    base_amount_ml
        * factors.seasonal
        * factors.weather
        * factors.temperature
        * factors.humidity
        * factors.rain
        * factors.history.max(0.3)
}

fn should_recommend_watering(
    days_since: i64,
    base_frequency: i64,
    factors: &WateringFactors,
    current: &WeatherSample,
) -> bool {
    if days_since >= base_frequency {
        return true;
    }

    let urgency_score =
        (days_since as f64 / base_frequency as f64) * factors.weather * factors.temperature;

    if urgency_score > 0.8 && current.is_hot_day(28.0) {
        return true;
    }
    if urgency_score > 0.9 && current.is_dry_day(35.0) {
        return true;
    }

    false
}

fn calculate_confidence(
    current: &WeatherSample,
    plant: &PlantProfile,
    days_since: i64,
    base_frequency: i64,
) -> f64 {
    let mut confidence = 0.5;

    confidence += (days_since as f64 / base_frequency as f64).min(0.3);

    if current.is_hot_day(30.0) {
        confidence += 0.2;
    }
    if current.is_dry_day(30.0) {
        confidence += 0.15;
    }
    if current.precipitation_mm > plant.rain_threshold_mm {
        confidence += 0.25;
    }

    confidence.clamp(0.1, 1.0)
}

fn compose_reason(
    factors: &WateringFactors,
    current: &WeatherSample,
    days_since: i64,
    base_frequency: i64,
) -> String {
    let mut reasons: Vec<String> = Vec::new();

    if days_since >= base_frequency {
        reasons.push(format!("{} days since last watering", days_since));
    }
    if current.is_hot_day(28.0) {
        reasons.push(format!(
            "High temperature: {:.0}°C",
            current.temperature_max_c
        ));
    }
    if current.is_dry_day(35.0) {
        reasons.push(format!("Low humidity: {:.0}%", current.humidity_percent));
    }
    if factors.seasonal > 1.1 {
        reasons.push("Seasonal needs increased".to_string());
    }

    if reasons.is_empty() {
        "Standard conditions".to_string()
    } else {
        reasons.join(" • ")
    }
}

fn next_watering_date(now: DateTime<Utc>, frequency_days: i64) -> NaiveDate {
    now.date_naive() + Days::new(frequency_days as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PlantKind, WeatherCondition};
    use chrono::TimeZone;

    // April 10th: spring, so the default seasonal multiplier is 1.0.
    fn test_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 10, 8, 0, 0).unwrap()
    }

    fn plant() -> PlantProfile {
        PlantProfile::new("Monstera".to_string(), PlantKind::Tropical)
    }

    fn day(offset: u64, precipitation_mm: f64, is_forecast: bool) -> WeatherSample {
        WeatherSample {
            date: test_now().date_naive() + Days::new(offset),
            temperature_min_c: 14.0,
            temperature_max_c: 20.0,
            temperature_avg_c: 17.0,
            humidity_percent: 50.0,
            precipitation_mm,
            wind_speed_ms: None,
            uv_index: None,
            condition: WeatherCondition::Clear,
            is_forecast,
        }
    }

    fn mild_window() -> Vec<WeatherSample> {
        vec![
            day(0, 0.0, false),
            day(1, 0.0, true),
            day(2, 0.0, true),
            day(3, 0.0, true),
        ]
    }

    fn watered_days_ago(days: i64) -> WateringEvent {
        WateringEvent::new(1, test_now() - chrono::Duration::days(days), 250.0)
    }

    #[test]
    fn recommendation_is_deterministic() {
        let plant = plant();
        let weather = mild_window();
        let last = watered_days_ago(3);

        let first = recommend(&plant, &weather, Some(&last), 3, test_now()).unwrap();
        let second = recommend(&plant, &weather, Some(&last), 3, test_now()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn forecast_rain_suppresses_watering_when_plant_can_wait() {
        let plant = plant();
        // Extreme heat and dryness today, but rain tomorrow and not overdue.
        let mut weather = mild_window();
        weather[0].temperature_max_c = 40.0;
        weather[0].temperature_avg_c = 38.0;
        weather[0].humidity_percent = 10.0;
        weather[1].precipitation_mm = 6.0;
        let last = watered_days_ago(2);

        let rec = recommend(&plant, &weather, Some(&last), 3, test_now()).unwrap();
        assert!(!rec.should_water);
        assert_eq!(rec.water_amount_ml, 0.0);
        assert_eq!(rec.confidence, 0.8);
        assert_eq!(rec.next_watering_date, Some(weather[1].date));
    }

    #[test]
    fn forecast_rain_reports_one_based_day_offset() {
        let plant = plant();
        let mut weather = mild_window();
        weather[2].precipitation_mm = 8.0;
        let last = watered_days_ago(1);

        let rec = recommend(&plant, &weather, Some(&last), 3, test_now()).unwrap();
        assert!(!rec.should_water);
        assert!(rec.reason.contains("2 day(s)"), "reason: {}", rec.reason);
        assert!(rec.reason.contains("8.0mm"), "reason: {}", rec.reason);
        assert_eq!(rec.next_watering_date, Some(weather[2].date));
    }

    #[test]
    fn forecast_rain_beyond_lookahead_is_ignored() {
        let plant = plant();
        let mut weather = mild_window();
        weather.push(day(4, 12.0, true));
        let last = watered_days_ago(1);

        let rec = recommend(&plant, &weather, Some(&last), 3, test_now()).unwrap();
        // Rain on day 4 is outside the 3-day window; falls through to scoring.
        assert_ne!(rec.confidence, 0.8);
    }

    #[test]
    fn rain_today_suppresses_watering_when_plant_can_wait() {
        let plant = plant();
        let mut weather = mild_window();
        weather[0].precipitation_mm = 10.0;
        let last = watered_days_ago(1);

        let rec = recommend(&plant, &weather, Some(&last), 3, test_now()).unwrap();
        assert!(!rec.should_water);
        assert_eq!(rec.confidence, 0.9);
        assert!(rec.reason.contains("10.0mm"), "reason: {}", rec.reason);
        assert_eq!(
            rec.next_watering_date,
            Some(test_now().date_naive() + Days::new(7))
        );
    }

    #[test]
    fn emergency_watering_past_max_skip_days() {
        let plant = plant().with_frequency(5);
        let weather = mild_window();
        let last = watered_days_ago(9); // 9 > 5 + 3

        let rec = recommend(&plant, &weather, Some(&last), 3, test_now()).unwrap();
        assert!(rec.should_water);
        assert_eq!(rec.confidence, 0.95);
        // base 250 × spring 1.0 × 1.2 emergency boost
        assert_eq!(rec.water_amount_ml, 300.0);
        assert!(rec.reason.contains("9 days"), "reason: {}", rec.reason);
    }

    #[test]
    fn emergency_watering_wins_over_rain_today() {
        let plant = plant().with_frequency(5);
        let mut weather = mild_window();
        weather[0].precipitation_mm = 20.0;
        weather[1].precipitation_mm = 20.0;
        let last = watered_days_ago(9);

        // Overdue plants are watered even when rain is here or coming.
        let rec = recommend(&plant, &weather, Some(&last), 3, test_now()).unwrap();
        assert!(rec.should_water);
        assert_eq!(rec.confidence, 0.95);
    }

    #[test]
    fn never_watered_plant_is_due_with_history_boost() {
        let plant = plant();
        let weather = mild_window();

        let rec = recommend(&plant, &weather, None, 3, test_now()).unwrap();
        assert!(rec.should_water);
        // days_since is treated as 8; mild weather keeps every other factor
        // neutral, so amount = 250 × 1.2 history boost.
        assert_eq!(rec.water_amount_ml, 300.0);
        assert_eq!(rec.confidence, 0.8);
        assert_eq!(rec.reason, "8 days since last watering");
        assert_eq!(
            rec.next_watering_date,
            Some(test_now().date_naive() + Days::new(7))
        );
    }

    #[test]
    fn recently_watered_mild_weather_recommends_nothing() {
        let plant = plant();
        let weather = mild_window();
        let last = watered_days_ago(2);

        let rec = recommend(&plant, &weather, Some(&last), 3, test_now()).unwrap();
        assert!(!rec.should_water);
        assert_eq!(rec.water_amount_ml, 0.0);
        assert_eq!(rec.next_watering_date, None);
        assert_eq!(rec.reason, "Standard conditions");
    }

    #[test]
    fn heat_can_trigger_early_watering() {
        let plant = plant();
        let mut weather = mild_window();
        // Hot day close to the plant's max: weather 1.3, temperature 1.1.
        weather[0].temperature_max_c = 29.0;
        weather[0].temperature_avg_c = 28.0;
        weather[0].humidity_percent = 45.0;
        let last = watered_days_ago(6);

        // urgency = 6/7 × 1.3 × 1.1 ≈ 1.23 > 0.8 with max temp ≥ 28
        let rec = recommend(&plant, &weather, Some(&last), 3, test_now()).unwrap();
        assert!(rec.should_water);
        assert!(rec.water_amount_ml > 0.0);
    }

    #[test]
    fn amount_grows_with_base_amount() {
        let weather = mild_window();
        let small = plant().with_base_amount(200.0);
        let large = plant().with_base_amount(400.0);

        let rec_small = recommend(&small, &weather, None, 3, test_now()).unwrap();
        let rec_large = recommend(&large, &weather, None, 3, test_now()).unwrap();
        assert!(rec_small.should_water && rec_large.should_water);
        assert!(rec_small.water_amount_ml <= rec_large.water_amount_ml);
    }

    #[test]
    fn scored_confidence_stays_in_bounds() {
        let plant = plant();
        let extremes = [
            (45.0, 5.0, 0.0),  // very hot, very dry
            (20.0, 50.0, 0.0), // mild
            (10.0, 95.0, 6.0), // cold, humid, raining
        ];

        for (temp_max, humidity, rain) in extremes {
            let mut weather = mild_window();
            weather[0].temperature_max_c = temp_max;
            weather[0].temperature_avg_c = temp_max - 2.0;
            weather[0].humidity_percent = humidity;
            weather[0].precipitation_mm = rain;
            let last = watered_days_ago(7);

            let rec = recommend(&plant, &weather, Some(&last), 3, test_now()).unwrap();
            assert!(
                (0.1..=1.0).contains(&rec.confidence),
                "confidence {} out of bounds for ({}, {}, {})",
                rec.confidence,
                temp_max,
                humidity,
                rain
            );
        }
    }

    #[test]
    fn weather_factor_is_capped() {
        let plant = plant();
        let mut sample = day(0, 0.0, false);
        // Hot + dry + above plant max + far below ideal humidity: the raw
        // product would be 1.3 × 1.2 × 1.4 × 1.2 ≈ 2.62.
        sample.temperature_max_c = 38.0;
        sample.temperature_avg_c = 35.0;
        sample.humidity_percent = 20.0;

        assert_eq!(weather_factor(&sample, &plant), 2.0);
    }

    #[test]
    fn history_factor_bands() {
        let plant = plant(); // frequency 7
        assert_eq!(history_factor(0, true, &plant), 1.2);
        assert_eq!(history_factor(11, false, &plant), 1.4); // > 10.5
        assert_eq!(history_factor(4, false, &plant), 0.6); // < 4.9
        assert_eq!(history_factor(7, false, &plant), 1.0);
    }

    #[test]
    fn temperature_factor_priority_order() {
        let plant = plant(); // min 15, max 30
        assert_eq!(temperature_factor(31.0, &plant), 1.3);
        assert_eq!(temperature_factor(10.0, &plant), 0.7);
        assert_eq!(temperature_factor(27.0, &plant), 1.1);
        assert_eq!(temperature_factor(20.0, &plant), 1.0);
    }

    #[test]
    fn humidity_factor_priority_order() {
        let plant = plant(); // ideal 50
        assert_eq!(humidity_factor(25.0, &plant), 1.3); // < 30
        assert_eq!(humidity_factor(75.0, &plant), 0.8); // > 70
        assert_eq!(humidity_factor(35.0, &plant), 1.1); // < 40
        assert_eq!(humidity_factor(50.0, &plant), 1.0);
    }

    #[test]
    fn rain_factor_bands() {
        let plant = plant(); // threshold 5
        assert_eq!(rain_factor(5.0, &plant), 0.3);
        assert_eq!(rain_factor(3.0, &plant), 0.7);
        assert_eq!(rain_factor(2.5, &plant), 1.0);
        assert_eq!(rain_factor(0.0, &plant), 1.0);
    }

    #[test]
    fn history_factor_floor_in_amount() {
        let factors = WateringFactors {
            seasonal: 1.0,
            weather: 1.0,
            history: 0.1,
            temperature: 1.0,
            humidity: 1.0,
            rain: 1.0,
        };
        assert_eq!(adjusted_amount(250.0, &factors), 75.0);
    }

    #[test]
    fn winter_multiplier_shrinks_amount() {
        let plant = plant();
        let january = Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap();
        let weather: Vec<WeatherSample> = mild_window()
            .into_iter()
            .enumerate()
            .map(|(i, mut w)| {
                w.date = january.date_naive() + Days::new(i as u64);
                w
            })
            .collect();

        let rec = recommend(&plant, &weather, None, 3, january).unwrap();
        assert!(rec.should_water);
        // base 250 × winter 0.5 × history 1.2
        assert_eq!(rec.water_amount_ml, 150.0);
    }

    #[test]
    fn empty_weather_is_an_error() {
        let plant = plant();
        let result = recommend(&plant, &[], None, 3, test_now());
        assert!(matches!(result, Err(PlantOpsError::InvalidData(_))));
    }

    #[test]
    fn zero_frequency_is_an_error() {
        let plant = plant().with_frequency(0);
        let weather = mild_window();
        let result = recommend(&plant, &weather, None, 3, test_now());
        assert!(matches!(result, Err(PlantOpsError::InvalidData(_))));
    }

    #[test]
    fn forecast_only_series_uses_first_sample_as_current() {
        let plant = plant();
        let weather = vec![day(1, 0.0, true), day(2, 0.0, true)];

        let rec = recommend(&plant, &weather, None, 3, test_now());
        assert!(rec.is_ok());
    }

    #[test]
    fn rain_outlook_scans_in_order() {
        let mut weather = mild_window();
        weather[1].precipitation_mm = 2.0;
        weather[2].precipitation_mm = 7.0;
        weather[3].precipitation_mm = 9.0;

        let outlook = predict_rain_incoming(&weather, 5.0, 3).unwrap();
        assert_eq!(outlook.days_until_rain, 2);
        assert_eq!(outlook.expected_mm, 7.0);
        assert_eq!(outlook.date, weather[2].date);

        assert!(predict_rain_incoming(&weather, 10.0, 3).is_none());
    }
}
