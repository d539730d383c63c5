//! Schedule generation on top of the recommendation engine.
//!
//! The planner is plumbing: it loads plants, weather and history, calls the
//! engine, and persists the outcome. All watering decisions live in
//! [`crate::logic::engine`].

use crate::db::Database;
use crate::error::{PlantOpsError, Result};
use crate::logic::engine;
use crate::models::{WateringEvent, WateringSchedule};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{info, warn};

/// Minimum engine confidence for the daily batch to persist a schedule.
const BATCH_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// On-demand generation accepts lower confidence than the daily batch.
const ON_DEMAND_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Weather rows are loaded a little past the rain lookahead so the engine
/// sees the full forecast even when the lookahead is raised.
const WEATHER_WINDOW_DAYS: u64 = 7;

const WEATHER_RETENTION_DAYS: i64 = 30;
const SCHEDULE_RETENTION_DAYS: i64 = 90;

pub struct SchedulePlanner {
    db: Database,
    lookahead_days: usize,
}

impl SchedulePlanner {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            lookahead_days: engine::DEFAULT_LOOKAHEAD_DAYS,
        }
    }

    pub fn with_lookahead(mut self, days: usize) -> Self {
        self.lookahead_days = days;
        self
    }

    /// Evaluate every active plant and persist a pending schedule for each one
    /// the engine wants watered with enough confidence.
    ///
    /// A plant that already has a pending schedule for today is skipped. A
    /// plant that fails to evaluate is logged and skipped; the batch finishes
    /// for the remaining plants.
    pub fn generate_daily_schedules(&self, now: DateTime<Utc>) -> Result<Vec<WateringSchedule>> {
        let today = now.date_naive();
        let weather = self.db.weather_window(today, WEATHER_WINDOW_DAYS)?;
        let plants = self.db.list_plants(true)?;
        let mut created = Vec::new();

        for plant in &plants {
            let plant_id = match plant.id {
                Some(id) => id,
                None => continue,
            };

            if self.db.find_pending_for(plant_id, today)?.is_some() {
                info!(plant = %plant.name, "Pending schedule already exists, skipping");
                continue;
            }

            let last_watering = self.db.last_watering_for(plant_id)?;
            let recommendation = match engine::recommend(
                plant,
                &weather,
                last_watering.as_ref(),
                self.lookahead_days,
                now,
            ) {
                Ok(r) => r,
                Err(e) => {
                    warn!(plant = %plant.name, error = %e, "Failed to evaluate plant, continuing batch");
                    continue;
                }
            };

            if recommendation.should_water
                && recommendation.confidence >= BATCH_CONFIDENCE_THRESHOLD
            {
                let mut schedule =
                    WateringSchedule::new(plant_id, today, recommendation.water_amount_ml)
                        .with_reason(&recommendation.reason);
                schedule.id = Some(self.db.create_schedule(&schedule)?);
                info!(
                    plant = %plant.name,
                    amount_ml = recommendation.water_amount_ml,
                    reason = %recommendation.reason,
                    "Schedule created"
                );
                created.push(schedule);
            } else {
                info!(plant = %plant.name, reason = %recommendation.reason, "No watering needed");
            }
        }

        Ok(created)
    }

    /// Generate or refresh a schedule for a single plant.
    ///
    /// Returns `None` when the engine decides against watering or is not
    /// confident enough. An existing pending schedule for the target date is
    /// updated in place rather than duplicated.
    pub fn generate_for_plant(
        &self,
        plant_id: i64,
        target_date: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> Result<Option<WateringSchedule>> {
        let plant = self
            .db
            .get_plant(plant_id)?
            .ok_or_else(|| PlantOpsError::NotFound(format!("plant {}", plant_id)))?;
        if !plant.is_active {
            return Err(PlantOpsError::InvalidData(format!(
                "plant '{}' is paused",
                plant.name
            )));
        }

        let date = target_date.unwrap_or_else(|| now.date_naive());
        let weather = self.db.weather_window(now.date_naive(), WEATHER_WINDOW_DAYS)?;
        let last_watering = self.db.last_watering_for(plant_id)?;

        let recommendation = engine::recommend(
            &plant,
            &weather,
            last_watering.as_ref(),
            self.lookahead_days,
            now,
        )?;

        if !recommendation.should_water
            || recommendation.confidence < ON_DEMAND_CONFIDENCE_THRESHOLD
        {
            info!(plant = %plant.name, reason = %recommendation.reason, "No watering needed");
            return Ok(None);
        }

        if let Some(mut existing) = self.db.find_pending_for(plant_id, date)? {
            existing.water_amount_ml = recommendation.water_amount_ml;
            existing.reason = Some(recommendation.reason);
            self.db.update_schedule(&existing)?;
            return Ok(Some(existing));
        }

        let mut schedule = WateringSchedule::new(plant_id, date, recommendation.water_amount_ml)
            .with_reason(&recommendation.reason);
        schedule.id = Some(self.db.create_schedule(&schedule)?);
        Ok(Some(schedule))
    }

    /// Mark a schedule completed and record the watering in history.
    pub fn complete_schedule(
        &self,
        schedule_id: i64,
        actual_amount_ml: Option<f64>,
        notes: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<WateringSchedule> {
        let mut schedule = self
            .db
            .get_schedule(schedule_id)?
            .ok_or_else(|| PlantOpsError::NotFound(format!("schedule {}", schedule_id)))?;

        schedule.mark_completed(actual_amount_ml, notes, now);
        self.db.update_schedule(&schedule)?;

        let amount = schedule
            .actual_water_amount_ml
            .unwrap_or(schedule.water_amount_ml);
        let mut event = WateringEvent::new(schedule.plant_id, now, amount).with_schedule(schedule_id);
        if let Some(notes) = notes {
            event = event.with_notes(notes);
        }
        self.db.record_watering(&event)?;

        info!(schedule = schedule_id, amount_ml = amount, "Schedule completed");
        Ok(schedule)
    }

    pub fn skip_schedule(&self, schedule_id: i64, reason: Option<&str>) -> Result<WateringSchedule> {
        let mut schedule = self
            .db
            .get_schedule(schedule_id)?
            .ok_or_else(|| PlantOpsError::NotFound(format!("schedule {}", schedule_id)))?;

        schedule.mark_skipped(reason);
        self.db.update_schedule(&schedule)?;

        info!(schedule = schedule_id, "Schedule skipped");
        Ok(schedule)
    }

    /// Drop observed weather and resolved schedules past their retention
    /// windows. Returns (weather rows, schedule rows) removed.
    pub fn prune(&self, now: DateTime<Utc>) -> Result<(usize, usize)> {
        let weather_cutoff = now.date_naive() - Duration::days(WEATHER_RETENTION_DAYS);
        let schedule_cutoff = now.date_naive() - Duration::days(SCHEDULE_RETENTION_DAYS);

        let weather_removed = self.db.delete_observed_weather_before(weather_cutoff)?;
        let schedules_removed = self.db.delete_resolved_schedules_before(schedule_cutoff)?;

        info!(
            weather_rows = weather_removed,
            schedule_rows = schedules_removed,
            "Pruned stale data"
        );
        Ok((weather_removed, schedules_removed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PlantKind, PlantProfile, ScheduleStatus, WeatherCondition, WeatherSample};
    use chrono::{Days, TimeZone};

    fn test_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 10, 6, 0, 0).unwrap()
    }

    fn seed_plant(db: &Database, name: &str) -> i64 {
        db.create_plant(&PlantProfile::new(name.to_string(), PlantKind::Tropical))
            .unwrap()
    }

    fn seed_mild_weather(db: &Database) {
        let today = test_now().date_naive();
        for offset in 0..4u64 {
            db.upsert_weather_sample(&WeatherSample {
                date: today + Days::new(offset),
                temperature_min_c: 14.0,
                temperature_max_c: 20.0,
                temperature_avg_c: 17.0,
                humidity_percent: 50.0,
                precipitation_mm: 0.0,
                wind_speed_ms: None,
                uv_index: None,
                condition: WeatherCondition::Clear,
                is_forecast: offset > 0,
            })
            .unwrap();
        }
    }

    fn watered_days_ago(db: &Database, plant_id: i64, days: i64) {
        let watered_at = test_now() - Duration::days(days);
        db.record_watering(&WateringEvent::new(plant_id, watered_at, 250.0))
            .unwrap();
    }

    #[test]
    fn daily_batch_schedules_never_watered_plants() {
        let db = Database::open_in_memory().unwrap();
        let plant_id = seed_plant(&db, "Monstera");
        seed_mild_weather(&db);

        let planner = SchedulePlanner::new(db.clone());
        let created = planner.generate_daily_schedules(test_now()).unwrap();

        assert_eq!(created.len(), 1);
        assert_eq!(created[0].plant_id, plant_id);
        assert_eq!(created[0].scheduled_date, test_now().date_naive());
        assert_eq!(created[0].status, ScheduleStatus::Pending);
        assert_eq!(created[0].water_amount_ml, 300.0);
        assert!(created[0].reason.is_some());
    }

    #[test]
    fn daily_batch_skips_recently_watered_plants() {
        let db = Database::open_in_memory().unwrap();
        let plant_id = seed_plant(&db, "Monstera");
        seed_mild_weather(&db);
        watered_days_ago(&db, plant_id, 2);

        let planner = SchedulePlanner::new(db.clone());
        let created = planner.generate_daily_schedules(test_now()).unwrap();
        assert!(created.is_empty());
    }

    #[test]
    fn daily_batch_does_not_duplicate_pending_schedules() {
        let db = Database::open_in_memory().unwrap();
        seed_plant(&db, "Monstera");
        seed_mild_weather(&db);

        let planner = SchedulePlanner::new(db.clone());
        let first = planner.generate_daily_schedules(test_now()).unwrap();
        let second = planner.generate_daily_schedules(test_now()).unwrap();

        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
        assert_eq!(db.pending_schedules().unwrap().len(), 1);
    }

    #[test]
    fn daily_batch_continues_past_broken_plants() {
        let db = Database::open_in_memory().unwrap();
        let mut broken = PlantProfile::new("Broken".to_string(), PlantKind::Desert);
        broken.base_frequency_days = 0;
        db.create_plant(&broken).unwrap();
        seed_plant(&db, "Monstera");
        seed_mild_weather(&db);

        let planner = SchedulePlanner::new(db.clone());
        let created = planner.generate_daily_schedules(test_now()).unwrap();

        // The zero-frequency plant fails evaluation; the other still gets a schedule.
        assert_eq!(created.len(), 1);
    }

    #[test]
    fn daily_batch_skips_paused_plants() {
        let db = Database::open_in_memory().unwrap();
        let plant_id = seed_plant(&db, "Monstera");
        db.set_plant_active(plant_id, false).unwrap();
        seed_mild_weather(&db);

        let planner = SchedulePlanner::new(db.clone());
        let created = planner.generate_daily_schedules(test_now()).unwrap();
        assert!(created.is_empty());
    }

    #[test]
    fn on_demand_updates_existing_pending_schedule() {
        let db = Database::open_in_memory().unwrap();
        let plant_id = seed_plant(&db, "Monstera");
        seed_mild_weather(&db);

        let planner = SchedulePlanner::new(db.clone());
        let first = planner.generate_daily_schedules(test_now()).unwrap();
        let first_id = first[0].id;

        let updated = planner
            .generate_for_plant(plant_id, None, test_now())
            .unwrap()
            .unwrap();

        assert_eq!(updated.id, first_id);
        assert_eq!(db.pending_schedules().unwrap().len(), 1);
    }

    #[test]
    fn on_demand_rejects_unknown_and_paused_plants() {
        let db = Database::open_in_memory().unwrap();
        let plant_id = seed_plant(&db, "Monstera");
        seed_mild_weather(&db);

        let planner = SchedulePlanner::new(db.clone());
        assert!(matches!(
            planner.generate_for_plant(999, None, test_now()),
            Err(PlantOpsError::NotFound(_))
        ));

        db.set_plant_active(plant_id, false).unwrap();
        assert!(matches!(
            planner.generate_for_plant(plant_id, None, test_now()),
            Err(PlantOpsError::InvalidData(_))
        ));
    }

    #[test]
    fn on_demand_returns_none_when_no_watering_needed() {
        let db = Database::open_in_memory().unwrap();
        let plant_id = seed_plant(&db, "Monstera");
        seed_mild_weather(&db);
        watered_days_ago(&db, plant_id, 1);

        let planner = SchedulePlanner::new(db.clone());
        let result = planner.generate_for_plant(plant_id, None, test_now()).unwrap();
        assert!(result.is_none());
        assert!(db.pending_schedules().unwrap().is_empty());
    }

    #[test]
    fn completing_a_schedule_records_history() {
        let db = Database::open_in_memory().unwrap();
        let plant_id = seed_plant(&db, "Monstera");
        seed_mild_weather(&db);

        let planner = SchedulePlanner::new(db.clone());
        let created = planner.generate_daily_schedules(test_now()).unwrap();
        let schedule_id = created[0].id.unwrap();

        let done = planner
            .complete_schedule(schedule_id, Some(280.0), Some("used rainwater"), test_now())
            .unwrap();
        assert_eq!(done.status, ScheduleStatus::Completed);
        assert_eq!(done.actual_water_amount_ml, Some(280.0));

        let last = db.last_watering_for(plant_id).unwrap().unwrap();
        assert_eq!(last.water_amount_ml, 280.0);
        assert!(last.was_scheduled);
        assert_eq!(last.schedule_id, Some(schedule_id));

        // The plant is no longer due tomorrow's batch
        assert!(db.find_pending_for(plant_id, test_now().date_naive()).unwrap().is_none());
    }

    #[test]
    fn skipping_a_schedule_keeps_history_empty() {
        let db = Database::open_in_memory().unwrap();
        let plant_id = seed_plant(&db, "Monstera");
        seed_mild_weather(&db);

        let planner = SchedulePlanner::new(db.clone());
        let created = planner.generate_daily_schedules(test_now()).unwrap();
        let schedule_id = created[0].id.unwrap();

        let skipped = planner
            .skip_schedule(schedule_id, Some("watered by hand earlier"))
            .unwrap();
        assert_eq!(skipped.status, ScheduleStatus::Skipped);
        assert_eq!(skipped.reason, Some("watered by hand earlier".to_string()));
        assert!(db.last_watering_for(plant_id).unwrap().is_none());
    }

    #[test]
    fn rainy_forecast_prevents_scheduling() {
        let db = Database::open_in_memory().unwrap();
        let plant_id = seed_plant(&db, "Monstera");
        seed_mild_weather(&db);
        watered_days_ago(&db, plant_id, 5);

        // Heavy rain tomorrow
        let tomorrow = test_now().date_naive() + Days::new(1);
        db.upsert_weather_sample(&WeatherSample {
            date: tomorrow,
            temperature_min_c: 14.0,
            temperature_max_c: 20.0,
            temperature_avg_c: 17.0,
            humidity_percent: 80.0,
            precipitation_mm: 12.0,
            wind_speed_ms: None,
            uv_index: None,
            condition: WeatherCondition::Rain,
            is_forecast: true,
        })
        .unwrap();

        let planner = SchedulePlanner::new(db.clone());
        let created = planner.generate_daily_schedules(test_now()).unwrap();
        assert!(created.is_empty());
    }

    #[test]
    fn prune_removes_stale_rows() {
        let db = Database::open_in_memory().unwrap();
        let plant_id = seed_plant(&db, "Monstera");

        // Ancient observed weather
        db.upsert_weather_sample(&WeatherSample {
            date: test_now().date_naive() - Duration::days(60),
            temperature_min_c: 10.0,
            temperature_max_c: 15.0,
            temperature_avg_c: 12.0,
            humidity_percent: 60.0,
            precipitation_mm: 0.0,
            wind_speed_ms: None,
            uv_index: None,
            condition: WeatherCondition::Clear,
            is_forecast: false,
        })
        .unwrap();

        // Ancient completed schedule
        let old_date = test_now().date_naive() - Duration::days(120);
        let mut schedule = WateringSchedule::new(plant_id, old_date, 250.0);
        schedule.id = Some(db.create_schedule(&schedule).unwrap());
        schedule.mark_completed(None, None, test_now());
        db.update_schedule(&schedule).unwrap();

        let planner = SchedulePlanner::new(db.clone());
        let (weather_removed, schedules_removed) = planner.prune(test_now()).unwrap();
        assert_eq!(weather_removed, 1);
        assert_eq!(schedules_removed, 1);
    }
}
