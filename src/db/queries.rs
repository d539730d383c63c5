use crate::db::Database;
use crate::error::{PlantOpsError, Result};
use crate::models::{
    PlantKind, PlantProfile, ScheduleStatus, WateringEvent, WateringSchedule, WeatherCondition,
    WeatherSample,
};
use chrono::{DateTime, Days, NaiveDate, Utc};
use rusqlite::{params, Row};
use tracing::warn;

// Plant Queries

impl Database {
    pub fn create_plant(&self, plant: &PlantProfile) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO plants
                    (name, kind, scientific_name, base_water_amount_ml, base_frequency_days,
                     spring_multiplier, summer_multiplier, autumn_multiplier, winter_multiplier,
                     min_temperature_c, max_temperature_c, ideal_humidity_percent,
                     rain_threshold_mm, is_active, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
                "#,
                params![
                    plant.name,
                    format!("{:?}", plant.kind),
                    plant.scientific_name,
                    plant.base_water_amount_ml,
                    plant.base_frequency_days,
                    plant.spring_multiplier,
                    plant.summer_multiplier,
                    plant.autumn_multiplier,
                    plant.winter_multiplier,
                    plant.min_temperature_c,
                    plant.max_temperature_c,
                    plant.ideal_humidity_percent,
                    plant.rain_threshold_mm,
                    plant.is_active,
                    plant.created_at.to_rfc3339(),
                    plant.updated_at.to_rfc3339(),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_plant(&self, id: i64) -> Result<Option<PlantProfile>> {
        self.with_conn(|conn| {
            conn.query_row("SELECT * FROM plants WHERE id = ?1", [id], row_to_plant)
                .optional()
                .map_err(Into::into)
        })
    }

    pub fn get_plant_by_name(&self, name: &str) -> Result<Option<PlantProfile>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT * FROM plants WHERE name = ?1 COLLATE NOCASE ORDER BY id LIMIT 1",
                [name],
                row_to_plant,
            )
            .optional()
            .map_err(Into::into)
        })
    }

    pub fn list_plants(&self, active_only: bool) -> Result<Vec<PlantProfile>> {
        self.with_conn(|conn| {
            let sql = if active_only {
                "SELECT * FROM plants WHERE is_active = 1 ORDER BY name"
            } else {
                "SELECT * FROM plants ORDER BY name"
            };
            let mut stmt = conn.prepare(sql)?;
            let plants = stmt
                .query_map([], row_to_plant)?
                .filter_map(|r| r.ok())
                .collect();
            Ok(plants)
        })
    }

    pub fn update_plant(&self, plant: &PlantProfile) -> Result<()> {
        let id = plant
            .id
            .ok_or_else(|| PlantOpsError::InvalidData("Plant has no ID".into()))?;

        self.with_conn(|conn| {
            conn.execute(
                r#"
                UPDATE plants SET
                    name = ?1, kind = ?2, scientific_name = ?3, base_water_amount_ml = ?4,
                    base_frequency_days = ?5, spring_multiplier = ?6, summer_multiplier = ?7,
                    autumn_multiplier = ?8, winter_multiplier = ?9, min_temperature_c = ?10,
                    max_temperature_c = ?11, ideal_humidity_percent = ?12,
                    rain_threshold_mm = ?13, is_active = ?14, updated_at = ?15
                WHERE id = ?16
                "#,
                params![
                    plant.name,
                    format!("{:?}", plant.kind),
                    plant.scientific_name,
                    plant.base_water_amount_ml,
                    plant.base_frequency_days,
                    plant.spring_multiplier,
                    plant.summer_multiplier,
                    plant.autumn_multiplier,
                    plant.winter_multiplier,
                    plant.min_temperature_c,
                    plant.max_temperature_c,
                    plant.ideal_humidity_percent,
                    plant.rain_threshold_mm,
                    plant.is_active,
                    Utc::now().to_rfc3339(),
                    id,
                ],
            )?;
            Ok(())
        })
    }

    pub fn set_plant_active(&self, id: i64, active: bool) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE plants SET is_active = ?1, updated_at = ?2 WHERE id = ?3",
                params![active, Utc::now().to_rfc3339(), id],
            )?;
            Ok(())
        })
    }

    pub fn delete_plant(&self, id: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM plants WHERE id = ?1", [id])?;
            Ok(())
        })
    }
}

fn row_to_plant(row: &Row) -> rusqlite::Result<PlantProfile> {
    let kind_str: String = row.get("kind")?;
    let created_at_str: String = row.get("created_at")?;
    let updated_at_str: String = row.get("updated_at")?;

    let kind = PlantKind::from_str(&kind_str).unwrap_or_else(|| {
        warn!(kind = %kind_str, "Unknown plant kind in database, defaulting to Temperate");
        PlantKind::Temperate
    });

    Ok(PlantProfile {
        id: Some(row.get("id")?),
        name: row.get("name")?,
        kind,
        scientific_name: row.get("scientific_name")?,
        base_water_amount_ml: row.get("base_water_amount_ml")?,
        base_frequency_days: row.get("base_frequency_days")?,
        spring_multiplier: row.get("spring_multiplier")?,
        summer_multiplier: row.get("summer_multiplier")?,
        autumn_multiplier: row.get("autumn_multiplier")?,
        winter_multiplier: row.get("winter_multiplier")?,
        min_temperature_c: row.get("min_temperature_c")?,
        max_temperature_c: row.get("max_temperature_c")?,
        ideal_humidity_percent: row.get("ideal_humidity_percent")?,
        rain_threshold_mm: row.get("rain_threshold_mm")?,
        is_active: row.get("is_active")?,
        created_at: parse_timestamp(&created_at_str),
        updated_at: parse_timestamp(&updated_at_str),
    })
}

// Watering History Queries

impl Database {
    pub fn record_watering(&self, event: &WateringEvent) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO watering_history
                    (plant_id, watered_at, water_amount_ml, was_scheduled, schedule_id, notes, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    event.plant_id,
                    event.watered_at.to_rfc3339(),
                    event.water_amount_ml,
                    event.was_scheduled,
                    event.schedule_id,
                    event.notes,
                    event.created_at.to_rfc3339(),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn last_watering_for(&self, plant_id: i64) -> Result<Option<WateringEvent>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT * FROM watering_history WHERE plant_id = ?1 ORDER BY watered_at DESC LIMIT 1",
                [plant_id],
                row_to_watering_event,
            )
            .optional()
            .map_err(Into::into)
        })
    }

    pub fn recent_waterings(&self, plant_id: i64, limit: usize) -> Result<Vec<WateringEvent>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM watering_history WHERE plant_id = ?1 ORDER BY watered_at DESC LIMIT ?2",
            )?;
            let events = stmt
                .query_map(params![plant_id, limit as i64], row_to_watering_event)?
                .filter_map(|r| r.ok())
                .collect();
            Ok(events)
        })
    }
}

fn row_to_watering_event(row: &Row) -> rusqlite::Result<WateringEvent> {
    let watered_at_str: String = row.get("watered_at")?;
    let created_at_str: String = row.get("created_at")?;

    Ok(WateringEvent {
        id: Some(row.get("id")?),
        plant_id: row.get("plant_id")?,
        watered_at: parse_timestamp(&watered_at_str),
        water_amount_ml: row.get("water_amount_ml")?,
        was_scheduled: row.get("was_scheduled")?,
        schedule_id: row.get("schedule_id")?,
        notes: row.get("notes")?,
        created_at: parse_timestamp(&created_at_str),
    })
}

// Schedule Queries

impl Database {
    pub fn create_schedule(&self, schedule: &WateringSchedule) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO watering_schedules
                    (plant_id, scheduled_date, water_amount_ml, status, reason,
                     actual_water_amount_ml, completed_at, notes, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
                params![
                    schedule.plant_id,
                    schedule.scheduled_date.to_string(),
                    schedule.water_amount_ml,
                    format!("{:?}", schedule.status),
                    schedule.reason,
                    schedule.actual_water_amount_ml,
                    schedule.completed_at.map(|t| t.to_rfc3339()),
                    schedule.notes,
                    schedule.created_at.to_rfc3339(),
                    schedule.updated_at.to_rfc3339(),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn update_schedule(&self, schedule: &WateringSchedule) -> Result<()> {
        let id = schedule
            .id
            .ok_or_else(|| PlantOpsError::InvalidData("Schedule has no ID".into()))?;

        self.with_conn(|conn| {
            conn.execute(
                r#"
                UPDATE watering_schedules SET
                    water_amount_ml = ?1, status = ?2, reason = ?3,
                    actual_water_amount_ml = ?4, completed_at = ?5, notes = ?6, updated_at = ?7
                WHERE id = ?8
                "#,
                params![
                    schedule.water_amount_ml,
                    format!("{:?}", schedule.status),
                    schedule.reason,
                    schedule.actual_water_amount_ml,
                    schedule.completed_at.map(|t| t.to_rfc3339()),
                    schedule.notes,
                    Utc::now().to_rfc3339(),
                    id,
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_schedule(&self, id: i64) -> Result<Option<WateringSchedule>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT * FROM watering_schedules WHERE id = ?1",
                [id],
                row_to_schedule,
            )
            .optional()
            .map_err(Into::into)
        })
    }

    pub fn find_pending_for(&self, plant_id: i64, date: NaiveDate) -> Result<Option<WateringSchedule>> {
        self.with_conn(|conn| {
            conn.query_row(
                r#"
                SELECT * FROM watering_schedules
                WHERE plant_id = ?1 AND scheduled_date = ?2 AND status = 'Pending'
                "#,
                params![plant_id, date.to_string()],
                row_to_schedule,
            )
            .optional()
            .map_err(Into::into)
        })
    }

    pub fn schedules_for_date(&self, date: NaiveDate) -> Result<Vec<WateringSchedule>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM watering_schedules WHERE scheduled_date = ?1 ORDER BY created_at",
            )?;
            let schedules = stmt
                .query_map([date.to_string()], row_to_schedule)?
                .filter_map(|r| r.ok())
                .collect();
            Ok(schedules)
        })
    }

    pub fn pending_schedules(&self) -> Result<Vec<WateringSchedule>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM watering_schedules WHERE status = 'Pending' ORDER BY scheduled_date",
            )?;
            let schedules = stmt
                .query_map([], row_to_schedule)?
                .filter_map(|r| r.ok())
                .collect();
            Ok(schedules)
        })
    }

    pub fn overdue_schedules(&self, today: NaiveDate) -> Result<Vec<WateringSchedule>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT * FROM watering_schedules
                WHERE status = 'Pending' AND scheduled_date < ?1
                ORDER BY scheduled_date
                "#,
            )?;
            let schedules = stmt
                .query_map([today.to_string()], row_to_schedule)?
                .filter_map(|r| r.ok())
                .collect();
            Ok(schedules)
        })
    }

    pub fn delete_resolved_schedules_before(&self, cutoff: NaiveDate) -> Result<usize> {
        self.with_conn(|conn| {
            let affected = conn.execute(
                "DELETE FROM watering_schedules WHERE scheduled_date < ?1 AND status != 'Pending'",
                [cutoff.to_string()],
            )?;
            Ok(affected)
        })
    }
}

fn row_to_schedule(row: &Row) -> rusqlite::Result<WateringSchedule> {
    let date_str: String = row.get("scheduled_date")?;
    let status_str: String = row.get("status")?;
    let completed_at_str: Option<String> = row.get("completed_at")?;
    let created_at_str: String = row.get("created_at")?;
    let updated_at_str: String = row.get("updated_at")?;

    let status = ScheduleStatus::from_str(&status_str).unwrap_or_else(|| {
        warn!(status = %status_str, "Unknown schedule status in database, defaulting to Pending");
        ScheduleStatus::Pending
    });

    Ok(WateringSchedule {
        id: Some(row.get("id")?),
        plant_id: row.get("plant_id")?,
        scheduled_date: parse_date(&date_str),
        water_amount_ml: row.get("water_amount_ml")?,
        status,
        reason: row.get("reason")?,
        actual_water_amount_ml: row.get("actual_water_amount_ml")?,
        completed_at: completed_at_str.as_deref().map(parse_timestamp),
        notes: row.get("notes")?,
        created_at: parse_timestamp(&created_at_str),
        updated_at: parse_timestamp(&updated_at_str),
    })
}

// Weather Cache Queries

impl Database {
    pub fn upsert_weather_sample(&self, sample: &WeatherSample) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT OR REPLACE INTO weather_cache
                    (date, temperature_min_c, temperature_max_c, temperature_avg_c,
                     humidity_percent, precipitation_mm, wind_speed_ms, uv_index,
                     condition, is_forecast, fetched_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                "#,
                params![
                    sample.date.to_string(),
                    sample.temperature_min_c,
                    sample.temperature_max_c,
                    sample.temperature_avg_c,
                    sample.humidity_percent,
                    sample.precipitation_mm,
                    sample.wind_speed_ms,
                    sample.uv_index,
                    format!("{:?}", sample.condition),
                    sample.is_forecast,
                    Utc::now().to_rfc3339(),
                ],
            )?;
            Ok(())
        })
    }

    /// Today's observed sample (when present) followed by forecast samples,
    /// in ascending date order. The recommendation engine relies on this
    /// ordering and does not re-sort.
    pub fn weather_window(&self, today: NaiveDate, days: u64) -> Result<Vec<WeatherSample>> {
        let end = today + Days::new(days);
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT * FROM weather_cache
                WHERE date >= ?1 AND date <= ?2
                ORDER BY date ASC, is_forecast ASC
                "#,
            )?;
            let samples = stmt
                .query_map(params![today.to_string(), end.to_string()], row_to_weather)?
                .filter_map(|r| r.ok())
                .collect();
            Ok(samples)
        })
    }

    pub fn delete_observed_weather_before(&self, cutoff: NaiveDate) -> Result<usize> {
        self.with_conn(|conn| {
            let affected = conn.execute(
                "DELETE FROM weather_cache WHERE date < ?1 AND is_forecast = 0",
                [cutoff.to_string()],
            )?;
            Ok(affected)
        })
    }
}

fn row_to_weather(row: &Row) -> rusqlite::Result<WeatherSample> {
    let date_str: String = row.get("date")?;
    let condition_str: String = row.get("condition")?;

    let condition = WeatherCondition::from_str(&condition_str).unwrap_or_else(|| {
        warn!(condition = %condition_str, "Unknown weather condition in database, defaulting to Other");
        WeatherCondition::Other
    });

    Ok(WeatherSample {
        date: parse_date(&date_str),
        temperature_min_c: row.get("temperature_min_c")?,
        temperature_max_c: row.get("temperature_max_c")?,
        temperature_avg_c: row.get("temperature_avg_c")?,
        humidity_percent: row.get("humidity_percent")?,
        precipitation_mm: row.get("precipitation_mm")?,
        wind_speed_ms: row.get("wind_speed_ms")?,
        uv_index: row.get("uv_index")?,
        condition,
        is_forecast: row.get("is_forecast")?,
    })
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap_or_else(|_| chrono::Local::now().date_naive())
}

trait OptionalExt<T> {
    fn optional(self) -> rusqlite::Result<Option<T>>;
}

impl<T> OptionalExt<T> for rusqlite::Result<T> {
    fn optional(self) -> rusqlite::Result<Option<T>> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
