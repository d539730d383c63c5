use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A watering that actually happened, scheduled or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WateringEvent {
    pub id: Option<i64>,
    pub plant_id: i64,
    pub watered_at: DateTime<Utc>,
    pub water_amount_ml: f64,
    pub was_scheduled: bool,
    pub schedule_id: Option<i64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl WateringEvent {
    pub fn new(plant_id: i64, watered_at: DateTime<Utc>, water_amount_ml: f64) -> Self {
        Self {
            id: None,
            plant_id,
            watered_at,
            water_amount_ml,
            was_scheduled: false,
            schedule_id: None,
            notes: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_schedule(mut self, schedule_id: i64) -> Self {
        self.was_scheduled = true;
        self.schedule_id = Some(schedule_id);
        self
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    /// Whole days elapsed since this watering, floored. Never negative.
    pub fn days_since(&self, now: DateTime<Utc>) -> i64 {
        (now - self.watered_at).num_days().max(0)
    }
}
