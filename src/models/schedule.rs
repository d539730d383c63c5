use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleStatus {
    Pending,
    Completed,
    Skipped,
    Cancelled,
}

impl ScheduleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleStatus::Pending => "Pending",
            ScheduleStatus::Completed => "Completed",
            ScheduleStatus::Skipped => "Skipped",
            ScheduleStatus::Cancelled => "Cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(ScheduleStatus::Pending),
            "completed" => Some(ScheduleStatus::Completed),
            "skipped" => Some(ScheduleStatus::Skipped),
            "cancelled" => Some(ScheduleStatus::Cancelled),
            _ => None,
        }
    }

    pub fn all() -> &'static [ScheduleStatus] {
        &[
            ScheduleStatus::Pending,
            ScheduleStatus::Completed,
            ScheduleStatus::Skipped,
            ScheduleStatus::Cancelled,
        ]
    }
}

impl std::fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A planned watering for one plant on one date.
///
/// At most one schedule exists per plant and date; the planner checks before
/// inserting and the store backs that up with a uniqueness constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WateringSchedule {
    pub id: Option<i64>,
    pub plant_id: i64,
    pub scheduled_date: NaiveDate,
    pub water_amount_ml: f64,
    pub status: ScheduleStatus,
    pub reason: Option<String>,
    pub actual_water_amount_ml: Option<f64>,
    pub completed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WateringSchedule {
    pub fn new(plant_id: i64, scheduled_date: NaiveDate, water_amount_ml: f64) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            plant_id,
            scheduled_date,
            water_amount_ml,
            status: ScheduleStatus::Pending,
            reason: None,
            actual_water_amount_ml: None,
            completed_at: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_reason(mut self, reason: &str) -> Self {
        self.reason = Some(reason.to_string());
        self
    }

    pub fn mark_completed(
        &mut self,
        actual_amount_ml: Option<f64>,
        notes: Option<&str>,
        now: DateTime<Utc>,
    ) {
        self.status = ScheduleStatus::Completed;
        self.completed_at = Some(now);
        self.actual_water_amount_ml = Some(actual_amount_ml.unwrap_or(self.water_amount_ml));
        if let Some(notes) = notes {
            self.notes = Some(notes.to_string());
        }
        self.updated_at = now;
    }

    pub fn mark_skipped(&mut self, reason: Option<&str>) {
        self.status = ScheduleStatus::Skipped;
        if let Some(reason) = reason {
            self.reason = Some(reason.to_string());
        }
        self.updated_at = Utc::now();
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.scheduled_date < today && self.status == ScheduleStatus::Pending
    }
}
