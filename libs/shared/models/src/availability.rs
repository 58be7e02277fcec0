use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A doctor-declared time range on one calendar date.
///
/// Times and duration are kept as stored so that rows written by other
/// tools can still be loaded; callers parse them through
/// `shared_utils::time::ClockTime` before doing arithmetic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityBlock {
    pub id: Uuid,
    pub doctor_id: String,
    /// `YYYY-MM-DD`, compared as an opaque key.
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub slot_duration_minutes: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AvailabilityBlock {
    pub fn is_owned_by(&self, doctor_id: &str) -> bool {
        self.doctor_id == doctor_id
    }

    pub fn range_label(&self) -> String {
        format!("{}-{}", self.start_time, self.end_time)
    }
}
