use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_database::DatabaseError;
use shared_models::error::AppError;
use shared_utils::TimeParseError;

pub use shared_models::AvailabilityBlock;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateAvailabilityRequest {
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub slot_duration_minutes: Option<i64>,
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAvailabilityRequest {
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub slot_duration_minutes: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailableSlotsQuery {
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableSlotsResponse {
    pub doctor_id: String,
    pub date: String,
    pub slots: Vec<String>,
}

#[derive(Error, Debug)]
pub enum AvailabilityError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Availability {requested} overlaps existing availability {existing} on {date}")]
    Overlap {
        date: String,
        requested: String,
        existing: String,
    },

    #[error("Availability not found")]
    NotFound,

    #[error("Not authorized to modify this availability")]
    Unauthorized,

    #[error("Storage error: {0}")]
    Service(#[from] DatabaseError),
}

impl AvailabilityError {
    pub(crate) fn invalid_field(field: &str, error: TimeParseError) -> Self {
        AvailabilityError::Validation(format!("{}: {}", field, error))
    }
}

impl From<AvailabilityError> for AppError {
    fn from(error: AvailabilityError) -> Self {
        match error {
            AvailabilityError::Validation(msg) => AppError::ValidationError(msg),
            e @ AvailabilityError::Overlap { .. } => AppError::Overlap(e.to_string()),
            AvailabilityError::NotFound => AppError::NotFound("Availability not found".to_string()),
            e @ AvailabilityError::Unauthorized => AppError::Forbidden(e.to_string()),
            AvailabilityError::Service(e) => AppError::Database(e.to_string()),
        }
    }
}
