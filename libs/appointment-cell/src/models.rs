use serde::{Deserialize, Serialize};
use thiserror::Error;

use doctor_cell::AvailabilityError;
use shared_database::DatabaseError;
use shared_models::error::AppError;

pub use shared_models::{Appointment, AppointmentStatus};

/// Booking request; the patient is always the authenticated caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub notes: Option<String>,
}

#[derive(Error, Debug)]
pub enum AppointmentError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Appointment not found")]
    NotFound,

    #[error("Unauthorized access to appointment")]
    Unauthorized,

    #[error("Appointment cannot be modified in current status: {0}")]
    InvalidStatusTransition(AppointmentStatus),

    #[error("Storage error: {0}")]
    Service(#[from] DatabaseError),
}

impl From<AvailabilityError> for AppointmentError {
    fn from(error: AvailabilityError) -> Self {
        match error {
            AvailabilityError::Service(e) => AppointmentError::Service(e),
            AvailabilityError::NotFound => AppointmentError::NotFound,
            AvailabilityError::Unauthorized => AppointmentError::Unauthorized,
            other => AppointmentError::Validation(other.to_string()),
        }
    }
}

impl From<AppointmentError> for AppError {
    fn from(error: AppointmentError) -> Self {
        match error {
            AppointmentError::Validation(msg) => AppError::ValidationError(msg),
            e @ AppointmentError::InvalidStatusTransition(_) => AppError::ValidationError(e.to_string()),
            AppointmentError::Conflict(msg) => AppError::Conflict(msg),
            AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
            e @ AppointmentError::Unauthorized => AppError::Forbidden(e.to_string()),
            AppointmentError::Service(e) => AppError::Database(e.to_string()),
        }
    }
}
