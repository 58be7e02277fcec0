use async_trait::async_trait;
use uuid::Uuid;

use shared_models::{Appointment, AppointmentStatus, AvailabilityBlock};

use crate::error::DatabaseError;

/// Persistence for availability blocks. Implementations never cache.
#[async_trait]
pub trait AvailabilityRepository: Send + Sync {
    async fn insert(&self, block: AvailabilityBlock) -> Result<AvailabilityBlock, DatabaseError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AvailabilityBlock>, DatabaseError>;

    /// All blocks owned by the doctor, ordered by date then start time.
    async fn list_for_doctor(&self, doctor_id: &str) -> Result<Vec<AvailabilityBlock>, DatabaseError>;

    async fn list_for_date(&self, doctor_id: &str, date: &str) -> Result<Vec<AvailabilityBlock>, DatabaseError>;

    /// Replaces the stored row with the same id. `NotFound` if it is gone.
    async fn update(&self, block: AvailabilityBlock) -> Result<AvailabilityBlock, DatabaseError>;

    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError>;
}

/// Persistence for appointments, as far as slot booking needs it.
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn list_for_date(
        &self,
        doctor_id: &str,
        date: &str,
        statuses: &[AppointmentStatus],
    ) -> Result<Vec<Appointment>, DatabaseError>;

    /// An appointment occupying `(doctor_id, date, time)`, if any.
    async fn find_active_at(
        &self,
        doctor_id: &str,
        date: &str,
        time: &str,
    ) -> Result<Option<Appointment>, DatabaseError>;

    /// Stores a new appointment. Fails with `Duplicate` when the store
    /// already holds an active appointment for the same slot.
    async fn insert(&self, appointment: Appointment) -> Result<Appointment, DatabaseError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, DatabaseError>;

    async fn update_status(&self, id: Uuid, status: AppointmentStatus) -> Result<Appointment, DatabaseError>;
}
