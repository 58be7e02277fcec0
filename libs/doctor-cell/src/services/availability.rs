// libs/doctor-cell/src/services/availability.rs

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_database::{AvailabilityRepository, DatabaseError, Repositories};
use shared_utils::time::{self, ClockTime, MINUTES_PER_DAY};

use crate::models::{
    AvailabilityBlock, AvailabilityError, CreateAvailabilityRequest, UpdateAvailabilityRequest,
};

/// A block's fields after validation.
#[derive(Debug, Clone, PartialEq)]
struct ValidatedRange {
    date: String,
    start: ClockTime,
    end: ClockTime,
    slot_duration_minutes: i32,
}

impl ValidatedRange {
    fn label(&self) -> String {
        format!("{}-{}", self.start, self.end)
    }
}

fn require<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, AvailabilityError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AvailabilityError::Validation(format!("{} is required", field))),
    }
}

fn validate_range(
    date: Option<&str>,
    start_time: Option<&str>,
    end_time: Option<&str>,
    slot_duration_minutes: Option<i64>,
) -> Result<ValidatedRange, AvailabilityError> {
    let date = require(date, "date")?;
    let start_time = require(start_time, "start_time")?;
    let end_time = require(end_time, "end_time")?;
    let duration = slot_duration_minutes
        .ok_or_else(|| AvailabilityError::Validation("slot_duration_minutes is required".to_string()))?;

    time::validate_calendar_date(date).map_err(|e| AvailabilityError::invalid_field("date", e))?;
    let start = ClockTime::parse(start_time).map_err(|e| AvailabilityError::invalid_field("start_time", e))?;
    let end = ClockTime::parse(end_time).map_err(|e| AvailabilityError::invalid_field("end_time", e))?;

    if duration <= 0 || duration > i64::from(MINUTES_PER_DAY) {
        return Err(AvailabilityError::Validation(format!(
            "slot_duration_minutes must be between 1 and {}, got {}",
            MINUTES_PER_DAY, duration
        )));
    }

    if start >= end {
        return Err(AvailabilityError::Validation(format!(
            "start_time {} must be before end_time {}",
            start, end
        )));
    }

    Ok(ValidatedRange {
        date: date.to_string(),
        start,
        end,
        slot_duration_minutes: duration as i32,
    })
}

pub struct AvailabilityService {
    repository: Arc<dyn AvailabilityRepository>,
}

impl AvailabilityService {
    pub fn new(repositories: &Repositories) -> Self {
        Self::with_repository(Arc::clone(&repositories.availability))
    }

    pub fn with_repository(repository: Arc<dyn AvailabilityRepository>) -> Self {
        Self { repository }
    }

    /// Declare a new availability block for a doctor
    pub async fn create_availability(
        &self,
        doctor_id: &str,
        request: CreateAvailabilityRequest,
    ) -> Result<AvailabilityBlock, AvailabilityError> {
        debug!("Creating availability for doctor: {}", doctor_id);

        let doctor_id = require(Some(doctor_id), "doctor_id")?;
        let range = validate_range(
            request.date.as_deref(),
            request.start_time.as_deref(),
            request.end_time.as_deref(),
            request.slot_duration_minutes,
        )?;

        self.check_availability_conflicts(doctor_id, &range, None).await?;

        let now = Utc::now();
        let block = AvailabilityBlock {
            id: Uuid::new_v4(),
            doctor_id: doctor_id.to_string(),
            date: range.date,
            start_time: range.start.to_string(),
            end_time: range.end.to_string(),
            slot_duration_minutes: Some(range.slot_duration_minutes),
            created_at: now,
            updated_at: now,
        };

        let created = self.repository.insert(block).await?;
        info!("Availability {} created for doctor {} on {}", created.id, doctor_id, created.date);

        Ok(created)
    }

    /// Merge a partial update onto an owned block and re-validate it
    pub async fn update_availability(
        &self,
        availability_id: Uuid,
        doctor_id: &str,
        request: UpdateAvailabilityRequest,
    ) -> Result<AvailabilityBlock, AvailabilityError> {
        debug!("Updating availability: {}", availability_id);

        let existing = self.get_owned_availability(availability_id, doctor_id).await?;

        let range = validate_range(
            request.date.as_deref().or(Some(existing.date.as_str())),
            request.start_time.as_deref().or(Some(existing.start_time.as_str())),
            request.end_time.as_deref().or(Some(existing.end_time.as_str())),
            request.slot_duration_minutes.or(existing.slot_duration_minutes.map(i64::from)),
        )?;

        self.check_availability_conflicts(doctor_id, &range, Some(availability_id)).await?;

        let updated = AvailabilityBlock {
            date: range.date,
            start_time: range.start.to_string(),
            end_time: range.end.to_string(),
            slot_duration_minutes: Some(range.slot_duration_minutes),
            updated_at: Utc::now(),
            ..existing
        };

        let saved = self.repository.update(updated).await.map_err(not_found_or_service)?;
        info!("Availability {} updated", availability_id);

        Ok(saved)
    }

    /// Remove an owned block. Appointments already booked against it are left alone.
    pub async fn delete_availability(
        &self,
        availability_id: Uuid,
        doctor_id: &str,
    ) -> Result<(), AvailabilityError> {
        debug!("Deleting availability: {}", availability_id);

        self.get_owned_availability(availability_id, doctor_id).await?;
        self.repository.delete(availability_id).await.map_err(not_found_or_service)?;

        info!("Availability {} deleted by doctor {}", availability_id, doctor_id);
        Ok(())
    }

    /// All blocks of a doctor, ordered by date then start time
    pub async fn get_doctor_availability(
        &self,
        doctor_id: &str,
    ) -> Result<Vec<AvailabilityBlock>, AvailabilityError> {
        debug!("Fetching availability for doctor: {}", doctor_id);

        let mut blocks = self.repository.list_for_doctor(doctor_id).await?;
        blocks.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.start_time.cmp(&b.start_time)));
        Ok(blocks)
    }

    pub async fn get_availability(&self, availability_id: Uuid) -> Result<AvailabilityBlock, AvailabilityError> {
        self.repository
            .find_by_id(availability_id)
            .await?
            .ok_or(AvailabilityError::NotFound)
    }

    // Private helper methods

    async fn get_owned_availability(
        &self,
        availability_id: Uuid,
        doctor_id: &str,
    ) -> Result<AvailabilityBlock, AvailabilityError> {
        let block = self.get_availability(availability_id).await?;

        if !block.is_owned_by(doctor_id) {
            warn!("Doctor {} attempted to modify availability {} owned by {}",
                  doctor_id, availability_id, block.doctor_id);
            return Err(AvailabilityError::Unauthorized);
        }

        Ok(block)
    }

    async fn check_availability_conflicts(
        &self,
        doctor_id: &str,
        range: &ValidatedRange,
        exclude_id: Option<Uuid>,
    ) -> Result<(), AvailabilityError> {
        let existing = self.repository.list_for_date(doctor_id, &range.date).await?;

        for block in existing.iter().filter(|b| Some(b.id) != exclude_id) {
            let (existing_start, existing_end) = match (
                ClockTime::parse(&block.start_time),
                ClockTime::parse(&block.end_time),
            ) {
                (Ok(start), Ok(end)) => (start, end),
                _ => {
                    warn!("Ignoring availability {} with unparsable range {} during overlap check",
                          block.id, block.range_label());
                    continue;
                }
            };

            if time::ranges_overlap(range.start, range.end, existing_start, existing_end) {
                return Err(AvailabilityError::Overlap {
                    date: range.date.clone(),
                    requested: range.label(),
                    existing: block.range_label(),
                });
            }
        }

        Ok(())
    }
}

fn not_found_or_service(error: DatabaseError) -> AvailabilityError {
    match error {
        DatabaseError::NotFound => AvailabilityError::NotFound,
        other => AvailabilityError::Service(other),
    }
}
