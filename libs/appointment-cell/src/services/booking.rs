// libs/appointment-cell/src/services/booking.rs

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use doctor_cell::SlotService;
use shared_config::BookingConfig;
use shared_database::{AppointmentRepository, DatabaseError, Repositories};
use shared_utils::time::{self, ClockTime};
use shared_utils::{AppState, KeyedLocks};

use crate::models::{Appointment, AppointmentError, AppointmentStatus, BookAppointmentRequest};

const SLOT_TAKEN: &str = "An appointment at this time already exists";

fn require(value: Option<&str>, field: &str) -> Result<String, AppointmentError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(AppointmentError::Validation(format!("{} is required", field))),
    }
}

fn booking_lock_key(doctor_id: &str, date: &str) -> String {
    format!("{}|{}", doctor_id, date)
}

pub struct AppointmentBookingService {
    appointments: Arc<dyn AppointmentRepository>,
    slot_service: SlotService,
    locks: Arc<KeyedLocks>,
    booking: BookingConfig,
}

impl AppointmentBookingService {
    pub fn new(state: &AppState) -> Self {
        Self::with_parts(&state.repositories, Arc::clone(&state.booking_locks), state.config.booking)
    }

    pub fn with_parts(repositories: &Repositories, locks: Arc<KeyedLocks>, booking: BookingConfig) -> Self {
        Self {
            appointments: Arc::clone(&repositories.appointments),
            slot_service: SlotService::new(repositories),
            locks,
            booking,
        }
    }

    /// Book a slot for `patient_id`.
    ///
    /// The existence check and the insert run under a per doctor and date
    /// lock, so two requests for the same slot cannot both succeed.
    #[instrument(skip(self, request), fields(doctor_id = ?request.doctor_id, date = ?request.date, time = ?request.time))]
    pub async fn book_appointment(
        &self,
        patient_id: &str,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let doctor_id = require(request.doctor_id.as_deref(), "doctor_id")?;
        let date = require(request.date.as_deref(), "date")?;
        let raw_time = require(request.time.as_deref(), "time")?;

        time::validate_calendar_date(&date)
            .map_err(|e| AppointmentError::Validation(format!("date: {}", e)))?;
        let time = ClockTime::parse(&raw_time)
            .map_err(|e| AppointmentError::Validation(format!("time: {}", e)))?
            .to_string();

        let _guard = self.locks.acquire(&booking_lock_key(&doctor_id, &date)).await;

        if let Some(existing) = self.appointments.find_active_at(&doctor_id, &date, &time).await? {
            debug!("Slot {} {} already held by appointment {}", date, time, existing.id);
            return Err(AppointmentError::Conflict(SLOT_TAKEN.to_string()));
        }

        if self.booking.enforce_availability {
            let open = self.slot_service.get_available_slots(&doctor_id, &date).await?;
            if !open.contains(&time) {
                return Err(AppointmentError::Validation(format!(
                    "{} on {} is not an available slot for doctor {}",
                    time, date, doctor_id
                )));
            }
        }

        let status = if self.booking.auto_confirm {
            AppointmentStatus::Confirmed
        } else {
            AppointmentStatus::Pending
        };

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            doctor_id,
            patient_id: patient_id.to_string(),
            date,
            time,
            status,
            notes: request.notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            created_at: now,
            updated_at: now,
        };

        let created = self.appointments.insert(appointment).await.map_err(|e| match e {
            DatabaseError::Duplicate(detail) => {
                warn!("Store rejected duplicate booking: {}", detail);
                AppointmentError::Conflict(SLOT_TAKEN.to_string())
            }
            other => AppointmentError::Service(other),
        })?;

        info!("Appointment {} booked with doctor {} on {} at {} ({})",
              created.id, created.doctor_id, created.date, created.time, created.status);
        Ok(created)
    }

    /// Fetch an appointment visible to `user_id` (its patient or doctor).
    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
        user_id: &str,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Fetching appointment: {}", appointment_id);

        let appointment = self.appointments
            .find_by_id(appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound)?;

        if !appointment.involves(user_id) {
            warn!("User {} attempted to access appointment {}", user_id, appointment_id);
            return Err(AppointmentError::Unauthorized);
        }

        Ok(appointment)
    }

    /// Cancel an active appointment, releasing its slot.
    pub async fn cancel_appointment(
        &self,
        appointment_id: Uuid,
        user_id: &str,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = self.get_appointment(appointment_id, user_id).await?;

        if appointment.status.is_terminal() {
            return Err(AppointmentError::InvalidStatusTransition(appointment.status));
        }

        let cancelled = self.appointments
            .update_status(appointment_id, AppointmentStatus::Cancelled)
            .await
            .map_err(|e| match e {
                DatabaseError::NotFound => AppointmentError::NotFound,
                other => AppointmentError::Service(other),
            })?;

        info!("Appointment {} cancelled by {}", appointment_id, user_id);
        Ok(cancelled)
    }
}
