// libs/doctor-cell/src/services/slots.rs

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use shared_database::{AppointmentRepository, AvailabilityRepository, Repositories};
use shared_models::AppointmentStatus;
use shared_utils::time::{self, ClockTime};

use crate::models::{AvailabilityBlock, AvailabilityError};

/// Slot start times for one block, or `None` when the block is malformed.
///
/// A slot is only emitted when it fits entirely inside the block.
pub fn generate_block_slots(block: &AvailabilityBlock) -> Option<Vec<ClockTime>> {
    let duration = match block.slot_duration_minutes {
        Some(d) if d > 0 => d as u32,
        _ => return None,
    };
    let start = ClockTime::parse(&block.start_time).ok()?;
    let end = ClockTime::parse(&block.end_time).ok()?;
    if start >= end {
        return None;
    }

    let mut slots = Vec::new();
    let mut step = start.minutes();
    while step + duration <= end.minutes() {
        slots.extend(ClockTime::from_minutes(step));
        step += duration;
    }

    Some(slots)
}

/// Derives bookable slots from availability and current bookings.
pub struct SlotService {
    availability: Arc<dyn AvailabilityRepository>,
    appointments: Arc<dyn AppointmentRepository>,
}

impl SlotService {
    pub fn new(repositories: &Repositories) -> Self {
        Self::with_repositories(
            Arc::clone(&repositories.availability),
            Arc::clone(&repositories.appointments),
        )
    }

    pub fn with_repositories(
        availability: Arc<dyn AvailabilityRepository>,
        appointments: Arc<dyn AppointmentRepository>,
    ) -> Self {
        Self { availability, appointments }
    }

    /// Sorted, distinct `HH:MM` slots still open for booking.
    ///
    /// No availability is an empty list, not an error. Malformed blocks are
    /// skipped; storage failures propagate.
    #[instrument(skip(self))]
    pub async fn get_available_slots(
        &self,
        doctor_id: &str,
        date: &str,
    ) -> Result<Vec<String>, AvailabilityError> {
        time::validate_calendar_date(date).map_err(|e| AvailabilityError::invalid_field("date", e))?;

        let blocks = self.availability.list_for_date(doctor_id, date).await?;
        if blocks.is_empty() {
            debug!("No availability declared for doctor {} on {}", doctor_id, date);
            return Ok(Vec::new());
        }

        let booked: HashSet<String> = self.appointments
            .list_for_date(doctor_id, date, &AppointmentStatus::ACTIVE)
            .await?
            .into_iter()
            .map(|appointment| match ClockTime::parse(&appointment.time) {
                Ok(t) => t.to_string(),
                Err(_) => appointment.time,
            })
            .collect();

        let mut candidates = BTreeSet::new();
        for block in &blocks {
            match generate_block_slots(block) {
                Some(slots) => candidates.extend(slots),
                None => warn!(
                    "Skipping malformed availability {} ({} duration {:?})",
                    block.id, block.range_label(), block.slot_duration_minutes
                ),
            }
        }

        let slots: Vec<String> = candidates
            .into_iter()
            .map(|slot| slot.to_string())
            .filter(|slot| !booked.contains(slot))
            .collect();

        debug!("Found {} available slots for doctor {} on {} ({} booked)",
               slots.len(), doctor_id, date, booked.len());
        Ok(slots)
    }
}
