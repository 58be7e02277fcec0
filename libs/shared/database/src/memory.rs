use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use shared_models::{Appointment, AppointmentStatus, AvailabilityBlock};

use crate::error::DatabaseError;
use crate::repository::{AppointmentRepository, AvailabilityRepository};

/// Process-local availability store for development and tests.
#[derive(Default)]
pub struct InMemoryAvailabilityRepository {
    blocks: RwLock<HashMap<Uuid, AvailabilityBlock>>,
}

impl InMemoryAvailabilityRepository {
    pub async fn len(&self) -> usize {
        self.blocks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blocks.read().await.is_empty()
    }
}

#[async_trait]
impl AvailabilityRepository for InMemoryAvailabilityRepository {
    async fn insert(&self, block: AvailabilityBlock) -> Result<AvailabilityBlock, DatabaseError> {
        let mut blocks = self.blocks.write().await;
        if blocks.contains_key(&block.id) {
            return Err(DatabaseError::Duplicate(format!("availability {}", block.id)));
        }
        blocks.insert(block.id, block.clone());
        Ok(block)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AvailabilityBlock>, DatabaseError> {
        Ok(self.blocks.read().await.get(&id).cloned())
    }

    async fn list_for_doctor(&self, doctor_id: &str) -> Result<Vec<AvailabilityBlock>, DatabaseError> {
        let mut owned: Vec<AvailabilityBlock> = self.blocks.read().await
            .values()
            .filter(|b| b.doctor_id == doctor_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.start_time.cmp(&b.start_time)));
        Ok(owned)
    }

    async fn list_for_date(&self, doctor_id: &str, date: &str) -> Result<Vec<AvailabilityBlock>, DatabaseError> {
        let mut blocks: Vec<AvailabilityBlock> = self.blocks.read().await
            .values()
            .filter(|b| b.doctor_id == doctor_id && b.date == date)
            .cloned()
            .collect();
        blocks.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        Ok(blocks)
    }

    async fn update(&self, block: AvailabilityBlock) -> Result<AvailabilityBlock, DatabaseError> {
        let mut blocks = self.blocks.write().await;
        match blocks.get_mut(&block.id) {
            Some(existing) => {
                *existing = block.clone();
                Ok(block)
            }
            None => Err(DatabaseError::NotFound),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        self.blocks.write().await
            .remove(&id)
            .map(|_| ())
            .ok_or(DatabaseError::NotFound)
    }
}

/// Process-local appointment store. Enforces one active appointment per
/// `(doctor_id, date, time)` under its write lock.
#[derive(Default)]
pub struct InMemoryAppointmentRepository {
    appointments: RwLock<HashMap<Uuid, Appointment>>,
}

impl InMemoryAppointmentRepository {
    pub async fn all(&self) -> Vec<Appointment> {
        self.appointments.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl AppointmentRepository for InMemoryAppointmentRepository {
    async fn list_for_date(
        &self,
        doctor_id: &str,
        date: &str,
        statuses: &[AppointmentStatus],
    ) -> Result<Vec<Appointment>, DatabaseError> {
        Ok(self.appointments.read().await
            .values()
            .filter(|a| a.doctor_id == doctor_id && a.date == date && statuses.contains(&a.status))
            .cloned()
            .collect())
    }

    async fn find_active_at(
        &self,
        doctor_id: &str,
        date: &str,
        time: &str,
    ) -> Result<Option<Appointment>, DatabaseError> {
        Ok(self.appointments.read().await
            .values()
            .find(|a| a.doctor_id == doctor_id && a.date == date && a.time == time && a.status.occupies_slot())
            .cloned())
    }

    async fn insert(&self, appointment: Appointment) -> Result<Appointment, DatabaseError> {
        let mut appointments = self.appointments.write().await;

        if appointment.status.occupies_slot() {
            let taken = appointments.values().any(|a| {
                a.doctor_id == appointment.doctor_id
                    && a.date == appointment.date
                    && a.time == appointment.time
                    && a.status.occupies_slot()
            });
            if taken {
                return Err(DatabaseError::Duplicate(format!(
                    "slot {} {} already booked for doctor {}",
                    appointment.date, appointment.time, appointment.doctor_id
                )));
            }
        }

        appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, DatabaseError> {
        Ok(self.appointments.read().await.get(&id).cloned())
    }

    async fn update_status(&self, id: Uuid, status: AppointmentStatus) -> Result<Appointment, DatabaseError> {
        let mut appointments = self.appointments.write().await;
        let appointment = appointments.get_mut(&id).ok_or(DatabaseError::NotFound)?;
        appointment.status = status;
        appointment.updated_at = Utc::now();
        Ok(appointment.clone())
    }
}
