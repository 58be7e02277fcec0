pub mod error;
pub mod memory;
pub mod repository;
pub mod supabase;

use std::sync::Arc;

use tracing::info;

use shared_config::{AppConfig, StorageBackend};

pub use error::DatabaseError;
pub use memory::{InMemoryAppointmentRepository, InMemoryAvailabilityRepository};
pub use repository::{AppointmentRepository, AvailabilityRepository};
pub use supabase::{SupabaseAppointmentRepository, SupabaseAvailabilityRepository, SupabaseClient};

/// The storage collaborators handed to every service.
#[derive(Clone)]
pub struct Repositories {
    pub availability: Arc<dyn AvailabilityRepository>,
    pub appointments: Arc<dyn AppointmentRepository>,
}

impl Repositories {
    pub fn new(
        availability: Arc<dyn AvailabilityRepository>,
        appointments: Arc<dyn AppointmentRepository>,
    ) -> Self {
        Self { availability, appointments }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        match config.storage_backend {
            StorageBackend::Supabase => {
                info!("Using Supabase storage at {}", config.supabase_url);
                let client = Arc::new(SupabaseClient::new(config));
                Self::new(
                    Arc::new(SupabaseAvailabilityRepository::new(Arc::clone(&client))),
                    Arc::new(SupabaseAppointmentRepository::new(client)),
                )
            }
            StorageBackend::Memory => Self::in_memory(),
        }
    }

    pub fn in_memory() -> Self {
        info!("Using in-memory storage");
        Self::new(
            Arc::new(InMemoryAvailabilityRepository::default()),
            Arc::new(InMemoryAppointmentRepository::default()),
        )
    }
}
