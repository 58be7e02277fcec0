pub mod appointment;
pub mod auth;
pub mod availability;
pub mod error;

pub use appointment::{Appointment, AppointmentStatus};
pub use availability::AvailabilityBlock;
