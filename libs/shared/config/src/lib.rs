use std::env;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Which storage collaborator backs the repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Supabase,
    Memory,
}

impl StorageBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "supabase" => Some(StorageBackend::Supabase),
            "memory" | "in-memory" | "in_memory" => Some(StorageBackend::Memory),
            _ => None,
        }
    }
}

/// Booking workflow switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfig {
    /// New bookings start `Confirmed` instead of `Pending`.
    pub auto_confirm: bool,
    /// Reject bookings whose time is not one of the currently computed slots.
    pub enforce_availability: bool,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            auto_confirm: false,
            enforce_availability: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_role_key: String,
    pub supabase_jwt_secret: String,
    pub storage_backend: StorageBackend,
    pub booking: BookingConfig,
    pub server_port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let supabase_url = env::var("SUPABASE_URL")
            .unwrap_or_else(|_| {
                warn!("SUPABASE_URL not set, using empty value");
                String::new()
            });
        let supabase_anon_key = env::var("SUPABASE_ANON_PUBLIC_KEY")
            .unwrap_or_else(|_| {
                warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                String::new()
            });
        let supabase_service_role_key = env::var("SUPABASE_SERVICE_ROLE_KEY")
            .unwrap_or_else(|_| {
                warn!("SUPABASE_SERVICE_ROLE_KEY not set, falling back to anon key");
                supabase_anon_key.clone()
            });
        let supabase_jwt_secret = env::var("SUPABASE_JWT_SECRET")
            .unwrap_or_else(|_| {
                warn!("SUPABASE_JWT_SECRET not set, using empty value");
                String::new()
            });

        let supabase_ready = !supabase_url.is_empty() && !supabase_anon_key.is_empty();
        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => StorageBackend::parse(&value).unwrap_or_else(|| {
                warn!("Unknown STORAGE_BACKEND '{}', using in-memory storage", value);
                StorageBackend::Memory
            }),
            Err(_) if supabase_ready => StorageBackend::Supabase,
            Err(_) => {
                warn!("STORAGE_BACKEND not set and Supabase not configured, using in-memory storage");
                StorageBackend::Memory
            }
        };

        let defaults = BookingConfig::default();
        let booking = BookingConfig {
            auto_confirm: read_flag("BOOKING_AUTO_CONFIRM", defaults.auto_confirm),
            enforce_availability: read_flag("BOOKING_ENFORCE_AVAILABILITY", defaults.enforce_availability),
        };

        let server_port = match env::var("SERVER_PORT") {
            Ok(value) => value.parse().unwrap_or_else(|_| {
                warn!("SERVER_PORT '{}' is not a valid port, using 3000", value);
                3000
            }),
            Err(_) => 3000,
        };

        let config = Self {
            supabase_url,
            supabase_anon_key,
            supabase_service_role_key,
            supabase_jwt_secret,
            storage_backend,
            booking,
            server_port,
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_jwt_secret.is_empty()
            && (self.storage_backend == StorageBackend::Memory || self.is_supabase_configured())
    }

    pub fn is_supabase_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }
}

fn read_flag(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                warn!("{} has unrecognised value '{}', using {}", name, value, default);
                default
            }
        },
        Err(_) => default,
    }
}
