use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION},
    Method,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, error};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::{Appointment, AppointmentStatus, AvailabilityBlock};

use crate::error::DatabaseError;
use crate::repository::{AppointmentRepository, AvailabilityRepository};

const AVAILABILITY_TABLE: &str = "/rest/v1/doctor_availability";
const APPOINTMENTS_TABLE: &str = "/rest/v1/appointments";
const UNIQUE_VIOLATION: &str = "23505";

pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
    service_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            anon_key: config.supabase_anon_key.clone(),
            service_key: config.supabase_service_role_key.clone(),
        }
    }

    /// Every request runs with the service role; callers are authorised in the cells.
    fn get_headers(&self) -> Result<HeaderMap, DatabaseError> {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", header_value(&self.anon_key)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if !self.service_key.is_empty() {
            headers.insert(AUTHORIZATION, header_value(&format!("Bearer {}", self.service_key))?);
        }

        Ok(headers)
    }

    pub async fn request<T>(&self, method: Method, path: &str, body: Option<Value>)
                            -> Result<T, DatabaseError>
    where T: DeserializeOwned {
        self.request_with_headers(method, path, body, None).await
    }

    pub async fn request_with_headers<T>(&self, method: Method, path: &str,
                                         body: Option<Value>,
                                         extra_headers: Option<HeaderMap>)
                                         -> Result<T, DatabaseError>
    where T: DeserializeOwned {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers()?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url)
            .headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);

            if status.as_u16() == 409 || error_text.contains(UNIQUE_VIOLATION) {
                return Err(DatabaseError::Duplicate(error_text));
            }

            return Err(DatabaseError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// Request that asks PostgREST to echo the affected rows.
    async fn request_rows<T>(&self, method: Method, path: &str, body: Option<Value>)
                             -> Result<Vec<T>, DatabaseError>
    where T: DeserializeOwned {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        self.request_with_headers(method, path, body, Some(headers)).await
    }
}

fn header_value(value: &str) -> Result<HeaderValue, DatabaseError> {
    HeaderValue::from_str(value)
        .map_err(|e| DatabaseError::Configuration(format!("invalid header value: {}", e)))
}

fn eq(value: &str) -> String {
    format!("eq.{}", urlencoding::encode(value))
}

fn status_filter(statuses: &[AppointmentStatus]) -> String {
    let joined = statuses.iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!("in.({})", joined)
}

fn first_row<T>(rows: Vec<T>) -> Result<T, DatabaseError> {
    rows.into_iter().next().ok_or(DatabaseError::NotFound)
}

pub struct SupabaseAvailabilityRepository {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseAvailabilityRepository {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl AvailabilityRepository for SupabaseAvailabilityRepository {
    async fn insert(&self, block: AvailabilityBlock) -> Result<AvailabilityBlock, DatabaseError> {
        let body = serde_json::to_value(&block)?;
        let rows = self.supabase.request_rows(Method::POST, AVAILABILITY_TABLE, Some(body)).await?;
        first_row(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AvailabilityBlock>, DatabaseError> {
        let path = format!("{}?id=eq.{}", AVAILABILITY_TABLE, id);
        let rows: Vec<AvailabilityBlock> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(rows.into_iter().next())
    }

    async fn list_for_doctor(&self, doctor_id: &str) -> Result<Vec<AvailabilityBlock>, DatabaseError> {
        let path = format!(
            "{}?doctor_id={}&order=date.asc,start_time.asc",
            AVAILABILITY_TABLE,
            eq(doctor_id)
        );
        self.supabase.request(Method::GET, &path, None).await
    }

    async fn list_for_date(&self, doctor_id: &str, date: &str) -> Result<Vec<AvailabilityBlock>, DatabaseError> {
        let path = format!(
            "{}?doctor_id={}&date={}&order=start_time.asc",
            AVAILABILITY_TABLE,
            eq(doctor_id),
            eq(date)
        );
        self.supabase.request(Method::GET, &path, None).await
    }

    async fn update(&self, block: AvailabilityBlock) -> Result<AvailabilityBlock, DatabaseError> {
        let path = format!("{}?id=eq.{}", AVAILABILITY_TABLE, block.id);
        let body = json!({
            "date": block.date,
            "start_time": block.start_time,
            "end_time": block.end_time,
            "slot_duration_minutes": block.slot_duration_minutes,
            "updated_at": block.updated_at.to_rfc3339(),
        });
        let rows = self.supabase.request_rows(Method::PATCH, &path, Some(body)).await?;
        first_row(rows)
    }

    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let path = format!("{}?id=eq.{}", AVAILABILITY_TABLE, id);
        let rows: Vec<Value> = self.supabase.request_rows(Method::DELETE, &path, None).await?;
        if rows.is_empty() {
            return Err(DatabaseError::NotFound);
        }
        Ok(())
    }
}

pub struct SupabaseAppointmentRepository {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseAppointmentRepository {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl AppointmentRepository for SupabaseAppointmentRepository {
    async fn list_for_date(
        &self,
        doctor_id: &str,
        date: &str,
        statuses: &[AppointmentStatus],
    ) -> Result<Vec<Appointment>, DatabaseError> {
        let path = format!(
            "{}?doctor_id={}&date={}&status={}&order=time.asc",
            APPOINTMENTS_TABLE,
            eq(doctor_id),
            eq(date),
            status_filter(statuses)
        );
        self.supabase.request(Method::GET, &path, None).await
    }

    async fn find_active_at(
        &self,
        doctor_id: &str,
        date: &str,
        time: &str,
    ) -> Result<Option<Appointment>, DatabaseError> {
        let path = format!(
            "{}?doctor_id={}&date={}&time={}&status={}&limit=1",
            APPOINTMENTS_TABLE,
            eq(doctor_id),
            eq(date),
            eq(time),
            status_filter(&AppointmentStatus::ACTIVE)
        );
        let rows: Vec<Appointment> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert(&self, appointment: Appointment) -> Result<Appointment, DatabaseError> {
        let body = serde_json::to_value(&appointment)?;
        let rows = self.supabase.request_rows(Method::POST, APPOINTMENTS_TABLE, Some(body)).await?;
        first_row(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, DatabaseError> {
        let path = format!("{}?id=eq.{}", APPOINTMENTS_TABLE, id);
        let rows: Vec<Appointment> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(rows.into_iter().next())
    }

    async fn update_status(&self, id: Uuid, status: AppointmentStatus) -> Result<Appointment, DatabaseError> {
        let path = format!("{}?id=eq.{}", APPOINTMENTS_TABLE, id);
        let body = json!({
            "status": status,
            "updated_at": Utc::now().to_rfc3339(),
        });
        let rows = self.supabase.request_rows(Method::PATCH, &path, Some(body)).await?;
        first_row(rows)
    }
}
